//! One-shot row commands and the print pipeline.
//!
//! These never touch the edit state machine. Each reports its outcome on the
//! event channel keyed by job number; hide and mark-modified leave the local
//! row alone and let the next poll show the change.

use crate::config::{KEY_LAST_UPLOAD_DIR, KEY_PRINTS_DIR, Settings};
use crate::db::access::{DataAccess, QueryName, Rowset, text, value_text};
use crate::errors::{AppError, AppResult};
use crate::report::{DocumentOpener, ReportGenerator, ReportHeader};
use crate::schedule::events::{EventSink, RowAction, ScheduleEvent};
use crate::ui::messages::info;
use crate::ui::prompt::Prompt;
use crate::utils::path::expand_tilde;
use rusqlite::types::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Report an action's result on the event channel, wrapping failures as
/// write errors for `job`.
fn report<T>(
    events: &EventSink,
    job: &str,
    action: RowAction,
    result: AppResult<T>,
) -> AppResult<T> {
    match result {
        Ok(v) => {
            events.emit(ScheduleEvent::ActionSucceeded {
                job: job.to_string(),
                action,
            });
            Ok(v)
        }
        Err(e) => {
            warn!(job, %action, error = %e, "row action failed");
            let err = if matches!(e, AppError::Write { .. }) {
                e
            } else {
                AppError::write(job, e)
            };
            events.emit(ScheduleEvent::ActionFailed {
                job: job.to_string(),
                action,
                reason: err.to_string(),
            });
            Err(err)
        }
    }
}

/// Take the job out of every queue.
pub fn hide_job(
    data: &mut dyn DataAccess,
    job: &str,
    job_ref: &str,
    events: &EventSink,
) -> AppResult<()> {
    let result = data.query(QueryName::FinishJob, &[text(job_ref)]).map(|_| ());
    report(events, job, RowAction::Hide, result)
}

/// Toggle the "modifying" flag.
pub fn mark_modified(
    data: &mut dyn DataAccess,
    job: &str,
    job_ref: &str,
    events: &EventSink,
) -> AppResult<()> {
    let result = data
        .query(QueryName::MarkJobModified, &[text(job_ref)])
        .map(|_| ());
    report(events, job, RowAction::MarkModified, result)
}

/// Store `file` as the job's attached document.
///
/// Without a file the operator is asked for one, starting from the last
/// upload directory. Returns `None` when they decline. On success the file's
/// directory becomes the new starting point.
pub fn upload_attachment(
    data: &mut dyn DataAccess,
    job: &str,
    job_ref: &str,
    file: Option<&Path>,
    settings: &mut dyn Settings,
    prompt: &mut dyn Prompt,
    events: &EventSink,
) -> AppResult<Option<PathBuf>> {
    let path = match file {
        Some(p) => p.to_path_buf(),
        None => {
            let start = settings.read(KEY_LAST_UPLOAD_DIR).map(|d| expand_tilde(&d));
            match prompt.ask_file("PDF to attach", start.as_deref()) {
                Some(p) => p,
                None => {
                    info(format!("Upload for job {job} cancelled."));
                    return Ok(None);
                }
            }
        }
    };

    let result = fs::read(&path)
        .map_err(AppError::from)
        .and_then(|bytes| {
            debug!(job, bytes = bytes.len(), "uploading attachment");
            data.query(
                QueryName::InsertAttachment,
                &[text(job_ref), Value::Blob(bytes)],
            )
        })
        .map(|_| ());
    report(events, job, RowAction::Upload, result)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        settings.write(KEY_LAST_UPLOAD_DIR, &dir.to_string_lossy())?;
    }
    Ok(Some(path))
}

/// Collaborators the print pipeline hands work to.
pub struct ReportServices<'a> {
    pub generator: &'a mut dyn ReportGenerator,
    pub opener: &'a mut dyn DocumentOpener,
    pub settings: &'a mut dyn Settings,
    pub prompt: &'a mut dyn Prompt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The attached document was opened as-is.
    OpenedAttachment(PathBuf),
    /// No attachment: a report was generated and opened.
    Generated(PathBuf),
    /// The operator declined to pick an output directory.
    Aborted,
    /// Neither an attachment nor report data exists for the job.
    NoReportData,
}

/// Open the job's paperwork: its attached document when there is one,
/// otherwise a freshly generated work order report.
pub fn print_report(
    data: &mut dyn DataAccess,
    job: &str,
    job_ref: &str,
    services: &mut ReportServices<'_>,
    events: &EventSink,
) -> AppResult<ReportOutcome> {
    // Read failures keep their own kind; nothing here is a write.
    match print_inner(data, job, job_ref, services) {
        Ok(outcome @ (ReportOutcome::Aborted | ReportOutcome::NoReportData)) => Ok(outcome),
        Ok(outcome) => {
            events.emit(ScheduleEvent::ActionSucceeded {
                job: job.to_string(),
                action: RowAction::Print,
            });
            Ok(outcome)
        }
        Err(e) => {
            warn!(job, error = %e, "print failed");
            events.emit(ScheduleEvent::ActionFailed {
                job: job.to_string(),
                action: RowAction::Print,
                reason: e.to_string(),
            });
            Err(e)
        }
    }
}

fn print_inner(
    data: &mut dyn DataAccess,
    job: &str,
    job_ref: &str,
    services: &mut ReportServices<'_>,
) -> AppResult<ReportOutcome> {
    let attachment = data.query(QueryName::FetchAttachment, &[text(job_ref)])?;
    if let Some(bytes) = attachment_bytes(&attachment) {
        let path = std::env::temp_dir().join(format!("rschedule_{}.pdf", safe_name(job_ref)));
        fs::write(&path, bytes)?;
        services.opener.open(&path)?;
        return Ok(ReportOutcome::OpenedAttachment(path));
    }

    info(format!("Job {job} has no attached document, generating a work order."));

    let header_rs = data.query(QueryName::FetchReportHeader, &[text(job_ref)])?;
    let Some(header) = header_rs.first().map(|r| ReportHeader {
        customer: r.first().map(value_text).unwrap_or_default(),
        job_number: r.get(1).map(value_text).unwrap_or_default(),
        due_date: r.get(2).map(value_text).unwrap_or_default(),
    }) else {
        info(format!("Job {job} has no report data; nothing to print."));
        return Ok(ReportOutcome::NoReportData);
    };

    let lines_rs = data.query(QueryName::FetchReportLines, &[text(job_ref)])?;
    let lines: Vec<Vec<String>> = lines_rs
        .rows
        .iter()
        .map(|r| r.iter().map(value_text).collect())
        .collect();

    let Some(out_dir) = resolve_prints_dir(services.settings, services.prompt)? else {
        info(format!("No output directory chosen; report for job {job} not generated."));
        return Ok(ReportOutcome::Aborted);
    };

    let path = services
        .generator
        .generate(&header, lines.len(), &lines, &out_dir)?;
    services.opener.open(&path)?;
    Ok(ReportOutcome::Generated(path))
}

fn attachment_bytes(rs: &Rowset) -> Option<&[u8]> {
    match rs.first()?.first()? {
        Value::Blob(b) if !b.is_empty() => Some(b.as_slice()),
        _ => None,
    }
}

fn safe_name(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// The prints directory setting, asking for (and saving) it when unset.
/// `None` means the operator declined.
pub fn resolve_prints_dir(
    settings: &mut dyn Settings,
    prompt: &mut dyn Prompt,
) -> AppResult<Option<PathBuf>> {
    match settings.require(KEY_PRINTS_DIR) {
        Ok(dir) => Ok(Some(expand_tilde(&dir))),
        Err(AppError::ConfigurationMissing(_)) => {
            let Some(dir) = prompt.ask_directory("Work order output") else {
                return Ok(None);
            };
            settings.write(KEY_PRINTS_DIR, &dir.to_string_lossy())?;
            Ok(Some(dir))
        }
        Err(e) => Err(e),
    }
}

/// Material names starting with `prefix`, for autocompletion.
pub fn material_suggestions(data: &mut dyn DataAccess, prefix: &str) -> AppResult<Vec<String>> {
    let rs = data.query(QueryName::ListMaterials, &[text(prefix)])?;
    Ok(rs
        .rows
        .iter()
        .filter_map(|r| r.first().map(value_text))
        .collect())
}
