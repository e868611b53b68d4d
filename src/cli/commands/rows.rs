//! One-shot row actions: hide, modify, upload, print, materials.

use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::queries::lookup_job;
use crate::errors::AppResult;
use crate::report::{PdfReportGenerator, SystemOpener};
use crate::schedule::EventSink;
use crate::schedule::actions::{self, ReportOutcome, ReportServices};
use crate::ui::messages::{info, success};
use crate::ui::prompt::StdinPrompt;
use std::path::Path;

pub fn handle(cmd: &Commands, cfg: &mut Config) -> AppResult<()> {
    // Outcomes are reported from the returned Result.
    let events = EventSink::disconnected();

    match cmd {
        Commands::Hide { job } => {
            let mut store = super::open_store(cfg)?;
            let location = lookup_job(&store.conn, job)?;
            actions::hide_job(&mut store, job, &location.job_ref, &events)?;
            success(format!("Job {job} hidden from '{}'", location.queue));
        }
        Commands::Modify { job } => {
            let mut store = super::open_store(cfg)?;
            let location = lookup_job(&store.conn, job)?;
            actions::mark_modified(&mut store, job, &location.job_ref, &events)?;
            success(format!("Job {job}: modifying flag toggled"));
        }
        Commands::Upload { job, file } => {
            let mut store = super::open_store(cfg)?;
            let location = lookup_job(&store.conn, job)?;
            let mut prompt = StdinPrompt::new();
            let uploaded = actions::upload_attachment(
                &mut store,
                job,
                &location.job_ref,
                file.as_deref().map(Path::new),
                cfg,
                &mut prompt,
                &events,
            )?;
            if let Some(path) = uploaded {
                success(format!("Attached {} to job {job}", path.display()));
            }
        }
        Commands::Print { job } => {
            let mut store = super::open_store(cfg)?;
            let location = lookup_job(&store.conn, job)?;
            let mut generator = PdfReportGenerator;
            let mut opener = SystemOpener;
            let mut prompt = StdinPrompt::new();
            let mut services = ReportServices {
                generator: &mut generator,
                opener: &mut opener,
                settings: cfg,
                prompt: &mut prompt,
            };
            match actions::print_report(&mut store, job, &location.job_ref, &mut services, &events)? {
                ReportOutcome::OpenedAttachment(path) => {
                    success(format!("Opened attached document {}", path.display()))
                }
                ReportOutcome::Generated(path) => {
                    success(format!("Work order written to {}", path.display()))
                }
                ReportOutcome::Aborted | ReportOutcome::NoReportData => {}
            }
        }
        Commands::Materials { prefix } => {
            let mut store = super::open_store(cfg)?;
            let names = actions::material_suggestions(&mut store, prefix)?;
            if names.is_empty() {
                info(format!("No materials start with '{prefix}'."));
            }
            for name in names {
                println!("{name}");
            }
        }
        _ => {}
    }
    Ok(())
}
