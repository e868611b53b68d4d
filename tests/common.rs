#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use rschedule::config::Settings;
use rschedule::db::access::{DataAccess, QueryName, Rowset, value_text};
use rschedule::errors::{AppError, AppResult};
use rschedule::report::{DocumentOpener, ReportGenerator, ReportHeader};
use rschedule::schedule::view::{Presenter, ViewOp};
use rschedule::ui::prompt::Prompt;
use rusqlite::types::Value;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub fn rsch() -> Command {
    cargo_bin_cmd!("rschedule")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rschedule.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Fresh, empty directory inside the system temp dir
pub fn temp_dir(name: &str) -> PathBuf {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("rschedule_{name}"));
    fs::remove_dir_all(&path).ok();
    fs::create_dir_all(&path).expect("create temp dir");
    path
}

/// Initialize the DB and schedule three laser jobs through the CLI
pub fn init_db_with_jobs(db_path: &str) {
    rsch()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    for (job, job_ref, priority) in [("J1", "R1", "1"), ("J2", "R2", "2"), ("J3", "R3", "3")] {
        rsch()
            .args([
                "--db",
                db_path,
                "--test",
                "add",
                job,
                "--ref",
                job_ref,
                "--queue",
                "laser",
                "--priority",
                priority,
                "--description",
                &format!("Part for {job}"),
                "--material",
                "S235",
                "--qty",
                "2",
                "--customer",
                "ACME",
                "--due",
                "2026-11-03",
                "--line",
                "P-1;Bracket;4;S235",
            ])
            .assert()
            .success();
    }
}

// ---------------------------------------------------------------------------
// Library-level fakes
// ---------------------------------------------------------------------------

/// A schedule row record, in positional column order.
pub fn record(job: &str, priority: i64) -> Vec<Value> {
    vec![
        Value::Integer(priority),
        Value::Text(job.to_string()),
        Value::Text(format!("Part for {job}")),
        Value::Text("S235".into()),
        Value::Text("2".into()),
        Value::Null,
        Value::Integer(0),
        Value::Null,
        Value::Text(format!("ref-{job}")),
        Value::Text(String::new()),
    ]
}

pub fn records(jobs: &[&str]) -> Vec<Vec<Value>> {
    jobs.iter()
        .enumerate()
        .map(|(i, j)| record(j, i as i64 + 1))
        .collect()
}

/// Scripted in-memory data access.
///
/// Schedule fetches pop `schedules` in order; once one entry is left it is
/// returned forever. Every call is recorded.
#[derive(Default)]
pub struct ScriptedData {
    pub schedules: VecDeque<Result<Vec<Vec<Value>>, String>>,
    pub attachments: HashMap<String, Vec<u8>>,
    pub header: Option<[String; 3]>,
    pub lines: Vec<Vec<Value>>,
    pub materials: Vec<String>,
    pub fail_writes: bool,
    pub fail_attachment_check: bool,
    pub fail_report_reads: bool,
    pub calls: Vec<(QueryName, Vec<Value>)>,
}

impl ScriptedData {
    pub fn with_schedules(schedules: Vec<Result<Vec<Vec<Value>>, String>>) -> Self {
        Self {
            schedules: schedules.into(),
            ..Self::default()
        }
    }

    pub fn push_schedule(&mut self, rows: Vec<Vec<Value>>) {
        self.schedules.push_back(Ok(rows));
    }

    pub fn count(&self, name: QueryName) -> usize {
        self.calls.iter().filter(|(n, _)| *n == name).count()
    }

    pub fn last_params(&self, name: QueryName) -> Option<&Vec<Value>> {
        self.calls
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| p)
    }
}

impl DataAccess for ScriptedData {
    fn query(&mut self, name: QueryName, params: &[Value]) -> AppResult<Rowset> {
        self.calls.push((name, params.to_vec()));
        let key = params.first().map(value_text).unwrap_or_default();

        if name.is_write() {
            if self.fail_writes {
                return Err(AppError::Other("database is locked".into()));
            }
            if name == QueryName::InsertAttachment
                && let Some(Value::Blob(bytes)) = params.get(1)
            {
                self.attachments.insert(key, bytes.clone());
            }
            return Ok(Rowset::written(1));
        }

        if self.fail_report_reads
            && matches!(
                name,
                QueryName::FetchAttachment
                    | QueryName::FetchReportHeader
                    | QueryName::FetchReportLines
            )
        {
            return Err(AppError::Other("connection reset".into()));
        }

        match name {
            QueryName::FetchSchedule => {
                let next = if self.schedules.len() > 1 {
                    self.schedules.pop_front()
                } else {
                    self.schedules.front().cloned()
                };
                match next {
                    Some(Ok(rows)) => Ok(Rowset::from_rows(rows)),
                    Some(Err(msg)) => Err(AppError::Other(msg)),
                    None => Ok(Rowset::default()),
                }
            }
            QueryName::CheckAttachment => {
                if self.fail_attachment_check {
                    return Err(AppError::Other("attachment table missing".into()));
                }
                Ok(Rowset::from_rows(if self.attachments.contains_key(&key) {
                    vec![vec![Value::Integer(1)]]
                } else {
                    Vec::new()
                }))
            }
            QueryName::FetchAttachment => Ok(Rowset::from_rows(
                self.attachments
                    .get(&key)
                    .map(|b| vec![vec![Value::Blob(b.clone())]])
                    .unwrap_or_default(),
            )),
            QueryName::FetchReportHeader => Ok(Rowset::from_rows(
                self.header
                    .iter()
                    .map(|h| h.iter().map(|s| Value::Text(s.clone())).collect())
                    .collect(),
            )),
            QueryName::FetchReportLines => Ok(Rowset::from_rows(self.lines.clone())),
            QueryName::ListMaterials => Ok(Rowset::from_rows(
                self.materials
                    .iter()
                    .filter(|m| m.starts_with(&key))
                    .map(|m| vec![Value::Text(m.clone())])
                    .collect(),
            )),
            _ => Ok(Rowset::default()),
        }
    }
}

/// Presenter that records every batch it is handed.
#[derive(Clone, Default)]
pub struct RecordingPresenter {
    pub batches: Rc<RefCell<Vec<Vec<ViewOp>>>>,
}

impl RecordingPresenter {
    pub fn batch_count(&self) -> usize {
        self.batches.borrow().len()
    }

    pub fn last_batch(&self) -> Vec<ViewOp> {
        self.batches.borrow().last().cloned().unwrap_or_default()
    }
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, ops: &[ViewOp]) {
        self.batches.borrow_mut().push(ops.to_vec());
    }
}

#[derive(Default)]
pub struct MemorySettings {
    pub values: HashMap<String, String>,
}

impl Settings for MemorySettings {
    fn read(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Prompt with canned answers; `None` declines.
#[derive(Default)]
pub struct CannedPrompt {
    pub directory: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub asked: usize,
}

impl Prompt for CannedPrompt {
    fn ask_directory(&mut self, _title: &str) -> Option<PathBuf> {
        self.asked += 1;
        self.directory.clone()
    }

    fn ask_file(&mut self, _title: &str, _start_dir: Option<&Path>) -> Option<PathBuf> {
        self.asked += 1;
        self.file.clone()
    }
}

#[derive(Default)]
pub struct RecordingOpener {
    pub opened: Vec<PathBuf>,
}

impl DocumentOpener for RecordingOpener {
    fn open(&mut self, path: &Path) -> AppResult<()> {
        self.opened.push(path.to_path_buf());
        Ok(())
    }
}

/// Generator that records its input and writes a placeholder file.
#[derive(Default)]
pub struct RecordingGenerator {
    pub calls: Vec<(ReportHeader, usize, Vec<Vec<String>>, PathBuf)>,
}

impl ReportGenerator for RecordingGenerator {
    fn generate(
        &mut self,
        header: &ReportHeader,
        row_count: usize,
        rows: &[Vec<String>],
        out_dir: &Path,
    ) -> AppResult<PathBuf> {
        self.calls
            .push((header.clone(), row_count, rows.to_vec(), out_dir.to_path_buf()));
        let path = out_dir.join(format!("work_order_{}.pdf", header.job_number));
        fs::write(&path, b"%PDF-1.7")?;
        Ok(path)
    }
}
