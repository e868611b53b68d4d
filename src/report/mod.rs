//! Work order paperwork: generation and opening.

mod open;
mod pdf;

pub use open::{DocumentOpener, SystemOpener};
pub use pdf::PdfManager;

use crate::errors::{AppError, AppResult};
use crate::ui::messages::info;
use chrono::Local;
use std::path::{Path, PathBuf};

/// Header block of a work order report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportHeader {
    pub customer: String,
    pub job_number: String,
    pub due_date: String,
}

impl ReportHeader {
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Customer: {}", self.customer),
            format!("Job: {}", self.job_number),
            format!("Due: {}", self.due_date),
        ]
    }
}

pub const LINE_HEADERS: [&str; 5] = ["Line", "Part", "Description", "Qty", "Material"];

/// Report-generation collaborator.
pub trait ReportGenerator {
    fn generate(
        &mut self,
        header: &ReportHeader,
        row_count: usize,
        rows: &[Vec<String>],
        out_dir: &Path,
    ) -> AppResult<PathBuf>;
}

/// Writes `work_order_<job>.pdf` into the output directory.
#[derive(Debug, Default)]
pub struct PdfReportGenerator;

impl PdfReportGenerator {
    pub fn file_name(job_number: &str) -> String {
        let safe: String = job_number
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("work_order_{safe}.pdf")
    }
}

impl ReportGenerator for PdfReportGenerator {
    fn generate(
        &mut self,
        header: &ReportHeader,
        row_count: usize,
        rows: &[Vec<String>],
        out_dir: &Path,
    ) -> AppResult<PathBuf> {
        if !out_dir.is_dir() {
            return Err(AppError::Report(format!(
                "output directory does not exist: {}",
                out_dir.display()
            )));
        }

        let path = out_dir.join(Self::file_name(&header.job_number));
        info(format!("Generating work order: {}", path.display()));

        let mut header_lines = header.lines();
        header_lines.push(format!(
            "Printed: {}  ({} line(s))",
            Local::now().format("%Y-%m-%d %H:%M"),
            row_count
        ));

        let mut pdf = PdfManager::new();
        pdf.write_table("Work Order", &header_lines, &LINE_HEADERS, rows);
        pdf.save(&path)
            .map_err(|e| AppError::Report(format!("PDF export error: {e}")))?;

        Ok(path)
    }
}
