use crate::db::access::Rowset;
use crate::errors::{AppError, AppResult};
use crate::models::ScheduleRow;
use serde::Serialize;
use std::collections::HashSet;

/// One complete poll result: the queue's rows in display order.
///
/// Equality is field-for-field and order-sensitive, since order drives the
/// display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    rows: Vec<ScheduleRow>,
}

impl Snapshot {
    /// Build a snapshot, rejecting duplicated job numbers.
    pub fn new(rows: Vec<ScheduleRow>) -> AppResult<Self> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !seen.insert(row.job_number.as_str()) {
                return Err(AppError::MalformedRowset(format!(
                    "job {} appears more than once",
                    row.job_number
                )));
            }
        }
        Ok(Self { rows })
    }

    pub fn from_rowset(rowset: &Rowset) -> AppResult<Self> {
        let rows = rowset
            .rows
            .iter()
            .map(|r| ScheduleRow::from_record(r))
            .collect::<AppResult<Vec<_>>>()?;
        Self::new(rows)
    }

    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, job_number: &str) -> Option<&ScheduleRow> {
        self.rows.iter().find(|r| r.job_number == job_number)
    }

    pub fn contains(&self, job_number: &str) -> bool {
        self.get(job_number).is_some()
    }

    pub fn job_numbers(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.job_number.as_str())
    }
}
