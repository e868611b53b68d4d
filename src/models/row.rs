use super::status::{Flag, RowStyle};
use crate::db::access::value_text;
use crate::errors::{AppError, AppResult};
use rusqlite::types::Value;
use serde::Serialize;

/// Number of positional columns the schedule query must return.
pub const SCHEDULE_COLUMNS: usize = 10;

/// One unit of work in a queue.
///
/// Decoded positionally from the schedule query:
/// `priority, job_number, description, material, material_qty,
///  running, finished, modifying, job_ref, notes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRow {
    pub priority: i64,
    pub job_number: String,
    pub description: String,
    pub material: String,
    pub material_qty: String,
    pub running: Flag,
    pub finished: Flag,
    pub modifying: Flag,
    pub job_ref: String,
    pub notes: String,
}

impl ScheduleRow {
    pub fn from_record(record: &[Value]) -> AppResult<Self> {
        if record.len() < SCHEDULE_COLUMNS {
            return Err(AppError::MalformedRowset(format!(
                "expected {SCHEDULE_COLUMNS} columns, got {}",
                record.len()
            )));
        }

        let job_number = value_text(&record[1]);
        let priority = parse_priority(&record[0]).ok_or_else(|| {
            AppError::MalformedRowset(format!(
                "job {job_number}: priority '{}' is not an integer",
                value_text(&record[0])
            ))
        })?;

        Ok(Self {
            priority,
            job_number,
            description: value_text(&record[2]),
            material: value_text(&record[3]),
            material_qty: value_text(&record[4]),
            running: Flag::from_value(&record[5]),
            finished: Flag::from_value(&record[6]),
            modifying: Flag::from_value(&record[7]),
            job_ref: value_text(&record[8]),
            notes: value_text(&record[9]),
        })
    }

    /// Priority as shown to operators: zero-padded to three digits.
    pub fn priority_display(&self) -> String {
        format!("{:03}", self.priority)
    }

    pub fn style(&self) -> RowStyle {
        RowStyle::from_flags(self.running, self.finished, self.modifying)
    }
}

fn parse_priority(v: &Value) -> Option<i64> {
    match v {
        Value::Null => Some(0),
        Value::Integer(i) => Some(*i),
        Value::Real(f) if f.fract() == 0.0 => Some(*f as i64),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}
