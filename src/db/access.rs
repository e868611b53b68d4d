//! Data-access seam used by the schedule core.
//!
//! The core never sees SQL: it asks for a named, parameterized query and gets
//! back an ordered rowset of loosely typed values, or an error.

use crate::errors::AppResult;
use rusqlite::types::Value;

/// Named queries the schedule depends on, by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryName {
    /// `[queue]` → schedule rows (at least 10 positional columns).
    FetchSchedule,
    /// `[job_ref]` → one row when an attachment exists.
    CheckAttachment,
    /// `[job_ref]` → hides the job from every queue.
    FinishJob,
    /// `[job_ref]` → toggles the "modifying" flag.
    MarkJobModified,
    /// `[job_ref, priority, material, material_qty]`
    UpdateJobFields,
    /// `[job_ref, bytes]`
    InsertAttachment,
    /// `[job_ref]` → `(bytes)`
    FetchAttachment,
    /// `[job_ref]` → `(customer, job_number, due)`
    FetchReportHeader,
    /// `[job_ref]` → report line items
    FetchReportLines,
    /// `[prefix]` → material names
    ListMaterials,
}

impl QueryName {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryName::FetchSchedule => "work_schedule",
            QueryName::CheckAttachment => "work_order_pdf_check",
            QueryName::FinishJob => "finish_work_order",
            QueryName::MarkJobModified => "modify_work_order",
            QueryName::UpdateJobFields => "update_work_order",
            QueryName::InsertAttachment => "insert_pdf",
            QueryName::FetchAttachment => "get_pdf",
            QueryName::FetchReportHeader => "report_header_data",
            QueryName::FetchReportLines => "report_data",
            QueryName::ListMaterials => "material_names",
        }
    }

    /// True for queries that modify the store.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            QueryName::FinishJob
                | QueryName::MarkJobModified
                | QueryName::UpdateJobFields
                | QueryName::InsertAttachment
        )
    }
}

/// Result of one named query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rowset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Rows touched by a write; 0 for reads.
    pub affected: usize,
}

impl Rowset {
    pub fn from_rows(rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: Vec::new(),
            rows,
            affected: 0,
        }
    }

    pub fn written(affected: usize) -> Self {
        Self {
            affected,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&[Value]> {
        self.rows.first().map(Vec::as_slice)
    }
}

/// Anything able to run the schedule's named queries.
pub trait DataAccess {
    fn query(&mut self, name: QueryName, params: &[Value]) -> AppResult<Rowset>;
}

impl<T: DataAccess + ?Sized> DataAccess for &mut T {
    fn query(&mut self, name: QueryName, params: &[Value]) -> AppResult<Rowset> {
        (**self).query(name, params)
    }
}

impl<T: DataAccess + ?Sized> DataAccess for Box<T> {
    fn query(&mut self, name: QueryName, params: &[Value]) -> AppResult<Rowset> {
        (**self).query(name, params)
    }
}

/// Render a loosely typed column as display text. `NULL` becomes "".
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

/// Shorthand for building text parameters.
pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}
