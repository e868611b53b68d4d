use crate::db::access::QueryName;
use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, params};

/// SQL text behind each named query. Parameters are positional (`?1`, `?2`, ...).
pub fn sql_for(name: QueryName) -> &'static str {
    match name {
        QueryName::FetchSchedule => {
            "SELECT priority, job_number, description, material, material_qty,
                    running, finished, modifying, job_ref, notes
             FROM work_orders
             WHERE queue = ?1 AND visible = 1
             ORDER BY priority ASC, job_number ASC"
        }
        QueryName::CheckAttachment => "SELECT 1 FROM work_order_pdfs WHERE job_ref = ?1",
        QueryName::FinishJob => "UPDATE work_orders SET visible = 0 WHERE job_ref = ?1",
        QueryName::MarkJobModified => {
            "UPDATE work_orders
             SET modifying = CASE WHEN modifying = 1 THEN 0 ELSE 1 END
             WHERE job_ref = ?1"
        }
        QueryName::UpdateJobFields => {
            "UPDATE work_orders
             SET priority = ?2, material = ?3, material_qty = ?4
             WHERE job_ref = ?1"
        }
        QueryName::InsertAttachment => {
            "INSERT INTO work_order_pdfs (job_ref, pdf, uploaded_at)
             SELECT ?1, ?2, datetime('now')
             WHERE EXISTS (SELECT 1 FROM work_orders WHERE job_ref = ?1)
             ON CONFLICT(job_ref) DO UPDATE SET pdf = excluded.pdf, uploaded_at = excluded.uploaded_at"
        }
        QueryName::FetchAttachment => "SELECT pdf FROM work_order_pdfs WHERE job_ref = ?1",
        QueryName::FetchReportHeader => {
            "SELECT customer, job_number, due_date FROM work_orders WHERE job_ref = ?1"
        }
        QueryName::FetchReportLines => {
            "SELECT line_no, part_number, description, quantity, material
             FROM work_order_lines
             WHERE job_ref = ?1
             ORDER BY line_no ASC"
        }
        QueryName::ListMaterials => {
            "SELECT name FROM materials WHERE name LIKE ?1 || '%' ORDER BY name ASC"
        }
    }
}

/// A work order as entered by the scheduler.
#[derive(Debug, Clone, Default)]
pub struct NewWorkOrder {
    pub job_ref: String,
    pub job_number: String,
    pub queue: String,
    pub priority: i64,
    pub description: String,
    pub material: String,
    pub material_qty: String,
    pub notes: String,
    pub customer: String,
    pub due_date: String,
}

pub fn insert_work_order(conn: &Connection, wo: &NewWorkOrder) -> AppResult<()> {
    conn.execute(
        "INSERT INTO work_orders
            (job_ref, job_number, queue, priority, description, material,
             material_qty, notes, customer, due_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            wo.job_ref,
            wo.job_number,
            wo.queue,
            wo.priority,
            wo.description,
            wo.material,
            wo.material_qty,
            wo.notes,
            wo.customer,
            wo.due_date,
        ],
    )?;
    Ok(())
}

pub fn insert_report_line(
    conn: &Connection,
    job_ref: &str,
    line_no: i64,
    part_number: &str,
    description: &str,
    quantity: i64,
    material: &str,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO work_order_lines (job_ref, line_no, part_number, description, quantity, material)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![job_ref, line_no, part_number, description, quantity, material],
    )?;
    Ok(())
}

pub fn insert_material(conn: &Connection, name: &str) -> AppResult<()> {
    conn.execute("INSERT OR IGNORE INTO materials (name) VALUES (?1)", [name])?;
    Ok(())
}

/// Set one of the status flags (`running`, `finished`, `modifying`).
pub fn set_status_flag(
    conn: &Connection,
    job_ref: &str,
    flag: &str,
    value: Option<bool>,
) -> AppResult<usize> {
    let column = match flag {
        "running" | "finished" | "modifying" => flag,
        other => return Err(AppError::Other(format!("Unknown flag: {other}"))),
    };
    let sql = format!("UPDATE work_orders SET {column} = ?1 WHERE job_ref = ?2");
    let changed = conn.execute(&sql, params![value.map(i64::from), job_ref])?;
    Ok(changed)
}

/// Where a job lives: its reference and the queue it is scheduled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLocation {
    pub job_ref: String,
    pub queue: String,
}

/// Resolve a job number to its reference and queue, hidden jobs included.
pub fn lookup_job(conn: &Connection, job_number: &str) -> AppResult<JobLocation> {
    let mut stmt =
        conn.prepare_cached("SELECT job_ref, queue FROM work_orders WHERE job_number = ?1")?;
    let mut rows = stmt.query([job_number])?;
    match rows.next()? {
        Some(row) => Ok(JobLocation {
            job_ref: row.get(0)?,
            queue: row.get(1)?,
        }),
        None => Err(AppError::NotFound(job_number.to_string())),
    }
}
