use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};
use tracing::debug;

/// Ensure that the `log` table exists. Migrations record themselves there.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Work orders, their report lines and the material catalogue.
fn create_schedule_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS work_orders (
            job_ref      TEXT PRIMARY KEY,
            job_number   TEXT NOT NULL UNIQUE,
            queue        TEXT NOT NULL,
            priority     INTEGER NOT NULL DEFAULT 0,
            description  TEXT NOT NULL DEFAULT '',
            material     TEXT NOT NULL DEFAULT '',
            material_qty TEXT NOT NULL DEFAULT '',
            running      INTEGER,
            finished     INTEGER,
            modifying    INTEGER,
            notes        TEXT NOT NULL DEFAULT '',
            customer     TEXT NOT NULL DEFAULT '',
            due_date     TEXT NOT NULL DEFAULT '',
            visible      INTEGER NOT NULL DEFAULT 1
        );

        CREATE INDEX IF NOT EXISTS idx_work_orders_queue ON work_orders(queue, visible, priority);

        CREATE TABLE IF NOT EXISTS work_order_lines (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            job_ref     TEXT NOT NULL REFERENCES work_orders(job_ref),
            line_no     INTEGER NOT NULL,
            part_number TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            quantity    INTEGER NOT NULL DEFAULT 0,
            material    TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_work_order_lines_job ON work_order_lines(job_ref, line_no);

        CREATE TABLE IF NOT EXISTS materials (
            name TEXT PRIMARY KEY
        );
        "#,
    )?;
    Ok(())
}

/// Uploaded paperwork, one document per job.
fn create_attachment_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS work_order_pdfs (
            job_ref     TEXT PRIMARY KEY REFERENCES work_orders(job_ref),
            pdf         BLOB NOT NULL,
            uploaded_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

type Migration = (&'static str, &'static str, fn(&Connection) -> Result<()>);

const MIGRATIONS: &[Migration] = &[
    (
        "20260914_0001_create_schedule_tables",
        "Created work_orders, work_order_lines and materials",
        create_schedule_tables,
    ),
    (
        "20261002_0002_create_work_order_pdfs",
        "Created work_order_pdfs",
        create_attachment_table,
    ),
];

/// Public entry point: run all pending migrations.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    for (version, message, apply) in MIGRATIONS {
        if migration_applied(conn, version)? {
            debug!(version, "migration already applied");
            continue;
        }

        apply(conn)?;
        mark_applied(conn, version, message)?;
        success(format!("Migration applied: {version}"));
    }

    Ok(())
}
