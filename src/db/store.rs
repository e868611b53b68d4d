//! SQLite-backed implementation of the data-access collaborator.

use crate::db::access::{DataAccess, QueryName, Rowset, value_text};
use crate::db::initialize::init_db;
use crate::db::log::ttlog;
use crate::db::queries::sql_for;
use crate::errors::{AppError, AppResult};
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use std::path::Path;
use tracing::{debug, warn};

pub struct SqliteStore {
    pub conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> AppResult<Self> {
        let conn = Connection::open(Path::new(path))?;
        Ok(Self { conn })
    }

    /// Open and bring the schema up to date.
    pub fn open_initialized(path: &str) -> AppResult<Self> {
        let store = Self::open(path)?;
        init_db(&store.conn)?;
        Ok(store)
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    /// Helper to execute a closure with a mutable connection reference.
    pub fn with_conn<F, T>(&mut self, func: F) -> AppResult<T>
    where
        F: FnOnce(&mut Connection) -> AppResult<T>,
    {
        func(&mut self.conn)
    }

    fn read(&self, name: QueryName, params: &[Value]) -> AppResult<Rowset> {
        let mut stmt = self.conn.prepare_cached(sql_for(name))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(width);
            for i in 0..width {
                record.push(row.get::<_, Value>(i)?);
            }
            out.push(record);
        }

        Ok(Rowset {
            columns,
            rows: out,
            affected: 0,
        })
    }

    fn write(&self, name: QueryName, params: &[Value]) -> AppResult<Rowset> {
        let target = params.first().map(value_text).unwrap_or_default();
        let affected = self
            .conn
            .prepare_cached(sql_for(name))?
            .execute(params_from_iter(params.iter()))?;

        if affected == 0 {
            return Err(AppError::NotFound(target));
        }

        if let Err(e) = ttlog(
            &self.conn,
            name.as_str(),
            &target,
            &format!("{affected} row(s) written"),
        ) {
            warn!(error = %e, "failed to write internal log");
        }

        Ok(Rowset::written(affected))
    }
}

impl DataAccess for SqliteStore {
    fn query(&mut self, name: QueryName, params: &[Value]) -> AppResult<Rowset> {
        debug!(query = name.as_str(), params = params.len(), "running named query");
        if name.is_write() {
            self.write(name, params)
        } else {
            self.read(name, params)
        }
    }
}
