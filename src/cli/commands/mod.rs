pub mod add;
pub mod config;
pub mod edit;
pub mod init;
pub mod list;
pub mod log;
pub mod rows;
pub mod status;
pub mod watch;

use crate::config::Config;
use crate::db::SqliteStore;
use crate::errors::AppResult;

/// Open the configured database, applying pending migrations.
pub(crate) fn open_store(cfg: &Config) -> AppResult<SqliteStore> {
    SqliteStore::open_initialized(&cfg.database)
}

pub(crate) fn queue_or_default(queue: &Option<String>, cfg: &Config) -> String {
    queue.clone().unwrap_or_else(|| cfg.default_queue.clone())
}
