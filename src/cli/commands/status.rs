use crate::cli::parser::{Commands, FlagValue};
use crate::config::Config;
use crate::db::log::ttlog;
use crate::db::queries::{lookup_job, set_status_flag};
use crate::errors::{AppError, AppResult};
use crate::models::Flag;
use crate::ui::messages::{success, warning};

impl From<FlagValue> for Flag {
    fn from(v: FlagValue) -> Self {
        match v {
            FlagValue::On => Flag::On,
            FlagValue::Off => Flag::Off,
            FlagValue::Unset => Flag::Unset,
        }
    }
}

/// Handle `status`: set running / finished / modifying on a job.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Status { job, flag, value } = cmd {
        let store = super::open_store(cfg)?;
        let location = lookup_job(&store.conn, job)?;
        let flag_value = Flag::from(*value);

        let changed = set_status_flag(&store.conn, &location.job_ref, flag.column(), flag_value.to_db())?;
        if changed == 0 {
            return Err(AppError::NotFound(job.clone()));
        }

        let message = format!("{} set to {:?}", flag.column(), flag_value);
        if let Err(e) = ttlog(&store.conn, "status", job, &message) {
            warning(format!("Failed to write internal log: {e}"));
        }
        success(format!("Job {job}: {message}"));
    }
    Ok(())
}
