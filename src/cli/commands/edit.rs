use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::queries::lookup_job;
use crate::errors::AppResult;
use crate::schedule::edit::CommitOutcome;
use crate::schedule::{EditField, EventSink, NullPresenter, RebuildSync, ScheduleBoard};
use crate::ui::messages::{success, warning};
use crate::ui::table::render_rows;

/// Edit priority / material / quantity of one job and commit in one write.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Edit {
        job,
        priority,
        material,
        qty,
    } = cmd
    {
        let changes: Vec<(EditField, &String)> = [
            (EditField::Priority, priority),
            (EditField::Material, material),
            (EditField::MaterialQty, qty),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_ref().map(|v| (field, v)))
        .collect();

        if changes.is_empty() {
            warning("Nothing to edit: pass --priority, --material or --qty.");
            return Ok(());
        }

        let store = super::open_store(cfg)?;
        let location = lookup_job(&store.conn, job)?;

        let mut board = ScheduleBoard::open(
            &location.queue,
            store,
            Box::new(RebuildSync::new(Box::new(NullPresenter))),
            EventSink::disconnected(),
        )?;

        for (field, value) in changes {
            board.edit_field(job, field, value)?;
        }

        if let CommitOutcome::Committed(_) = board.commit(job)? {
            success(format!("Job {job} saved"));
            if let Some(row) = board.rows().iter().find(|r| r.job_number() == job) {
                print!("{}", render_rows(std::slice::from_ref(row)));
            }
        }
    }
    Ok(())
}
