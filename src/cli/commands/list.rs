use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::schedule::reconcile::fetch_snapshot;
use crate::schedule::{EventSink, RebuildSync, ScheduleBoard};
use crate::ui::table::TerminalPresenter;

/// Show a queue once, as a table or as JSON.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List { queue, json } = cmd {
        let queue = super::queue_or_default(queue, cfg);
        let mut store = super::open_store(cfg)?;

        if *json {
            let snapshot = fetch_snapshot(&mut store, &queue)?;
            let out = serde_json::to_string_pretty(&snapshot)
                .map_err(|e| AppError::Other(format!("JSON error: {e}")))?;
            println!("{out}");
            return Ok(());
        }

        let presenter = TerminalPresenter::new(&format!("Queue: {queue}"), false);
        ScheduleBoard::open(
            &queue,
            store,
            Box::new(RebuildSync::new(Box::new(presenter))),
            EventSink::disconnected(),
        )?;
    }
    Ok(())
}
