use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::schedule::view::ViewSync;
use crate::schedule::{
    DiffSync, EventSink, LoopStatus, RebuildSync, ScheduleBoard, ScheduleEvent, StopReason,
};
use crate::ui::messages::{attention, error, info, success, warning};
use crate::ui::prompt::StdinPrompt;
use crate::ui::table::TerminalPresenter;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// Print every pending schedule event.
pub fn report_events(rx: &Receiver<ScheduleEvent>) {
    for event in rx.try_iter() {
        match event {
            ScheduleEvent::Attention { queue, rows } => {
                attention(format!("Queue '{queue}' changed ({rows} job(s))"))
            }
            ScheduleEvent::FetchFailed { queue, reason } => {
                error(format!("Polling of '{queue}' stopped: {reason}"))
            }
            ScheduleEvent::EditCommitted { job } => success(format!("Job {job} saved")),
            ScheduleEvent::EditFailed { job, reason } => {
                error(format!("Job {job} not saved: {reason}"))
            }
            ScheduleEvent::EditConflict { job } => warning(format!(
                "Job {job} changed upstream while being edited; your values are kept"
            )),
            ScheduleEvent::EditDiscarded { job } => {
                warning(format!("Job {job} left the queue; its unsaved edits were dropped"))
            }
            ScheduleEvent::ActionSucceeded { job, action } => {
                success(format!("Job {job}: {action} done"))
            }
            ScheduleEvent::ActionFailed {
                job,
                action,
                reason,
            } => error(format!("Job {job}: {action} failed: {reason}")),
        }
    }
}

/// Keep a queue on screen until interrupted, or for `--ticks` polls.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Watch {
        queue,
        interval,
        ticks,
        diff,
    } = cmd
    {
        let queue = super::queue_or_default(queue, cfg);
        let interval = Duration::from_millis(interval.unwrap_or(cfg.poll_interval_ms));
        let store = super::open_store(cfg)?;

        let presenter = Box::new(TerminalPresenter::new(
            &format!("Queue: {queue}"),
            ticks.is_none(),
        ));
        let view: Box<dyn ViewSync> = if *diff {
            Box::new(DiffSync::new(presenter))
        } else {
            Box::new(RebuildSync::new(presenter))
        };

        let (events, rx) = EventSink::channel();
        let mut board = ScheduleBoard::open(&queue, store, view, events)?;
        board.start(interval);

        loop {
            let status = board.run(*ticks, |_| report_events(&rx));
            report_events(&rx);

            match status {
                LoopStatus::Stopped(StopReason::FetchFailed(_)) if ticks.is_none() => {
                    if !StdinPrompt::new().confirm("Press Enter to resume polling, or q to quit") {
                        break;
                    }
                    board.resume();
                    report_events(&rx);
                }
                LoopStatus::Running => {
                    board.stop();
                    break;
                }
                _ => break,
            }
        }

        info(format!("Stopped watching '{queue}'."));
    }
    Ok(())
}
