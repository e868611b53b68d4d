//! The polling engine.
//!
//! A poll is two-phase: [`ReconciliationLoop::begin_poll`] hands out a ticket
//! and [`ReconciliationLoop::complete_poll`] applies its result. Only one ticket
//! is outstanding at a time, and `stop()` invalidates it, so a fetch finishing
//! after a stop is dropped instead of applied. [`ReconciliationLoop::tick`]
//! runs both phases back to back on the caller's thread.

use crate::db::access::{DataAccess, QueryName, text};
use crate::errors::{AppError, AppResult};
use crate::schedule::events::ScheduleEvent;
use crate::schedule::snapshot::Snapshot;
use crate::schedule::view::{SyncContext, SyncReport, ViewSync};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    FetchFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStatus {
    /// Constructed, never started.
    Idle,
    Running,
    Stopped(StopReason),
}

/// Proof that a poll was started; needed to complete it.
#[derive(Debug, PartialEq, Eq)]
pub struct PollTicket {
    generation: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PollStart {
    Started(PollTicket),
    /// A fetch is already outstanding.
    Skipped,
    /// The loop is not running.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Fetched snapshot equals the current one.
    Unchanged,
    Applied(SyncReport),
    /// Fetch failed; the loop is now stopped.
    Failed(String),
    /// Result arrived for a ticket invalidated by `stop()`.
    Discarded,
    Skipped,
    Stopped,
}

/// Run the schedule query for `queue` and decode it.
pub fn fetch_snapshot(data: &mut dyn DataAccess, queue: &str) -> AppResult<Snapshot> {
    let rowset = data
        .query(QueryName::FetchSchedule, &[text(queue)])
        .map_err(|e| AppError::fetch(queue, e))?;
    Snapshot::from_rowset(&rowset).map_err(|e| AppError::fetch(queue, e))
}

pub struct ReconciliationLoop {
    queue: String,
    interval: Duration,
    status: LoopStatus,
    current: Option<Snapshot>,
    generation: u64,
    in_flight: Option<u64>,
}

impl ReconciliationLoop {
    pub fn new(queue: &str) -> Self {
        Self {
            queue: queue.to_string(),
            interval: DEFAULT_INTERVAL,
            status: LoopStatus::Idle,
            current: None,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn status(&self) -> &LoopStatus {
        &self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == LoopStatus::Running
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    /// Synchronous fetch-and-apply, run once before polling starts.
    /// Does not raise the attention signal.
    pub fn load_initial(
        &mut self,
        view: &mut dyn ViewSync,
        ctx: &mut SyncContext<'_>,
    ) -> AppResult<SyncReport> {
        let snapshot = fetch_snapshot(&mut *ctx.data, &self.queue)?;
        let report = view.apply(&snapshot, ctx);
        info!(queue = %self.queue, rows = snapshot.len(), "initial schedule loaded");
        self.current = Some(snapshot);
        Ok(report)
    }

    /// Begin periodic polling at a fixed interval.
    pub fn start(&mut self, interval: Duration) {
        self.interval = interval;
        if !self.is_running() {
            debug!(queue = %self.queue, ?interval, "polling started");
        }
        self.status = LoopStatus::Running;
    }

    /// Cancel polling. Idempotent, and safe while a fetch is outstanding.
    pub fn stop(&mut self) {
        self.generation += 1;
        self.in_flight = None;
        if self.is_running() {
            debug!(queue = %self.queue, "polling stopped");
            self.status = LoopStatus::Stopped(StopReason::Requested);
        }
    }

    pub fn begin_poll(&mut self) -> PollStart {
        if !self.is_running() {
            return PollStart::Stopped;
        }
        if self.in_flight.is_some() {
            debug!(queue = %self.queue, "poll skipped, fetch outstanding");
            return PollStart::Skipped;
        }
        self.in_flight = Some(self.generation);
        PollStart::Started(PollTicket {
            generation: self.generation,
        })
    }

    pub fn complete_poll(
        &mut self,
        ticket: PollTicket,
        fetched: AppResult<Snapshot>,
        view: &mut dyn ViewSync,
        ctx: &mut SyncContext<'_>,
    ) -> PollOutcome {
        if ticket.generation != self.generation || self.in_flight != Some(ticket.generation) {
            debug!(queue = %self.queue, "late poll result discarded");
            return PollOutcome::Discarded;
        }
        self.in_flight = None;

        let snapshot = match fetched {
            Ok(s) => s,
            Err(e) => {
                let reason = e.to_string();
                warn!(queue = %self.queue, error = %reason, "fetch failed, polling stopped");
                self.status = LoopStatus::Stopped(StopReason::FetchFailed(reason.clone()));
                ctx.events.emit(ScheduleEvent::FetchFailed {
                    queue: self.queue.clone(),
                    reason: reason.clone(),
                });
                return PollOutcome::Failed(reason);
            }
        };

        if self.current.as_ref() == Some(&snapshot) {
            return PollOutcome::Unchanged;
        }

        let report = view.apply(&snapshot, ctx);
        info!(queue = %self.queue, rows = snapshot.len(), "schedule changed");
        ctx.events.emit(ScheduleEvent::Attention {
            queue: self.queue.clone(),
            rows: snapshot.len(),
        });
        self.current = Some(snapshot);
        PollOutcome::Applied(report)
    }

    /// One timer tick: begin, fetch and complete a poll on this thread.
    pub fn tick(&mut self, view: &mut dyn ViewSync, ctx: &mut SyncContext<'_>) -> PollOutcome {
        match self.begin_poll() {
            PollStart::Started(ticket) => {
                let fetched = fetch_snapshot(&mut *ctx.data, &self.queue);
                self.complete_poll(ticket, fetched, view, ctx)
            }
            PollStart::Skipped => PollOutcome::Skipped,
            PollStart::Stopped => PollOutcome::Stopped,
        }
    }

    /// Manual trigger: restart polling at the same interval and poll once.
    pub fn resume(&mut self, view: &mut dyn ViewSync, ctx: &mut SyncContext<'_>) -> PollOutcome {
        self.start(self.interval);
        self.tick(view, ctx)
    }
}
