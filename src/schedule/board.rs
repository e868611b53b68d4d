//! One queue's schedule screen: the single owner of the loop, the view, the
//! open edit sessions and the data-access handle.

use crate::config::Settings;
use crate::db::access::DataAccess;
use crate::errors::{AppError, AppResult};
use crate::schedule::actions::{self, ReportOutcome, ReportServices};
use crate::schedule::edit::{CommitOutcome, EditBook, EditField};
use crate::schedule::events::{EventSink, ScheduleEvent};
use crate::schedule::reconcile::{LoopStatus, PollOutcome, ReconciliationLoop};
use crate::schedule::snapshot::Snapshot;
use crate::schedule::view::{RowState, SyncContext, SyncReport, ViewSync};
use crate::ui::prompt::Prompt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Build a [`SyncContext`] from disjoint fields of the board.
macro_rules! sync_ctx {
    ($board:expr) => {
        SyncContext {
            data: &mut $board.data,
            edits: &mut $board.edits,
            events: &$board.events,
        }
    };
}

pub struct ScheduleBoard<D: DataAccess> {
    data: D,
    poller: ReconciliationLoop,
    view: Box<dyn ViewSync>,
    edits: EditBook,
    events: EventSink,
}

impl<D: DataAccess> ScheduleBoard<D> {
    /// Construct the board and run the synchronous initial load.
    pub fn open(
        queue: &str,
        data: D,
        view: Box<dyn ViewSync>,
        events: EventSink,
    ) -> AppResult<Self> {
        let mut board = Self {
            data,
            poller: ReconciliationLoop::new(queue),
            view,
            edits: EditBook::new(),
            events,
        };
        let mut ctx = sync_ctx!(board);
        board.poller.load_initial(board.view.as_mut(), &mut ctx)?;
        Ok(board)
    }

    pub fn queue(&self) -> &str {
        self.poller.queue()
    }

    pub fn start(&mut self, interval: Duration) {
        self.poller.start(interval);
    }

    pub fn stop(&mut self) {
        self.poller.stop();
    }

    pub fn status(&self) -> &LoopStatus {
        self.poller.status()
    }

    pub fn tick(&mut self) -> PollOutcome {
        let mut ctx = sync_ctx!(self);
        self.poller.tick(self.view.as_mut(), &mut ctx)
    }

    pub fn resume(&mut self) -> PollOutcome {
        let mut ctx = sync_ctx!(self);
        self.poller.resume(self.view.as_mut(), &mut ctx)
    }

    /// Drive ticks at the loop's interval until it stops, or until
    /// `max_ticks` ticks have run.
    pub fn run<F>(&mut self, max_ticks: Option<usize>, mut on_tick: F) -> LoopStatus
    where
        F: FnMut(&PollOutcome),
    {
        let mut ticks = 0;
        while self.poller.is_running() && max_ticks.is_none_or(|max| ticks < max) {
            thread::sleep(self.poller.interval());
            let outcome = self.tick();
            on_tick(&outcome);
            ticks += 1;
        }
        self.poller.status().clone()
    }

    pub fn rows(&self) -> &[RowState] {
        self.view.rows()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.poller.current()
    }

    pub fn edits(&self) -> &EditBook {
        &self.edits
    }

    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    fn job_ref(&self, job: &str) -> AppResult<String> {
        self.poller
            .current()
            .and_then(|s| s.get(job))
            .map(|r| r.job_ref.clone())
            .ok_or_else(|| AppError::NotFound(job.to_string()))
    }

    /// Buffer a field change locally and show the row as dirty.
    pub fn edit_field(&mut self, job: &str, field: EditField, value: &str) -> AppResult<()> {
        let row = self
            .poller
            .current()
            .and_then(|s| s.get(job))
            .ok_or_else(|| AppError::NotFound(job.to_string()))?;
        self.edits.begin(row, field, value);
        self.view.refresh_row(job, &self.edits);
        Ok(())
    }

    /// Persist the row's buffered fields. Outcomes are also reported as events.
    pub fn commit(&mut self, job: &str) -> AppResult<CommitOutcome> {
        let result = self.edits.commit(job, &mut self.data);
        match &result {
            Ok(CommitOutcome::Committed(fields)) => {
                self.events.emit(ScheduleEvent::EditCommitted {
                    job: job.to_string(),
                });
                self.view.settle_row(job, fields, &self.edits);
            }
            Ok(CommitOutcome::NothingToCommit) => {}
            Err(e) => {
                self.events.emit(ScheduleEvent::EditFailed {
                    job: job.to_string(),
                    reason: e.to_string(),
                });
                self.view.refresh_row(job, &self.edits);
            }
        }
        result
    }

    /// Drop the row's local edits. Returns whether there were any.
    pub fn revert(&mut self, job: &str) -> bool {
        let had = self.edits.revert(job).is_some();
        self.view.refresh_row(job, &self.edits);
        had
    }

    /// Re-apply the current snapshot, re-checking attachments.
    pub fn rebuild(&mut self) -> Option<SyncReport> {
        let snapshot = self.poller.current()?;
        let mut ctx = sync_ctx!(self);
        Some(self.view.apply(snapshot, &mut ctx))
    }

    pub fn hide(&mut self, job: &str) -> AppResult<()> {
        let job_ref = self.job_ref(job)?;
        actions::hide_job(&mut self.data, job, &job_ref, &self.events)
    }

    pub fn mark_modified(&mut self, job: &str) -> AppResult<()> {
        let job_ref = self.job_ref(job)?;
        actions::mark_modified(&mut self.data, job, &job_ref, &self.events)
    }

    pub fn upload(
        &mut self,
        job: &str,
        file: Option<&Path>,
        settings: &mut dyn Settings,
        prompt: &mut dyn Prompt,
    ) -> AppResult<Option<PathBuf>> {
        let job_ref = self.job_ref(job)?;
        let uploaded = actions::upload_attachment(
            &mut self.data,
            job,
            &job_ref,
            file,
            settings,
            prompt,
            &self.events,
        )?;
        if uploaded.is_some() {
            self.rebuild();
        }
        Ok(uploaded)
    }

    pub fn print(&mut self, job: &str, services: &mut ReportServices<'_>) -> AppResult<ReportOutcome> {
        let job_ref = self.job_ref(job)?;
        actions::print_report(&mut self.data, job, &job_ref, services, &self.events)
    }

    pub fn material_suggestions(&mut self, prefix: &str) -> AppResult<Vec<String>> {
        actions::material_suggestions(&mut self.data, prefix)
    }
}
