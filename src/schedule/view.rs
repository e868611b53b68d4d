//! Turning an applied snapshot into row operations for the presentation layer.
//!
//! Two policies sit behind [`ViewSync`]:
//!
//! * [`RebuildSync`] tears every row down and rebuilds the list in snapshot
//!   order. Simple, and the default.
//! * [`DiffSync`] matches rows by job number and only emits the inserts,
//!   removals and updates needed to reach the new order.
//!
//! Both keep open edit sessions alive: the buffered values are laid over the
//! freshly fetched row and the row stays dirty.

use crate::db::access::{DataAccess, QueryName, text};
use crate::models::{RowStyle, ScheduleRow};
use crate::schedule::edit::{EditBook, EditableFields, validate_priority};
use crate::schedule::events::{EventSink, ScheduleEvent};
use crate::schedule::snapshot::Snapshot;
use std::collections::HashSet;
use tracing::debug;

/// A materialized row: fetched data plus local presentation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowState {
    pub data: ScheduleRow,
    pub dirty: bool,
    pub conflict: bool,
    /// Enables the print affordance.
    pub has_document: bool,
    /// Locally buffered values, shown instead of `data`'s while dirty.
    pub pending: Option<EditableFields>,
}

impl RowState {
    pub fn job_number(&self) -> &str {
        &self.data.job_number
    }

    pub fn style(&self) -> RowStyle {
        self.data.style()
    }

    /// Fields as the operator should see them right now.
    pub fn display_fields(&self) -> EditableFields {
        self.pending
            .clone()
            .unwrap_or_else(|| EditableFields::of(&self.data))
    }

    fn with_edits(mut self, edits: &EditBook) -> Self {
        match edits.session(&self.data.job_number) {
            Some(s) if s.is_dirty() => {
                self.dirty = true;
                self.conflict = s.conflict;
                self.pending = Some(s.pending.clone());
            }
            _ => {
                self.dirty = false;
                self.conflict = false;
                self.pending = None;
            }
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOp {
    /// Drop every row presentation.
    Clear,
    Insert { index: usize, row: RowState },
    Update { index: usize, row: RowState },
    Remove { job: String },
    /// Trailing filler that packs rows to the top of the container.
    Spacer,
}

/// Presentation layer collaborator.
pub trait Presenter {
    fn present(&mut self, ops: &[ViewOp]);
}

/// Discards every operation.
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _ops: &[ViewOp]) {}
}

/// Borrowed collaborators a sync pass needs.
pub struct SyncContext<'a> {
    pub data: &'a mut dyn DataAccess,
    pub edits: &'a mut EditBook,
    pub events: &'a EventSink,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub rows: usize,
    pub ops: usize,
    pub discarded: Vec<String>,
    pub conflicts: Vec<String>,
}

/// Secondary per-row check. A failed lookup means "no document".
pub fn has_document(data: &mut dyn DataAccess, job_ref: &str) -> bool {
    match data.query(QueryName::CheckAttachment, &[text(job_ref)]) {
        Ok(rs) => !rs.is_empty(),
        Err(e) => {
            debug!(job_ref, error = %e, "attachment check failed");
            false
        }
    }
}

/// Live rows plus the presenter they are shown on.
pub struct RowTable {
    rows: Vec<RowState>,
    presenter: Box<dyn Presenter>,
    spacer: bool,
}

impl RowTable {
    pub fn new(presenter: Box<dyn Presenter>) -> Self {
        Self {
            rows: Vec::new(),
            presenter,
            spacer: false,
        }
    }

    pub fn rows(&self) -> &[RowState] {
        &self.rows
    }

    /// Review sessions, report discards/conflicts and materialize every row.
    fn materialize(snapshot: &Snapshot, ctx: &mut SyncContext<'_>) -> (Vec<RowState>, SyncReport) {
        let review = ctx.edits.review(snapshot);
        for job in &review.discarded {
            ctx.events.emit(ScheduleEvent::EditDiscarded { job: job.clone() });
        }
        for job in &review.new_conflicts {
            ctx.events.emit(ScheduleEvent::EditConflict { job: job.clone() });
        }

        let mut states = Vec::with_capacity(snapshot.len());
        for row in snapshot.rows() {
            let state = RowState {
                data: row.clone(),
                dirty: false,
                conflict: false,
                has_document: has_document(&mut *ctx.data, &row.job_ref),
                pending: None,
            };
            states.push(state.with_edits(ctx.edits));
        }

        let report = SyncReport {
            rows: states.len(),
            ops: 0,
            discarded: review.discarded,
            conflicts: review.new_conflicts,
        };
        (states, report)
    }

    fn commit(
        &mut self,
        states: Vec<RowState>,
        ops: Vec<ViewOp>,
        mut report: SyncReport,
    ) -> SyncReport {
        if !ops.is_empty() {
            self.presenter.present(&ops);
        }
        report.ops = ops.len();
        self.rows = states;
        report
    }

    /// Re-derive one row's dirty state after an edit transition.
    fn refresh_row(&mut self, job_number: &str, edits: &EditBook) -> bool {
        let Some(index) = self.rows.iter().position(|r| r.job_number() == job_number) else {
            return false;
        };
        let updated = self.rows[index].clone().with_edits(edits);
        if updated == self.rows[index] {
            return false;
        }
        self.rows[index] = updated.clone();
        self.presenter.present(&[ViewOp::Update {
            index,
            row: updated,
        }]);
        true
    }

    /// Show freshly committed values until the next poll confirms them.
    fn settle(&mut self, job_number: &str, committed: &EditableFields, edits: &EditBook) -> bool {
        if let Some(row) = self.rows.iter_mut().find(|r| r.job_number() == job_number) {
            if let Some(priority) = validate_priority(&committed.priority) {
                row.data.priority = priority;
            }
            row.data.material = committed.material.clone();
            row.data.material_qty = committed.material_qty.clone();
        }
        self.refresh_row(job_number, edits)
    }
}

pub trait ViewSync {
    /// Bring the presentation in line with `snapshot`.
    fn apply(&mut self, snapshot: &Snapshot, ctx: &mut SyncContext<'_>) -> SyncReport;

    fn table(&self) -> &RowTable;

    fn table_mut(&mut self) -> &mut RowTable;

    fn rows(&self) -> &[RowState] {
        self.table().rows()
    }

    /// Show or clear one row's dirty highlight. Returns whether it changed.
    fn refresh_row(&mut self, job_number: &str, edits: &EditBook) -> bool {
        self.table_mut().refresh_row(job_number, edits)
    }

    fn settle_row(&mut self, job_number: &str, committed: &EditableFields, edits: &EditBook) -> bool {
        self.table_mut().settle(job_number, committed, edits)
    }
}

/// Full teardown and rebuild on every apply.
pub struct RebuildSync {
    table: RowTable,
}

impl RebuildSync {
    pub fn new(presenter: Box<dyn Presenter>) -> Self {
        Self {
            table: RowTable::new(presenter),
        }
    }
}

impl ViewSync for RebuildSync {
    fn apply(&mut self, snapshot: &Snapshot, ctx: &mut SyncContext<'_>) -> SyncReport {
        let (states, report) = RowTable::materialize(snapshot, ctx);

        let mut ops = Vec::with_capacity(states.len() + 2);
        ops.push(ViewOp::Clear);
        ops.extend(states.iter().enumerate().map(|(index, row)| ViewOp::Insert {
            index,
            row: row.clone(),
        }));
        ops.push(ViewOp::Spacer);
        self.table.spacer = true;

        self.table.commit(states, ops, report)
    }

    fn table(&self) -> &RowTable {
        &self.table
    }

    fn table_mut(&mut self) -> &mut RowTable {
        &mut self.table
    }
}

/// Row-by-row reconciliation keyed by job number.
pub struct DiffSync {
    table: RowTable,
}

impl DiffSync {
    pub fn new(presenter: Box<dyn Presenter>) -> Self {
        Self {
            table: RowTable::new(presenter),
        }
    }
}

impl ViewSync for DiffSync {
    fn apply(&mut self, snapshot: &Snapshot, ctx: &mut SyncContext<'_>) -> SyncReport {
        let (states, report) = RowTable::materialize(snapshot, ctx);
        let mut ops = diff_rows(&self.table.rows, &states);
        if !self.table.spacer {
            ops.push(ViewOp::Spacer);
            self.table.spacer = true;
        }

        self.table.commit(states, ops, report)
    }

    fn table(&self) -> &RowTable {
        &self.table
    }

    fn table_mut(&mut self) -> &mut RowTable {
        &mut self.table
    }
}

/// Operations that turn `old` into `new`, applied in order.
///
/// Rows missing from `new` are removed first; then each position is either
/// kept, updated in place, moved (remove + insert) or inserted.
pub fn diff_rows(old: &[RowState], new: &[RowState]) -> Vec<ViewOp> {
    let wanted: HashSet<&str> = new.iter().map(RowState::job_number).collect();
    let mut ops = Vec::new();

    let mut live: Vec<RowState> = Vec::with_capacity(old.len());
    for row in old {
        if wanted.contains(row.job_number()) {
            live.push(row.clone());
        } else {
            ops.push(ViewOp::Remove {
                job: row.job_number().to_string(),
            });
        }
    }

    for (index, row) in new.iter().enumerate() {
        match live.iter().position(|r| r.job_number() == row.job_number()) {
            Some(k) if k == index => {
                if live[index] != *row {
                    live[index] = row.clone();
                    ops.push(ViewOp::Update {
                        index,
                        row: row.clone(),
                    });
                }
            }
            Some(k) => {
                live.remove(k);
                ops.push(ViewOp::Remove {
                    job: row.job_number().to_string(),
                });
                live.insert(index, row.clone());
                ops.push(ViewOp::Insert {
                    index,
                    row: row.clone(),
                });
            }
            None => {
                live.insert(index, row.clone());
                ops.push(ViewOp::Insert {
                    index,
                    row: row.clone(),
                });
            }
        }
    }

    ops
}
