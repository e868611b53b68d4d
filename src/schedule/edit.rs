//! Per-row edit sessions and the field commit state machine.
//!
//! `Clean → Editing → Committing → Clean` on a successful write, or back to
//! `Editing` when the write fails. A session only ever buffers values; the
//! fetched row it belongs to is never modified in place.

use crate::db::access::{DataAccess, QueryName, text};
use crate::errors::{AppError, AppResult};
use crate::models::ScheduleRow;
use crate::schedule::snapshot::Snapshot;
use rusqlite::types::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub const MAX_PRIORITY: i64 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EditField {
    Priority,
    Material,
    MaterialQty,
}

impl EditField {
    pub const ALL: [EditField; 3] = [
        EditField::Priority,
        EditField::Material,
        EditField::MaterialQty,
    ];
}

/// The operator-editable subset of a row, as text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditableFields {
    pub priority: String,
    pub material: String,
    pub material_qty: String,
}

impl EditableFields {
    pub fn of(row: &ScheduleRow) -> Self {
        Self {
            priority: row.priority_display(),
            material: row.material.clone(),
            material_qty: row.material_qty.clone(),
        }
    }

    pub fn get(&self, field: EditField) -> &str {
        match field {
            EditField::Priority => &self.priority,
            EditField::Material => &self.material,
            EditField::MaterialQty => &self.material_qty,
        }
    }

    fn set(&mut self, field: EditField, value: &str) {
        let slot = match field {
            EditField::Priority => &mut self.priority,
            EditField::Material => &mut self.material,
            EditField::MaterialQty => &mut self.material_qty,
        };
        *slot = value.to_string();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Clean,
    Editing,
    Committing,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    pub job_number: String,
    pub job_ref: String,
    /// Field currently being typed into.
    pub focus: Option<EditField>,
    pub state: FieldState,
    /// Values the row had when editing began.
    pub base: EditableFields,
    pub pending: EditableFields,
    pub last_sent: Option<EditableFields>,
    pub conflict: bool,
    /// Latest fetched priority, written back unchanged when untouched.
    remote_priority: i64,
    touched: Vec<EditField>,
}

impl EditSession {
    fn new(row: &ScheduleRow) -> Self {
        let base = EditableFields::of(row);
        Self {
            job_number: row.job_number.clone(),
            job_ref: row.job_ref.clone(),
            focus: None,
            state: FieldState::Clean,
            pending: base.clone(),
            base,
            last_sent: None,
            conflict: false,
            remote_priority: row.priority,
            touched: Vec::new(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.state != FieldState::Clean
    }

    pub fn touched(&self) -> &[EditField] {
        &self.touched
    }

    /// True when the server moved any field this session edited.
    fn conflicts_with(&self, remote: &ScheduleRow) -> bool {
        let remote = EditableFields::of(remote);
        self.touched
            .iter()
            .any(|f| remote.get(*f) != self.base.get(*f))
    }

    /// Follow the server on every field the operator has not touched.
    fn track_untouched(&mut self, remote: &ScheduleRow) {
        let fresh = EditableFields::of(remote);
        for field in EditField::ALL {
            if !self.touched.contains(&field) {
                self.base.set(field, fresh.get(field));
                self.pending.set(field, fresh.get(field));
            }
        }
        self.remote_priority = remote.priority;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// No open session for the row; nothing was written.
    NothingToCommit,
    Committed(EditableFields),
}

/// What reconciling open sessions against a fresh snapshot found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReview {
    /// Sessions dropped because their row is gone.
    pub discarded: Vec<String>,
    /// Sessions that just entered conflict.
    pub new_conflicts: Vec<String>,
}

/// Open edit sessions, keyed by job number.
#[derive(Debug, Clone, Default)]
pub struct EditBook {
    sessions: BTreeMap<String, EditSession>,
}

impl EditBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a keystroke-level change. Opens the session if needed; purely
    /// local, no I/O.
    pub fn begin(&mut self, row: &ScheduleRow, field: EditField, value: &str) -> &EditSession {
        let session = self
            .sessions
            .entry(row.job_number.clone())
            .or_insert_with(|| EditSession::new(row));

        session.pending.set(field, value);
        session.focus = Some(field);
        session.state = FieldState::Editing;
        if !session.touched.contains(&field) {
            session.touched.push(field);
        }
        debug!(job = %row.job_number, ?field, "field edited");
        session
    }

    pub fn session(&self, job_number: &str) -> Option<&EditSession> {
        self.sessions.get(job_number)
    }

    pub fn is_dirty(&self, job_number: &str) -> bool {
        self.sessions
            .get(job_number)
            .is_some_and(EditSession::is_dirty)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop the local buffer without writing anything.
    pub fn revert(&mut self, job_number: &str) -> Option<EditSession> {
        self.sessions.remove(job_number)
    }

    /// Focus left the row: write its buffered fields in one update.
    ///
    /// On failure the session stays open and dirty, and nothing is retried.
    pub fn commit(
        &mut self,
        job_number: &str,
        data: &mut dyn DataAccess,
    ) -> AppResult<CommitOutcome> {
        let Some(session) = self.sessions.get_mut(job_number) else {
            return Ok(CommitOutcome::NothingToCommit);
        };

        session.focus = None;
        let priority = if !session.touched.contains(&EditField::Priority) {
            session.remote_priority
        } else if let Some(p) = validate_priority(&session.pending.priority) {
            p
        } else {
            session.state = FieldState::Editing;
            return Err(AppError::InvalidPriority {
                job: session.job_number.clone(),
                value: session.pending.priority.clone(),
            });
        };

        session.state = FieldState::Committing;
        let sent = session.pending.clone();
        session.last_sent = Some(sent.clone());

        let params = [
            text(&session.job_ref),
            Value::Integer(priority),
            text(&sent.material),
            text(&sent.material_qty),
        ];

        match data.query(QueryName::UpdateJobFields, &params) {
            Ok(_) => {
                info!(job = %job_number, "edit committed");
                self.sessions.remove(job_number);
                Ok(CommitOutcome::Committed(sent))
            }
            Err(e) => {
                warn!(job = %job_number, error = %e, "edit commit failed");
                session.state = FieldState::Editing;
                Err(AppError::write(job_number, e))
            }
        }
    }

    /// Reconcile open sessions with a freshly applied snapshot.
    pub fn review(&mut self, snapshot: &Snapshot) -> SessionReview {
        let mut review = SessionReview::default();

        self.sessions.retain(|job, session| {
            let Some(remote) = snapshot.get(job) else {
                review.discarded.push(job.clone());
                return false;
            };
            if !session.conflict && session.conflicts_with(remote) {
                session.conflict = true;
                review.new_conflicts.push(job.clone());
            }
            session.track_untouched(remote);
            true
        });

        review
    }
}

/// Priorities are small positive integers; "005" and "5" are the same value.
pub fn validate_priority(raw: &str) -> Option<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|p| (1..=MAX_PRIORITY).contains(p))
}
