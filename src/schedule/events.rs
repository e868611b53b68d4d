//! Outcome messages emitted by the schedule, keyed by job where it applies.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

/// One-shot row commands, distinct from field editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Hide,
    MarkModified,
    Upload,
    Print,
}

impl fmt::Display for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RowAction::Hide => "hide",
            RowAction::MarkModified => "mark-modified",
            RowAction::Upload => "upload",
            RowAction::Print => "print",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleEvent {
    /// The displayed schedule changed; the host should alert the operator.
    Attention { queue: String, rows: usize },
    /// Polling stopped after a failed fetch.
    FetchFailed { queue: String, reason: String },
    EditCommitted { job: String },
    EditFailed { job: String, reason: String },
    /// The server changed a field the operator is editing.
    EditConflict { job: String },
    /// The edited row vanished upstream and its local edit was dropped.
    EditDiscarded { job: String },
    ActionSucceeded { job: String, action: RowAction },
    ActionFailed { job: String, action: RowAction, reason: String },
}

/// Sending half of the event channel. Sends never fail: a dropped receiver
/// simply means nobody is listening.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<Sender<ScheduleEvent>>,
}

impl EventSink {
    pub fn channel() -> (Self, Receiver<ScheduleEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that drops everything.
    pub fn disconnected() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: ScheduleEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
