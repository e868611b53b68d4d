//! The live schedule: polling, view reconciliation and inline editing.

pub mod actions;
pub mod board;
pub mod edit;
pub mod events;
pub mod reconcile;
pub mod snapshot;
pub mod view;

pub use board::ScheduleBoard;
pub use edit::{EditBook, EditField};
pub use events::{EventSink, RowAction, ScheduleEvent};
pub use reconcile::{LoopStatus, PollOutcome, ReconciliationLoop, StopReason};
pub use snapshot::Snapshot;
pub use view::{DiffSync, NullPresenter, Presenter, RebuildSync, RowState, ViewOp, ViewSync};
