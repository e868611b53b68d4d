pub mod row;
pub mod status;

pub use row::ScheduleRow;
pub use status::{Flag, RowStyle};
