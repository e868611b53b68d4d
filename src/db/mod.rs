pub mod access;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod queries;
pub mod store;

pub use access::{DataAccess, QueryName, Rowset};
pub use store::SqliteStore;
