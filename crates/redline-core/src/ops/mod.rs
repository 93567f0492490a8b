//! Element store, operation log and replay

pub mod log;
pub mod replay;
pub mod store;

pub use log::OperationLog;
pub use replay::{apply_operation, replay_all};
pub use store::ElementStore;
