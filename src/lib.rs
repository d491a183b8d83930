pub mod cli;
pub mod cli_handlers;
pub mod error;
pub mod models;
pub mod repl;
pub mod store;

pub use error::{Result, TaskError};
pub use models::*;
pub use store::TaskStore;
