pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod notify;
pub mod repository;
pub mod status;

pub use error::{BugdeskError, Result};
