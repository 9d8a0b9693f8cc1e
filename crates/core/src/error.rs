use thiserror::Error;

#[derive(Debug, Error)]
pub enum BugdeskError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Store(String),

    #[error("notify error: {0}")]
    Notify(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, BugdeskError>;
