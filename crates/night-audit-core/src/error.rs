use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("No usable input: {0}")]
    EmptyInput(String),

    #[error("Cannot access {path}: {message}")]
    FileAccess { path: String, message: String },

    #[error("Storage connection failed: {0}")]
    StorageConnection(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
