//! Shared error types for the preloader supervisor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid log level: {level}")]
    InvalidLogLevel { level: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
