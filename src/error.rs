//! Error types for allocation operations

use thiserror::Error;

use crate::auction::types::TaskId;

/// Errors that can occur while building routes or loading a scenario
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Item already exists")]
    ItemAlreadyExists,
    #[error("Capacity full")]
    CapacityFull,
    #[error("Index out of bounds")]
    IndexOutOfBounds,
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// A specialized Result type for allocation operations
pub type Result<T> = std::result::Result<T, Error>;
