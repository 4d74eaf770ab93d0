//! Shared error types for the deployment tooling

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("App name must not be empty")]
    EmptyAppName,

    #[error("Invalid route: {input}")]
    InvalidRoute { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
