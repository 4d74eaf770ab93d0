//! Deployer-specific error types

use shared::SharedError;
use thiserror::Error;

use crate::deployer::DeployPhase;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("App name must be provided")]
    MissingAppName,

    #[error("Failed to determine default shared domain: {message}")]
    DefaultDomain { message: String },

    #[error("Platform command failed: {operation}: {message}")]
    PlatformCommand { operation: String, message: String },

    #[error("Manifest error at {path}: {message}")]
    Manifest { path: String, message: String },

    #[error("Smoke test script could not be run: {script}: {message}")]
    SmokeTestInvocation { script: String, message: String },

    #[error("Deployment failed while {phase}")]
    Step {
        phase: DeployPhase,
        #[source]
        source: Box<DeployError>,
    },

    #[error("Shared component error")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Manifest parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DeployError {
    /// Wrap an error with the deployment phase it occurred in, so callers
    /// can identify the failing step without string matching.
    pub fn step(phase: DeployPhase, source: DeployError) -> Self {
        Self::Step {
            phase,
            source: Box::new(source),
        }
    }

    pub fn platform(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PlatformCommand {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

pub type DeployResult<T> = Result<T, DeployError>;
