//! Blue-green deployment library
//!
//! This library provides a clean, testable blue-green deployer that pushes a
//! candidate version of an application next to the live one, validates it
//! with smoke tests against a temporary route, and promotes it onto the live
//! routes only when validation passes.

pub mod deployer;
pub mod error;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use deployer::{BlueGreenDeployer, DeployOutcome, DeployPhase, DeployRequest};
pub use error::{DeployError, DeployResult};
pub use traits::{ManifestRepository, Platform, SmokeTestRunner, SmokeTestVerdict};
