//! Shared types for the blue-green deployment tooling
//!
//! Contains only the pure domain values used across the deployer: routes,
//! route sets, and the derived application naming family. Anything that
//! talks to the platform lives in the deployer crate behind trait seams.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
