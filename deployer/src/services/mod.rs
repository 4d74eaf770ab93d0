//! Service implementations
//!
//! This module contains real implementations of the collaborator traits.
//! These are the production implementations that handle actual I/O: the cf
//! CLI wrapper, the on-disk manifest repository, and the smoke test runner.

pub mod manifest;
pub mod platform;
pub mod smoke;

// Re-export all service implementations
pub use manifest::DiskManifestRepository;
pub use platform::CfCliPlatform;
pub use smoke::ScriptSmokeRunner;
