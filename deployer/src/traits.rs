//! Trait definitions with mockall annotations for testing
//!
//! These traits are the seams between the deployer and its external
//! collaborators: the platform that owns apps and routes, the manifest
//! repository, and the smoke test runner. They are used for dependency
//! injection and enable testing the full deployment flow against mocks.

use std::path::{Path, PathBuf};

use shared::{Route, RouteSet};

use crate::error::DeployResult;

/// Outcome of a smoke test run that was successfully invoked.
///
/// A script that runs and exits non-zero is a normal `Failed` verdict, not
/// an error; a script that cannot be invoked at all surfaces as
/// `DeployError::SmokeTestInvocation` from the runner instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmokeTestVerdict {
    Passed,
    Failed,
}

impl SmokeTestVerdict {
    pub fn passed(self) -> bool {
        self == Self::Passed
    }
}

/// Platform abstraction for app and route operations
///
/// Every operation must tolerate repeated invocation: deleting an absent app
/// and unmapping an unmapped route are no-ops, not errors.
#[mockall::automock]
#[async_trait::async_trait]
pub trait Platform: Send + Sync {
    /// Names of all apps visible in the current space
    async fn list_apps(&self) -> DeployResult<Vec<String>>;

    /// Routes currently mapped to the named app
    async fn app_routes(&self, app: &str) -> DeployResult<RouteSet>;

    /// Delete the named app; absent apps are a no-op
    async fn delete_app(&self, app: &str) -> DeployResult<()>;

    /// Push a new app under the given name, using the manifest at the given
    /// path or platform defaults when no path is supplied. No route is
    /// mapped by the push itself.
    async fn push_app(&self, app: &str, manifest: Option<PathBuf>) -> DeployResult<()>;

    /// Map a route to the named app
    async fn map_route(&self, app: &str, route: &Route) -> DeployResult<()>;

    /// Unmap a route from the named app; unmapped routes are a no-op
    async fn unmap_route(&self, app: &str, route: &Route) -> DeployResult<()>;

    /// Rename an app
    async fn rename_app(&self, from: &str, to: &str) -> DeployResult<()>;

    /// The platform's default shared domain name
    async fn default_shared_domain(&self) -> DeployResult<String>;
}

/// Manifest repository abstraction
///
/// Reads the deployment descriptor keyed by app name. Absence of the file
/// or of an entry for the app is not an error.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ManifestRepository: Send + Sync {
    /// Routes declared for the named app, or `None` when the manifest or
    /// the app entry is absent. `default_domain` fills in entries that
    /// declare hosts without domains.
    async fn declared_routes(
        &self,
        app: &str,
        default_domain: &str,
    ) -> DeployResult<Option<RouteSet>>;
}

/// Smoke test runner abstraction
#[mockall::automock]
#[async_trait::async_trait]
pub trait SmokeTestRunner: Send + Sync {
    /// Run the script against the target FQDN and report its verdict.
    /// Invocation failures (script missing, not executable) are errors;
    /// a clean non-zero exit is `Ok(SmokeTestVerdict::Failed)`.
    async fn run(&self, script: &Path, target_fqdn: &str) -> DeployResult<SmokeTestVerdict>;
}
