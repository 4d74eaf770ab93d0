//! Common test utilities for the deployment flow tests
//!
//! Builders for mock collaborators with the baseline expectations every
//! deployment run shares, so individual tests only state what they verify.

use std::path::PathBuf;

use deployer::traits::{MockManifestRepository, MockPlatform, MockSmokeTestRunner};
use deployer::DeployRequest;
use shared::{Route, RouteSet};

pub const DOMAIN: &str = "example.com";

pub fn route(fqdn: &str) -> Route {
    Route::from_fqdn(fqdn).expect("test fixture FQDN")
}

pub fn routes(fqdns: &[&str]) -> RouteSet {
    fqdns.iter().map(|f| route(f)).collect()
}

/// A request with neither manifest nor smoke test configured
pub fn request(app: &str) -> DeployRequest {
    DeployRequest {
        app_name: app.to_string(),
        manifest_path: None,
        smoke_test_path: None,
    }
}

pub fn request_with_smoke_test(app: &str, script: &str) -> DeployRequest {
    DeployRequest {
        smoke_test_path: Some(PathBuf::from(script)),
        ..request(app)
    }
}

/// Platform mock that reports the default domain and the given app names
pub fn platform_with_apps(apps: &[&str]) -> MockPlatform {
    let mut platform = MockPlatform::new();
    platform
        .expect_default_shared_domain()
        .returning(|| Ok(DOMAIN.to_string()));
    let names: Vec<String> = apps.iter().map(|a| a.to_string()).collect();
    platform
        .expect_list_apps()
        .returning(move || Ok(names.clone()));
    platform
}

/// Manifest repository with no entry for any app
pub fn empty_manifests() -> MockManifestRepository {
    let mut manifests = MockManifestRepository::new();
    manifests.expect_declared_routes().returning(|_, _| Ok(None));
    manifests
}

/// Manifest repository declaring the given routes for every lookup
pub fn manifests_declaring(fqdns: &'static [&'static str]) -> MockManifestRepository {
    let mut manifests = MockManifestRepository::new();
    manifests
        .expect_declared_routes()
        .returning(move |_, _| Ok(Some(routes(fqdns))));
    manifests
}

/// Smoke runner that must never be invoked
pub fn no_smoke_tests() -> MockSmokeTestRunner {
    let mut smoke_tests = MockSmokeTestRunner::new();
    smoke_tests.expect_run().times(0);
    smoke_tests
}
