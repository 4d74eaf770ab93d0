//! Blue-green deployment orchestrator
//!
//! This is the state machine that sequences platform operations: cleanup of
//! stale candidates, push of the new version, temporary routing for smoke
//! tests, route reconciliation, and promotion or rollback. All platform
//! access goes through injected trait objects; the orchestrator holds no
//! persistent state across runs.

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use shared::{AppNames, Route, RouteSet};

use crate::error::{DeployError, DeployResult};
use crate::traits::{ManifestRepository, Platform, SmokeTestRunner};

/// Logical phases of one deployment run, used for logging and for naming
/// the failing step in errors. Not persisted anywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeployPhase {
    Cleaning,
    Pushing,
    ValidatingRoute,
    SmokeTesting,
    Promoting,
    RollingBack,
}

impl fmt::Display for DeployPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cleaning => "cleaning",
            Self::Pushing => "pushing",
            Self::ValidatingRoute => "validating route",
            Self::SmokeTesting => "smoke testing",
            Self::Promoting => "promoting",
            Self::RollingBack => "rolling back",
        };
        write!(f, "{name}")
    }
}

/// One deployment invocation: which app to deploy and how to validate it.
#[derive(Clone, Debug)]
pub struct DeployRequest {
    pub app_name: String,
    pub manifest_path: Option<PathBuf>,
    pub smoke_test_path: Option<PathBuf>,
}

/// Terminal state of a deployment run that completed without a fatal error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeployOutcome {
    /// The candidate took over the public name and routes.
    Promoted { app: String, routes: RouteSet },
    /// Smoke tests failed; the live app is untouched and the candidate is
    /// kept under the failed name for inspection.
    NotPromoted { quarantined_as: String },
}

impl DeployOutcome {
    pub fn promoted(&self) -> bool {
        matches!(self, Self::Promoted { .. })
    }
}

/// The live app found at the start of a run, with the routes it held.
struct LiveApp {
    name: String,
    routes: RouteSet,
}

/// Blue-green deployer with injected collaborators
pub struct BlueGreenDeployer<P, M, S>
where
    P: Platform,
    M: ManifestRepository,
    S: SmokeTestRunner,
{
    platform: P,
    manifests: M,
    smoke_tests: S,
}

impl<P, M, S> BlueGreenDeployer<P, M, S>
where
    P: Platform,
    M: ManifestRepository,
    S: SmokeTestRunner,
{
    /// Create a new deployer with injected dependencies
    pub fn new(platform: P, manifests: M, smoke_tests: S) -> Self {
        Self {
            platform,
            manifests,
            smoke_tests,
        }
    }

    /// Run one full deployment cycle for the requested app.
    ///
    /// Fatal errors abort at the point of failure with the phase recorded;
    /// a failed smoke test is not an error and comes back as
    /// [`DeployOutcome::NotPromoted`].
    pub async fn deploy(&self, request: &DeployRequest) -> DeployResult<DeployOutcome> {
        let names =
            AppNames::new(request.app_name.as_str()).map_err(|_| DeployError::MissingAppName)?;

        let domain = self
            .platform
            .default_shared_domain()
            .await
            .map_err(|e| DeployError::DefaultDomain {
                message: e.to_string(),
            })?;
        debug!(domain = %domain, "Resolved default shared domain");

        // Cleaning: reap leftovers of interrupted or failed prior cycles,
        // then snapshot the live app and its routes.
        info!(phase = %DeployPhase::Cleaning, app = %names, "🧹 Removing stale apps from prior deployments");
        let apps = self
            .platform
            .list_apps()
            .await
            .map_err(|e| DeployError::step(DeployPhase::Cleaning, e))?;
        for app in apps.iter().filter(|a| names.is_stale(a)) {
            debug!(app = %app, "Deleting stale app");
            self.platform
                .delete_app(app)
                .await
                .map_err(|e| DeployError::step(DeployPhase::Cleaning, e))?;
        }
        let live = self
            .live_app(&names, &apps)
            .await
            .map_err(|e| DeployError::step(DeployPhase::Cleaning, e))?;

        // Pushing: the candidate goes up under the -new name with a single
        // temporary route so smoke tests can reach it.
        let candidate = names.candidate();
        info!(phase = %DeployPhase::Pushing, app = %candidate, "🚀 Pushing candidate app");
        self.platform
            .push_app(&candidate, request.manifest_path.clone())
            .await
            .map_err(|e| DeployError::step(DeployPhase::Pushing, e))?;

        let temp_route = Route::new(candidate.clone(), domain.clone());
        self.platform
            .map_route(&candidate, &temp_route)
            .await
            .map_err(|e| DeployError::step(DeployPhase::ValidatingRoute, e))?;

        let promote = match &request.smoke_test_path {
            Some(script) => {
                info!(phase = %DeployPhase::SmokeTesting, target = %temp_route, "🔍 Running smoke tests");
                self.smoke_tests
                    .run(script, &temp_route.fqdn())
                    .await
                    .map_err(|e| DeployError::step(DeployPhase::SmokeTesting, e))?
                    .passed()
            }
            None => {
                debug!("No smoke test script supplied, candidate promotes by default");
                true
            }
        };

        // Route reconciliation runs regardless of the smoke test outcome,
        // and the temporary route must be gone before any rename so no
        // stale route points at a renamed app.
        let next_phase = if promote {
            DeployPhase::Promoting
        } else {
            DeployPhase::RollingBack
        };
        let final_routes = self
            .reconciled_routes(&names, &domain, live.as_ref().map(|l| &l.routes))
            .await
            .map_err(|e| DeployError::step(next_phase, e))?;
        self.platform
            .unmap_route(&candidate, &temp_route)
            .await
            .map_err(|e| DeployError::step(next_phase, e))?;

        if promote {
            info!(phase = %DeployPhase::Promoting, app = %names, routes = %final_routes, "⬆️  Promoting candidate");
            self.promote(&names, live, &candidate, &final_routes)
                .await
                .map_err(|e| DeployError::step(DeployPhase::Promoting, e))?;
            info!(app = %names, "✅ Deployment complete");
            Ok(DeployOutcome::Promoted {
                app: names.live().to_string(),
                routes: final_routes,
            })
        } else {
            let quarantined = names.failed();
            warn!(phase = %DeployPhase::RollingBack, app = %quarantined, "⚠️ Smoke tests failed, quarantining candidate");
            self.platform
                .rename_app(&candidate, &quarantined)
                .await
                .map_err(|e| DeployError::step(DeployPhase::RollingBack, e))?;
            Ok(DeployOutcome::NotPromoted {
                quarantined_as: quarantined,
            })
        }
    }

    /// Find the app holding the public name in the snapshot, along with the
    /// routes it currently serves.
    async fn live_app(&self, names: &AppNames, apps: &[String]) -> DeployResult<Option<LiveApp>> {
        if !apps.iter().any(|a| a == names.live()) {
            debug!(app = %names, "No live app found, this is a first deploy");
            return Ok(None);
        }
        let routes = self.platform.app_routes(names.live()).await?;
        debug!(app = %names, routes = %routes, "Found live app");
        Ok(Some(LiveApp {
            name: names.live().to_string(),
            routes,
        }))
    }

    /// Union of manifest-declared routes and the live app's routes, with a
    /// single `{app, default domain}` route substituted when the union is
    /// empty.
    async fn reconciled_routes(
        &self,
        names: &AppNames,
        domain: &str,
        live_routes: Option<&RouteSet>,
    ) -> DeployResult<RouteSet> {
        let declared = self
            .manifests
            .declared_routes(names.live(), domain)
            .await?
            .unwrap_or_default();

        let mut merged = match live_routes {
            Some(live) => declared.union(live),
            None => declared,
        };
        if merged.is_empty() {
            merged.insert(Route::new(names.live(), domain));
        }
        Ok(merged)
    }

    /// Map the final routes onto the candidate, then swap the names.
    ///
    /// The candidate is mapped before any rename and the old app keeps its
    /// routes until after the candidate holds the public name, so both
    /// versions serve the public routes during the switch and there is no
    /// window with zero routable instances.
    async fn promote(
        &self,
        names: &AppNames,
        live: Option<LiveApp>,
        candidate: &str,
        routes: &RouteSet,
    ) -> DeployResult<()> {
        for route in routes {
            self.platform.map_route(candidate, route).await?;
        }

        match live {
            Some(live) => {
                let old = names.old();
                self.platform.rename_app(&live.name, &old).await?;
                self.platform.rename_app(candidate, names.live()).await?;
                for route in &live.routes {
                    self.platform.unmap_route(&old, route).await?;
                }
            }
            None => {
                self.platform.rename_app(candidate, names.live()).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockManifestRepository, MockPlatform, MockSmokeTestRunner};

    fn deployer(
        manifests: MockManifestRepository,
    ) -> BlueGreenDeployer<MockPlatform, MockManifestRepository, MockSmokeTestRunner> {
        BlueGreenDeployer::new(MockPlatform::new(), manifests, MockSmokeTestRunner::new())
    }

    #[tokio::test]
    async fn reconciliation_defaults_to_app_name_route_when_nothing_declared() {
        let mut manifests = MockManifestRepository::new();
        manifests
            .expect_declared_routes()
            .returning(|_, _| Ok(None));

        let deployer = deployer(manifests);
        let names = AppNames::new("myapp").unwrap();
        let routes = deployer
            .reconciled_routes(&names, "example.com", None)
            .await
            .unwrap();

        assert_eq!(routes.len(), 1);
        assert!(routes.contains(&Route::new("myapp", "example.com")));
    }

    #[tokio::test]
    async fn reconciliation_merges_manifest_and_live_routes() {
        let mut manifests = MockManifestRepository::new();
        manifests.expect_declared_routes().returning(|_, _| {
            Ok(Some(
                [Route::new("b", "example.com")].into_iter().collect(),
            ))
        });

        let deployer = deployer(manifests);
        let names = AppNames::new("myapp").unwrap();
        let live: RouteSet = [Route::new("a", "example.com")].into_iter().collect();
        let routes = deployer
            .reconciled_routes(&names, "example.com", Some(&live))
            .await
            .unwrap();

        assert_eq!(routes.len(), 2);
        assert!(routes.contains(&Route::new("a", "example.com")));
        assert!(routes.contains(&Route::new("b", "example.com")));
    }

    #[tokio::test]
    async fn reconciliation_keeps_live_routes_when_manifest_absent() {
        let mut manifests = MockManifestRepository::new();
        manifests
            .expect_declared_routes()
            .returning(|_, _| Ok(None));

        let deployer = deployer(manifests);
        let names = AppNames::new("myapp").unwrap();
        let live: RouteSet = [Route::new("a", "example.com")].into_iter().collect();
        let routes = deployer
            .reconciled_routes(&names, "example.com", Some(&live))
            .await
            .unwrap();

        assert_eq!(routes.len(), 1);
        assert!(routes.contains(&Route::new("a", "example.com")));
    }

    #[tokio::test]
    async fn empty_app_name_is_a_fatal_input_error() {
        let deployer = deployer(MockManifestRepository::new());
        let request = DeployRequest {
            app_name: String::new(),
            manifest_path: None,
            smoke_test_path: None,
        };

        let err = deployer.deploy(&request).await.unwrap_err();
        assert!(matches!(err, DeployError::MissingAppName));
    }

    #[test]
    fn phase_names_identify_the_failing_step() {
        let err = DeployError::step(
            DeployPhase::Cleaning,
            DeployError::platform("delete myapp-old", "boom"),
        );
        assert_eq!(err.to_string(), "Deployment failed while cleaning");

        let source = std::error::Error::source(&err).expect("step errors carry their cause");
        assert!(source.to_string().contains("delete myapp-old"));
    }

    #[test]
    fn outcome_reports_promotion_as_bool() {
        let promoted = DeployOutcome::Promoted {
            app: "myapp".to_string(),
            routes: RouteSet::new(),
        };
        let not_promoted = DeployOutcome::NotPromoted {
            quarantined_as: "myapp-failed".to_string(),
        };

        assert!(promoted.promoted());
        assert!(!not_promoted.promoted());
    }
}
