//! Platform implementation backed by the cf CLI
//!
//! Wraps the `cf` command-line client: imperative operations (push, rename,
//! route mapping) shell out to the corresponding subcommands, while queries
//! go through `cf curl` against the v2 API and are parsed with serde.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use shared::{Route, RouteSet};

use crate::error::{DeployError, DeployResult};
use crate::traits::Platform;

/// Platform client shelling out to the cf CLI
pub struct CfCliPlatform {
    cf_binary: PathBuf,
}

/// One page of a v2 API listing
#[derive(Deserialize)]
struct Page<R> {
    next_url: Option<String>,
    resources: Vec<R>,
}

#[derive(Deserialize)]
struct Resource<E> {
    metadata: Metadata,
    entity: E,
}

#[derive(Deserialize)]
struct Metadata {
    guid: String,
}

#[derive(Deserialize)]
struct AppEntity {
    name: String,
}

#[derive(Deserialize)]
struct NamedEntity {
    name: String,
}

#[derive(Deserialize)]
struct RouteEntity {
    host: String,
    domain: Resource<NamedEntity>,
}

/// True when a failed command only complained about an absent app or route,
/// which the platform contract treats as a no-op.
fn indicates_missing(output: &str) -> bool {
    let lowered = output.to_lowercase();
    lowered.contains("does not exist") || lowered.contains("not found")
}

impl CfCliPlatform {
    /// Create a platform client using `cf` from the search path
    pub fn new() -> Self {
        Self {
            cf_binary: PathBuf::from("cf"),
        }
    }

    /// Override the cf binary location (fluent API)
    pub fn with_binary(mut self, cf_binary: impl Into<PathBuf>) -> Self {
        self.cf_binary = cf_binary.into();
        self
    }

    async fn run(&self, operation: &str, args: &[&str]) -> DeployResult<std::process::Output> {
        debug!(operation, "cf {}", args.join(" "));
        Command::new(&self.cf_binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DeployError::platform(
                    operation,
                    format!("failed to invoke {}: {e}", self.cf_binary.display()),
                )
            })
    }

    /// Run a cf subcommand, treating any non-zero exit as an error
    async fn run_checked(&self, operation: &str, args: &[&str]) -> DeployResult<()> {
        let output = self.run(operation, args).await?;
        if output.status.success() {
            return Ok(());
        }
        Err(DeployError::platform(
            operation,
            combined_output(&output).trim().to_string(),
        ))
    }

    /// Like `run_checked`, but an "app/route does not exist" failure is a
    /// no-op so repeated invocation cannot corrupt a run
    async fn run_tolerating_missing(&self, operation: &str, args: &[&str]) -> DeployResult<()> {
        let output = self.run(operation, args).await?;
        if output.status.success() {
            return Ok(());
        }
        let message = combined_output(&output).trim().to_string();
        if indicates_missing(&message) {
            warn!(operation, "Target already absent, treating as no-op");
            return Ok(());
        }
        Err(DeployError::platform(operation, message))
    }

    async fn curl_json<T: DeserializeOwned>(&self, operation: &str, path: &str) -> DeployResult<T> {
        let output = self.run(operation, &["curl", path]).await?;
        if !output.status.success() {
            return Err(DeployError::platform(
                operation,
                combined_output(&output).trim().to_string(),
            ));
        }
        serde_json::from_slice(&output.stdout)
            .map_err(|e| DeployError::platform(operation, format!("unexpected response: {e}")))
    }

    /// Walk a paginated v2 listing, collecting every resource
    async fn curl_all_pages<E: DeserializeOwned>(
        &self,
        operation: &str,
        first_path: &str,
    ) -> DeployResult<Vec<Resource<E>>> {
        let mut resources = Vec::new();
        let mut next = Some(first_path.to_string());
        while let Some(path) = next {
            let page: Page<Resource<E>> = self.curl_json(operation, &path).await?;
            resources.extend(page.resources);
            next = page.next_url;
        }
        Ok(resources)
    }

    /// Find the guid of the named app, if it exists
    async fn app_guid(&self, operation: &str, app: &str) -> DeployResult<Option<String>> {
        let path = format!("/v2/apps?q=name:{app}");
        let apps: Vec<Resource<AppEntity>> = self.curl_all_pages(operation, &path).await?;
        Ok(apps
            .into_iter()
            .find(|r| r.entity.name == app)
            .map(|r| r.metadata.guid))
    }
}

#[async_trait]
impl Platform for CfCliPlatform {
    async fn list_apps(&self) -> DeployResult<Vec<String>> {
        let apps: Vec<Resource<AppEntity>> = self
            .curl_all_pages("list apps", "/v2/apps?results-per-page=100")
            .await?;
        Ok(apps.into_iter().map(|r| r.entity.name).collect())
    }

    async fn app_routes(&self, app: &str) -> DeployResult<RouteSet> {
        let operation = format!("routes of {app}");
        let Some(guid) = self.app_guid(&operation, app).await? else {
            return Ok(RouteSet::new());
        };
        let path = format!("/v2/apps/{guid}/routes?inline-relations-depth=1");
        let routes: Vec<Resource<RouteEntity>> = self.curl_all_pages(&operation, &path).await?;
        Ok(routes
            .into_iter()
            .map(|r| Route::new(r.entity.host, r.entity.domain.entity.name))
            .collect())
    }

    async fn delete_app(&self, app: &str) -> DeployResult<()> {
        self.run_tolerating_missing(&format!("delete {app}"), &["delete", app, "-f"])
            .await
    }

    async fn push_app(&self, app: &str, manifest: Option<PathBuf>) -> DeployResult<()> {
        let manifest_arg;
        let mut args = vec!["push", app, "--no-route"];
        if let Some(path) = &manifest {
            manifest_arg = path.to_string_lossy().into_owned();
            args.push("-f");
            args.push(&manifest_arg);
        }
        self.run_checked(&format!("push {app}"), &args).await
    }

    async fn map_route(&self, app: &str, route: &Route) -> DeployResult<()> {
        self.run_checked(
            &format!("map {route} to {app}"),
            &["map-route", app, &route.domain, "--hostname", &route.host],
        )
        .await
    }

    async fn unmap_route(&self, app: &str, route: &Route) -> DeployResult<()> {
        self.run_tolerating_missing(
            &format!("unmap {route} from {app}"),
            &["unmap-route", app, &route.domain, "--hostname", &route.host],
        )
        .await
    }

    async fn rename_app(&self, from: &str, to: &str) -> DeployResult<()> {
        self.run_checked(&format!("rename {from} to {to}"), &["rename", from, to])
            .await
    }

    async fn default_shared_domain(&self) -> DeployResult<String> {
        let domains: Vec<Resource<NamedEntity>> = self
            .curl_all_pages("shared domains", "/v2/shared_domains")
            .await?;
        domains
            .into_iter()
            .next()
            .map(|r| r.entity.name)
            .ok_or_else(|| DeployError::DefaultDomain {
                message: "platform reports no shared domains".to_string(),
            })
    }
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.trim().is_empty() {
        stdout.into_owned()
    } else {
        format!("{stdout}{stderr}")
    }
}
