//! On-disk manifest repository
//!
//! Reads a Cloud Foundry style `manifest.yml` and answers which routes an
//! app declares. Hosts and domains expand as their cross product, with the
//! app name standing in for missing hosts and the platform default domain
//! for missing domains. A missing file or app entry is not an error.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use shared::{Route, RouteSet};

use crate::error::{DeployError, DeployResult};
use crate::traits::ManifestRepository;

const DEFAULT_MANIFEST: &str = "manifest.yml";

/// Manifest repository reading deployment descriptors from disk
pub struct DiskManifestRepository {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    applications: Vec<ManifestApp>,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestApp {
    name: Option<String>,
    host: Option<String>,
    #[serde(default)]
    hosts: Vec<String>,
    domain: Option<String>,
    #[serde(default)]
    domains: Vec<String>,
    routes: Option<Vec<ManifestRoute>>,
}

#[derive(Debug, Deserialize)]
struct ManifestRoute {
    route: String,
}

impl ManifestApp {
    /// Whether the entry says anything at all about routing. An entry that
    /// stays silent lets the caller fall back to platform defaults.
    fn declares_routing(&self) -> bool {
        self.host.is_some()
            || !self.hosts.is_empty()
            || self.domain.is_some()
            || !self.domains.is_empty()
            || self.routes.is_some()
    }
}

/// Expand one app entry into its declared route set
fn expand_routes(
    entry: &ManifestApp,
    app: &str,
    default_domain: &str,
) -> DeployResult<Option<RouteSet>> {
    if !entry.declares_routing() {
        return Ok(None);
    }

    let mut routes = RouteSet::new();
    for declared in entry.routes.iter().flatten() {
        routes.insert(Route::from_fqdn(&declared.route)?);
    }

    let mut hosts = entry.hosts.clone();
    if let Some(host) = &entry.host {
        hosts.push(host.clone());
    }
    let mut domains = entry.domains.clone();
    if let Some(domain) = &entry.domain {
        domains.push(domain.clone());
    }

    if !hosts.is_empty() || !domains.is_empty() {
        if hosts.is_empty() {
            hosts.push(app.to_string());
        }
        if domains.is_empty() {
            domains.push(default_domain.to_string());
        }
        for host in &hosts {
            for domain in &domains {
                routes.insert(Route::new(host, domain));
            }
        }
    }

    Ok(Some(routes))
}

impl DiskManifestRepository {
    /// Use `./manifest.yml` when present
    pub fn new() -> Self {
        Self { path: None }
    }

    /// Use an explicit manifest path (fluent API)
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    fn manifest_path(&self) -> &Path {
        self.path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_MANIFEST))
    }

    async fn load(&self) -> DeployResult<Option<ManifestFile>> {
        let path = self.manifest_path();
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DeployError::Manifest {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        };
        let manifest = serde_yaml::from_str(&contents).map_err(|e| DeployError::Manifest {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(manifest))
    }
}

impl Default for DiskManifestRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ManifestRepository for DiskManifestRepository {
    async fn declared_routes(
        &self,
        app: &str,
        default_domain: &str,
    ) -> DeployResult<Option<RouteSet>> {
        let Some(manifest) = self.load().await? else {
            return Ok(None);
        };

        // A single anonymous entry applies to whatever app is being
        // deployed; otherwise entries match by name.
        let entry = manifest
            .applications
            .iter()
            .find(|a| a.name.as_deref() == Some(app))
            .or_else(|| match manifest.applications.as_slice() {
                [only] if only.name.is_none() => Some(only),
                _ => None,
            });

        match entry {
            Some(entry) => expand_routes(entry, app, default_domain),
            None => Ok(None),
        }
    }
}
