//! Smoke test runner spawning an external validation script
//!
//! The script receives the candidate's FQDN as its first argument and in
//! the `TEST_URL` environment variable. Only the exit status matters: zero
//! passes, anything else fails. A script that cannot be started at all is
//! an infrastructure error, not a failed test.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{DeployError, DeployResult};
use crate::traits::{SmokeTestRunner, SmokeTestVerdict};

/// Smoke test runner invoking a script as a child process
pub struct ScriptSmokeRunner;

impl ScriptSmokeRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ScriptSmokeRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmokeTestRunner for ScriptSmokeRunner {
    async fn run(&self, script: &Path, target_fqdn: &str) -> DeployResult<SmokeTestVerdict> {
        debug!(script = %script.display(), target = %target_fqdn, "Invoking smoke test script");

        let status = Command::new(script)
            .arg(target_fqdn)
            .env("TEST_URL", target_fqdn)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| DeployError::SmokeTestInvocation {
                script: script.display().to_string(),
                message: e.to_string(),
            })?;

        let verdict = if status.success() {
            SmokeTestVerdict::Passed
        } else {
            SmokeTestVerdict::Failed
        };
        info!(target = %target_fqdn, ?verdict, "Smoke tests finished");
        Ok(verdict)
    }
}
