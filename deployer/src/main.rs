//! Main entry point for the `bgd` binary
//!
//! Wires the real service implementations into the deployer and maps the
//! outcome to the process exit status. This is the only place that decides
//! exit codes; everything below it reports through `DeployResult`.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use deployer::services::{CfCliPlatform, DiskManifestRepository, ScriptSmokeRunner};
use deployer::{BlueGreenDeployer, DeployOutcome, DeployRequest};
use shared::logging;

/// Zero-downtime deploys with smoke tests
#[derive(Parser)]
#[command(name = "bgd")]
#[command(about = "Pushes a new app version next to the live one and promotes it only if smoke tests pass")]
struct Args {
    /// Name of the application to deploy
    app_name: String,

    /// Test script to run against the candidate before promotion
    #[arg(long = "smoke-test", value_name = "SCRIPT")]
    smoke_test: Option<PathBuf>,

    /// Path to the application manifest
    #[arg(short = 'f', long = "manifest", value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// cf CLI binary to invoke
    #[arg(long, default_value = "cf", value_name = "PATH")]
    cf_binary: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    logging::init_tracing_with_level(Some(&args.log_level));
    logging::log_startup(&format!("blue-green deployment of {}", args.app_name));

    // Wire real services into the deployer
    let platform = CfCliPlatform::new().with_binary(args.cf_binary);
    let manifests = match &args.manifest {
        Some(path) => DiskManifestRepository::new().with_path(path),
        None => DiskManifestRepository::new(),
    };
    let smoke_tests = ScriptSmokeRunner::new();

    let deployer = BlueGreenDeployer::new(platform, manifests, smoke_tests);
    let request = DeployRequest {
        app_name: args.app_name,
        manifest_path: args.manifest,
        smoke_test_path: args.smoke_test,
    };

    match deployer.deploy(&request).await {
        Ok(DeployOutcome::Promoted { app, routes }) => {
            logging::log_success(&format!("{app} is live on: {routes}"));
            ExitCode::SUCCESS
        }
        Ok(DeployOutcome::NotPromoted { quarantined_as }) => {
            // Expected negative outcome: the live app is untouched, the
            // non-zero exit only signals the caller that promotion did not
            // happen.
            eprintln!("Smoke tests failed; candidate kept as {quarantined_as}");
            ExitCode::FAILURE
        }
        Err(e) => {
            logging::log_error("Deployment", &error_chain(&e));
            ExitCode::FAILURE
        }
    }
}

/// Flatten an error and its sources into one line for the final report
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
