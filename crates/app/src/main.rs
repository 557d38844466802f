//! Manifold CLI - Main Entry Point
//!
//! Loads a deployment manifest, resolves every `((variable))` reference
//! against the configured config server, and writes the resolved manifest
//! to stdout. Stdout is the consumer handoff; logs never carry resolved
//! values.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use manifold_application::{PassConfig, ResolutionPass};
use manifold_domain::Manifest;
use manifold_infrastructure::{ConfigServerConfig, HttpConfigServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

#[derive(Parser)]
#[command(
    name = "manifold",
    version,
    about = "Resolve ((variable)) references in a deployment manifest"
)]
struct Args {
    /// Path to the deployment manifest (YAML).
    #[arg(long)]
    manifest: PathBuf,

    /// Director name used to namespace relative variable names.
    #[arg(long)]
    director: String,

    /// Deployment name used to namespace relative variable names.
    #[arg(long)]
    deployment: String,

    /// Config server base URL.
    #[arg(long)]
    server: Url,

    /// Maximum concurrent config server requests.
    #[arg(long, default_value_t = PassConfig::DEFAULT_MAX_IN_FLIGHT)]
    max_in_flight: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(manifest = %args.manifest.display(), deployment = %args.deployment, "resolving manifest");

    let text = std::fs::read_to_string(&args.manifest)?;
    let manifest = Manifest::from_yaml(&text)?;

    let client = Arc::new(HttpConfigServer::new(ConfigServerConfig::new(args.server))?);
    let config = PassConfig::new(args.director, args.deployment)
        .with_max_in_flight(args.max_in_flight);

    let resolved = ResolutionPass::new(client, config)
        .run(&manifest, &[])
        .await?;

    print!("{}", resolved.to_yaml()?);
    Ok(())
}
