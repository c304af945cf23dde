//! Keel inspection server binary.
//!
//! Serves daemon info and container details over a Unix domain socket.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use keel_core::config::DaemonConfig;
use keel_server::registry::ContainerRegistry;
use keel_server::server::InfoServer;

/// Keel inspection server
#[derive(Parser, Debug)]
#[command(
    name = "keel-server",
    version = keel_core::VERSION,
    about = "Keel container inspection server"
)]
struct Args {
    /// Path to a YAML daemon configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Unix socket to listen on (overrides the configuration).
    #[arg(long)]
    socket: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DaemonConfig::from_file(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(socket) = args.socket {
        config.listen = socket;
    }

    tracing::info!(
        version = keel_core::VERSION,
        socket = %config.listen.display(),
        storage = %config.storage,
        root = %config.root.display(),
        cgroup_manager = %config.cgroup_manager,
        "Starting Keel inspection server"
    );

    let server = InfoServer::new(
        config.listen.clone(),
        Arc::new(ContainerRegistry::new()),
        Arc::new(config),
    );
    server.serve().await?;

    Ok(())
}
