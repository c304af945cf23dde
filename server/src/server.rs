//! HTTP server setup for the inspection API.
//!
//! Listens on a Unix domain socket.

use std::path::PathBuf;
use std::sync::Arc;

use keel_core::config::DaemonConfig;
use tokio::net::UnixListener;

use crate::api::{create_router, AppState};
use crate::registry::ContainerRegistry;

/// Inspection server configuration.
pub struct InfoServer {
    /// Path to the Unix domain socket.
    socket_path: PathBuf,
    /// Container tables.
    registry: Arc<ContainerRegistry>,
    /// Daemon configuration.
    config: Arc<DaemonConfig>,
}

impl InfoServer {
    /// Create a new inspection server.
    pub fn new(
        socket_path: PathBuf,
        registry: Arc<ContainerRegistry>,
        config: Arc<DaemonConfig>,
    ) -> Self {
        Self {
            socket_path,
            registry,
            config,
        }
    }

    /// Start serving on the Unix socket.
    pub async fn serve(&self) -> Result<(), Box<dyn std::error::Error>> {
        // Remove existing socket file if present
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let router = create_router(AppState {
            registry: self.registry.clone(),
            config: self.config.clone(),
        });

        let listener = UnixListener::bind(&self.socket_path)?;

        tracing::info!(
            socket = %self.socket_path.display(),
            "Inspection server listening"
        );

        axum::serve(listener, router).await?;

        Ok(())
    }
}
