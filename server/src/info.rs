//! Daemon information served by `GET /info`.

use std::path::PathBuf;

use keel_core::config::DaemonConfig;
use serde::Serialize;

/// Storage and cgroup settings of the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaemonInfo {
    pub storage_driver: String,
    pub storage_root: PathBuf,
    pub cgroup_driver: String,
}

impl DaemonInfo {
    pub fn from_config(config: &DaemonConfig) -> Self {
        Self {
            storage_driver: config.storage.clone(),
            storage_root: config.root.clone(),
            cgroup_driver: config.cgroup_manager.clone(),
        }
    }
}
