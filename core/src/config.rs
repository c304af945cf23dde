use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{KeelError, Result};

/// Daemon configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Storage driver name (e.g. "overlay")
    pub storage: String,

    /// Root directory of container storage
    pub root: PathBuf,

    /// Cgroup manager ("systemd" or "cgroupfs")
    pub cgroup_manager: String,

    /// Unix socket the inspection endpoint listens on
    pub listen: PathBuf,

    /// Image handling configuration
    pub image: ImageConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            storage: "overlay".to_string(),
            root: PathBuf::from("/var/lib/containers/storage"),
            cgroup_manager: "systemd".to_string(),
            listen: PathBuf::from("/var/run/keel/keel.sock"),
            image: ImageConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load a configuration from a YAML file.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            KeelError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: DaemonConfig = serde_yaml::from_str(&content)?;

        tracing::debug!(path = %path.display(), "Loaded daemon configuration");
        Ok(config)
    }
}

/// Image handling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Base directory for temporary archive extractions
    pub temp_dir: PathBuf,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
        }
    }
}
