//! Container records and the in-memory tables holding them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Static description of a container, fixed when the runtime creates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerRecord {
    /// Unique container identifier.
    pub id: String,
    /// Image reference the container was created from.
    pub image: String,
    /// Container labels.
    pub labels: HashMap<String, String>,
    /// Container annotations.
    pub annotations: HashMap<String, String>,
    /// Log file path.
    pub log_path: PathBuf,
    /// Mounted root filesystem.
    pub mount_point: PathBuf,
    /// Owning sandbox identifier.
    pub sandbox: String,
}

/// Point-in-time dynamic state of a running container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerState {
    /// Process id of the container's init process.
    pub pid: i32,
    /// When the container was created.
    pub created: DateTime<Utc>,
}

/// A container known to the runtime.
///
/// The live state is replaced as a whole and read as a copy, so readers
/// never see a pid from one state paired with the creation time of another.
#[derive(Debug)]
pub struct Container {
    record: ContainerRecord,
    state: parking_lot::RwLock<Option<ContainerState>>,
}

impl Container {
    /// A container that has not produced any state yet.
    pub fn new(record: ContainerRecord) -> Self {
        Self {
            record,
            state: parking_lot::RwLock::new(None),
        }
    }

    /// A container with an initial state.
    pub fn with_state(record: ContainerRecord, state: ContainerState) -> Self {
        Self {
            record,
            state: parking_lot::RwLock::new(Some(state)),
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn record(&self) -> &ContainerRecord {
        &self.record
    }

    /// Snapshot of the live state, `None` if not started or already torn down.
    pub fn state(&self) -> Option<ContainerState> {
        *self.state.read()
    }

    /// Replace the live state.
    pub fn set_state(&self, state: Option<ContainerState>) {
        *self.state.write() = state;
    }
}

/// In-memory table of containers keyed by id.
pub struct ContainerStore {
    containers: Arc<RwLock<HashMap<String, Arc<Container>>>>,
}

impl ContainerStore {
    /// Create a new empty container store.
    pub fn new() -> Self {
        Self {
            containers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Add a container to the store, replacing any with the same id.
    pub async fn add(&self, container: Container) -> Arc<Container> {
        let container = Arc::new(container);
        let mut store = self.containers.write().await;
        store.insert(container.id().to_string(), container.clone());
        container
    }

    /// Get a container by ID.
    pub async fn get(&self, id: &str) -> Option<Arc<Container>> {
        let store = self.containers.read().await;
        store.get(id).cloned()
    }

    /// Remove a container by ID.
    pub async fn remove(&self, id: &str) -> Option<Arc<Container>> {
        let mut store = self.containers.write().await;
        store.remove(id)
    }

    /// Number of containers in the store.
    pub async fn len(&self) -> usize {
        self.containers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.containers.read().await.is_empty()
    }
}

impl Default for ContainerStore {
    fn default() -> Self {
        Self::new()
    }
}
