//! Container lookup across the workload and infra tables.

use std::sync::Arc;

use keel_core::error::{KeelError, Result};

use crate::container::{Container, ContainerStore};
use crate::inspect::{self, ContainerInfo};

/// Resolves container ids against the runtime's two container tables.
///
/// Workload containers are checked first; infra (sandbox) containers only
/// when the id is not a workload container.
#[derive(Default)]
pub struct ContainerRegistry {
    containers: ContainerStore,
    infra_containers: ContainerStore,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Workload container table.
    pub fn containers(&self) -> &ContainerStore {
        &self.containers
    }

    /// Infra (sandbox) container table.
    pub fn infra_containers(&self) -> &ContainerStore {
        &self.infra_containers
    }

    /// Find a container by id in either table.
    pub async fn lookup(&self, id: &str) -> Result<Arc<Container>> {
        if let Some(container) = self.containers.get(id).await {
            return Ok(container);
        }
        if let Some(container) = self.infra_containers.get(id).await {
            tracing::debug!(id, "Resolved infra container");
            return Ok(container);
        }
        Err(KeelError::NotFound(id.to_string()))
    }

    /// Inspection view of a container.
    ///
    /// Fails with [`KeelError::InvalidState`] when the container exists but
    /// has no live state.
    pub async fn inspect(&self, id: &str) -> Result<ContainerInfo> {
        let container = self.lookup(id).await?;
        let state = container
            .state()
            .ok_or_else(|| KeelError::InvalidState(id.to_string()))?;
        Ok(inspect::project(container.record(), &state))
    }
}
