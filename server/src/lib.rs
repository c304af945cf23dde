//! Keel Server - container inspection endpoint.
//!
//! Serves daemon info and per-container details over HTTP:
//! - `GET /info` → storage and cgroup settings
//! - `GET /containers/{id}` → workload or infra container details

pub mod api;
pub mod container;
pub mod error;
pub mod info;
pub mod inspect;
pub mod registry;
pub mod server;

pub use api::{create_router, AppState};
pub use container::{Container, ContainerRecord, ContainerState, ContainerStore};
pub use info::DaemonInfo;
pub use inspect::ContainerInfo;
pub use registry::ContainerRegistry;
