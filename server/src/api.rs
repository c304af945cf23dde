//! Inspection API router and handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use keel_core::config::DaemonConfig;
use keel_core::error::KeelError;
use serde::Serialize;

use crate::error::ApiError;
use crate::info::DaemonInfo;
use crate::registry::ContainerRegistry;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Container tables.
    pub registry: Arc<ContainerRegistry>,
    /// Daemon configuration.
    pub config: Arc<DaemonConfig>,
}

/// Creates the inspection router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/info", get(get_info))
        .route("/containers/{id}", get(inspect_container))
        .with_state(state)
}

/// Get daemon info.
pub async fn get_info(State(state): State<AppState>) -> Result<Response, ApiError> {
    json_response(&DaemonInfo::from_config(&state.config))
}

/// Inspect a container or infra container.
pub async fn inspect_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let info = state.registry.inspect(&id).await?;
    json_response(&info)
}

fn json_response<T: Serialize>(value: &T) -> Result<Response, ApiError> {
    let body = serde_json::to_vec(value).map_err(KeelError::from)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
