use axum::extract::{Path, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use vigil_core::status::AggregateStatus;
use vigil_core::time::now_millis;

use crate::error::AppError;
use crate::registry::InstanceRegistry;
use crate::state::AppState;

/// Request body for the start/stop/heartbeat reporting endpoints. All
/// fields are optional; a missing instance id maps to `"default"`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportBody {
    pub instance_id: Option<String>,
    pub name: Option<String>,
    pub source: Option<String>,
}

/// Request body for `POST /api/unregister`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnregisterBody {
    pub instance_id: Option<String>,
}

/// Aggregate verdict plus server uptime, returned by `GET /api/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: AggregateStatus,
    pub uptime: f64,
}

/// Response shape shared by all mutating instance endpoints: the call's
/// outcome plus the post-mutation aggregate, so reporting clients see
/// the verdict they just caused without a second round trip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub status: AggregateStatus,
}

/// GET /api/status — sweep, then return the current aggregate verdict.
///
/// The lazy sweep here (and in every mutating handler below) means a
/// client never observes stale "active" status even if the background
/// sweep cadence lags.
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let now = now_millis();
    let status = {
        let mut registry = state.registry.write().await;
        registry.sweep_timeouts(now, state.config.registry.timeout_ms);
        registry.aggregate()
    };
    Json(StatusResponse {
        status,
        uptime: state.uptime_secs(),
    })
}

/// POST /api/start — an agent session reports it is actively working.
pub async fn start_instance(
    State(state): State<AppState>,
    Json(body): Json<ReportBody>,
) -> Json<MutationResponse> {
    let now = now_millis();
    let id = InstanceRegistry::resolve_id(body.instance_id);
    let status = {
        let mut registry = state.registry.write().await;
        registry.start(&id, body.name, body.source.clone(), now);
        registry.sweep_timeouts(now, state.config.registry.timeout_ms);
        registry.aggregate()
    };
    Json(MutationResponse {
        success: true,
        instance_id: Some(id),
        source: body.source,
        status,
    })
}

/// POST /api/stop — an agent session reports it is waiting for input.
pub async fn stop_instance(
    State(state): State<AppState>,
    Json(body): Json<ReportBody>,
) -> Json<MutationResponse> {
    let now = now_millis();
    let id = InstanceRegistry::resolve_id(body.instance_id);
    let status = {
        let mut registry = state.registry.write().await;
        registry.stop(&id, body.source.clone(), now);
        registry.sweep_timeouts(now, state.config.registry.timeout_ms);
        registry.aggregate()
    };
    Json(MutationResponse {
        success: true,
        instance_id: Some(id),
        source: body.source,
        status,
    })
}

/// POST /api/heartbeat — keep a working session alive. A heartbeat for
/// an unknown or already waiting instance is a no-op, reported as
/// `success: false` rather than an error.
pub async fn heartbeat(
    State(state): State<AppState>,
    Json(body): Json<ReportBody>,
) -> Json<MutationResponse> {
    let now = now_millis();
    let id = InstanceRegistry::resolve_id(body.instance_id);
    let (refreshed, status) = {
        let mut registry = state.registry.write().await;
        let refreshed = registry.heartbeat(&id, now);
        registry.sweep_timeouts(now, state.config.registry.timeout_ms);
        (refreshed, registry.aggregate())
    };
    Json(MutationResponse {
        success: refreshed,
        instance_id: Some(id),
        source: None,
        status,
    })
}

/// DELETE /api/instance/{id} — remove an instance entirely.
pub async fn delete_instance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<MutationResponse> {
    remove_instance(&state, &id).await
}

/// POST /api/unregister — body-based removal, avoiding URL encoding
/// issues with exotic instance ids. 400 when the id is missing.
pub async fn unregister(
    State(state): State<AppState>,
    Json(body): Json<UnregisterBody>,
) -> Result<Json<MutationResponse>, AppError> {
    let Some(id) = body.instance_id else {
        return Err(AppError::BadRequest("instanceId is required".to_string()));
    };
    Ok(remove_instance(&state, &id).await)
}

async fn remove_instance(state: &AppState, id: &str) -> Json<MutationResponse> {
    let now = now_millis();
    let (removed, status) = {
        let mut registry = state.registry.write().await;
        let removed = registry.unregister(id);
        registry.sweep_timeouts(now, state.config.registry.timeout_ms);
        (removed, registry.aggregate())
    };
    Json(MutationResponse {
        success: removed,
        instance_id: None,
        source: None,
        status,
    })
}
