use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use lectern_core::api::{ApiResponse, OrderSaved, UpdateModuleRequest};
use lectern_model::{Module, ModuleId};
use serde_json::Value;
use tracing::debug;

use super::malformed_order;
use crate::infra::{actor::Actor, app_state::AppState, errors::AppResult};

pub async fn update_module(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(module_id): Path<ModuleId>,
    Json(request): Json<UpdateModuleRequest>,
) -> AppResult<Json<ApiResponse<Module>>> {
    let module = state
        .service()
        .update_module(module_id, request.title, request.description, actor)
        .await?;
    Ok(Json(ApiResponse::success(module)))
}

pub async fn delete_module(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(module_id): Path<ModuleId>,
) -> AppResult<StatusCode> {
    state.service().delete_module(module_id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Persist a drag-and-drop arrangement: `{"<module id>": position, ...}`.
///
/// Ids the actor does not own, or that no longer exist, are skipped; the
/// response does not distinguish them from applied ones.
pub async fn reorder_modules(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<OrderSaved>> {
    let Json(payload) = payload.map_err(malformed_order)?;
    let outcome = state.service().reorder_modules(&payload, actor).await?;
    debug!(
        applied = outcome.applied.len(),
        skipped = outcome.skipped.len(),
        "module order saved"
    );
    Ok(Json(OrderSaved::ok()))
}
