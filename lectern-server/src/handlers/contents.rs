use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use lectern_core::{
    api::{ApiResponse, OrderSaved},
    application::views::RenderedContent,
};
use lectern_model::{ContentId, ContentKind, ItemFields, ModuleId};
use serde_json::Value;
use tracing::debug;

use super::malformed_order;
use crate::infra::{actor::Actor, app_state::AppState, errors::AppResult};

/// Module contents for the course author or an enrolled student.
pub async fn list_module_contents(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(module_id): Path<ModuleId>,
) -> AppResult<Json<ApiResponse<Vec<RenderedContent>>>> {
    let contents = state
        .service()
        .list_contents_for(module_id, actor)
        .await?;
    Ok(Json(ApiResponse::success(contents)))
}

/// Create a content slot of `kind` (`text`, `video`, `image` or `file`).
pub async fn create_content(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((module_id, kind)): Path<(ModuleId, String)>,
    Json(fields): Json<ItemFields>,
) -> AppResult<(StatusCode, Json<ApiResponse<RenderedContent>>)> {
    let kind: ContentKind = kind.parse()?;
    let content = state
        .service()
        .create_content(module_id, kind, fields, actor)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(RenderedContent::from(&content))),
    ))
}

pub async fn update_content(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(content_id): Path<ContentId>,
    Json(fields): Json<ItemFields>,
) -> AppResult<Json<ApiResponse<RenderedContent>>> {
    let content = state
        .service()
        .update_content_item(content_id, fields, actor)
        .await?;
    Ok(Json(ApiResponse::success(RenderedContent::from(&content))))
}

pub async fn delete_content(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(content_id): Path<ContentId>,
) -> AppResult<StatusCode> {
    state.service().delete_content(content_id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Persist a drag-and-drop arrangement: `{"<content id>": position, ...}`.
pub async fn reorder_contents(
    State(state): State<AppState>,
    Actor(actor): Actor,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<OrderSaved>> {
    let Json(payload) = payload.map_err(malformed_order)?;
    let outcome = state.service().reorder_contents(&payload, actor).await?;
    debug!(
        applied = outcome.applied.len(),
        skipped = outcome.skipped.len(),
        "content order saved"
    );
    Ok(Json(OrderSaved::ok()))
}
