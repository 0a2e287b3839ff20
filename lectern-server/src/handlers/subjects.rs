use axum::{Json, extract::State, http::StatusCode};
use lectern_core::api::{ApiResponse, CreateSubjectRequest};
use lectern_model::{Subject, SubjectSummary};
use tracing::info;

use crate::infra::{actor::Actor, app_state::AppState, errors::AppResult};

pub async fn list_subjects(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<SubjectSummary>>>> {
    let subjects = state.service().list_subjects().await?;
    Ok(Json(ApiResponse::success(subjects)))
}

pub async fn create_subject(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(request): Json<CreateSubjectRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Subject>>)> {
    let subject = state
        .service()
        .create_subject(request.title, request.slug)
        .await?;
    info!(subject_id = %subject.id, %actor, "subject created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(subject))))
}
