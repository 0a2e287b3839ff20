use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use lectern_core::api::ApiResponse;
use lectern_model::{Course, CourseDraft, CourseId, Module, ModuleDraft};

use crate::infra::{actor::Actor, app_state::AppState, errors::AppResult};

pub async fn list_courses(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Course>>>> {
    let courses = state.service().list_courses().await?;
    Ok(Json(ApiResponse::success(courses)))
}

pub async fn list_my_courses(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> AppResult<Json<ApiResponse<Vec<Course>>>> {
    let courses = state.service().list_owned_courses(actor).await?;
    Ok(Json(ApiResponse::success(courses)))
}

pub async fn create_course(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(draft): Json<CourseDraft>,
) -> AppResult<(StatusCode, Json<ApiResponse<Course>>)> {
    let course = state.service().create_course(actor, draft).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(course))))
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> AppResult<Json<ApiResponse<Course>>> {
    let course = state.service().get_course(course_id).await?;
    Ok(Json(ApiResponse::success(course)))
}

pub async fn update_course(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(course_id): Path<CourseId>,
    Json(draft): Json<CourseDraft>,
) -> AppResult<Json<ApiResponse<Course>>> {
    let course = state
        .service()
        .update_course(course_id, draft, actor)
        .await?;
    Ok(Json(ApiResponse::success(course)))
}

pub async fn delete_course(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(course_id): Path<CourseId>,
) -> AppResult<StatusCode> {
    state.service().delete_course(course_id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_course_modules(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> AppResult<Json<ApiResponse<Vec<Module>>>> {
    let modules = state.service().list_modules(course_id).await?;
    Ok(Json(ApiResponse::success(modules.into_vec())))
}

pub async fn create_module(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(course_id): Path<CourseId>,
    Json(draft): Json<ModuleDraft>,
) -> AppResult<(StatusCode, Json<ApiResponse<Module>>)> {
    let module = state
        .service()
        .create_module(course_id, draft, actor)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(module))))
}
