use axum::{
    Json,
    extract::{Path, State},
};
use lectern_core::{
    api::ApiResponse,
    application::views::{CourseWithContents, StudentCourseView},
};
use lectern_model::{Course, CourseId, ModuleId};

use crate::infra::{actor::Actor, app_state::AppState, errors::AppResult};

pub async fn enroll(
    State(state): State<AppState>,
    Actor(student): Actor,
    Path(course_id): Path<CourseId>,
) -> AppResult<Json<ApiResponse<Course>>> {
    let course = state.service().enroll(course_id, student).await?;
    Ok(Json(ApiResponse::success(course)))
}

pub async fn list_enrolled_courses(
    State(state): State<AppState>,
    Actor(student): Actor,
) -> AppResult<Json<ApiResponse<Vec<Course>>>> {
    let courses = state.service().list_enrolled_courses(student).await?;
    Ok(Json(ApiResponse::success(courses)))
}

/// The whole course, modules and rendered contents in order.
pub async fn course_contents(
    State(state): State<AppState>,
    Actor(student): Actor,
    Path(course_id): Path<CourseId>,
) -> AppResult<Json<ApiResponse<CourseWithContents>>> {
    let view = state.service().course_contents(course_id, student).await?;
    Ok(Json(ApiResponse::success(view)))
}

pub async fn study_course(
    State(state): State<AppState>,
    Actor(student): Actor,
    Path(course_id): Path<CourseId>,
) -> AppResult<Json<ApiResponse<StudentCourseView>>> {
    let view = state
        .service()
        .student_module(course_id, None, student)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

pub async fn study_module(
    State(state): State<AppState>,
    Actor(student): Actor,
    Path((course_id, module_id)): Path<(CourseId, ModuleId)>,
) -> AppResult<Json<ApiResponse<StudentCourseView>>> {
    let view = state
        .service()
        .student_module(course_id, Some(module_id), student)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}
