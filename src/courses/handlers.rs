use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    extract::{AppPath, AppQuery, ValidatedJson},
    pagination::{ListParams, Page},
    state::AppState,
};

use super::{
    dto::{CourseResponse, CreateCourseRequest, UpdateCourseRequest},
    repo_types::CourseSort,
    services,
};

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/:id",
            get(get_course).put(update_course).delete(delete_course),
        )
}

#[instrument(skip(state, principal, payload), fields(user_id = principal.id))]
pub async fn create_course(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course = services::create_course(&state, &payload.name, &payload.category).await?;
    let location = format!("/api/v1/courses/{}", course.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CourseResponse::from(course)),
    ))
}

#[instrument(skip(state, _user))]
pub async fn get_course(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> Result<Json<CourseResponse>, AppError> {
    let course = services::get_course(&state, id).await?;
    Ok(Json(course.into()))
}

#[instrument(skip(state, _user))]
pub async fn list_courses(
    State(state): State<AppState>,
    _user: AuthUser,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<Page<CourseResponse>>, AppError> {
    let request = params.into_page_request::<CourseSort>()?;
    let page = services::list_courses(&state, request).await?;
    Ok(Json(page.map(CourseResponse::from)))
}

#[instrument(skip(state, _user, payload))]
pub async fn update_course(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateCourseRequest>,
) -> Result<Json<CourseResponse>, AppError> {
    let course = services::update_course(&state, id, &payload.name, &payload.category).await?;
    Ok(Json(course.into()))
}

#[instrument(skip(state, _user))]
pub async fn delete_course(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    services::soft_delete_course(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
