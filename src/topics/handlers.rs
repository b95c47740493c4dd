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
    dto::{CreateTopicRequest, TopicResponse, UpdateTopicRequest},
    repo_types::TopicSort,
    services,
};

pub fn topic_routes() -> Router<AppState> {
    Router::new()
        .route("/topics", get(list_topics).post(create_topic))
        .route(
            "/topics/:id",
            get(get_topic).put(update_topic).delete(delete_topic),
        )
}

#[instrument(skip(state, principal, payload), fields(user_id = principal.id))]
pub async fn create_topic(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateTopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    let topic = services::create_topic(
        &state,
        &principal,
        &payload.title,
        &payload.body,
        payload.course_id,
    )
    .await?;
    let location = format!("/api/v1/topics/{}", topic.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TopicResponse::from(topic)),
    ))
}

#[instrument(skip(state, _user))]
pub async fn get_topic(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> Result<Json<TopicResponse>, AppError> {
    let topic = services::get_topic(&state, id).await?;
    Ok(Json(topic.into()))
}

#[instrument(skip(state, _user))]
pub async fn list_topics(
    State(state): State<AppState>,
    _user: AuthUser,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<Page<TopicResponse>>, AppError> {
    let request = params.into_page_request::<TopicSort>()?;
    let page = services::list_topics(&state, request).await?;
    Ok(Json(page.map(TopicResponse::from)))
}

#[instrument(skip(state, principal, payload), fields(user_id = principal.id))]
pub async fn update_topic(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateTopicRequest>,
) -> Result<Json<TopicResponse>, AppError> {
    let topic =
        services::update_topic(&state, id, &payload.title, &payload.body, payload.status).await?;
    Ok(Json(topic.into()))
}

#[instrument(skip(state, principal), fields(user_id = principal.id))]
pub async fn delete_topic(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    services::soft_delete_topic(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
