use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    auth::repo_types::Principal,
    db::StoreError,
    error::AppError,
    pagination::{Page, PageRequest},
    state::AppState,
    topics::repo_types::{NewTopic, Topic, TopicSort, TopicStatus},
};

/// Opens a topic authored by `author` in an active course.
pub async fn create_topic(
    state: &AppState,
    author: &Principal,
    title: &str,
    body: &str,
    course_id: i64,
) -> Result<Topic, AppError> {
    if state.topics.exists_by_title_and_body(title, body, None).await? {
        warn!(user_id = author.id, "duplicate topic rejected");
        return Err(AppError::DuplicateTopic);
    }

    if state.courses.find_active(course_id).await?.is_none() {
        return Err(AppError::not_found("course", course_id));
    }

    let new_topic = NewTopic {
        title: title.to_owned(),
        body: body.to_owned(),
        created_at: OffsetDateTime::now_utc(),
        author_id: author.id,
        course_id,
    };
    let topic = match state.topics.insert(new_topic).await {
        Ok(topic) => topic,
        Err(StoreError::Conflict(constraint)) => {
            warn!(user_id = author.id, %constraint, "duplicate topic inserted concurrently");
            return Err(AppError::DuplicateTopic);
        }
        Err(StoreError::MissingReference(_)) => return Err(AppError::not_found("course", course_id)),
        Err(e) => return Err(e.into()),
    };

    info!(topic_id = topic.id, user_id = author.id, course_id, "topic created");
    Ok(topic)
}

/// Active topic by id.
pub async fn get_topic(state: &AppState, id: i64) -> Result<Topic, AppError> {
    state
        .topics
        .find_active(id)
        .await?
        .ok_or_else(|| AppError::not_found("topic", id))
}

pub async fn list_topics(
    state: &AppState,
    request: PageRequest<TopicSort>,
) -> Result<Page<Topic>, AppError> {
    let (content, total) = state.topics.list_active(&request).await?;
    Ok(Page::new(content, &request, total))
}

/// Replaces title and body, and the status when one is given. The duplicate
/// check only runs when the pair actually changes.
pub async fn update_topic(
    state: &AppState,
    id: i64,
    title: &str,
    body: &str,
    status: Option<TopicStatus>,
) -> Result<Topic, AppError> {
    let current = get_topic(state, id).await?;

    let pair_changed = current.title != title || current.body != body;
    if pair_changed
        && state
            .topics
            .exists_by_title_and_body(title, body, Some(id))
            .await?
    {
        warn!(topic_id = id, "update would duplicate another topic");
        return Err(AppError::DuplicateTopic);
    }

    // the write re-checks `active`, so a concurrent delete wins
    let topic = match state.topics.update(id, title, body, status).await {
        Ok(Some(topic)) => topic,
        Ok(None) => return Err(AppError::not_found("topic", id)),
        Err(StoreError::Conflict(constraint)) => {
            warn!(topic_id = id, %constraint, "topic pair taken concurrently");
            return Err(AppError::DuplicateTopic);
        }
        Err(e) => return Err(e.into()),
    };
    info!(topic_id = id, status = %topic.status, "topic updated");
    Ok(topic)
}

pub async fn soft_delete_topic(state: &AppState, id: i64) -> Result<(), AppError> {
    if !state.topics.soft_delete(id).await? {
        warn!(topic_id = id, "delete of missing topic");
        return Err(AppError::not_found("topic", id));
    }
    info!(topic_id = id, "topic soft-deleted");
    Ok(())
}
