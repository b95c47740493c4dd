use tracing::{info, warn};

use crate::{
    courses::repo_types::{Course, CourseSort, NewCourse},
    error::AppError,
    pagination::{Page, PageRequest},
    state::AppState,
};

pub async fn create_course(state: &AppState, name: &str, category: &str) -> Result<Course, AppError> {
    let course = state
        .courses
        .insert(NewCourse {
            name: name.to_owned(),
            category: category.to_owned(),
        })
        .await?;
    info!(course_id = course.id, name = %course.name, "course created");
    Ok(course)
}

/// Active course by id.
pub async fn get_course(state: &AppState, id: i64) -> Result<Course, AppError> {
    state
        .courses
        .find_active(id)
        .await?
        .ok_or_else(|| AppError::not_found("course", id))
}

pub async fn list_courses(
    state: &AppState,
    request: PageRequest<CourseSort>,
) -> Result<Page<Course>, AppError> {
    let (content, total) = state.courses.list_active(&request).await?;
    Ok(Page::new(content, &request, total))
}

/// Overwrites name and category.
pub async fn update_course(
    state: &AppState,
    id: i64,
    name: &str,
    category: &str,
) -> Result<Course, AppError> {
    let course = state
        .courses
        .update(id, name, category)
        .await?
        .ok_or_else(|| AppError::not_found("course", id))?;
    info!(course_id = course.id, "course updated");
    Ok(course)
}

pub async fn soft_delete_course(state: &AppState, id: i64) -> Result<(), AppError> {
    if !state.courses.soft_delete(id).await? {
        warn!(course_id = id, "delete of missing course");
        return Err(AppError::not_found("course", id));
    }
    info!(course_id = id, "course soft-deleted");
    Ok(())
}
