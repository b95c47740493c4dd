use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::courses::repo_types::Course;
use crate::validation::not_blank;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must not exceed 100 characters")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must not exceed 100 characters")
    )]
    pub category: String,
}

/// Full replacement of a course's editable fields.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must not exceed 100 characters")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "must not exceed 100 characters")
    )]
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub id: i64,
    pub name: String,
    pub category: String,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            name: course.name,
            category: course.category,
        }
    }
}
