use serde::Serialize;
use sqlx::FromRow;

use crate::pagination::SortField;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseSort {
    Id,
    Name,
    Category,
}

impl SortField for CourseSort {
    const DEFAULT: Self = CourseSort::Name;

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(CourseSort::Id),
            "name" => Some(CourseSort::Name),
            "category" => Some(CourseSort::Category),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            CourseSort::Id => "id",
            CourseSort::Name => "name",
            CourseSort::Category => "category",
        }
    }
}
