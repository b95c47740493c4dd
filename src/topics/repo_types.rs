use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::db::StoreError;
use crate::pagination::SortField;

/// Discussion state of a topic. Any status may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TopicStatus {
    #[default]
    Open,
    Closed,
    Resolved,
}

impl TopicStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TopicStatus::Open => "OPEN",
            TopicStatus::Closed => "CLOSED",
            TopicStatus::Resolved => "RESOLVED",
        }
    }
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopicStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(TopicStatus::Open),
            "CLOSED" => Ok(TopicStatus::Closed),
            "RESOLVED" => Ok(TopicStatus::Resolved),
            other => Err(format!("unknown topic status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created_at: OffsetDateTime,
    pub status: TopicStatus,
    pub author_id: i64,
    pub course_id: i64,
    pub active: bool,
}

#[derive(Debug, FromRow)]
pub struct TopicRow {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created_at: OffsetDateTime,
    pub status: String,
    pub author_id: i64,
    pub course_id: i64,
    pub active: bool,
}

impl TryFrom<TopicRow> for Topic {
    type Error = StoreError;

    fn try_from(row: TopicRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(StoreError::Decode)?;
        Ok(Self {
            id: row.id,
            title: row.title,
            body: row.body,
            created_at: row.created_at,
            status,
            author_id: row.author_id,
            course_id: row.course_id,
            active: row.active,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewTopic {
    pub title: String,
    pub body: String,
    pub created_at: OffsetDateTime,
    pub author_id: i64,
    pub course_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicSort {
    Id,
    Title,
    CreatedAt,
    Status,
}

impl SortField for TopicSort {
    const DEFAULT: Self = TopicSort::CreatedAt;

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(TopicSort::Id),
            "title" => Some(TopicSort::Title),
            "created_at" => Some(TopicSort::CreatedAt),
            "status" => Some(TopicSort::Status),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            TopicSort::Id => "id",
            TopicSort::Title => "title",
            TopicSort::CreatedAt => "created_at",
            TopicSort::Status => "status",
        }
    }
}
