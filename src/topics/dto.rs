use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

use crate::topics::repo_types::{Topic, TopicStatus};
use crate::validation::not_blank;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTopicRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "must not exceed 200 characters")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub body: String,
    #[serde(default)]
    #[validate(range(min = 1, message = "must reference a course"))]
    pub course_id: i64,
}

/// Title and body are always replaced; `status` only when present.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTopicRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "must not exceed 200 characters")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub body: String,
    pub status: Option<TopicStatus>,
}

#[derive(Debug, Serialize)]
pub struct TopicResponse {
    pub id: i64,
    pub title: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub status: TopicStatus,
    pub author_id: i64,
    pub course_id: i64,
}

impl From<Topic> for TopicResponse {
    fn from(topic: Topic) -> Self {
        Self {
            id: topic.id,
            title: topic.title,
            body: topic.body,
            created_at: topic.created_at,
            status: topic.status,
            author_id: topic.author_id,
            course_id: topic.course_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn create_request_requires_course_and_text() {
        let req: CreateTopicRequest = serde_json::from_str(r#"{"title":"","body":" "}"#).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("body"));
        assert!(fields.contains_key("course_id"));
    }

    #[test]
    fn client_cannot_supply_author() {
        let req: CreateTopicRequest =
            serde_json::from_str(r#"{"title":"T","body":"M","course_id":1,"author_id":42}"#)
                .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.course_id, 1);
    }

    #[test]
    fn update_status_is_optional() {
        let req: UpdateTopicRequest = serde_json::from_str(r#"{"title":"T","body":"M"}"#).unwrap();
        assert!(req.status.is_none());

        let req: UpdateTopicRequest =
            serde_json::from_str(r#"{"title":"T","body":"M","status":"RESOLVED"}"#).unwrap();
        assert_eq!(req.status, Some(TopicStatus::Resolved));

        assert!(serde_json::from_str::<UpdateTopicRequest>(
            r#"{"title":"T","body":"M","status":"ARCHIVED"}"#
        )
        .is_err());
    }

    #[test]
    fn response_renders_rfc3339_timestamp() {
        let json = serde_json::to_value(TopicResponse::from(Topic {
            id: 1,
            title: "T".into(),
            body: "M".into(),
            created_at: datetime!(2024-05-01 10:30:00 UTC),
            status: TopicStatus::Open,
            author_id: 2,
            course_id: 3,
            active: true,
        }))
        .unwrap();
        assert_eq!(json["created_at"], "2024-05-01T10:30:00Z");
        assert_eq!(json["status"], "OPEN");
        assert!(json.get("active").is_none());
    }
}
