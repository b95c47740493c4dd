use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::StoreError;
use crate::pagination::{PageRequest, SortField};
use crate::topics::repo_types::{NewTopic, Topic, TopicRow, TopicSort, TopicStatus};

const TOPIC_COLUMNS: &str = "id, title, body, created_at, status, author_id, course_id, active";

#[async_trait]
pub trait TopicStore: Send + Sync {
    /// Whether any topic, active or not, holds exactly this title and body.
    /// `exclude_id` leaves one topic out of the comparison.
    async fn exists_by_title_and_body(
        &self,
        title: &str,
        body: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, StoreError>;

    /// Insert an `OPEN`, active topic. The course must exist and be active at
    /// the time of the write (`StoreError::MissingReference`), and the title/body
    /// pair must be unused (`StoreError::Conflict`).
    async fn insert(&self, topic: NewTopic) -> Result<Topic, StoreError>;

    /// Fetch by id regardless of the active flag.
    async fn find_by_id(&self, id: i64) -> Result<Option<Topic>, StoreError>;

    async fn find_active(&self, id: i64) -> Result<Option<Topic>, StoreError>;

    async fn list_active(
        &self,
        request: &PageRequest<TopicSort>,
    ) -> Result<(Vec<Topic>, i64), StoreError>;

    /// Overwrite title and body, and status when given, of an active topic.
    /// `None` when no active topic has that id at the time of the write.
    async fn update(
        &self,
        id: i64,
        title: &str,
        body: &str,
        status: Option<TopicStatus>,
    ) -> Result<Option<Topic>, StoreError>;

    /// Flip an active topic to inactive. `false` when it was not active.
    async fn soft_delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgTopicStore {
    db: PgPool,
}

impl PgTopicStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TopicStore for PgTopicStore {
    async fn exists_by_title_and_body(
        &self,
        title: &str,
        body: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM topics
                 WHERE title = $1 AND body = $2
                   AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(exclude_id)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, topic: NewTopic) -> Result<Topic, StoreError> {
        let mut tx = self.db.begin().await?;

        // share lock keeps the course from being soft-deleted until commit
        let course_active = sqlx::query_scalar::<_, bool>(
            r#"SELECT active FROM courses WHERE id = $1 FOR SHARE"#,
        )
        .bind(topic.course_id)
        .fetch_optional(&mut *tx)
        .await?;
        if course_active != Some(true) {
            return Err(StoreError::MissingReference("course"));
        }

        let sql = format!(
            "INSERT INTO topics (title, body, created_at, status, author_id, course_id) \
             VALUES ($1, $2, $3, 'OPEN', $4, $5) RETURNING {}",
            TOPIC_COLUMNS
        );
        let row = sqlx::query_as::<_, TopicRow>(&sql)
            .bind(&topic.title)
            .bind(&topic.body)
            .bind(topic.created_at)
            .bind(topic.author_id)
            .bind(topic.course_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Topic::try_from(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Topic>, StoreError> {
        let sql = format!("SELECT {} FROM topics WHERE id = $1", TOPIC_COLUMNS);
        let row = sqlx::query_as::<_, TopicRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        row.map(Topic::try_from).transpose()
    }

    async fn find_active(&self, id: i64) -> Result<Option<Topic>, StoreError> {
        let sql = format!("SELECT {} FROM topics WHERE id = $1 AND active", TOPIC_COLUMNS);
        let row = sqlx::query_as::<_, TopicRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        row.map(Topic::try_from).transpose()
    }

    async fn list_active(
        &self,
        request: &PageRequest<TopicSort>,
    ) -> Result<(Vec<Topic>, i64), StoreError> {
        let sql = format!(
            "SELECT {} FROM topics WHERE active ORDER BY {} {}, id ASC LIMIT $1 OFFSET $2",
            TOPIC_COLUMNS,
            request.sort.column(),
            request.direction.as_sql()
        );
        let rows = sqlx::query_as::<_, TopicRow>(&sql)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(&self.db)
            .await?;
        let total = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM topics WHERE active"#)
            .fetch_one(&self.db)
            .await?;
        let topics = rows
            .into_iter()
            .map(Topic::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((topics, total))
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        body: &str,
        status: Option<TopicStatus>,
    ) -> Result<Option<Topic>, StoreError> {
        let sql = format!(
            "UPDATE topics SET title = $2, body = $3, status = COALESCE($4, status) \
             WHERE id = $1 AND active RETURNING {}",
            TOPIC_COLUMNS
        );
        let row = sqlx::query_as::<_, TopicRow>(&sql)
            .bind(id)
            .bind(title)
            .bind(body)
            .bind(status.map(TopicStatus::as_str))
            .fetch_optional(&self.db)
            .await?;
        row.map(Topic::try_from).transpose()
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(r#"UPDATE topics SET active = FALSE WHERE id = $1 AND active"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
