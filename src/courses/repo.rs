use async_trait::async_trait;
use sqlx::PgPool;

use crate::courses::repo_types::{Course, CourseSort, NewCourse};
use crate::db::StoreError;
use crate::pagination::{PageRequest, SortField};

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn insert(&self, course: NewCourse) -> Result<Course, StoreError>;

    /// Fetch by id regardless of the active flag.
    async fn find_by_id(&self, id: i64) -> Result<Option<Course>, StoreError>;

    async fn find_active(&self, id: i64) -> Result<Option<Course>, StoreError>;

    /// One page of active courses plus the total active count.
    async fn list_active(
        &self,
        request: &PageRequest<CourseSort>,
    ) -> Result<(Vec<Course>, i64), StoreError>;

    /// Overwrite name and category of an active course. `None` when no active
    /// course has that id at the time of the write.
    async fn update(
        &self,
        id: i64,
        name: &str,
        category: &str,
    ) -> Result<Option<Course>, StoreError>;

    /// Flip an active course to inactive. `false` when it was not active.
    async fn soft_delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgCourseStore {
    db: PgPool,
}

impl PgCourseStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseStore for PgCourseStore {
    async fn insert(&self, course: NewCourse) -> Result<Course, StoreError> {
        let row = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (name, category)
            VALUES ($1, $2)
            RETURNING id, name, category, active
            "#,
        )
        .bind(&course.name)
        .bind(&course.category)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Course>, StoreError> {
        let row = sqlx::query_as::<_, Course>(
            r#"SELECT id, name, category, active FROM courses WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_active(&self, id: i64) -> Result<Option<Course>, StoreError> {
        let row = sqlx::query_as::<_, Course>(
            r#"SELECT id, name, category, active FROM courses WHERE id = $1 AND active"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_active(
        &self,
        request: &PageRequest<CourseSort>,
    ) -> Result<(Vec<Course>, i64), StoreError> {
        // column and direction come from closed enums, never from raw input
        let sql = format!(
            "SELECT id, name, category, active FROM courses WHERE active \
             ORDER BY {} {}, id ASC LIMIT $1 OFFSET $2",
            request.sort.column(),
            request.direction.as_sql()
        );
        let rows = sqlx::query_as::<_, Course>(&sql)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(&self.db)
            .await?;
        let total = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM courses WHERE active"#)
            .fetch_one(&self.db)
            .await?;
        Ok((rows, total))
    }

    async fn update(
        &self,
        id: i64,
        name: &str,
        category: &str,
    ) -> Result<Option<Course>, StoreError> {
        let row = sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses
               SET name = $2, category = $3
             WHERE id = $1 AND active
            RETURNING id, name, category, active
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(category)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(r#"UPDATE courses SET active = FALSE WHERE id = $1 AND active"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
