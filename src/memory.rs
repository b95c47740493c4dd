//! In-process store used by the unit and router tests. It enforces the same
//! constraints as the Postgres schema.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::auth::repo::UserStore;
use crate::auth::repo_types::{NewUser, User};
use crate::courses::repo::CourseStore;
use crate::courses::repo_types::{Course, CourseSort, NewCourse};
use crate::db::StoreError;
use crate::pagination::{Direction, PageRequest};
use crate::topics::repo::TopicStore;
use crate::topics::repo_types::{NewTopic, Topic, TopicSort, TopicStatus};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    courses: Vec<Course>,
    topics: Vec<Topic>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }

    pub fn set_user_active(&self, email: &str, active: bool) {
        let mut tables = self.lock();
        if let Some(user) = tables.users.iter_mut().find(|u| u.email == email) {
            user.active = active;
        }
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }
}

fn page<T: Clone>(
    mut rows: Vec<T>,
    direction: Direction,
    offset: i64,
    limit: i64,
    cmp: impl Fn(&T, &T) -> Ordering,
    id: impl Fn(&T) -> i64,
) -> (Vec<T>, i64) {
    rows.sort_by(|a, b| {
        let primary = match direction {
            Direction::Asc => cmp(a, b),
            Direction::Desc => cmp(b, a),
        };
        primary.then_with(|| id(a).cmp(&id(b)))
    });
    let total = rows.len() as i64;
    let content = rows
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
    (content, total)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.lock().users.iter().any(|u| u.email == email))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users_email_key".into()));
        }
        let stored = User {
            id: tables.users.len() as i64 + 1,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            roles: user.roles,
            active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn insert(&self, course: NewCourse) -> Result<Course, StoreError> {
        let mut tables = self.lock();
        let stored = Course {
            id: tables.courses.len() as i64 + 1,
            name: course.name,
            category: course.category,
            active: true,
        };
        tables.courses.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Course>, StoreError> {
        Ok(self.lock().courses.iter().find(|c| c.id == id).cloned())
    }

    async fn find_active(&self, id: i64) -> Result<Option<Course>, StoreError> {
        Ok(self
            .lock()
            .courses
            .iter()
            .find(|c| c.id == id && c.active)
            .cloned())
    }

    async fn list_active(
        &self,
        request: &PageRequest<CourseSort>,
    ) -> Result<(Vec<Course>, i64), StoreError> {
        let rows: Vec<Course> = self
            .lock()
            .courses
            .iter()
            .filter(|c| c.active)
            .cloned()
            .collect();
        let sort = request.sort;
        Ok(page(
            rows,
            request.direction,
            request.offset(),
            request.limit(),
            |a, b| match sort {
                CourseSort::Id => a.id.cmp(&b.id),
                CourseSort::Name => a.name.cmp(&b.name),
                CourseSort::Category => a.category.cmp(&b.category),
            },
            |c| c.id,
        ))
    }

    async fn update(
        &self,
        id: i64,
        name: &str,
        category: &str,
    ) -> Result<Option<Course>, StoreError> {
        let mut tables = self.lock();
        let Some(stored) = tables.courses.iter_mut().find(|c| c.id == id && c.active) else {
            return Ok(None);
        };
        stored.name = name.to_owned();
        stored.category = category.to_owned();
        Ok(Some(stored.clone()))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.lock();
        match tables.courses.iter_mut().find(|c| c.id == id && c.active) {
            Some(stored) => {
                stored.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TopicStore for MemoryStore {
    async fn exists_by_title_and_body(
        &self,
        title: &str,
        body: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, StoreError> {
        Ok(self.lock().topics.iter().any(|t| {
            t.title == title && t.body == body && Some(t.id) != exclude_id
        }))
    }

    async fn insert(&self, topic: NewTopic) -> Result<Topic, StoreError> {
        let mut tables = self.lock();
        let course_active = tables
            .courses
            .iter()
            .any(|c| c.id == topic.course_id && c.active);
        if !course_active {
            return Err(StoreError::MissingReference("course"));
        }
        if tables
            .topics
            .iter()
            .any(|t| t.title == topic.title && t.body == topic.body)
        {
            return Err(StoreError::Conflict("topics_title_body_key".into()));
        }
        let stored = Topic {
            id: tables.topics.len() as i64 + 1,
            title: topic.title,
            body: topic.body,
            created_at: topic.created_at,
            status: TopicStatus::Open,
            author_id: topic.author_id,
            course_id: topic.course_id,
            active: true,
        };
        tables.topics.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Topic>, StoreError> {
        Ok(self.lock().topics.iter().find(|t| t.id == id).cloned())
    }

    async fn find_active(&self, id: i64) -> Result<Option<Topic>, StoreError> {
        Ok(self
            .lock()
            .topics
            .iter()
            .find(|t| t.id == id && t.active)
            .cloned())
    }

    async fn list_active(
        &self,
        request: &PageRequest<TopicSort>,
    ) -> Result<(Vec<Topic>, i64), StoreError> {
        let rows: Vec<Topic> = self
            .lock()
            .topics
            .iter()
            .filter(|t| t.active)
            .cloned()
            .collect();
        let sort = request.sort;
        Ok(page(
            rows,
            request.direction,
            request.offset(),
            request.limit(),
            |a, b| match sort {
                TopicSort::Id => a.id.cmp(&b.id),
                TopicSort::Title => a.title.cmp(&b.title),
                TopicSort::CreatedAt => a.created_at.cmp(&b.created_at),
                TopicSort::Status => a.status.as_str().cmp(b.status.as_str()),
            },
            |t| t.id,
        ))
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        body: &str,
        status: Option<TopicStatus>,
    ) -> Result<Option<Topic>, StoreError> {
        let mut tables = self.lock();
        if !tables.topics.iter().any(|t| t.id == id && t.active) {
            return Ok(None);
        }
        if tables
            .topics
            .iter()
            .any(|t| t.id != id && t.title == title && t.body == body)
        {
            return Err(StoreError::Conflict("topics_title_body_key".into()));
        }
        let Some(stored) = tables.topics.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        stored.title = title.to_owned();
        stored.body = body.to_owned();
        if let Some(status) = status {
            stored.status = status;
        }
        Ok(Some(stored.clone()))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.lock();
        match tables.topics.iter_mut().find(|t| t.id == id && t.active) {
            Some(stored) => {
                stored.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Answers every existence pre-check as if the write were free to go ahead,
/// so the store's own constraints decide. Mirrors a second request winning
/// the race between a service's check and its write.
pub struct UncheckedStore(pub Arc<MemoryStore>);

#[async_trait]
impl UserStore for UncheckedStore {
    async fn exists_by_email(&self, _email: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        UserStore::find_by_email(&*self.0, email).await
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        UserStore::insert(&*self.0, user).await
    }
}

#[async_trait]
impl CourseStore for UncheckedStore {
    async fn insert(&self, course: NewCourse) -> Result<Course, StoreError> {
        CourseStore::insert(&*self.0, course).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Course>, StoreError> {
        CourseStore::find_by_id(&*self.0, id).await
    }

    async fn find_active(&self, id: i64) -> Result<Option<Course>, StoreError> {
        Ok(Some(Course {
            id,
            name: String::new(),
            category: String::new(),
            active: true,
        }))
    }

    async fn list_active(
        &self,
        request: &PageRequest<CourseSort>,
    ) -> Result<(Vec<Course>, i64), StoreError> {
        CourseStore::list_active(&*self.0, request).await
    }

    async fn update(
        &self,
        id: i64,
        name: &str,
        category: &str,
    ) -> Result<Option<Course>, StoreError> {
        CourseStore::update(&*self.0, id, name, category).await
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, StoreError> {
        CourseStore::soft_delete(&*self.0, id).await
    }
}

#[async_trait]
impl TopicStore for UncheckedStore {
    async fn exists_by_title_and_body(
        &self,
        _title: &str,
        _body: &str,
        _exclude_id: Option<i64>,
    ) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn insert(&self, topic: NewTopic) -> Result<Topic, StoreError> {
        TopicStore::insert(&*self.0, topic).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Topic>, StoreError> {
        TopicStore::find_by_id(&*self.0, id).await
    }

    async fn find_active(&self, id: i64) -> Result<Option<Topic>, StoreError> {
        TopicStore::find_active(&*self.0, id).await
    }

    async fn list_active(
        &self,
        request: &PageRequest<TopicSort>,
    ) -> Result<(Vec<Topic>, i64), StoreError> {
        TopicStore::list_active(&*self.0, request).await
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        body: &str,
        status: Option<TopicStatus>,
    ) -> Result<Option<Topic>, StoreError> {
        TopicStore::update(&*self.0, id, title, body, status).await
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, StoreError> {
        TopicStore::soft_delete(&*self.0, id).await
    }
}
