use std::sync::Arc;

use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::courses::repo::{CourseStore, PgCourseStore};
use crate::db;
use crate::topics::repo::{PgTopicStore, TopicStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub courses: Arc<dyn CourseStore>,
    pub topics: Arc<dyn TopicStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = db::connect(&config).await?;
        Ok(Self {
            config: Arc::new(config),
            users: Arc::new(PgUserStore::new(db.clone())),
            courses: Arc::new(PgCourseStore::new(db.clone())),
            topics: Arc::new(PgTopicStore::new(db)),
        })
    }

    /// State backed by a fresh in-memory store, which is returned alongside
    /// for store-level assertions.
    #[cfg(test)]
    pub fn in_memory() -> (Self, Arc<crate::memory::MemoryStore>) {
        let store = Arc::new(crate::memory::MemoryStore::default());
        let state = Self {
            config: Arc::new(AppConfig::for_tests()),
            users: store.clone(),
            courses: store.clone(),
            topics: store.clone(),
        };
        (state, store)
    }

    /// Like `in_memory`, but every store answers existence pre-checks with
    /// "free", leaving uniqueness and course references to the store itself.
    #[cfg(test)]
    pub fn unchecked() -> (Self, Arc<crate::memory::MemoryStore>) {
        let (state, store) = Self::in_memory();
        let unchecked = Arc::new(crate::memory::UncheckedStore(store.clone()));
        let state = Self {
            users: unchecked.clone(),
            courses: unchecked.clone(),
            topics: unchecked,
            ..state
        };
        (state, store)
    }
}
