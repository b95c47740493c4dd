use serde::{Deserialize, Serialize};

use crate::error::{AppError, FieldErrors};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Whitelisted sort columns for one entity.
pub trait SortField: Copy + std::fmt::Debug {
    /// Sort applied when the caller names none.
    const DEFAULT: Self;

    fn parse(name: &str) -> Option<Self>;

    fn column(self) -> &'static str;
}

/// Raw `?page=&size=&sort=&direction=` query.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<S> {
    pub page: u32,
    pub size: u32,
    pub sort: S,
    pub direction: Direction,
}

impl<S: SortField> PageRequest<S> {
    #[cfg(test)]
    pub fn first(size: u32) -> Self {
        Self {
            page: 0,
            size,
            sort: S::DEFAULT,
            direction: Direction::Asc,
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl ListParams {
    pub fn into_page_request<S: SortField>(self) -> Result<PageRequest<S>, AppError> {
        let mut errors = FieldErrors::new();

        let page = match self.page.unwrap_or(0) {
            p if (0..=i64::from(u32::MAX)).contains(&p) => p as u32,
            _ => {
                errors.insert("page".into(), "must be zero or greater".into());
                0
            }
        };

        let size = match self.size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE)) {
            s if (1..=i64::from(MAX_PAGE_SIZE)).contains(&s) => s as u32,
            _ => {
                errors.insert(
                    "size".into(),
                    format!("must be between 1 and {}", MAX_PAGE_SIZE),
                );
                DEFAULT_PAGE_SIZE
            }
        };

        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") => S::DEFAULT,
            Some(name) => S::parse(name).unwrap_or_else(|| {
                errors.insert("sort".into(), format!("cannot sort by '{}'", name));
                S::DEFAULT
            }),
        };

        let direction = match self.direction.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("") | Some("asc") => Direction::Asc,
            Some("desc") => Direction::Desc,
            Some(_) => {
                errors.insert("direction".into(), "must be 'asc' or 'desc'".into());
                Direction::Asc
            }
        };

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(PageRequest {
            page,
            size,
            sort,
            direction,
        })
    }
}

/// One page of results plus totals, serialized as the list response body.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new<S>(content: Vec<T>, request: &PageRequest<S>, total_elements: i64) -> Self {
        let size = i64::from(request.size.max(1));
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: (total_elements + size - 1) / size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
