//! Fluent descriptors for list and point queries.
//!
//! Every constructor hands out a fresh value; nothing is shared between two
//! configurations. The `with_*` methods take the builder by value, change it
//! and give it back, so a configuration is finished before it is lent to an
//! operation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::Filter;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_SORT_FIELD: &str = "updated_at";

/// Error type returned by post-fetch hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Sort direction for the `ORDER BY` clause of a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-row transform applied after a list fetch.
///
/// The hook borrows the row and returns its replacement. When it fails the
/// row is left as it was.
pub struct Hook<T>(Arc<dyn Fn(&T) -> Result<T, HookError> + Send + Sync>);

impl<T> Hook<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T) -> Result<T, HookError> + Send + Sync + 'static,
    {
        Hook(Arc::new(f))
    }

    pub fn apply(&self, row: &T) -> Result<T, HookError> {
        (self.0)(row)
    }
}

impl<T> Clone for Hook<T> {
    fn clone(&self) -> Self {
        Hook(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Hook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

/// Descriptor of a paginated list query.
///
/// # Example
///
/// ```ignore
/// let config = ListConfig::<User>::new()
///     .with_page_size(20)
///     .with_page(2)
///     .with_sort_field("created_at")
///     .with_sort_direction(SortDirection::Asc)
///     .with_filter("name LIKE ?", "%alice%")
///     .with_preload("posts")
///     .with_hook(|user: &User| Ok(user.redacted()));
/// let page = tabula_data::list(Some(&db), Some(&db), &config).await?;
/// ```
#[derive(Debug, Serialize, Deserialize)]
#[serde(default, bound = "")]
pub struct ListConfig<T> {
    pub page_size: u64,
    pub page: u64,
    pub sort_field: String,
    pub sort_direction: SortDirection,
    pub filters: Vec<Filter>,
    pub preloads: Vec<String>,
    #[serde(skip)]
    pub hooks: Vec<Hook<T>>,
}

impl<T> ListConfig<T> {
    pub fn new() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page: DEFAULT_PAGE,
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            sort_direction: SortDirection::Desc,
            filters: Vec::new(),
            preloads: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// Rows per page. Zero and negative values are ignored.
    pub fn with_page_size(mut self, page_size: i64) -> Self {
        if page_size > 0 {
            self.page_size = page_size as u64;
        }
        self
    }

    /// One-based page number. Zero and negative values are ignored.
    pub fn with_page(mut self, page: i64) -> Self {
        if page > 0 {
            self.page = page as u64;
        }
        self
    }

    /// Column used in `ORDER BY`. Passed to the store verbatim.
    pub fn with_sort_field(mut self, field: impl Into<String>) -> Self {
        self.sort_field = field.into();
        self
    }

    pub fn with_sort_direction(mut self, direction: SortDirection) -> Self {
        self.sort_direction = direction;
        self
    }

    pub fn with_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn with_filter(self, query: impl Into<String>, args: impl Into<Value>) -> Self {
        self.with_filters([Filter::new(query, args)])
    }

    pub fn with_preloads<S: Into<String>>(mut self, preloads: impl IntoIterator<Item = S>) -> Self {
        self.preloads.extend(preloads.into_iter().map(Into::into));
        self
    }

    pub fn with_preload(self, preload: impl Into<String>) -> Self {
        self.with_preloads([preload])
    }

    /// Append hooks; they run in the order they were added.
    pub fn with_hooks(mut self, hooks: impl IntoIterator<Item = Hook<T>>) -> Self {
        self.hooks.extend(hooks);
        self
    }

    pub fn with_hook<F>(self, f: F) -> Self
    where
        F: Fn(&T) -> Result<T, HookError> + Send + Sync + 'static,
    {
        self.with_hooks([Hook::new(f)])
    }

    /// Number of rows skipped before the current page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

impl<T> Default for ListConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ListConfig<T> {
    fn clone(&self) -> Self {
        Self {
            page_size: self.page_size,
            page: self.page,
            sort_field: self.sort_field.clone(),
            sort_direction: self.sort_direction,
            filters: self.filters.clone(),
            preloads: self.preloads.clone(),
            hooks: self.hooks.clone(),
        }
    }
}

/// Descriptor of a single-row query: filters and preloads only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointConfig {
    pub filters: Vec<Filter>,
    pub preloads: Vec<String>,
}

impl PointConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn with_filter(self, query: impl Into<String>, args: impl Into<Value>) -> Self {
        self.with_filters([Filter::new(query, args)])
    }

    pub fn with_preloads<S: Into<String>>(mut self, preloads: impl IntoIterator<Item = S>) -> Self {
        self.preloads.extend(preloads.into_iter().map(Into::into));
        self
    }

    pub fn with_preload(self, preload: impl Into<String>) -> Self {
        self.with_preloads([preload])
    }
}
