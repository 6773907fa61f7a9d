//! # tabula-data — generic data-access helpers
//!
//! Building blocks for paginated listing, single-row lookup, existence
//! checks and create/update/delete over any entity type, on top of a store
//! client that implements [`Store`].
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Filter`] | Raw predicate text plus one bound argument |
//! | [`ListConfig`] | Page size, page, ordering, filters, preloads, post-fetch hooks |
//! | [`PointConfig`] | Filters and preloads for single-row queries |
//! | [`ListResult`] | Total count, page number and the fetched rows |
//! | [`Store`] / [`ModelQuery`] | The capability a database client must provide |
//! | [`DataError`] | Missing client or the store's own error, unchanged |
//!
//! Predicates in [`Filter`] are never validated or escaped here. They go to
//! the store exactly as written, with only the argument bound as a parameter.
//!
//! ```ignore
//! use tabula_data::prelude::*;
//!
//! let config = ListConfig::<User>::new()
//!     .with_page_size(10)
//!     .with_page(2)
//!     .with_filter("name LIKE ?", "%a%");
//! let page = tabula_data::list(Some(&db), Some(&db), &config).await?;
//!
//! let point = PointConfig::new().with_filter("id = ?", 42);
//! let user = tabula_data::get_one::<User, _>(Some(&db), &point).await?;
//! ```

pub mod config;
pub mod crud;
pub mod entity;
pub mod error;
pub mod filter;
pub mod page;
pub mod store;

pub use config::{Hook, HookError, ListConfig, PointConfig, SortDirection};
pub use crud::{create, delete, exists, get_one, list, update};
pub use entity::Entity;
pub use error::DataError;
pub use filter::Filter;
pub use page::ListResult;
pub use store::{ModelQuery, Store};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        DataError, Entity, Filter, ListConfig, ListResult, ModelQuery, PointConfig, SortDirection, Store,
    };
}
