//! # tabula-data-sqlx — SQLx backend for the Tabula data layer
//!
//! This crate provides a [SQLx](https://github.com/launchbadge/sqlx) store
//! client for [`tabula-data`]. It implements the [`Store`](tabula_data::Store)
//! capability over `sqlx::AnyPool`, so one binary can talk to SQLite,
//! PostgreSQL or MySQL picked at runtime from the connection URL.
//!
//! # What's in this crate
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxStore`] | Store client holding an `AnyPool`, a [`Dialect`] and preload loaders |
//! | [`SelectBuilder`] | Assembles `SELECT` / `COUNT` statements from raw filter fragments |
//! | [`StoreConfig`] | Pool settings from YAML, `.env` and environment variables |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, DataError<sqlx::Error>>` |
//!
//! # Feature flags
//!
//! Enable the drivers you need:
//!
//! | Feature    | Driver |
//! |------------|--------|
//! | `sqlite`   | SQLite via `sqlx/sqlite` |
//! | `postgres` | PostgreSQL via `sqlx/postgres` |
//! | `mysql`    | MySQL via `sqlx/mysql` |
//!
//! # Quick start
//!
//! ```ignore
//! use tabula_data::prelude::*;
//! use tabula_data_sqlx::{SqlxStore, StoreConfig};
//!
//! #[derive(Serialize, sqlx::FromRow)]
//! struct User { id: i64, name: String, updated_at: i64 }
//!
//! impl Entity for User {
//!     type Id = i64;
//!     fn table_name() -> &'static str { "users" }
//!     fn id_column() -> &'static str { "id" }
//!     fn columns() -> &'static [&'static str] { &["id", "name", "updated_at"] }
//!     fn id(&self) -> &i64 { &self.id }
//! }
//!
//! let store = SqlxStore::connect(&StoreConfig::load("application.yaml")?).await?;
//! let config = ListConfig::<User>::new().with_filter("name LIKE ?", "%a%");
//! let page = tabula_data::list(Some(&store), Some(&store), &config).await?;
//! ```
//!
//! # Raw fragments
//!
//! Filter predicates, the sort field and preload names are written into SQL
//! as given. Only filter arguments are bound as parameters. Never build
//! predicate text from untrusted input.

mod bind;
pub mod config;
pub mod error;
pub mod preload;
pub mod query;
pub mod store;

pub use config::StoreConfig;
pub use error::{ConfigError, SqlxResult};
pub use preload::PreloadFn;
pub use query::{Dialect, SelectBuilder};
pub use store::{SqlxQuery, SqlxStore};

/// Re-exports of the most commonly used types from both `tabula-data` and this crate.
pub mod prelude {
    pub use crate::{Dialect, SqlxStore, StoreConfig};
    pub use tabula_data::prelude::*;
}
