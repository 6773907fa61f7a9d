use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use sqlx::any::AnyRow;
use sqlx::{Any, AnyPool, FromRow};
use tabula_data::{Entity, Filter, ModelQuery, SortDirection, Store};

use crate::bind::{arguments, column_values, is_unset_key};
use crate::config::StoreConfig;
use crate::preload::{PreloadFn, PreloadRegistry};
use crate::query::{build_delete, build_insert, build_upsert, Dialect, SelectBuilder};

/// A store client over an `sqlx::AnyPool`.
///
/// Implements [`Store<T>`] for every entity that is [`Entity`], `Serialize`
/// and `FromRow` over `AnyRow`. Cloning is cheap and shares the pool, so the
/// same store can be passed as both handles of [`tabula_data::list`].
///
/// # Example
///
/// ```ignore
/// let store = SqlxStore::connect(&StoreConfig::load("application.yaml")?).await?;
/// let page = tabula_data::list(Some(&store), Some(&store), &ListConfig::<User>::new()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqlxStore {
    pool: AnyPool,
    dialect: Dialect,
    preloads: Arc<PreloadRegistry>,
}

impl SqlxStore {
    pub fn new(pool: AnyPool, dialect: Dialect) -> Self {
        Self {
            pool,
            dialect,
            preloads: Arc::new(PreloadRegistry::default()),
        }
    }

    /// Install the default `Any` drivers and open a pool described by `config`.
    pub async fn connect(config: &StoreConfig) -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();
        let dialect = config.dialect();
        let pool = config.pool_options().connect(&config.url).await?;
        tracing::info!(
            dialect = ?dialect,
            max_connections = config.max_connections,
            "Store connected"
        );
        Ok(Self::new(pool, dialect))
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Register the loader behind preload name `relation` for entity `T`.
    ///
    /// ```ignore
    /// let store = store.with_preload::<User, _>("posts", |pool, users| {
    ///     Box::pin(async move {
    ///         for user in users.iter_mut() {
    ///             user.posts = sqlx::query_as("SELECT id, user_id, title FROM posts WHERE user_id = ?")
    ///                 .bind(user.id)
    ///                 .fetch_all(pool)
    ///                 .await?;
    ///         }
    ///         Ok(())
    ///     })
    /// });
    /// ```
    pub fn with_preload<T, F>(mut self, relation: &str, loader: F) -> Self
    where
        T: Send + 'static,
        F: for<'a> Fn(&'a AnyPool, &'a mut [T]) -> BoxFuture<'a, Result<(), sqlx::Error>>
            + Send
            + Sync
            + 'static,
    {
        let loader: PreloadFn<T> = Arc::new(loader);
        Arc::make_mut(&mut self.preloads).insert(relation, loader);
        self
    }

    /// Look up the loader behind every relation name before anything runs.
    fn resolve_preloads<T>(&self, relations: &[String]) -> Result<Vec<PreloadFn<T>>, sqlx::Error>
    where
        T: Entity,
    {
        relations
            .iter()
            .map(|relation| {
                self.preloads.get::<T>(relation).ok_or_else(|| {
                    sqlx::Error::Configuration(
                        format!("unsupported relation \"{relation}\" for table {}", T::table_name()).into(),
                    )
                })
            })
            .collect()
    }

    async fn apply_preloads<T>(&self, rows: &mut [T], loaders: &[PreloadFn<T>]) -> Result<(), sqlx::Error> {
        if rows.is_empty() {
            return Ok(());
        }
        for loader in loaders {
            loader(&self.pool, rows).await?;
        }
        Ok(())
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<(), sqlx::Error> {
        tracing::debug!(sql, params = params.len(), "Executing statement");
        let args = arguments(params)?;
        sqlx::query_with(sql, args).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_row<T>(&self, value: &T) -> Result<(), sqlx::Error>
    where
        T: Entity + Serialize,
    {
        let (columns, params): (Vec<&str>, Vec<Value>) = column_values(value)?
            .into_iter()
            .filter(|(column, v)| *column != T::id_column() || !is_unset_key(v))
            .unzip();
        let sql = build_insert(T::table_name(), &columns, self.dialect);
        self.execute(&sql, &params).await
    }

    async fn save_row<T>(&self, value: &T) -> Result<(), sqlx::Error>
    where
        T: Entity + Serialize,
    {
        let id = serde_json::to_value(value.id()).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        if is_unset_key(&id) {
            return self.insert_row(value).await;
        }
        let (columns, params): (Vec<&str>, Vec<Value>) = column_values(value)?.into_iter().unzip();
        let sql = build_upsert(T::table_name(), &columns, T::id_column(), self.dialect);
        self.execute(&sql, &params).await
    }

    async fn delete_row<T>(&self, value: &T) -> Result<(), sqlx::Error>
    where
        T: Entity,
    {
        let id = serde_json::to_value(value.id()).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let sql = build_delete(T::table_name(), T::id_column(), self.dialect);
        self.execute(&sql, &[id]).await
    }
}

/// A query handle bound to entity `T` on a [`SqlxStore`].
pub struct SqlxQuery<'s, T> {
    store: &'s SqlxStore,
    builder: SelectBuilder,
    preloads: Vec<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SqlxQuery<'_, T>
where
    T: Entity,
{
    fn select_columns() -> String {
        T::columns().join(", ")
    }
}

impl<T> ModelQuery<T> for SqlxQuery<'_, T>
where
    T: Entity + for<'r> FromRow<'r, AnyRow>,
{
    type Error = sqlx::Error;

    fn filter(mut self, filter: &Filter) -> Self {
        self.builder = self.builder.filter(filter);
        self
    }

    fn preload(mut self, relation: &str) -> Self {
        self.preloads.push(relation.to_string());
        self
    }

    fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.builder = self.builder.order_by(field, direction);
        self
    }

    fn offset(mut self, offset: u64) -> Self {
        self.builder = self.builder.offset(offset);
        self
    }

    fn limit(mut self, limit: u64) -> Self {
        self.builder = self.builder.limit(limit);
        self
    }

    async fn count(self) -> Result<i64, sqlx::Error> {
        let (sql, params) = self.builder.build_count();
        tracing::debug!(sql = %sql, params = params.len(), "Executing count");
        let args = arguments(&params)?;
        sqlx::query_scalar_with::<Any, i64, _>(&sql, args)
            .fetch_one(&self.store.pool)
            .await
    }

    async fn first(self) -> Result<Option<T>, sqlx::Error> {
        let loaders = self.store.resolve_preloads::<T>(&self.preloads)?;
        let mut builder = self.builder;
        if !builder.has_order() {
            builder = builder.order_by(T::id_column(), SortDirection::Asc);
        }
        let (sql, params) = builder.limit(1).build_select(&Self::select_columns());
        tracing::debug!(sql = %sql, params = params.len(), "Executing fetch-first");
        let args = arguments(&params)?;
        let Some(row) = sqlx::query_as_with::<Any, T, _>(&sql, args)
            .fetch_optional(&self.store.pool)
            .await?
        else {
            return Ok(None);
        };
        let mut rows = vec![row];
        self.store.apply_preloads(&mut rows, &loaders).await?;
        Ok(rows.pop())
    }

    async fn all(self) -> Result<Vec<T>, sqlx::Error> {
        let loaders = self.store.resolve_preloads::<T>(&self.preloads)?;
        let (sql, params) = self.builder.build_select(&Self::select_columns());
        tracing::debug!(sql = %sql, params = params.len(), "Executing fetch-all");
        let args = arguments(&params)?;
        let mut rows = sqlx::query_as_with::<Any, T, _>(&sql, args)
            .fetch_all(&self.store.pool)
            .await?;
        self.store.apply_preloads(&mut rows, &loaders).await?;
        Ok(rows)
    }
}

impl<T> Store<T> for SqlxStore
where
    T: Entity + Serialize + for<'r> FromRow<'r, AnyRow>,
{
    type Error = sqlx::Error;
    type Query<'a> = SqlxQuery<'a, T>;

    fn model(&self) -> SqlxQuery<'_, T> {
        SqlxQuery {
            store: self,
            builder: SelectBuilder::new_with_dialect(T::table_name(), self.dialect),
            preloads: Vec::new(),
            _marker: PhantomData,
        }
    }

    async fn insert(&self, value: &T) -> Result<(), sqlx::Error> {
        self.insert_row(value).await
    }

    async fn save(&self, value: &T) -> Result<(), sqlx::Error> {
        self.save_row(value).await
    }

    async fn delete(&self, value: &T) -> Result<(), sqlx::Error> {
        self.delete_row(value).await
    }
}
