use crate::config::SortDirection;
use crate::filter::Filter;
use std::future::Future;

/// The database-client capability the query engine is built on, bound to
/// entity type `T`.
///
/// Uses RPITIT (return-position `impl Trait` in traits), no `async-trait` needed.
/// Implementations own connections, dialect and transactions; the engine only
/// composes calls.
pub trait Store<T>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;
    type Query<'a>: ModelQuery<T, Error = Self::Error>
    where
        Self: 'a;

    /// Start a fresh query bound to `T`.
    fn model(&self) -> Self::Query<'_>;

    fn insert(&self, value: &T) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Persist the whole row, inserting it when its key is not present yet.
    fn save(&self, value: &T) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn delete(&self, value: &T) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// A query handle accumulating clauses for one statement.
///
/// Clause methods consume and return the handle; the terminal methods execute it.
pub trait ModelQuery<T>: Send + Sized {
    type Error;

    /// AND another raw predicate onto the where clause.
    fn filter(self, filter: &Filter) -> Self;
    fn preload(self, relation: &str) -> Self;
    fn order_by(self, field: &str, direction: SortDirection) -> Self;
    fn offset(self, offset: u64) -> Self;
    fn limit(self, limit: u64) -> Self;

    fn count(self) -> impl Future<Output = Result<i64, Self::Error>> + Send;

    /// The first matching row, or `None` when nothing matched.
    fn first(self) -> impl Future<Output = Result<Option<T>, Self::Error>> + Send;

    fn all(self) -> impl Future<Output = Result<Vec<T>, Self::Error>> + Send;
}
