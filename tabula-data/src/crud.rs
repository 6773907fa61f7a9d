//! The query engine: compiles configurations into store calls.
//!
//! Every operation takes the store handle as `Option<&S>`; `None` fails with
//! [`DataError::NoClient`] before anything is sent. Store errors come back
//! unchanged inside [`DataError::Store`]. Nothing is retried.

use crate::config::{ListConfig, PointConfig};
use crate::error::DataError;
use crate::filter::Filter;
use crate::page::ListResult;
use crate::store::{ModelQuery, Store};

fn apply_filters<T, Q: ModelQuery<T>>(query: Q, filters: &[Filter]) -> Q {
    filters.iter().fold(query, |q, filter| q.filter(filter))
}

fn apply_preloads<T, Q: ModelQuery<T>>(query: Q, preloads: &[String]) -> Q {
    preloads.iter().fold(query, |q, preload| q.preload(preload))
}

/// Fetch one page of `T` together with the total filtered count.
///
/// `count_db` runs the count (filters only) and `fetch_db` runs the page
/// fetch (filters, preloads, ordering, offset/limit). They may point at the
/// same pool. The two statements are not isolated from each other: under
/// concurrent writes `total` and `data` can disagree unless both handles are
/// bound to one transaction by the caller.
///
/// Hooks run after the fetch, hook by hook and row by row. A failing hook
/// leaves the row untouched and is logged at `warn`; it never fails the call.
pub async fn list<T, S>(
    count_db: Option<&S>,
    fetch_db: Option<&S>,
    config: &ListConfig<T>,
) -> Result<ListResult<T>, DataError<S::Error>>
where
    S: Store<T>,
{
    let Some(count_db) = count_db else {
        return Err(DataError::NoClient);
    };
    let Some(fetch_db) = fetch_db else {
        return Err(DataError::NoClient);
    };

    let total = apply_filters::<T, _>(count_db.model(), &config.filters)
        .count()
        .await
        .map_err(DataError::Store)?;

    let query = apply_filters::<T, _>(fetch_db.model(), &config.filters);
    let mut data = apply_preloads::<T, _>(query, &config.preloads)
        .order_by(&config.sort_field, config.sort_direction)
        .offset(config.offset())
        .limit(config.page_size)
        .all()
        .await
        .map_err(DataError::Store)?;

    for (index, hook) in config.hooks.iter().enumerate() {
        for row in data.iter_mut() {
            match hook.apply(row) {
                Ok(transformed) => *row = transformed,
                Err(err) => tracing::warn!(hook = index, error = %err, "Post-fetch hook failed"),
            }
        }
    }

    tracing::debug!(total, page = config.page, rows = data.len(), "Listed page");
    Ok(ListResult::new(total, config.page, data))
}

/// Fetch the first row matching `config`, in the store's default order.
///
/// Zero matches is `Ok(None)`, not an error.
pub async fn get_one<T, S>(db: Option<&S>, config: &PointConfig) -> Result<Option<T>, DataError<S::Error>>
where
    S: Store<T>,
{
    let Some(db) = db else {
        return Err(DataError::NoClient);
    };
    let query = apply_filters::<T, _>(db.model(), &config.filters);
    let row = apply_preloads::<T, _>(query, &config.preloads)
        .first()
        .await
        .map_err(DataError::Store)?;
    Ok(row)
}

/// Whether at least one row matches the filters of `config`.
///
/// Preloads are ignored. A failing count is returned as an error.
pub async fn exists<T, S>(db: Option<&S>, config: &PointConfig) -> Result<bool, DataError<S::Error>>
where
    S: Store<T>,
{
    let Some(db) = db else {
        return Err(DataError::NoClient);
    };
    let count = apply_filters::<T, _>(db.model(), &config.filters)
        .count()
        .await
        .map_err(DataError::Store)?;
    Ok(count > 0)
}

/// Insert `value`.
pub async fn create<T, S>(db: Option<&S>, value: &T) -> Result<(), DataError<S::Error>>
where
    S: Store<T>,
{
    let Some(db) = db else {
        return Err(DataError::NoClient);
    };
    db.insert(value).await.map_err(DataError::Store)
}

/// Save the whole row `value`, keyed by its primary key. Not a partial patch.
pub async fn update<T, S>(db: Option<&S>, value: &T) -> Result<(), DataError<S::Error>>
where
    S: Store<T>,
{
    let Some(db) = db else {
        return Err(DataError::NoClient);
    };
    db.save(value).await.map_err(DataError::Store)
}

/// Delete the first row matching `config`.
///
/// Looks the row up with [`get_one`] and then deletes it, so this is two
/// round trips and not atomic. No match is a successful no-op.
pub async fn delete<T, S>(db: Option<&S>, config: &PointConfig) -> Result<(), DataError<S::Error>>
where
    S: Store<T>,
{
    let Some(db) = db else {
        return Err(DataError::NoClient);
    };
    let Some(row) = get_one::<T, S>(Some(db), config).await? else {
        tracing::debug!("Delete matched no row");
        return Ok(());
    };
    db.delete(&row).await.map_err(DataError::Store)
}
