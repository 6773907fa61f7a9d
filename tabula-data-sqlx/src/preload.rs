//! Named relation loaders run after a fetch.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use sqlx::AnyPool;

/// Fills relation fields on already-fetched rows of `T`.
pub type PreloadFn<T> =
    Arc<dyn for<'a> Fn(&'a AnyPool, &'a mut [T]) -> BoxFuture<'a, Result<(), sqlx::Error>> + Send + Sync>;

/// Loaders keyed by entity type and relation name.
#[derive(Clone, Default)]
pub(crate) struct PreloadRegistry {
    loaders: HashMap<(TypeId, String), Arc<dyn Any + Send + Sync>>,
}

impl PreloadRegistry {
    pub(crate) fn insert<T: 'static>(&mut self, relation: &str, loader: PreloadFn<T>) {
        self.loaders
            .insert((TypeId::of::<T>(), relation.to_string()), Arc::new(loader));
    }

    pub(crate) fn get<T: 'static>(&self, relation: &str) -> Option<PreloadFn<T>> {
        self.loaders
            .get(&(TypeId::of::<T>(), relation.to_string()))
            .and_then(|loader| loader.downcast_ref::<PreloadFn<T>>())
            .cloned()
    }
}

impl std::fmt::Debug for PreloadRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.loaders.keys().map(|(_, name)| name.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("PreloadRegistry").field("relations", &names).finish()
    }
}
