//! Request-deduplicating memo table.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

/// Maps each key to a single lazily computed value.
///
/// The first caller for a key runs the initializer; concurrent callers for the
/// same key block on that key's cell until the value is published, then all
/// of them receive a clone of it. The table lock is held only while the cell
/// is looked up or inserted, never while a value is computed.
#[derive(Debug)]
pub(crate) struct OnceCache<K, V> {
    cells: Mutex<HashMap<K, Arc<OnceLock<V>>>>,
}

impl<K, V> Default for OnceCache<K, V> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> OnceCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub(crate) fn get_or_init(&self, key: &K, init: impl FnOnce() -> V) -> V {
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cells.entry(key.clone()).or_default())
        };
        cell.get_or_init(init).clone()
    }

    /// Number of distinct keys requested so far.
    pub(crate) fn len(&self) -> usize {
        self.cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
