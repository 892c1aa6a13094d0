//! Application state shared across handlers.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::store::Store;

/// Cheap to clone; every clone points at the same store.
///
/// All reads and writes go through one lock, so "read next id, append,
/// merge achievements" is a single critical section even when requests
/// arrive concurrently.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    version: String,
    store: Mutex<Store>,
}

impl AppState {
    pub fn new(store: Store, version: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                version: version.into(),
                store: Mutex::new(store),
            }),
        }
    }

    /// The demo dataset, reporting this crate's version.
    pub fn seeded() -> Self {
        Self::new(Store::seeded(), env!("CARGO_PKG_VERSION"))
    }

    pub fn version(&self) -> &str {
        &self.inner.version
    }

    /// Locks the store. Do not hold the guard across an `.await`.
    pub fn store(&self) -> MutexGuard<'_, Store> {
        self.inner.store.lock()
    }
}
