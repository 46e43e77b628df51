//! Cache session: the single owner of a process's cache store
//!
//! Opening a session loads the persisted file. The store is written back
//! exactly once, either through [`CacheSession::close`] (which reports the
//! error) or, when the session goes out of scope without being closed, from
//! `Drop` (which logs it).

use crate::cache::store::CacheStore;
use crate::error::GhmResult;
use std::path::PathBuf;
use tracing::warn;

/// Scoped owner of a [`CacheStore`]
#[derive(Debug)]
pub struct CacheSession {
    store: CacheStore,
    persisted: bool,
}

impl CacheSession {
    /// Load the cache persisted at `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            store: CacheStore::load(path),
            persisted: false,
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CacheStore {
        &mut self.store
    }

    /// Persist the store and end the session
    pub fn close(mut self) -> GhmResult<()> {
        self.persisted = true;
        self.store.store()
    }
}

impl Drop for CacheSession {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        self.persisted = true;

        if let Err(e) = self.store.store() {
            warn!("Cache not saved: {}", e);
        }
    }
}
