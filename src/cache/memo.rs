//! Read-through and invalidation wrappers
//!
//! Both wrappers take the wrapped operation as a closure returning a future,
//! so any async call can be memoized without changing its signature. The
//! wrapped operation's error type is passed through untouched; it only needs
//! to absorb [`GhmError`] for key derivation failures.

use crate::cache::key::{CallArgs, CallKey};
use crate::cache::store::CacheStore;
use crate::error::GhmError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use tracing::{debug, warn};

/// Serve `operation(args)` from `store`, running `f` only on a miss
///
/// Only successful results are cached. When the key cannot be derived, `f`
/// is never called.
pub async fn read_through<T, E, F, Fut>(
    store: &mut CacheStore,
    operation: &str,
    args: &CallArgs,
    f: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    E: From<GhmError>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let key = CallKey::build(operation, args)?;

    if let Some(cached) = store.get(key.as_str()) {
        match serde_json::from_value::<T>(cached.clone()) {
            Ok(value) => {
                debug!("Cache hit for {} ({})", operation, key.digest());
                return Ok(value);
            }
            Err(e) => {
                debug!(
                    "Discarding unreadable cache entry for {} ({}): {}",
                    operation,
                    key.digest(),
                    e
                );
            }
        }
    }

    debug!("Cache miss for {} ({})", operation, key.digest());
    let value = f().await?;

    match serde_json::to_value(&value) {
        Ok(json) => store.set(key, json),
        Err(e) => warn!("Not caching result of {}: {}", operation, e),
    }

    Ok(value)
}

/// Run the mutating `operation` and purge `store` once it succeeds
///
/// `f` is always awaited. On failure the store is left as it was.
pub async fn invalidate<T, E, F, Fut>(store: &mut CacheStore, operation: &str, f: F) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let value = f().await?;

    debug!("{} succeeded, invalidating {} cache entries", operation, store.len());
    store.purge_all();

    Ok(value)
}
