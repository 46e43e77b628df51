//! Persistent read-through cache for `gh` lookups
//!
//! Lookups are memoized under a key derived from the operation name and its
//! arguments; any successful mutation purges the whole store.
//!
//! # Lifecycle
//!
//! | Step | Where | Effect |
//! |------|-------|--------|
//! | open | [`CacheSession::open`] | load file (missing/broken = empty) |
//! | lookup | [`read_through`] | hit returns stored value, miss runs and stores |
//! | mutate | [`invalidate`] | runs, then purges on success |
//! | close | [`CacheSession::close`] / drop | atomic write, exactly once |
//!
//! Entries never expire and the store is unbounded. Two processes sharing
//! the file race on close: the last writer wins.

pub mod key;
pub mod memo;
pub mod session;
pub mod store;

pub use key::{ArgValue, CallArgs, CallKey};
pub use memo::{invalidate, read_through};
pub use session::CacheSession;
pub use store::CacheStore;
