//! Request orchestration for the DEX client.
//!
//! This crate provides the stateful half of the client:
//! - the pool and share cache
//! - per-key loading flags and the single pending-transaction slot
//! - read pipelines and mutations with cascading refresh
//! - operation notifications

/// Prelude module for convenient imports.
pub mod prelude;

/// Pool and share snapshot cache.
pub mod cache;
/// Operation pipelines.
pub mod coordinator;
/// Operation error taxonomy.
pub mod error;
/// Notifications and notifiers.
pub mod notify;
/// Connected account.
pub mod wallet;
