//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use ccd_dex_execution::prelude::*;
//! ```

// Cache
pub use crate::cache::StateCache;

// Coordinator
pub use crate::coordinator::{
    CoordinatorConfig, LoadingKey, MutationReport, RequestCoordinator, DEFAULT_CONTRACT_INDEX,
    DEFAULT_MODULE_REF,
};

// Errors
pub use crate::error::OperationError;

// Notifications
pub use crate::notify::{
    ChannelNotifier, MultiNotifier, Notification, Notifier, Operation, Outcome,
    RecordingNotifier, TracingNotifier,
};

// Wallet
pub use crate::wallet::WalletSession;
