//! Domain model for the DEX client.
//!
//! Addresses, tokens, pools, share balances, contract descriptors and the
//! cache keys used to index them.

/// On-chain address types.
pub mod address;
/// Contract names, descriptors and energy budgets.
pub mod contract;
/// Entities read from the contract.
pub mod entities;
/// Small enumerations shared across crates.
pub mod enums;
/// Domain error type.
pub mod error;
/// Cache keys.
pub mod keys;
/// Token identifiers, pairs and amounts.
pub mod token;

/// Prelude module for convenient imports.
pub mod prelude;
