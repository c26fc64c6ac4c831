//! Protocol layer for the Concordium DEX contract.
//!
//! Schema parsing, schema-driven binary encoding, node access and the typed
//! DEX entrypoints built on top of them.

/// DEX contract client.
pub mod dex;
/// Error types.
pub mod error;
/// Prelude module for convenient imports.
pub mod prelude;
/// Node access over gRPC.
pub mod rpc;
/// Contract schemas and schema JSON.
pub mod schema;
