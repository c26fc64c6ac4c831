//! Client side of the DEX contract: typed entrypoints, schema codec and invoker.

/// Parameter and return encoding driven by the module schema.
pub mod codec;
/// Typed entrypoint records.
pub mod entrypoints;
/// Request execution against a node.
pub mod invoker;
/// The contract's own schema.
pub mod layout;

pub use codec::SchemaCodec;
pub use entrypoints::{
    AddLiquidity, AddLiquidityParams, Entrypoint, FromSchemaJson, GetPool, GetShares,
    QueryEntrypoint, RemoveLiquidity, RemoveLiquidityParams, Swap, SwapParams, ToSchemaJson,
    UpdateEntrypoint,
};
pub use invoker::{ContractInvoker, InvocationMode, InvokeOutcome};
