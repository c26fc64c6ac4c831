//! Prelude module for convenient imports.
//!
//! ```rust
//! use ccd_dex_protocols::prelude::*;
//! ```

pub use crate::dex::{
    AddLiquidity, AddLiquidityParams, ContractInvoker, Entrypoint, GetPool, GetShares,
    InvocationMode, InvokeOutcome, QueryEntrypoint, RemoveLiquidity, RemoveLiquidityParams,
    SchemaCodec, Swap, SwapParams, UpdateEntrypoint,
};
pub use crate::error::{
    DecodingError, EncodingError, InvocationError, RpcError, SchemaFetchError, SchemaParseError,
};
pub use crate::rpc::{
    GrpcConfig, GrpcNodeClient, InvokeInstanceRequest, InvokeInstanceResult, NodeClient,
    UpdateOutcome, UpdateRequest,
};
pub use crate::schema::{EmbeddedSchema, SchemaVersion, Type, VersionedModuleSchema};
