//! Node access.
//!
//! The [`NodeClient`] trait is the only way the rest of the workspace talks
//! to a chain node. [`GrpcNodeClient`] implements it over the node's gRPC
//! API; tests use in-memory doubles.

mod grpc;

pub use grpc::{DEFAULT_ENDPOINT, GrpcConfig, GrpcNodeClient};

use crate::error::RpcError;
use crate::schema::EmbeddedSchema;
use async_trait::async_trait;
use ccd_dex_domain::address::{AccountAddress, ContractAddress, ModuleReference};
use ccd_dex_domain::contract::Energy;
use concordium_contracts_common::OwnedReceiveName;

/// A read-only dry run of a receive function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeInstanceRequest {
    pub contract: ContractAddress,
    pub receive_name: OwnedReceiveName,
    pub parameter: Vec<u8>,
    pub energy: Energy,
    /// Account the call is attributed to, if any.
    pub invoker: Option<AccountAddress>,
}

/// Result of a dry run as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeInstanceResult {
    Success {
        return_value: Option<Vec<u8>>,
        used_energy: u64,
    },
    /// The contract rejected the call or ran out of energy.
    Failure { reason: String, used_energy: u64 },
}

/// A state-changing update submitted on behalf of `sender`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub sender: AccountAddress,
    pub contract: ContractAddress,
    pub receive_name: OwnedReceiveName,
    pub parameter: Vec<u8>,
    pub energy: Energy,
    /// CCD attached to the call, in micro CCD.
    pub amount: u64,
}

/// Final status of a submitted update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Success { tx_hash: String },
    Rejected { tx_hash: String, reason: String },
}

/// Narrow interface to a Concordium node and the keys that sign updates.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Returns the embedded schema of a module, or `None` when the module
    /// was deployed without one.
    async fn get_embedded_schema(
        &self,
        module_ref: &ModuleReference,
    ) -> Result<Option<EmbeddedSchema>, RpcError>;

    /// Executes a receive function without committing any state.
    async fn invoke_instance(
        &self,
        request: &InvokeInstanceRequest,
    ) -> Result<InvokeInstanceResult, RpcError>;

    /// Submits an update and waits until it is finalized.
    async fn send_update(&self, request: &UpdateRequest) -> Result<UpdateOutcome, RpcError>;
}
