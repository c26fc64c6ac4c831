//! Contract invocation.
//!
//! Issues one request per call against a receive function of a contract
//! instance:
//! - queries are dry runs evaluated by the node
//! - transactions are submitted updates awaited until the node reports them

use crate::error::InvocationError;
use crate::rpc::{
    InvokeInstanceRequest, InvokeInstanceResult, NodeClient, UpdateOutcome, UpdateRequest,
};
use ccd_dex_domain::address::AccountAddress;
use ccd_dex_domain::contract::{ContractDescriptor, Energy};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a call is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// Read-only dry run.
    Query,
    /// State-changing update signed by `sender`.
    Transaction { sender: AccountAddress },
}

impl InvocationMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Transaction { .. } => "transaction",
        }
    }
}

impl fmt::Display for InvocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeOutcome {
    /// Mode that actually executed.
    pub mode: InvocationMode,
    /// Raw return value; only queries produce one.
    pub return_value: Option<Vec<u8>>,
    /// Energy reported by the node for dry runs.
    pub used_energy: Option<u64>,
    /// Hash of the submitted update.
    pub tx_hash: Option<String>,
}

impl InvokeOutcome {
    #[must_use]
    pub fn query(return_value: Option<Vec<u8>>, used_energy: u64) -> Self {
        Self {
            mode: InvocationMode::Query,
            return_value,
            used_energy: Some(used_energy),
            tx_hash: None,
        }
    }

    #[must_use]
    pub fn transaction(sender: AccountAddress, tx_hash: String) -> Self {
        Self {
            mode: InvocationMode::Transaction { sender },
            return_value: None,
            used_energy: None,
            tx_hash: Some(tx_hash),
        }
    }
}

/// Executes receive functions through a [`NodeClient`].
#[derive(Clone)]
pub struct ContractInvoker {
    node: Arc<dyn NodeClient>,
}

impl ContractInvoker {
    pub fn new(node: Arc<dyn NodeClient>) -> Self {
        Self { node }
    }

    /// Invokes `entrypoint` on the described contract.
    ///
    /// The requested `mode` is the one executed; a query never turns into a
    /// transaction or the other way around.
    ///
    /// # Errors
    /// Returns an [`InvocationError`] on transport failure, contract
    /// rejection or energy exhaustion.
    pub async fn invoke(
        &self,
        contract: &ContractDescriptor,
        entrypoint: &str,
        parameter: Vec<u8>,
        energy: Energy,
        mode: InvocationMode,
    ) -> Result<InvokeOutcome, InvocationError> {
        let receive = contract
            .receive_name(entrypoint)
            .map_err(|e| InvocationError {
                receive_name: format!("{}.{entrypoint}", contract.name()),
                mode: mode.label(),
                reason: e.to_string(),
            })?;
        let receive_name = receive.as_receive_name().get_chain_name().to_string();
        let fail = |reason: String| InvocationError {
            receive_name: receive_name.clone(),
            mode: mode.label(),
            reason,
        };

        match mode {
            InvocationMode::Query => {
                debug!(
                    contract = %contract.address(),
                    receive_name = %receive_name,
                    energy = energy.0,
                    "Invoking contract (dry run)"
                );
                let request = InvokeInstanceRequest {
                    contract: contract.address(),
                    receive_name: receive,
                    parameter,
                    energy,
                    invoker: None,
                };
                match self.node.invoke_instance(&request).await {
                    Ok(InvokeInstanceResult::Success {
                        return_value,
                        used_energy,
                    }) => {
                        debug!(receive_name = %receive_name, used_energy, "Dry run succeeded");
                        Ok(InvokeOutcome::query(return_value, used_energy))
                    }
                    Ok(InvokeInstanceResult::Failure {
                        reason,
                        used_energy,
                    }) => {
                        warn!(
                            receive_name = %receive_name,
                            used_energy,
                            reason = %reason,
                            "Dry run rejected"
                        );
                        Err(fail(reason))
                    }
                    Err(e) => Err(fail(e.to_string())),
                }
            }
            InvocationMode::Transaction { sender } => {
                info!(
                    contract = %contract.address(),
                    receive_name = %receive_name,
                    sender = %sender,
                    energy = energy.0,
                    "Submitting contract update"
                );
                let request = UpdateRequest {
                    sender,
                    contract: contract.address(),
                    receive_name: receive,
                    parameter,
                    energy,
                    amount: 0,
                };
                match self.node.send_update(&request).await {
                    Ok(UpdateOutcome::Success { tx_hash }) => {
                        info!(receive_name = %receive_name, tx_hash = %tx_hash, "Update finalized");
                        Ok(InvokeOutcome::transaction(sender, tx_hash))
                    }
                    Ok(UpdateOutcome::Rejected { tx_hash, reason }) => {
                        warn!(
                            receive_name = %receive_name,
                            tx_hash = %tx_hash,
                            reason = %reason,
                            "Update rejected"
                        );
                        Err(fail(format!("rejected in {tx_hash}: {reason}")))
                    }
                    Err(e) => Err(fail(e.to_string())),
                }
            }
        }
    }
}
