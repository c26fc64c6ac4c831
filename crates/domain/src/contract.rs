//! Contract identity and call budget types.

use crate::address::{ContractAddress, ModuleReference, parse_module_ref};
use crate::error::DomainError;
use concordium_contracts_common::{EntrypointName, OwnedContractName, OwnedReceiveName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on the execution energy a node may spend on one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Energy(pub u64);

impl Energy {
    /// Budget used by the DEX front-end for every contract call.
    pub const DEFAULT_MAX: Energy = Energy(30_000);
}

impl Default for Energy {
    fn default() -> Self {
        Self::DEFAULT_MAX
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} NRG", self.0)
    }
}

/// Everything needed to talk to one deployed contract instance.
///
/// The schema used to encode calls is fetched from `module_ref`; the
/// descriptor never carries binary layouts itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDescriptor {
    address: ContractAddress,
    name: OwnedContractName,
    module_ref: ModuleReference,
}

impl ContractDescriptor {
    pub fn new(
        address: ContractAddress,
        name: OwnedContractName,
        module_ref: ModuleReference,
    ) -> Self {
        Self {
            address,
            name,
            module_ref,
        }
    }

    /// Builds a descriptor from unvalidated registry values. `name` is the
    /// bare contract name, without the `init_` prefix.
    ///
    /// # Errors
    /// Returns an error if the name or module reference is malformed.
    pub fn from_parts(
        index: u64,
        subindex: u64,
        name: &str,
        module_ref: &str,
    ) -> Result<Self, DomainError> {
        let name = OwnedContractName::new(format!("init_{name}")).map_err(|e| {
            DomainError::InvalidContractName {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            address: ContractAddress::new(index, subindex),
            name,
            module_ref: parse_module_ref(module_ref)?,
        })
    }

    pub fn address(&self) -> ContractAddress {
        self.address
    }

    /// Bare contract name, as schemas and receive names use it.
    pub fn name(&self) -> &str {
        self.name.as_contract_name().contract_name()
    }

    pub fn module_ref(&self) -> &ModuleReference {
        &self.module_ref
    }

    /// Fully qualified receive name `<contract>.<entrypoint>`.
    ///
    /// # Errors
    /// Returns an error if `entrypoint` violates the on-chain naming rules.
    pub fn receive_name(&self, entrypoint: &str) -> Result<OwnedReceiveName, DomainError> {
        let reject = |reason: String| DomainError::InvalidEntrypointName {
            name: entrypoint.to_string(),
            reason,
        };
        EntrypointName::new(entrypoint).map_err(|e| reject(e.to_string()))?;
        OwnedReceiveName::new(format!("{}.{entrypoint}", self.name()))
            .map_err(|e| reject(e.to_string()))
    }
}
