//! On-chain address types.
//!
//! Contract instances, accounts and modules use the representations from
//! `concordium-contracts-common`. This module only adds parsers that report
//! [`DomainError`] so command-line and config input fails uniformly.

use crate::error::DomainError;

pub use concordium_contracts_common::{AccountAddress, ContractAddress, ModuleReference};

/// Parses `<index,subindex>`, `index,subindex` or a bare `index`
/// (subindex defaults to zero).
///
/// # Errors
/// Returns [`DomainError::InvalidContractAddress`] for anything else.
pub fn parse_contract_address(s: &str) -> Result<ContractAddress, DomainError> {
    let invalid = || DomainError::InvalidContractAddress(s.to_string());
    let trimmed = s.trim();
    let inner = trimmed
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(trimmed);

    let mut parts = inner.split(',');
    let index = parts
        .next()
        .and_then(|p| p.trim().parse::<u64>().ok())
        .ok_or_else(invalid)?;
    let subindex = match parts.next() {
        Some(p) => p.trim().parse::<u64>().map_err(|_| invalid())?,
        None => 0,
    };
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(ContractAddress::new(index, subindex))
}

/// Parses a base58check account address.
///
/// # Errors
/// Returns [`DomainError::InvalidAccountAddress`] if the string is not a
/// valid Concordium account address.
pub fn parse_account_address(s: &str) -> Result<AccountAddress, DomainError> {
    s.trim()
        .parse::<AccountAddress>()
        .map_err(|_| DomainError::InvalidAccountAddress(s.to_string()))
}

/// Parses a hex module reference.
///
/// # Errors
/// Returns [`DomainError::InvalidModuleRef`] unless the input is 32 hex bytes.
pub fn parse_module_ref(s: &str) -> Result<ModuleReference, DomainError> {
    s.trim()
        .parse::<ModuleReference>()
        .map_err(|_| DomainError::InvalidModuleRef(s.to_string()))
}
