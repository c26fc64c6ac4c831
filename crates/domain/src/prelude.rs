//! Prelude module for convenient imports.
//!
//! ```rust
//! use ccd_dex_domain::prelude::*;
//! ```

pub use crate::address::{
    AccountAddress, ContractAddress, ModuleReference, parse_account_address,
    parse_contract_address, parse_module_ref,
};
pub use crate::contract::{ContractDescriptor, Energy};
pub use crate::entities::{LiquidityPool, UserShareRecord};
pub use crate::enums::SwapDirection;
pub use crate::error::DomainError;
pub use crate::keys::{PoolKey, SharesKey};
pub use crate::token::{TokenAmount, TokenId, TokenPair, TokenRef};
