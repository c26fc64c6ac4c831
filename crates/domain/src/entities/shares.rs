use crate::address::AccountAddress;
use crate::token::{TokenAmount, TokenPair};
use serde::{Deserialize, Serialize};

/// Liquidity shares held by one account in one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserShareRecord {
    pub account: AccountAddress,
    pub pair: TokenPair,
    pub shares: TokenAmount,
}
