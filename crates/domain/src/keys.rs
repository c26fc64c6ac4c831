//! Cache keys for pool and share snapshots.
//!
//! Keys are derived from the pair exactly as given: `(A, B)` and `(B, A)`
//! map to different keys even when the contract holds a single pool for
//! both orders.

use crate::address::AccountAddress;
use crate::token::TokenPair;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key under which a pool snapshot is cached.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolKey(String);

impl PoolKey {
    pub fn from_pair(pair: &TokenPair) -> Self {
        Self(format!("{}-{}", pair.token0, pair.token1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&TokenPair> for PoolKey {
    fn from(pair: &TokenPair) -> Self {
        Self::from_pair(pair)
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key under which an account's share balance in a pool is cached.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SharesKey {
    pub pool: PoolKey,
    pub account: AccountAddress,
}

impl SharesKey {
    pub fn new(pair: &TokenPair, account: AccountAddress) -> Self {
        Self {
            pool: PoolKey::from_pair(pair),
            account,
        }
    }
}

impl fmt::Display for SharesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.pool, self.account)
    }
}
