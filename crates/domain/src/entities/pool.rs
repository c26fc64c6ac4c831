use crate::token::TokenAmount;
use serde::{Deserialize, Serialize};

/// Last-known reserves of a constant-product pool as reported by the contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPool {
    pub token0_reserve: TokenAmount,
    pub token1_reserve: TokenAmount,
    pub total_shares: TokenAmount,
}

impl LiquidityPool {
    pub fn new(
        token0_reserve: impl Into<TokenAmount>,
        token1_reserve: impl Into<TokenAmount>,
        total_shares: impl Into<TokenAmount>,
    ) -> Self {
        Self {
            token0_reserve: token0_reserve.into(),
            token1_reserve: token1_reserve.into(),
            total_shares: total_shares.into(),
        }
    }

    /// A pool with no outstanding shares has never been seeded (or was fully drained).
    pub fn is_empty(&self) -> bool {
        self.total_shares.is_zero()
    }
}
