//! In-memory snapshot of pool and share state.

use ccd_dex_domain::entities::{LiquidityPool, UserShareRecord};
use ccd_dex_domain::keys::{PoolKey, SharesKey};
use ccd_dex_domain::token::TokenAmount;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Last-known pool reserves and share balances.
///
/// Read-through only: entries are overwritten by later reads and never
/// evicted. Each write replaces one key atomically.
#[derive(Debug, Default)]
pub struct StateCache {
    pools: Arc<RwLock<HashMap<PoolKey, LiquidityPool>>>,
    shares: Arc<RwLock<HashMap<SharesKey, UserShareRecord>>>,
}

impl StateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_pool(&self, key: &PoolKey) -> Option<LiquidityPool> {
        self.pools.read().await.get(key).copied()
    }

    pub async fn put_pool(&self, key: PoolKey, pool: LiquidityPool) {
        debug!(
            pool = %key,
            reserve0 = %pool.token0_reserve,
            reserve1 = %pool.token1_reserve,
            "Caching pool"
        );
        self.pools.write().await.insert(key, pool);
    }

    pub async fn get_shares(&self, key: &SharesKey) -> Option<TokenAmount> {
        self.shares.read().await.get(key).map(|record| record.shares)
    }

    /// Full record behind a share balance.
    pub async fn get_share_record(&self, key: &SharesKey) -> Option<UserShareRecord> {
        self.shares.read().await.get(key).cloned()
    }

    pub async fn put_shares(&self, key: SharesKey, record: UserShareRecord) {
        debug!(shares_key = %key, shares = %record.shares, "Caching shares");
        self.shares.write().await.insert(key, record);
    }

    /// Copy of every cached pool.
    pub async fn pools(&self) -> HashMap<PoolKey, LiquidityPool> {
        self.pools.read().await.clone()
    }

    /// Copy of every cached share record.
    pub async fn shares(&self) -> HashMap<SharesKey, UserShareRecord> {
        self.shares.read().await.clone()
    }
}
