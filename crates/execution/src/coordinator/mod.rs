//! Request coordination.
//!
//! Reads run schema fetch, encode, dry run, decode and cache write.
//! Mutations validate, submit a transaction, then refresh the pool and the
//! caller's shares through the same read pipeline.

mod flags;
#[cfg(test)]
mod tests;

pub use flags::LoadingKey;

use crate::cache::StateCache;
use crate::error::OperationError;
use crate::notify::{Notification, Notifier, Operation};
use crate::wallet::WalletSession;
use ccd_dex_domain::address::AccountAddress;
use ccd_dex_domain::contract::{ContractDescriptor, Energy};
use ccd_dex_domain::entities::{LiquidityPool, UserShareRecord};
use ccd_dex_domain::enums::SwapDirection;
use ccd_dex_domain::error::DomainError;
use ccd_dex_domain::keys::{PoolKey, SharesKey};
use ccd_dex_domain::token::{TokenAmount, TokenPair};
use ccd_dex_protocols::dex::layout::DEX_CONTRACT_NAME;
use ccd_dex_protocols::dex::{
    AddLiquidity, AddLiquidityParams, ContractInvoker, GetPool, GetShares, InvocationMode,
    QueryEntrypoint, RemoveLiquidity, RemoveLiquidityParams, SchemaCodec, Swap, SwapParams,
    UpdateEntrypoint,
};
use ccd_dex_protocols::schema::SchemaVersion;
use flags::{LoadingRegistry, PendingSlot};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Index of the deployed DEX instance.
pub const DEFAULT_CONTRACT_INDEX: u64 = 10312;
/// Module the DEX instance was deployed from.
pub const DEFAULT_MODULE_REF: &str =
    "8d880e189f5248b7ad83d7d2fdc3456461aef23bc4bf6a43af9a096199d0c462";

/// Which contract to talk to and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub contract_index: u64,
    pub contract_subindex: u64,
    pub contract_name: String,
    /// Hex module reference holding the embedded schema.
    pub module_ref: String,
    /// Energy budget for every call.
    pub energy: Energy,
    /// Version every fetched schema is parsed at.
    pub schema_version: SchemaVersion,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            contract_index: DEFAULT_CONTRACT_INDEX,
            contract_subindex: 0,
            contract_name: DEX_CONTRACT_NAME.to_string(),
            module_ref: DEFAULT_MODULE_REF.to_string(),
            energy: Energy::DEFAULT_MAX,
            schema_version: SchemaVersion::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Validated descriptor of the configured contract.
    ///
    /// # Errors
    /// Returns an error if the contract name or module reference is invalid.
    pub fn descriptor(&self) -> Result<ContractDescriptor, DomainError> {
        ContractDescriptor::from_parts(
            self.contract_index,
            self.contract_subindex,
            &self.contract_name,
            &self.module_ref,
        )
    }
}

/// Result of a confirmed mutation and of the refresh that followed it.
#[derive(Debug)]
pub struct MutationReport {
    pub operation: Operation,
    pub tx_hash: String,
    pub pool_refresh: Result<Option<LiquidityPool>, OperationError>,
    /// `None` when no account was connected at refresh time.
    pub shares_refresh: Option<Result<TokenAmount, OperationError>>,
}

impl MutationReport {
    /// Whether every refresh after the transaction succeeded.
    pub fn refresh_succeeded(&self) -> bool {
        self.stale_state().is_none()
    }

    /// What could not be refreshed, if anything.
    pub fn stale_state(&self) -> Option<&'static str> {
        let pool_failed = self.pool_refresh.is_err();
        let shares_failed = matches!(self.shares_refresh, Some(Err(_)));
        match (pool_failed, shares_failed) {
            (false, false) => None,
            (true, false) => Some("pool state"),
            (false, true) => Some("share balance"),
            (true, true) => Some("pool state and share balance"),
        }
    }
}

fn required(field: &str, amount: Option<TokenAmount>) -> Result<TokenAmount, OperationError> {
    match amount {
        Some(amount) if !amount.is_zero() => Ok(amount),
        Some(_) => Err(OperationError::Validation(format!(
            "{field} must be greater than zero"
        ))),
        None => Err(OperationError::Validation(format!("{field} is required"))),
    }
}

/// Owns the DEX client state and runs every user operation.
pub struct RequestCoordinator {
    contract: ContractDescriptor,
    energy: Energy,
    codec: SchemaCodec,
    invoker: ContractInvoker,
    cache: Arc<StateCache>,
    notifier: Arc<dyn Notifier>,
    wallet: Arc<WalletSession>,
    loading: LoadingRegistry,
    pending: PendingSlot,
}

impl RequestCoordinator {
    /// Builds a coordinator whose codec and invoker use the wallet's node.
    ///
    /// # Errors
    /// Returns an error if the configured contract descriptor is invalid.
    pub fn new(
        config: &CoordinatorConfig,
        wallet: Arc<WalletSession>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, DomainError> {
        let contract = config.descriptor()?;
        let node = wallet.node();
        Ok(Self::from_parts(
            contract,
            config.energy,
            SchemaCodec::new(Arc::clone(&node), config.schema_version),
            ContractInvoker::new(node),
            Arc::new(StateCache::new()),
            notifier,
            wallet,
        ))
    }

    /// Builds a coordinator from explicit collaborators.
    pub fn from_parts(
        contract: ContractDescriptor,
        energy: Energy,
        codec: SchemaCodec,
        invoker: ContractInvoker,
        cache: Arc<StateCache>,
        notifier: Arc<dyn Notifier>,
        wallet: Arc<WalletSession>,
    ) -> Self {
        Self {
            contract,
            energy,
            codec,
            invoker,
            cache,
            notifier,
            wallet,
            loading: LoadingRegistry::default(),
            pending: PendingSlot::default(),
        }
    }

    pub fn contract(&self) -> &ContractDescriptor {
        &self.contract
    }

    pub fn cache(&self) -> &Arc<StateCache> {
        &self.cache
    }

    pub fn wallet(&self) -> &Arc<WalletSession> {
        &self.wallet
    }

    /// Cached pool for `pair`, as given.
    pub async fn pool(&self, pair: &TokenPair) -> Option<LiquidityPool> {
        self.cache.get_pool(&PoolKey::from_pair(pair)).await
    }

    /// Cached share balance of `account` in `pair`.
    pub async fn shares(&self, pair: &TokenPair, account: AccountAddress) -> Option<TokenAmount> {
        self.cache.get_shares(&SharesKey::new(pair, account)).await
    }

    pub fn is_loading_pool(&self, pair: &TokenPair) -> bool {
        self.loading
            .is_loading(&LoadingKey::Pool(PoolKey::from_pair(pair)))
    }

    pub fn is_loading_shares(&self, pair: &TokenPair, account: AccountAddress) -> bool {
        self.loading
            .is_loading(&LoadingKey::Shares(SharesKey::new(pair, account)))
    }

    pub fn is_transaction_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Reads the pool for `pair` and caches it if it exists.
    ///
    /// A missing pool is not an error; the cache is left untouched.
    ///
    /// # Errors
    /// Returns the error of the first failing stage.
    pub async fn query_pool(
        &self,
        pair: &TokenPair,
    ) -> Result<Option<LiquidityPool>, OperationError> {
        let key = PoolKey::from_pair(pair);
        let _loading = self.loading.begin(LoadingKey::Pool(key.clone()));
        debug!(pool = %key, "Querying pool");

        match self.read::<GetPool>(pair).await {
            Ok(Some(pool)) => {
                self.cache.put_pool(key, pool).await;
                self.notify(Notification::success(
                    Operation::QueryPool,
                    format!("Pool information fetched for {pair}"),
                ))
                .await;
                Ok(Some(pool))
            }
            Ok(None) => {
                info!(pool = %key, "Pool does not exist");
                self.notify(Notification::success(
                    Operation::QueryPool,
                    format!("No pool exists for {pair}"),
                ))
                .await;
                Ok(None)
            }
            Err(e) => {
                self.report_failure(Operation::QueryPool, &e).await;
                Err(e)
            }
        }
    }

    /// Reads the share balance of `account` in `pair` and caches it.
    ///
    /// # Errors
    /// Returns the error of the first failing stage.
    pub async fn query_shares(
        &self,
        pair: &TokenPair,
        account: AccountAddress,
    ) -> Result<TokenAmount, OperationError> {
        let key = SharesKey::new(pair, account);
        let _loading = self.loading.begin(LoadingKey::Shares(key.clone()));
        debug!(shares_key = %key, "Querying shares");

        match self.read::<GetShares>(&(pair.clone(), account)).await {
            Ok(shares) => {
                let record = UserShareRecord {
                    account,
                    pair: pair.clone(),
                    shares,
                };
                self.cache.put_shares(key, record).await;
                self.notify(Notification::success(
                    Operation::QueryShares,
                    format!("User shares fetched for {pair}"),
                ))
                .await;
                Ok(shares)
            }
            Err(e) => {
                self.report_failure(Operation::QueryShares, &e).await;
                Err(e)
            }
        }
    }

    /// Deposits both tokens into the pool of `pair`.
    ///
    /// # Errors
    /// Fails on missing or zero amounts, without an account, while another
    /// transaction is pending, or when the transaction fails.
    pub async fn add_liquidity(
        &self,
        pair: &TokenPair,
        amount0: Option<TokenAmount>,
        amount1: Option<TokenAmount>,
        min_liquidity: TokenAmount,
    ) -> Result<MutationReport, OperationError> {
        self.mutate::<AddLiquidity, _>(Operation::AddLiquidity, pair, || {
            Ok(AddLiquidityParams {
                pair: pair.clone(),
                amount0: required("amount0", amount0)?,
                amount1: required("amount1", amount1)?,
                min_liquidity,
            })
        })
        .await
    }

    /// Burns `shares` of the pool of `pair`.
    ///
    /// # Errors
    /// Same conditions as [`Self::add_liquidity`].
    pub async fn remove_liquidity(
        &self,
        pair: &TokenPair,
        shares: Option<TokenAmount>,
        min_amount0: TokenAmount,
        min_amount1: TokenAmount,
    ) -> Result<MutationReport, OperationError> {
        self.mutate::<RemoveLiquidity, _>(Operation::RemoveLiquidity, pair, || {
            Ok(RemoveLiquidityParams {
                pair: pair.clone(),
                shares: required("shares", shares)?,
                min_amount0,
                min_amount1,
            })
        })
        .await
    }

    /// Swaps `amount_in` of one token of `pair` for the other.
    ///
    /// # Errors
    /// Same conditions as [`Self::add_liquidity`].
    pub async fn swap(
        &self,
        pair: &TokenPair,
        amount_in: Option<TokenAmount>,
        min_amount_out: TokenAmount,
        direction: SwapDirection,
    ) -> Result<MutationReport, OperationError> {
        self.mutate::<Swap, _>(Operation::Swap, pair, || {
            Ok(SwapParams {
                pair: pair.clone(),
                amount_in: required("amount_in", amount_in)?,
                min_amount_out,
                direction,
            })
        })
        .await
    }

    async fn read<E: QueryEntrypoint>(
        &self,
        params: &E::Param,
    ) -> Result<E::Return, OperationError> {
        let schema = self.codec.fetch_schema(&self.contract).await?;
        let parameter = self.codec.encode::<E>(&schema, self.contract.name(), params)?;
        let outcome = self
            .invoker
            .invoke(&self.contract, E::NAME, parameter, self.energy, InvocationMode::Query)
            .await?;
        let bytes = outcome.return_value.unwrap_or_default();
        Ok(self.codec.decode::<E>(&schema, self.contract.name(), &bytes)?)
    }

    async fn submit<E: UpdateEntrypoint>(
        &self,
        build: impl FnOnce() -> Result<E::Param, OperationError>,
    ) -> Result<(String, AccountAddress), OperationError> {
        let params = build()?;
        let sender = self
            .wallet
            .account()
            .await
            .ok_or(OperationError::NotConnected)?;

        let schema = self.codec.fetch_schema(&self.contract).await?;
        let parameter = self.codec.encode::<E>(&schema, self.contract.name(), &params)?;
        let outcome = self
            .invoker
            .invoke(
                &self.contract,
                E::NAME,
                parameter,
                self.energy,
                InvocationMode::Transaction { sender },
            )
            .await?;
        Ok((outcome.tx_hash.unwrap_or_default(), sender))
    }

    async fn mutate<E, F>(
        &self,
        operation: Operation,
        pair: &TokenPair,
        build: F,
    ) -> Result<MutationReport, OperationError>
    where
        E: UpdateEntrypoint,
        F: FnOnce() -> Result<E::Param, OperationError>,
    {
        let (tx_hash, sender) = {
            let Some(_pending) = self.pending.try_claim() else {
                let err = OperationError::Validation("another transaction is pending".into());
                self.report_failure(operation, &err).await;
                return Err(err);
            };

            match self.submit::<E>(build).await {
                Ok(submitted) => {
                    self.notify(Notification::success(
                        operation,
                        format!("Transaction {} confirmed for {pair}", submitted.0),
                    ))
                    .await;
                    submitted
                }
                Err(e) => {
                    self.report_failure(operation, &e).await;
                    return Err(e);
                }
            }
        };

        info!(
            operation = %operation,
            tx_hash = %tx_hash,
            sender = %sender,
            "Refreshing state after transaction"
        );
        let pool_refresh = self.query_pool(pair).await;
        let shares_refresh = match self.wallet.account().await {
            Some(account) => Some(self.query_shares(pair, account).await),
            None => None,
        };

        let report = MutationReport {
            operation,
            tx_hash,
            pool_refresh,
            shares_refresh,
        };
        if let Some(stale) = report.stale_state() {
            warn!(
                operation = %operation,
                tx_hash = %report.tx_hash,
                stale,
                "State refresh failed after transaction"
            );
            self.notify(Notification::warning(
                operation,
                format!(
                    "Transaction succeeded but refreshing {stale} failed; \
                     displayed values may be stale"
                ),
            ))
            .await;
        }
        Ok(report)
    }

    async fn report_failure(&self, operation: Operation, error: &OperationError) {
        warn!(operation = %operation, stage = error.stage(), error = %error, "Operation failed");
        self.notify(Notification::failure(operation, error.to_string()))
            .await;
    }

    async fn notify(&self, notification: Notification) {
        self.notifier.notify(&notification).await;
    }
}
