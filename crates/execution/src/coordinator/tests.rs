use super::*;
use crate::notify::{Outcome, RecordingNotifier};
use async_trait::async_trait;
use ccd_dex_domain::address::{ContractAddress, ModuleReference};
use ccd_dex_domain::token::{TokenId, TokenRef};
use ccd_dex_protocols::dex::layout::{dex_embedded_schema, dex_legacy_embedded_schema};
use ccd_dex_protocols::error::RpcError;
use ccd_dex_protocols::rpc::{
    InvokeInstanceRequest, InvokeInstanceResult, NodeClient, UpdateOutcome, UpdateRequest,
};
use ccd_dex_protocols::schema::EmbeddedSchema;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Scripted node: serves the DEX schema, answers reads from fixed values and
/// records every request.
struct MockNode {
    schema: Mutex<Option<EmbeddedSchema>>,
    pool: Mutex<Option<(u64, u64, u64)>>,
    shares: Mutex<u64>,
    queries: Mutex<Vec<InvokeInstanceRequest>>,
    updates: Mutex<Vec<UpdateRequest>>,
    fail_queries: AtomicBool,
    /// Fails dry runs of this entrypoint only.
    fail_entrypoint: Mutex<Option<&'static str>>,
    reject_updates: AtomicBool,
    update_gate: Mutex<Option<Arc<Notify>>>,
    query_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockNode {
    fn new() -> Self {
        Self {
            schema: Mutex::new(Some(dex_embedded_schema())),
            pool: Mutex::new(Some((500, 1000, 1000))),
            shares: Mutex::new(1000),
            queries: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            fail_queries: AtomicBool::new(false),
            fail_entrypoint: Mutex::new(None),
            reject_updates: AtomicBool::new(false),
            update_gate: Mutex::new(None),
            query_gate: Mutex::new(None),
        }
    }

    fn queries_for(&self, entrypoint: &str) -> usize {
        let receive_name = format!("dex_contract.{entrypoint}");
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.receive_name.as_receive_name().get_chain_name() == receive_name)
            .count()
    }

    fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn get_embedded_schema(
        &self,
        _module_ref: &ModuleReference,
    ) -> Result<Option<EmbeddedSchema>, RpcError> {
        Ok(self.schema.lock().unwrap().clone())
    }

    async fn invoke_instance(
        &self,
        request: &InvokeInstanceRequest,
    ) -> Result<InvokeInstanceResult, RpcError> {
        self.queries.lock().unwrap().push(request.clone());
        let gate = self.query_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let chain_name = request.receive_name.as_receive_name().get_chain_name();
        let entrypoint = chain_name.split_once('.').map_or("", |(_, e)| e);
        let fail_entrypoint = *self.fail_entrypoint.lock().unwrap();
        if self.fail_queries.load(Ordering::SeqCst)
            || fail_entrypoint.is_some_and(|name| entrypoint == name)
        {
            return Err(RpcError::Transport("connection reset".into()));
        }

        let return_value = if entrypoint == "getPool" {
            match *self.pool.lock().unwrap() {
                Some((r0, r1, total)) => {
                    let mut bytes = vec![1u8];
                    for v in [r0, r1, total] {
                        bytes.extend_from_slice(&v.to_le_bytes());
                    }
                    bytes
                }
                None => vec![0u8],
            }
        } else {
            self.shares.lock().unwrap().to_le_bytes().to_vec()
        };
        Ok(InvokeInstanceResult::Success {
            return_value: Some(return_value),
            used_energy: 900,
        })
    }

    async fn send_update(&self, request: &UpdateRequest) -> Result<UpdateOutcome, RpcError> {
        self.updates.lock().unwrap().push(request.clone());
        let gate = self.update_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.reject_updates.load(Ordering::SeqCst) {
            return Ok(UpdateOutcome::Rejected {
                tx_hash: "feed".into(),
                reason: "InsufficientLiquidity".into(),
            });
        }
        Ok(UpdateOutcome::Success {
            tx_hash: "beef".into(),
        })
    }
}

struct Harness {
    node: Arc<MockNode>,
    notifier: Arc<RecordingNotifier>,
    coordinator: Arc<RequestCoordinator>,
}

fn alice() -> AccountAddress {
    AccountAddress([7u8; 32])
}

fn pair() -> TokenPair {
    TokenPair::new(
        TokenRef::new(ContractAddress::new(1, 0), TokenId::from_u8(0)),
        TokenRef::new(ContractAddress::new(2, 0), TokenId::from_u8(0)),
    )
}

fn harness(account: Option<AccountAddress>) -> Harness {
    let node = Arc::new(MockNode::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let wallet = Arc::new(WalletSession::new(node.clone(), account));
    let coordinator =
        RequestCoordinator::new(&CoordinatorConfig::default(), wallet, notifier.clone()).unwrap();
    Harness {
        node,
        notifier,
        coordinator: Arc::new(coordinator),
    }
}

async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

#[test]
fn test_default_config_matches_deployment() {
    let config = CoordinatorConfig::default();
    let descriptor = config.descriptor().unwrap();
    assert_eq!(descriptor.address(), ContractAddress::new(10312, 0));
    assert_eq!(descriptor.name(), "dex_contract");
    assert_eq!(config.energy, Energy(30_000));
    assert_eq!(config.schema_version, SchemaVersion::V3);
}

#[test]
fn test_invalid_config_rejected() {
    let config = CoordinatorConfig {
        module_ref: "not-hex".into(),
        ..Default::default()
    };
    assert!(config.descriptor().is_err());
}

#[tokio::test]
async fn test_query_pool_caches_reserves() {
    let h = harness(None);
    let pool = h.coordinator.query_pool(&pair()).await.unwrap();

    let expected = LiquidityPool::new(500u64, 1000u64, 1000u64);
    assert_eq!(pool, Some(expected));
    assert_eq!(h.coordinator.pool(&pair()).await, Some(expected));
    assert!(!h.coordinator.is_loading_pool(&pair()));
    assert_eq!(h.notifier.count(Operation::QueryPool, Outcome::Success).await, 1);
    assert_eq!(h.node.queries.lock().unwrap()[0].energy, Energy(30_000));
}

#[tokio::test]
async fn test_query_pool_none_leaves_cache_empty() {
    let h = harness(None);
    *h.node.pool.lock().unwrap() = None;

    assert_eq!(h.coordinator.query_pool(&pair()).await.unwrap(), None);
    assert!(h.coordinator.cache().pools().await.is_empty());
    assert_eq!(h.notifier.count(Operation::QueryPool, Outcome::Success).await, 1);
}

#[tokio::test]
async fn test_reversed_pair_is_cached_separately() {
    let h = harness(None);
    h.coordinator.query_pool(&pair()).await.unwrap();
    assert!(h.coordinator.pool(&pair().reversed()).await.is_none());
}

#[tokio::test]
async fn test_missing_schema_fails_before_invoke() {
    let h = harness(None);
    *h.node.schema.lock().unwrap() = None;

    let err = h.coordinator.query_pool(&pair()).await.unwrap_err();
    assert!(matches!(err, OperationError::SchemaFetch(_)));
    assert!(h.node.queries.lock().unwrap().is_empty());
    assert!(!h.coordinator.is_loading_pool(&pair()));
    assert_eq!(h.notifier.count(Operation::QueryPool, Outcome::Failure).await, 1);
}

#[tokio::test]
async fn test_schema_pinned_to_other_version_is_rejected() {
    let h = harness(None);
    *h.node.schema.lock().unwrap() = Some(dex_legacy_embedded_schema());

    let err = h.coordinator.query_pool(&pair()).await.unwrap_err();
    assert_eq!(err.stage(), "schema");
}

#[tokio::test]
async fn test_query_shares_caches_record() {
    let h = harness(None);
    let shares = h.coordinator.query_shares(&pair(), alice()).await.unwrap();

    assert_eq!(shares, TokenAmount::from(1000u64));
    assert_eq!(h.coordinator.shares(&pair(), alice()).await, Some(shares));
    assert!(!h.coordinator.is_loading_shares(&pair(), alice()));
    let record = h
        .coordinator
        .cache()
        .get_share_record(&SharesKey::new(&pair(), alice()))
        .await
        .unwrap();
    assert_eq!(record.pair, pair());
}

#[tokio::test]
async fn test_loading_flag_set_only_while_running() {
    let h = harness(None);
    let gate = Arc::new(Notify::new());
    *h.node.query_gate.lock().unwrap() = Some(gate.clone());

    let coordinator = h.coordinator.clone();
    let task = tokio::spawn(async move { coordinator.query_pool(&pair()).await });

    let node = h.node.clone();
    wait_until(|| node.queries_for("getPool") == 1).await;
    assert!(h.coordinator.is_loading_pool(&pair()));

    gate.notify_one();
    task.await.unwrap().unwrap();
    assert!(!h.coordinator.is_loading_pool(&pair()));
}

#[tokio::test]
async fn test_missing_amount_is_validation_error() {
    let h = harness(Some(alice()));
    let err = h
        .coordinator
        .add_liquidity(&pair(), None, Some(100u64.into()), TokenAmount::zero())
        .await
        .unwrap_err();

    assert!(matches!(err, OperationError::Validation(ref m) if m.contains("amount0")));
    assert_eq!(h.node.update_count(), 0);
    assert!(h.node.queries.lock().unwrap().is_empty());
    assert!(!h.coordinator.is_transaction_pending());
    assert_eq!(h.notifier.count(Operation::AddLiquidity, Outcome::Failure).await, 1);
}

#[tokio::test]
async fn test_zero_amounts_are_validation_errors() {
    let h = harness(Some(alice()));
    let err = h
        .coordinator
        .remove_liquidity(
            &pair(),
            Some(TokenAmount::zero()),
            TokenAmount::zero(),
            TokenAmount::zero(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OperationError::Validation(_)));

    let err = h
        .coordinator
        .swap(
            &pair(),
            Some(TokenAmount::zero()),
            TokenAmount::zero(),
            SwapDirection::Token0ToToken1,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OperationError::Validation(_)));
    assert_eq!(h.node.update_count(), 0);
}

#[tokio::test]
async fn test_mutation_without_account_is_not_connected() {
    let h = harness(None);
    let err = h
        .coordinator
        .add_liquidity(&pair(), Some(500u64.into()), Some(1000u64.into()), TokenAmount::zero())
        .await
        .unwrap_err();

    assert!(matches!(err, OperationError::NotConnected));
    assert_eq!(h.node.update_count(), 0);
    assert!(!h.coordinator.is_transaction_pending());
}

#[tokio::test]
async fn test_successful_add_liquidity_refreshes_once() {
    let h = harness(Some(alice()));
    let report = h
        .coordinator
        .add_liquidity(&pair(), Some(500u64.into()), Some(1000u64.into()), TokenAmount::zero())
        .await
        .unwrap();

    assert_eq!(report.tx_hash, "beef");
    assert!(report.refresh_succeeded());
    assert_eq!(h.node.update_count(), 1);
    assert_eq!(h.node.queries_for("getPool"), 1);
    assert_eq!(h.node.queries_for("getShares"), 1);
    assert_eq!(
        h.coordinator.pool(&pair()).await,
        Some(LiquidityPool::new(500u64, 1000u64, 1000u64))
    );
    assert_eq!(h.coordinator.shares(&pair(), alice()).await, Some(1000u64.into()));
    assert!(!h.coordinator.is_transaction_pending());
    assert_eq!(h.notifier.count(Operation::AddLiquidity, Outcome::Success).await, 1);

    let update = h.node.updates.lock().unwrap()[0].clone();
    assert_eq!(update.sender, alice());
    assert_eq!(
        update.receive_name.as_receive_name().get_chain_name(),
        "dex_contract.addLiquidity"
    );
}

#[tokio::test]
async fn test_failed_add_liquidity_never_writes_cache() {
    let h = harness(Some(alice()));
    h.node.reject_updates.store(true, Ordering::SeqCst);

    let err = h
        .coordinator
        .add_liquidity(&pair(), Some(500u64.into()), Some(1000u64.into()), TokenAmount::zero())
        .await
        .unwrap_err();

    assert!(matches!(err, OperationError::Invocation(_)));
    assert!(h.node.queries.lock().unwrap().is_empty());
    assert!(h.coordinator.cache().pools().await.is_empty());
    assert!(h.coordinator.cache().shares().await.is_empty());
    assert!(!h.coordinator.is_transaction_pending());
}

#[tokio::test]
async fn test_refresh_failure_keeps_stale_cache_and_warns() {
    let h = harness(Some(alice()));
    h.coordinator.query_pool(&pair()).await.unwrap();
    *h.node.pool.lock().unwrap() = Some((400, 1250, 1000));
    h.node.fail_queries.store(true, Ordering::SeqCst);

    let report = h
        .coordinator
        .swap(&pair(), Some(100u64.into()), TokenAmount::zero(), SwapDirection::Token0ToToken1)
        .await
        .unwrap();

    assert!(!report.refresh_succeeded());
    assert!(report.pool_refresh.is_err());
    assert_eq!(
        h.coordinator.pool(&pair()).await,
        Some(LiquidityPool::new(500u64, 1000u64, 1000u64))
    );
    assert_eq!(h.notifier.count(Operation::Swap, Outcome::Success).await, 1);
    assert_eq!(h.notifier.count(Operation::Swap, Outcome::Warning).await, 1);
    assert_eq!(h.notifier.count(Operation::QueryPool, Outcome::Failure).await, 1);

    let warning = warning_message(&h, Operation::Swap).await;
    assert!(warning.contains("refreshing pool state and share balance failed"));
}

async fn warning_message(h: &Harness, operation: Operation) -> String {
    h.notifier
        .history()
        .await
        .into_iter()
        .find(|n| n.operation == operation && n.outcome == Outcome::Warning)
        .map(|n| n.message)
        .unwrap()
}

#[tokio::test]
async fn test_shares_only_refresh_failure_names_shares() {
    let h = harness(Some(alice()));
    *h.node.fail_entrypoint.lock().unwrap() = Some("getShares");

    let report = h
        .coordinator
        .add_liquidity(&pair(), Some(5u64.into()), Some(10u64.into()), TokenAmount::zero())
        .await
        .unwrap();

    assert!(report.pool_refresh.is_ok());
    assert!(matches!(report.shares_refresh, Some(Err(_))));
    assert_eq!(report.stale_state(), Some("share balance"));
    let warning = warning_message(&h, Operation::AddLiquidity).await;
    assert!(warning.contains("refreshing share balance failed"));
    assert!(!warning.contains("pool state"));
}

#[test]
fn test_stale_state_wording() {
    fn failed<T>() -> Result<T, OperationError> {
        Err(OperationError::Validation("x".into()))
    }
    let report = |pool_refresh, shares_refresh| MutationReport {
        operation: Operation::Swap,
        tx_hash: "beef".into(),
        pool_refresh,
        shares_refresh,
    };

    assert_eq!(report(Ok(None), None).stale_state(), None);
    assert_eq!(report(Ok(None), Some(Ok(TokenAmount::zero()))).stale_state(), None);
    assert_eq!(report(failed(), None).stale_state(), Some("pool state"));
    assert_eq!(report(Ok(None), Some(failed())).stale_state(), Some("share balance"));
    assert_eq!(
        report(failed(), Some(failed())).stale_state(),
        Some("pool state and share balance")
    );
}

#[tokio::test]
async fn test_second_mutation_rejected_while_pending() {
    let h = harness(Some(alice()));
    let gate = Arc::new(Notify::new());
    *h.node.update_gate.lock().unwrap() = Some(gate.clone());

    let coordinator = h.coordinator.clone();
    let first = tokio::spawn(async move {
        coordinator
            .swap(&pair(), Some(10u64.into()), TokenAmount::zero(), SwapDirection::Token0ToToken1)
            .await
    });

    let node = h.node.clone();
    wait_until(|| node.update_count() == 1).await;
    assert!(h.coordinator.is_transaction_pending());

    let err = h
        .coordinator
        .add_liquidity(&pair(), Some(1u64.into()), Some(1u64.into()), TokenAmount::zero())
        .await
        .unwrap_err();
    assert!(matches!(err, OperationError::Validation(ref m) if m.contains("pending")));
    assert_eq!(h.node.update_count(), 1);

    gate.notify_one();
    first.await.unwrap().unwrap();
    assert!(!h.coordinator.is_transaction_pending());
}

#[tokio::test]
async fn test_swap_direction_reaches_the_contract() {
    let h = harness(Some(alice()));
    h.coordinator
        .swap(&pair(), Some(10u64.into()), TokenAmount::zero(), SwapDirection::Token1ToToken0)
        .await
        .unwrap();

    let update = h.node.updates.lock().unwrap()[0].clone();
    assert_eq!(update.parameter.last(), Some(&0u8));
}

#[tokio::test]
async fn test_wallet_disconnect_skips_shares_refresh() {
    let h = harness(Some(alice()));
    h.coordinator.wallet().disconnect().await;

    let err = h
        .coordinator
        .remove_liquidity(&pair(), Some(1u64.into()), TokenAmount::zero(), TokenAmount::zero())
        .await
        .unwrap_err();
    assert!(matches!(err, OperationError::NotConnected));

    h.coordinator.wallet().connect(alice()).await;
    let report = h
        .coordinator
        .remove_liquidity(&pair(), Some(1u64.into()), TokenAmount::zero(), TokenAmount::zero())
        .await
        .unwrap();
    assert!(report.shares_refresh.is_some());
}

#[tokio::test]
async fn test_disconnect_during_pending_update_skips_shares_refresh() {
    let h = harness(Some(alice()));
    let gate = Arc::new(Notify::new());
    *h.node.update_gate.lock().unwrap() = Some(gate.clone());

    let coordinator = h.coordinator.clone();
    let task = tokio::spawn(async move {
        coordinator
            .remove_liquidity(&pair(), Some(1u64.into()), TokenAmount::zero(), TokenAmount::zero())
            .await
    });

    let node = h.node.clone();
    wait_until(|| node.update_count() == 1).await;
    h.coordinator.wallet().disconnect().await;
    gate.notify_one();

    let report = task.await.unwrap().unwrap();
    assert!(report.shares_refresh.is_none());
    assert!(report.pool_refresh.is_ok());
    assert!(report.refresh_succeeded());
    assert_eq!(h.node.queries_for("getPool"), 1);
    assert_eq!(h.node.queries_for("getShares"), 0);
    assert_eq!(h.notifier.count(Operation::RemoveLiquidity, Outcome::Warning).await, 0);
}

#[tokio::test]
async fn test_pending_released_before_refresh() {
    let h = harness(Some(alice()));
    let gate = Arc::new(Notify::new());
    *h.node.query_gate.lock().unwrap() = Some(gate.clone());

    let coordinator = h.coordinator.clone();
    let task = tokio::spawn(async move {
        coordinator
            .swap(&pair(), Some(10u64.into()), TokenAmount::zero(), SwapDirection::Token0ToToken1)
            .await
    });

    let node = h.node.clone();
    wait_until(|| node.queries_for("getPool") == 1).await;
    assert!(h.coordinator.is_loading_pool(&pair()));
    assert!(!h.coordinator.is_transaction_pending());
    assert_eq!(h.notifier.count(Operation::Swap, Outcome::Success).await, 1);

    gate.notify_one();
    wait_until(|| node.queries_for("getShares") == 1).await;
    gate.notify_one();

    let report = task.await.unwrap().unwrap();
    assert!(report.refresh_succeeded());
    assert!(!h.coordinator.is_loading_pool(&pair()));
}
