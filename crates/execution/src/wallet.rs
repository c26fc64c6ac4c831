//! Connected wallet state.

use ccd_dex_domain::address::AccountAddress;
use ccd_dex_protocols::rpc::NodeClient;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// The account a user has connected, if any, and the node it talks through.
///
/// Having no account is a normal state: reads still work, mutations are
/// refused.
pub struct WalletSession {
    account: RwLock<Option<AccountAddress>>,
    node: Arc<dyn NodeClient>,
}

impl WalletSession {
    pub fn new(node: Arc<dyn NodeClient>, account: Option<AccountAddress>) -> Self {
        Self {
            account: RwLock::new(account),
            node,
        }
    }

    /// Session without a connected account.
    pub fn disconnected(node: Arc<dyn NodeClient>) -> Self {
        Self::new(node, None)
    }

    pub async fn account(&self) -> Option<AccountAddress> {
        *self.account.read().await
    }

    pub async fn connect(&self, account: AccountAddress) {
        info!(account = %account, "Wallet connected");
        *self.account.write().await = Some(account);
    }

    pub async fn disconnect(&self) {
        if let Some(account) = self.account.write().await.take() {
            info!(account = %account, "Wallet disconnected");
        }
    }

    pub fn node(&self) -> Arc<dyn NodeClient> {
        Arc::clone(&self.node)
    }
}
