//! Wallet connection state, shared through an explicitly passed [`ConnectionHandle`].
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::notify::{Notification, Notifier};
use crate::types::Address;
use crate::wallet::{switch_to_network, WalletEvent, WalletProvider};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
    pub is_connecting: bool,
    /// Bumped on every chain change. Data fetched under an older epoch is stale.
    pub epoch: u64,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn is_on(&self, network: &NetworkConfig) -> bool {
        self.chain_id == Some(network.chain_id)
    }
}

/// Read side of the connection state.
#[derive(Debug, Clone)]
pub struct ConnectionHandle(watch::Receiver<ConnectionState>);

impl ConnectionHandle {
    pub fn state(&self) -> ConnectionState {
        self.0.borrow().clone()
    }

    pub fn account(&self) -> Option<Address> {
        self.0.borrow().account
    }

    /// Waits for the next state change. `false` once the manager is gone.
    pub async fn changed(&mut self) -> bool {
        self.0.changed().await.is_ok()
    }
}

pub struct ConnectionManager<W: ?Sized> {
    wallet: Arc<W>,
    network: NetworkConfig,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<ConnectionState>,
}

impl<W> ConnectionManager<W>
where
    W: WalletProvider + ?Sized + 'static,
{
    pub fn new(wallet: Arc<W>, network: NetworkConfig, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(ConnectionState::default());
        Self {
            wallet,
            network,
            notifier,
            state,
        }
    }

    pub fn handle(&self) -> ConnectionHandle {
        ConnectionHandle(self.state.subscribe())
    }

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Check the existing authorization, then follow wallet events until the guard drops.
    pub async fn mount(self: Arc<Self>) -> ConnectionGuard {
        let mut events = self.wallet.subscribe();
        self.check_connection().await;
        let manager = Arc::clone(&self);
        let task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                manager.handle_event(event).await;
            }
            tracing::debug!("wallet event stream closed");
        });
        ConnectionGuard { task }
    }

    /// Ask the wallet for access and move it onto the board's network.
    /// Failures become notifications and leave the state as it was.
    pub async fn connect(&self) -> Option<Address> {
        if !self.wallet.is_available() {
            self.notifier.notify(Notification::error(
                "Wallet Required",
                "Please install or configure a wallet to connect.",
            ));
            return None;
        }

        self.state.send_modify(|s| s.is_connecting = true);
        let outcome = self.try_connect().await;
        self.state.send_modify(|s| {
            s.is_connecting = false;
            if let Ok((account, chain_id)) = &outcome {
                s.account = Some(*account);
                s.chain_id = Some(*chain_id);
            }
        });

        match outcome {
            Ok((account, chain_id)) => {
                tracing::info!(?account, chain_id, "wallet connected");
                self.notifier.notify(Notification::info(
                    "Wallet Connected",
                    "Successfully connected to your wallet.",
                ));
                Some(account)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to connect wallet");
                self.notifier
                    .notify(Notification::error("Connection Failed", e.to_string()));
                None
            }
        }
    }

    async fn try_connect(&self) -> Result<(Address, u64)> {
        let accounts = self.wallet.request_accounts().await?;
        let account = *accounts.first().ok_or(Error::NoAccounts)?;

        let chain_id = self.wallet.chain_id().await?;
        if chain_id == self.network.chain_id {
            return Ok((account, chain_id));
        }
        self.notifier.notify(Notification::info(
            "Switching Network",
            format!("Please switch to {} to continue.", self.network.chain_name),
        ));
        switch_to_network(&*self.wallet, &self.network).await?;
        Ok((account, self.network.chain_id))
    }

    /// Local reset only, a wallet cannot be disconnected remotely.
    pub fn disconnect(&self) {
        self.state.send_modify(|s| {
            s.account = None;
            s.chain_id = None;
        });
        tracing::info!("wallet disconnected");
        self.notifier.notify(Notification::info(
            "Wallet Disconnected",
            "Your wallet has been disconnected.",
        ));
    }

    /// Pick up an already authorized account without prompting.
    pub async fn check_connection(&self) {
        if !self.wallet.is_available() {
            return;
        }
        match self.authorized().await {
            Ok(Some((account, chain_id))) => {
                tracing::debug!(?account, chain_id, "found authorized account");
                self.state.send_modify(|s| {
                    s.account = Some(account);
                    s.chain_id = Some(chain_id);
                });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "failed to check connection");
                self.notifier
                    .notify(Notification::error("Connection Check Failed", e.to_string()));
            }
        }
    }

    async fn authorized(&self) -> Result<Option<(Address, u64)>> {
        let account = match self.wallet.accounts().await?.first() {
            Some(account) => *account,
            None => return Ok(None),
        };
        Ok(Some((account, self.wallet.chain_id().await?)))
    }

    pub async fn handle_event(&self, event: WalletEvent) {
        match event {
            WalletEvent::AccountsChanged(accounts) => {
                let account = accounts.first().copied();
                tracing::info!(?account, "wallet accounts changed");
                self.state.send_modify(|s| match account {
                    Some(account) => s.account = Some(account),
                    None => {
                        s.account = None;
                        s.chain_id = None;
                    }
                });
            }
            WalletEvent::ChainChanged(chain_id) => {
                tracing::info!(chain_id, "wallet chain changed, reloading");
                self.reload().await;
            }
        }
    }

    /// Drop everything tied to the previous chain and start over.
    pub async fn reload(&self) {
        self.state.send_modify(|s| {
            *s = ConnectionState {
                epoch: s.epoch + 1,
                ..ConnectionState::default()
            }
        });
        self.check_connection().await;
    }
}

/// Keeps the wallet event subscription alive. Dropping it unsubscribes.
#[derive(Debug)]
pub struct ConnectionGuard {
    task: JoinHandle<()>,
}

impl ConnectionGuard {
    pub fn unmount(self) {}
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}
