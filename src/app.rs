//! Composition root: one wallet, one connection manager, one gateway.
use std::sync::Arc;

use crate::config::Config;
use crate::connection::{ConnectionGuard, ConnectionHandle, ConnectionManager};
use crate::contract::{BoardConnector, EthersConnector};
use crate::error::Result;
use crate::gateway::ContractGateway;
use crate::notify::Notifier;
use crate::pages::{BrowsePage, DashboardPage, Landing, PostPage, Route, LANDING};
use crate::wallet::{LocalWalletProvider, WalletProvider};

/// A screen ready to render, already loaded where it has data.
#[derive(Debug, Clone)]
pub enum Screen {
    Landing(&'static Landing),
    Browse(BrowsePage),
    Post(PostPage),
    Dashboard(DashboardPage),
}

pub struct App<C, W: ?Sized> {
    config: Config,
    manager: Arc<ConnectionManager<W>>,
    gateway: ContractGateway<C>,
    guard: Option<ConnectionGuard>,
}

/// The app over a local key and the configured rpc endpoint.
pub type EthersApp = App<EthersConnector, LocalWalletProvider>;

impl EthersApp {
    pub fn with_local_wallet(
        config: Config,
        private_key: Option<&str>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let wallet = Arc::new(
            LocalWalletProvider::new(&config.rpc_url, private_key)?.with_network(&config.network),
        );
        let connector = EthersConnector::new(config.rpc_url.clone(), wallet.clone());
        Ok(App::new(config, wallet, connector, notifier))
    }
}

impl<C, W> App<C, W>
where
    C: BoardConnector,
    W: WalletProvider + ?Sized + 'static,
{
    pub fn new(config: Config, wallet: Arc<W>, connector: C, notifier: Arc<dyn Notifier>) -> Self {
        let manager = Arc::new(ConnectionManager::new(
            wallet,
            config.network.clone(),
            notifier.clone(),
        ));
        let gateway = ContractGateway::new(
            connector,
            config.contract_address,
            manager.handle(),
            notifier,
        );
        Self {
            config,
            manager,
            gateway,
            guard: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn manager(&self) -> &ConnectionManager<W> {
        &self.manager
    }

    pub fn gateway(&self) -> &ContractGateway<C> {
        &self.gateway
    }

    pub fn connection(&self) -> ConnectionHandle {
        self.manager.handle()
    }

    pub fn is_mounted(&self) -> bool {
        self.guard.is_some()
    }

    /// Check for an authorized account and start following wallet events.
    pub async fn mount(&mut self) {
        if self.guard.is_none() {
            self.guard = Some(Arc::clone(&self.manager).mount().await);
        }
    }

    pub fn unmount(&mut self) {
        if let Some(guard) = self.guard.take() {
            guard.unmount();
        }
    }

    /// Build the screen at `route`.
    pub async fn open(&self, route: Route) -> Screen {
        match route {
            Route::Landing => Screen::Landing(&LANDING),
            Route::Tasks => Screen::Browse(self.browse().await),
            Route::Post => Screen::Post(PostPage::new()),
            Route::Dashboard => Screen::Dashboard(self.dashboard().await),
        }
    }

    /// `/tasks`, loaded. A failed load was already notified and leaves it empty.
    pub async fn browse(&self) -> BrowsePage {
        let mut page = BrowsePage::new();
        if let Err(e) = page.load(&self.gateway).await {
            tracing::debug!(error = %e, "opened task list without data");
        }
        page
    }

    /// Bring a loaded screen up to date with the connection: the dashboard
    /// follows the account, both data screens follow chain changes.
    /// Returns whether anything was re-fetched.
    pub async fn refresh(&self, screen: &mut Screen) -> bool {
        let synced = match screen {
            Screen::Browse(page) => page.sync(&self.gateway).await,
            Screen::Dashboard(page) => page.sync(&self.gateway).await,
            Screen::Landing(_) | Screen::Post(_) => Ok(false),
        };
        synced.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "refresh failed, keeping previous data");
            false
        })
    }

    /// Wait for the next connection change, then refresh `screen`.
    /// `None` once the connection can no longer change.
    pub async fn follow(&self, connection: &mut ConnectionHandle, screen: &mut Screen) -> Option<bool> {
        if !connection.changed().await {
            return None;
        }
        Some(self.refresh(screen).await)
    }

    /// `/me`, loaded for the connected account if there is one.
    pub async fn dashboard(&self) -> DashboardPage {
        let mut page = DashboardPage::new();
        if let Err(e) = page.load(&self.gateway).await {
            tracing::debug!(error = %e, "opened dashboard without data");
        }
        page
    }
}
