//! Wallet provider seam and a local-key implementation of it.
use std::collections::HashSet;
use std::convert::TryFrom;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::broadcast;

use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::types::Address;

/// Client that signs with the connected account and sends through the rpc endpoint.
pub type SigningClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Wallet-originated notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// An empty list means the wallet revoked access.
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Whether a wallet is present at all.
    fn is_available(&self) -> bool;

    /// Asks the user for account access.
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Accounts already authorized. Never prompts.
    async fn accounts(&self) -> Result<Vec<Address>>;

    async fn chain_id(&self) -> Result<u64>;

    /// Fails with [`Error::UnrecognizedChain`] when the wallet has no definition of the chain.
    async fn switch_chain(&self, chain_id: u64) -> Result<()>;

    /// Registers the network definition. Adding a network also selects it.
    async fn add_chain(&self, network: &NetworkConfig) -> Result<()>;

    fn subscribe(&self) -> BoxStream<'static, WalletEvent>;
}

/// Switch the wallet onto `network`, adding the definition first if the wallet does not know it.
pub async fn switch_to_network<W>(wallet: &W, network: &NetworkConfig) -> Result<()>
where
    W: WalletProvider + ?Sized,
{
    match wallet.switch_chain(network.chain_id).await {
        Err(Error::UnrecognizedChain(chain_id)) => {
            tracing::info!(chain_id, name = %network.chain_name, "network unknown to wallet, adding it");
            wallet.add_chain(network).await
        }
        other => other,
    }
}

/// A wallet holding one local private key. Its account is always authorized,
/// so [`WalletProvider::accounts`] never needs a prompt.
pub struct LocalWalletProvider {
    signer: RwLock<Option<LocalWallet>>,
    provider: Provider<Http>,
    chain_id: AtomicU64,
    known_chains: RwLock<HashSet<u64>>,
    events: broadcast::Sender<WalletEvent>,
}

impl std::fmt::Debug for LocalWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWalletProvider")
            .field("account", &self.account())
            .field("chain_id", &self.chain_id.load(Ordering::SeqCst))
            .finish()
    }
}

impl LocalWalletProvider {
    pub fn new(rpc_url: &str, private_key: Option<&str>) -> Result<Self> {
        let provider =
            Provider::<Http>::try_from(rpc_url).map_err(|_| Error::InvalidRpcUrl(rpc_url.to_owned()))?;
        let signer = private_key.map(parse_private_key).transpose()?;
        let chain_id = signer.as_ref().map(|s| s.chain_id()).unwrap_or(1);
        let (events, _) = broadcast::channel(16);
        Ok(Self {
            signer: RwLock::new(signer),
            provider,
            chain_id: AtomicU64::new(chain_id),
            known_chains: RwLock::new(std::iter::once(chain_id).collect()),
            events,
        })
    }

    /// Pre-register `network` and select it without asking the rpc endpoint.
    pub fn with_network(self, network: &NetworkConfig) -> Self {
        self.known_chains_mut().insert(network.chain_id);
        self.chain_id.store(network.chain_id, Ordering::SeqCst);
        self
    }

    pub fn account(&self) -> Option<Address> {
        self.signer_ref().as_ref().map(|s| s.address())
    }

    /// Swap the key the wallet signs with, announcing the new account list.
    pub fn replace_key(&self, private_key: Option<&str>) -> Result<()> {
        let signer = private_key.map(parse_private_key).transpose()?;
        let accounts: Vec<Address> = signer.iter().map(|s| s.address()).collect();
        *self.signer.write().unwrap_or_else(|e| e.into_inner()) = signer;
        self.emit(WalletEvent::AccountsChanged(accounts));
        Ok(())
    }

    pub fn signing_client(&self) -> Result<Arc<SigningClient>> {
        let signer = self
            .signer_ref()
            .clone()
            .ok_or(Error::WalletNotConnected)?
            .with_chain_id(self.chain_id.load(Ordering::SeqCst));
        Ok(Arc::new(SignerMiddleware::new(self.provider.clone(), signer)))
    }

    fn emit(&self, event: WalletEvent) {
        // no subscriber is not an error
        let _ = self.events.send(event);
    }

    fn signer_ref(&self) -> std::sync::RwLockReadGuard<'_, Option<LocalWallet>> {
        self.signer.read().unwrap_or_else(|e| e.into_inner())
    }

    fn known_chains_mut(&self) -> std::sync::RwLockWriteGuard<'_, HashSet<u64>> {
        self.known_chains.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl WalletProvider for LocalWalletProvider {
    fn is_available(&self) -> bool {
        self.signer_ref().is_some()
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        match self.account() {
            Some(account) => Ok(vec![account]),
            None => Err(Error::WalletUnavailable),
        }
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.account().into_iter().collect())
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id.load(Ordering::SeqCst))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        let known = self
            .known_chains
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&chain_id);
        if !known {
            return Err(Error::UnrecognizedChain(chain_id));
        }
        let actual = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| Error::Rpc(e.to_string()))?
            .low_u64();
        if actual != chain_id {
            return Err(Error::ChainMismatch {
                expected: chain_id,
                actual,
            });
        }
        if self.chain_id.swap(chain_id, Ordering::SeqCst) != chain_id {
            self.emit(WalletEvent::ChainChanged(chain_id));
        }
        Ok(())
    }

    async fn add_chain(&self, network: &NetworkConfig) -> Result<()> {
        self.known_chains_mut().insert(network.chain_id);
        self.switch_chain(network.chain_id).await
    }

    fn subscribe(&self) -> BoxStream<'static, WalletEvent> {
        futures::stream::unfold(self.events.subscribe(), |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(event) => return Some((event, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "wallet event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}

fn parse_private_key(key: &str) -> Result<LocalWallet> {
    key.trim()
        .trim_start_matches("0x")
        .parse::<LocalWallet>()
        .map_err(|e| Error::InvalidPrivateKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
    // nothing listens here; tests below never reach the endpoint
    const RPC: &str = "http://127.0.0.1:9";

    #[tokio::test]
    async fn test_accounts() {
        let wallet = LocalWalletProvider::new(RPC, Some(KEY)).unwrap();
        let expected: Address = ADDRESS.parse().unwrap();
        assert!(wallet.is_available());
        assert_eq!(wallet.accounts().await.unwrap(), vec![expected]);
        assert_eq!(wallet.request_accounts().await.unwrap(), vec![expected]);
        assert!(wallet.signing_client().is_ok());
    }

    #[tokio::test]
    async fn test_without_key() {
        let wallet = LocalWalletProvider::new(RPC, None).unwrap();
        assert!(!wallet.is_available());
        assert!(wallet.accounts().await.unwrap().is_empty());
        assert!(matches!(
            wallet.request_accounts().await,
            Err(Error::WalletUnavailable)
        ));
        assert!(matches!(
            wallet.signing_client(),
            Err(Error::WalletNotConnected)
        ));
        assert!(matches!(
            LocalWalletProvider::new(RPC, Some("0x1234")),
            Err(Error::InvalidPrivateKey(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_chain() {
        let wallet = LocalWalletProvider::new(RPC, Some(KEY)).unwrap();
        assert!(matches!(
            wallet.switch_chain(8081).await,
            Err(Error::UnrecognizedChain(8081))
        ));

        let network = NetworkConfig::shardeum(RPC);
        let wallet = wallet.with_network(&network);
        assert_eq!(wallet.chain_id().await.unwrap(), 8081);
    }

    #[tokio::test]
    async fn test_replace_key_notifies() {
        let wallet = LocalWalletProvider::new(RPC, Some(KEY)).unwrap();
        let mut events = wallet.subscribe();
        wallet.replace_key(None).unwrap();
        assert_eq!(
            events.next().await,
            Some(WalletEvent::AccountsChanged(vec![]))
        );
        assert!(!wallet.is_available());
    }
}
