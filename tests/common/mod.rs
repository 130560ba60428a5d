//! In-memory board and wallet shared by the integration scenarios.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::broadcast;

use opentask_client::app::App;
use opentask_client::config::{Config, NetworkConfig};
use opentask_client::connection::{ConnectionHandle, ConnectionState};
use opentask_client::contract::{BoardConnector, Receipt, TaskBoardRead, TaskBoardWrite, TaskCall};
use opentask_client::error::{Error, Result};
use opentask_client::notify::NotificationLog;
use opentask_client::types::{Address, Task, TaskStatus, TxHash, UserTasks, U256};
use opentask_client::wallet::{WalletEvent, WalletProvider};

pub const CHAIN_ID: u64 = 8081;

pub fn contract() -> Address {
    Address::repeat_byte(0xc0)
}

#[derive(Default)]
struct ChainState {
    tasks: Vec<Task>,
    pending: HashMap<TxHash, (Address, TaskCall)>,
    next_tx: u64,
    block: u64,
    reject_next: Option<String>,
    reads_down: bool,
}

impl ChainState {
    /// Same checks the deployed contract makes when the transaction is mined.
    fn execute(&mut self, sender: Address, call: TaskCall) -> std::result::Result<(), &'static str> {
        if let TaskCall::Create {
            title,
            description,
            reward,
        } = call
        {
            if reward.is_zero() {
                return Err("Reward must be greater than 0");
            }
            self.tasks.push(Task {
                id: U256::from(self.tasks.len()),
                title,
                description,
                reward,
                poster: sender,
                worker: Address::zero(),
                status: TaskStatus::Open,
                created_at: 1_700_000_000 + self.block,
            });
            return Ok(());
        }

        let id = call.task_id().ok_or("missing task id")?;
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or("Task does not exist")?;
        match call {
            TaskCall::Claim(_) => {
                if task.status != TaskStatus::Open {
                    return Err("Task is not open");
                }
                if task.poster == sender {
                    return Err("Cannot claim your own task");
                }
                task.worker = sender;
                task.status = TaskStatus::Claimed;
            }
            TaskCall::SubmitWork(_) => {
                if task.status != TaskStatus::Claimed || task.worker != sender {
                    return Err("Only the worker can submit");
                }
                task.status = TaskStatus::Completed;
            }
            TaskCall::Approve(_) => {
                if task.status != TaskStatus::Completed || task.poster != sender {
                    return Err("Only the poster can approve");
                }
                task.status = TaskStatus::Approved;
            }
            TaskCall::Create { .. } => unreachable!(),
        }
        Ok(())
    }
}

/// A task board contract living in memory. Transactions are mined on
/// `confirm`, and both halves of a write yield so concurrent senders interleave.
#[derive(Clone, Default)]
pub struct MemoryChain {
    state: Arc<Mutex<ChainState>>,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().unwrap().tasks.clone()
    }

    /// The next `send` is refused as if the user dismissed the wallet prompt.
    pub fn reject_next(&self, reason: &str) {
        self.state.lock().unwrap().reject_next = Some(reason.to_owned());
    }

    pub fn set_reads_down(&self, down: bool) {
        self.state.lock().unwrap().reads_down = down;
    }

    fn board(&self, sender: Option<Address>) -> MemoryBoard {
        MemoryBoard {
            chain: self.clone(),
            sender,
        }
    }
}

impl BoardConnector for MemoryChain {
    type Reader = MemoryBoard;
    type Writer = MemoryBoard;

    fn read_only(&self, _contract: Address) -> Result<MemoryBoard> {
        Ok(self.board(None))
    }

    fn signing(&self, account: Address, _contract: Address) -> Result<MemoryBoard> {
        Ok(self.board(Some(account)))
    }
}

pub struct MemoryBoard {
    chain: MemoryChain,
    sender: Option<Address>,
}

#[async_trait]
impl TaskBoardRead for MemoryBoard {
    async fn all_tasks(&self) -> Result<Vec<Task>> {
        let state = self.chain.state.lock().unwrap();
        if state.reads_down {
            return Err(Error::Rpc("connection refused".to_owned()));
        }
        Ok(state.tasks.clone())
    }

    async fn user_tasks(&self, user: Address) -> Result<UserTasks> {
        let state = self.chain.state.lock().unwrap();
        if state.reads_down {
            return Err(Error::Rpc("connection refused".to_owned()));
        }
        Ok(UserTasks {
            posted: state.tasks.iter().filter(|t| t.poster == user).cloned().collect(),
            claimed: state.tasks.iter().filter(|t| t.worker == user).cloned().collect(),
        })
    }
}

#[async_trait]
impl TaskBoardWrite for MemoryBoard {
    async fn send(&self, call: &TaskCall) -> Result<TxHash> {
        let sender = self.sender.ok_or(Error::WalletNotConnected)?;
        let tx_hash = {
            let mut state = self.chain.state.lock().unwrap();
            if let Some(reason) = state.reject_next.take() {
                return Err(Error::Rejected(reason));
            }
            state.next_tx += 1;
            let tx_hash = TxHash::from_low_u64_be(state.next_tx);
            state.pending.insert(tx_hash, (sender, call.clone()));
            tx_hash
        };
        // other senders get to reach the mempool before anything is mined
        tokio::task::yield_now().await;
        Ok(tx_hash)
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<Receipt> {
        tokio::task::yield_now().await;
        let mut state = self.chain.state.lock().unwrap();
        let (sender, call) = state.pending.remove(&tx_hash).ok_or(Error::Dropped(tx_hash))?;
        state.block += 1;
        state.execute(sender, call).map_err(|_| Error::Reverted(tx_hash))?;
        Ok(Receipt {
            tx_hash,
            block_number: Some(state.block),
        })
    }
}

/// A wallet whose selected account and chain the test drives.
pub struct TestWallet {
    account: Mutex<Option<Address>>,
    chain_id: Mutex<u64>,
    events: broadcast::Sender<WalletEvent>,
}

impl TestWallet {
    pub fn new(account: Option<Address>) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            account: Mutex::new(account),
            chain_id: Mutex::new(CHAIN_ID),
            events,
        })
    }

    pub fn select(&self, account: Option<Address>) {
        *self.account.lock().unwrap() = account;
        let _ = self
            .events
            .send(WalletEvent::AccountsChanged(account.into_iter().collect()));
    }

    pub fn change_chain(&self, chain_id: u64) {
        *self.chain_id.lock().unwrap() = chain_id;
        let _ = self.events.send(WalletEvent::ChainChanged(chain_id));
    }
}

#[async_trait]
impl WalletProvider for TestWallet {
    fn is_available(&self) -> bool {
        true
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        let account = *self.account.lock().unwrap();
        account.map(|a| vec![a]).ok_or(Error::NoAccounts)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.account.lock().unwrap().iter().copied().collect())
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(*self.chain_id.lock().unwrap())
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        *self.chain_id.lock().unwrap() = chain_id;
        Ok(())
    }

    async fn add_chain(&self, network: &NetworkConfig) -> Result<()> {
        self.switch_chain(network.chain_id).await
    }

    fn subscribe(&self) -> BoxStream<'static, WalletEvent> {
        futures::stream::unfold(self.events.subscribe(), |mut rx| async move {
            rx.recv().await.ok().map(|event| (event, rx))
        })
        .boxed()
    }
}

pub type TestApp = App<MemoryChain, TestWallet>;

/// One user's view of the shared chain.
pub async fn user(chain: &MemoryChain, account: Option<Address>) -> (TestApp, Arc<TestWallet>, NotificationLog) {
    let wallet = TestWallet::new(account);
    let log = NotificationLog::new();
    let config = Config::new("http://127.0.0.1:9", Some(contract()));
    let mut app = App::new(config, wallet.clone(), chain.clone(), Arc::new(log.clone()));
    app.mount().await;
    (app, wallet, log)
}

/// Wait until the published connection state satisfies `done`.
pub async fn settle<F>(handle: &mut ConnectionHandle, done: F) -> ConnectionState
where
    F: Fn(&ConnectionState) -> bool,
{
    let wait = async {
        loop {
            let state = handle.state();
            if done(&state) {
                return state;
            }
            assert!(handle.changed().await, "connection manager dropped");
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .expect("connection state did not settle")
}
