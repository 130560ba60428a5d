//! OpenTask contract binding and the read/write seams the gateway calls through.
use std::convert::TryFrom;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::{Detokenize, Tokenizable};
use ethers::contract::{ContractCall, ContractError};
use ethers::providers::{Http, Middleware, PendingTransaction, Provider};
use ethers::types::U64;

use crate::error::{Error, Result};
use crate::types::{Address, Task, TaskId, TaskStatus, TxHash, UserTasks, U256};
use crate::wallet::{LocalWalletProvider, SigningClient};

pub mod bindings {
    use ethers::contract::abigen;

    // Task tuple order is fixed by the deployed contract.
    abigen!(
        OpenTask,
        r#"[
            struct Task { uint256 id; string title; string description; uint256 reward; address poster; address worker; uint8 status; uint256 createdAt; }
            function createTask(string title, string description) external payable returns (uint256)
            function claimTask(uint256 taskId) external
            function submitWork(uint256 taskId) external
            function approveTask(uint256 taskId) external
            function getAllTasks() external view returns (Task[])
            function getUserTasks(address user) external view returns (Task[], Task[])
        ]"#
    );
}

/// A task as the contract returns it, fields in storage order:
/// `(id, title, description, reward, poster, worker, status, createdAt)`.
pub type RawTask = (U256, String, String, U256, Address, Address, u8, U256);

impl TryFrom<RawTask> for Task {
    type Error = Error;

    fn try_from(raw: RawTask) -> Result<Self> {
        let (id, title, description, reward, poster, worker, status, created_at) = raw;
        if created_at > U256::from(u64::MAX) {
            return Err(Error::OutOfRange("createdAt"));
        }
        Ok(Task {
            id,
            title,
            description,
            reward,
            poster,
            worker,
            status: TaskStatus::try_from(status)?,
            created_at: created_at.as_u64(),
        })
    }
}

/// Decodes whatever the binding hands back for `Task[]`. Outputs travel as
/// tuple tokens, so anything tokenizing to the same shape is accepted.
fn decode_tasks<T: Tokenizable>(raw: Vec<T>) -> Result<Vec<Task>> {
    raw.into_iter()
        .map(|item| {
            let raw = RawTask::from_token(item.into_token())
                .map_err(|e| Error::Rpc(format!("malformed task: {}", e)))?;
            Task::try_from(raw)
        })
        .collect()
}

/// A state-changing contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCall {
    /// `reward` is attached as the transaction value and held in escrow.
    Create {
        title: String,
        description: String,
        reward: U256,
    },
    Claim(TaskId),
    SubmitWork(TaskId),
    Approve(TaskId),
}

impl TaskCall {
    pub fn method(&self) -> &'static str {
        match self {
            TaskCall::Create { .. } => "createTask",
            TaskCall::Claim(_) => "claimTask",
            TaskCall::SubmitWork(_) => "submitWork",
            TaskCall::Approve(_) => "approveTask",
        }
    }

    pub fn task_id(&self) -> Option<TaskId> {
        match self {
            TaskCall::Create { .. } => None,
            TaskCall::Claim(id) | TaskCall::SubmitWork(id) | TaskCall::Approve(id) => Some(*id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

#[async_trait]
pub trait TaskBoardRead: Send + Sync {
    /// Every task, in contract storage order.
    async fn all_tasks(&self) -> Result<Vec<Task>>;

    async fn user_tasks(&self, user: Address) -> Result<UserTasks>;
}

#[async_trait]
pub trait TaskBoardWrite: Send + Sync {
    /// Resolves once the wallet signed and the node accepted the transaction.
    async fn send(&self, call: &TaskCall) -> Result<TxHash>;

    /// Suspends until the transaction is mined. A revert is an error.
    async fn confirm(&self, tx_hash: TxHash) -> Result<Receipt>;
}

/// Builds the two call modes: read-only over the public rpc endpoint, and
/// signing through the connected wallet.
pub trait BoardConnector: Send + Sync {
    type Reader: TaskBoardRead;
    type Writer: TaskBoardWrite;

    fn read_only(&self, contract: Address) -> Result<Self::Reader>;

    fn signing(&self, account: Address, contract: Address) -> Result<Self::Writer>;
}

/// The contract reached through an ethers middleware stack.
pub struct EthersBoard<M> {
    contract: bindings::OpenTask<M>,
    client: Arc<M>,
}

impl<M: Middleware + 'static> EthersBoard<M> {
    pub fn new(contract: Address, client: Arc<M>) -> Self {
        Self {
            contract: bindings::OpenTask::new(contract, client.clone()),
            client,
        }
    }
}

fn read_error<M: Middleware>(err: ContractError<M>) -> Error {
    Error::Rpc(err.to_string())
}

fn send_error<M: Middleware>(err: ContractError<M>) -> Error {
    Error::Rejected(err.to_string())
}

#[async_trait]
impl<M: Middleware + 'static> TaskBoardRead for EthersBoard<M> {
    async fn all_tasks(&self) -> Result<Vec<Task>> {
        tracing::debug!(contract = ?self.contract.address(), "getAllTasks");
        let raw = self
            .contract
            .get_all_tasks()
            .call()
            .await
            .map_err(read_error)?;
        decode_tasks(raw)
    }

    async fn user_tasks(&self, user: Address) -> Result<UserTasks> {
        tracing::debug!(contract = ?self.contract.address(), ?user, "getUserTasks");
        let (posted, claimed) = self
            .contract
            .get_user_tasks(user)
            .call()
            .await
            .map_err(read_error)?;
        Ok(UserTasks {
            posted: decode_tasks(posted)?,
            claimed: decode_tasks(claimed)?,
        })
    }
}

#[async_trait]
impl<M: Middleware + 'static> TaskBoardWrite for EthersBoard<M> {
    async fn send(&self, call: &TaskCall) -> Result<TxHash> {
        tracing::debug!(contract = ?self.contract.address(), method = call.method(), "sending");
        match call {
            TaskCall::Create {
                title,
                description,
                reward,
            } => {
                let tx = self
                    .contract
                    .create_task(title.clone(), description.clone())
                    .value(*reward);
                dispatch(tx).await
            }
            TaskCall::Claim(id) => dispatch(self.contract.claim_task(*id)).await,
            TaskCall::SubmitWork(id) => dispatch(self.contract.submit_work(*id)).await,
            TaskCall::Approve(id) => dispatch(self.contract.approve_task(*id)).await,
        }
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<Receipt> {
        let receipt = PendingTransaction::new(tx_hash, self.client.provider())
            .await
            .map_err(|e| Error::Rpc(e.to_string()))?
            .ok_or(Error::Dropped(tx_hash))?;
        if receipt.status != Some(U64::from(1u64)) {
            return Err(Error::Reverted(tx_hash));
        }
        Ok(Receipt {
            tx_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
        })
    }
}

async fn dispatch<M, D>(tx: ContractCall<M, D>) -> Result<TxHash>
where
    M: Middleware + 'static,
    D: Detokenize + Send + Sync,
{
    let pending = tx.send().await.map_err(send_error)?;
    Ok(pending.tx_hash())
}

/// Connector backed by ethers: an http provider for reads, the local wallet for writes.
pub struct EthersConnector {
    rpc_url: String,
    wallet: Arc<LocalWalletProvider>,
}

impl EthersConnector {
    pub fn new(rpc_url: impl Into<String>, wallet: Arc<LocalWalletProvider>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            wallet,
        }
    }
}

impl BoardConnector for EthersConnector {
    type Reader = EthersBoard<Provider<Http>>;
    type Writer = EthersBoard<SigningClient>;

    fn read_only(&self, contract: Address) -> Result<Self::Reader> {
        let provider = Provider::<Http>::try_from(self.rpc_url.as_str())
            .map_err(|_| Error::InvalidRpcUrl(self.rpc_url.clone()))?;
        Ok(EthersBoard::new(contract, Arc::new(provider)))
    }

    fn signing(&self, account: Address, contract: Address) -> Result<Self::Writer> {
        // the wallet may have moved on to another key since the state was published
        if self.wallet.account() != Some(account) {
            return Err(Error::WalletNotConnected);
        }
        Ok(EthersBoard::new(contract, self.wallet.signing_client()?))
    }
}
