use ethers::types::{TxHash, U256};

use crate::types::AmountError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Contract address not configured")]
    MissingContractAddress,
    #[error("invalid address {0:?}")]
    InvalidAddress(String),
    #[error("invalid rpc url {0:?}")]
    InvalidRpcUrl(String),
    #[error("No wallet found. Please install or configure a wallet to continue.")]
    WalletUnavailable,
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
    #[error("Wallet not connected")]
    WalletNotConnected,
    #[error("No accounts found")]
    NoAccounts,
    #[error("network {0:#x} is not known to the wallet")]
    UnrecognizedChain(u64),
    #[error("rpc endpoint serves chain {actual:#x}, expected {expected:#x}")]
    ChainMismatch { expected: u64, actual: u64 },
    #[error("{0}")]
    Rejected(String),
    #[error("transaction {0:?} reverted")]
    Reverted(TxHash),
    #[error("transaction {0:?} was dropped before confirmation")]
    Dropped(TxHash),
    #[error("rpc request failed: {0}")]
    Rpc(String),
    #[error("invalid task status {0}")]
    InvalidStatus(u8),
    #[error("{0} out of range")]
    OutOfRange(&'static str),
    #[error("nothing to do on task {0} for this account")]
    NoAction(U256),
    #[error("\"{action}\" is not available on task {task_id} for this account")]
    ActionUnavailable { action: &'static str, task_id: U256 },
    #[error("task {0} not found")]
    TaskNotFound(U256),
    #[error("reward must be greater than zero")]
    ZeroReward,
    #[error(transparent)]
    Amount(#[from] AmountError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
