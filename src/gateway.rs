//! Every contract read and write, behind one call/confirm/notify sequence.
use std::sync::Arc;

use crate::connection::ConnectionHandle;
use crate::contract::{BoardConnector, Receipt, TaskBoardRead, TaskBoardWrite, TaskCall};
use crate::error::{Error, Result};
use crate::notify::{Notification, Notifier};
use crate::types::{Address, Task, TaskId, UserTasks, U256};

struct Messages {
    pending: &'static str,
    confirmed: (&'static str, &'static str),
    fallback: &'static str,
}

fn messages(call: &TaskCall) -> Messages {
    match call {
        TaskCall::Create { .. } => Messages {
            pending: "Creating Task",
            confirmed: ("Task Created", "Your task has been created successfully!"),
            fallback: "Failed to create task.",
        },
        TaskCall::Claim(_) => Messages {
            pending: "Claiming Task",
            confirmed: ("Task Claimed", "You have successfully claimed this task!"),
            fallback: "Failed to claim task.",
        },
        TaskCall::SubmitWork(_) => Messages {
            pending: "Submitting Work",
            confirmed: ("Work Submitted", "Your work has been submitted for review!"),
            fallback: "Failed to submit work.",
        },
        TaskCall::Approve(_) => Messages {
            pending: "Approving Task",
            confirmed: ("Task Approved", "Payment has been released to the worker!"),
            fallback: "Failed to approve task.",
        },
    }
}

pub struct ContractGateway<C> {
    connector: C,
    contract: Option<Address>,
    connection: ConnectionHandle,
    notifier: Arc<dyn Notifier>,
}

impl<C: BoardConnector> ContractGateway<C> {
    pub fn new(
        connector: C,
        contract: Option<Address>,
        connection: ConnectionHandle,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            connector,
            contract,
            connection,
            notifier,
        }
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    fn contract(&self) -> Result<Address> {
        self.contract.ok_or(Error::MissingContractAddress)
    }

    /// Built fresh for every call, no wallet needed.
    fn reader(&self) -> Result<C::Reader> {
        self.connector.read_only(self.contract()?)
    }

    fn writer(&self) -> Result<C::Writer> {
        let contract = self.contract()?;
        let account = self.connection.account().ok_or(Error::WalletNotConnected)?;
        self.connector.signing(account, contract)
    }

    pub async fn create_task(&self, title: &str, description: &str, reward: U256) -> Result<Receipt> {
        self.execute(TaskCall::Create {
            title: title.to_owned(),
            description: description.to_owned(),
            reward,
        })
        .await
    }

    pub async fn claim_task(&self, task_id: TaskId) -> Result<Receipt> {
        self.execute(TaskCall::Claim(task_id)).await
    }

    pub async fn submit_work(&self, task_id: TaskId) -> Result<Receipt> {
        self.execute(TaskCall::SubmitWork(task_id)).await
    }

    pub async fn approve_task(&self, task_id: TaskId) -> Result<Receipt> {
        self.execute(TaskCall::Approve(task_id)).await
    }

    /// Runs `call` through awaiting-wallet, submitted and confirmed (or failed)
    /// notifications. Resolves only after the transaction is mined.
    pub async fn execute(&self, call: TaskCall) -> Result<Receipt> {
        let messages = messages(&call);
        match self.send_and_confirm(&call, &messages).await {
            Ok(receipt) => {
                tracing::info!(method = call.method(), tx = ?receipt.tx_hash, "transaction confirmed");
                let (title, description) = messages.confirmed;
                self.notifier.notify(Notification::info(title, description));
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!(method = call.method(), error = %e, "transaction failed");
                let mut description = e.to_string();
                if description.is_empty() {
                    description = messages.fallback.to_owned();
                }
                self.notifier
                    .notify(Notification::error("Transaction Failed", description));
                Err(e)
            }
        }
    }

    async fn send_and_confirm(&self, call: &TaskCall, messages: &Messages) -> Result<Receipt> {
        if let TaskCall::Create { reward, .. } = call {
            if reward.is_zero() {
                return Err(Error::ZeroReward);
            }
        }
        let board = self.writer()?;

        self.notifier.notify(Notification::info(
            messages.pending,
            "Please confirm the transaction in your wallet.",
        ));
        let tx_hash = board.send(call).await?;
        tracing::debug!(method = call.method(), tx = ?tx_hash, "transaction submitted");

        self.notifier.notify(Notification::info(
            "Transaction Submitted",
            "Waiting for confirmation...",
        ));
        board.confirm(tx_hash).await
    }

    pub async fn all_tasks(&self) -> Result<Vec<Task>> {
        let result = match self.reader() {
            Ok(board) => board.all_tasks().await,
            Err(e) => Err(e),
        };
        self.surface(result, "Failed to fetch tasks")
    }

    pub async fn user_tasks(&self, user: Address) -> Result<UserTasks> {
        let result = match self.reader() {
            Ok(board) => board.user_tasks(user).await,
            Err(e) => Err(e),
        };
        self.surface(result, "Failed to fetch user tasks")
    }

    fn surface<T>(&self, result: Result<T>, what: &'static str) -> Result<T> {
        if let Err(e) = &result {
            tracing::error!(error = %e, "{}", what);
            self.notifier.notify(Notification::error(what, e.to_string()));
        }
        result
    }
}
