use std::fmt;

use crate::connection::ConnectionState;
use crate::contract::BoardConnector;
use crate::error::Result;
use crate::gateway::ContractGateway;
use crate::types::{format_shm, Address, Task, TaskStatus, U256};
use crate::view::{total_reward, TaskCard, TaskCounts};

/// `/me`: the tasks the connected account posted and claimed.
#[derive(Debug, Clone, Default)]
pub struct DashboardPage {
    posted: Vec<Task>,
    claimed: Vec<Task>,
    loading: bool,
    loaded_for: Option<(Address, u64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub posted: TaskCounts,
    pub claimed: TaskCounts,
    pub total_rewards_posted: U256,
    /// rewards of claimed tasks that were approved and paid out
    pub total_earned: U256,
}

impl fmt::Display for DashboardStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Tasks Posted          {} ({} completed)",
            self.posted.all, self.posted.approved
        )?;
        writeln!(
            f,
            "Tasks Claimed         {} ({} completed)",
            self.claimed.all, self.claimed.approved
        )?;
        writeln!(f, "Total Rewards Posted  {} SHM", format_shm(self.total_rewards_posted))?;
        write!(f, "Total Earned          {} SHM", format_shm(self.total_earned))
    }
}

impl DashboardPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posted(&self) -> &[Task] {
        &self.posted
    }

    pub fn claimed(&self) -> &[Task] {
        &self.claimed
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The account or the chain moved since the last load.
    pub fn needs_reload(&self, state: &ConnectionState) -> bool {
        state.account.map(|account| (account, state.epoch)) != self.loaded_for
    }

    /// Fetch for the connected account, or clear when there is none.
    pub async fn load<C: BoardConnector>(&mut self, gateway: &ContractGateway<C>) -> Result<()> {
        let state = gateway.connection().state();
        let account = match state.account {
            Some(account) => account,
            None => {
                *self = Self::default();
                return Ok(());
            }
        };

        self.loading = true;
        let result = gateway.user_tasks(account).await;
        self.loading = false;

        let tasks = result?;
        self.posted = tasks.posted;
        self.claimed = tasks.claimed;
        self.loaded_for = Some((account, state.epoch));
        Ok(())
    }

    /// Reload if the account or the chain moved. Returns whether it did.
    pub async fn sync<C: BoardConnector>(&mut self, gateway: &ContractGateway<C>) -> Result<bool> {
        if !self.needs_reload(&gateway.connection().state()) {
            return Ok(false);
        }
        self.load(gateway).await?;
        Ok(true)
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats {
            posted: TaskCounts::of(&self.posted),
            claimed: TaskCounts::of(&self.claimed),
            total_rewards_posted: total_reward(&self.posted),
            total_earned: total_reward(
                self.claimed
                    .iter()
                    .filter(|t| t.status == TaskStatus::Approved),
            ),
        }
    }

    pub fn posted_cards(&self, viewer: Option<&Address>) -> Vec<TaskCard> {
        self.posted.iter().map(|t| TaskCard::new(t.clone(), viewer)).collect()
    }

    pub fn claimed_cards(&self, viewer: Option<&Address>) -> Vec<TaskCard> {
        self.claimed.iter().map(|t| TaskCard::new(t.clone(), viewer)).collect()
    }
}
