use crate::connection::ConnectionState;
use crate::contract::{BoardConnector, Receipt};
use crate::error::{Error, Result};
use crate::gateway::ContractGateway;
use crate::types::{Address, Task, TaskId};
use crate::view::{filter_tasks, StatusFilter, TaskCard, TaskCounts};

/// `/tasks`: every task on the board, split into status tabs.
#[derive(Debug, Clone, Default)]
pub struct BrowsePage {
    tasks: Vec<Task>,
    loading: bool,
    tab: StatusFilter,
    /// connection epoch the current tasks were fetched under
    epoch: Option<u64>,
}

impl BrowsePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn tab(&self) -> StatusFilter {
        self.tab
    }

    pub fn select_tab(&mut self, tab: StatusFilter) {
        self.tab = tab;
    }

    /// Re-fetch the whole list. On failure the previous tasks stay in place.
    pub async fn load<C: BoardConnector>(&mut self, gateway: &ContractGateway<C>) -> Result<()> {
        let epoch = gateway.connection().state().epoch;
        self.loading = true;
        let result = gateway.all_tasks().await;
        self.loading = false;

        self.tasks = result?;
        self.epoch = Some(epoch);
        tracing::debug!(count = self.tasks.len(), epoch, "tasks loaded");
        Ok(())
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts::of(&self.tasks)
    }

    /// Cards of the selected tab, as `viewer` sees them.
    pub fn cards(&self, viewer: Option<&Address>) -> Vec<TaskCard> {
        filter_tasks(&self.tasks, self.tab)
            .into_iter()
            .map(|task| TaskCard::new(task.clone(), viewer))
            .collect()
    }

    /// The card of one loaded task, whatever the selected tab.
    pub fn card(&self, task_id: TaskId, viewer: Option<&Address>) -> Result<TaskCard> {
        self.tasks
            .iter()
            .find(|t| t.id == task_id)
            .map(|task| TaskCard::new(task.clone(), viewer))
            .ok_or(Error::TaskNotFound(task_id))
    }

    /// Run the connected account's action on `task_id`, then re-fetch.
    pub async fn perform<C: BoardConnector>(
        &mut self,
        gateway: &ContractGateway<C>,
        task_id: TaskId,
    ) -> Result<Receipt> {
        let account = gateway.connection().account();
        let mut card = self.card(task_id, account.as_ref())?;
        let receipt = card.perform(gateway).await?;

        if let Err(e) = self.load(gateway).await {
            tracing::warn!(error = %e, "reload after action failed");
        }
        Ok(receipt)
    }

    /// Never loaded, or loaded before the last chain change.
    pub fn is_stale(&self, state: &ConnectionState) -> bool {
        self.epoch != Some(state.epoch)
    }

    /// Reload if the chain moved since the last load. Returns whether it did.
    pub async fn sync<C: BoardConnector>(&mut self, gateway: &ContractGateway<C>) -> Result<bool> {
        if !self.is_stale(&gateway.connection().state()) {
            return Ok(false);
        }
        self.load(gateway).await?;
        Ok(true)
    }
}
