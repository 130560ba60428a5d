//! Presentation over task snapshots: badges, the lifecycle action, filters.
use std::fmt;
use std::str::FromStr;

use crate::contract::{BoardConnector, Receipt, TaskCall};
use crate::error::{Error, Result};
use crate::gateway::ContractGateway;
use crate::types::{format_shm, Address, AddressExt, Task, TaskId, TaskStatus, U256};

/// The one thing a viewer may do to a task, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskAction {
    Claim,
    SubmitWork,
    Approve,
}

impl TaskAction {
    pub fn label(&self) -> &'static str {
        match self {
            TaskAction::Claim => "Accept Task",
            TaskAction::SubmitWork => "Submit Work",
            TaskAction::Approve => "Approve & Pay",
        }
    }

    pub fn call(&self, task_id: TaskId) -> TaskCall {
        match self {
            TaskAction::Claim => TaskCall::Claim(task_id),
            TaskAction::SubmitWork => TaskCall::SubmitWork(task_id),
            TaskAction::Approve => TaskCall::Approve(task_id),
        }
    }
}

/// Total over every `(status, is_poster, is_worker, is_connected)` combination.
pub fn select_action(
    status: TaskStatus,
    is_poster: bool,
    is_worker: bool,
    is_connected: bool,
) -> Option<TaskAction> {
    if !is_connected {
        return None;
    }
    match status {
        TaskStatus::Open if !is_poster => Some(TaskAction::Claim),
        TaskStatus::Claimed if is_worker => Some(TaskAction::SubmitWork),
        TaskStatus::Completed if is_poster => Some(TaskAction::Approve),
        _ => None,
    }
}

pub fn status_badge(status: TaskStatus) -> &'static str {
    status.as_str()
}

/// One task as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCard {
    pub task: Task,
    pub action: Option<TaskAction>,
    /// set while the action's transaction is in flight
    pub loading: bool,
}

impl TaskCard {
    pub fn new(task: Task, viewer: Option<&Address>) -> Self {
        let action = match viewer {
            Some(account) => select_action(
                task.status,
                task.is_posted_by(account),
                task.is_claimed_by(account),
                true,
            ),
            None => None,
        };
        Self {
            task,
            action,
            loading: false,
        }
    }

    pub fn badge(&self) -> &'static str {
        status_badge(self.task.status)
    }

    pub fn reward(&self) -> String {
        format!("{} SHM", format_shm(self.task.reward))
    }

    pub fn poster(&self) -> String {
        self.task.poster.short()
    }

    /// Hidden until someone claimed the task.
    pub fn worker(&self) -> Option<String> {
        self.task.has_worker().then(|| self.task.worker.short())
    }

    pub fn created(&self) -> String {
        self.task
            .created_at()
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_owned())
    }

    /// Send the card's action and wait for it to be mined. The caller re-fetches afterwards.
    pub async fn perform<C: BoardConnector>(&mut self, gateway: &ContractGateway<C>) -> Result<Receipt> {
        let action = self.action.ok_or(Error::NoAction(self.task.id))?;
        self.loading = true;
        let result = gateway.execute(action.call(self.task.id)).await;
        self.loading = false;
        result
    }
}

impl fmt::Display for TaskCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#{} {} [{}]", self.task.id, self.task.title, self.badge())?;
        writeln!(f, "  {}", self.task.description)?;
        writeln!(f, "  Reward   {}", self.reward())?;
        writeln!(f, "  Poster   {}", self.poster())?;
        if let Some(worker) = self.worker() {
            writeln!(f, "  Worker   {}", worker)?;
        }
        write!(f, "  Created  {}", self.created())?;
        match (self.action, self.loading) {
            (Some(action), false) => write!(f, "\n  -> {}", action.label()),
            (Some(_), true) => write!(f, "\n  -> ..."),
            (None, _) => Ok(()),
        }
    }
}

/// Tab selection over a task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub const TABS: [StatusFilter; 5] = [
        StatusFilter::All,
        StatusFilter::Only(TaskStatus::Open),
        StatusFilter::Only(TaskStatus::Claimed),
        StatusFilter::Only(TaskStatus::Completed),
        StatusFilter::Only(TaskStatus::Approved),
    ];

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status == *status,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All Tasks",
            StatusFilter::Only(status) => status.as_str(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "open" => Ok(StatusFilter::Only(TaskStatus::Open)),
            "claimed" => Ok(StatusFilter::Only(TaskStatus::Claimed)),
            "completed" => Ok(StatusFilter::Only(TaskStatus::Completed)),
            "approved" => Ok(StatusFilter::Only(TaskStatus::Approved)),
            other => Err(format!("unknown status filter {:?}", other)),
        }
    }
}

pub fn filter_tasks(tasks: &[Task], filter: StatusFilter) -> Vec<&Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub all: usize,
    pub open: usize,
    pub claimed: usize,
    pub completed: usize,
    pub approved: usize,
}

impl TaskCounts {
    pub fn of<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut counts, task| {
            counts.all += 1;
            match task.status {
                TaskStatus::Open => counts.open += 1,
                TaskStatus::Claimed => counts.claimed += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Approved => counts.approved += 1,
            }
            counts
        })
    }

    pub fn get(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.all,
            StatusFilter::Only(TaskStatus::Open) => self.open,
            StatusFilter::Only(TaskStatus::Claimed) => self.claimed,
            StatusFilter::Only(TaskStatus::Completed) => self.completed,
            StatusFilter::Only(TaskStatus::Approved) => self.approved,
        }
    }
}

pub fn total_reward<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> U256 {
    tasks
        .into_iter()
        .fold(U256::zero(), |total, task| total.saturating_add(task.reward))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status: TaskStatus, poster: Address, worker: Address) -> Task {
        Task {
            id: U256::from(1u64),
            title: "Audit".to_owned(),
            description: "Audit the escrow contract".to_owned(),
            reward: U256::exp10(18),
            poster,
            worker,
            status,
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_select_action_table() {
        let bools = [false, true];
        for status in TaskStatus::ALL {
            for is_poster in bools {
                for is_worker in bools {
                    for is_connected in bools {
                        let got = select_action(status, is_poster, is_worker, is_connected);
                        let expected = match (status, is_connected) {
                            (_, false) => None,
                            (TaskStatus::Open, true) if !is_poster => Some(TaskAction::Claim),
                            (TaskStatus::Claimed, true) if is_worker => {
                                Some(TaskAction::SubmitWork)
                            }
                            (TaskStatus::Completed, true) if is_poster => Some(TaskAction::Approve),
                            _ => None,
                        };
                        assert_eq!(
                            got, expected,
                            "{:?} poster={} worker={} connected={}",
                            status, is_poster, is_worker, is_connected
                        );
                    }
                }
            }
        }
        assert_eq!(select_action(TaskStatus::Approved, true, true, true), None);
    }

    #[test]
    fn test_card_for_viewers() {
        let poster = Address::repeat_byte(1);
        let worker = Address::repeat_byte(2);
        let stranger = Address::repeat_byte(3);

        let open = task(TaskStatus::Open, poster, Address::zero());
        assert_eq!(TaskCard::new(open.clone(), None).action, None);
        assert_eq!(TaskCard::new(open.clone(), Some(&poster)).action, None);
        assert_eq!(
            TaskCard::new(open.clone(), Some(&stranger)).action,
            Some(TaskAction::Claim)
        );

        let claimed = task(TaskStatus::Claimed, poster, worker);
        assert_eq!(
            TaskCard::new(claimed.clone(), Some(&worker)).action,
            Some(TaskAction::SubmitWork)
        );
        assert_eq!(TaskCard::new(claimed.clone(), Some(&stranger)).action, None);
        assert_eq!(TaskCard::new(claimed, Some(&poster)).action, None);

        let completed = task(TaskStatus::Completed, poster, worker);
        assert_eq!(
            TaskCard::new(completed.clone(), Some(&poster)).action,
            Some(TaskAction::Approve)
        );
        assert_eq!(TaskCard::new(completed, Some(&worker)).action, None);
    }

    #[test]
    fn test_card_display() {
        let card = TaskCard::new(
            task(TaskStatus::Open, Address::repeat_byte(0x11), Address::zero()),
            Some(&Address::repeat_byte(0x22)),
        );
        assert_eq!(card.badge(), "Open");
        assert_eq!(card.reward(), "1.0 SHM");
        assert_eq!(card.worker(), None);
        assert_eq!(card.created(), "2023-11-14");
        let text = card.to_string();
        assert!(text.starts_with("#1 Audit [Open]"));
        assert!(text.ends_with("-> Accept Task"));
        assert!(!text.contains("Worker"));
    }

    #[test]
    fn test_filters_and_counts() {
        let a = Address::repeat_byte(1);
        let tasks = vec![
            task(TaskStatus::Open, a, Address::zero()),
            task(TaskStatus::Open, a, Address::zero()),
            task(TaskStatus::Claimed, a, a),
            task(TaskStatus::Approved, a, a),
        ];
        let counts = TaskCounts::of(&tasks);
        assert_eq!(
            counts,
            TaskCounts {
                all: 4,
                open: 2,
                claimed: 1,
                completed: 0,
                approved: 1
            }
        );
        for tab in StatusFilter::TABS {
            assert_eq!(filter_tasks(&tasks, tab).len(), counts.get(tab));
        }
        assert_eq!("Claimed".parse::<StatusFilter>().unwrap(), StatusFilter::Only(TaskStatus::Claimed));
        assert!("done".parse::<StatusFilter>().is_err());
        assert_eq!(total_reward(&tasks), U256::exp10(18) * 4u64);
    }
}
