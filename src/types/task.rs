use std::convert::TryFrom;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Address, U256};
use crate::error::Error;
use crate::serde::U256Dec;

/// Assigned by the contract at creation.
pub type TaskId = U256;

/// Lifecycle of a task, strictly `Open -> Claimed -> Completed -> Approved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    Claimed,
    Completed,
    Approved,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Open,
        TaskStatus::Claimed,
        TaskStatus::Completed,
        TaskStatus::Approved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "Open",
            TaskStatus::Claimed => "Claimed",
            TaskStatus::Completed => "Completed",
            TaskStatus::Approved => "Approved",
        }
    }

    /// The only status this one may move to, `None` once approved.
    pub fn next(&self) -> Option<TaskStatus> {
        match self {
            TaskStatus::Open => Some(TaskStatus::Claimed),
            TaskStatus::Claimed => Some(TaskStatus::Completed),
            TaskStatus::Completed => Some(TaskStatus::Approved),
            TaskStatus::Approved => None,
        }
    }
}

impl TryFrom<u8> for TaskStatus {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TaskStatus::Open),
            1 => Ok(TaskStatus::Claimed),
            2 => Ok(TaskStatus::Completed),
            3 => Ok(TaskStatus::Approved),
            other => Err(Error::InvalidStatus(other)),
        }
    }
}

impl From<TaskStatus> for u8 {
    fn from(status: TaskStatus) -> u8 {
        status as u8
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot of one task as returned by the contract. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(with = "U256Dec")]
    pub id: TaskId,
    pub title: String,
    pub description: String,
    #[serde(with = "U256Dec")]
    pub reward: U256,
    pub poster: Address,
    /// zero address until claimed
    pub worker: Address,
    pub status: TaskStatus,
    /// unix seconds
    pub created_at: u64,
}

impl Task {
    pub fn is_posted_by(&self, account: &Address) -> bool {
        self.poster == *account
    }

    pub fn is_claimed_by(&self, account: &Address) -> bool {
        self.has_worker() && self.worker == *account
    }

    pub fn has_worker(&self) -> bool {
        !self.worker.is_zero()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.created_at)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Tasks of one account partitioned by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTasks {
    pub posted: Vec<Task>,
    pub claimed: Vec<Task>,
}
