//! Task creation form. Advisory only: failures never reach the gateway.
use std::ops::RangeInclusive;

use crate::types::{parse_shm, AmountError, U256};

pub const TITLE_LEN: RangeInclusive<usize> = 4..=120;
pub const DESCRIPTION_LEN: RangeInclusive<usize> = 10..=2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Reward,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    /// SHM as typed by the user
    pub reward: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub title: Option<String>,
    pub description: Option<String>,
    pub reward: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.reward.is_none()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn clear(&mut self, field: Field) {
        *self.slot_mut(field) = None;
    }

    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::Reward => &self.reward,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Reward => &mut self.reward,
        }
    }
}

/// A form that passed validation, trimmed and with the reward in wei.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    pub title: String,
    pub description: String,
    pub reward: U256,
}

/// `count/max`, flagged when over the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCount {
    pub count: usize,
    pub max: usize,
}

impl CharCount {
    pub fn is_over_limit(&self) -> bool {
        self.count > self.max
    }
}

impl std::fmt::Display for CharCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.count, self.max)
    }
}

impl TaskForm {
    pub fn new(title: impl Into<String>, description: impl Into<String>, reward: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            reward: reward.into(),
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Title => self.title = value,
            Field::Description => self.description = value,
            Field::Reward => self.reward = value,
        }
    }

    pub fn char_count(&self, field: Field) -> Option<CharCount> {
        match field {
            Field::Title => Some(CharCount {
                count: self.title.chars().count(),
                max: *TITLE_LEN.end(),
            }),
            Field::Description => Some(CharCount {
                count: self.description.chars().count(),
                max: *DESCRIPTION_LEN.end(),
            }),
            Field::Reward => None,
        }
    }

    pub fn validate(&self) -> Result<ValidTask, FormErrors> {
        let title = check_text("Title", &self.title, TITLE_LEN);
        let description = check_text("Description", &self.description, DESCRIPTION_LEN);
        let reward = check_reward(&self.reward);

        match (title, description, reward) {
            (Ok(title), Ok(description), Ok(reward)) => Ok(ValidTask {
                title: title.to_owned(),
                description: description.to_owned(),
                reward,
            }),
            (title, description, reward) => Err(FormErrors {
                title: title.err(),
                description: description.err(),
                reward: reward.err(),
            }),
        }
    }
}

fn check_text<'a>(name: &str, value: &'a str, len: RangeInclusive<usize>) -> Result<&'a str, String> {
    let trimmed = value.trim();
    let count = trimmed.chars().count();
    if count == 0 {
        Err(format!("{} is required", name))
    } else if count < *len.start() {
        Err(format!("{} must be at least {} characters", name, len.start()))
    } else if count > *len.end() {
        Err(format!("{} must be less than {} characters", name, len.end()))
    } else {
        Ok(trimmed)
    }
}

fn check_reward(value: &str) -> Result<U256, String> {
    if value.trim().is_empty() {
        return Err("Reward amount is required".to_owned());
    }
    let positive = || "Reward must be greater than 0".to_owned();
    match parse_shm(value) {
        Ok(wei) if wei.is_zero() => Err(positive()),
        Ok(wei) => Ok(wei),
        Err(AmountError::Malformed(_)) | Err(AmountError::Negative) => Err(positive()),
        Err(AmountError::TooPrecise(places)) => {
            Err(format!("Reward supports at most {} decimal places", places))
        }
        Err(e @ AmountError::Overflow) => Err(e.to_string()),
    }
}
