use std::fmt::Display;

use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

use crate::utils::{
    progress::Progress,
    time::{local_day_key, week_window_start, DAYS_IN_WEEK},
};

pub const PLACEHOLDER_NAME: &str = "Unnamed habit";

/// A tracked recurring activity with a weekly completion target.
///
/// The habit owns its completion history and all window arithmetic. Status and progress are always
/// recomputed from the history, there is no stored status field to drift out of sync.
#[derive(Debug, Clone, PartialEq)]
pub struct Habit {
    id: String,
    name: String,
    target_frequency: u32,
    completions: Vec<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// Two-state classification derived from the completion history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitStatus {
    Active,
    Done,
}

impl Display for HabitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HabitStatus::Active => write!(f, "Active"),
            HabitStatus::Done => write!(f, "Done"),
        }
    }
}

/// Blank-after-trim names become a placeholder.
pub(crate) fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Target must be a positive completions-per-week count; anything else falls back to daily.
pub(crate) fn normalize_frequency(raw: Option<i64>) -> u32 {
    match raw {
        Some(v) if v >= 1 => u32::try_from(v).unwrap_or(DAYS_IN_WEEK as u32),
        _ => DAYS_IN_WEEK as u32,
    }
}

impl Habit {
    pub fn new(name: &str, frequency: Option<i64>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: normalize_name(name),
            target_frequency: normalize_frequency(frequency),
            completions: Vec::new(),
            created_at: now,
        }
    }

    /// Rehydrates a habit from already-normalized persisted fields.
    pub(crate) fn from_parts(
        id: String,
        name: String,
        target_frequency: u32,
        completions: Vec<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            target_frequency,
            completions,
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_frequency(&self) -> u32 {
        self.target_frequency
    }

    pub fn completions(&self) -> &[DateTime<Utc>] {
        &self.completions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Records a completion at `now` unless one already exists for today's local calendar date.
    /// Returns whether a new entry was appended, so calling twice on the same day is a no-op.
    pub fn mark_complete(&mut self, now: DateTime<Utc>) -> bool {
        let today = local_day_key(now);
        let already_done = self
            .completions
            .iter()
            .any(|completion| local_day_key(*completion) == today);
        if already_done {
            return false;
        }
        self.completions.push(now);
        true
    }

    /// Completions inside the rolling 7-day window `[local midnight six days ago, now]`, both ends
    /// inclusive.
    pub fn this_week_completions(&self, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let start = week_window_start(now.with_timezone(&Local)).with_timezone(&Utc);
        self.completions
            .iter()
            .copied()
            .filter(|completion| *completion >= start && *completion <= now)
            .collect()
    }

    pub fn is_completed_this_week(&self, now: DateTime<Utc>) -> bool {
        self.this_week_completions(now).len() >= self.target_frequency as usize
    }

    pub fn progress(&self, now: DateTime<Utc>) -> Progress {
        Progress::from_ratio(self.this_week_completions(now).len(), self.target_frequency)
    }

    pub fn status(&self, now: DateTime<Utc>) -> HabitStatus {
        if self.is_completed_this_week(now) {
            HabitStatus::Done
        } else {
            HabitStatus::Active
        }
    }
}
