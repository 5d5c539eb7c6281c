use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::tracker::{
    habit::{normalize_frequency, normalize_name, Habit},
    profile::{UserProfile, DEFAULT_PROFILE_NAME},
};

/// On-disk document. Every field is deserialized permissively (optional, dates as raw strings) so
/// that one corrupt value never rejects the whole file; the fallback policy lives in the
/// `into_*` conversions below, not in the domain constructors.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerFileEntity {
    pub user_profile: ProfileEntity,
    pub habits: Vec<HabitEntity>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileEntity {
    pub name: Option<String>,
    pub join_date: Option<String>,
    pub total_habits: Option<i64>,
    pub completed_this_week: Option<i64>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HabitEntity {
    pub id: Option<String>,
    pub name: Option<String>,
    pub target_frequency: Option<i64>,
    pub completions: Vec<String>,
    pub created_at: Option<String>,
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|v| v.with_timezone(&Utc))
}

impl HabitEntity {
    pub fn from_habit(habit: &Habit) -> Self {
        Self {
            id: Some(habit.id().to_string()),
            name: Some(habit.name().to_string()),
            target_frequency: Some(habit.target_frequency() as i64),
            completions: habit
                .completions()
                .iter()
                .map(|completion| completion.to_rfc3339())
                .collect(),
            created_at: Some(habit.created_at().to_rfc3339()),
        }
    }

    /// Normalization fallbacks, applied field by field:
    /// - missing/blank `id` gets a fresh uuid
    /// - blank `name` gets the placeholder, non-positive `targetFrequency` becomes 7
    /// - unreadable `createdAt` becomes `now`
    /// - unreadable completion timestamps are dropped with a warning. Renaming them to `now`
    ///   would move history into the current week, so a date we cannot place counts for nothing.
    pub fn into_habit(self, now: DateTime<Utc>) -> Habit {
        let name = normalize_name(self.name.as_deref().unwrap_or(""));

        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };

        let mut completions = Vec::with_capacity(self.completions.len());
        for raw in self.completions {
            match parse_timestamp(&raw) {
                Ok(moment) => completions.push(moment),
                Err(e) => {
                    warn!("Dropping completion {raw:?} of habit {name:?}: {e}");
                }
            }
        }

        let created_at = match self.created_at.as_deref() {
            Some(raw) => parse_timestamp(raw).unwrap_or_else(|e| {
                warn!("Habit {name:?} has unreadable createdAt {raw:?}: {e}");
                now
            }),
            None => now,
        };

        Habit::from_parts(
            id,
            name,
            normalize_frequency(self.target_frequency),
            completions,
            created_at,
        )
    }
}

impl ProfileEntity {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: Some(profile.name.clone()),
            join_date: Some(profile.join_date.to_rfc3339()),
            total_habits: Some(profile.total_habits as i64),
            completed_this_week: Some(profile.completed_this_week as i64),
        }
    }

    /// The stored counters are derived values and are ignored here; the tracker recomputes them
    /// from the habit list. A valid stored `joinDate` is never overwritten.
    pub fn into_profile(self, now: DateTime<Utc>) -> UserProfile {
        let join_date = match self.join_date.as_deref() {
            Some(raw) => parse_timestamp(raw).unwrap_or_else(|e| {
                warn!("Stored joinDate {raw:?} is unreadable: {e}");
                now
            }),
            None => now,
        };

        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => DEFAULT_PROFILE_NAME.to_string(),
        };

        UserProfile {
            name,
            join_date,
            total_habits: 0,
            completed_this_week: 0,
        }
    }
}
