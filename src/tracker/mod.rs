pub mod habit;
pub mod profile;
pub mod reminder;

use anyhow::Result;
use habit::Habit;
use profile::UserProfile;
use tokio::sync::watch;
use tracing::{debug, error};

use crate::{
    storage::{
        entities::{HabitEntity, ProfileEntity, TrackerFileEntity},
        json_store::HabitStore,
    },
    utils::clock::Clock,
};

/// Which habits a listing shows. Unrecognized keys resolve to [ListFilter::All], both for the
/// selection and for the printed title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Active,
    Completed,
}

impl ListFilter {
    pub fn from_key(key: &str) -> ListFilter {
        match key {
            "active" => ListFilter::Active,
            "completed" => ListFilter::Completed,
            _ => ListFilter::All,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ListFilter::All => "ALL HABITS",
            ListFilter::Active => "ACTIVE HABITS",
            ListFilter::Completed => "COMPLETED HABITS",
        }
    }
}

/// Aggregated weekly statistics over the whole habit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerStats {
    pub total_target: u64,
    pub total_completions: usize,
    pub average_progress: u8,
    pub active: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub name: String,
    /// False when the habit was already marked for today's calendar date.
    pub newly_completed: bool,
}

/// Owns the habit collection, the profile aggregate and the persistence store. Every mutating
/// operation persists best-effort and refreshes the derived profile counters; a snapshot of the
/// habit list is published for the reminder task after each change.
pub struct HabitTracker<S: HabitStore> {
    habits: Vec<Habit>,
    profile: UserProfile,
    store: S,
    clock: Box<dyn Clock>,
    updates: watch::Sender<Vec<Habit>>,
}

impl<S: HabitStore> HabitTracker<S> {
    pub fn new(store: S, clock: Box<dyn Clock>) -> Self {
        let (updates, _) = watch::channel(Vec::new());
        let profile = UserProfile::new(clock.time());
        Self {
            habits: Vec::new(),
            profile,
            store,
            clock,
            updates,
        }
    }

    /// Snapshot stream for the reminder task. Receives the full habit list after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Habit>> {
        self.updates.subscribe()
    }

    /// Loads persisted state. A missing file leaves the fresh defaults in place; a corrupt file is
    /// logged and the in-memory state stays untouched.
    pub async fn load(&mut self) {
        let now = self.clock.time();
        match self.store.load().await {
            Ok(Some(data)) => {
                self.profile = data.user_profile.into_profile(now);
                self.habits = data
                    .habits
                    .into_iter()
                    .map(|entity| entity.into_habit(now))
                    .collect();
                debug!("Loaded {} habits", self.habits.len());
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to load habit data, starting with defaults: {e:?}");
            }
        }
        self.profile.refresh_from(&self.habits, now);
        let _ = self.updates.send(self.habits.clone());
    }

    pub async fn add_habit(&mut self, name: &str, frequency: Option<i64>) -> Habit {
        let habit = Habit::new(name, frequency, self.clock.time());
        self.habits.push(habit.clone());
        self.persist_and_refresh().await;
        habit
    }

    /// Marks habit `number` (1-based, as displayed) complete for today. Returns [None] for an
    /// out-of-range number without touching any state.
    pub async fn complete_habit(&mut self, number: usize) -> Option<CompletionOutcome> {
        let now = self.clock.time();
        let habit = self.habit_at_mut(number)?;
        let newly_completed = habit.mark_complete(now);
        let name = habit.name().to_string();
        self.persist_and_refresh().await;
        Some(CompletionOutcome {
            name,
            newly_completed,
        })
    }

    /// Removes habit `number` (1-based). Returns the removed habit, or [None] when out of range.
    pub async fn delete_habit(&mut self, number: usize) -> Option<Habit> {
        self.habit_at_mut(number)?;
        let removed = self.habits.remove(number - 1);
        self.persist_and_refresh().await;
        Some(removed)
    }

    /// Drops every habit. Returns how many were removed.
    pub async fn clear_all(&mut self) -> usize {
        let removed = self.habits.len();
        self.habits.clear();
        self.persist_and_refresh().await;
        removed
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn filtered(&self, filter: ListFilter) -> Vec<&Habit> {
        let now = self.clock.time();
        self.habits
            .iter()
            .filter(|habit| match filter {
                ListFilter::All => true,
                ListFilter::Active => !habit.is_completed_this_week(now),
                ListFilter::Completed => habit.is_completed_this_week(now),
            })
            .collect()
    }

    /// [None] on an empty habit list; the mean of zero habits is undefined.
    pub fn stats(&self) -> Option<TrackerStats> {
        if self.habits.is_empty() {
            return None;
        }
        let now = self.clock.time();

        let total_target = self
            .habits
            .iter()
            .map(|habit| habit.target_frequency() as u64)
            .sum();
        let total_completions = self
            .habits
            .iter()
            .map(|habit| habit.this_week_completions(now).len())
            .sum();
        let progress_sum: u32 = self
            .habits
            .iter()
            .map(|habit| habit.progress(now).value() as u32)
            .sum();
        let average_progress =
            (progress_sum as f64 / self.habits.len() as f64).round() as u8;
        let completed = self
            .habits
            .iter()
            .filter(|habit| habit.is_completed_this_week(now))
            .count();

        Some(TrackerStats {
            total_target,
            total_completions,
            average_progress,
            active: self.habits.len() - completed,
            completed,
        })
    }

    /// Profile with counters recomputed from the current habit list.
    pub fn profile(&mut self) -> &UserProfile {
        let now = self.clock.time();
        self.profile.refresh_from(&self.habits, now);
        &self.profile
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.time()
    }

    /// Writes the current state to the store. A failed write is logged and the in-memory state
    /// stays authoritative; nothing is retried or rolled back.
    pub async fn persist(&mut self) {
        self.profile
            .refresh_from(&self.habits, self.clock.time());
        let data = TrackerFileEntity {
            user_profile: ProfileEntity::from_profile(&self.profile),
            habits: self.habits.iter().map(HabitEntity::from_habit).collect(),
        };
        if let Err(e) = self.store.save(&data).await {
            error!("Failed to save habit data, recent changes are unsaved: {e:?}");
        }
    }

    async fn persist_and_refresh(&mut self) {
        self.persist().await;
        let _ = self.updates.send(self.habits.clone());
    }

    fn habit_at_mut(&mut self, number: usize) -> Option<&mut Habit> {
        if number == 0 {
            return None;
        }
        self.habits.get_mut(number - 1)
    }
}
