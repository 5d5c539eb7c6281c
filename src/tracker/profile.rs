use chrono::{DateTime, Utc};

use super::habit::Habit;

pub const DEFAULT_PROFILE_NAME: &str = "Habit Warrior";

/// Aggregate view of the user and their habits. The counters are derived and must be refreshed
/// from the habit list before reading, they carry no authority of their own.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub join_date: DateTime<Utc>,
    pub total_habits: usize,
    pub completed_this_week: usize,
}

impl UserProfile {
    pub fn new(join_date: DateTime<Utc>) -> Self {
        Self {
            name: DEFAULT_PROFILE_NAME.to_string(),
            join_date,
            total_habits: 0,
            completed_this_week: 0,
        }
    }

    /// Recomputes the derived counters from the habit collection.
    pub fn refresh_from(&mut self, habits: &[Habit], now: DateTime<Utc>) {
        self.total_habits = habits.len();
        self.completed_this_week = habits
            .iter()
            .filter(|habit| habit.is_completed_this_week(now))
            .count();
    }

    /// Whole days since joining, counting the join day itself, never below 1.
    pub fn days_joined(&self, now: DateTime<Utc>) -> i64 {
        let days = (now - self.join_date).num_days() + 1;
        days.max(1)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn refresh_recomputes_counters() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let mut done = Habit::new("Walk", Some(1), now);
        done.mark_complete(now);
        let pending = Habit::new("Read", Some(5), now);

        let mut profile = UserProfile::new(now);
        profile.refresh_from(&[done, pending], now);

        assert_eq!(profile.total_habits, 2);
        assert_eq!(profile.completed_this_week, 1);
    }

    #[test]
    fn days_joined_counts_join_day() {
        let joined = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let profile = UserProfile::new(joined);

        assert_eq!(profile.days_joined(joined), 1);
        assert_eq!(profile.days_joined(joined + Duration::days(9)), 10);
    }

    #[test]
    fn days_joined_floors_at_one() {
        let joined = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let profile = UserProfile::new(joined);

        assert_eq!(profile.days_joined(joined - Duration::days(3)), 1);
    }
}
