use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::utils::clock::Clock;

use super::habit::Habit;

pub const DEFAULT_REMINDER_INTERVAL: Duration = Duration::from_secs(10);

/// Background nudge on a fixed interval. Reads habit snapshots published by the tracker and
/// prints a reminder for the first habit that is not yet completed this week. Never mutates
/// anything.
pub struct ReminderModule {
    habits: watch::Receiver<Vec<Habit>>,
    shutdown: CancellationToken,
    interval: Duration,
    time_provider: Box<dyn Clock>,
}

impl ReminderModule {
    pub fn new(
        habits: watch::Receiver<Vec<Habit>>,
        shutdown: CancellationToken,
        interval: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            habits,
            shutdown,
            interval,
            time_provider,
        }
    }

    fn pick_reminder(&self, now: DateTime<Utc>) -> Option<String> {
        self.habits
            .borrow()
            .iter()
            .find(|habit| !habit.is_completed_this_week(now))
            .map(|habit| habit.name().to_string())
    }

    /// Executes the reminder event loop until cancellation.
    pub async fn run(self) -> Result<()> {
        let mut tick = self.time_provider.instant();
        loop {
            tick += self.interval;
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("Reminder stopped");
                    return Ok(());
                }
                _ = self.time_provider.sleep_until(tick) => ()
            }

            if let Some(name) = self.pick_reminder(self.time_provider.time()) {
                println!();
                println!("==================================================");
                println!("REMINDER: Don't forget \"{name}\"!");
                println!("==================================================");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tokio::time::Instant;

    use crate::utils::clock::DefaultClock;

    use super::*;

    fn habit_with_target(name: &str, target: i64, now: DateTime<Utc>) -> Habit {
        Habit::new(name, Some(target), now)
    }

    #[tokio::test]
    async fn picks_first_incomplete_habit() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let mut done = habit_with_target("Walk", 1, now);
        done.mark_complete(now);
        let pending = habit_with_target("Read", 3, now);
        let also_pending = habit_with_target("Stretch", 3, now);

        let (tx, rx) = watch::channel(vec![done, pending, also_pending]);
        let module = ReminderModule::new(
            rx,
            CancellationToken::new(),
            DEFAULT_REMINDER_INTERVAL,
            Box::new(DefaultClock),
        );

        assert_eq!(module.pick_reminder(now), Some("Read".to_string()));
        drop(tx);
    }

    #[tokio::test]
    async fn silent_when_everything_is_done() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let mut done = habit_with_target("Walk", 1, now);
        done.mark_complete(now);

        let (tx, rx) = watch::channel(vec![done]);
        let module = ReminderModule::new(
            rx,
            CancellationToken::new(),
            DEFAULT_REMINDER_INTERVAL,
            Box::new(DefaultClock),
        );

        assert_eq!(module.pick_reminder(now), None);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_loop() {
        let (tx, rx) = watch::channel(Vec::new());
        let token = CancellationToken::new();
        let module = ReminderModule::new(
            rx,
            token.clone(),
            Duration::from_secs(3600),
            Box::new(DefaultClock),
        );

        let start = Instant::now();
        let handle = tokio::spawn(module.run());
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();

        // joins promptly even though the next tick is an hour away
        handle.await.unwrap().unwrap();
        assert!(start.elapsed() < Duration::from_secs(3600));
        drop(tx);
    }
}
