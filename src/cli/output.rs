use ansi_term::Colour;
use chrono::{DateTime, Local, Utc};

use crate::tracker::{
    habit::{Habit, HabitStatus},
    profile::UserProfile,
    ListFilter, TrackerStats,
};

pub const RULE: &str = "==================================================";
const DIVIDER: &str = "--------------------------------------------------";

fn status_tag(status: HabitStatus) -> String {
    match status {
        HabitStatus::Done => Colour::Green.paint("Done").to_string(),
        HabitStatus::Active => Colour::Yellow.paint("Active").to_string(),
    }
}

fn short_date(moment: DateTime<Utc>) -> String {
    moment.with_timezone(&Local).format("%a %d %b %Y").to_string()
}

/// One block per habit: status tag, weekly target, `count/target` progress and a 10-cell bar.
pub fn render_habit_list(filter: ListFilter, habits: &[&Habit], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str(filter.title());
    out.push('\n');
    out.push_str(RULE);
    out.push('\n');

    if habits.is_empty() {
        out.push_str("No habits match this filter yet.\n");
        return out;
    }

    for (index, habit) in habits.iter().enumerate() {
        let progress = habit.progress(now);
        let this_week = habit.this_week_completions(now).len();
        out.push_str(&format!(
            "{}. [{}] {}\n",
            index + 1,
            status_tag(habit.status(now)),
            habit.name()
        ));
        out.push_str(&format!("   Target   : {}x/week\n", habit.target_frequency()));
        out.push_str(&format!(
            "   Progress : {}/{} ({progress})\n",
            this_week,
            habit.target_frequency()
        ));
        out.push_str(&format!("   Bar      : {} {progress}\n", progress.bar()));
        out.push_str(&format!("   Created  : {}\n", short_date(habit.created_at())));
        out.push_str(DIVIDER);
        out.push('\n');
    }
    out
}

pub fn render_stats(stats: &TrackerStats) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str("HABIT STATISTICS\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Weekly target total : {}\n", stats.total_target));
    out.push_str(&format!("Completed this week : {}\n", stats.total_completions));
    out.push_str(&format!("Average progress    : {}%\n", stats.average_progress));
    out.push_str(&format!("Active              : {}\n", stats.active));
    out.push_str(&format!("Done                : {}\n", stats.completed));
    out.push_str(RULE);
    out.push('\n');
    out
}

pub fn render_profile(profile: &UserProfile, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str("USER PROFILE\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Name                : {}\n", profile.name));
    out.push_str(&format!("Joined              : {}\n", short_date(profile.join_date)));
    out.push_str(&format!("Days tracking       : {}\n", profile.days_joined(now)));
    out.push_str(&format!("Total habits        : {}\n", profile.total_habits));
    out.push_str(&format!("Done this week      : {}\n", profile.completed_this_week));
    out.push_str(RULE);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn habit_list_shows_progress_and_bar() {
        let mut habit = Habit::new("Exercise", Some(3), now());
        habit.mark_complete(now());

        let out = render_habit_list(ListFilter::All, &[&habit], now());

        assert!(out.contains("ALL HABITS"));
        assert!(out.contains("Exercise"));
        assert!(out.contains("3x/week"));
        assert!(out.contains("1/3 (33%)"));
        assert!(out.contains("███░░░░░░░"));
    }

    #[test]
    fn empty_list_prints_a_notice() {
        let out = render_habit_list(ListFilter::Completed, &[], now());

        assert!(out.contains("COMPLETED HABITS"));
        assert!(out.contains("No habits match this filter yet."));
    }

    #[test]
    fn stats_block_lists_every_aggregate() {
        let stats = TrackerStats {
            total_target: 10,
            total_completions: 4,
            average_progress: 40,
            active: 2,
            completed: 1,
        };

        let out = render_stats(&stats);
        assert!(out.contains("Weekly target total : 10"));
        assert!(out.contains("Completed this week : 4"));
        assert!(out.contains("Average progress    : 40%"));
        assert!(out.contains("Active              : 2"));
        assert!(out.contains("Done                : 1"));
    }

    #[test]
    fn profile_block_shows_days_tracking() {
        let mut profile = UserProfile::new(now());
        profile.name = "Zoe".into();

        let out = render_profile(&profile, now());
        assert!(out.contains("Name                : Zoe"));
        assert!(out.contains("Days tracking       : 1"));
    }
}
