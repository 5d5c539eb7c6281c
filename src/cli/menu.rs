use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio_util::sync::CancellationToken;

use crate::{
    storage::json_store::HabitStore,
    tracker::{HabitTracker, ListFilter},
};

use super::output::{render_habit_list, render_profile, render_stats, RULE};

/// One menu selection. Anything that is not a known digit is [None] and re-displays the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Profile,
    ListAll,
    ListActive,
    ListCompleted,
    Add,
    Complete,
    Delete,
    Stats,
    ClearAll,
    Exit,
}

impl MenuChoice {
    pub fn from_line(line: &str) -> Option<MenuChoice> {
        match line.trim() {
            "1" => Some(MenuChoice::Profile),
            "2" => Some(MenuChoice::ListAll),
            "3" => Some(MenuChoice::ListActive),
            "4" => Some(MenuChoice::ListCompleted),
            "5" => Some(MenuChoice::Add),
            "6" => Some(MenuChoice::Complete),
            "7" => Some(MenuChoice::Delete),
            "8" => Some(MenuChoice::Stats),
            "9" => Some(MenuChoice::ClearAll),
            "0" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

fn print_menu() {
    println!("{RULE}");
    println!("HABIT TRACKER - MAIN MENU");
    println!("{RULE}");
    println!("1. View profile");
    println!("2. View all habits");
    println!("3. View active habits");
    println!("4. View completed habits");
    println!("5. Add a new habit");
    println!("6. Mark a habit complete");
    println!("7. Delete a habit");
    println!("8. View statistics");
    println!("9. Clear all data");
    println!("0. Save and exit");
    println!("{RULE}");
}

type InputLines = Lines<BufReader<Stdin>>;

/// Prints `question` without a newline and reads one answer line. [None] means stdin hit EOF or
/// shutdown was requested while waiting; both end the loop through the same persist-and-return
/// path.
async fn ask(
    lines: &mut InputLines,
    shutdown: &CancellationToken,
    question: &str,
) -> Result<Option<String>> {
    print!("{question}");
    std::io::stdout().flush()?;
    tokio::select! {
        _ = shutdown.cancelled() => Ok(None),
        line = lines.next_line() => Ok(line?),
    }
}

/// Parses a displayed habit number. Out-of-range values are handed to the tracker as-is so it can
/// reject them; unparseable input maps to 0, which is always invalid.
fn parse_habit_number(line: &str) -> usize {
    line.trim().parse::<usize>().unwrap_or(0)
}

/// The interactive request-response loop. One selection triggers one tracker operation; the menu
/// is re-displayed after every selection. Returns on exit, stdin EOF, or cancellation of
/// `shutdown`, persisting the current state in every case.
pub async fn run_menu<S: HabitStore>(
    tracker: &mut HabitTracker<S>,
    shutdown: &CancellationToken,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_menu();
        let Some(line) = ask(&mut lines, shutdown, "Select an option (0-9): ").await? else {
            tracker.persist().await;
            return Ok(());
        };

        let Some(choice) = MenuChoice::from_line(&line) else {
            println!("Invalid selection. Please try again.\n");
            continue;
        };

        match choice {
            MenuChoice::Profile => {
                let now = tracker.now();
                println!("{}", render_profile(tracker.profile(), now));
            }
            MenuChoice::ListAll => print_habits(tracker, ListFilter::All),
            MenuChoice::ListActive => print_habits(tracker, ListFilter::Active),
            MenuChoice::ListCompleted => print_habits(tracker, ListFilter::Completed),
            MenuChoice::Add => {
                let Some(name) = ask(&mut lines, shutdown, "Habit name: ").await? else {
                    break;
                };
                let Some(frequency) = ask(&mut lines, shutdown, "Weekly target (number): ").await? else {
                    break;
                };
                let frequency = frequency.trim().parse::<i64>().ok();
                let habit = tracker.add_habit(&name, frequency).await;
                println!(
                    "Added \"{}\" with a target of {}x/week.\n",
                    habit.name(),
                    habit.target_frequency()
                );
            }
            MenuChoice::Complete => {
                if tracker.is_empty() {
                    println!("No habits to mark complete yet.\n");
                    continue;
                }
                print_habits(tracker, ListFilter::All);
                let Some(number) = ask(&mut lines, shutdown, "Habit number to mark complete: ").await?
                else {
                    break;
                };
                match tracker.complete_habit(parse_habit_number(&number)).await {
                    Some(outcome) if outcome.newly_completed => {
                        println!("\"{}\" marked complete for today.\n", outcome.name);
                    }
                    Some(outcome) => {
                        println!("\"{}\" was already completed today.\n", outcome.name);
                    }
                    None => println!("Invalid habit number.\n"),
                }
            }
            MenuChoice::Delete => {
                if tracker.is_empty() {
                    println!("No habits to delete yet.\n");
                    continue;
                }
                print_habits(tracker, ListFilter::All);
                let Some(number) = ask(&mut lines, shutdown, "Habit number to delete: ").await? else {
                    break;
                };
                match tracker.delete_habit(parse_habit_number(&number)).await {
                    Some(removed) => println!("Deleted \"{}\".\n", removed.name()),
                    None => println!("Invalid habit number.\n"),
                }
            }
            MenuChoice::Stats => match tracker.stats() {
                Some(stats) => println!("{}", render_stats(&stats)),
                None => println!("No habits to compute statistics for yet.\n"),
            },
            MenuChoice::ClearAll => {
                let removed = tracker.clear_all().await;
                println!("Cleared {removed} habit(s).\n");
            }
            MenuChoice::Exit => {
                tracker.persist().await;
                println!("See you! Stay consistent with your habits.");
                return Ok(());
            }
        }
    }

    // EOF mid-prompt, same path as a normal exit
    tracker.persist().await;
    Ok(())
}

fn print_habits<S: HabitStore>(tracker: &HabitTracker<S>, filter: ListFilter) {
    let habits = tracker.filtered(filter);
    println!("{}", render_habit_list(filter, &habits, tracker.now()));
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use crate::{
        storage::json_store::{JsonStoreImpl, DATA_FILE_NAME},
        utils::clock::DefaultClock,
    };

    use super::*;

    #[tokio::test]
    async fn cancellation_ends_the_menu_loop_and_persists() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonStoreImpl::new(dir.path().to_owned())?;
        let mut tracker = HabitTracker::new(store, Box::new(DefaultClock));

        let shutdown = CancellationToken::new();
        shutdown.cancel();

        run_menu(&mut tracker, &shutdown).await?;

        // state was written on the way out, same as a normal exit
        assert!(dir.path().join(DATA_FILE_NAME).exists());
        Ok(())
    }

    #[test]
    fn every_digit_maps_to_a_choice() {
        assert_eq!(MenuChoice::from_line(" 1 "), Some(MenuChoice::Profile));
        assert_eq!(MenuChoice::from_line("5"), Some(MenuChoice::Add));
        assert_eq!(MenuChoice::from_line("9"), Some(MenuChoice::ClearAll));
        assert_eq!(MenuChoice::from_line("0"), Some(MenuChoice::Exit));
    }

    #[test]
    fn junk_input_is_rejected() {
        assert_eq!(MenuChoice::from_line(""), None);
        assert_eq!(MenuChoice::from_line("10"), None);
        assert_eq!(MenuChoice::from_line("exit"), None);
    }

    #[test]
    fn habit_numbers_parse_defensively() {
        assert_eq!(parse_habit_number(" 3 "), 3);
        assert_eq!(parse_habit_number("abc"), 0);
        assert_eq!(parse_habit_number("-1"), 0);
        assert_eq!(parse_habit_number(""), 0);
    }
}
