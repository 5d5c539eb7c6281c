pub mod menu;
pub mod output;
pub mod shutdown;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;
use menu::run_menu;
use output::RULE;
use shutdown::detect_shutdown;
use tokio_util::sync::CancellationToken;
use tracing::{error, level_filters::LevelFilter};

use crate::{
    storage::json_store::JsonStoreImpl,
    tracker::{reminder::ReminderModule, HabitTracker},
    utils::{
        clock::DefaultClock,
        dir::create_application_default_path,
        logging::enable_logging,
    },
};

#[derive(Parser, Debug)]
#[command(name = "Habitual", version)]
#[command(about = "Command-line habit tracker with weekly progress", long_about = None)]
struct Args {
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, help = "Mirror logs to stdout")]
    log: bool,
    #[arg(long, help = "Seconds between reminder checks", default_value_t = 10)]
    reminder_interval: u64,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => dir,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&dir, logging_level, args.log)?;

    let store = JsonStoreImpl::new(dir)?;
    let mut tracker = HabitTracker::new(store, Box::new(DefaultClock));

    println!("{RULE}");
    println!("WELCOME TO HABITUAL");
    println!("{RULE}");
    println!();

    tracker.load().await;
    if tracker.is_empty() {
        println!("Tip: add a new habit to start your journey!\n");
    } else {
        println!("Loaded {} habit(s).\n", tracker.habits().len());
    }

    let shutdown = CancellationToken::new();
    let reminder = ReminderModule::new(
        tracker.subscribe(),
        shutdown.clone(),
        Duration::from_secs(args.reminder_interval),
        Box::new(DefaultClock),
    );

    // The menu loop is the only mutator; the reminder only reads published snapshots. Ending the
    // menu cancels the reminder so the join completes; Ctrl-C cancels the token first, which the
    // menu loop picks up to persist before returning.
    let menu = async {
        let result = run_menu(&mut tracker, &shutdown).await;
        shutdown.cancel();
        result
    };

    let (menu_result, reminder_result, _) =
        tokio::join!(menu, reminder.run(), detect_shutdown(shutdown.clone()));

    if let Err(e) = reminder_result {
        error!("Reminder module got an error {e:?}");
    }

    // Startup failures above exit non-zero; an unexpected error inside the loop is logged and the
    // process still leaves with a zero status.
    if let Err(e) = menu_result {
        error!("Unexpected error in the menu loop {e:?}");
        eprintln!("An unexpected error occurred: {e}");
    }

    Ok(())
}
