//! Personal habit tracker for the terminal. Record recurring habits, mark one completion per day,
//! and watch weekly progress over a rolling 7-day window. State lives in a single JSON file and
//! survives between runs.

pub mod cli;
pub mod storage;
pub mod tracker;
pub mod utils;
