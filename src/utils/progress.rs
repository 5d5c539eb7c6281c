use std::fmt::Display;

/// A whole-number progress percentage, clamped to `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Progress(u8);

pub const PROGRESS_BAR_CELLS: u32 = 10;

impl Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Progress {
    /// Ratio of completions to target, rounded and clamped to 100. A target of zero yields zero
    /// instead of dividing.
    pub fn from_ratio(completions: usize, target: u32) -> Progress {
        if target == 0 {
            return Progress(0);
        }
        let percentage = (completions as f64 / target as f64 * 100.).round();
        Progress(percentage.min(100.) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Renders a fixed-width cell bar, e.g. `███░░░░░░░` for 30%.
    pub fn bar(&self) -> String {
        let filled = (self.0 as f64 / 100. * PROGRESS_BAR_CELLS as f64).round() as u32;
        let empty = PROGRESS_BAR_CELLS - filled.min(PROGRESS_BAR_CELLS);
        format!("{}{}", "█".repeat(filled as usize), "░".repeat(empty as usize))
    }
}
