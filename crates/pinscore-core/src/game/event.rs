use chrono::{DateTime, Local};
use strum::Display;

/// Why a game was considered finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CompletionReason {
    /// The score dropped on two consecutive readings: a new game started
    #[strum(serialize = "score reset")]
    Regression,
    /// The score stopped changing for longer than the stagnation timeout
    #[strum(serialize = "idle timeout")]
    Stagnation,
}

/// A finished game, emitted once by the tracker
#[derive(Debug, Clone)]
pub struct CompletionEvent {
    pub final_score: u64,
    pub is_new_high_score: bool,
    pub reason: CompletionReason,
    pub finished_at: DateTime<Local>,
}

impl CompletionEvent {
    /// Reason and local time for log lines, e.g. `idle timeout at 2024-05-01 21:14:03`
    pub fn summary(&self) -> String {
        format!(
            "{} at {}",
            self.reason,
            self.finished_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}
