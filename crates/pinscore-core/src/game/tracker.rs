use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{debug, info, trace};

use crate::config::timing::STAGNATION_TIMEOUT;
use crate::game::{CompletionEvent, CompletionReason};
use crate::poll::ScoreSample;

/// Decides from periodic score samples when a game has ended.
///
/// The tracker is either idle (`current_score == 0`) or following a game in
/// progress. Each call to [`update`](Self::update) applies, in order:
///
/// 1. Any change of an active score restarts the stagnation clock.
/// 2. A first lower reading only marks itself pending; one misread digit must
///    not end a game.
/// 3. A second consecutive lower reading ends the game with the score held
///    before the drop. The lower value belongs to the next game and is not
///    adopted in the same cycle.
/// 4. A score unchanged for longer than the stagnation timeout ends the game.
/// 5. Otherwise the sample becomes the current score.
///
/// Leaving idle starts the stagnation clock. While idle, a sample equal to
/// the last finalized score is the machine still showing the finished game
/// and does not start a new one. After a finished game, a different nonzero
/// reading must be seen on two consecutive cycles before a new game is
/// followed. A `0` reading forgets the finished score.
#[derive(Debug)]
pub struct GameCompletionTracker {
    current_score: u64,
    last_change: Option<Instant>,
    low_reading_pending: bool,
    last_finalized: Option<u64>,
    idle_exit_pending: bool,
    recorded_high: u64,
    stagnation_timeout: Duration,
}

impl GameCompletionTracker {
    /// Create an idle tracker that knows the all-time high score
    pub fn new(recorded_high: u64) -> Self {
        Self {
            current_score: 0,
            last_change: None,
            low_reading_pending: false,
            last_finalized: None,
            idle_exit_pending: false,
            recorded_high,
            stagnation_timeout: STAGNATION_TIMEOUT,
        }
    }

    pub fn with_stagnation_timeout(mut self, timeout: Duration) -> Self {
        self.stagnation_timeout = timeout;
        self
    }

    pub fn current_score(&self) -> u64 {
        self.current_score
    }

    pub fn last_change(&self) -> Option<Instant> {
        self.last_change
    }

    pub fn low_reading_pending(&self) -> bool {
        self.low_reading_pending
    }

    pub fn recorded_high(&self) -> u64 {
        self.recorded_high
    }

    pub fn is_idle(&self) -> bool {
        self.current_score == 0
    }

    /// Feed one polling cycle's sample observed at `now`.
    ///
    /// Returns the completion event when this sample ends a game. A missing
    /// sample leaves the state untouched.
    pub fn update(&mut self, sample: ScoreSample, now: Instant) -> Option<CompletionEvent> {
        let new_score = sample?;

        if self.is_idle() {
            self.leave_idle(new_score, now);
            return None;
        }

        let current = self.current_score;

        if new_score != current {
            self.last_change = Some(now);
        }

        if new_score < current && !self.low_reading_pending {
            debug!(
                "Lower reading {} while tracking {}, waiting for confirmation",
                new_score, current
            );
            self.low_reading_pending = true;
            return None;
        }
        self.low_reading_pending = false;

        let reason = if new_score < current {
            Some(CompletionReason::Regression)
        } else if self.is_stagnant(now) {
            Some(CompletionReason::Stagnation)
        } else {
            None
        };

        match reason {
            Some(reason) => Some(self.finalize(reason)),
            None => {
                if new_score != current {
                    trace!("Score {} -> {}", current, new_score);
                }
                self.current_score = new_score;
                None
            }
        }
    }

    fn leave_idle(&mut self, new_score: u64, now: Instant) {
        if new_score == 0 {
            self.last_finalized = None;
            self.idle_exit_pending = false;
            return;
        }

        if let Some(finished) = self.last_finalized {
            if finished == new_score {
                trace!("Machine still showing finished score {}", new_score);
                self.idle_exit_pending = false;
                return;
            }
            if !self.idle_exit_pending {
                debug!(
                    "Reading {} after finished game {}, waiting for confirmation",
                    new_score, finished
                );
                self.idle_exit_pending = true;
                return;
            }
        }

        debug!("Game in progress, score {}", new_score);
        self.last_finalized = None;
        self.idle_exit_pending = false;
        self.current_score = new_score;
        self.last_change = Some(now);
    }

    fn is_stagnant(&self, now: Instant) -> bool {
        self.last_change
            .is_some_and(|changed| now.saturating_duration_since(changed) > self.stagnation_timeout)
    }

    fn finalize(&mut self, reason: CompletionReason) -> CompletionEvent {
        let final_score = self.current_score;
        let is_new_high_score = final_score > self.recorded_high;
        if is_new_high_score {
            self.recorded_high = final_score;
        }

        info!("Game over ({}), final score {}", reason, final_score);

        self.current_score = 0;
        self.last_change = None;
        self.low_reading_pending = false;
        self.last_finalized = Some(final_score);
        self.idle_exit_pending = false;

        CompletionEvent {
            final_score,
            is_new_high_score,
            reason,
            finished_at: Local::now(),
        }
    }
}
