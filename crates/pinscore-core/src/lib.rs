//! # pinscore-core
//!
//! Core library for the pinball score reporter.
//!
//! This crate provides:
//! - Serial communication with the machine's communication patch
//! - Score register polling
//! - Game completion detection from noisy score samples
//! - High score persistence and status publishing
//!
//! ## Module Structure
//!
//! - [`serial`]: device access, command/response exchange, firmware handshake
//! - [`poll`]: per-player register reads reduced to the leading score
//! - [`game`]: the completion tracker and its events
//! - [`storage`]: the all-time high score record
//! - [`notify`]: status formatting and publishing
//! - [`config`]: configuration file and protocol constants

pub mod config;
pub mod error;
pub mod game;
pub mod notify;
pub mod poll;
pub mod serial;
pub mod storage;

pub use config::{Config, MachineConfig, NotifyConfig, SerialSettings};
pub use error::{Error, Result};
pub use game::{CompletionEvent, CompletionReason, GameCompletionTracker};
pub use notify::{
    DispatchOutcome, NotificationDispatch, Notifier, WebhookNotifier, format_score, format_status,
};
pub use poll::{ScorePoller, ScoreSample, parse_register_value};
pub use serial::{DevicePort, FirmwareVersion, LinkTimings, SerialIo, SerialLink};
pub use storage::{HighScoreRecord, HighScoreStore};

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::serial::MockPort;

    #[derive(Default)]
    struct Collect(RefCell<Vec<String>>);

    impl Notifier for Collect {
        fn publish(&self, status: &str) -> Result<()> {
            self.0.borrow_mut().push(status.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_reset_on_machine_is_reported() {
        // Two players; the game ends when the machine resets to a new game
        let port = MockPort::new()
            .reply("zc ver\n1.20\n")
            .reply("=000f4240\n") // cycle 1: P1 1,000,000
            .reply("=00000000\n") //          P2 0
            .reply("=001e8480\n") // cycle 2: P1 2,000,000
            .reply("=00000000\n")
            .reply("=00000000\n") // cycle 3: new game, P1 0 (glitch guard)
            .reply("=00000000\n"); // cycle 4: still 0, confirmed
        let mut link = SerialLink::with_timings(
            port,
            LinkTimings {
                read_timeout: Duration::from_millis(20),
                echo_pause: Duration::ZERO,
            },
        );
        link.handshake().unwrap();

        let mut poller = ScorePoller::new(link, 2).with_pacing(Duration::ZERO);
        let mut tracker = GameCompletionTracker::new(1_500_000);
        let dir = tempfile::tempdir().unwrap();
        let store = HighScoreStore::new(dir.path().join("scores.json"));
        let dispatch =
            NotificationDispatch::new(Collect::default(), store.clone(), "Theatre of Magic", 0);

        let start = Instant::now();
        let mut outcomes = Vec::new();
        for cycle in 0..4u64 {
            let sample = poller.poll_scores();
            let now = start + Duration::from_secs(cycle * 5);
            if let Some(event) = tracker.update(sample, now) {
                outcomes.push(dispatch.dispatch(&event));
            }
        }

        assert_eq!(outcomes, [DispatchOutcome::Published]);
        assert_eq!(
            *dispatch.notifier().0.borrow(),
            ["HIGH Score of 2,000,000 posted to Theatre of Magic"]
        );
        assert_eq!(store.load().unwrap(), 2_000_000);
        assert!(tracker.is_idle());
    }
}
