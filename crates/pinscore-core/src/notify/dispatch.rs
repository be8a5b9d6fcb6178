use tracing::{error, info, warn};

use crate::game::CompletionEvent;
use crate::storage::HighScoreStore;

use super::{Notifier, format_score, format_status};

/// What happened to a finished game's report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The status was published
    Published,
    /// Publishing was attempted and failed
    Failed,
    /// The score did not exceed the minimum and was only logged
    BelowMinimum,
}

/// Turns completion events into published statuses and high score records.
pub struct NotificationDispatch<N> {
    notifier: N,
    store: HighScoreStore,
    machine_name: String,
    minimum_score: u64,
}

impl<N: Notifier> NotificationDispatch<N> {
    pub fn new(
        notifier: N,
        store: HighScoreStore,
        machine_name: impl Into<String>,
        minimum_score: u64,
    ) -> Self {
        Self {
            notifier,
            store,
            machine_name: machine_name.into(),
            minimum_score,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Record and report one finished game.
    ///
    /// A new high score is saved regardless of the minimum. Failures to save
    /// or publish are logged and never retried.
    pub fn dispatch(&self, event: &CompletionEvent) -> DispatchOutcome {
        let status = format_status(
            event.final_score,
            event.is_new_high_score,
            &self.machine_name,
        );

        if event.is_new_high_score {
            if let Err(e) = self.store.save(event.final_score) {
                error!("Failed to save high score {}: {}", event.final_score, e);
            }
        }

        if event.final_score <= self.minimum_score {
            info!(
                "Score: {} ({})",
                format_score(event.final_score),
                event.summary()
            );
            return DispatchOutcome::BelowMinimum;
        }

        info!("Publishing: {} ({})", status, event.summary());
        match self.notifier.publish(&status) {
            Ok(()) => DispatchOutcome::Published,
            Err(e) => {
                warn!("Status not posted: {}", e);
                DispatchOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::game::CompletionReason;
    use chrono::Local;
    use std::cell::RefCell;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingNotifier {
        published: RefCell<Vec<String>>,
        fail: bool,
    }

    impl Notifier for RecordingNotifier {
        fn publish(&self, status: &str) -> Result<()> {
            self.published.borrow_mut().push(status.to_string());
            if self.fail {
                Err(Error::Notify("HTTP 503".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn event(final_score: u64, is_new_high_score: bool) -> CompletionEvent {
        CompletionEvent {
            final_score,
            is_new_high_score,
            reason: CompletionReason::Stagnation,
            finished_at: Local::now(),
        }
    }

    fn dispatch_with(
        notifier: RecordingNotifier,
        store: HighScoreStore,
    ) -> NotificationDispatch<RecordingNotifier> {
        NotificationDispatch::new(notifier, store, "Funhouse", 1000)
    }

    #[test]
    fn test_publishes_above_minimum() {
        let dir = tempdir().unwrap();
        let store = HighScoreStore::new(dir.path().join("scores.json"));
        let dispatch = dispatch_with(RecordingNotifier::default(), store.clone());

        assert_eq!(dispatch.dispatch(&event(1001, false)), DispatchOutcome::Published);
        assert_eq!(
            *dispatch.notifier().published.borrow(),
            ["Score of 1,001 posted to Funhouse"]
        );
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn test_minimum_is_exclusive() {
        let dir = tempdir().unwrap();
        let store = HighScoreStore::new(dir.path().join("scores.json"));
        let dispatch = dispatch_with(RecordingNotifier::default(), store);

        assert_eq!(dispatch.dispatch(&event(1000, false)), DispatchOutcome::BelowMinimum);
        assert!(dispatch.notifier().published.borrow().is_empty());
    }

    #[test]
    fn test_new_high_score_saved_and_prefixed() {
        let dir = tempdir().unwrap();
        let store = HighScoreStore::new(dir.path().join("scores.json"));
        let dispatch = dispatch_with(RecordingNotifier::default(), store.clone());

        assert_eq!(dispatch.dispatch(&event(5000, true)), DispatchOutcome::Published);
        assert_eq!(
            *dispatch.notifier().published.borrow(),
            ["HIGH Score of 5,000 posted to Funhouse"]
        );
        assert_eq!(store.load().unwrap(), 5000);
    }

    #[test]
    fn test_high_score_below_minimum_still_saved() {
        let dir = tempdir().unwrap();
        let store = HighScoreStore::new(dir.path().join("scores.json"));
        let dispatch = dispatch_with(RecordingNotifier::default(), store.clone());

        assert_eq!(dispatch.dispatch(&event(500, true)), DispatchOutcome::BelowMinimum);
        assert_eq!(store.load().unwrap(), 500);
    }

    #[test]
    fn test_publish_failure_is_reported_once() {
        let dir = tempdir().unwrap();
        let store = HighScoreStore::new(dir.path().join("scores.json"));
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let dispatch = dispatch_with(notifier, store);

        assert_eq!(dispatch.dispatch(&event(2000, false)), DispatchOutcome::Failed);
        assert_eq!(dispatch.notifier().published.borrow().len(), 1);
    }
}
