//! Main watch mode command.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use pinscore_core::config::timing::POLL_INTERVAL;
use pinscore_core::{
    DevicePort, GameCompletionTracker, HighScoreStore, NotificationDispatch, ScorePoller,
    SerialLink, WebhookNotifier, format_score,
};
use tracing::{debug, info, warn};

use crate::shutdown;

/// Watch the machine until a termination signal arrives
pub fn run(config_path: &Path, scores_path: &Path) -> Result<()> {
    let shutdown = shutdown::install_signal_handler()?;

    let config = super::load_config(config_path)?;

    let store = HighScoreStore::new(scores_path);
    let recorded_high = match store.load() {
        Ok(score) => score,
        Err(e) => {
            warn!(
                "Failed to read high score from {}: {}, starting from 0",
                scores_path.display(),
                e
            );
            0
        }
    };
    info!("Recorded high score: {}", format_score(recorded_high));

    let port = DevicePort::open(&config.serial)?;
    let mut link = SerialLink::new(port);
    link.handshake()?;

    let mut poller = ScorePoller::new(link, config.machine.max_players);
    let mut tracker = GameCompletionTracker::new(recorded_high);
    let dispatch = NotificationDispatch::new(
        WebhookNotifier::new(&config.notify),
        store,
        config.machine.name.as_str(),
        config.machine.minimum_score,
    );

    info!(
        "Watching {} ({} player slots, reporting scores above {})",
        config.machine.name,
        config.machine.max_players,
        format_score(config.machine.minimum_score)
    );

    while !shutdown.is_requested() {
        let sample = poller.poll_scores();
        debug!("Sample: {:?}", sample);

        if let Some(event) = tracker.update(sample, Instant::now()) {
            let outcome = dispatch.dispatch(&event);
            debug!("Dispatch outcome: {:?}", outcome);
        }

        if shutdown.wait(POLL_INTERVAL) {
            break;
        }
    }

    if tracker.current_score() > 0 {
        info!(
            "Stopped with a game in progress at {}",
            format_score(tracker.current_score())
        );
    }

    Ok(())
}
