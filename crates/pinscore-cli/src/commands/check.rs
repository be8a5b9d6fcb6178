//! One-shot connection check: handshake plus a single score poll.

use std::path::Path;

use anyhow::Result;
use pinscore_core::{DevicePort, ScorePoller, SerialLink, format_score};

/// Verify the cabling and firmware, then print the current leading score
pub fn run(config_path: &Path) -> Result<()> {
    let config = super::load_config(config_path)?;

    let port = DevicePort::open(&config.serial)?;
    println!("Opened {} at {} baud", port.device(), config.serial.baud_rate);

    let mut link = SerialLink::new(port);
    let version = link.handshake()?;
    println!("Communication patch: v{}", version);

    let mut poller = ScorePoller::new(link, config.machine.max_players);
    match poller.poll_scores() {
        Some(score) => println!("Leading score: {}", format_score(score)),
        None => println!("No usable score reading (machine busy or reply malformed)"),
    }

    Ok(())
}
