//! Runtime configuration and protocol constants.
//!
//! The configuration file is JSON:
//!
//! ```json
//! {
//!   "machine": { "name": "Medieval Madness", "maxPlayers": 4, "minimumScore": 1000000 },
//!   "notify": { "endpoint": "https://example.invalid/api/status", "token": "secret" },
//!   "serial": { "device": "/dev/ttyUSB0", "baudRate": 57600 }
//! }
//! ```
//!
//! The `serial` section is optional and falls back to [`SerialSettings::default`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Timing constants for the polling loop and the serial exchange
pub mod timing {
    use std::time::Duration;

    /// Period of the poll → update → dispatch cycle
    pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

    /// Deadline for a single serial response
    pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

    /// Pause before re-reading after the device echoed the command
    pub const ECHO_PAUSE: Duration = Duration::from_secs(1);

    /// Settling time before each score register query
    pub const REGISTER_PACING: Duration = Duration::from_secs(1);

    /// A game whose score has not changed for longer than this is over
    pub const STAGNATION_TIMEOUT: Duration = Duration::from_secs(120);
}

/// Command strings understood by the machine's communication patch
pub mod protocol {
    /// Firmware version query
    pub const VERSION_COMMAND: &str = "zc ver";

    /// Score register read; the one-indexed player number is appended
    pub const SCORE_COMMAND: &str = "zc mod 0x5c073564";

    /// Oldest communication patch that speaks this protocol (major, hundredths)
    pub const MIN_FIRMWARE: (u32, u32) = (1, 18);
}

/// Default serial device
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";
/// Default line speed
pub const DEFAULT_BAUD_RATE: u32 = 57_600;
/// Hashtag appended to every published status
pub const DEFAULT_HASHTAG: &str = "#PinScore";

/// Most player slots any supported machine has
pub const MAX_PLAYERS: u32 = 8;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub machine: MachineConfig,
    pub notify: NotifyConfig,
    #[serde(default)]
    pub serial: SerialSettings,
}

/// Machine being watched
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineConfig {
    /// Display name used in published statuses
    pub name: String,
    /// Number of player score registers to poll
    pub max_players: u32,
    /// Scores at or below this are logged but never published
    #[serde(default)]
    pub minimum_score: u64,
}

/// Credentials for the notification channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyConfig {
    pub endpoint: String,
    pub token: String,
    #[serde(default = "default_hashtag")]
    pub hashtag: String,
}

/// Serial line settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerialSettings {
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            device: default_device(),
            baud_rate: default_baud_rate(),
        }
    }
}

fn default_device() -> String {
    DEFAULT_DEVICE.to_string()
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_hashtag() -> String {
    DEFAULT_HASHTAG.to_string()
}

impl Config {
    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&content)?;
        debug!(
            "Config: machine={:?}, max_players={}, minimum_score={}, device={}",
            config.machine.name,
            config.machine.max_players,
            config.machine.minimum_score,
            config.serial.device
        );
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.machine.max_players < 1 {
            return Err(Error::Config("maxPlayers must be at least 1.".to_string()));
        }
        if self.machine.max_players > MAX_PLAYERS {
            return Err(Error::Config(format!(
                "maxPlayers must be at most {}.",
                MAX_PLAYERS
            )));
        }
        if self.machine.name.trim().is_empty() {
            return Err(Error::Config("machine name must not be empty".to_string()));
        }
        if self.notify.endpoint.trim().is_empty() {
            return Err(Error::Config("notify endpoint must not be empty".to_string()));
        }
        if self.serial.baud_rate == 0 {
            return Err(Error::Config("baudRate must be positive".to_string()));
        }
        Ok(())
    }
}
