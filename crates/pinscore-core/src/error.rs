use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not open serial device {device}: {message}")]
    SerialOpen { device: String, message: String },

    #[error("Communication patch v{required} or later must be installed (found: {found})")]
    IncompatibleFirmware { required: String, found: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Notification failed: {0}")]
    Notify(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
