//! Serial communication with the machine's communication patch.
//!
//! - **Port**: byte-level device access ([`SerialIo`], [`DevicePort`])
//! - **Link**: command/response exchange with echo suppression and drain
//! - **Firmware**: version handshake parsing

mod firmware;
mod link;
mod port;

#[cfg(test)]
pub mod mock;

pub use firmware::FirmwareVersion;
pub use link::{LinkTimings, SerialLink};
pub use port::{DevicePort, SerialIo};

#[cfg(test)]
pub use mock::MockPort;
