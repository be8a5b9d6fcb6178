use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::config::protocol::VERSION_COMMAND;
use crate::config::timing::{ECHO_PAUSE, READ_TIMEOUT};
use crate::error::{Error, Result};

use super::{FirmwareVersion, SerialIo};

/// Timing parameters for a request/response exchange
#[derive(Debug, Clone, Copy)]
pub struct LinkTimings {
    /// Deadline for a response, measured from the end of the write
    pub read_timeout: Duration,
    /// Pause before reading again after the device echoed the command
    pub echo_pause: Duration,
}

impl Default for LinkTimings {
    fn default() -> Self {
        Self {
            read_timeout: READ_TIMEOUT,
            echo_pause: ECHO_PAUSE,
        }
    }
}

/// Line-oriented request/response exchange over an echoing serial device.
pub struct SerialLink<P> {
    port: P,
    timings: LinkTimings,
}

impl<P: SerialIo> SerialLink<P> {
    pub fn new(port: P) -> Self {
        Self::with_timings(port, LinkTimings::default())
    }

    pub fn with_timings(port: P, timings: LinkTimings) -> Self {
        Self { port, timings }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Send `message` (if any) and return the device's reply line.
    ///
    /// A reply that equals the command is the device echoing it back and is
    /// skipped. Anything still buffered after the reply is discarded so it
    /// cannot be mistaken for the answer to the next command.
    ///
    /// A timeout is not an error: the reply is whatever arrived before the
    /// deadline, possibly empty. Only hard I/O failures are returned as `Err`.
    pub fn query(&mut self, message: Option<&str>) -> Result<String> {
        let message = message.filter(|m| !m.is_empty());

        if let Some(message) = message {
            let mut line = Vec::with_capacity(message.len() + 1);
            line.extend_from_slice(message.as_bytes());
            line.push(b'\n');
            self.port.write_blocking(&line)?;
            trace!("TX: {}", message);
        }

        let deadline = Instant::now() + self.timings.read_timeout;
        let mut response = self.read_line(deadline)?;

        if let Some(message) = message {
            while response == message {
                if Instant::now() >= deadline {
                    debug!("Only the echo of {:?} arrived before the deadline", message);
                    response.clear();
                    break;
                }
                trace!("Echo of {:?} received, reading again", message);
                thread::sleep(self.timings.echo_pause);
                response = self.read_line(deadline)?;
            }
        }

        self.drain()?;

        trace!("RX: {}", response);
        Ok(response)
    }

    /// Query the firmware version and refuse to continue on old patches.
    pub fn handshake(&mut self) -> Result<FirmwareVersion> {
        let reply = self.query(Some(VERSION_COMMAND))?;
        let minimum = FirmwareVersion::minimum();

        match FirmwareVersion::parse(&reply) {
            Some(version) if version.is_supported() => {
                info!("Communication patch v{}", version);
                Ok(version)
            }
            Some(version) => Err(Error::IncompatibleFirmware {
                required: minimum.to_string(),
                found: version.to_string(),
            }),
            None => Err(Error::IncompatibleFirmware {
                required: minimum.to_string(),
                found: if reply.is_empty() {
                    "no reply".to_string()
                } else {
                    format!("{:?}", reply)
                },
            }),
        }
    }

    /// Accumulate bytes until a newline arrives or `deadline` passes.
    fn read_line(&mut self, deadline: Instant) -> Result<String> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            if self.port.read_nonblocking(&mut byte)? == 1 {
                line.push(byte[0]);
                if byte[0] == b'\n' {
                    break;
                }
            }
            if Instant::now() >= deadline {
                if !line.is_empty() {
                    debug!("Read deadline reached with partial line ({} bytes)", line.len());
                }
                break;
            }
        }

        Ok(trim_response(&line))
    }

    /// Discard input until a read comes back empty.
    fn drain(&mut self) -> Result<usize> {
        let deadline = Instant::now() + self.timings.read_timeout;
        let mut buf = [0u8; 64];
        let mut discarded = 0;

        loop {
            let count = self.port.read_nonblocking(&mut buf)?;
            if count == 0 {
                break;
            }
            discarded += count;
            if Instant::now() >= deadline {
                warn!("Serial input still arriving after drain deadline");
                break;
            }
        }

        if discarded > 0 {
            debug!("Drained {} stale bytes", discarded);
        }
        Ok(discarded)
    }
}

fn trim_response(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_matches(|c: char| c.is_whitespace() || c.is_control())
        .to_string()
}
