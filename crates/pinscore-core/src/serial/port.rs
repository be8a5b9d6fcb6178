use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info, warn};

use crate::config::SerialSettings;
use crate::config::timing::READ_TIMEOUT;
use crate::error::{Error, Result};

/// Read timeout used while polling for incoming bytes.
///
/// Kept as short as the driver allows so a read with nothing pending returns
/// almost immediately.
const READ_POLL_TIMEOUT: Duration = Duration::from_millis(1);

/// Byte-level access to a serial line.
///
/// `SerialLink` only talks to the device through this trait, which lets the
/// protocol logic run against a scripted port in tests.
pub trait SerialIo {
    /// Write all of `data`, blocking until the device has accepted it.
    fn write_blocking(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read whatever is pending without waiting for more.
    ///
    /// Returns `Ok(0)` when nothing has arrived; that is not an error.
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Write,
    Read,
}

/// A real serial device opened through the `serialport` crate.
///
/// The port is configured 8-N-1 without flow control; on Unix the crate puts
/// the TTY in raw mode with the receiver enabled and modem control lines
/// ignored. The handle is closed when the value is dropped.
pub struct DevicePort {
    port: Box<dyn SerialPort>,
    device: String,
    mode: Mode,
}

impl DevicePort {
    /// Open and configure the device described by `settings`
    pub fn open(settings: &SerialSettings) -> Result<Self> {
        let port = serialport::new(&settings.device, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_POLL_TIMEOUT)
            .open()
            .map_err(|e| Error::SerialOpen {
                device: settings.device.clone(),
                message: e.to_string(),
            })?;

        // Bytes left over from before we opened the device are meaningless
        if let Err(e) = port.clear(ClearBuffer::All) {
            debug!("Could not clear {} buffers: {}", settings.device, e);
        }

        info!(
            "Opened serial device {} at {} baud",
            settings.device, settings.baud_rate
        );

        Ok(Self {
            port,
            device: settings.device.clone(),
            mode: Mode::Read,
        })
    }

    /// Device path this port was opened from
    pub fn device(&self) -> &str {
        &self.device
    }

    fn switch_mode(&mut self, mode: Mode) -> io::Result<()> {
        if self.mode == mode {
            return Ok(());
        }
        let timeout = match mode {
            Mode::Write => READ_TIMEOUT,
            Mode::Read => READ_POLL_TIMEOUT,
        };
        self.port.set_timeout(timeout).map_err(io::Error::from)?;
        self.mode = mode;
        Ok(())
    }
}

impl SerialIo for DevicePort {
    fn write_blocking(&mut self, data: &[u8]) -> io::Result<()> {
        self.switch_mode(Mode::Write)?;
        self.port.write_all(data)?;
        self.port.flush()
    }

    fn read_nonblocking(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.switch_mode(Mode::Read)?;
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }
}

impl Drop for DevicePort {
    fn drop(&mut self) {
        if let Err(e) = self.port.flush() {
            warn!("Failed to flush {} on close: {}", self.device, e);
        }
        debug!("Closed serial device {}", self.device);
    }
}
