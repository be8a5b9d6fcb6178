use std::fmt;

use crate::config::protocol::MIN_FIRMWARE;

/// Communication patch version reported by `zc ver`.
///
/// The minor part is kept in hundredths so `1.2` compares above `1.18`,
/// the same as a decimal comparison would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FirmwareVersion {
    pub major: u32,
    pub minor: u32,
}

impl FirmwareVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Oldest version this tool can talk to
    pub const fn minimum() -> Self {
        Self::new(MIN_FIRMWARE.0, MIN_FIRMWARE.1)
    }

    /// Find the first `<digits>.<1-2 digits>` token in a version reply
    pub fn parse(reply: &str) -> Option<Self> {
        let bytes = reply.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            if !bytes[pos].is_ascii_digit() {
                pos += 1;
                continue;
            }

            let major_end = digit_run_end(bytes, pos);
            let has_fraction = bytes.get(major_end) == Some(&b'.')
                && bytes.get(major_end + 1).is_some_and(u8::is_ascii_digit);

            if has_fraction {
                let minor_start = major_end + 1;
                let minor_end = digit_run_end(bytes, minor_start).min(minor_start + 2);
                let major = reply[pos..major_end].parse().ok()?;
                let minor_digits = &reply[minor_start..minor_end];
                let mut minor: u32 = minor_digits.parse().ok()?;
                if minor_digits.len() == 1 {
                    minor *= 10;
                }
                return Some(Self { major, minor });
            }

            pos = major_end;
        }

        None
    }

    pub fn is_supported(&self) -> bool {
        *self >= Self::minimum()
    }
}

fn digit_run_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |offset| start + offset)
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}
