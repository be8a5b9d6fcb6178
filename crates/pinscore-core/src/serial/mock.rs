//! Scripted serial port for testing.

use std::collections::VecDeque;
use std::io;

use super::SerialIo;

/// A serial port that answers each written command with the next scripted reply.
///
/// Replies are raw bytes, so a test can include the device's echo, partial
/// lines, or trailing noise exactly as the wire would deliver them.
#[derive(Debug, Default)]
pub struct MockPort {
    replies: VecDeque<Vec<u8>>,
    pending: VecDeque<u8>,
    written: Vec<String>,
    fail_reads: bool,
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the bytes delivered after the next write
    pub fn reply(mut self, bytes: &str) -> Self {
        self.replies.push_back(bytes.as_bytes().to_vec());
        self
    }

    /// Bytes already waiting before any command is sent
    pub fn with_pending(mut self, bytes: &str) -> Self {
        self.pending.extend(bytes.as_bytes());
        self
    }

    /// Make every read fail with a hard I/O error
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Lines written so far, without their terminator
    pub fn written(&self) -> &[String] {
        &self.written
    }

    /// Number of unread bytes still buffered
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl SerialIo for MockPort {
    fn write_blocking(&mut self, data: &[u8]) -> io::Result<()> {
        let line = String::from_utf8_lossy(data);
        self.written.push(line.trim_end_matches('\n').to_string());
        if let Some(reply) = self.replies.pop_front() {
            self.pending.extend(reply);
        }
        Ok(())
    }

    fn read_nonblocking(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail_reads {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        let mut count = 0;
        while count < buf.len() {
            match self.pending.pop_front() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}
