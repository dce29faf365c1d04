//! Pkt-line framing
//!
//! Each packet starts with a 4-character hexadecimal length that includes
//! the length prefix itself; `0000` is a flush marker carrying no payload.
//! Parsing is done over a bounds-checked scanner so truncated input fails
//! explicitly instead of panicking on a slice index.

use crate::errors::GitError;
use bytes::Bytes;

/// Size of the hexadecimal length prefix
const LENGTH_PREFIX: usize = 4;

/// The `0000` flush marker
pub const FLUSH_PACKET: &[u8] = b"0000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// `0000` delimiter, no payload
    Flush,
    /// A length-prefixed payload
    Data(Bytes),
}

/// Frame a payload as a single pkt-line
pub fn data_packet(payload: &[u8]) -> Vec<u8> {
    let mut packet = format!("{:04x}", payload.len() + LENGTH_PREFIX).into_bytes();
    packet.extend_from_slice(payload);
    packet
}

/// Parse a buffer into its sequence of packets
pub fn parse(buffer: &[u8]) -> anyhow::Result<Vec<Packet>> {
    let mut scanner = Scanner::new(buffer);
    let mut packets = Vec::new();

    while !scanner.is_at_end() {
        let length = scanner.read_length()?;

        if length == 0 {
            packets.push(Packet::Flush);
            continue;
        }
        if length < LENGTH_PREFIX {
            return Err(GitError::TransportFailure(format!(
                "pkt-line length {length} is shorter than its own prefix"
            ))
            .into());
        }

        let payload = scanner.take(length - LENGTH_PREFIX)?;
        packets.push(Packet::Data(Bytes::copy_from_slice(payload)));
    }

    Ok(packets)
}

/// Bounds-checked cursor over the raw response buffer
struct Scanner<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Scanner<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Scanner { buffer, offset: 0 }
    }

    fn is_at_end(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    fn take(&mut self, count: usize) -> anyhow::Result<&'a [u8]> {
        let end = self.offset.checked_add(count).filter(|end| *end <= self.buffer.len());
        let end = end.ok_or_else(|| {
            GitError::TransportFailure(format!(
                "truncated pkt-line stream: wanted {count} bytes at offset {}",
                self.offset
            ))
        })?;

        let bytes = &self.buffer[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn read_length(&mut self) -> anyhow::Result<usize> {
        let prefix = self.take(LENGTH_PREFIX)?;
        let prefix = std::str::from_utf8(prefix)
            .ok()
            .and_then(|hex| usize::from_str_radix(hex, 16).ok())
            .ok_or_else(|| {
                GitError::TransportFailure(format!(
                    "invalid pkt-line length prefix: {:?}",
                    String::from_utf8_lossy(prefix)
                ))
            })?;

        Ok(prefix)
    }
}
