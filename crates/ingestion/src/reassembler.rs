//! Line reassembly over arbitrarily split byte chunks

use bytes::BytesMut;

/// Turns raw chunks into complete `\n`-terminated lines.
///
/// Holds a single carry-over buffer with the fragment after the last newline
/// seen so far. Lines are decoded only once complete, so a multi-byte UTF-8
/// character split across two chunks survives; invalid byte sequences are
/// dropped rather than failing the read.
///
/// `scanned` marks how much of the carry is already known to hold no
/// newline, so each byte is searched once however many chunks a line spans.
#[derive(Debug, Default)]
pub struct LineReassembler {
    carry: BytesMut,
    scanned: usize,
}

impl LineReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completes, in order.
    ///
    /// The terminating `\n` is stripped; any `\r` or surrounding whitespace
    /// is left for the caller to trim.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.carry.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(offset) = self.carry[self.scanned..].iter().position(|&b| b == b'\n') {
            let pos = self.scanned + offset;
            let segment = self.carry.split_to(pos + 1);
            lines.push(decode_lossy(&segment[..pos]));
            self.scanned = 0;
        }
        self.scanned = self.carry.len();
        lines
    }

    /// Bytes currently held in the carry-over buffer
    pub fn pending_len(&self) -> usize {
        self.carry.len()
    }

    /// Take the unterminated fragment, if any, leaving the buffer empty
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.carry.is_empty() {
            return None;
        }
        self.scanned = 0;
        let rest = self.carry.split();
        Some(decode_lossy(&rest))
    }
}

/// Decode UTF-8, skipping invalid sequences
fn decode_lossy(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}
