//! Byte-at-a-time frame assembly.
//!
//! The assembler scans for the start marker, then uses the declared length
//! in the second header byte to collect exactly `length` data bytes plus the
//! checksum before taking the next byte as the end marker. Data bytes that
//! happen to equal the end marker therefore never cut a frame short.

use heapless::Vec;

use crate::frame::{declared_length, FrameError, Message, MAX_FRAME_SIZE, START_MARKER};

/// State machine for assembling incoming frames
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    state: AssembleState,
    buffer: Vec<u8, MAX_FRAME_SIZE>,
    /// Data and checksum bytes still expected in `ReadingBody`
    remaining: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AssembleState {
    /// Waiting for START marker
    Scanning,
    /// Got START, reading the two header bytes
    ReadingHeader,
    /// Reading data bytes and the checksum
    ReadingBody,
    /// Waiting for the END marker
    WaitingForEnd,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self {
            state: AssembleState::Scanning,
            buffer: Vec::new(),
            remaining: 0,
        }
    }

    /// Drop any partial frame and go back to scanning
    pub fn reset(&mut self) {
        self.state = AssembleState::Scanning;
        self.buffer.clear();
        self.remaining = 0;
    }

    pub fn state(&self) -> AssembleState {
        self.state
    }

    /// True while a frame has been started but not completed
    pub fn in_progress(&self) -> bool {
        self.state != AssembleState::Scanning
    }

    /// Bytes of the current partial frame
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Feed a single byte to the assembler
    ///
    /// Returns `Ok(Some(message))` when a complete valid frame is decoded,
    /// `Ok(None)` when more bytes are needed, or `Err` when a complete frame
    /// was rejected. The assembler is back to scanning after either of the
    /// last two outcomes.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Message>, FrameError> {
        match self.state {
            AssembleState::Scanning => {
                if byte == START_MARKER {
                    self.push(byte);
                    self.state = AssembleState::ReadingHeader;
                }
                // Silently ignore non-START bytes while scanning
                Ok(None)
            }
            AssembleState::ReadingHeader => {
                self.push(byte);
                if self.buffer.len() == 3 {
                    self.remaining = declared_length(byte) + 1;
                    self.state = AssembleState::ReadingBody;
                }
                Ok(None)
            }
            AssembleState::ReadingBody => {
                self.push(byte);
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.state = AssembleState::WaitingForEnd;
                }
                Ok(None)
            }
            AssembleState::WaitingForEnd => {
                self.push(byte);
                let result = Message::decode(&self.buffer);
                self.reset();
                result.map(Some)
            }
        }
    }

    /// Feed multiple bytes to the assembler
    ///
    /// Returns the first completed frame, valid or not.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Message>, FrameError> {
        for &byte in bytes {
            if let Some(msg) = self.feed(byte)? {
                return Ok(Some(msg));
            }
        }
        Ok(None)
    }

    fn push(&mut self, byte: u8) {
        // The length field caps a frame at MAX_FRAME_SIZE, so this never fails
        let _ = self.buffer.push(byte);
    }
}
