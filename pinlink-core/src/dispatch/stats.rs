//! Link health counters

use pinlink_protocol::FrameError;

/// Counters kept by the dispatcher
///
/// All counters saturate instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Valid requests executed
    pub requests: u32,
    /// Valid requests answered with a status text instead of a level
    pub failed_requests: u32,
    /// Frames rejected as too short
    pub too_short: u32,
    /// Frames rejected for a bad start marker
    pub invalid_start: u32,
    /// Frames rejected for a bad end marker
    pub invalid_end: u32,
    /// Frames rejected for a checksum mismatch
    pub checksum_mismatch: u32,
    /// Partial frames dropped by the idle timeout
    pub timeouts: u32,
    /// Replies abandoned because the transport refused them
    pub write_failures: u32,
    /// Transport read errors
    pub read_errors: u32,
}

impl LinkStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a rejected frame under its error kind
    pub fn record_decode_error(&mut self, error: FrameError) {
        let counter = match error {
            FrameError::FrameTooShort => &mut self.too_short,
            FrameError::InvalidStart => &mut self.invalid_start,
            FrameError::InvalidEnd => &mut self.invalid_end,
            FrameError::ChecksumMismatch => &mut self.checksum_mismatch,
            // Encoding-side errors never come out of the assembler
            FrameError::PayloadTooLarge | FrameError::BufferTooSmall => return,
        };
        *counter = counter.saturating_add(1);
    }

    /// Total frames rejected at decode time
    pub fn decode_errors(&self) -> u32 {
        self.too_short
            .saturating_add(self.invalid_start)
            .saturating_add(self.invalid_end)
            .saturating_add(self.checksum_mismatch)
    }

    /// Check if no error of any kind has been seen
    pub fn is_clean(&self) -> bool {
        self.decode_errors() == 0
            && self.failed_requests == 0
            && self.timeouts == 0
            && self.write_failures == 0
            && self.read_errors == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_decode_errors() {
        let mut stats = LinkStats::new();
        assert!(stats.is_clean());

        stats.record_decode_error(FrameError::ChecksumMismatch);
        stats.record_decode_error(FrameError::ChecksumMismatch);
        stats.record_decode_error(FrameError::InvalidEnd);

        assert_eq!(stats.checksum_mismatch, 2);
        assert_eq!(stats.invalid_end, 1);
        assert_eq!(stats.decode_errors(), 3);
        assert!(!stats.is_clean());
    }

    #[test]
    fn test_counters_saturate() {
        let mut stats = LinkStats {
            too_short: u32::MAX,
            ..LinkStats::default()
        };
        stats.record_decode_error(FrameError::FrameTooShort);
        assert_eq!(stats.too_short, u32::MAX);
        assert_eq!(stats.decode_errors(), u32::MAX);
    }
}
