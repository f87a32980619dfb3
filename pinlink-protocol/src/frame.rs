//! Message encoding and decoding.
//!
//! Frame format:
//! - STX (1 byte): 0x02 start marker
//! - HEADER 1 (1 byte): version in bits 7-5, pin in bits 4-0
//! - HEADER 2 (1 byte): io in bit 7, rw in bit 6, length in bits 5-0
//! - DATA (0-63 bytes): `length` raw bytes
//! - CHECKSUM (1 byte): sum mod 256 of version, pin, io, rw, length and data
//! - ETX (1 byte): 0x03 end marker
//!
//! Header fields wider than their slot are masked, never rejected. A pin
//! number of 33 goes out on the wire as pin 1.

use core::fmt;

use heapless::Vec;

/// Frame start marker
pub const START_MARKER: u8 = 0x02;

/// Frame end marker
pub const END_MARKER: u8 = 0x03;

/// Current protocol revision
pub const PROTOCOL_VERSION: u8 = 1;

/// Maximum payload size in bytes (6-bit length field)
pub const MAX_PAYLOAD_SIZE: usize = 63;

/// Bytes in every frame besides the payload (STX + 2 header + CHECKSUM + ETX)
pub const FRAME_OVERHEAD: usize = 5;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = FRAME_OVERHEAD + MAX_PAYLOAD_SIZE;

/// Shortest buffer `Message::decode` will look inside
pub const MIN_FRAME_SIZE: usize = 4;

/// Write payload that drives a pin high, also the "high" level report
pub const CMD_ON: u8 = b'1';

/// Write payload that drives a pin low, also the "low" level report
pub const CMD_OFF: u8 = b'0';

// Header byte 1
const VERSION_MASK: u8 = 0xE0;
const VERSION_SHIFT: u8 = 5;
const PIN_MASK: u8 = 0x1F;

// Header byte 2
const IO_MASK: u8 = 0x80;
const IO_SHIFT: u8 = 7;
const RW_MASK: u8 = 0x40;
const RW_SHIFT: u8 = 6;
const LENGTH_MASK: u8 = 0x3F;

/// Errors that can occur while decoding or encoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Buffer is shorter than the minimum frame or than its header declares
    FrameTooShort,
    /// First byte is not the start marker
    InvalidStart,
    /// Last byte is not the end marker
    InvalidEnd,
    /// Transmitted checksum differs from the recomputed one
    ChecksumMismatch,
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

impl FrameError {
    /// Short human-readable description, also sent back over the link
    /// when the device reports a rejected frame.
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameError::FrameTooShort => "message too short",
            FrameError::InvalidStart => "invalid STX",
            FrameError::InvalidEnd => "invalid ETX",
            FrameError::ChecksumMismatch => "checksum mismatch",
            FrameError::PayloadTooLarge => "payload too large",
            FrameError::BufferTooSmall => "buffer too small",
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pin direction declared by a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Io {
    Input = 0,
    Output = 1,
}

impl Io {
    fn from_bit(bit: u8) -> Self {
        if bit & 1 == 0 {
            Io::Input
        } else {
            Io::Output
        }
    }
}

/// Operation requested by a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Rw {
    Read = 0,
    Write = 1,
}

impl Rw {
    fn from_bit(bit: u8) -> Self {
        if bit & 1 == 0 {
            Rw::Read
        } else {
            Rw::Write
        }
    }
}

/// A request or response, as carried by one frame.
///
/// The payload length is always `data().len()`; there is no separate
/// length field to drift out of sync. The checksum is derived on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    version: u8,
    pin: u8,
    io: Io,
    rw: Rw,
    data: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Message {
    /// Create a message with the given header fields and payload.
    ///
    /// `version` and `pin` are masked to 3 and 5 bits.
    pub fn new(version: u8, pin: u8, io: Io, rw: Rw, data: &[u8]) -> Result<Self, FrameError> {
        let data = Vec::from_slice(data).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self {
            data,
            ..Self::empty(version, pin, io, rw)
        })
    }

    /// Create a message with no payload
    pub fn empty(version: u8, pin: u8, io: Io, rw: Rw) -> Self {
        Self {
            version: version & (VERSION_MASK >> VERSION_SHIFT),
            pin: pin & PIN_MASK,
            io,
            rw,
            data: Vec::new(),
        }
    }

    /// Request the current level of `pin`
    pub fn read_request(pin: u8, io: Io) -> Self {
        Self::empty(PROTOCOL_VERSION, pin, io, Rw::Read)
    }

    /// Request that `pin` be driven high or low
    pub fn write_request(pin: u8, io: Io, high: bool) -> Self {
        let mut msg = Self::empty(PROTOCOL_VERSION, pin, io, Rw::Write);
        // A one-byte payload always fits
        let _ = msg.data.push(if high { CMD_ON } else { CMD_OFF });
        msg
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn io(&self) -> Io {
        self.io
    }

    pub fn rw(&self) -> Rw {
        self.rw
    }

    /// Payload length as carried in the 6-bit length field
    pub fn length(&self) -> u8 {
        self.data.len() as u8
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload as text, if it is valid UTF-8
    pub fn data_as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.data).ok()
    }

    /// Checksum over the unpacked header fields and payload
    pub fn checksum(&self) -> u8 {
        calculate_checksum(self.version, self.pin, self.io, self.rw, &self.data)
    }

    /// Copy of this message's header with a different payload.
    ///
    /// Responses are built this way so they carry the requester's
    /// version, pin, io and rw back to it.
    pub fn with_data(&self, data: &[u8]) -> Result<Self, FrameError> {
        Self::new(self.version, self.pin, self.io, self.rw, data)
    }

    pub(crate) fn set_data(&mut self, data: &[u8]) -> Result<(), FrameError> {
        self.data = Vec::from_slice(data).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(())
    }

    /// Number of bytes `encode` writes for this message
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.data.len()
    }

    /// Encode this message into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let data_end = 3 + self.data.len();
        buffer[0] = START_MARKER;
        buffer[1] = (self.version << VERSION_SHIFT) | (self.pin & PIN_MASK);
        buffer[2] = ((self.io as u8) << IO_SHIFT)
            | ((self.rw as u8) << RW_SHIFT)
            | (self.length() & LENGTH_MASK);
        buffer[3..data_end].copy_from_slice(&self.data);
        buffer[data_end] = self.checksum();
        buffer[data_end + 1] = END_MARKER;

        Ok(frame_len)
    }

    /// Encode this message into a heapless Vec
    pub fn encode_to_vec(&self) -> Vec<u8, MAX_FRAME_SIZE> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        // MAX_FRAME_SIZE holds any message, so neither step can fail
        let len = self.encode(&mut buffer).unwrap_or(0);
        let mut vec = Vec::new();
        let _ = vec.extend_from_slice(&buffer[..len]);
        vec
    }

    /// Decode a complete frame, markers included
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < MIN_FRAME_SIZE {
            return Err(FrameError::FrameTooShort);
        }
        if bytes[0] != START_MARKER {
            return Err(FrameError::InvalidStart);
        }

        // The header must not promise more data than the buffer holds
        let length = declared_length(bytes[2]);
        let data_end = 3 + length;
        if bytes.len() < data_end + 2 {
            return Err(FrameError::FrameTooShort);
        }
        if bytes[bytes.len() - 1] != END_MARKER {
            return Err(FrameError::InvalidEnd);
        }

        let version = (bytes[1] & VERSION_MASK) >> VERSION_SHIFT;
        let pin = bytes[1] & PIN_MASK;
        let io = Io::from_bit((bytes[2] & IO_MASK) >> IO_SHIFT);
        let rw = Rw::from_bit((bytes[2] & RW_MASK) >> RW_SHIFT);

        let data = &bytes[3..data_end];
        let transmitted = bytes[data_end];
        if transmitted != calculate_checksum(version, pin, io, rw, data) {
            return Err(FrameError::ChecksumMismatch);
        }

        Self::new(version, pin, io, rw, data)
    }
}

/// Payload length declared by a second header byte
pub(crate) fn declared_length(header2: u8) -> usize {
    (header2 & LENGTH_MASK) as usize
}

fn calculate_checksum(version: u8, pin: u8, io: Io, rw: Rw, data: &[u8]) -> u8 {
    let length = data.len() as u8;
    let header = version
        .wrapping_add(pin)
        .wrapping_add(io as u8)
        .wrapping_add(rw as u8)
        .wrapping_add(length);
    data.iter().fold(header, |sum, &b| sum.wrapping_add(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_read_request() {
        let msg = Message::empty(1, 5, Io::Output, Rw::Read);
        assert_eq!(msg.encode_to_vec().as_slice(), &[0x02, 0x25, 0x80, 0x07, 0x03]);
    }

    #[test]
    fn test_encode_write_on() {
        let msg = Message::write_request(0, Io::Output, true);
        assert_eq!(
            msg.encode_to_vec().as_slice(),
            &[0x02, 0x20, 0xC1, 0x31, 0x35, 0x03]
        );
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let msg = Message::write_request(3, Io::Output, false);
        let mut buffer = [0u8; 5];
        assert_eq!(msg.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_oversized_fields_are_masked() {
        let msg = Message::empty(9, 37, Io::Input, Rw::Read);
        assert_eq!(msg.version(), 1);
        assert_eq!(msg.pin(), 5);

        let decoded = Message::decode(&msg.encode_to_vec()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_payload_too_large() {
        let large_payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        let result = Message::new(1, 0, Io::Output, Rw::Write, &large_payload);
        assert_eq!(result, Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_decode_write_on() {
        let msg = Message::decode(&[0x02, 0x20, 0xC1, 0x31, 0x35, 0x03]).unwrap();
        assert_eq!(msg.version(), 1);
        assert_eq!(msg.pin(), 0);
        assert_eq!(msg.io(), Io::Output);
        assert_eq!(msg.rw(), Rw::Write);
        assert_eq!(msg.length(), 1);
        assert_eq!(msg.data(), b"1");
        assert_eq!(msg.checksum(), 0x35);
    }

    #[test]
    fn test_decode_all_zero() {
        assert_eq!(
            Message::decode(&[0x00, 0x00, 0x00, 0x00]),
            Err(FrameError::InvalidStart)
        );
    }

    #[test]
    fn test_decode_too_short() {
        assert_eq!(Message::decode(&[]), Err(FrameError::FrameTooShort));
        assert_eq!(
            Message::decode(&[0x02, 0x20, 0x03]),
            Err(FrameError::FrameTooShort)
        );
    }

    #[test]
    fn test_decode_declared_length_exceeds_buffer() {
        // length=2, one data byte, then checksum and ETX
        let frame = [0x02, 0x20, 0xC2, 0x31, 0x35, 0x03];
        assert_eq!(Message::decode(&frame), Err(FrameError::FrameTooShort));

        // length=63 in a minimum-size buffer
        assert_eq!(
            Message::decode(&[0x02, 0x20, 0x3F, 0x03]),
            Err(FrameError::FrameTooShort)
        );
    }

    #[test]
    fn test_decode_missing_trailer_is_too_short() {
        // length=2 declared, checksum and ETX never arrived
        assert_eq!(
            Message::decode(&[0x02, 0x20, 0xC2, 0x31]),
            Err(FrameError::FrameTooShort)
        );
    }

    #[test]
    fn test_decode_invalid_end() {
        let frame = [0x02, 0x25, 0x80, 0x07, 0x04];
        assert_eq!(Message::decode(&frame), Err(FrameError::InvalidEnd));
    }

    #[test]
    fn test_decode_checksum_mismatch() {
        let frame = [0x02, 0x25, 0x80, 0x08, 0x03];
        assert_eq!(Message::decode(&frame), Err(FrameError::ChecksumMismatch));
    }

    #[test]
    fn test_end_marker_inside_payload() {
        let msg = Message::new(1, 4, Io::Output, Rw::Write, &[END_MARKER, END_MARKER]).unwrap();
        let decoded = Message::decode(&msg.encode_to_vec()).unwrap();
        assert_eq!(decoded.data(), &[END_MARKER, END_MARKER]);
    }

    #[test]
    fn test_with_data_mirrors_header() {
        let request = Message::read_request(12, Io::Input);
        let response = request.with_data(b"1").unwrap();
        assert_eq!(response.version(), request.version());
        assert_eq!(response.pin(), 12);
        assert_eq!(response.io(), Io::Input);
        assert_eq!(response.rw(), Rw::Read);
        assert_eq!(response.data(), b"1");
    }

    #[test]
    fn test_error_text() {
        assert_eq!(FrameError::ChecksumMismatch.as_str(), "checksum mismatch");
        assert_eq!(FrameError::FrameTooShort.as_str(), "message too short");
    }

    fn arb_message() -> impl Strategy<Value = Message> {
        (
            0u8..8,
            0u8..32,
            any::<bool>(),
            any::<bool>(),
            prop::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE),
        )
            .prop_map(|(version, pin, output, write, data)| {
                let io = if output { Io::Output } else { Io::Input };
                let rw = if write { Rw::Write } else { Rw::Read };
                Message::new(version, pin, io, rw, &data).unwrap()
            })
    }

    proptest! {
        #[test]
        fn prop_roundtrip(msg in arb_message()) {
            let encoded = msg.encode_to_vec();
            prop_assert_eq!(encoded.len(), msg.encoded_len());
            let decoded = Message::decode(&encoded).unwrap();
            prop_assert_eq!(decoded.checksum(), encoded[encoded.len() - 2]);
            prop_assert_eq!(decoded, msg);
        }

        #[test]
        fn prop_single_bit_flip_detected(msg in arb_message(), index in any::<prop::sample::Index>(), bit in 0u8..8) {
            let mut encoded = msg.encode_to_vec();
            // Anything between the markers
            let target = 1 + index.index(encoded.len() - 2);
            encoded[target] ^= 1 << bit;

            let result = Message::decode(&encoded);
            let length_bit = target == 2 && bit < 6;
            if length_bit {
                // The data window moves, so only "not the original" is guaranteed
                prop_assert_ne!(result, Ok(msg));
            } else {
                prop_assert_eq!(result, Err(FrameError::ChecksumMismatch));
            }
        }

        #[test]
        fn prop_truncated_frame_is_too_short(msg in arb_message(), cut in 1usize..=MAX_PAYLOAD_SIZE) {
            prop_assume!(msg.length() > 0);
            let encoded = msg.encode_to_vec();
            let cut = cut.min(msg.data().len());
            // Drop `cut` data bytes but keep the checksum and ETX at the tail
            let mut truncated: std::vec::Vec<u8> = encoded[..3 + msg.data().len() - cut].to_vec();
            truncated.extend_from_slice(&encoded[encoded.len() - 2..]);

            prop_assert_eq!(Message::decode(&truncated), Err(FrameError::FrameTooShort));
        }

        #[test]
        fn prop_frame_cut_short_is_too_short(msg in arb_message(), index in any::<prop::sample::Index>()) {
            let encoded = msg.encode_to_vec();
            let keep = MIN_FRAME_SIZE + index.index(encoded.len() - MIN_FRAME_SIZE);
            // Any prefix of at least four bytes, trailer dropped
            prop_assert_eq!(Message::decode(&encoded[..keep]), Err(FrameError::FrameTooShort));
        }

        #[test]
        fn prop_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..80)) {
            let _ = Message::decode(&bytes);
        }
    }
}
