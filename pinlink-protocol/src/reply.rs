//! Response payloads
//!
//! A device answers each request with a frame that mirrors the request
//! header. The payload is either a single level digit or a short status text:
//! - `'1'` / `'0'`: the pin is (or was driven) high / low
//! - status text: the request could not be carried out
//!
//! Rejected frames are reported in a diagnostic frame addressed to pin 0,
//! since the request header could not be trusted.

use crate::frame::{FrameError, Io, Message, Rw, CMD_OFF, CMD_ON, MAX_PAYLOAD_SIZE, PROTOCOL_VERSION};

/// Write request whose command byte is neither `'1'` nor `'0'`
pub const STATUS_INVALID_DATA: &str = "invalid data";

/// Write request without a command byte
pub const STATUS_NO_DATA: &str = "no data";

/// Request for a pin the device does not expose
pub const STATUS_INVALID_PIN: &str = "invalid pin";

/// A decoded response, as seen by the requester
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply<'a> {
    /// Pin level, true for high
    Level(bool),
    /// Status or error text
    Status(&'a str),
    /// Payload that is not text
    Raw(&'a [u8]),
}

impl<'a> Reply<'a> {
    /// Classify a response payload
    pub fn from_message(msg: &'a Message) -> Self {
        match msg.data() {
            [CMD_ON] => Reply::Level(true),
            [CMD_OFF] => Reply::Level(false),
            data => match msg.data_as_str() {
                Some(text) => Reply::Status(text),
                None => Reply::Raw(data),
            },
        }
    }

    /// True for anything but a level report
    pub fn is_error(&self) -> bool {
        !matches!(self, Reply::Level(_))
    }
}

impl Message {
    /// Response reporting a pin level
    pub fn level_reply(&self, high: bool) -> Message {
        let mut reply = Message::empty(self.version(), self.pin(), self.io(), self.rw());
        // A one-byte payload always fits
        let _ = reply.set_data(&[if high { CMD_ON } else { CMD_OFF }]);
        reply
    }

    /// Response carrying a status text, truncated to the maximum payload
    pub fn status_reply(&self, text: &str) -> Message {
        let mut reply = Message::empty(self.version(), self.pin(), self.io(), self.rw());
        let _ = reply.set_data(truncate(text.as_bytes()));
        reply
    }

    /// Frame reporting that an inbound frame was rejected
    pub fn diagnostic(error: FrameError) -> Message {
        let mut msg = Message::empty(PROTOCOL_VERSION, 0, Io::Input, Rw::Read);
        let _ = msg.set_data(truncate(error.as_str().as_bytes()));
        msg
    }
}

fn truncate(bytes: &[u8]) -> &[u8] {
    &bytes[..bytes.len().min(MAX_PAYLOAD_SIZE)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_reply_mirrors_request() {
        let request = Message::write_request(9, Io::Output, true);
        let reply = request.level_reply(true);

        assert_eq!(reply.pin(), 9);
        assert_eq!(reply.io(), Io::Output);
        assert_eq!(reply.rw(), Rw::Write);
        assert_eq!(reply.data(), b"1");
        assert_eq!(Reply::from_message(&reply), Reply::Level(true));
    }

    #[test]
    fn test_status_reply() {
        let request = Message::write_request(4, Io::Output, true);
        let reply = request.status_reply(STATUS_INVALID_DATA);

        assert_eq!(reply.data_as_str(), Some("invalid data"));
        assert_eq!(reply.length(), 12);
        assert_eq!(Reply::from_message(&reply), Reply::Status("invalid data"));
        assert!(Reply::from_message(&reply).is_error());
    }

    #[test]
    fn test_status_reply_truncates() {
        let request = Message::read_request(1, Io::Input);
        let long = "x".repeat(100);
        let reply = request.status_reply(&long);
        assert_eq!(reply.data().len(), MAX_PAYLOAD_SIZE);
    }

    #[test]
    fn test_diagnostic_frame() {
        let msg = Message::diagnostic(FrameError::InvalidStart);
        assert_eq!(msg.version(), PROTOCOL_VERSION);
        assert_eq!(msg.pin(), 0);
        assert_eq!(msg.io(), Io::Input);
        assert_eq!(msg.rw(), Rw::Read);
        assert_eq!(Reply::from_message(&msg), Reply::Status("invalid STX"));
    }

    #[test]
    fn test_raw_reply() {
        let msg = Message::new(1, 0, Io::Input, Rw::Read, &[0xFF, 0xFE]).unwrap();
        assert_eq!(Reply::from_message(&msg), Reply::Raw(&[0xFF, 0xFE]));
    }
}
