//! Request dispatcher

use heapless::Vec;
use pinlink_hal::{FailureSignal, GpioBank, PinDirection, UartRx, UartTx};
use pinlink_protocol::{
    FrameAssembler, FrameError, Io, Message, Rw, CMD_OFF, CMD_ON, MAX_FRAME_SIZE,
    STATUS_INVALID_DATA, STATUS_INVALID_PIN, STATUS_NO_DATA,
};

use super::stats::LinkStats;
use crate::config::LinkConfig;

/// Largest reply on the wire: one frame plus the line terminator
pub const MAX_REPLY_SIZE: usize = MAX_FRAME_SIZE + 1;

const LINE_TERMINATOR: u8 = b'\n';

/// Transport failure seen while polling the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<R, W> {
    /// The receiver reported an error; the byte was dropped
    Read(R),
    /// The transmitter refused a reply; the reply was abandoned
    Write(W),
}

/// Device-side request dispatcher
///
/// Owns the GPIO bank and the failure signal for its whole lifetime, so
/// nothing else can touch the pins it serves.
pub struct Dispatcher<G, S> {
    gpio: G,
    signal: S,
    config: LinkConfig,
    assembler: FrameAssembler,
    stats: LinkStats,
}

impl<G: GpioBank, S: FailureSignal> Dispatcher<G, S> {
    pub fn new(gpio: G, signal: S, config: LinkConfig) -> Self {
        Self {
            gpio,
            signal,
            config,
            assembler: FrameAssembler::new(),
            stats: LinkStats::new(),
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    /// True while a frame has been started but not completed
    pub fn is_assembling(&self) -> bool {
        self.assembler.in_progress()
    }

    /// Give the hardware back
    pub fn release(self) -> (G, S) {
        (self.gpio, self.signal)
    }

    /// Process one received byte
    ///
    /// Returns the reply to send when the byte completed a frame. Rejected
    /// frames produce a diagnostic reply only when `report_decode_errors`
    /// is set.
    pub fn on_byte(&mut self, byte: u8) -> Option<Message> {
        match self.assembler.feed(byte) {
            Ok(None) => None,
            Ok(Some(request)) => Some(self.execute(&request)),
            Err(error) => self.reject_frame(error),
        }
    }

    /// Handle the outcome of one receive attempt
    ///
    /// `Ok(None)` means the idle window elapsed without a byte. Receive
    /// errors are counted and handed back; the stream continues either way.
    pub fn on_received<E>(
        &mut self,
        received: Result<Option<u8>, E>,
    ) -> Result<Option<Message>, E> {
        match received {
            Ok(Some(byte)) => Ok(self.on_byte(byte)),
            Ok(None) => {
                self.on_idle_timeout();
                Ok(None)
            }
            Err(e) => {
                self.on_read_error();
                Err(e)
            }
        }
    }

    /// The line stayed idle for `idle_timeout_ms`
    ///
    /// Drops a partial frame so the next start marker is seen. A timeout
    /// while scanning is not an error.
    pub fn on_idle_timeout(&mut self) {
        if !self.assembler.in_progress() {
            return;
        }
        warn!(
            "Dropping partial frame after idle timeout ({} bytes)",
            self.assembler.buffered().len()
        );
        self.assembler.reset();
        self.stats.timeouts = self.stats.timeouts.saturating_add(1);
        self.signal.signal_error();
        debug!("Link stats: {}", self.stats);
    }

    /// The transport refused a reply
    pub fn on_write_failed(&mut self) {
        warn!("Reply abandoned, transport write failed");
        self.stats.write_failures = self.stats.write_failures.saturating_add(1);
        self.signal.signal_error();
    }

    /// The transport reported a receive error; the byte is lost
    pub fn on_read_error(&mut self) {
        warn!("UART read error");
        self.stats.read_errors = self.stats.read_errors.saturating_add(1);
    }

    /// Wire bytes for a reply, line terminator included when configured
    pub fn encode_reply(&self, reply: &Message) -> Vec<u8, MAX_REPLY_SIZE> {
        let mut out = Vec::new();
        // MAX_REPLY_SIZE holds any frame plus the terminator
        let _ = out.extend_from_slice(&reply.encode_to_vec());
        if self.config.line_terminator {
            let _ = out.push(LINE_TERMINATOR);
        }
        out
    }

    /// Write a reply to the transport
    ///
    /// A refused write abandons the reply; it is never retried.
    pub fn send<T: UartTx>(&mut self, tx: &mut T, reply: &Message) -> Result<(), T::Error> {
        let bytes = self.encode_reply(reply);
        let result = tx.write_blocking(&bytes).and_then(|()| tx.flush());
        if result.is_err() {
            self.on_write_failed();
        } else {
            trace!("Sent {} byte reply", bytes.len());
        }
        result
    }

    /// Receive at most one byte and answer it if it completed a frame
    ///
    /// Every failure has already been handled when this returns; the error
    /// is only reported so callers can log or count it.
    pub fn poll<R: UartRx, T: UartTx>(
        &mut self,
        rx: &mut R,
        tx: &mut T,
    ) -> Result<(), LinkError<R::Error, T::Error>> {
        let received = match self.config.idle_timeout() {
            Some(ms) => rx.read_byte_timeout(ms),
            None => rx.read_byte().map(Some),
        };

        if let Some(reply) = self.on_received(received).map_err(LinkError::Read)? {
            self.send(tx, &reply).map_err(LinkError::Write)?;
        }
        Ok(())
    }

    fn execute(&mut self, request: &Message) -> Message {
        debug!(
            "Request: pin={} io={} rw={} len={}",
            request.pin(),
            request.io(),
            request.rw(),
            request.length()
        );
        self.stats.requests = self.stats.requests.saturating_add(1);

        let pin = request.pin();
        let direction = match request.io() {
            Io::Input => PinDirection::Input,
            Io::Output => PinDirection::Output,
        };
        if !self.gpio.is_available(pin) || self.gpio.configure(pin, direction).is_err() {
            return self.reject_request(request, STATUS_INVALID_PIN);
        }

        match request.rw() {
            Rw::Read => match self.gpio.read(pin) {
                Ok(high) => request.level_reply(high),
                Err(_) => self.reject_request(request, STATUS_INVALID_PIN),
            },
            Rw::Write => {
                let high = match request.data().first() {
                    None => return request.status_reply(STATUS_NO_DATA),
                    Some(&CMD_ON) => true,
                    Some(&CMD_OFF) => false,
                    Some(_) => return self.reject_request(request, STATUS_INVALID_DATA),
                };
                match self.gpio.set_level(pin, high) {
                    Ok(()) => request.level_reply(high),
                    Err(_) => self.reject_request(request, STATUS_INVALID_PIN),
                }
            }
        }
    }

    fn reject_request(&mut self, request: &Message, status: &str) -> Message {
        warn!("Request for pin {} failed: {}", request.pin(), status);
        self.stats.failed_requests = self.stats.failed_requests.saturating_add(1);
        self.signal.signal_error();
        request.status_reply(status)
    }

    fn reject_frame(&mut self, error: FrameError) -> Option<Message> {
        warn!("Frame rejected: {}", error);
        self.stats.record_decode_error(error);
        self.signal.signal_error();
        if self.config.report_decode_errors {
            Some(Message::diagnostic(error))
        } else {
            None
        }
    }
}
