//! LED failure signal

use embassy_rp::gpio::Output;
use embassy_time::{block_for, Duration};
use pinlink_hal::FailureSignal;

/// Blinks an LED a fixed number of times on every failure
///
/// Blinking blocks the caller, which keeps the link single-threaded: no
/// request is served while the LED is blinking. The executor is stalled for
/// `blinks * 2 * blink_ms`, so bytes arriving in that window can overflow
/// the UART receive buffer and be lost.
pub struct LedSignal {
    led: Output<'static>,
    blinks: u8,
    phase: Duration,
}

impl LedSignal {
    /// `blink_ms` is the length of each on and each off phase
    pub fn new(mut led: Output<'static>, blinks: u8, blink_ms: u32) -> Self {
        led.set_low();
        Self {
            led,
            blinks,
            phase: Duration::from_millis(blink_ms as u64),
        }
    }
}

impl FailureSignal for LedSignal {
    fn signal_error(&mut self) {
        for _ in 0..self.blinks {
            self.led.set_high();
            block_for(self.phase);
            self.led.set_low();
            block_for(self.phase);
        }
    }
}
