//! Failure signaling
//!
//! A board-level indicator (typically an LED) that flags rejected frames and
//! failed requests to someone watching the device. It never affects the
//! protocol itself.

/// Out-of-band error indicator
pub trait FailureSignal {
    /// Indicate that something went wrong
    fn signal_error(&mut self);
}

impl<T: FailureSignal + ?Sized> FailureSignal for &mut T {
    fn signal_error(&mut self) {
        (**self).signal_error();
    }
}
