//! GPIO bank abstraction
//!
//! The dispatcher addresses pins by number and may flip a pin between input
//! and output from one request to the next, so the abstraction is a bank of
//! numbered lines rather than one typed pin per line.

/// Direction a pin is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinDirection {
    Input,
    Output,
}

/// Errors from GPIO bank operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// The board does not expose this pin number
    Unavailable(u8),
    /// The pin is already part of the bank
    AlreadyAssigned(u8),
}

/// A set of numbered GPIO lines owned by one user
///
/// Implementations handle the actual hardware register manipulation
/// for the specific chip.
pub trait GpioBank {
    /// Configure `pin` as an input or an output
    fn configure(&mut self, pin: u8, direction: PinDirection) -> Result<(), GpioError>;

    /// Drive `pin` high (logic 1)
    fn set_high(&mut self, pin: u8) -> Result<(), GpioError>;

    /// Drive `pin` low (logic 0)
    fn set_low(&mut self, pin: u8) -> Result<(), GpioError>;

    /// Read the current logic level of `pin`, true for high
    fn read(&mut self, pin: u8) -> Result<bool, GpioError>;

    /// Drive `pin` to a specific level
    fn set_level(&mut self, pin: u8, high: bool) -> Result<(), GpioError> {
        if high {
            self.set_high(pin)
        } else {
            self.set_low(pin)
        }
    }

    /// Check whether `pin` can be addressed at all
    fn is_available(&self, pin: u8) -> bool;
}
