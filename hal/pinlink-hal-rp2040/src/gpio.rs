//! GPIO bank backed by flexible-direction pins
//!
//! Pins are handed to the bank one by one at startup. Pins the board uses
//! for something else (UART, LED, power sensing) are simply never added and
//! report as unavailable.

use embassy_rp::gpio::Flex;
use pinlink_hal::{GpioBank, GpioError, PinDirection};

/// Maximum number of GPIO pins on RP2040
pub const GPIO_COUNT: usize = 30;

/// Numbered GPIO lines with runtime-switchable direction
pub struct FlexBank {
    pins: [Option<Flex<'static>>; GPIO_COUNT],
}

impl Default for FlexBank {
    fn default() -> Self {
        Self::new()
    }
}

impl FlexBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self {
            pins: [const { None }; GPIO_COUNT],
        }
    }

    /// Add a pin under its GPIO number
    ///
    /// Returns an error if the number is out of range or already taken.
    pub fn add(&mut self, number: u8, mut pin: Flex<'static>) -> Result<(), GpioError> {
        let slot = self
            .pins
            .get_mut(number as usize)
            .ok_or(GpioError::Unavailable(number))?;
        if slot.is_some() {
            return Err(GpioError::AlreadyAssigned(number));
        }
        // Start every line as a floating input
        pin.set_as_input();
        *slot = Some(pin);
        Ok(())
    }

    /// Get the number of pins in the bank
    pub fn len(&self) -> usize {
        self.pins.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn pin_mut(&mut self, number: u8) -> Result<&mut Flex<'static>, GpioError> {
        self.pins
            .get_mut(number as usize)
            .and_then(Option::as_mut)
            .ok_or(GpioError::Unavailable(number))
    }
}

impl GpioBank for FlexBank {
    fn configure(&mut self, pin: u8, direction: PinDirection) -> Result<(), GpioError> {
        let flex = self.pin_mut(pin)?;
        match direction {
            PinDirection::Input => flex.set_as_input(),
            PinDirection::Output => flex.set_as_output(),
        }
        Ok(())
    }

    fn set_high(&mut self, pin: u8) -> Result<(), GpioError> {
        self.pin_mut(pin)?.set_high();
        Ok(())
    }

    fn set_low(&mut self, pin: u8) -> Result<(), GpioError> {
        self.pin_mut(pin)?.set_low();
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<bool, GpioError> {
        Ok(self.pin_mut(pin)?.is_high())
    }

    fn is_available(&self, pin: u8) -> bool {
        matches!(self.pins.get(pin as usize), Some(Some(_)))
    }
}
