//! RP2040 implementation of the pinlink HAL
//!
//! - [`gpio::FlexBank`]: numbered GPIO lines backed by `embassy_rp::gpio::Flex`
//! - [`signal::LedSignal`]: failure signal that blinks an LED
//! - [`uart::uart_config`]: maps the board-agnostic UART settings to embassy-rp

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod signal;
pub mod uart;

pub use gpio::{FlexBank, GPIO_COUNT};
pub use signal::LedSignal;
pub use uart::uart_config;
