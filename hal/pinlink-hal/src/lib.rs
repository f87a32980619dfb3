//! pinlink Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the link dispatcher is written
//! against. Chip-specific crates implement them so the same dispatcher runs
//! on any board, and host tests implement them with in-memory fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pinlink-core (dispatcher)              │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pinlink-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pinlink-hal-rp2040                     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::GpioBank`] - Numbered GPIO lines with switchable direction
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`signal::FailureSignal`] - Out-of-band error indication

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod signal;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{GpioBank, GpioError, PinDirection};
pub use signal::FailureSignal;
pub use uart::{UartConfig, UartRx, UartTx};
