//! Board-agnostic core logic for the pinlink device
//!
//! This crate contains the device side of the link that does not depend on
//! specific hardware:
//!
//! - Link dispatcher: frame assembly, request execution, replies
//! - Link statistics
//! - Configuration types and the embedded config parser
//!
//! Hardware is reached only through the `pinlink-hal` traits.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod dispatch;

pub use config::{DeviceConfig, LinkConfig, SignalConfig};
pub use dispatch::{Dispatcher, LinkError, LinkStats};
