//! Configuration types
//!
//! Board-agnostic link configuration, parsed from the TOML text embedded in
//! the firmware image.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
