//! Configuration type definitions

use pinlink_hal::UartConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default serial speed of the link
pub const DEFAULT_BAUDRATE: u32 = 9600;

/// Default wait for the next byte of a partial frame
pub const DEFAULT_IDLE_TIMEOUT_MS: u32 = 1000;

/// Complete device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct DeviceConfig {
    pub link: LinkConfig,
    pub signal: SignalConfig,
}

/// Serial link and dispatcher behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct LinkConfig {
    /// Baud rate, 8N1
    pub baudrate: u32,
    /// Drop a partial frame after this long without a byte (0 = wait forever)
    pub idle_timeout_ms: u32,
    /// Send a diagnostic frame back when an inbound frame is rejected
    pub report_decode_errors: bool,
    /// Follow every reply frame with a `'\n'`
    pub line_terminator: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            report_decode_errors: true,
            line_terminator: true,
        }
    }
}

impl LinkConfig {
    /// UART settings for this link
    pub fn uart_config(&self) -> UartConfig {
        UartConfig::with_baudrate(self.baudrate)
    }

    /// Idle window in milliseconds, `None` when reads block forever
    pub fn idle_timeout(&self) -> Option<u32> {
        match self.idle_timeout_ms {
            0 => None,
            ms => Some(ms),
        }
    }
}

/// Failure indicator behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SignalConfig {
    /// Number of blinks per failure
    pub error_blinks: u8,
    /// Length of each on and each off phase
    pub blink_ms: u32,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            error_blinks: 10,
            blink_ms: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.link.baudrate, 9600);
        assert_eq!(config.link.idle_timeout(), Some(1000));
        assert_eq!(config.signal.error_blinks, 10);
    }

    #[test]
    fn test_zero_idle_timeout_disables_it() {
        let link = LinkConfig {
            idle_timeout_ms: 0,
            ..LinkConfig::default()
        };
        assert_eq!(link.idle_timeout(), None);
    }
}
