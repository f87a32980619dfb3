//! UART configuration mapping

use embassy_rp::uart::{Config, DataBits as RpDataBits, Parity as RpParity, StopBits as RpStopBits};
use pinlink_hal::uart::{DataBits, Parity, StopBits, UartConfig};

/// Convert board-agnostic UART settings to an embassy-rp UART config
pub fn uart_config(config: &UartConfig) -> Config {
    let mut rp = Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        DataBits::Seven => RpDataBits::DataBits7,
        DataBits::Eight => RpDataBits::DataBits8,
    };
    rp.parity = match config.parity {
        Parity::None => RpParity::ParityNone,
        Parity::Even => RpParity::ParityEven,
        Parity::Odd => RpParity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        StopBits::One => RpStopBits::STOP1,
        StopBits::Two => RpStopBits::STOP2,
    };
    rp
}
