//! pinlink - serial GPIO bridge firmware
//!
//! Main firmware binary for RP2040-based boards. Serves GPIO read/write
//! requests arriving on UART0 (GPIO0 TX, GPIO1 RX) and blinks the onboard
//! LED when a request or frame is rejected.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Flex, Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pinlink_core::config::parse_config;
use pinlink_core::{DeviceConfig, Dispatcher};
use pinlink_hal_rp2040::{uart_config, FlexBank, LedSignal};

mod tasks;

/// Embedded default configuration (compiled into firmware)
/// Edit link.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../link.toml");

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("pinlink firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());

    let config = load_config();
    info!("Configuration loaded: {}", config);

    // Setup UART for the host link
    let tx_buf = TX_BUF.init([0u8; 128]);
    let rx_buf = RX_BUF.init([0u8; 128]);

    let uart = Uart::new_blocking(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        uart_config(&config.link.uart_config()),
    );
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", config.link.baudrate);

    // Onboard LED (Pico: GPIO25) signals failures
    let led = Output::new(p.PIN_25, Level::Low);
    let signal = LedSignal::new(led, config.signal.error_blinks, config.signal.blink_ms);

    // Expose every header pin not used by the UART. GPIO23/24/29 are wired
    // to power circuitry on the Pico and stay out of the bank.
    let mut bank = FlexBank::new();
    unwrap!(bank.add(2, Flex::new(p.PIN_2)));
    unwrap!(bank.add(3, Flex::new(p.PIN_3)));
    unwrap!(bank.add(4, Flex::new(p.PIN_4)));
    unwrap!(bank.add(5, Flex::new(p.PIN_5)));
    unwrap!(bank.add(6, Flex::new(p.PIN_6)));
    unwrap!(bank.add(7, Flex::new(p.PIN_7)));
    unwrap!(bank.add(8, Flex::new(p.PIN_8)));
    unwrap!(bank.add(9, Flex::new(p.PIN_9)));
    unwrap!(bank.add(10, Flex::new(p.PIN_10)));
    unwrap!(bank.add(11, Flex::new(p.PIN_11)));
    unwrap!(bank.add(12, Flex::new(p.PIN_12)));
    unwrap!(bank.add(13, Flex::new(p.PIN_13)));
    unwrap!(bank.add(14, Flex::new(p.PIN_14)));
    unwrap!(bank.add(15, Flex::new(p.PIN_15)));
    unwrap!(bank.add(16, Flex::new(p.PIN_16)));
    unwrap!(bank.add(17, Flex::new(p.PIN_17)));
    unwrap!(bank.add(18, Flex::new(p.PIN_18)));
    unwrap!(bank.add(19, Flex::new(p.PIN_19)));
    unwrap!(bank.add(20, Flex::new(p.PIN_20)));
    unwrap!(bank.add(21, Flex::new(p.PIN_21)));
    unwrap!(bank.add(22, Flex::new(p.PIN_22)));
    unwrap!(bank.add(26, Flex::new(p.PIN_26)));
    unwrap!(bank.add(27, Flex::new(p.PIN_27)));
    unwrap!(bank.add(28, Flex::new(p.PIN_28)));
    info!("GPIO bank ready: {} pins", bank.len());

    let dispatcher = Dispatcher::new(bank, signal, config.link);

    spawner.spawn(tasks::link_task(dispatcher, rx, tx)).unwrap();

    info!("Link task spawned");
}

/// Parse the embedded configuration, falling back to defaults
fn load_config() -> DeviceConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            warn!("Invalid embedded config ({}), using defaults", e);
            DeviceConfig::default()
        }
    }
}
