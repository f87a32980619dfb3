//! Host link task
//!
//! Feeds received bytes to the dispatcher one at a time and writes each
//! reply before reading on. The idle timeout drops a partial frame when the
//! host goes quiet mid-frame.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::{with_timeout, Duration, TimeoutError};
use embedded_io_async::{Read, Write};

use pinlink_core::Dispatcher;
use pinlink_hal_rp2040::{FlexBank, LedSignal};

/// Link task - serves GPIO requests from the host
#[embassy_executor::task]
pub async fn link_task(
    mut dispatcher: Dispatcher<FlexBank, LedSignal>,
    mut rx: BufferedUartRx,
    mut tx: BufferedUartTx,
) {
    info!("Link task started");

    let idle_timeout = dispatcher.config().idle_timeout();
    let mut buf = [0u8; 1];

    loop {
        let read = match idle_timeout {
            Some(ms) => with_timeout(Duration::from_millis(ms as u64), rx.read(&mut buf)).await,
            None => Ok(rx.read(&mut buf).await),
        };

        let received = match read {
            Ok(Ok(0)) => continue,
            Ok(Ok(_)) => {
                trace!("RX: {:#x}", buf[0]);
                Ok(Some(buf[0]))
            }
            Ok(Err(e)) => Err(e),
            Err(TimeoutError) => Ok(None),
        };

        match dispatcher.on_received(received) {
            Ok(Some(reply)) => {
                let bytes = dispatcher.encode_reply(&reply);
                if let Err(e) = tx.write_all(&bytes).await {
                    warn!("Failed to send reply: {:?}", e);
                    dispatcher.on_write_failed();
                } else {
                    trace!("Reply sent ({} bytes)", bytes.len());
                }
            }
            Ok(None) => {}
            Err(e) => warn!("UART read error: {:?}", e),
        }
    }
}
