//! Serial links feeding the shell
//!
//! Each UART is split: the receive half runs in its own reader task and
//! offers bytes to [`RX_MAILBOX`], the transmit halves stay with the shell so
//! every response goes out on both links.

use baroshell_core::console::{RX_MAILBOX, RxSource};
use esp_hal::Async;
use esp_hal::uart::{TxError, UartRx, UartTx};
use log::warn;

#[embassy_executor::task(pool_size = 2)]
pub async fn serial_reader(mut rx: UartRx<'static, Async>, source: RxSource) {
    let mut buffer = [0u8; 16];
    loop {
        match rx.read_async(&mut buffer).await {
            Ok(count) => {
                for &byte in &buffer[..count] {
                    RX_MAILBOX.offer(source, byte);
                }
            }
            Err(e) => warn!("{:?} link read error: {:?}", source, e),
        }
    }
}

/// Transmit halves of both links.
pub struct SerialLinks {
    pub debug: UartTx<'static, Async>,
    pub host: UartTx<'static, Async>,
}

impl SerialLinks {
    /// Write `bytes` to both links. A failing link is logged and does not
    /// hold up the other one.
    pub async fn broadcast(&mut self, bytes: &[u8]) {
        if let Err(e) = write_all(&mut self.debug, bytes).await {
            warn!("Debug link write error: {:?}", e);
        }
        if let Err(e) = write_all(&mut self.host, bytes).await {
            warn!("Host link write error: {:?}", e);
        }
    }
}

async fn write_all(tx: &mut UartTx<'static, Async>, mut bytes: &[u8]) -> Result<(), TxError> {
    while !bytes.is_empty() {
        let written = tx.write_async(bytes).await?;
        bytes = &bytes[written..];
    }
    Ok(())
}
