//! Console UART transmit task
//!
//! Writes each entity update as one line.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use sauna360_core::console::format_update;

use crate::channels::STATE_CHANNEL;

#[embassy_executor::task]
pub async fn console_tx_task(mut tx: BufferedUartTx) {
    info!("Console TX task started");

    loop {
        let update = STATE_CHANNEL.receive().await;
        let line = format_update(&update);
        trace!("Publish {}", line.as_str());

        if let Err(e) = tx.write_all(line.as_bytes()).await {
            warn!("Console write failed: {:?}", e);
            continue;
        }
        if let Err(e) = tx.write_all(b"\r\n").await {
            warn!("Console write failed: {:?}", e);
        }
    }
}
