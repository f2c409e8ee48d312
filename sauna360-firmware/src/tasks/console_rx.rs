//! Console UART receive task
//!
//! Reads command lines and hands them to the bus task.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use sauna360_core::console::LineReader;

use crate::channels::COMMAND_CHANNEL;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

#[embassy_executor::task]
pub async fn console_rx_task(mut rx: BufferedUartRx) {
    info!("Console RX task started");

    let mut reader = LineReader::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) => {
                for &byte in &buf[..n] {
                    match reader.feed(byte) {
                        Ok(Some(command)) => {
                            debug!("Console command: {:?}", command);
                            if COMMAND_CHANNEL.try_send(command).is_err() {
                                warn!("Command channel full, dropping command");
                            }
                        }
                        Ok(None) => {}
                        Err(e) => warn!("Console input rejected: {:?}", e),
                    }
                }
            }
            Err(e) => warn!("Console read error: {:?}", e),
        }
    }
}
