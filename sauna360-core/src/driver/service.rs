//! Blocking service loop step
//!
//! For targets without an async executor. Reads whatever the UART has,
//! feeds it through the driver and writes a queued frame as soon as the
//! bus turn opens. The caller is responsible for the inter-frame gap
//! when its UART does not add one.

use sauna360_hal::{UartRx, UartTx};

use crate::traits::Sauna360Listener;

use super::{DriverError, ReceivedPacket, Sauna360};

/// What one service call did
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServiceReport {
    /// Bytes read from the bus
    pub bytes: usize,
    /// Frames decoded
    pub packets: usize,
    /// Decoded heater reports on registers the driver does not know
    pub unhandled: usize,
    /// Frames written
    pub frames_sent: usize,
    /// Bytes that failed to decode
    pub errors: usize,
    /// Most recent decode error
    pub last_error: Option<DriverError>,
    /// Most recent packet
    pub last_packet: Option<ReceivedPacket>,
}

/// Run one read/process/write step
///
/// Blocks in `read_blocking` until the UART returns data.
pub fn service<U, E, L>(
    driver: &mut Sauna360<L>,
    uart: &mut U,
    buf: &mut [u8],
    now_ms: u64,
) -> Result<ServiceReport, E>
where
    U: UartRx<Error = E> + UartTx<Error = E>,
    L: Sauna360Listener,
{
    driver.tick(now_ms);

    let mut report = ServiceReport::default();
    let n = uart.read_blocking(buf)?;
    report.bytes = n;

    for &byte in &buf[..n] {
        match driver.handle_byte(byte) {
            Ok(Some(received)) => {
                report.packets += 1;
                if !received.handled {
                    report.unhandled += 1;
                }
                report.last_packet = Some(received);
            }
            Ok(None) => {}
            Err(e) => {
                report.errors += 1;
                report.last_error = Some(e);
            }
        }

        if let Some(frame) = driver.take_transmit() {
            uart.write_blocking(&frame)?;
            uart.flush()?;
            report.frames_sent += 1;
        }
    }

    Ok(report)
}
