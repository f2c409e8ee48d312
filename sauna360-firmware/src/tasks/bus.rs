//! Sauna bus task
//!
//! Owns the driver. Feeds it every byte from the heater/panel link,
//! writes queued frames when the bus turn opens, applies console
//! commands and advances the driver clock.

use defmt::*;
use embassy_futures::select::{select3, Either3};
use embassy_rp::uart::BufferedUart;
use embassy_time::{Duration, Timer};
use embedded_io_async::{Read, Write};

use sauna360_core::driver::MIN_INTER_FRAME_GAP_US;
use sauna360_core::entity::Entities;
use sauna360_core::{DriverError, HeaterState, ReceivedPacket, Sauna360, Sauna360Listener};

use crate::channels::{ChannelPublisher, COMMAND_CHANNEL};
use crate::tasks::tick::TICK_SIGNAL;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Driver with the console entities and the log listener attached
pub type BusDriver = Sauna360<(Entities<ChannelPublisher>, BusLog)>;

/// Logs heater-side events worth a line in the RTT log
#[derive(Debug, Default)]
pub struct BusLog {
    reachable: bool,
}

impl Sauna360Listener for BusLog {
    fn on_total_uptime(&mut self, minutes: u32) {
        if !self.reachable {
            self.reachable = true;
            info!("Heater reachable, total uptime {} min", minutes);
        }
    }

    fn on_heater_state(&mut self, state: HeaterState) {
        if state.is_fault() {
            warn!("Heater: {}", state.as_str());
        } else {
            debug!("Heater: {}", state.as_str());
        }
    }

    fn on_session_uptime(&mut self, seconds: u32) {
        trace!("Session uptime {} s", seconds);
    }
}

#[embassy_executor::task]
pub async fn bus_task(mut uart: BufferedUart, mut driver: BusDriver) {
    info!("Bus task started");

    driver.setup();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match select3(
            uart.read(&mut buf),
            COMMAND_CHANNEL.receive(),
            TICK_SIGNAL.wait(),
        )
        .await
        {
            Either3::First(Ok(n)) => {
                trace!("RX: {} bytes", n);
                for &byte in &buf[..n] {
                    handle_byte(&mut driver, byte);
                    if let Some(frame) = driver.take_transmit() {
                        Timer::after(Duration::from_micros(MIN_INTER_FRAME_GAP_US)).await;
                        if let Err(e) = uart.write_all(&frame).await {
                            warn!("Bus write failed: {:?}", e);
                        } else if let Err(e) = uart.flush().await {
                            warn!("Bus flush failed: {:?}", e);
                        } else {
                            trace!("TX: {=[u8]:x}", &frame[..]);
                        }
                    }
                }
            }
            Either3::First(Err(e)) => {
                warn!("Bus read error: {:?}", e);
            }
            Either3::Second(command) => match command.apply(&mut driver) {
                Ok(()) => debug!("Applied {:?}", command),
                Err(e) => warn!("Command {:?} failed: {:?}", command, e),
            },
            Either3::Third(now_ms) => {
                driver.tick(now_ms);
            }
        }
    }
}

fn handle_byte(driver: &mut BusDriver, byte: u8) {
    match driver.handle_byte(byte) {
        Ok(Some(received)) => log_packet(&received),
        Ok(None) => {}
        Err(DriverError::Defaults(e)) => {
            warn!("Writing configured defaults failed: {:?}", e);
        }
        Err(e) => {
            warn!("Bus receive error: {:?}", e);
        }
    }
}

fn log_packet(received: &ReceivedPacket) {
    let packet = &received.packet;
    if let Some(code) = received.unknown_escape {
        warn!("Unknown escape code {=u8:#04x} in frame", code);
    }
    if received.handled {
        trace!(
            "Register {=u16:#06x} data {=u32:#010x}",
            packet.code,
            packet.data
        );
    } else {
        debug!(
            "Unhandled register {=u16:#06x} data {=u32:#010x} from {=u8:#04x}",
            packet.code,
            packet.data,
            packet.address
        );
    }
}
