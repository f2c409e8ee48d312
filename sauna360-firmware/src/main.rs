//! SAUNA360 bridge firmware
//!
//! Sits on the bus between a SAUNA360 heater and its control panel,
//! decodes the heater's reports and speaks for the panel when a console
//! command asks it to.
//!
//! - UART0 (GPIO0 TX, GPIO1 RX): heater/panel bus through an RS-485 transceiver
//! - UART1 (GPIO4 TX, GPIO5 RX): line console

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::{
    BufferedInterruptHandler, Config as UartConfig, DataBits, Parity, StopBits, Uart,
};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use sauna360_core::entity::entities;
use sauna360_core::Sauna360;

use crate::channels::ChannelPublisher;
use crate::tasks::BusLog;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// Static cells for UART buffers (must live forever)
static BUS_TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static BUS_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static CONSOLE_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static CONSOLE_RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("SAUNA360 firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();

    // Heater/panel bus
    let bus_config = bus_uart_config(&config.uart);
    let bus_tx_buf = BUS_TX_BUF.init([0u8; 64]);
    let bus_rx_buf = BUS_RX_BUF.init([0u8; 256]);
    let bus_uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, bus_config);
    let bus_uart = bus_uart.into_buffered::<UART0>(Irqs, bus_tx_buf, bus_rx_buf);
    info!("UART initialized for sauna bus");

    // Console (115200 baud default)
    let console_tx_buf = CONSOLE_TX_BUF.init([0u8; 256]);
    let console_rx_buf = CONSOLE_RX_BUF.init([0u8; 64]);
    let console = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, UartConfig::default());
    let console = console.into_buffered::<UART1>(Irqs, console_tx_buf, console_rx_buf);
    let (console_tx, console_rx) = console.split();
    info!("UART initialized for console");

    let driver = Sauna360::new(
        &config,
        (entities(&config, ChannelPublisher), BusLog::default()),
    );
    info!("Driver ready for {} heater", config.model.name());

    spawner.spawn(tasks::tick_task()).unwrap();
    spawner.spawn(tasks::console_rx_task(console_rx)).unwrap();
    spawner.spawn(tasks::console_tx_task(console_tx)).unwrap();
    spawner.spawn(tasks::bus_task(bus_uart, driver)).unwrap();

    info!("All tasks spawned, firmware running");
}

/// Map the configured line settings onto the RP2040 UART
fn bus_uart_config(settings: &sauna360_core::config::UartSettings) -> UartConfig {
    // Validation only admits the bus settings
    let line = settings.to_uart_config().unwrap_or_default();

    let mut cfg = UartConfig::default();
    cfg.baudrate = line.baudrate;
    cfg.data_bits = match line.data_bits {
        sauna360_hal::DataBits::Seven => DataBits::DataBits7,
        sauna360_hal::DataBits::Eight => DataBits::DataBits8,
    };
    cfg.parity = match line.parity {
        sauna360_hal::Parity::None => Parity::ParityNone,
        sauna360_hal::Parity::Even => Parity::ParityEven,
        sauna360_hal::Parity::Odd => Parity::ParityOdd,
    };
    cfg.stop_bits = match line.stop_bits {
        sauna360_hal::StopBits::One => StopBits::STOP1,
        sauna360_hal::StopBits::Two => StopBits::STOP2,
    };
    cfg
}
