//! SAUNA360 Hardware Abstraction Layer
//!
//! This crate defines the serial traits the bus driver is written against,
//! so the same driver code runs on the RP2040 firmware and against mock
//! UARTs in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  sauna360-core (driver, entities)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sauna360-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ embassy-rp    │       │ host mocks    │
//! │ (firmware)    │       │ (tests)       │
//! └───────────────┘       └───────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

pub use uart::{
    DataBits, Parity, StopBits, Uart, UartConfig, UartRx, UartTx, SAUNA_BUS_BAUDRATE,
};
