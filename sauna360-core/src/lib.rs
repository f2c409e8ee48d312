//! Board-agnostic core of the SAUNA360 bus driver
//!
//! This crate contains everything that does not depend on a specific
//! board:
//!
//! - The `Sauna360` driver state machine (receive, decode, command queue)
//! - Listener and publisher traits that connect it to the outside
//! - Entity adapters (sensors, binary sensors, text sensors, climate)
//! - Configuration types, validation and a small TOML reader
//! - The console line protocol used by the firmware

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod console;
pub mod driver;
pub mod entity;
pub mod state;
pub mod traits;

pub use driver::{
    CommandOutcome, ControlError, DriverError, ListenerSet, ReceivedPacket, Sauna360,
};
pub use entity::EntityUpdate;
pub use state::HeaterState;
pub use traits::{Publish, Sauna360Listener};
