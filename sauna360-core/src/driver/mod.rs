//! SAUNA360 bus driver
//!
//! [`Sauna360`] is fed the bytes seen on the heater/panel link one at a
//! time. It decodes heater reports into listener callbacks, keeps the
//! driver-owned numbers and switches in sync, and queues panel-style
//! write frames that the caller transmits when the bus turn opens.

pub mod component;
pub mod listeners;
pub mod relay;
pub mod service;
pub mod session;

pub use component::{Sauna360, POLL_FRAME_TAIL, TX_QUEUE_SIZE};
pub use listeners::ListenerSet;
pub use relay::{RelayDecision, RelayTracker, RELAY_COMMAND_HOLDOFF_MS};
pub use service::{service, ServiceReport};
pub use session::{format_uptime, SessionTimer, UptimeText};

use sauna360_protocol::{FrameError, Packet, PacketError};

/// Minimum idle time on the bus before a frame is written (µs)
pub const MIN_INTER_FRAME_GAP_US: u64 = 520;

/// Errors from processing received bytes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// Frame could not be decoded
    Frame(FrameError),
    /// Frame body is not a packet
    Packet(PacketError),
    /// Acknowledgement dropped because the transmit queue is full
    QueueFull,
    /// Writing the configured defaults failed
    Defaults(ControlError),
}

impl From<FrameError> for DriverError {
    fn from(e: FrameError) -> Self {
        DriverError::Frame(e)
    }
}

impl From<PacketError> for DriverError {
    fn from(e: PacketError) -> Self {
        DriverError::Packet(e)
    }
}

/// Errors from commands
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlError {
    /// Entity is not configured
    NotConfigured,
    /// Value outside the accepted range
    OutOfRange { value: f32, min: f32, max: f32 },
    /// Command needs a register value the heater has not reported yet
    AwaitingDeviceState,
    /// Transmit queue is full
    QueueFull,
    /// Packet could not be framed
    Encoding(FrameError),
}

/// Result of a successful command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandOutcome {
    /// A write frame was queued
    Queued,
    /// Heater already has the requested value
    Unchanged,
    /// Relay toggle suppressed by the holdoff window
    Deferred,
}

/// A packet decoded from the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceivedPacket {
    pub packet: Packet,
    /// False for heater reports on registers the driver does not know
    pub handled: bool,
    /// Undefined escape code seen in the frame
    pub unknown_escape: Option<u8>,
}
