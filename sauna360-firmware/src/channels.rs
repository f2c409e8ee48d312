//! Inter-task communication channels
//!
//! The bus task owns the driver. Console commands reach it through
//! [`COMMAND_CHANNEL`]; entity updates leave it through [`STATE_CHANNEL`].

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use sauna360_core::console::Command;
use sauna360_core::{EntityUpdate, Publish};

/// Channel capacity for console commands
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Channel capacity for entity updates
///
/// One status report can publish a handful of updates at once.
const STATE_CHANNEL_SIZE: usize = 16;

/// Commands parsed from the console
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Entity updates to write to the console
pub static STATE_CHANNEL: Channel<CriticalSectionRawMutex, EntityUpdate, STATE_CHANNEL_SIZE> =
    Channel::new();

/// Publishes entity updates into [`STATE_CHANNEL`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelPublisher;

impl Publish for ChannelPublisher {
    fn publish(&mut self, update: EntityUpdate) {
        // Never block the bus task; drop instead
        if STATE_CHANNEL.try_send(update).is_err() {
            warn!("State channel full, dropping update");
        }
    }
}
