//! Relay toggle bookkeeping
//!
//! The heater only accepts toggle commands for its light and heater
//! relays. A toggle is sent when the wanted state differs from the last
//! reported one. A queued toggle blocks further toggles until it has
//! been written, and the holdoff window starts when it leaves so a slow
//! status report does not cause a second toggle.

/// Minimum time between two toggles of the same relay
pub const RELAY_COMMAND_HOLDOFF_MS: u64 = 2000;

/// What to do with a relay request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayDecision {
    /// Send a toggle
    Toggle,
    /// Relay already in the wanted state
    Unchanged,
    /// A toggle is still queued or went out within the holdoff window
    Deferred,
    /// No state reported yet
    Unknown,
}

#[derive(Debug, Clone, Default)]
pub struct RelayTracker {
    known: Option<bool>,
    queued: bool,
    last_command_ms: Option<u64>,
}

impl RelayTracker {
    pub const fn new() -> Self {
        Self {
            known: None,
            queued: false,
            last_command_ms: None,
        }
    }

    /// Last state reported by the heater
    pub fn known(&self) -> Option<bool> {
        self.known
    }

    /// Record a reported state
    pub fn observe(&mut self, on: bool) {
        self.known = Some(on);
    }

    /// Decide how to reach `wanted`
    pub fn decide(&self, wanted: bool, now_ms: u64) -> RelayDecision {
        match self.known {
            None => RelayDecision::Unknown,
            Some(state) if state == wanted => RelayDecision::Unchanged,
            Some(_) if self.queued => RelayDecision::Deferred,
            Some(_) => match self.last_command_ms {
                Some(sent) if now_ms.saturating_sub(sent) < RELAY_COMMAND_HOLDOFF_MS => {
                    RelayDecision::Deferred
                }
                _ => RelayDecision::Toggle,
            },
        }
    }

    /// Record that a toggle was queued
    pub fn commanded(&mut self) {
        self.queued = true;
    }

    /// Whether a toggle is waiting for the bus
    pub fn is_queued(&self) -> bool {
        self.queued
    }

    /// Record that the queued toggle was written, starting the holdoff
    pub fn sent(&mut self, now_ms: u64) {
        self.queued = false;
        self.last_command_ms = Some(now_ms);
    }
}
