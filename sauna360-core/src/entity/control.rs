//! Publishing of driver-owned numbers and switches

use crate::entity::{EntityUpdate, NumberKind, SwitchKind};
use crate::traits::{Publish, Sauna360Listener};

/// Forwards number and switch state changes to a publisher
pub struct ControlStatePublisher<P> {
    publisher: P,
}

impl<P: Publish> ControlStatePublisher<P> {
    pub fn new(publisher: P) -> Self {
        Self { publisher }
    }
}

impl<P: Publish> Sauna360Listener for ControlStatePublisher<P> {
    fn on_number_state(&mut self, kind: NumberKind, value: f32) {
        self.publisher.publish(EntityUpdate::Number { kind, value });
    }

    fn on_switch_state(&mut self, kind: SwitchKind, on: bool) {
        self.publisher
            .publish(EntityUpdate::Switch { kind, state: on });
    }
}
