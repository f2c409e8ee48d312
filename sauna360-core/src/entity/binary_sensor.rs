//! Binary sensor entities

use crate::config::BinarySensorsConfig;
use crate::entity::{BinarySensorKind, EntityUpdate};
use crate::traits::{Publish, Sauna360Listener};

/// Publishes heater, light and ready status
pub struct BinarySensorEntities<P> {
    config: BinarySensorsConfig,
    last: [Option<bool>; BinarySensorKind::COUNT],
    publisher: P,
}

impl<P: Publish> BinarySensorEntities<P> {
    pub fn new(config: BinarySensorsConfig, publisher: P) -> Self {
        Self {
            config,
            last: [None; BinarySensorKind::COUNT],
            publisher,
        }
    }

    pub fn state(&self, kind: BinarySensorKind) -> Option<bool> {
        self.last[kind.index()]
    }

    fn update(&mut self, kind: BinarySensorKind, state: bool) {
        let enabled = match kind {
            BinarySensorKind::HeaterStatus => self.config.heater_status,
            BinarySensorKind::LightStatus => self.config.light_status,
            BinarySensorKind::ReadyStatus => self.config.ready_status,
        };
        let slot = &mut self.last[kind.index()];
        if !enabled || *slot == Some(state) {
            return;
        }
        *slot = Some(state);
        self.publisher
            .publish(EntityUpdate::BinarySensor { kind, state });
    }
}

impl<P: Publish> Sauna360Listener for BinarySensorEntities<P> {
    fn on_heater_status(&mut self, on: bool) {
        self.update(BinarySensorKind::HeaterStatus, on);
    }

    fn on_light_status(&mut self, on: bool) {
        self.update(BinarySensorKind::LightStatus, on);
    }

    fn on_ready_status(&mut self, ready: bool) {
        self.update(BinarySensorKind::ReadyStatus, ready);
    }
}
