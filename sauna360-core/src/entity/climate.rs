//! Climate entity
//!
//! Presents the heater as a thermostat with Heat/Off modes. The target
//! follows setpoint reports, the mode follows the heater status. When
//! linked, the bath temperature number and the heater relay switch drive
//! them as well.

use crate::config::ClimateConfig;
use crate::entity::{ClimateMode, ClimateState, EntityUpdate, NumberKind, SwitchKind};
use crate::traits::{Publish, Sauna360Listener};

/// Static capabilities of the climate entity
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClimateTraits {
    pub supports_current_temperature: bool,
    pub modes: [ClimateMode; 2],
    pub visual_min_temperature: f32,
    pub visual_max_temperature: f32,
    pub visual_temperature_step: f32,
}

pub const CLIMATE_TRAITS: ClimateTraits = ClimateTraits {
    supports_current_temperature: true,
    modes: [ClimateMode::Heat, ClimateMode::Off],
    visual_min_temperature: 40.0,
    visual_max_temperature: 110.0,
    visual_temperature_step: 1.0,
};

pub struct Sauna360Climate<P> {
    links: ClimateConfig,
    state: ClimateState,
    publisher: P,
}

impl<P: Publish> Sauna360Climate<P> {
    pub fn new(links: ClimateConfig, publisher: P) -> Self {
        Self {
            links,
            state: ClimateState {
                mode: ClimateMode::Off,
                current_temperature: None,
                target_temperature: None,
            },
            publisher,
        }
    }

    pub fn traits(&self) -> ClimateTraits {
        CLIMATE_TRAITS
    }

    pub fn state(&self) -> ClimateState {
        self.state
    }

    fn apply(&mut self, next: ClimateState) {
        if next != self.state {
            self.state = next;
            self.publisher.publish(EntityUpdate::Climate(next));
        }
    }

    fn set_mode(&mut self, on: bool) {
        let mode = if on { ClimateMode::Heat } else { ClimateMode::Off };
        self.apply(ClimateState { mode, ..self.state });
    }

    fn set_target(&mut self, celsius: f32) {
        self.apply(ClimateState {
            target_temperature: Some(celsius),
            ..self.state
        });
    }
}

impl<P: Publish> Sauna360Listener for Sauna360Climate<P> {
    fn on_temperature(&mut self, celsius: u16) {
        self.apply(ClimateState {
            current_temperature: Some(celsius.into()),
            ..self.state
        });
    }

    fn on_temperature_setting(&mut self, celsius: u16) {
        self.set_target(celsius.into());
    }

    fn on_heater_status(&mut self, on: bool) {
        self.set_mode(on);
    }

    fn on_number_state(&mut self, kind: NumberKind, value: f32) {
        if kind == NumberKind::BathTemperature && self.links.bath_temperature_number {
            self.set_target(value);
        }
    }

    fn on_switch_state(&mut self, kind: SwitchKind, on: bool) {
        if kind == SwitchKind::HeaterRelay && self.links.heater_relay {
            self.set_mode(on);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::testing::Recorder;

    #[test]
    fn test_follows_reports() {
        let recorder = Recorder::new();
        let mut climate = Sauna360Climate::new(ClimateConfig::default(), &recorder);

        climate.on_temperature(65);
        climate.on_temperature_setting(80);
        climate.on_heater_status(true);
        // Unchanged state is not republished
        climate.on_temperature(65);

        assert_eq!(recorder.len(), 3);
        assert_eq!(
            climate.state(),
            ClimateState {
                mode: ClimateMode::Heat,
                current_temperature: Some(65.0),
                target_temperature: Some(80.0),
            }
        );
        assert_eq!(recorder.last(), Some(EntityUpdate::Climate(climate.state())));

        recorder.clear();
        climate.on_heater_status(false);
        assert_eq!(recorder.len(), 1);
        assert_eq!(climate.state().mode, ClimateMode::Off);
    }

    #[test]
    fn test_linked_entities_drive_state() {
        let recorder = Recorder::new();
        let links = ClimateConfig {
            bath_temperature_number: true,
            heater_relay: false,
        };
        let mut climate = Sauna360Climate::new(links, &recorder);

        climate.on_number_state(NumberKind::BathTemperature, 85.0);
        climate.on_number_state(NumberKind::MaxBathTemperature, 100.0);
        // Relay is not linked
        climate.on_switch_state(SwitchKind::HeaterRelay, true);

        assert_eq!(climate.state().target_temperature, Some(85.0));
        assert_eq!(climate.state().mode, ClimateMode::Off);
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_traits() {
        let recorder = Recorder::new();
        let climate = Sauna360Climate::new(ClimateConfig::default(), &recorder);
        let traits = climate.traits();
        assert!(traits.supports_current_temperature);
        assert_eq!(traits.visual_min_temperature, 40.0);
        assert_eq!(traits.visual_max_temperature, 110.0);
    }
}
