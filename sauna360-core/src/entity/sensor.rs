//! Numeric sensor entities

use crate::config::SensorsConfig;
use crate::entity::{EntityUpdate, SensorKind};
use crate::traits::{Publish, Sauna360Listener};

/// Publishes the enabled numeric sensors
///
/// A value is published when it differs from the last one published for
/// the same sensor.
pub struct SensorEntities<P> {
    config: SensorsConfig,
    last: [Option<u32>; SensorKind::COUNT],
    publisher: P,
}

impl<P: Publish> SensorEntities<P> {
    pub fn new(config: SensorsConfig, publisher: P) -> Self {
        Self {
            config,
            last: [None; SensorKind::COUNT],
            publisher,
        }
    }

    /// Last published value of a sensor
    pub fn value(&self, kind: SensorKind) -> Option<u32> {
        self.last[kind.index()]
    }

    fn update(&mut self, kind: SensorKind, value: u32) {
        if !self.config.enabled(kind) {
            return;
        }
        let slot = &mut self.last[kind.index()];
        if *slot == Some(value) {
            return;
        }
        *slot = Some(value);
        self.publisher.publish(EntityUpdate::Sensor { kind, value });
    }
}

impl<P: Publish> Sauna360Listener for SensorEntities<P> {
    fn on_temperature(&mut self, celsius: u16) {
        self.update(SensorKind::CurrentTemperature, celsius.into());
    }

    fn on_temperature_setting(&mut self, celsius: u16) {
        self.update(SensorKind::SettingTemperature, celsius.into());
    }

    fn on_remaining_time(&mut self, minutes: u16) {
        self.update(SensorKind::RemainingTime, minutes.into());
    }

    fn on_bath_time_setting(&mut self, minutes: u16) {
        self.update(SensorKind::SettingBathTime, minutes.into());
    }

    fn on_total_uptime(&mut self, minutes: u32) {
        self.update(SensorKind::TotalUptime, minutes);
    }

    fn on_max_bath_temperature(&mut self, celsius: u16) {
        self.update(SensorKind::MaxBathTemperature, celsius.into());
    }

    fn on_overheating_pcb_limit(&mut self, celsius: u16) {
        self.update(SensorKind::OverheatingPcbLimit, celsius.into());
    }

    fn on_session_uptime(&mut self, seconds: u32) {
        self.update(SensorKind::SessionUptime, seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::testing::Recorder;

    #[test]
    fn test_publishes_enabled_sensors_on_change() {
        let recorder = Recorder::new();
        let config = SensorsConfig {
            current_temperature: true,
            ..Default::default()
        };
        let mut sensors = SensorEntities::new(config, &recorder);

        sensors.on_temperature(70);
        sensors.on_temperature(70);
        sensors.on_temperature(71);
        sensors.on_remaining_time(30);

        assert_eq!(
            recorder.updates(),
            [
                EntityUpdate::Sensor {
                    kind: SensorKind::CurrentTemperature,
                    value: 70
                },
                EntityUpdate::Sensor {
                    kind: SensorKind::CurrentTemperature,
                    value: 71
                },
            ]
        );
        assert_eq!(sensors.value(SensorKind::CurrentTemperature), Some(71));
        assert_eq!(sensors.value(SensorKind::RemainingTime), None);
    }
}
