//! Entity model
//!
//! The driver exposes its state as a fixed set of entities. Numbers and
//! switches are owned by the driver itself because they feed commands
//! back to the heater; everything else is a listener that turns driver
//! callbacks into [`EntityUpdate`]s for a [`Publish`](crate::traits::Publish)
//! sink.

pub mod binary_sensor;
pub mod climate;
pub mod control;
pub mod sensor;
pub mod text_sensor;

#[cfg(test)]
pub(crate) mod testing;

pub use binary_sensor::BinarySensorEntities;
pub use climate::Sauna360Climate;
pub use control::ControlStatePublisher;
pub use sensor::SensorEntities;
pub use text_sensor::TextSensorEntities;

use heapless::String;

use crate::config::SaunaConfig;
use crate::traits::Publish;

/// Maximum length of a text sensor value
pub const MAX_TEXT_LEN: usize = 64;

/// Text sensor value
pub type Text = String<MAX_TEXT_LEN>;

/// Numeric sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKind {
    CurrentTemperature,
    SettingTemperature,
    RemainingTime,
    SettingBathTime,
    TotalUptime,
    MaxBathTemperature,
    OverheatingPcbLimit,
    SessionUptime,
}

impl SensorKind {
    pub const COUNT: usize = 8;

    pub const ALL: [SensorKind; Self::COUNT] = [
        SensorKind::CurrentTemperature,
        SensorKind::SettingTemperature,
        SensorKind::RemainingTime,
        SensorKind::SettingBathTime,
        SensorKind::TotalUptime,
        SensorKind::MaxBathTemperature,
        SensorKind::OverheatingPcbLimit,
        SensorKind::SessionUptime,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn object_id(self) -> &'static str {
        match self {
            SensorKind::CurrentTemperature => "current_temperature",
            SensorKind::SettingTemperature => "setting_temperature",
            SensorKind::RemainingTime => "remaining_time",
            SensorKind::SettingBathTime => "setting_bath_time",
            SensorKind::TotalUptime => "total_uptime",
            SensorKind::MaxBathTemperature => "max_bath_temperature",
            SensorKind::OverheatingPcbLimit => "overheating_pcb_limit",
            SensorKind::SessionUptime => "session_uptime",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            SensorKind::CurrentTemperature
            | SensorKind::SettingTemperature
            | SensorKind::MaxBathTemperature
            | SensorKind::OverheatingPcbLimit => "°C",
            SensorKind::RemainingTime | SensorKind::SettingBathTime | SensorKind::TotalUptime => {
                "min"
            }
            SensorKind::SessionUptime => "s",
        }
    }
}

/// Binary sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BinarySensorKind {
    HeaterStatus,
    LightStatus,
    ReadyStatus,
}

impl BinarySensorKind {
    pub const COUNT: usize = 3;

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn object_id(self) -> &'static str {
        match self {
            BinarySensorKind::HeaterStatus => "heater_status",
            BinarySensorKind::LightStatus => "light_status",
            BinarySensorKind::ReadyStatus => "ready_status",
        }
    }
}

/// Text sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextSensorKind {
    HeaterState,
    SessionUptime,
}

impl TextSensorKind {
    pub const fn object_id(self) -> &'static str {
        match self {
            TextSensorKind::HeaterState => "heater_state",
            TextSensorKind::SessionUptime => "session_uptime_text",
        }
    }
}

/// Numbers that write settings to the heater
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NumberKind {
    BathTime,
    BathTemperature,
    MaxBathTemperature,
}

impl NumberKind {
    pub const COUNT: usize = 3;

    pub const ALL: [NumberKind; Self::COUNT] = [
        NumberKind::BathTime,
        NumberKind::BathTemperature,
        NumberKind::MaxBathTemperature,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn object_id(self) -> &'static str {
        match self {
            NumberKind::BathTime => "bath_time",
            NumberKind::BathTemperature => "bath_temperature",
            NumberKind::MaxBathTemperature => "max_bath_temperature",
        }
    }
}

/// Relay switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchKind {
    LightRelay,
    HeaterRelay,
}

impl SwitchKind {
    pub const COUNT: usize = 2;

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn object_id(self) -> &'static str {
        match self {
            SwitchKind::LightRelay => "light_relay",
            SwitchKind::HeaterRelay => "heater_relay",
        }
    }
}

/// Climate operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClimateMode {
    Off,
    Heat,
}

impl ClimateMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ClimateMode::Off => "off",
            ClimateMode::Heat => "heat",
        }
    }
}

/// Published state of the climate entity
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClimateState {
    pub mode: ClimateMode,
    pub current_temperature: Option<f32>,
    pub target_temperature: Option<f32>,
}

/// Request to change the climate entity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClimateCall {
    pub target_temperature: Option<f32>,
    pub mode: Option<ClimateMode>,
}

impl ClimateCall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_temperature(mut self, celsius: f32) -> Self {
        self.target_temperature = Some(celsius);
        self
    }

    pub fn with_mode(mut self, mode: ClimateMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// A state change to publish
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntityUpdate {
    Sensor { kind: SensorKind, value: u32 },
    BinarySensor { kind: BinarySensorKind, state: bool },
    Text { kind: TextSensorKind, value: Text },
    Number { kind: NumberKind, value: f32 },
    Switch { kind: SwitchKind, state: bool },
    Climate(ClimateState),
}

impl EntityUpdate {
    /// Entity domain name
    pub fn domain(&self) -> &'static str {
        match self {
            EntityUpdate::Sensor { .. } => "sensor",
            EntityUpdate::BinarySensor { .. } => "binary_sensor",
            EntityUpdate::Text { .. } => "text_sensor",
            EntityUpdate::Number { .. } => "number",
            EntityUpdate::Switch { .. } => "switch",
            EntityUpdate::Climate(_) => "climate",
        }
    }

    /// Entity object id within its domain
    pub fn object_id(&self) -> &'static str {
        match self {
            EntityUpdate::Sensor { kind, .. } => kind.object_id(),
            EntityUpdate::BinarySensor { kind, .. } => kind.object_id(),
            EntityUpdate::Text { kind, .. } => kind.object_id(),
            EntityUpdate::Number { kind, .. } => kind.object_id(),
            EntityUpdate::Switch { kind, .. } => kind.object_id(),
            EntityUpdate::Climate(_) => "sauna",
        }
    }
}

/// Every listener-side entity, wired to one publisher each
pub type Entities<P> = (
    SensorEntities<P>,
    BinarySensorEntities<P>,
    TextSensorEntities<P>,
    Option<Sauna360Climate<P>>,
    ControlStatePublisher<P>,
);

/// Build the listener-side entities enabled in `config`
pub fn entities<P: Publish + Clone>(config: &SaunaConfig, publisher: P) -> Entities<P> {
    let climate = config
        .climate
        .map(|links| Sauna360Climate::new(links, publisher.clone()));
    (
        SensorEntities::new(config.sensor, publisher.clone()),
        BinarySensorEntities::new(config.binary_sensor, publisher.clone()),
        TextSensorEntities::new(config.text_sensor, publisher.clone()),
        climate,
        ControlStatePublisher::new(publisher),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_addressing() {
        let update = EntityUpdate::Number {
            kind: NumberKind::BathTime,
            value: 60.0,
        };
        assert_eq!(update.domain(), "number");
        assert_eq!(update.object_id(), "bath_time");

        let update = EntityUpdate::Text {
            kind: TextSensorKind::SessionUptime,
            value: Text::new(),
        };
        assert_eq!(update.domain(), "text_sensor");
        assert_eq!(update.object_id(), "session_uptime_text");
    }

    #[test]
    fn test_kind_indices_are_dense() {
        for (i, kind) in SensorKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        for (i, kind) in NumberKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
