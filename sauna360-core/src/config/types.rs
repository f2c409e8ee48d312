//! Configuration type definitions
//!
//! A configuration names the heater model, the bus line settings and the
//! entities to expose. Section presence enables an entity; numbers carry
//! their range and an optional default written once the heater is
//! reachable.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use sauna360_hal::{DataBits, Parity, StopBits, UartConfig, SAUNA_BUS_BAUDRATE};

use crate::entity::{NumberKind, SensorKind};

/// Lowest temperature a temperature number may be configured for (°C)
pub const TEMPERATURE_MIN_C: f32 = 40.0;

/// Highest temperature a temperature number may be configured for (°C)
pub const TEMPERATURE_MAX_C: f32 = 110.0;

/// Shortest bath time (minutes)
pub const BATH_TIME_MIN_MINUTES: f32 = 1.0;

/// Longest bath time (minutes)
pub const BATH_TIME_MAX_MINUTES: f32 = 360.0;

/// Heater model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Model {
    #[default]
    Pure,
    Combi,
    Elite,
}

impl Model {
    /// Parse a model name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        [Model::Pure, Model::Combi, Model::Elite]
            .into_iter()
            .find(|m| name.eq_ignore_ascii_case(m.name()))
    }

    pub const fn name(self) -> &'static str {
        match self {
            Model::Pure => "pure",
            Model::Combi => "combi",
            Model::Elite => "elite",
        }
    }
}

/// Bus line settings as written in the configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UartSettings {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: u8,
}

impl Default for UartSettings {
    fn default() -> Self {
        Self {
            baud_rate: SAUNA_BUS_BAUDRATE,
            data_bits: 8,
            parity: Parity::Even,
            stop_bits: 1,
        }
    }
}

impl UartSettings {
    /// Convert to a HAL line configuration
    ///
    /// Returns `None` for bit counts the HAL cannot express.
    pub fn to_uart_config(&self) -> Option<UartConfig> {
        Some(UartConfig {
            baudrate: self.baud_rate,
            data_bits: DataBits::from_count(self.data_bits)?,
            parity: self.parity,
            stop_bits: StopBits::from_count(self.stop_bits)?,
        })
    }
}

/// Bath time number
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BathTimeNumberConfig {
    /// Minutes written once the heater is reachable
    pub default_value: Option<f32>,
}

/// Bath temperature or max bath temperature number
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TemperatureNumberConfig {
    pub min_value: f32,
    pub max_value: f32,
    /// Degrees written once the heater is reachable
    pub default_value: Option<f32>,
}

impl Default for TemperatureNumberConfig {
    fn default() -> Self {
        Self {
            min_value: TEMPERATURE_MIN_C,
            max_value: TEMPERATURE_MAX_C,
            default_value: None,
        }
    }
}

/// Driver-owned numbers
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NumbersConfig {
    pub bath_time: Option<BathTimeNumberConfig>,
    pub bath_temperature: Option<TemperatureNumberConfig>,
    pub max_bath_temperature: Option<TemperatureNumberConfig>,
}

impl NumbersConfig {
    /// Range of a configured number, `None` when it is not configured
    pub fn range(&self, kind: NumberKind) -> Option<(f32, f32)> {
        match kind {
            NumberKind::BathTime => self
                .bath_time
                .map(|_| (BATH_TIME_MIN_MINUTES, BATH_TIME_MAX_MINUTES)),
            NumberKind::BathTemperature => self.bath_temperature.map(|n| (n.min_value, n.max_value)),
            NumberKind::MaxBathTemperature => {
                self.max_bath_temperature.map(|n| (n.min_value, n.max_value))
            }
        }
    }

    /// Configured default of a number
    pub fn default_value(&self, kind: NumberKind) -> Option<f32> {
        match kind {
            NumberKind::BathTime => self.bath_time.and_then(|n| n.default_value),
            NumberKind::BathTemperature => self.bath_temperature.and_then(|n| n.default_value),
            NumberKind::MaxBathTemperature => {
                self.max_bath_temperature.and_then(|n| n.default_value)
            }
        }
    }
}

/// Numeric sensors to publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SensorsConfig {
    pub current_temperature: bool,
    pub setting_temperature: bool,
    pub remaining_time: bool,
    pub setting_bath_time: bool,
    pub total_uptime: bool,
    pub max_bath_temperature: bool,
    pub overheating_pcb_limit: bool,
    pub session_uptime: bool,
}

impl SensorsConfig {
    pub fn enabled(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::CurrentTemperature => self.current_temperature,
            SensorKind::SettingTemperature => self.setting_temperature,
            SensorKind::RemainingTime => self.remaining_time,
            SensorKind::SettingBathTime => self.setting_bath_time,
            SensorKind::TotalUptime => self.total_uptime,
            SensorKind::MaxBathTemperature => self.max_bath_temperature,
            SensorKind::OverheatingPcbLimit => self.overheating_pcb_limit,
            SensorKind::SessionUptime => self.session_uptime,
        }
    }
}

/// Binary sensors to publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BinarySensorsConfig {
    pub heater_status: bool,
    pub light_status: bool,
    pub ready_status: bool,
}

/// Text sensors to publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TextSensorsConfig {
    pub heater_state: bool,
    pub session_uptime: bool,
}

/// Relay switches to expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SwitchesConfig {
    pub light_relay: bool,
    pub heater_relay: bool,
}

/// Climate entity and the entities it drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClimateConfig {
    /// Route target temperature through the bath temperature number
    pub bath_temperature_number: bool,
    /// Route mode changes through the heater relay switch
    pub heater_relay: bool,
}

/// Complete configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SaunaConfig {
    pub model: Model,
    pub uart: UartSettings,
    pub number: NumbersConfig,
    pub sensor: SensorsConfig,
    pub binary_sensor: BinarySensorsConfig,
    pub text_sensor: TextSensorsConfig,
    pub switch: SwitchesConfig,
    pub climate: Option<ClimateConfig>,
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Line settings differ from 19200 baud 8E1
    UnsupportedUart,
    /// A temperature bound lies outside 40..=110 °C
    BoundOutOfRange { number: NumberKind, value: f32 },
    /// `min_value` is above `max_value`
    MinAboveMax { number: NumberKind },
    /// Default lies outside the number's range
    DefaultOutOfRange { number: NumberKind, value: f32 },
    /// Climate links a number that is not configured
    MissingBathTemperatureNumber,
    /// Climate links a switch that is not configured
    MissingHeaterRelay,
}

impl SaunaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self
            .uart
            .to_uart_config()
            .is_some_and(|uart| uart.is_sauna_bus())
        {
            return Err(ConfigError::UnsupportedUart);
        }

        if let Some(n) = self.number.bath_time {
            check_default(
                NumberKind::BathTime,
                n.default_value,
                BATH_TIME_MIN_MINUTES,
                BATH_TIME_MAX_MINUTES,
            )?;
        }
        if let Some(n) = self.number.bath_temperature {
            validate_temperature_number(NumberKind::BathTemperature, &n)?;
        }
        if let Some(n) = self.number.max_bath_temperature {
            validate_temperature_number(NumberKind::MaxBathTemperature, &n)?;
        }

        if let Some(climate) = self.climate {
            if climate.bath_temperature_number && self.number.bath_temperature.is_none() {
                return Err(ConfigError::MissingBathTemperatureNumber);
            }
            if climate.heater_relay && !self.switch.heater_relay {
                return Err(ConfigError::MissingHeaterRelay);
            }
        }

        Ok(())
    }
}

fn validate_temperature_number(
    kind: NumberKind,
    n: &TemperatureNumberConfig,
) -> Result<(), ConfigError> {
    for bound in [n.min_value, n.max_value] {
        if !(TEMPERATURE_MIN_C..=TEMPERATURE_MAX_C).contains(&bound) {
            return Err(ConfigError::BoundOutOfRange {
                number: kind,
                value: bound,
            });
        }
    }
    if n.min_value > n.max_value {
        return Err(ConfigError::MinAboveMax { number: kind });
    }
    check_default(kind, n.default_value, n.min_value, n.max_value)
}

fn check_default(kind: NumberKind, value: Option<f32>, min: f32, max: f32) -> Result<(), ConfigError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(ConfigError::DefaultOutOfRange {
            number: kind,
            value: v,
        }),
        _ => Ok(()),
    }
}
