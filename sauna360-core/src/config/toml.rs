//! Minimal TOML reader for the device configuration
//!
//! Handles only the subset the configuration file uses. It does NOT
//! support the full TOML spec.
//!
//! Supported:
//! - Key = value pairs (string, integer, float, boolean)
//! - [section] and [section.subsection] headers
//! - Comments (# ...), including trailing comments
//!
//! NOT supported:
//! - Arrays and inline tables
//! - Multi-line strings
//! - Dotted keys outside section headers
//!
//! Unknown keys inside a known section are ignored.

use sauna360_hal::Parity;

use super::types::{
    BathTimeNumberConfig, ClimateConfig, Model, SaunaConfig, TemperatureNumberConfig,
};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection { line: usize },
    /// Value of the wrong type or out of its domain
    InvalidValue { line: usize },
    /// Line is neither a header nor a key/value pair
    InvalidLine { line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Uart,
    BathTimeNumber,
    BathTemperatureNumber,
    MaxBathTemperatureNumber,
    Sensor,
    BinarySensor,
    TextSensor,
    Switch,
    Climate,
}

/// Parse configuration text
///
/// The result is not validated; call [`SaunaConfig::validate`] on it.
pub fn parse_config(input: &str) -> Result<SaunaConfig, ParseError> {
    let mut config = SaunaConfig::new();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])
                .ok_or(ParseError::InvalidSection { line: line_no })?;
            open_section(section, &mut config);
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine { line: line_no })?;
        apply_value(section, key, value, &mut config)
            .map_err(|_| ParseError::InvalidValue { line: line_no })?;
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Option<Section> {
    match header.trim() {
        "uart" => Some(Section::Uart),
        "number.bath_time" => Some(Section::BathTimeNumber),
        "number.bath_temperature" => Some(Section::BathTemperatureNumber),
        "number.max_bath_temperature" => Some(Section::MaxBathTemperatureNumber),
        "sensor" => Some(Section::Sensor),
        "binary_sensor" => Some(Section::BinarySensor),
        "text_sensor" => Some(Section::TextSensor),
        "switch" => Some(Section::Switch),
        "climate" => Some(Section::Climate),
        _ => None,
    }
}

/// A header alone enables the entity it names
fn open_section(section: Section, config: &mut SaunaConfig) {
    match section {
        Section::BathTimeNumber => {
            config.number.bath_time.get_or_insert_with(Default::default);
        }
        Section::BathTemperatureNumber => {
            config
                .number
                .bath_temperature
                .get_or_insert_with(Default::default);
        }
        Section::MaxBathTemperatureNumber => {
            config
                .number
                .max_bath_temperature
                .get_or_insert_with(Default::default);
        }
        Section::Climate => {
            config.climate.get_or_insert_with(Default::default);
        }
        _ => {}
    }
}

struct InvalidValue;

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut SaunaConfig,
) -> Result<(), InvalidValue> {
    match section {
        Section::Root => {
            if key == "model" {
                config.model = Model::from_name(parse_string(value)).ok_or(InvalidValue)?;
            }
        }
        Section::Uart => match key {
            "baud_rate" => config.uart.baud_rate = parse_int(value)?,
            "data_bits" => config.uart.data_bits = parse_int(value)?,
            "parity" => config.uart.parity = Parity::from_name(parse_string(value)).ok_or(InvalidValue)?,
            "stop_bits" => config.uart.stop_bits = parse_int(value)?,
            _ => {}
        },
        Section::BathTimeNumber => {
            let number = config.number.bath_time.get_or_insert_with(Default::default);
            apply_bath_time_number(number, key, value)?;
        }
        Section::BathTemperatureNumber => {
            let number = config
                .number
                .bath_temperature
                .get_or_insert_with(Default::default);
            apply_temperature_number(number, key, value)?;
        }
        Section::MaxBathTemperatureNumber => {
            let number = config
                .number
                .max_bath_temperature
                .get_or_insert_with(Default::default);
            apply_temperature_number(number, key, value)?;
        }
        Section::Sensor => {
            let s = &mut config.sensor;
            let flag = match key {
                "current_temperature" => &mut s.current_temperature,
                "setting_temperature" => &mut s.setting_temperature,
                "remaining_time" => &mut s.remaining_time,
                "setting_bath_time" => &mut s.setting_bath_time,
                "total_uptime" => &mut s.total_uptime,
                "max_bath_temperature" => &mut s.max_bath_temperature,
                "overheating_pcb_limit" => &mut s.overheating_pcb_limit,
                "session_uptime" => &mut s.session_uptime,
                _ => return Ok(()),
            };
            *flag = parse_bool(value)?;
        }
        Section::BinarySensor => {
            let b = &mut config.binary_sensor;
            let flag = match key {
                "heater_status" => &mut b.heater_status,
                "light_status" => &mut b.light_status,
                "ready_status" => &mut b.ready_status,
                _ => return Ok(()),
            };
            *flag = parse_bool(value)?;
        }
        Section::TextSensor => {
            let t = &mut config.text_sensor;
            let flag = match key {
                "heater_state" => &mut t.heater_state,
                "session_uptime" => &mut t.session_uptime,
                _ => return Ok(()),
            };
            *flag = parse_bool(value)?;
        }
        Section::Switch => {
            let s = &mut config.switch;
            let flag = match key {
                "light_relay" => &mut s.light_relay,
                "heater_relay" => &mut s.heater_relay,
                _ => return Ok(()),
            };
            *flag = parse_bool(value)?;
        }
        Section::Climate => {
            let climate: &mut ClimateConfig = config.climate.get_or_insert_with(Default::default);
            match key {
                "bath_temperature_number" => climate.bath_temperature_number = parse_bool(value)?,
                "heater_relay" => climate.heater_relay = parse_bool(value)?,
                _ => {}
            }
        }
    }
    Ok(())
}

fn apply_bath_time_number(
    number: &mut BathTimeNumberConfig,
    key: &str,
    value: &str,
) -> Result<(), InvalidValue> {
    if key == "default_value" {
        number.default_value = Some(parse_float(value)?);
    }
    Ok(())
}

fn apply_temperature_number(
    number: &mut TemperatureNumberConfig,
    key: &str,
    value: &str,
) -> Result<(), InvalidValue> {
    match key {
        "min_value" => number.min_value = parse_float(value)?,
        "max_value" => number.max_value = parse_float(value)?,
        "default_value" => number.default_value = Some(parse_float(value)?),
        _ => {}
    }
    Ok(())
}

/// Drop a trailing comment unless the `#` sits inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse a "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, InvalidValue> {
    value.parse().map_err(|_| InvalidValue)
}

fn parse_float(value: &str) -> Result<f32, InvalidValue> {
    let v: f32 = value.parse().map_err(|_| InvalidValue)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(InvalidValue)
    }
}

fn parse_bool(value: &str) -> Result<bool, InvalidValue> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(InvalidValue),
    }
}
