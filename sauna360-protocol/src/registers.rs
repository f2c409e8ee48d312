//! Register codes and data word layouts
//!
//! Temperatures travel as fixed-point values: the live temperature and the
//! setpoint in 1/9 °C, the limit registers in 1/18 °C. Bath time is packed
//! as hours × 64 + minutes.

// Register codes
pub const REG_HEATER_STATUS: u16 = 0x3400;
pub const REG_CLIMATE_SENSOR: u16 = 0x3801;
pub const REG_BATH_TIME: u16 = 0x4002;
pub const REG_PCB_LIMIT: u16 = 0x4003;
pub const REG_TEMPERATURE: u16 = 0x6000;
pub const REG_HEATER_CONTROL: u16 = 0x7000;
pub const REG_RELAY_BITMAP: u16 = 0x7180;
pub const REG_TOTAL_UPTIME: u16 = 0x9400;
pub const REG_REMAINING_TIME: u16 = 0x9401;
pub const REG_DOOR: u16 = 0xB000;
const REG_SENSOR_ERROR_MASK: u16 = 0xFF00;
const REG_SENSOR_ERROR_BASE: u16 = 0xB600;

// Heater status bits
const STATUS_LIGHT_BIT: u32 = 3;
const STATUS_HEATER_BIT: u32 = 4;
const STATUS_STANDBY_BIT: u32 = 5;

// Relay bitmap
pub const RELAY_LIGHT_MASK: u32 = 0x0002_0000;
pub const RELAY_COILS_MASK: u32 = 0x0001_C000;

// Temperature fields
const TEMP_FIELD_MASK: u32 = 0x7FF;
const SETPOINT_SHIFT: u32 = 11;
const TEMP_STEPS_PER_DEGREE: u32 = 9;
const LIMIT_STEPS_PER_DEGREE: u32 = 18;
const PCB_LIMIT_SHIFT: u32 = 11;
const MAX_TEMP_SHIFT: u32 = 20;
const MAX_TEMP_MASK: u32 = 0xFFF;

// Bath time field
const BATH_TIME_MASK: u32 = 0xFFF;
const MINUTES_PER_HOUR_SLOT: u32 = 64;

/// Toggle values written to [`REG_HEATER_CONTROL`]
pub const TOGGLE_HEATER: u32 = 0x1;
pub const TOGGLE_LIGHT: u32 = 0x2;

/// Known registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    HeaterStatus,
    /// Humidity/temperature sensor of Combi and Elite heaters
    ClimateSensor,
    BathTime,
    PcbLimit,
    Temperature,
    HeaterControl,
    RelayBitmap,
    TotalUptime,
    RemainingTime,
    Door,
    /// Sensor fault family, low byte identifies the sensor
    SensorError(u8),
    Unknown(u16),
}

impl Register {
    /// Classify a register code
    pub fn from_code(code: u16) -> Self {
        match code {
            REG_HEATER_STATUS => Register::HeaterStatus,
            REG_CLIMATE_SENSOR => Register::ClimateSensor,
            REG_BATH_TIME => Register::BathTime,
            REG_PCB_LIMIT => Register::PcbLimit,
            REG_TEMPERATURE => Register::Temperature,
            REG_HEATER_CONTROL => Register::HeaterControl,
            REG_RELAY_BITMAP => Register::RelayBitmap,
            REG_TOTAL_UPTIME => Register::TotalUptime,
            REG_REMAINING_TIME => Register::RemainingTime,
            REG_DOOR => Register::Door,
            c if c & REG_SENSOR_ERROR_MASK == REG_SENSOR_ERROR_BASE => {
                Register::SensorError(c as u8)
            }
            other => Register::Unknown(other),
        }
    }
}

/// Decoded heater status word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaterStatus {
    pub light_on: bool,
    pub heater_on: bool,
    /// Heater reports standby regardless of the heater bit
    pub standby: bool,
}

impl HeaterStatus {
    pub fn from_data(data: u32) -> Self {
        Self {
            light_on: bit(data, STATUS_LIGHT_BIT),
            heater_on: bit(data, STATUS_HEATER_BIT),
            standby: bit(data, STATUS_STANDBY_BIT),
        }
    }
}

/// Decoded relay bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelayBitmap {
    pub light_on: bool,
    /// All three heater coil relays energized
    pub heating: bool,
}

impl RelayBitmap {
    pub fn from_data(data: u32) -> Self {
        Self {
            light_on: data & RELAY_LIGHT_MASK != 0,
            heating: data & RELAY_COILS_MASK == RELAY_COILS_MASK,
        }
    }
}

/// Raw 1/9 °C actual-temperature field of the temperature register
pub fn temperature_raw(data: u32) -> u32 {
    data & TEMP_FIELD_MASK
}

/// Raw 1/9 °C setpoint field of the temperature register
pub fn setpoint_raw(data: u32) -> u32 {
    (data >> SETPOINT_SHIFT) & TEMP_FIELD_MASK
}

/// Whole degrees from a 1/9 °C raw value
pub fn raw_to_celsius(raw: u32) -> u16 {
    (raw / TEMP_STEPS_PER_DEGREE) as u16
}

/// 1/9 °C raw value of whole degrees
pub fn celsius_to_raw(celsius: u16) -> u32 {
    celsius as u32 * TEMP_STEPS_PER_DEGREE
}

/// Temperature register data that requests `setpoint_c`
///
/// The actual-temperature field is filled with the last value the heater
/// reported.
pub fn encode_setpoint(setpoint_c: u16, temperature_raw: u32) -> u32 {
    (celsius_to_raw(setpoint_c) << SETPOINT_SHIFT)
        | (temperature_raw & TEMP_FIELD_MASK)
}

/// Raw bath time field of the bath time register
pub fn bath_time_raw(data: u32) -> u32 {
    data & BATH_TIME_MASK
}

/// Raw 1/18 °C max bath temperature field of the bath time register
pub fn max_temperature_raw(data: u32) -> u32 {
    (data >> MAX_TEMP_SHIFT) & MAX_TEMP_MASK
}

/// Whole degrees from a 1/18 °C raw value
pub fn limit_raw_to_celsius(raw: u32) -> u16 {
    (raw / LIMIT_STEPS_PER_DEGREE) as u16
}

/// 1/18 °C raw value for whole degrees
pub fn celsius_to_limit_raw(celsius: u16) -> u32 {
    celsius as u32 * LIMIT_STEPS_PER_DEGREE
}

/// Overheating PCB limit in whole degrees
pub fn pcb_limit_celsius(data: u32) -> u16 {
    limit_raw_to_celsius((data >> PCB_LIMIT_SHIFT) & TEMP_FIELD_MASK)
}

/// Bath time register data from a raw bath time and a raw max temperature
pub fn encode_bath_time_register(bath_time_raw: u32, max_temperature_raw: u32) -> u32 {
    (bath_time_raw & BATH_TIME_MASK) | ((max_temperature_raw & MAX_TEMP_MASK) << MAX_TEMP_SHIFT)
}

/// Minutes from a packed hours/minutes bath time
pub fn decode_bath_time_minutes(raw: u32) -> u16 {
    let hours = raw / MINUTES_PER_HOUR_SLOT;
    let minutes = raw % MINUTES_PER_HOUR_SLOT;
    (hours * 60 + minutes) as u16
}

/// Packed hours/minutes bath time for a number of minutes
pub fn encode_bath_time_raw(minutes: u16) -> u32 {
    let minutes = minutes as u32;
    (minutes / 60) * MINUTES_PER_HOUR_SLOT + minutes % 60
}

/// Door/interlock conditions reported on [`REG_DOOR`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DoorEvent {
    /// Start refused by the safety interlock
    StartBlocked,
    /// Door stayed open and the bath was cancelled
    BathCancelled,
    /// Door was opened during the bath
    DoorWasOpen,
}

impl DoorEvent {
    /// Recognize a door code and the acknowledgement the panel answers with
    pub fn from_data(data: u32) -> Option<(Self, u32)> {
        match data {
            0x0006_0001 => Some((DoorEvent::StartBlocked, 0x0006_0101)),
            0x0013_0001 => Some((DoorEvent::StartBlocked, 0x0013_0101)),
            0x0013_0003 => Some((DoorEvent::BathCancelled, 0x0013_0103)),
            0x0014_0003 => Some((DoorEvent::DoorWasOpen, 0x0014_0000)),
            _ => None,
        }
    }
}

/// Whether the door register allows a start
pub fn door_ready(data: u32) -> bool {
    data & 1 == 0
}

/// Sensor faults reported on the sensor error register family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorFault {
    /// Room sensor missing or broken
    RoomSensor,
    /// Thermal cut-out tripped and needs a manual reset
    HighLimitTripped,
}

impl SensorFault {
    pub fn from_data(data: u32) -> Option<Self> {
        match data & 0xF000_0000 {
            0x3000_0000 => Some(SensorFault::RoomSensor),
            0x1000_0000 => Some(SensorFault::HighLimitTripped),
            _ => None,
        }
    }
}

fn bit(data: u32, n: u32) -> bool {
    (data >> n) & 1 != 0
}
