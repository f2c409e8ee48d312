//! Console line protocol
//!
//! A plain text interface on a second UART. Each input line is one
//! command; each entity update is written as one output line.
//!
//! ```text
//! > light on
//! > bath_temperature 80
//! > climate target 85
//! < switch.light_relay=on
//! < number.bath_temperature=80
//! < climate.sauna=heat current=72 target=85
//! ```

use core::fmt::Write;

use heapless::{String, Vec};

use crate::driver::{ControlError, Sauna360};
use crate::entity::{ClimateCall, ClimateMode, EntityUpdate, NumberKind, SwitchKind};
use crate::traits::Sauna360Listener;

/// Longest accepted input line
pub const MAX_LINE_LEN: usize = 64;

/// Capacity of one formatted output line
pub const MAX_OUTPUT_LEN: usize = 96;

/// Formatted output line, without terminator
pub type OutputLine = String<MAX_OUTPUT_LEN>;

/// Console errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError {
    /// First word is not a command
    UnknownCommand,
    /// Missing or malformed argument
    InvalidArgument,
    /// Line exceeded [`MAX_LINE_LEN`]; the rest of it is discarded
    LineTooLong,
    /// Line is not valid UTF-8
    InvalidEncoding,
}

/// A parsed console command
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Switch(SwitchKind, bool),
    Number(NumberKind, f32),
    Climate(ClimateCall),
}

impl Command {
    /// Parse one line, surrounding whitespace ignored
    pub fn parse(line: &str) -> Result<Self, ConsoleError> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or(ConsoleError::UnknownCommand)?;

        let parsed = match command {
            "light" => Command::Switch(SwitchKind::LightRelay, parse_on_off(words.next())?),
            "heater" => Command::Switch(SwitchKind::HeaterRelay, parse_on_off(words.next())?),
            "bath_time" => Command::Number(NumberKind::BathTime, parse_number(words.next())?),
            "bath_temperature" => {
                Command::Number(NumberKind::BathTemperature, parse_number(words.next())?)
            }
            "max_bath_temperature" => {
                Command::Number(NumberKind::MaxBathTemperature, parse_number(words.next())?)
            }
            "climate" => match words.next() {
                Some("heat") => Command::Climate(ClimateCall::new().with_mode(ClimateMode::Heat)),
                Some("off") => Command::Climate(ClimateCall::new().with_mode(ClimateMode::Off)),
                Some("target") => Command::Climate(
                    ClimateCall::new().with_target_temperature(parse_number(words.next())?),
                ),
                _ => return Err(ConsoleError::InvalidArgument),
            },
            _ => return Err(ConsoleError::UnknownCommand),
        };

        if words.next().is_some() {
            return Err(ConsoleError::InvalidArgument);
        }
        Ok(parsed)
    }

    /// Run the command against the driver
    pub fn apply<L: Sauna360Listener>(&self, driver: &mut Sauna360<L>) -> Result<(), ControlError> {
        match *self {
            Command::Switch(kind, on) => driver.control_switch(kind, on).map(|_| ()),
            Command::Number(kind, value) => driver.control_number(kind, value).map(|_| ()),
            Command::Climate(call) => driver.control_climate(call),
        }
    }
}

fn parse_on_off(word: Option<&str>) -> Result<bool, ConsoleError> {
    match word {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err(ConsoleError::InvalidArgument),
    }
}

fn parse_number(word: Option<&str>) -> Result<f32, ConsoleError> {
    let value: f32 = word
        .ok_or(ConsoleError::InvalidArgument)?
        .parse()
        .map_err(|_| ConsoleError::InvalidArgument)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConsoleError::InvalidArgument)
    }
}

/// Assembles input bytes into commands
#[derive(Debug, Default)]
pub struct LineReader {
    buf: Vec<u8, MAX_LINE_LEN>,
    overflowed: bool,
}

impl LineReader {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflowed: false,
        }
    }

    /// Feed a byte; a command is returned when it ends a line
    ///
    /// Blank lines produce nothing. Both `\n` and `\r` end a line.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Command>, ConsoleError> {
        if byte != b'\n' && byte != b'\r' {
            if !self.overflowed && self.buf.push(byte).is_err() {
                self.overflowed = true;
            }
            return Ok(None);
        }

        if self.overflowed {
            self.buf.clear();
            self.overflowed = false;
            return Err(ConsoleError::LineTooLong);
        }

        let result = match core::str::from_utf8(&self.buf) {
            Ok(line) if line.trim().is_empty() => Ok(None),
            Ok(line) => Command::parse(line).map(Some),
            Err(_) => Err(ConsoleError::InvalidEncoding),
        };
        self.buf.clear();
        result
    }
}

/// Render an update as `<domain>.<object_id>=<value>`
pub fn format_update(update: &EntityUpdate) -> OutputLine {
    let mut line = OutputLine::new();
    // Every value fits the capacity; a full line is cut short
    let _ = write!(line, "{}.{}=", update.domain(), update.object_id());
    let _ = match update {
        EntityUpdate::Sensor { value, .. } => write!(line, "{}", value),
        EntityUpdate::BinarySensor { state, .. } | EntityUpdate::Switch { state, .. } => {
            line.push_str(on_off(*state)).map_err(|_| core::fmt::Error)
        }
        EntityUpdate::Text { value, .. } => line.push_str(value).map_err(|_| core::fmt::Error),
        EntityUpdate::Number { value, .. } => write!(line, "{}", value),
        EntityUpdate::Climate(state) => {
            let _ = line.push_str(state.mode.as_str());
            if let Some(c) = state.current_temperature {
                let _ = write!(line, " current={}", c);
            }
            match state.target_temperature {
                Some(c) => write!(line, " target={}", c),
                None => Ok(()),
            }
        }
    };
    line
}

fn on_off(state: bool) -> &'static str {
    if state {
        "on"
    } else {
        "off"
    }
}
