//! Heater state reported through the heater state text sensor

use sauna360_protocol::registers::{DoorEvent, SensorFault};

/// Operating or fault state of the heater
///
/// Each variant maps to the fixed text shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaterState {
    /// Heater switched on
    On,
    /// Heater off or idle
    Standby,
    /// Coil relays energized
    Heating,
    /// Start refused by the safety interlock
    StartBlocked,
    /// Door left open, bath cancelled
    BathCancelled,
    /// Door was opened during the bath
    DoorWasOpen,
    /// Room temperature sensor fault
    RoomSensorFault,
    /// Thermal cut-out tripped
    HighLimitTripped,
}

impl HeaterState {
    /// Text published for this state
    pub const fn as_str(&self) -> &'static str {
        match self {
            HeaterState::On => "On",
            HeaterState::Standby => "Standby",
            HeaterState::Heating => "Heating",
            HeaterState::StartBlocked => "Operation blocked by not allowed start",
            HeaterState::BathCancelled => "Door opened too long, bath cancelled",
            HeaterState::DoorWasOpen => "Door has been open, check sauna",
            HeaterState::RoomSensorFault => {
                "Room temperature sensor not connected or malfunctioning"
            }
            HeaterState::HighLimitTripped => {
                "High temperature limit control tripped, must be reset"
            }
        }
    }

    /// Whether this state reports a fault the user has to act on
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            HeaterState::StartBlocked
                | HeaterState::BathCancelled
                | HeaterState::DoorWasOpen
                | HeaterState::RoomSensorFault
                | HeaterState::HighLimitTripped
        )
    }
}

impl From<DoorEvent> for HeaterState {
    fn from(event: DoorEvent) -> Self {
        match event {
            DoorEvent::StartBlocked => HeaterState::StartBlocked,
            DoorEvent::BathCancelled => HeaterState::BathCancelled,
            DoorEvent::DoorWasOpen => HeaterState::DoorWasOpen,
        }
    }
}

impl From<SensorFault> for HeaterState {
    fn from(fault: SensorFault) -> Self {
        match fault {
            SensorFault::RoomSensor => HeaterState::RoomSensorFault,
            SensorFault::HighLimitTripped => HeaterState::HighLimitTripped,
        }
    }
}
