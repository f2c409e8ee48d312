//! Driver callbacks
//!
//! Temperatures are whole degrees Celsius, times are minutes unless the
//! hook says otherwise. Every hook has an empty default so listeners only
//! implement what they display.

use crate::entity::{NumberKind, SwitchKind};
use crate::state::HeaterState;

/// Receiver of decoded heater state
pub trait Sauna360Listener {
    /// Actual cabin temperature
    fn on_temperature(&mut self, _celsius: u16) {}

    /// Bath temperature setpoint, reported only when it changes
    fn on_temperature_setting(&mut self, _celsius: u16) {}

    /// Time left in the running bath
    fn on_remaining_time(&mut self, _minutes: u16) {}

    /// Configured bath duration
    fn on_bath_time_setting(&mut self, _minutes: u16) {}

    /// Lifetime heater operating time
    fn on_total_uptime(&mut self, _minutes: u32) {}

    /// Upper limit for the bath temperature setpoint
    fn on_max_bath_temperature(&mut self, _celsius: u16) {}

    /// Overheating limit of the heater PCB
    fn on_overheating_pcb_limit(&mut self, _celsius: u16) {}

    /// Heater switched on or off
    fn on_heater_status(&mut self, _on: bool) {}

    /// Operating or fault state
    fn on_heater_state(&mut self, _state: HeaterState) {}

    /// Cabin light on or off
    fn on_light_status(&mut self, _on: bool) {}

    /// Whether the heater accepts a start
    fn on_ready_status(&mut self, _ready: bool) {}

    /// Seconds since the heater was switched on
    fn on_session_uptime(&mut self, _seconds: u32) {}

    /// Session uptime as `HH:MM:SS`
    fn on_session_uptime_text(&mut self, _text: &str) {}

    /// State of a driver-owned number changed
    fn on_number_state(&mut self, _kind: NumberKind, _value: f32) {}

    /// State of a driver-owned switch changed
    fn on_switch_state(&mut self, _kind: SwitchKind, _on: bool) {}
}

impl Sauna360Listener for () {}

impl<T: Sauna360Listener + ?Sized> Sauna360Listener for &mut T {
    fn on_temperature(&mut self, celsius: u16) {
        (**self).on_temperature(celsius)
    }
    fn on_temperature_setting(&mut self, celsius: u16) {
        (**self).on_temperature_setting(celsius)
    }
    fn on_remaining_time(&mut self, minutes: u16) {
        (**self).on_remaining_time(minutes)
    }
    fn on_bath_time_setting(&mut self, minutes: u16) {
        (**self).on_bath_time_setting(minutes)
    }
    fn on_total_uptime(&mut self, minutes: u32) {
        (**self).on_total_uptime(minutes)
    }
    fn on_max_bath_temperature(&mut self, celsius: u16) {
        (**self).on_max_bath_temperature(celsius)
    }
    fn on_overheating_pcb_limit(&mut self, celsius: u16) {
        (**self).on_overheating_pcb_limit(celsius)
    }
    fn on_heater_status(&mut self, on: bool) {
        (**self).on_heater_status(on)
    }
    fn on_heater_state(&mut self, state: HeaterState) {
        (**self).on_heater_state(state)
    }
    fn on_light_status(&mut self, on: bool) {
        (**self).on_light_status(on)
    }
    fn on_ready_status(&mut self, ready: bool) {
        (**self).on_ready_status(ready)
    }
    fn on_session_uptime(&mut self, seconds: u32) {
        (**self).on_session_uptime(seconds)
    }
    fn on_session_uptime_text(&mut self, text: &str) {
        (**self).on_session_uptime_text(text)
    }
    fn on_number_state(&mut self, kind: NumberKind, value: f32) {
        (**self).on_number_state(kind, value)
    }
    fn on_switch_state(&mut self, kind: SwitchKind, on: bool) {
        (**self).on_switch_state(kind, on)
    }
}

impl<T: Sauna360Listener> Sauna360Listener for Option<T> {
    fn on_temperature(&mut self, celsius: u16) {
        if let Some(l) = self {
            l.on_temperature(celsius)
        }
    }
    fn on_temperature_setting(&mut self, celsius: u16) {
        if let Some(l) = self {
            l.on_temperature_setting(celsius)
        }
    }
    fn on_remaining_time(&mut self, minutes: u16) {
        if let Some(l) = self {
            l.on_remaining_time(minutes)
        }
    }
    fn on_bath_time_setting(&mut self, minutes: u16) {
        if let Some(l) = self {
            l.on_bath_time_setting(minutes)
        }
    }
    fn on_total_uptime(&mut self, minutes: u32) {
        if let Some(l) = self {
            l.on_total_uptime(minutes)
        }
    }
    fn on_max_bath_temperature(&mut self, celsius: u16) {
        if let Some(l) = self {
            l.on_max_bath_temperature(celsius)
        }
    }
    fn on_overheating_pcb_limit(&mut self, celsius: u16) {
        if let Some(l) = self {
            l.on_overheating_pcb_limit(celsius)
        }
    }
    fn on_heater_status(&mut self, on: bool) {
        if let Some(l) = self {
            l.on_heater_status(on)
        }
    }
    fn on_heater_state(&mut self, state: HeaterState) {
        if let Some(l) = self {
            l.on_heater_state(state)
        }
    }
    fn on_light_status(&mut self, on: bool) {
        if let Some(l) = self {
            l.on_light_status(on)
        }
    }
    fn on_ready_status(&mut self, ready: bool) {
        if let Some(l) = self {
            l.on_ready_status(ready)
        }
    }
    fn on_session_uptime(&mut self, seconds: u32) {
        if let Some(l) = self {
            l.on_session_uptime(seconds)
        }
    }
    fn on_session_uptime_text(&mut self, text: &str) {
        if let Some(l) = self {
            l.on_session_uptime_text(text)
        }
    }
    fn on_number_state(&mut self, kind: NumberKind, value: f32) {
        if let Some(l) = self {
            l.on_number_state(kind, value)
        }
    }
    fn on_switch_state(&mut self, kind: SwitchKind, on: bool) {
        if let Some(l) = self {
            l.on_switch_state(kind, on)
        }
    }
}

/// Fan a callback out to every element of a tuple, in order
macro_rules! impl_listener_tuple {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: Sauna360Listener),+> Sauna360Listener for ($($name,)+) {
            fn on_temperature(&mut self, celsius: u16) {
                $(self.$idx.on_temperature(celsius);)+
            }
            fn on_temperature_setting(&mut self, celsius: u16) {
                $(self.$idx.on_temperature_setting(celsius);)+
            }
            fn on_remaining_time(&mut self, minutes: u16) {
                $(self.$idx.on_remaining_time(minutes);)+
            }
            fn on_bath_time_setting(&mut self, minutes: u16) {
                $(self.$idx.on_bath_time_setting(minutes);)+
            }
            fn on_total_uptime(&mut self, minutes: u32) {
                $(self.$idx.on_total_uptime(minutes);)+
            }
            fn on_max_bath_temperature(&mut self, celsius: u16) {
                $(self.$idx.on_max_bath_temperature(celsius);)+
            }
            fn on_overheating_pcb_limit(&mut self, celsius: u16) {
                $(self.$idx.on_overheating_pcb_limit(celsius);)+
            }
            fn on_heater_status(&mut self, on: bool) {
                $(self.$idx.on_heater_status(on);)+
            }
            fn on_heater_state(&mut self, state: HeaterState) {
                $(self.$idx.on_heater_state(state);)+
            }
            fn on_light_status(&mut self, on: bool) {
                $(self.$idx.on_light_status(on);)+
            }
            fn on_ready_status(&mut self, ready: bool) {
                $(self.$idx.on_ready_status(ready);)+
            }
            fn on_session_uptime(&mut self, seconds: u32) {
                $(self.$idx.on_session_uptime(seconds);)+
            }
            fn on_session_uptime_text(&mut self, text: &str) {
                $(self.$idx.on_session_uptime_text(text);)+
            }
            fn on_number_state(&mut self, kind: NumberKind, value: f32) {
                $(self.$idx.on_number_state(kind, value);)+
            }
            fn on_switch_state(&mut self, kind: SwitchKind, on: bool) {
                $(self.$idx.on_switch_state(kind, on);)+
            }
        }
    };
}

impl_listener_tuple!(A.0);
impl_listener_tuple!(A.0, B.1);
impl_listener_tuple!(A.0, B.1, C.2);
impl_listener_tuple!(A.0, B.1, C.2, D.3);
impl_listener_tuple!(A.0, B.1, C.2, D.3, E.4);
impl_listener_tuple!(A.0, B.1, C.2, D.3, E.4, F.5);
