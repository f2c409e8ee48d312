//! Runtime listener registry

use heapless::Vec;

use crate::entity::{NumberKind, SwitchKind};
use crate::state::HeaterState;
use crate::traits::Sauna360Listener;

/// Bounded set of borrowed listeners, notified in registration order
pub struct ListenerSet<'a, const N: usize> {
    listeners: Vec<&'a mut dyn Sauna360Listener, N>,
}

impl<'a, const N: usize> Default for ListenerSet<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> ListenerSet<'a, N> {
    pub const fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Add a listener; hands it back when the set is full
    pub fn register(
        &mut self,
        listener: &'a mut dyn Sauna360Listener,
    ) -> Result<(), &'a mut dyn Sauna360Listener> {
        self.listeners.push(listener)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<const N: usize> Sauna360Listener for ListenerSet<'_, N> {
    fn on_temperature(&mut self, celsius: u16) {
        self.listeners.iter_mut().for_each(|l| l.on_temperature(celsius));
    }
    fn on_temperature_setting(&mut self, celsius: u16) {
        self.listeners
            .iter_mut()
            .for_each(|l| l.on_temperature_setting(celsius));
    }
    fn on_remaining_time(&mut self, minutes: u16) {
        self.listeners
            .iter_mut()
            .for_each(|l| l.on_remaining_time(minutes));
    }
    fn on_bath_time_setting(&mut self, minutes: u16) {
        self.listeners
            .iter_mut()
            .for_each(|l| l.on_bath_time_setting(minutes));
    }
    fn on_total_uptime(&mut self, minutes: u32) {
        self.listeners.iter_mut().for_each(|l| l.on_total_uptime(minutes));
    }
    fn on_max_bath_temperature(&mut self, celsius: u16) {
        self.listeners
            .iter_mut()
            .for_each(|l| l.on_max_bath_temperature(celsius));
    }
    fn on_overheating_pcb_limit(&mut self, celsius: u16) {
        self.listeners
            .iter_mut()
            .for_each(|l| l.on_overheating_pcb_limit(celsius));
    }
    fn on_heater_status(&mut self, on: bool) {
        self.listeners.iter_mut().for_each(|l| l.on_heater_status(on));
    }
    fn on_heater_state(&mut self, state: HeaterState) {
        self.listeners.iter_mut().for_each(|l| l.on_heater_state(state));
    }
    fn on_light_status(&mut self, on: bool) {
        self.listeners.iter_mut().for_each(|l| l.on_light_status(on));
    }
    fn on_ready_status(&mut self, ready: bool) {
        self.listeners.iter_mut().for_each(|l| l.on_ready_status(ready));
    }
    fn on_session_uptime(&mut self, seconds: u32) {
        self.listeners
            .iter_mut()
            .for_each(|l| l.on_session_uptime(seconds));
    }
    fn on_session_uptime_text(&mut self, text: &str) {
        self.listeners
            .iter_mut()
            .for_each(|l| l.on_session_uptime_text(text));
    }
    fn on_number_state(&mut self, kind: NumberKind, value: f32) {
        self.listeners
            .iter_mut()
            .for_each(|l| l.on_number_state(kind, value));
    }
    fn on_switch_state(&mut self, kind: SwitchKind, on: bool) {
        self.listeners
            .iter_mut()
            .for_each(|l| l.on_switch_state(kind, on));
    }
}
