//! Driver state machine

use heapless::Deque;

use sauna360_protocol::registers::{
    self, DoorEvent, HeaterStatus, Register, RelayBitmap, SensorFault, REG_BATH_TIME, REG_DOOR,
    REG_HEATER_CONTROL, REG_TEMPERATURE, TOGGLE_HEATER, TOGGLE_LIGHT,
};
use sauna360_protocol::{Direction, EncodedFrame, FrameParser, Packet, FRAME_EOF};

use crate::config::{
    ClimateConfig, Model, NumbersConfig, SaunaConfig, BATH_TIME_MAX_MINUTES,
    BATH_TIME_MIN_MINUTES, TEMPERATURE_MAX_C, TEMPERATURE_MIN_C,
};
use crate::entity::{ClimateCall, ClimateMode, NumberKind, SwitchKind};
use crate::state::HeaterState;
use crate::traits::Sauna360Listener;

use super::listeners::ListenerSet;
use super::relay::{RelayDecision, RelayTracker};
use super::session::{format_uptime, SessionTimer};
use super::{CommandOutcome, ControlError, DriverError, ReceivedPacket};

/// Capacity of the transmit queue
pub const TX_QUEUE_SIZE: usize = 8;

/// Last bytes of the panel's poll frame; the bus is ours right after it
pub const POLL_FRAME_TAIL: [u8; 3] = [0x6D, 0x3A, FRAME_EOF];

#[derive(Debug, Clone, Copy)]
struct NumberEntity {
    min: f32,
    max: f32,
    state: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default)]
struct SwitchEntity {
    configured: bool,
    state: Option<bool>,
}

/// A frame waiting for the bus turn
#[derive(Debug, Clone)]
struct QueuedFrame {
    frame: EncodedFrame,
    /// Relay this frame toggles
    toggles: Option<SwitchKind>,
}

/// Raw register fields needed to compose writes
#[derive(Debug, Clone, Copy, Default)]
struct RegisterCache {
    temperature_raw: u32,
    setpoint_raw: Option<u32>,
    bath_time_raw: Option<u32>,
    max_temperature_raw: Option<u32>,
}

/// SAUNA360 heater driver
///
/// Owns the receive parser, the transmit queue and the numbers and
/// switches that write to the heater. Decoded state is reported to `L`.
pub struct Sauna360<L> {
    listeners: L,
    model: Model,
    numbers_config: NumbersConfig,
    climate: Option<ClimateConfig>,

    parser: FrameParser,
    tx_queue: Deque<QueuedFrame, TX_QUEUE_SIZE>,
    last_bytes: [u8; 2],
    bus_turn: bool,

    numbers: [Option<NumberEntity>; NumberKind::COUNT],
    switches: [SwitchEntity; SwitchKind::COUNT],
    registers: RegisterCache,
    last_setpoint: Option<u16>,

    /// A status report arrived since the last heater control report
    state_changed: bool,
    heating: bool,
    heater_reachable: bool,
    defaults_initialized: bool,

    light: RelayTracker,
    heater: RelayTracker,
    session: SessionTimer,
    now_ms: u64,
}

impl<L: Sauna360Listener> Sauna360<L> {
    pub fn new(config: &SaunaConfig, listeners: L) -> Self {
        let mut numbers = [None; NumberKind::COUNT];
        for kind in NumberKind::ALL {
            numbers[kind.index()] = config
                .number
                .range(kind)
                .map(|(min, max)| NumberEntity {
                    min,
                    max,
                    state: None,
                });
        }

        let mut switches = [SwitchEntity::default(); SwitchKind::COUNT];
        switches[SwitchKind::LightRelay.index()].configured = config.switch.light_relay;
        switches[SwitchKind::HeaterRelay.index()].configured = config.switch.heater_relay;

        Self {
            listeners,
            model: config.model,
            numbers_config: config.number,
            climate: config.climate,
            parser: FrameParser::new(),
            tx_queue: Deque::new(),
            last_bytes: [0; 2],
            bus_turn: false,
            numbers,
            switches,
            registers: RegisterCache::default(),
            last_setpoint: None,
            state_changed: false,
            heating: false,
            heater_reachable: false,
            defaults_initialized: false,
            light: RelayTracker::new(),
            heater: RelayTracker::new(),
            session: SessionTimer::new(),
            now_ms: 0,
        }
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn listeners(&self) -> &L {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut L {
        &mut self.listeners
    }

    /// Publish the initial entity states
    pub fn setup(&mut self) {
        for kind in [SwitchKind::LightRelay, SwitchKind::HeaterRelay] {
            if self.switches[kind.index()].configured {
                self.switches[kind.index()].state = Some(false);
                self.listeners.on_switch_state(kind, false);
            }
        }
        if let Some(number) = &mut self.numbers[NumberKind::BathTemperature.index()] {
            number.state = Some(0.0);
            self.listeners
                .on_number_state(NumberKind::BathTemperature, 0.0);
        }
        self.listeners.on_ready_status(true);
    }

    /// Process one byte received from the bus
    ///
    /// Returns the packet when the byte completed a valid frame.
    pub fn handle_byte(&mut self, byte: u8) -> Result<Option<ReceivedPacket>, DriverError> {
        self.bus_turn = byte == POLL_FRAME_TAIL[2]
            && self.last_bytes == [POLL_FRAME_TAIL[0], POLL_FRAME_TAIL[1]];
        self.last_bytes = [self.last_bytes[1], byte];

        let frame = match self.parser.feed(byte)? {
            Some(frame) => frame,
            None => return Ok(None),
        };
        let packet = Packet::from_frame(&frame)?;

        let handled = match packet.direction() {
            // Panel traffic (including our own writes) is only observed
            Direction::PanelToHeater => true,
            Direction::HeaterToPanel => self.dispatch(&packet)?,
        };

        Ok(Some(ReceivedPacket {
            packet,
            handled,
            unknown_escape: frame.unknown_escape,
        }))
    }

    /// Next frame to write, if the bus turn is open and one is queued
    ///
    /// The turn opens when the panel's poll frame ends and closes with
    /// the next received byte or after one frame. A relay toggle starts
    /// its holdoff here, when it leaves the queue.
    pub fn take_transmit(&mut self) -> Option<EncodedFrame> {
        if !self.bus_turn {
            return None;
        }
        let queued = self.tx_queue.pop_front()?;
        self.bus_turn = false;
        if let Some(kind) = queued.toggles {
            let now = self.now_ms;
            self.relay_mut(kind).sent(now);
        }
        Some(queued.frame)
    }

    pub fn bus_turn(&self) -> bool {
        self.bus_turn
    }

    pub fn pending_transmits(&self) -> usize {
        self.tx_queue.len()
    }

    /// Advance the driver clock
    pub fn tick(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        if let Some(seconds) = self.session.poll(now_ms) {
            self.publish_session(seconds);
        }
    }

    /// Whether a total uptime report has been seen
    pub fn is_heater_reachable(&self) -> bool {
        self.heater_reachable
    }

    pub fn number_state(&self, kind: NumberKind) -> Option<f32> {
        self.numbers[kind.index()].and_then(|n| n.state)
    }

    pub fn switch_state(&self, kind: SwitchKind) -> Option<bool> {
        self.switches[kind.index()].state
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Request a bath temperature setpoint
    ///
    /// The value is rounded to whole degrees. Nothing is sent when the
    /// heater already reports exactly that setpoint; a reported setpoint
    /// between two whole degrees is always rewritten.
    pub fn set_bath_temperature(&mut self, celsius: f32) -> Result<CommandOutcome, ControlError> {
        let target = checked_round(celsius, TEMPERATURE_MIN_C, TEMPERATURE_MAX_C)?;
        if self.registers.setpoint_raw == Some(registers::celsius_to_raw(target)) {
            return Ok(CommandOutcome::Unchanged);
        }
        let data = registers::encode_setpoint(target, self.registers.temperature_raw);
        self.queue(REG_TEMPERATURE, data)?;
        Ok(CommandOutcome::Queued)
    }

    /// Request a bath duration in minutes
    ///
    /// The bath time register also carries the max bath temperature, which
    /// is taken from the last report or, before one arrives, from the
    /// configured default.
    pub fn set_bath_time(&mut self, minutes: f32) -> Result<CommandOutcome, ControlError> {
        let minutes = checked_round(minutes, BATH_TIME_MIN_MINUTES, BATH_TIME_MAX_MINUTES)?;
        let max_raw = match self.registers.max_temperature_raw {
            Some(raw) => raw,
            None => self
                .numbers_config
                .default_value(NumberKind::MaxBathTemperature)
                .map(|c| registers::celsius_to_limit_raw(round_half_up(c)))
                .ok_or(ControlError::AwaitingDeviceState)?,
        };
        self.write_bath_time_register(registers::encode_bath_time_raw(minutes), max_raw)
    }

    /// Request a max bath temperature
    pub fn set_max_bath_temperature(
        &mut self,
        celsius: f32,
    ) -> Result<CommandOutcome, ControlError> {
        let limit = checked_round(celsius, TEMPERATURE_MIN_C, TEMPERATURE_MAX_C)?;
        let bath_raw = match self.registers.bath_time_raw {
            Some(raw) => raw,
            None => self
                .numbers_config
                .default_value(NumberKind::BathTime)
                .map(|m| registers::encode_bath_time_raw(round_half_up(m)))
                .ok_or(ControlError::AwaitingDeviceState)?,
        };
        self.write_bath_time_register(bath_raw, registers::celsius_to_limit_raw(limit))
    }

    pub fn set_light_relay(&mut self, on: bool) -> Result<CommandOutcome, ControlError> {
        self.set_relay(SwitchKind::LightRelay, on)
    }

    pub fn set_heater_relay(&mut self, on: bool) -> Result<CommandOutcome, ControlError> {
        self.set_relay(SwitchKind::HeaterRelay, on)
    }

    /// Set a number from the user side
    pub fn control_number(
        &mut self,
        kind: NumberKind,
        value: f32,
    ) -> Result<CommandOutcome, ControlError> {
        let number = self.numbers[kind.index()].ok_or(ControlError::NotConfigured)?;
        if !value.is_finite() || value < number.min || value > number.max {
            return Err(ControlError::OutOfRange {
                value,
                min: number.min,
                max: number.max,
            });
        }
        match kind {
            NumberKind::BathTime => self.set_bath_time(value),
            NumberKind::BathTemperature => self.set_bath_temperature(value),
            NumberKind::MaxBathTemperature => self.set_max_bath_temperature(value),
        }
    }

    /// Flip a switch from the user side
    ///
    /// The requested state is published right away; the heater's next
    /// status report confirms or corrects it.
    pub fn control_switch(
        &mut self,
        kind: SwitchKind,
        on: bool,
    ) -> Result<CommandOutcome, ControlError> {
        if !self.switches[kind.index()].configured {
            return Err(ControlError::NotConfigured);
        }
        self.publish_switch(kind, on);
        self.set_relay(kind, on)
    }

    /// Apply a climate request
    ///
    /// Target temperature and mode are applied independently; a rejected
    /// target does not stop the mode change. The first failure is returned.
    pub fn control_climate(&mut self, call: ClimateCall) -> Result<(), ControlError> {
        let links = self.climate.ok_or(ControlError::NotConfigured)?;
        let mut result = Ok(());

        if let Some(target) = call.target_temperature {
            let outcome = if links.bath_temperature_number {
                self.control_number(NumberKind::BathTemperature, target)
            } else {
                self.set_bath_temperature(target)
            };
            keep_first_error(&mut result, outcome);
        }

        if let Some(mode) = call.mode {
            let on = mode == ClimateMode::Heat;
            let outcome = if links.heater_relay {
                self.control_switch(SwitchKind::HeaterRelay, on)
            } else {
                self.set_heater_relay(on)
            };
            keep_first_error(&mut result, outcome);
        }

        result
    }

    /// Write the configured defaults once the heater is reachable
    ///
    /// Order: max bath temperature, bath time, bath temperature. Every
    /// default is attempted; the first failure is returned.
    pub fn initialize_defaults(&mut self) -> Result<(), ControlError> {
        self.defaults_initialized = true;
        let mut result = Ok(());

        if let Some(c) = self
            .numbers_config
            .default_value(NumberKind::MaxBathTemperature)
        {
            keep_first_error(&mut result, self.set_max_bath_temperature(c));
        }
        if let Some(m) = self.numbers_config.default_value(NumberKind::BathTime) {
            keep_first_error(&mut result, self.set_bath_time(m));
        }
        if let Some(c) = self.numbers_config.default_value(NumberKind::BathTemperature) {
            keep_first_error(&mut result, self.set_bath_temperature(c));
        }

        result
    }

    fn set_relay(&mut self, kind: SwitchKind, on: bool) -> Result<CommandOutcome, ControlError> {
        let now = self.now_ms;
        match self.relay_mut(kind).decide(on, now) {
            RelayDecision::Unchanged => Ok(CommandOutcome::Unchanged),
            RelayDecision::Deferred => Ok(CommandOutcome::Deferred),
            RelayDecision::Unknown => Err(ControlError::AwaitingDeviceState),
            RelayDecision::Toggle => {
                let toggle = match kind {
                    SwitchKind::LightRelay => TOGGLE_LIGHT,
                    SwitchKind::HeaterRelay => TOGGLE_HEATER,
                };
                self.push_frame(REG_HEATER_CONTROL, toggle, Some(kind))?;
                self.relay_mut(kind).commanded();
                Ok(CommandOutcome::Queued)
            }
        }
    }

    fn relay_mut(&mut self, kind: SwitchKind) -> &mut RelayTracker {
        match kind {
            SwitchKind::LightRelay => &mut self.light,
            SwitchKind::HeaterRelay => &mut self.heater,
        }
    }

    fn write_bath_time_register(
        &mut self,
        bath_raw: u32,
        max_raw: u32,
    ) -> Result<CommandOutcome, ControlError> {
        self.queue(
            REG_BATH_TIME,
            registers::encode_bath_time_register(bath_raw, max_raw),
        )?;
        // Both fields share the register; a following write must carry
        // what was just sent, not the older report
        self.registers.bath_time_raw = Some(bath_raw);
        self.registers.max_temperature_raw = Some(max_raw);
        Ok(CommandOutcome::Queued)
    }

    fn queue(&mut self, code: u16, data: u32) -> Result<(), ControlError> {
        self.push_frame(code, data, None)
    }

    fn push_frame(
        &mut self,
        code: u16,
        data: u32,
        toggles: Option<SwitchKind>,
    ) -> Result<(), ControlError> {
        let frame = Packet::panel_write(code, data)
            .encode()
            .map_err(ControlError::Encoding)?;
        self.tx_queue
            .push_back(QueuedFrame { frame, toggles })
            .map_err(|_| ControlError::QueueFull)
    }

    // =========================================================================
    // Register processing
    // =========================================================================

    /// Route a heater report; returns false for unknown registers
    fn dispatch(&mut self, packet: &Packet) -> Result<bool, DriverError> {
        let data = packet.data;
        match packet.register() {
            Register::HeaterStatus => self.process_heater_status(data),
            // Humidity/temperature sensor of Combi and Elite heaters
            Register::ClimateSensor => {}
            Register::BathTime => self.process_bath_time(data),
            Register::PcbLimit => self
                .listeners
                .on_overheating_pcb_limit(registers::pcb_limit_celsius(data)),
            Register::Temperature => self.process_temperature(data),
            Register::HeaterControl => self.process_heater_control(),
            Register::RelayBitmap => self.process_relay_bitmap(data),
            Register::TotalUptime => self.process_total_uptime(data)?,
            Register::RemainingTime => self
                .listeners
                .on_remaining_time(u16::try_from(data).unwrap_or(u16::MAX)),
            Register::Door => self.process_door(data)?,
            Register::SensorError(_) => {
                if let Some(fault) = SensorFault::from_data(data) {
                    self.listeners.on_heater_state(fault.into());
                }
            }
            Register::Unknown(_) => return Ok(false),
        }
        Ok(true)
    }

    fn process_heater_status(&mut self, data: u32) {
        let status = HeaterStatus::from_data(data);

        self.listeners.on_light_status(status.light_on);
        self.light.observe(status.light_on);
        self.publish_switch(SwitchKind::LightRelay, status.light_on);

        self.listeners.on_heater_status(status.heater_on);
        self.heater.observe(status.heater_on);
        self.publish_switch(SwitchKind::HeaterRelay, status.heater_on);

        self.state_changed = true;
        self.heating = status.heater_on;

        if status.heater_on {
            self.listeners.on_ready_status(false);
        }
        let state = if status.heater_on && !status.standby {
            HeaterState::On
        } else {
            HeaterState::Standby
        };
        self.listeners.on_heater_state(state);

        if status.heater_on {
            if self.session.start(self.now_ms) {
                self.publish_session(0);
            }
        } else if let Some(seconds) = self.session.stop(self.now_ms) {
            self.publish_session(seconds);
        }
    }

    fn process_bath_time(&mut self, data: u32) {
        let bath_raw = registers::bath_time_raw(data);
        self.registers.bath_time_raw = Some(bath_raw);
        let minutes = registers::decode_bath_time_minutes(bath_raw);
        self.listeners.on_bath_time_setting(minutes);
        self.publish_number(NumberKind::BathTime, minutes.into());

        let max_raw = registers::max_temperature_raw(data);
        self.registers.max_temperature_raw = Some(max_raw);
        let max_c = registers::limit_raw_to_celsius(max_raw);
        self.listeners.on_max_bath_temperature(max_c);
        self.publish_number(NumberKind::MaxBathTemperature, max_c.into());
    }

    fn process_temperature(&mut self, data: u32) {
        let actual_raw = registers::temperature_raw(data);
        self.registers.temperature_raw = actual_raw;
        self.listeners
            .on_temperature(registers::raw_to_celsius(actual_raw));

        let setpoint_raw = registers::setpoint_raw(data);
        self.registers.setpoint_raw = Some(setpoint_raw);
        let setpoint = registers::raw_to_celsius(setpoint_raw);
        self.publish_number(NumberKind::BathTemperature, setpoint.into());

        if self.last_setpoint != Some(setpoint) {
            self.last_setpoint = Some(setpoint);
            self.listeners.on_temperature_setting(setpoint);
        }
    }

    /// A heater control report without a status report in between means
    /// the heater refused to start
    fn process_heater_control(&mut self) {
        if !self.state_changed && !self.heating {
            self.listeners.on_heater_state(HeaterState::StartBlocked);
        }
        self.state_changed = false;
    }

    fn process_relay_bitmap(&mut self, data: u32) {
        let relays = RelayBitmap::from_data(data);
        self.light.observe(relays.light_on);
        let state = if relays.heating {
            HeaterState::Heating
        } else {
            HeaterState::Standby
        };
        self.listeners.on_heater_state(state);
    }

    fn process_total_uptime(&mut self, minutes: u32) -> Result<(), DriverError> {
        self.listeners.on_total_uptime(minutes);
        self.heater_reachable = true;
        if !self.defaults_initialized {
            self.initialize_defaults().map_err(DriverError::Defaults)?;
        }
        Ok(())
    }

    fn process_door(&mut self, data: u32) -> Result<(), DriverError> {
        self.listeners.on_ready_status(registers::door_ready(data));
        if let Some((event, ack)) = DoorEvent::from_data(data) {
            self.listeners.on_heater_state(event.into());
            self.queue(REG_DOOR, ack)
                .map_err(|_| DriverError::QueueFull)?;
        }
        Ok(())
    }

    fn publish_number(&mut self, kind: NumberKind, value: f32) {
        if let Some(number) = &mut self.numbers[kind.index()] {
            if number.state != Some(value) {
                number.state = Some(value);
                self.listeners.on_number_state(kind, value);
            }
        }
    }

    fn publish_switch(&mut self, kind: SwitchKind, on: bool) {
        let switch = &mut self.switches[kind.index()];
        if switch.configured && switch.state != Some(on) {
            switch.state = Some(on);
            self.listeners.on_switch_state(kind, on);
        }
    }

    fn publish_session(&mut self, seconds: u32) {
        self.listeners.on_session_uptime(seconds);
        let text = format_uptime(seconds);
        self.listeners.on_session_uptime_text(&text);
    }
}

impl<'a, const N: usize> Sauna360<ListenerSet<'a, N>> {
    /// Add a listener at runtime; hands it back when the set is full
    pub fn register_listener(
        &mut self,
        listener: &'a mut dyn Sauna360Listener,
    ) -> Result<(), &'a mut dyn Sauna360Listener> {
        self.listeners.register(listener)
    }
}

/// Range-check and round half up to a whole number
fn checked_round(value: f32, min: f32, max: f32) -> Result<u16, ControlError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ControlError::OutOfRange { value, min, max });
    }
    Ok(round_half_up(value))
}

/// Round a non-negative value half up
fn round_half_up(value: f32) -> u16 {
    (value + 0.5) as u16
}

fn keep_first_error(result: &mut Result<(), ControlError>, next: Result<CommandOutcome, ControlError>) {
    if let (Ok(()), Err(e)) = (&*result, next) {
        *result = Err(e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BathTimeNumberConfig, TemperatureNumberConfig};
    use heapless::{String, Vec};
    use proptest::prelude::*;
    use sauna360_protocol::{FrameError, PANEL_ADDRESS};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Temperature(u16),
        TemperatureSetting(u16),
        RemainingTime(u16),
        BathTimeSetting(u16),
        TotalUptime(u32),
        MaxBathTemperature(u16),
        PcbLimit(u16),
        HeaterStatus(bool),
        State(HeaterState),
        LightStatus(bool),
        Ready(bool),
        SessionUptime(u32),
        SessionText(String<16>),
        Number(NumberKind, f32),
        Switch(SwitchKind, bool),
    }

    #[derive(Default)]
    struct Log {
        events: Vec<Event, 64>,
    }

    impl Log {
        fn record(&mut self, event: Event) {
            self.events.push(event).expect("event log full");
        }
    }

    impl Sauna360Listener for Log {
        fn on_temperature(&mut self, c: u16) {
            self.record(Event::Temperature(c));
        }
        fn on_temperature_setting(&mut self, c: u16) {
            self.record(Event::TemperatureSetting(c));
        }
        fn on_remaining_time(&mut self, m: u16) {
            self.record(Event::RemainingTime(m));
        }
        fn on_bath_time_setting(&mut self, m: u16) {
            self.record(Event::BathTimeSetting(m));
        }
        fn on_total_uptime(&mut self, m: u32) {
            self.record(Event::TotalUptime(m));
        }
        fn on_max_bath_temperature(&mut self, c: u16) {
            self.record(Event::MaxBathTemperature(c));
        }
        fn on_overheating_pcb_limit(&mut self, c: u16) {
            self.record(Event::PcbLimit(c));
        }
        fn on_heater_status(&mut self, on: bool) {
            self.record(Event::HeaterStatus(on));
        }
        fn on_heater_state(&mut self, state: HeaterState) {
            self.record(Event::State(state));
        }
        fn on_light_status(&mut self, on: bool) {
            self.record(Event::LightStatus(on));
        }
        fn on_ready_status(&mut self, ready: bool) {
            self.record(Event::Ready(ready));
        }
        fn on_session_uptime(&mut self, s: u32) {
            self.record(Event::SessionUptime(s));
        }
        fn on_session_uptime_text(&mut self, text: &str) {
            self.record(Event::SessionText(String::try_from(text).unwrap()));
        }
        fn on_number_state(&mut self, kind: NumberKind, value: f32) {
            self.record(Event::Number(kind, value));
        }
        fn on_switch_state(&mut self, kind: SwitchKind, on: bool) {
            self.record(Event::Switch(kind, on));
        }
    }

    /// Panel poll frame whose tail opens the bus turn
    const POLL: [u8; 12] = [
        0x98, 0x40, 0x09, 0x7A, 0xE3, 0x00, 0x00, 0x00, 0x00, 0x6D, 0x3A, 0x9C,
    ];

    fn config() -> SaunaConfig {
        let mut config = SaunaConfig::new();
        config.number.bath_time = Some(BathTimeNumberConfig::default());
        config.number.bath_temperature = Some(TemperatureNumberConfig::default());
        config.number.max_bath_temperature = Some(TemperatureNumberConfig::default());
        config.switch.light_relay = true;
        config.switch.heater_relay = true;
        config.climate = Some(ClimateConfig {
            bath_temperature_number: true,
            heater_relay: true,
        });
        config
    }

    fn driver() -> Sauna360<Log> {
        Sauna360::new(&config(), Log::default())
    }

    fn report(code: u16, data: u32) -> EncodedFrame {
        Packet {
            address: 0x10,
            kind: 0x06,
            code,
            data,
        }
        .encode()
        .unwrap()
    }

    fn feed(driver: &mut Sauna360<Log>, bytes: &[u8]) -> Option<ReceivedPacket> {
        let mut received = None;
        for &byte in bytes {
            if let Some(packet) = driver.handle_byte(byte).unwrap() {
                received = Some(packet);
            }
        }
        received
    }

    fn events(driver: &mut Sauna360<Log>) -> Vec<Event, 64> {
        core::mem::take(&mut driver.listeners_mut().events)
    }

    /// Let the panel poll and collect every frame the driver sends
    fn transmit_all(driver: &mut Sauna360<Log>) -> Vec<EncodedFrame, TX_QUEUE_SIZE> {
        let mut sent = Vec::new();
        while driver.pending_transmits() > 0 {
            feed(driver, &POLL);
            if let Some(frame) = driver.take_transmit() {
                sent.push(frame).unwrap();
            }
        }
        sent
    }

    #[test]
    fn test_setup_publishes_initial_states() {
        let mut driver = driver();
        driver.setup();
        assert_eq!(
            events(&mut driver),
            [
                Event::Switch(SwitchKind::LightRelay, false),
                Event::Switch(SwitchKind::HeaterRelay, false),
                Event::Number(NumberKind::BathTemperature, 0.0),
                Event::Ready(true),
            ]
        );
    }

    #[test]
    fn test_temperature_report() {
        let mut driver = driver();
        // Captured frame: 72°C actual, 80°C setpoint
        let bytes = [
            0x98, 0x10, 0x06, 0x60, 0x00, 0x00, 0x16, 0x82, 0x88, 0xAC, 0xB2, 0x9C,
        ];
        let received = feed(&mut driver, &bytes).unwrap();
        assert!(received.handled);
        assert_eq!(received.packet.code, 0x6000);
        assert_eq!(
            events(&mut driver),
            [
                Event::Temperature(72),
                Event::Number(NumberKind::BathTemperature, 80.0),
                Event::TemperatureSetting(80),
            ]
        );

        // Setpoint and number unchanged: only the temperature is reported
        feed(&mut driver, &bytes);
        assert_eq!(events(&mut driver), [Event::Temperature(72)]);
    }

    #[test]
    fn test_heater_status_on() {
        let mut driver = driver();
        feed(&mut driver, &report(0x3400, 0x18));
        assert_eq!(
            events(&mut driver),
            [
                Event::LightStatus(true),
                Event::Switch(SwitchKind::LightRelay, true),
                Event::HeaterStatus(true),
                Event::Switch(SwitchKind::HeaterRelay, true),
                Event::Ready(false),
                Event::State(HeaterState::On),
                Event::SessionUptime(0),
                Event::SessionText(String::try_from("00:00:00").unwrap()),
            ]
        );
        assert_eq!(driver.switch_state(SwitchKind::HeaterRelay), Some(true));
    }

    #[test]
    fn test_standby_bit_overrides() {
        let mut driver = driver();
        feed(&mut driver, &report(0x3400, 0x30));
        let log = events(&mut driver);
        assert!(log.contains(&Event::State(HeaterState::Standby)));
        assert!(!log.contains(&Event::State(HeaterState::On)));
    }

    #[test]
    fn test_blocked_start_detection() {
        let mut driver = driver();
        feed(&mut driver, &report(0x3400, 0x00));
        events(&mut driver);

        // Status seen since the last control report: no fault
        feed(&mut driver, &report(0x7000, 0));
        assert!(events(&mut driver).is_empty());

        // Two control reports in a row while off: start was refused
        feed(&mut driver, &report(0x7000, 0));
        assert_eq!(
            events(&mut driver),
            [Event::State(HeaterState::StartBlocked)]
        );
    }

    #[test]
    fn test_blocked_start_not_reported_while_heating() {
        let mut driver = driver();
        feed(&mut driver, &report(0x3400, 0x10));
        feed(&mut driver, &report(0x7000, 0));
        events(&mut driver);
        feed(&mut driver, &report(0x7000, 0));
        assert!(events(&mut driver).is_empty());
    }

    #[test]
    fn test_bath_time_report() {
        let mut driver = driver();
        feed(&mut driver, &report(0x4002, 0x7080_0068));
        assert_eq!(
            events(&mut driver),
            [
                Event::BathTimeSetting(100),
                Event::Number(NumberKind::BathTime, 100.0),
                Event::MaxBathTemperature(100),
                Event::Number(NumberKind::MaxBathTemperature, 100.0),
            ]
        );
    }

    #[test]
    fn test_limits_and_times() {
        let mut driver = driver();
        feed(&mut driver, &report(0x4003, (90 * 18) << 11));
        // Remaining time 0x98 arrives escaped
        feed(
            &mut driver,
            &[
                0x98, 0x10, 0x06, 0x94, 0x01, 0x00, 0x00, 0x00, 0x91, 0x67, 0x6B, 0xF4, 0x9C,
            ],
        );
        assert_eq!(
            events(&mut driver),
            [Event::PcbLimit(90), Event::RemainingTime(0x98)]
        );
    }

    #[test]
    fn test_relay_bitmap() {
        let mut driver = driver();
        feed(&mut driver, &report(0x7180, 0x0003_C000));
        assert_eq!(events(&mut driver), [Event::State(HeaterState::Heating)]);
        // Light state learned from the bitmap
        assert_eq!(driver.set_light_relay(true), Ok(CommandOutcome::Unchanged));
    }

    #[test]
    fn test_door_code_is_acknowledged() {
        let mut driver = driver();
        let bytes = [
            0x98, 0x10, 0x06, 0xB0, 0x00, 0x00, 0x13, 0x00, 0x03, 0x48, 0x68, 0x9C,
        ];
        feed(&mut driver, &bytes);
        assert_eq!(
            events(&mut driver),
            [
                Event::Ready(false),
                Event::State(HeaterState::BathCancelled)
            ]
        );

        let sent = transmit_all(&mut driver);
        assert_eq!(
            &sent[0][..],
            &[0x98, 0x40, 0x07, 0xB0, 0x00, 0x00, 0x13, 0x01, 0x03, 0xAE, 0xF5, 0x9C]
        );
    }

    #[test]
    fn test_door_ready() {
        let mut driver = driver();
        feed(&mut driver, &report(0xB000, 0));
        assert_eq!(events(&mut driver), [Event::Ready(true)]);
        assert_eq!(driver.pending_transmits(), 0);
    }

    #[test]
    fn test_sensor_fault() {
        let mut driver = driver();
        feed(&mut driver, &report(0xB601, 0x3000_0000));
        assert_eq!(
            events(&mut driver),
            [Event::State(HeaterState::RoomSensorFault)]
        );
    }

    #[test]
    fn test_unknown_register_is_returned() {
        let mut driver = driver();
        let received = feed(&mut driver, &report(0x1234, 7)).unwrap();
        assert!(!received.handled);
        assert!(events(&mut driver).is_empty());
    }

    #[test]
    fn test_panel_traffic_is_ignored() {
        let mut driver = driver();
        let write = Packet::panel_write(0x6000, (80 * 9) << 11).encode().unwrap();
        let received = feed(&mut driver, &write).unwrap();
        assert!(received.handled);
        assert_eq!(received.packet.address, PANEL_ADDRESS);
        assert!(events(&mut driver).is_empty());
    }

    #[test]
    fn test_crc_error_is_reported() {
        let mut driver = driver();
        let mut bytes = report(0x6000, 0x0016_8288);
        bytes[10] ^= 0xFF;
        let mut error = None;
        for &b in bytes.iter() {
            if let Err(e) = driver.handle_byte(b) {
                error = Some(e);
            }
        }
        assert!(matches!(
            error,
            Some(DriverError::Frame(FrameError::InvalidCrc { .. }))
        ));
    }

    #[test]
    fn test_bus_turn() {
        let mut driver = driver();
        assert_eq!(driver.set_bath_temperature(80.0), Ok(CommandOutcome::Queued));

        // Not our turn yet
        assert_eq!(driver.take_transmit(), None);

        for &b in &POLL {
            let _ = driver.handle_byte(b);
        }
        assert!(driver.bus_turn());
        let frame = driver.take_transmit().unwrap();
        assert_eq!(
            &frame[..],
            &[0x98, 0x40, 0x07, 0x60, 0x00, 0x00, 0x16, 0x80, 0x00, 0xC0, 0x39, 0x9C]
        );
        // One frame per turn
        assert!(!driver.bus_turn());
    }

    #[test]
    fn test_bus_turn_closes_on_next_byte() {
        let mut driver = driver();
        driver.set_bath_temperature(80.0).unwrap();
        feed(&mut driver, &POLL);
        driver.handle_byte(0x98).unwrap();
        assert_eq!(driver.take_transmit(), None);
        assert_eq!(driver.pending_transmits(), 1);
    }

    #[test]
    fn test_bath_temperature_skips_current_setpoint() {
        let mut driver = driver();
        feed(&mut driver, &report(0x6000, 0x0016_8288));
        assert_eq!(
            driver.set_bath_temperature(80.4),
            Ok(CommandOutcome::Unchanged)
        );
        assert_eq!(driver.set_bath_temperature(84.5), Ok(CommandOutcome::Queued));

        let sent = transmit_all(&mut driver);
        let packet = Packet::from_bytes(&sent[0][1..9]).unwrap();
        assert_eq!(packet.code, 0x6000);
        // 85°C requested, actual temperature field kept
        assert_eq!(registers::setpoint_raw(packet.data), 85 * 9);
        assert_eq!(registers::temperature_raw(packet.data), 648);
    }

    #[test]
    fn test_bath_temperature_rewrites_fractional_setpoint() {
        let mut driver = driver();
        // Setpoint field 725 is 80.6°C, shown as 80
        feed(&mut driver, &report(0x6000, (725 << 11) | 648));
        assert_eq!(
            driver.number_state(NumberKind::BathTemperature),
            Some(80.0)
        );
        assert_eq!(driver.set_bath_temperature(80.0), Ok(CommandOutcome::Queued));

        let sent = transmit_all(&mut driver);
        let packet = Packet::from_bytes(&sent[0][1..9]).unwrap();
        assert_eq!(registers::setpoint_raw(packet.data), 80 * 9);
    }

    #[test]
    fn test_bath_time_needs_max_temperature() {
        let mut driver = driver();
        assert_eq!(
            driver.set_bath_time(60.0),
            Err(ControlError::AwaitingDeviceState)
        );

        // 60 minutes, max 100°C
        feed(&mut driver, &report(0x4002, 0x7080_0040));
        assert_eq!(driver.set_bath_time(100.0), Ok(CommandOutcome::Queued));
        let sent = transmit_all(&mut driver);
        assert_eq!(
            &sent[0][..],
            &[0x98, 0x40, 0x07, 0x40, 0x02, 0x70, 0x80, 0x00, 0x68, 0x70, 0x2E, 0x9C]
        );
    }

    #[test]
    fn test_bath_time_uses_default_max_temperature() {
        let mut config = config();
        config.number.max_bath_temperature = Some(TemperatureNumberConfig {
            default_value: Some(100.0),
            ..Default::default()
        });
        let mut driver = Sauna360::new(&config, Log::default());

        assert_eq!(driver.set_bath_time(45.0), Ok(CommandOutcome::Queued));
        let sent = transmit_all(&mut driver);
        let packet = Packet::from_bytes(&sent[0][1..9]).unwrap();
        assert_eq!(packet.data, 0x7080_002D);
    }

    #[test]
    fn test_max_bath_temperature_keeps_bath_time() {
        let mut driver = driver();
        feed(&mut driver, &report(0x4002, 0x7080_0068));
        driver.set_max_bath_temperature(90.0).unwrap();
        let sent = transmit_all(&mut driver);
        let packet = Packet::from_bytes(&sent[0][1..9]).unwrap();
        assert_eq!(registers::bath_time_raw(packet.data), 104);
        assert_eq!(registers::max_temperature_raw(packet.data), 90 * 18);
    }

    #[test]
    fn test_setter_ranges() {
        let mut driver = driver();
        assert!(matches!(
            driver.set_bath_temperature(111.0),
            Err(ControlError::OutOfRange { .. })
        ));
        assert!(matches!(
            driver.set_bath_temperature(f32::NAN),
            Err(ControlError::OutOfRange { .. })
        ));
        assert!(matches!(
            driver.set_bath_time(0.0),
            Err(ControlError::OutOfRange { .. })
        ));
        assert!(matches!(
            driver.set_max_bath_temperature(39.0),
            Err(ControlError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_relay_toggle_rules() {
        let mut driver = driver();
        assert_eq!(
            driver.set_light_relay(true),
            Err(ControlError::AwaitingDeviceState)
        );

        feed(&mut driver, &report(0x3400, 0x00));
        assert_eq!(driver.set_light_relay(false), Ok(CommandOutcome::Unchanged));
        assert_eq!(driver.set_light_relay(true), Ok(CommandOutcome::Queued));
        // Heater has not confirmed yet
        assert_eq!(driver.set_light_relay(true), Ok(CommandOutcome::Deferred));

        // No bus turn for longer than the holdoff; the toggle is still queued
        driver.tick(2_500);
        assert_eq!(driver.set_light_relay(true), Ok(CommandOutcome::Deferred));
        assert_eq!(driver.pending_transmits(), 1);

        let sent = transmit_all(&mut driver);
        assert_eq!(sent.len(), 1);
        assert_eq!(
            &sent[0][..],
            &[0x98, 0x40, 0x07, 0x70, 0x00, 0x00, 0x00, 0x00, 0x02, 0xA3, 0xB8, 0x9C]
        );

        // Holdoff counts from the write at 2.5 s
        driver.tick(4_000);
        assert_eq!(driver.set_light_relay(true), Ok(CommandOutcome::Deferred));
        driver.tick(4_500);
        assert_eq!(driver.set_light_relay(true), Ok(CommandOutcome::Queued));
    }

    #[test]
    fn test_relay_confirmed_after_write() {
        let mut driver = driver();
        feed(&mut driver, &report(0x3400, 0x00));
        assert_eq!(driver.set_light_relay(true), Ok(CommandOutcome::Queued));
        assert_eq!(transmit_all(&mut driver).len(), 1);

        // Light bit set
        feed(&mut driver, &report(0x3400, 0x08));
        assert_eq!(driver.set_light_relay(true), Ok(CommandOutcome::Unchanged));
        assert_eq!(driver.pending_transmits(), 0);
    }

    #[test]
    fn test_control_switch_publishes_first() {
        let mut driver = driver();
        feed(&mut driver, &report(0x3400, 0x00));
        events(&mut driver);

        assert_eq!(
            driver.control_switch(SwitchKind::HeaterRelay, true),
            Ok(CommandOutcome::Queued)
        );
        assert_eq!(
            events(&mut driver),
            [Event::Switch(SwitchKind::HeaterRelay, true)]
        );
        let sent = transmit_all(&mut driver);
        assert_eq!(
            &sent[0][..],
            &[0x98, 0x40, 0x07, 0x70, 0x00, 0x00, 0x00, 0x00, 0x01, 0x82, 0x0A, 0x9C]
        );
    }

    #[test]
    fn test_control_number_checks_configuration() {
        let mut config = config();
        config.number.bath_temperature = Some(TemperatureNumberConfig {
            min_value: 60.0,
            max_value: 90.0,
            default_value: None,
        });
        config.number.bath_time = None;
        let mut driver = Sauna360::new(&config, Log::default());

        assert_eq!(
            driver.control_number(NumberKind::BathTemperature, 95.0),
            Err(ControlError::OutOfRange {
                value: 95.0,
                min: 60.0,
                max: 90.0
            })
        );
        assert_eq!(
            driver.control_number(NumberKind::BathTime, 60.0),
            Err(ControlError::NotConfigured)
        );
        assert_eq!(
            driver.control_number(NumberKind::BathTemperature, 75.0),
            Ok(CommandOutcome::Queued)
        );
    }

    #[test]
    fn test_control_climate() {
        let mut driver = driver();
        feed(&mut driver, &report(0x3400, 0x00));
        events(&mut driver);

        let call = ClimateCall::new()
            .with_target_temperature(85.0)
            .with_mode(ClimateMode::Heat);
        assert_eq!(driver.control_climate(call), Ok(()));
        assert_eq!(
            events(&mut driver),
            [Event::Switch(SwitchKind::HeaterRelay, true)]
        );
        assert_eq!(driver.pending_transmits(), 2);
    }

    #[test]
    fn test_control_climate_without_linked_entities() {
        let mut config = config();
        config.climate = Some(ClimateConfig {
            bath_temperature_number: false,
            heater_relay: false,
        });
        let mut driver = Sauna360::new(&config, Log::default());
        feed(&mut driver, &report(0x3400, 0x00));
        feed(&mut driver, &report(0x6000, 0x0016_8288));
        events(&mut driver);

        let call = ClimateCall::new()
            .with_target_temperature(85.0)
            .with_mode(ClimateMode::Heat);
        assert_eq!(driver.control_climate(call), Ok(()));
        // Written straight to the heater, no entity publishes
        assert!(events(&mut driver).is_empty());

        let sent = transmit_all(&mut driver);
        assert_eq!(sent.len(), 2);
        let packet = Packet::from_bytes(&sent[0][1..9]).unwrap();
        assert_eq!(packet.code, 0x6000);
        assert_eq!(registers::setpoint_raw(packet.data), 85 * 9);
        assert_eq!(registers::temperature_raw(packet.data), 648);
        assert_eq!(
            &sent[1][..],
            &[0x98, 0x40, 0x07, 0x70, 0x00, 0x00, 0x00, 0x00, 0x01, 0x82, 0x0A, 0x9C]
        );
    }

    #[test]
    fn test_control_climate_mode_survives_rejected_target() {
        let mut driver = driver();
        feed(&mut driver, &report(0x3400, 0x00));
        events(&mut driver);

        let call = ClimateCall::new()
            .with_target_temperature(120.0)
            .with_mode(ClimateMode::Heat);
        assert!(matches!(
            driver.control_climate(call),
            Err(ControlError::OutOfRange { .. })
        ));
        assert_eq!(
            events(&mut driver),
            [Event::Switch(SwitchKind::HeaterRelay, true)]
        );

        let sent = transmit_all(&mut driver);
        assert_eq!(sent.len(), 1);
        assert_eq!(
            &sent[0][..],
            &[0x98, 0x40, 0x07, 0x70, 0x00, 0x00, 0x00, 0x00, 0x01, 0x82, 0x0A, 0x9C]
        );
    }

    #[test]
    fn test_climate_not_configured() {
        let mut config = config();
        config.climate = None;
        let mut driver = Sauna360::new(&config, Log::default());
        assert_eq!(
            driver.control_climate(ClimateCall::new().with_mode(ClimateMode::Off)),
            Err(ControlError::NotConfigured)
        );
    }

    #[test]
    fn test_defaults_written_once_on_first_uptime() {
        let mut config = config();
        config.number.max_bath_temperature = Some(TemperatureNumberConfig {
            default_value: Some(100.0),
            ..Default::default()
        });
        config.number.bath_time = Some(BathTimeNumberConfig {
            default_value: Some(100.0),
        });
        config.number.bath_temperature = Some(TemperatureNumberConfig {
            default_value: Some(80.0),
            ..Default::default()
        });
        let mut driver = Sauna360::new(&config, Log::default());

        // 60 minutes, 90°C reported before the heater is seen as reachable
        feed(&mut driver, &report(0x4002, 64 | ((90 * 18) << 20)));
        let bytes = [
            0x98, 0x10, 0x06, 0x94, 0x00, 0x00, 0x00, 0x04, 0xD2, 0xF3, 0x75, 0x9C,
        ];
        feed(&mut driver, &bytes);
        assert!(driver.is_heater_reachable());
        assert!(events(&mut driver).contains(&Event::TotalUptime(1234)));

        let sent = transmit_all(&mut driver);
        assert_eq!(sent.len(), 3);
        let data: Vec<u32, 3> = sent
            .iter()
            .map(|f| Packet::from_bytes(&f[1..9]).unwrap().data)
            .collect();
        // Max temperature keeps the reported bath time
        assert_eq!(data[0], 64 | (1800 << 20));
        // Bath time carries the max temperature just written
        assert_eq!(data[1], 0x7080_0068);
        assert_eq!(registers::setpoint_raw(data[2]), 80 * 9);

        feed(&mut driver, &bytes);
        assert_eq!(driver.pending_transmits(), 0);
    }

    #[test]
    fn test_defaults_report_missing_state() {
        let mut config = config();
        config.number.max_bath_temperature = Some(TemperatureNumberConfig {
            default_value: Some(100.0),
            ..Default::default()
        });
        let mut driver = Sauna360::new(&config, Log::default());

        let mut error = None;
        for &b in report(0x9400, 1).iter() {
            if let Err(e) = driver.handle_byte(b) {
                error = Some(e);
            }
        }
        assert_eq!(
            error,
            Some(DriverError::Defaults(ControlError::AwaitingDeviceState))
        );
        assert!(driver.is_heater_reachable());
    }

    #[test]
    fn test_session_uptime() {
        let mut driver = driver();
        driver.tick(10_000);
        feed(&mut driver, &report(0x3400, 0x10));
        events(&mut driver);

        driver.tick(10_500);
        assert!(events(&mut driver).is_empty());
        driver.tick(11_000);
        assert_eq!(
            events(&mut driver),
            [
                Event::SessionUptime(1),
                Event::SessionText(String::try_from("00:00:01").unwrap()),
            ]
        );

        driver.tick(75_000);
        feed(&mut driver, &report(0x3400, 0x00));
        let log = events(&mut driver);
        assert!(log.contains(&Event::SessionUptime(65)));
        assert!(log.contains(&Event::SessionText(String::try_from("00:01:05").unwrap())));

        // Stopped: nothing more is published
        driver.tick(80_000);
        assert!(events(&mut driver).is_empty());
    }

    #[test]
    fn test_queue_full() {
        let mut driver = driver();
        for i in 0..TX_QUEUE_SIZE {
            let target = 40.0 + i as f32;
            assert_eq!(driver.set_bath_temperature(target), Ok(CommandOutcome::Queued));
        }
        assert_eq!(
            driver.set_bath_temperature(100.0),
            Err(ControlError::QueueFull)
        );
    }

    #[test]
    fn test_listener_set_registration() {
        let mut first = Log::default();
        let mut second = Log::default();
        {
            let mut driver: Sauna360<ListenerSet<'_, 2>> =
                Sauna360::new(&config(), ListenerSet::new());
            assert!(driver.register_listener(&mut first).is_ok());
            assert!(driver.register_listener(&mut second).is_ok());
            for &b in report(0x9401, 30).iter() {
                driver.handle_byte(b).unwrap();
            }
        }
        assert_eq!(first.events, [Event::RemainingTime(30)]);
        assert_eq!(second.events, [Event::RemainingTime(30)]);
    }

    proptest! {
        #[test]
        fn prop_setpoint_writes_parse_back(celsius in 40.0f32..=110.0, actual in 0u32..0x800) {
            let mut driver = driver();
            // Setpoint field 0, any actual temperature field
            feed(&mut driver, &report(0x6000, actual));
            prop_assert_eq!(driver.set_bath_temperature(celsius), Ok(CommandOutcome::Queued));

            let sent = transmit_all(&mut driver);
            prop_assert_eq!(sent.len(), 1);

            let mut parser = FrameParser::new();
            let frame = parser.feed_bytes(&sent[0]).unwrap().unwrap();
            let packet = Packet::from_frame(&frame).unwrap();
            prop_assert_eq!(packet.address, PANEL_ADDRESS);
            prop_assert_eq!(packet.code, 0x6000);
            prop_assert_eq!(registers::temperature_raw(packet.data), actual);

            let setpoint = registers::setpoint_raw(packet.data);
            prop_assert_eq!(setpoint % 9, 0);
            prop_assert!((setpoint as f32 / 9.0 - celsius).abs() <= 0.5);
        }
    }
}
