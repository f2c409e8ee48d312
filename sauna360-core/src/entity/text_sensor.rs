//! Text sensor entities

use crate::config::TextSensorsConfig;
use crate::entity::{EntityUpdate, Text, TextSensorKind};
use crate::state::HeaterState;
use crate::traits::{Publish, Sauna360Listener};

/// Publishes the heater state and the session uptime text
///
/// The heater state is published on every report so repeated faults stay
/// visible.
pub struct TextSensorEntities<P> {
    config: TextSensorsConfig,
    publisher: P,
}

impl<P: Publish> TextSensorEntities<P> {
    pub fn new(config: TextSensorsConfig, publisher: P) -> Self {
        Self { config, publisher }
    }

    fn publish_text(&mut self, kind: TextSensorKind, text: &str) {
        let mut value = Text::new();
        // Longer texts are cut at the capacity
        for c in text.chars() {
            if value.push(c).is_err() {
                break;
            }
        }
        self.publisher.publish(EntityUpdate::Text { kind, value });
    }
}

impl<P: Publish> Sauna360Listener for TextSensorEntities<P> {
    fn on_heater_state(&mut self, state: HeaterState) {
        if self.config.heater_state {
            self.publish_text(TextSensorKind::HeaterState, state.as_str());
        }
    }

    fn on_session_uptime_text(&mut self, text: &str) {
        if self.config.session_uptime {
            self.publish_text(TextSensorKind::SessionUptime, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::testing::Recorder;

    #[test]
    fn test_heater_state_every_report() {
        let recorder = Recorder::new();
        let config = TextSensorsConfig {
            heater_state: true,
            session_uptime: false,
        };
        let mut texts = TextSensorEntities::new(config, &recorder);

        texts.on_heater_state(HeaterState::StartBlocked);
        texts.on_heater_state(HeaterState::StartBlocked);
        texts.on_session_uptime_text("00:00:01");

        let updates = recorder.updates();
        assert_eq!(updates.len(), 2);
        match &updates[0] {
            EntityUpdate::Text { kind, value } => {
                assert_eq!(*kind, TextSensorKind::HeaterState);
                assert_eq!(value.as_str(), "Operation blocked by not allowed start");
            }
            other => panic!("unexpected update {:?}", other),
        }
    }
}
