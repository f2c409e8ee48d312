//! Configuration loading
//!
//! The configuration is compiled into the firmware. build.rs has already
//! rejected files that fail to parse or validate, so the fallback here
//! only guards against the two readers disagreeing.

use defmt::*;

use sauna360_core::config::{parse_config, SaunaConfig};
use sauna360_core::entity::NumberKind;

/// Embedded configuration; edit sauna.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../sauna.toml");

/// Load and validate the embedded configuration
pub fn load_config() -> SaunaConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse sauna.toml: {:?}", e);
            return SaunaConfig::new();
        }
    };

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {:?}", e);
        return SaunaConfig::new();
    }

    log_summary(&config);
    config
}

fn log_summary(config: &SaunaConfig) {
    info!("Heater model: {}", config.model.name());
    info!(
        "Bus UART: {} baud, {} data bits, {:?} parity, {} stop bits",
        config.uart.baud_rate, config.uart.data_bits, config.uart.parity, config.uart.stop_bits
    );

    for kind in NumberKind::ALL {
        if let Some((min, max)) = config.number.range(kind) {
            info!(
                "Number {}: {}..{} default={:?}",
                kind.object_id(),
                min,
                max,
                config.number.default_value(kind)
            );
        }
    }

    info!(
        "Switches: light={} heater={}",
        config.switch.light_relay, config.switch.heater_relay
    );
    if let Some(climate) = &config.climate {
        info!(
            "Climate: number link={} relay link={}",
            climate.bath_temperature_number, climate.heater_relay
        );
    }
}
