//! Build script for sauna360-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates sauna.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use sauna360_core::config::SaunaConfig;

/// Sections the on-device parser understands
const KNOWN_SECTIONS: &[&str] = &[
    "model",
    "uart",
    "number",
    "sensor",
    "binary_sensor",
    "text_sensor",
    "switch",
    "climate",
];

const KNOWN_NUMBERS: &[&str] = &["bath_time", "bath_temperature", "max_bath_temperature"];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

/// Validate sauna.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=sauna.toml");

    let config_path = Path::new("sauna.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: sauna.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a sauna.toml configuration file.            ║\n\
            ║  Please create one in the sauna360-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read sauna.toml", &e.to_string()),
    };

    // Syntax first, so errors point at the offending line
    let value: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail("Invalid TOML syntax in sauna.toml", &e.to_string()),
    };

    validate_sections(&value);

    let config: SaunaConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => fail("Invalid value in sauna.toml", &e.to_string()),
    };

    if let Err(e) = config.validate() {
        fail("Invalid configuration in sauna.toml", &format!("{:?}", e));
    }

    // The device parser must agree with serde
    match sauna360_core::config::parse_config(&content) {
        Ok(parsed) if parsed == config => {}
        Ok(_) => fail(
            "sauna.toml reads differently on the device",
            "Use only plain key = value pairs and [section] headers",
        ),
        Err(e) => fail("sauna.toml is not readable on the device", &format!("{:?}", e)),
    }

    println!("cargo:warning=sauna.toml validated successfully");
}

/// Reject sections the device parser would refuse
fn validate_sections(value: &toml::Value) {
    let Some(table) = value.as_table() else {
        return;
    };

    let mut errors = Vec::new();
    for (key, item) in table {
        if !KNOWN_SECTIONS.contains(&key.as_str()) {
            errors.push(format!("Unknown section [{}]", key));
            continue;
        }
        if key == "number" {
            if let Some(numbers) = item.as_table() {
                for name in numbers.keys() {
                    if !KNOWN_NUMBERS.contains(&name.as_str()) {
                        errors.push(format!("Unknown number [number.{}]", name));
                    }
                }
            }
        }
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Unknown sections in sauna.toml                           ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

fn fail(title: &str, detail: &str) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(detail)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
