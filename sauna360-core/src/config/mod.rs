//! Configuration types, validation and loading
//!
//! The firmware embeds a TOML file and reads it with [`parse_config`].
//! With the `serde` feature the same types deserialize through `serde`,
//! which the firmware build script uses to reject bad files at compile
//! time.

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ParseError};
pub use types::*;
