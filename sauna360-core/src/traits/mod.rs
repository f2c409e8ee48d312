//! Seams between the driver and the outside world
//!
//! The driver reports decoded heater state through [`Sauna360Listener`];
//! entity adapters turn those callbacks into updates for a [`Publish`]
//! sink.

pub mod listener;
pub mod publish;

pub use listener::Sauna360Listener;
pub use publish::Publish;
