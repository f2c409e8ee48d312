//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod bus;
pub mod console_rx;
pub mod console_tx;
pub mod tick;

pub use bus::{bus_task, BusLog};
pub use console_rx::console_rx_task;
pub use console_tx::console_tx_task;
pub use tick::tick_task;
