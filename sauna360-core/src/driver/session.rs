//! Session uptime tracking
//!
//! A session runs while the heater reports itself on. Its elapsed time is
//! published once per second and frozen when the heater switches off.

use core::fmt::Write;

use heapless::String;

/// Interval between session uptime publications
pub const SESSION_PUBLISH_INTERVAL_MS: u64 = 1000;

/// `HH:MM:SS` rendering of a session uptime
pub type UptimeText = String<16>;

#[derive(Debug, Clone, Default)]
pub struct SessionTimer {
    running: bool,
    start_ms: u64,
    /// Elapsed seconds of the last finished session
    frozen_s: u32,
    last_publish_ms: u64,
}

impl SessionTimer {
    pub const fn new() -> Self {
        Self {
            running: false,
            start_ms: 0,
            frozen_s: 0,
            last_publish_ms: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start a session; returns false when one is already running
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.start_ms = now_ms;
        self.last_publish_ms = now_ms;
        true
    }

    /// Stop the running session and return its final length in seconds
    pub fn stop(&mut self, now_ms: u64) -> Option<u32> {
        if !self.running {
            return None;
        }
        self.frozen_s = self.elapsed_s(now_ms);
        self.running = false;
        Some(self.frozen_s)
    }

    /// Elapsed seconds of the running session, or of the last one
    pub fn elapsed_s(&self, now_ms: u64) -> u32 {
        if self.running {
            let elapsed = now_ms.saturating_sub(self.start_ms) / 1000;
            u32::try_from(elapsed).unwrap_or(u32::MAX)
        } else {
            self.frozen_s
        }
    }

    /// Elapsed seconds, when a publication is due
    pub fn poll(&mut self, now_ms: u64) -> Option<u32> {
        if !self.running
            || now_ms.saturating_sub(self.last_publish_ms) < SESSION_PUBLISH_INTERVAL_MS
        {
            return None;
        }
        self.last_publish_ms = now_ms;
        Some(self.elapsed_s(now_ms))
    }
}

/// Render seconds as `HH:MM:SS`
pub fn format_uptime(seconds: u32) -> UptimeText {
    let mut text = UptimeText::new();
    // u32 seconds need at most 7 hour digits, which fits
    let _ = write!(
        text,
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    );
    text
}
