//! Wi-Fi scanning and link probing through the tools each OS ships with.

pub mod cache;
pub mod command;
pub mod error;
pub mod parse;
pub mod platform;
pub mod provider;

use std::time::Duration;

pub use cache::{now_ms, CurrentTime, Stamped, TimedMemo};
pub use error::ScanError;
pub use parse::PingStats;
pub use platform::create_provider;
pub use provider::{ScanProvider, ScanResult, ScanSnapshot, ScanSource};

pub const DEFAULT_INTERFACE: &str = "wlan0";
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(12);

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Wireless interface used by providers that need one (Linux)
    pub interface: String,
    pub command_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interface: DEFAULT_INTERFACE.to_string(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}
