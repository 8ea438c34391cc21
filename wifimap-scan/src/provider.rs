use core::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use wifimap_common::{LinkInfo, ObservedNetwork};

use crate::cache::CurrentTime;
use crate::error::ScanError;
use crate::parse::PingStats;

/// Tool that produced a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanSource {
    Wdutil,
    SystemProfiler,
    Iw,
    Netsh,
    #[serde(rename = "none")]
    Unavailable,
}

impl ScanSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanSource::Wdutil => "wdutil",
            ScanSource::SystemProfiler => "system_profiler",
            ScanSource::Iw => "iw",
            ScanSource::Netsh => "netsh",
            ScanSource::Unavailable => "none",
        }
    }
}

impl fmt::Display for ScanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// When the scan ran, in milliseconds since the epoch
    pub t: CurrentTime,
    pub source: ScanSource,
    pub networks: Vec<ObservedNetwork>,
}

impl ScanResult {
    pub fn empty(t: CurrentTime) -> Self {
        Self {
            t,
            source: ScanSource::Unavailable,
            networks: Vec::new(),
        }
    }
}

/// A scan as handed to clients, with whether it came from the memo
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSnapshot {
    pub result: ScanResult,
    pub cache_hit: bool,
}

/// Platform access to the Wi-Fi adapter and the network behind it.
///
/// Calls block on external tools. Async callers should run them on a
/// blocking thread.
pub trait ScanProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Neighbouring networks as seen by the adapter
    fn scan(&self, now: CurrentTime) -> Result<ScanResult, ScanError>;

    /// Current association. A disconnected adapter gives an empty `LinkInfo`.
    fn link_info(&self) -> Result<LinkInfo, ScanError>;

    fn gateway(&self) -> Result<Option<IpAddr>, ScanError>;

    fn ping(&self, host: IpAddr, count: u32) -> Result<PingStats, ScanError>;
}
