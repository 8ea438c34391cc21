use std::net::IpAddr;

use wifimap_common::LinkInfo;

use crate::cache::CurrentTime;
use crate::error::ScanError;
use crate::parse::PingStats;
use crate::provider::{ScanProvider, ScanResult};

/// Provider for targets without a known Wi-Fi tool. Scans come back empty.
pub struct NullProvider;

impl ScanProvider for NullProvider {
    fn name(&self) -> &'static str {
        "none"
    }

    fn scan(&self, now: CurrentTime) -> Result<ScanResult, ScanError> {
        Ok(ScanResult::empty(now))
    }

    fn link_info(&self) -> Result<LinkInfo, ScanError> {
        Ok(LinkInfo::default())
    }

    fn gateway(&self) -> Result<Option<IpAddr>, ScanError> {
        Ok(None)
    }

    fn ping(&self, _host: IpAddr, _count: u32) -> Result<PingStats, ScanError> {
        Err(ScanError::NotSupported)
    }
}
