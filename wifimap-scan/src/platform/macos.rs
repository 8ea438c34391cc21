use std::net::IpAddr;

use wifimap_common::LinkInfo;

use crate::cache::CurrentTime;
use crate::command::{CommandRunner, SystemRunner};
use crate::error::ScanError;
use crate::parse::{
    parse_airport, parse_netstat, parse_ping, parse_route_get, parse_system_profiler, parse_wdutil_info,
    parse_wdutil_scan, PingStats,
};
use crate::provider::{ScanProvider, ScanResult, ScanSource};
use crate::ScanConfig;

const AIRPORT: &str =
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport";

pub struct MacProvider {
    runner: Box<dyn CommandRunner>,
}

impl MacProvider {
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_runner(Box::new(SystemRunner::new(config.command_timeout)))
    }

    pub fn with_runner(runner: Box<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Recent macOS releases removed `airport` and moved scanning into
    /// `wdutil`, older ones only have `system_profiler`
    fn supports_wdutil_scan(&self) -> bool {
        match self.runner.run("wdutil", &["help"]) {
            Ok(output) => output.stdout.to_ascii_lowercase().contains("scan"),
            Err(err) => {
                log::debug!("wdutil unavailable: {}", err);
                false
            }
        }
    }
}

impl ScanProvider for MacProvider {
    fn name(&self) -> &'static str {
        "macos"
    }

    fn scan(&self, now: CurrentTime) -> Result<ScanResult, ScanError> {
        if self.supports_wdutil_scan() {
            match self.runner.run("wdutil", &["scan"]) {
                Ok(output) => {
                    let networks = parse_wdutil_scan(&output.stdout);
                    if !networks.is_empty() {
                        return Ok(ScanResult {
                            t: now,
                            source: ScanSource::Wdutil,
                            networks,
                        });
                    }
                    log::debug!("wdutil scan returned no networks, trying system_profiler");
                }
                Err(err) => log::warn!("wdutil scan failed: {}", err),
            }
        }

        let output = self.runner.run("system_profiler", &["SPAirPortDataType"])?;

        Ok(ScanResult {
            t: now,
            source: ScanSource::SystemProfiler,
            networks: parse_system_profiler(&output.stdout),
        })
    }

    fn link_info(&self) -> Result<LinkInfo, ScanError> {
        match self.runner.run(AIRPORT, &["-I"]) {
            Ok(output) => {
                let info = parse_airport(&output.stdout);
                if info.ssid.is_some() || info.rssi_dbm.is_some() {
                    return Ok(info);
                }
            }
            Err(err) => log::debug!("airport unavailable: {}", err),
        }

        let output = self.runner.run("wdutil", &["info"])?;
        Ok(parse_wdutil_info(&output.stdout))
    }

    fn gateway(&self) -> Result<Option<IpAddr>, ScanError> {
        if let Ok(output) = self.runner.run("route", &["-n", "get", "default"]) {
            if let Some(gateway) = parse_route_get(&output.stdout).or_else(|| parse_route_get(&output.stderr)) {
                return Ok(Some(gateway));
            }
        }

        let output = self.runner.run("netstat", &["-rn"])?;
        Ok(parse_netstat(&output.stdout))
    }

    fn ping(&self, host: IpAddr, count: u32) -> Result<PingStats, ScanError> {
        let host = host.to_string();
        let count = count.to_string();
        let output = self.runner.run("ping", &["-c", &count, "-W", "1000", &host])?;
        Ok(parse_ping(output.text()))
    }
}
