use std::net::IpAddr;

use wifimap_common::LinkInfo;

use crate::cache::CurrentTime;
use crate::command::{CommandRunner, SystemRunner};
use crate::error::ScanError;
use crate::parse::{parse_netsh_interfaces, parse_netsh_networks, parse_ping, parse_route_print, PingStats};
use crate::provider::{ScanProvider, ScanResult, ScanSource};
use crate::ScanConfig;

pub struct WindowsProvider {
    runner: Box<dyn CommandRunner>,
}

impl WindowsProvider {
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_runner(Box::new(SystemRunner::new(config.command_timeout)))
    }

    pub fn with_runner(runner: Box<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl ScanProvider for WindowsProvider {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn scan(&self, now: CurrentTime) -> Result<ScanResult, ScanError> {
        let output = self.runner.run("netsh", &["wlan", "show", "networks", "mode=bssid"])?;

        Ok(ScanResult {
            t: now,
            source: ScanSource::Netsh,
            networks: parse_netsh_networks(&output.stdout),
        })
    }

    fn link_info(&self) -> Result<LinkInfo, ScanError> {
        let output = self.runner.run("netsh", &["wlan", "show", "interfaces"])?;
        Ok(parse_netsh_interfaces(&output.stdout))
    }

    fn gateway(&self) -> Result<Option<IpAddr>, ScanError> {
        let output = self.runner.run("route", &["print", "-4", "0.0.0.0"])?;
        Ok(parse_route_print(&output.stdout))
    }

    fn ping(&self, host: IpAddr, count: u32) -> Result<PingStats, ScanError> {
        let host = host.to_string();
        let count = count.to_string();
        let output = self.runner.run("ping", &["-n", &count, "-w", "1000", &host])?;
        Ok(parse_ping(output.text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::scripted::ScriptedRunner;

    #[test]
    fn test_scan_and_link() {
        let runner = ScriptedRunner::new()
            .with(
                "netsh wlan show networks mode=bssid",
                "SSID 1 : Cafe\n    BSSID 1 : aa:bb:cc:dd:ee:ff\n         Signal : 70%\n         Channel : 11\n",
            )
            .with("netsh wlan show interfaces", "    SSID : Cafe\n    Signal : 70%\n");
        let provider = WindowsProvider::with_runner(Box::new(runner));

        let result = provider.scan(1).expect("scan result");
        assert_eq!(result.source, ScanSource::Netsh);
        assert_eq!(result.networks.len(), 1);
        assert_eq!(result.networks[0].rssi_dbm, Some(-65.0));

        let info = provider.link_info().expect("link info");
        assert_eq!(info.ssid.as_deref(), Some("Cafe"));
        assert_eq!(info.rssi_dbm, Some(-65.0));
    }

    #[test]
    fn test_ping_uses_windows_flags() {
        let runner = ScriptedRunner::new().with(
            "ping -n 2 -w 1000 10.0.0.1",
            "    Packets: Sent = 2, Received = 2, Lost = 0 (0% loss),\n    Minimum = 3ms, Maximum = 5ms, Average = 4ms\n",
        );
        let provider = WindowsProvider::with_runner(Box::new(runner));

        let stats = provider.ping("10.0.0.1".parse().expect("address"), 2).expect("ping stats");

        assert_eq!(stats.avg_ms, Some(4.0));
        assert_eq!(stats.jitter_ms, Some(2.0));
    }
}
