use std::net::IpAddr;

use wifimap_common::LinkInfo;

use crate::cache::CurrentTime;
use crate::command::{CommandRunner, SystemRunner};
use crate::error::ScanError;
use crate::parse::{parse_ip_route, parse_iw_link, parse_iw_scan, parse_netstat, parse_ping, PingStats};
use crate::provider::{ScanProvider, ScanResult, ScanSource};
use crate::ScanConfig;

pub struct LinuxProvider {
    interface: String,
    runner: Box<dyn CommandRunner>,
}

impl LinuxProvider {
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_runner(&config.interface, Box::new(SystemRunner::new(config.command_timeout)))
    }

    pub fn with_runner(interface: &str, runner: Box<dyn CommandRunner>) -> Self {
        Self {
            interface: interface.to_string(),
            runner,
        }
    }

    fn iw(&self, command: &str) -> Result<String, ScanError> {
        let output = self.runner.run("iw", &["dev", &self.interface, command])?;
        if !output.success {
            return Err(ScanError::CommandFailed(format!(
                "iw dev {} {}: {}",
                self.interface,
                command,
                output.stderr.trim()
            )));
        }
        Ok(output.stdout)
    }
}

impl ScanProvider for LinuxProvider {
    fn name(&self) -> &'static str {
        "linux"
    }

    /// Triggering a scan needs CAP_NET_ADMIN; without it iw fails and the
    /// error is passed up
    fn scan(&self, now: CurrentTime) -> Result<ScanResult, ScanError> {
        let output = self.iw("scan")?;

        Ok(ScanResult {
            t: now,
            source: ScanSource::Iw,
            networks: parse_iw_scan(&output),
        })
    }

    fn link_info(&self) -> Result<LinkInfo, ScanError> {
        let output = self.iw("link")?;
        Ok(parse_iw_link(&output))
    }

    fn gateway(&self) -> Result<Option<IpAddr>, ScanError> {
        if let Ok(output) = self.runner.run("ip", &["route", "show", "default"]) {
            if let Some(gateway) = parse_ip_route(&output.stdout) {
                return Ok(Some(gateway));
            }
        }

        let output = self.runner.run("netstat", &["-rn"])?;
        Ok(parse_netstat(&output.stdout))
    }

    fn ping(&self, host: IpAddr, count: u32) -> Result<PingStats, ScanError> {
        let host = host.to_string();
        let count = count.to_string();
        let output = self.runner.run("ping", &["-c", &count, "-W", "1", &host])?;
        Ok(parse_ping(output.text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::scripted::ScriptedRunner;
    use wifimap_common::Band;

    #[test]
    fn test_scan_uses_interface() {
        let runner = ScriptedRunner::new().with(
            "iw dev wlp2s0 scan",
            "BSS aa:bb:cc:dd:ee:ff(on wlp2s0)\n\tfreq: 2412\n\tsignal: -40.00 dBm\n\tSSID: Lab\n",
        );
        let provider = LinuxProvider::with_runner("wlp2s0", Box::new(runner));

        let result = provider.scan(100).expect("scan result");

        assert_eq!(result.source, ScanSource::Iw);
        assert_eq!(result.networks.len(), 1);
        assert_eq!(result.networks[0].channel, Some(1));
        assert_eq!(result.networks[0].band, Some(Band::Ghz2_4));
    }

    #[test]
    fn test_scan_error_propagates() {
        let provider = LinuxProvider::with_runner("wlan0", Box::new(ScriptedRunner::new()));

        assert!(matches!(provider.scan(0), Err(ScanError::CommandFailed(_))));
    }

    #[test]
    fn test_gateway() {
        let runner = ScriptedRunner::new().with("ip route show default", "default via 10.1.1.1 dev wlan0\n");
        let provider = LinuxProvider::with_runner("wlan0", Box::new(runner));

        assert_eq!(
            provider.gateway().expect("gateway lookup"),
            Some("10.1.1.1".parse().expect("address"))
        );
    }

    #[test]
    fn test_link_not_connected() {
        let runner = ScriptedRunner::new().with("iw dev wlan0 link", "Not connected.\n");
        let provider = LinuxProvider::with_runner("wlan0", Box::new(runner));

        assert_eq!(provider.link_info().expect("link info"), LinkInfo::default());
    }
}
