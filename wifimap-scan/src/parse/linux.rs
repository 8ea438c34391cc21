use wifimap_common::{Band, LinkInfo, ObservedNetwork};

use super::util::{channel_from_frequency, channel_width, first_small_int, network, non_empty, to_number};

fn frequency(value: &str) -> Option<u32> {
    let number = value.split_whitespace().next()?;
    to_number(number).map(|mhz| mhz.round() as u32)
}

fn signal(value: &str) -> Option<f64> {
    value.split_whitespace().next().and_then(to_number)
}

/// `iw dev <iface> link`
pub fn parse_iw_link(output: &str) -> LinkInfo {
    let mut info = LinkInfo::default();

    for line in output.lines().map(str::trim) {
        if line.starts_with("Not connected") {
            return LinkInfo::default();
        }

        if let Some(rest) = line.strip_prefix("Connected to ") {
            info.bssid = rest.split_whitespace().next().map(str::to_string);
        } else if let Some(value) = line.strip_prefix("SSID:") {
            info.ssid = non_empty(Some(value));
        } else if let Some(value) = line.strip_prefix("freq:") {
            let freq = frequency(value);
            info.channel = freq.and_then(channel_from_frequency);
            info.band = freq.and_then(Band::from_frequency_mhz);
        } else if let Some(value) = line.strip_prefix("signal:") {
            info.rssi_dbm = signal(value);
        }
    }

    info
}

#[derive(Default)]
struct BssEntry {
    bssid: Option<String>,
    ssid: Option<String>,
    freq: Option<u32>,
    signal: Option<f64>,
    channel: Option<u32>,
    width: Option<u32>,
}

impl BssEntry {
    fn into_network(self) -> ObservedNetwork {
        let channel = self.channel.or_else(|| self.freq.and_then(channel_from_frequency));
        let band = self.freq.and_then(Band::from_frequency_mhz);
        network(self.ssid, self.bssid, self.signal, channel, self.width, band)
    }
}

/// `iw dev <iface> scan`. Every `BSS xx:xx:...` line opens a new record.
pub fn parse_iw_scan(output: &str) -> Vec<ObservedNetwork> {
    let mut networks = Vec::new();
    let mut current: Option<BssEntry> = None;

    for raw in output.lines() {
        let line = raw.trim();

        if let Some(rest) = line.strip_prefix("BSS ") {
            if let Some(entry) = current.take() {
                networks.push(entry.into_network());
            }
            let bssid = rest
                .split(|c: char| c == '(' || c.is_whitespace())
                .next()
                .filter(|b| !b.is_empty())
                .map(str::to_string);
            current = Some(BssEntry {
                bssid,
                ..BssEntry::default()
            });
            continue;
        }

        let Some(entry) = current.as_mut() else {
            continue;
        };

        if let Some(value) = line.strip_prefix("freq:") {
            entry.freq = frequency(value);
        } else if let Some(value) = line.strip_prefix("signal:") {
            entry.signal = signal(value);
        } else if let Some(value) = line.strip_prefix("SSID:") {
            entry.ssid = non_empty(Some(value));
        } else if let Some(value) = line.strip_prefix("DS Parameter set: channel") {
            entry.channel = first_small_int(value);
        } else if let Some(value) = line.strip_prefix("* primary channel:") {
            entry.channel = entry.channel.or_else(|| first_small_int(value));
        } else if line.to_ascii_lowercase().contains("channel width") && line.contains("MHz") {
            entry.width = entry.width.or_else(|| channel_width(line));
        }
    }

    if let Some(entry) = current.take() {
        networks.push(entry.into_network());
    }

    networks
}
