//! Text output of the macOS Wi-Fi tools: `wdutil`, `system_profiler` and the
//! legacy `airport` binary.

use wifimap_common::{Band, LinkInfo, ObservedNetwork};

use super::util::{
    channel_info, columns, find_value, first_small_int, is_mac, leading_int, leading_spaces, network,
    non_empty, split_key_value,
};

fn blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn block_value<'a>(block: &[&'a str], keys: &[&str]) -> Option<&'a str> {
    block
        .iter()
        .filter_map(|line| split_key_value(line))
        .find(|(key, _)| keys.iter().any(|k| key.eq_ignore_ascii_case(k)))
        .map(|(_, value)| value)
}

/// `wdutil scan`: one blank-line separated block per network. Older builds
/// print a table instead, which is used when no block parses.
pub fn parse_wdutil_scan(output: &str) -> Vec<ObservedNetwork> {
    let mut networks = Vec::new();

    for block in blocks(output) {
        let ssid = non_empty(block_value(&block, &["SSID"]));
        let bssid = non_empty(block_value(&block, &["BSSID"]));
        let rssi = block_value(&block, &["RSSI", "Signal"]).and_then(leading_int);
        let channel_line = block_value(&block, &["Channel"]);
        let width_line = block_value(&block, &["Channel Width", "Width"]);

        if ssid.is_none() && bssid.is_none() && rssi.is_none() && channel_line.is_none() {
            continue;
        }

        let (channel, channel_width) = channel_info(channel_line.unwrap_or(""));
        let width = width_line.and_then(|w| channel_info(w).1).or(channel_width);

        networks.push(network(ssid, bssid, rssi, channel, width, None));
    }

    if !networks.is_empty() {
        return networks;
    }

    log::debug!("wdutil scan: no key/value blocks, trying table layout");
    parse_wdutil_table(output)
}

fn parse_wdutil_table(output: &str) -> Vec<ObservedNetwork> {
    let lines: Vec<&str> = output.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let Some(header) = lines.iter().position(|line| {
        let lower = line.to_ascii_lowercase();
        lower.contains("ssid") && lower.contains("channel")
    }) else {
        return Vec::new();
    };

    let mut networks = Vec::new();
    for line in &lines[header + 1..] {
        let parts = columns(line);
        if parts.len() < 2 {
            continue;
        }

        let ssid = non_empty(Some(parts[0]));
        let bssid = parts[1..].iter().find(|p| is_mac(p)).map(|p| p.to_string());
        let rssi_part = parts[1..]
            .iter()
            .find(|p| p.trim_start_matches('-').chars().all(|c| c.is_ascii_digit()));
        let rssi = rssi_part.and_then(|p| p.parse::<f64>().ok());
        let channel_part = parts[1..]
            .iter()
            .filter(|p| !is_mac(p) && Some(*p) != rssi_part)
            .find(|p| p.contains(|c: char| c.is_ascii_digit()));
        let (channel, width) = channel_info(channel_part.copied().unwrap_or(""));

        networks.push(network(ssid, bssid, rssi, channel, width, None));
    }

    networks
}

/// `system_profiler SPAirPortDataType`, "Other Local Wi-Fi Networks" section
pub fn parse_system_profiler(output: &str) -> Vec<ObservedNetwork> {
    let lines: Vec<&str> = output.lines().collect();

    let Some(section) = lines.iter().position(|line| {
        let lower = line.to_ascii_lowercase();
        lower.contains("other local") && lower.contains("networks")
    }) else {
        return Vec::new();
    };

    let mut networks = Vec::new();
    let mut current: Option<ProfilerEntry> = None;
    let mut name_indent: Option<usize> = None;

    for line in &lines[section + 1..] {
        if line.trim().is_empty() {
            continue;
        }
        let indent = leading_spaces(line);
        if indent == 0 {
            break;
        }

        let trimmed = line.trim();
        let nested = name_indent.is_some_and(|name| indent > name);
        if indent >= 4 && trimmed.ends_with(':') && !nested {
            if let Some(entry) = current.take() {
                networks.push(entry.into_network());
            }
            name_indent = Some(indent);

            let name = trimmed.trim_end_matches(':').trim();
            let lower = name.to_ascii_lowercase();
            if lower == "current network information" || lower.starts_with("awdl") {
                continue;
            }

            current = Some(ProfilerEntry::named(name));
            continue;
        }

        let Some(entry) = current.as_mut() else {
            continue;
        };
        if indent < 6 {
            continue;
        }
        let Some((key, value)) = split_key_value(trimmed) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        let key = key.to_ascii_lowercase();
        if key == "channel" {
            let (channel, width) = channel_info(value);
            entry.channel = channel;
            entry.width = width;
        } else if key == "rssi" || key.contains("signal") {
            entry.rssi = leading_int(value);
        } else if key == "bssid" {
            entry.bssid = Some(value.to_string());
        }
    }

    if let Some(entry) = current.take() {
        networks.push(entry.into_network());
    }

    networks
}

struct ProfilerEntry {
    ssid: String,
    bssid: Option<String>,
    rssi: Option<f64>,
    channel: Option<u32>,
    width: Option<u32>,
}

impl ProfilerEntry {
    fn named(ssid: &str) -> Self {
        Self {
            ssid: ssid.to_string(),
            bssid: None,
            rssi: None,
            channel: None,
            width: None,
        }
    }

    fn into_network(self) -> ObservedNetwork {
        network(non_empty(Some(&self.ssid)), self.bssid, self.rssi, self.channel, self.width, None)
    }
}

/// Channel lines of `wdutil info` look like `5g149/80` or `2g6/20`
fn wdutil_channel(line: &str) -> (Option<Band>, Option<u32>, Option<u32>) {
    let lower = line.trim().to_ascii_lowercase();
    let mut band = None;
    let mut rest = lower.as_str();

    for (token, token_band) in [
        ("2ghz", Band::Ghz2_4),
        ("5ghz", Band::Ghz5),
        ("6ghz", Band::Ghz6),
        ("2g", Band::Ghz2_4),
        ("5g", Band::Ghz5),
        ("6g", Band::Ghz6),
    ] {
        if let Some(index) = lower.find(token) {
            band = Some(token_band);
            if index == 0 {
                rest = &lower[token.len()..];
            }
            break;
        }
    }

    let (channel, width) = channel_info(rest);
    (band, channel, width)
}

/// `wdutil info` for the current association
pub fn parse_wdutil_info(output: &str) -> LinkInfo {
    let signal_noise = find_value(output, "Signal / Noise").map(|v| {
        let mut parts = v.split('/');
        (
            parts.next().and_then(leading_int),
            parts.next().and_then(leading_int),
        )
    });

    let rssi = find_value(output, "RSSI")
        .and_then(leading_int)
        .or_else(|| signal_noise.and_then(|(rssi, _)| rssi));
    let noise = find_value(output, "Noise")
        .and_then(leading_int)
        .or_else(|| signal_noise.and_then(|(_, noise)| noise));

    let (band, channel, width) = find_value(output, "Channel")
        .map(wdutil_channel)
        .unwrap_or((None, None, None));

    LinkInfo {
        ssid: non_empty(find_value(output, "SSID")),
        bssid: non_empty(find_value(output, "BSSID")),
        band: band.or_else(|| channel.and_then(Band::from_channel)),
        channel,
        channel_width_mhz: width,
        rssi_dbm: rssi,
        noise_dbm: noise,
    }
}

/// `airport -I`
pub fn parse_airport(output: &str) -> LinkInfo {
    let channel = find_value(output, "channel").and_then(|v| first_small_int(v.split(',').next().unwrap_or("")));

    LinkInfo {
        ssid: non_empty(find_value(output, "SSID")),
        bssid: non_empty(find_value(output, "BSSID")),
        band: channel.and_then(Band::from_channel),
        channel,
        channel_width_mhz: None,
        rssi_dbm: find_value(output, "agrCtlRSSI").and_then(leading_int),
        noise_dbm: find_value(output, "agrCtlNoise").and_then(leading_int),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WDUTIL_SCAN: &str = "
SSID: OfficeWiFi
BSSID: aa:bb:cc:dd:ee:ff
RSSI: -55 dBm
Channel: 11/20

SSID: Guest
RSSI: -70 dBm
Channel: 36 (5 GHz, 80 MHz)
";

    const PROFILER: &str = "
Wi-Fi:

      Interfaces:
        en0:
          Other Local Wi-Fi Networks:
            OfficeWiFi:
              Channel: 11 (2.4 GHz, 20 MHz)
              RSSI: -63 dBm
              BSSID: aa:bb:cc:dd:ee:ff
            NeighborNet:
              Channel: 36 (5 GHz, 80 MHz)
              Signal: -72 dBm
            awdl0:
              Channel: 149
";

    #[test]
    fn test_wdutil_scan_blocks() {
        let networks = parse_wdutil_scan(WDUTIL_SCAN);

        assert_eq!(networks.len(), 2);
        assert_eq!(networks[0].ssid.as_deref(), Some("OfficeWiFi"));
        assert_eq!(networks[0].bssid.as_deref(), Some("aa:bb:cc:dd:ee:ff"));
        assert_eq!(networks[0].rssi_dbm, Some(-55.0));
        assert_eq!(networks[0].channel, Some(11));
        assert_eq!(networks[0].channel_width_mhz, Some(20));
        assert_eq!(networks[0].band, Some(Band::Ghz2_4));
        assert_eq!(networks[1].channel, Some(36));
        assert_eq!(networks[1].channel_width_mhz, Some(80));
        assert_eq!(networks[1].band, Some(Band::Ghz5));
    }

    #[test]
    fn test_wdutil_scan_table() {
        let output = "
SSID            BSSID              RSSI  CHANNEL
Office WiFi     aa:bb:cc:dd:ee:ff  -58   6/20
Upstairs 5      11:22:33:44:55:66  -71   44/80
";
        let networks = parse_wdutil_scan(output);

        assert_eq!(networks.len(), 2);
        assert_eq!(networks[0].ssid.as_deref(), Some("Office WiFi"));
        assert_eq!(networks[0].rssi_dbm, Some(-58.0));
        assert_eq!(networks[0].channel, Some(6));
        assert_eq!(networks[1].ssid.as_deref(), Some("Upstairs 5"));
        assert_eq!(networks[1].channel, Some(44));
        assert_eq!(networks[1].channel_width_mhz, Some(80));
        assert_eq!(networks[1].band, Some(Band::Ghz5));
    }

    #[test]
    fn test_wdutil_scan_empty() {
        assert!(parse_wdutil_scan("").is_empty());
        assert!(parse_wdutil_scan("wdutil: scan requires root\n").is_empty());
    }

    #[test]
    fn test_system_profiler() {
        let networks = parse_system_profiler(PROFILER);

        assert_eq!(networks.len(), 2);
        assert_eq!(networks[0].ssid.as_deref(), Some("OfficeWiFi"));
        assert_eq!(networks[0].channel, Some(11));
        assert_eq!(networks[0].rssi_dbm, Some(-63.0));
        assert_eq!(networks[0].bssid.as_deref(), Some("aa:bb:cc:dd:ee:ff"));
        assert_eq!(networks[1].ssid.as_deref(), Some("NeighborNet"));
        assert_eq!(networks[1].channel, Some(36));
        assert_eq!(networks[1].rssi_dbm, Some(-72.0));
    }

    #[test]
    fn test_system_profiler_without_section() {
        assert!(parse_system_profiler("Wi-Fi:\n  Interfaces:\n").is_empty());
    }

    #[test]
    fn test_wdutil_info() {
        let output = "
--------------------------------------------------------------------
WIFI
--------------------------------------------------------------------
    MAC Address          : 3c:22:fb:00:00:01 (hw=3c:22:fb:00:00:01)
    SSID                 : OfficeWiFi
    BSSID                : aa:bb:cc:dd:ee:ff
    RSSI                 : -52 dBm
    Noise                : -94 dBm
    Channel              : 5g149/80
";
        let info = parse_wdutil_info(output);

        assert_eq!(info.ssid.as_deref(), Some("OfficeWiFi"));
        assert_eq!(info.bssid.as_deref(), Some("aa:bb:cc:dd:ee:ff"));
        assert_eq!(info.rssi_dbm, Some(-52.0));
        assert_eq!(info.noise_dbm, Some(-94.0));
        assert_eq!(info.band, Some(Band::Ghz5));
        assert_eq!(info.channel, Some(149));
        assert_eq!(info.channel_width_mhz, Some(80));
        assert_eq!(info.snr_db(), Some(42.0));
    }

    #[test]
    fn test_wdutil_info_signal_noise() {
        let output = "    SSID : Home\n    Signal / Noise : -61 dBm / -90 dBm\n    Channel : 2g6/20\n";
        let info = parse_wdutil_info(output);

        assert_eq!(info.rssi_dbm, Some(-61.0));
        assert_eq!(info.noise_dbm, Some(-90.0));
        assert_eq!(info.band, Some(Band::Ghz2_4));
        assert_eq!(info.channel, Some(6));
    }

    #[test]
    fn test_airport() {
        let output = "
     agrCtlRSSI: -58
     agrExtRSSI: 0
    agrCtlNoise: -91
          state: running
           BSSID: aa:bb:cc:dd:ee:ff
            SSID: OfficeWiFi
         channel: 149,80
";
        let info = parse_airport(output);

        assert_eq!(info.ssid.as_deref(), Some("OfficeWiFi"));
        assert_eq!(info.rssi_dbm, Some(-58.0));
        assert_eq!(info.noise_dbm, Some(-91.0));
        assert_eq!(info.channel, Some(149));
        assert_eq!(info.band, Some(Band::Ghz5));
    }
}
