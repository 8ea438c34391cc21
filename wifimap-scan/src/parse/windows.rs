use wifimap_common::{Band, LinkInfo, ObservedNetwork};

use super::util::{find_value, first_small_int, network, non_empty, percent_to_dbm, split_key_value, to_number};

fn signal_dbm(value: &str) -> Option<f64> {
    to_number(value.trim_end_matches('%')).map(percent_to_dbm)
}

fn band(value: &str) -> Option<Band> {
    value.parse().ok()
}

/// `netsh wlan show interfaces`. Signal is reported as a percentage.
pub fn parse_netsh_interfaces(output: &str) -> LinkInfo {
    let channel = find_value(output, "Channel").and_then(first_small_int);

    LinkInfo {
        ssid: non_empty(find_value(output, "SSID")),
        bssid: non_empty(find_value(output, "BSSID")),
        band: find_value(output, "Band")
            .and_then(band)
            .or_else(|| channel.and_then(Band::from_channel)),
        channel,
        channel_width_mhz: None,
        rssi_dbm: find_value(output, "Signal").and_then(signal_dbm),
        noise_dbm: None,
    }
}

#[derive(Default)]
struct BssidBlock {
    bssid: Option<String>,
    signal: Option<f64>,
    band: Option<Band>,
    channel: Option<u32>,
}

impl BssidBlock {
    fn into_network(self, ssid: &Option<String>) -> ObservedNetwork {
        network(ssid.clone(), self.bssid, self.signal, self.channel, None, self.band)
    }
}

/// Key without its ordinal, `BSSID 2` becomes `bssid`
fn header_key(key: &str) -> String {
    key.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// `netsh wlan show networks mode=bssid`. One record per BSSID, tagged with
/// the SSID block it was listed under.
pub fn parse_netsh_networks(output: &str) -> Vec<ObservedNetwork> {
    let mut networks = Vec::new();
    let mut ssid: Option<String> = None;
    let mut block: Option<BssidBlock> = None;

    for line in output.lines() {
        let Some((key, value)) = split_key_value(line) else {
            continue;
        };

        match header_key(key).as_str() {
            "ssid" => {
                if let Some(done) = block.take() {
                    networks.push(done.into_network(&ssid));
                }
                ssid = non_empty(Some(value));
            }
            "bssid" => {
                if let Some(done) = block.take() {
                    networks.push(done.into_network(&ssid));
                }
                block = Some(BssidBlock {
                    bssid: non_empty(Some(value)),
                    ..BssidBlock::default()
                });
            }
            "signal" => {
                if let Some(current) = block.as_mut() {
                    current.signal = signal_dbm(value);
                }
            }
            "band" => {
                if let Some(current) = block.as_mut() {
                    current.band = band(value);
                }
            }
            "channel" if key.eq_ignore_ascii_case("channel") => {
                if let Some(current) = block.as_mut() {
                    current.channel = first_small_int(value);
                }
            }
            _ => {}
        }
    }

    if let Some(done) = block.take() {
        networks.push(done.into_network(&ssid));
    }

    networks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_netsh_interfaces() {
        let output = "
There is 1 interface on the system:

    Name                   : Wi-Fi
    Description            : Intel(R) Wi-Fi 6 AX201 160MHz
    State                  : connected
    SSID                   : OfficeWiFi
    BSSID                  : aa:bb:cc:dd:ee:ff
    Network type           : Infrastructure
    Radio type             : 802.11ax
    Band                   : 5 GHz
    Channel                : 44
    Signal                 : 80%
";
        let info = parse_netsh_interfaces(output);

        assert_eq!(info.ssid.as_deref(), Some("OfficeWiFi"));
        assert_eq!(info.bssid.as_deref(), Some("aa:bb:cc:dd:ee:ff"));
        assert_eq!(info.band, Some(Band::Ghz5));
        assert_eq!(info.channel, Some(44));
        assert_eq!(info.rssi_dbm, Some(-60.0));
    }

    #[test]
    fn test_netsh_networks() {
        let output = "
Interface name : Wi-Fi
There are 2 networks currently visible.

SSID 1 : OfficeWiFi
    Network type            : Infrastructure
    Authentication          : WPA2-Personal
    BSSID 1                 : aa:bb:cc:dd:ee:ff
         Signal             : 90%
         Radio type         : 802.11ax
         Band               : 2.4 GHz
         Channel            : 6
    BSSID 2                 : aa:bb:cc:dd:ee:00
         Signal             : 40%
         Channel            : 149

SSID 2 :
    Network type            : Infrastructure
    BSSID 1                 : 11:22:33:44:55:66
         Signal             : 60%
         Channel            : 1
";
        let networks = parse_netsh_networks(output);

        assert_eq!(networks.len(), 3);

        assert_eq!(networks[0].ssid.as_deref(), Some("OfficeWiFi"));
        assert_eq!(networks[0].bssid.as_deref(), Some("aa:bb:cc:dd:ee:ff"));
        assert_eq!(networks[0].rssi_dbm, Some(-55.0));
        assert_eq!(networks[0].band, Some(Band::Ghz2_4));
        assert_eq!(networks[0].channel, Some(6));

        assert_eq!(networks[1].ssid.as_deref(), Some("OfficeWiFi"));
        assert_eq!(networks[1].rssi_dbm, Some(-80.0));
        assert_eq!(networks[1].band, Some(Band::Ghz5));
        assert_eq!(networks[1].channel, Some(149));

        assert_eq!(networks[2].ssid, None);
        assert_eq!(networks[2].channel, Some(1));
    }

    #[test]
    fn test_netsh_no_networks() {
        assert!(parse_netsh_networks("There are 0 networks currently visible.\n").is_empty());
    }
}
