use wifimap_common::network::Channel;
use wifimap_common::{Band, ObservedNetwork};

/// Splits `Key : value` at the first colon. Returns the trimmed key and value.
pub fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    Some((key.trim(), value.trim()))
}

/// Value of the first line whose key equals `key` (case-insensitive)
pub fn find_value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    text.lines()
        .filter_map(split_key_value)
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn to_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// First signed integer in `text`, e.g. `-63` in `-63 dBm`
pub fn leading_int(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
    let value: f64 = digits.parse().ok()?;

    if text[..start].ends_with('-') {
        Some(-value)
    } else {
        Some(value)
    }
}

/// First run of digits, at most three of them
pub fn first_small_int(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .take(3)
        .collect();
    digits.parse().ok()
}

/// Width in front of an `MHz` unit, or after a slash as in `11/20`
pub fn channel_width(text: &str) -> Option<u32> {
    let lower = text.to_ascii_lowercase();

    for (index, _) in lower.match_indices("mhz") {
        let before = lower[..index].trim_end();
        let digits: String = before
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if (2..=3).contains(&digits.len()) {
            return digits.parse().ok();
        }
    }

    let (_, after) = text.split_once('/')?;
    first_small_int(after).filter(|_| after.starts_with(|c: char| c.is_ascii_digit()))
}

/// Channel and width from strings like `36 (5 GHz, 80 MHz)` or `11/20`
pub fn channel_info(text: &str) -> (Option<Channel>, Option<u32>) {
    (first_small_int(text), channel_width(text))
}

pub fn channel_from_frequency(freq: u32) -> Option<Channel> {
    match freq {
        2484 => Some(14),
        2412..=2472 => Some((freq - 2407) / 5),
        5000..=5900 => Some((freq - 5000) / 5),
        5955..=7115 => Some((freq - 5950) / 5),
        _ => None,
    }
}

pub fn is_mac(text: &str) -> bool {
    let parts: Vec<&str> = text.split(':').collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Splits a table row on runs of two or more spaces
pub fn columns(line: &str) -> Vec<&str> {
    line.split("  ")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

pub fn leading_spaces(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Percent signal quality as reported by Windows, converted to dBm
pub fn percent_to_dbm(percent: f64) -> f64 {
    (percent / 2.0 - 100.0).round()
}

/// Builds a network record, inferring the band from the channel when the
/// tool didn't report one
pub fn network(
    ssid: Option<String>,
    bssid: Option<String>,
    rssi_dbm: Option<f64>,
    channel: Option<Channel>,
    channel_width_mhz: Option<u32>,
    band: Option<Band>,
) -> ObservedNetwork {
    let channel = channel.filter(|c| *c != 0);
    ObservedNetwork {
        ssid,
        bssid,
        band: band.or_else(|| channel.and_then(Band::from_channel)),
        channel,
        channel_width_mhz,
        rssi_dbm: rssi_dbm.filter(|v| v.is_finite()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_info() {
        assert_eq!(channel_info("11/20"), (Some(11), Some(20)));
        assert_eq!(channel_info("36 (5 GHz, 80 MHz)"), (Some(36), Some(80)));
        assert_eq!(channel_info("149"), (Some(149), None));
        assert_eq!(channel_info(""), (None, None));
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("-63 dBm"), Some(-63.0));
        assert_eq!(leading_int("RSSI 40"), Some(40.0));
        assert_eq!(leading_int("n/a"), None);
    }

    #[test]
    fn test_channel_from_frequency() {
        assert_eq!(channel_from_frequency(2412), Some(1));
        assert_eq!(channel_from_frequency(2437), Some(6));
        assert_eq!(channel_from_frequency(2484), Some(14));
        assert_eq!(channel_from_frequency(5180), Some(36));
        assert_eq!(channel_from_frequency(5745), Some(149));
        assert_eq!(channel_from_frequency(5975), Some(5));
        assert_eq!(channel_from_frequency(900), None);
    }

    #[test]
    fn test_columns_and_mac() {
        assert_eq!(
            columns("Office WiFi   aa:bb:cc:dd:ee:ff  -55  11/20"),
            vec!["Office WiFi", "aa:bb:cc:dd:ee:ff", "-55", "11/20"]
        );
        assert!(is_mac("AA:bb:cc:dd:ee:0F"));
        assert!(!is_mac("aa:bb:cc"));
    }

    #[test]
    fn test_percent_to_dbm() {
        assert_eq!(percent_to_dbm(80.0), -60.0);
        assert_eq!(percent_to_dbm(98.0), -51.0);
    }
}
