use wifimap_common::MetricConfig;

pub const RSSI_DBM: &str = "rssi_dbm";
pub const SNR_DB: &str = "snr_db";
pub const PING_AVG_MS: &str = "ping_avg_ms";
pub const PING_JITTER_MS: &str = "ping_jitter_ms";
pub const PING_LOSS_PCT: &str = "ping_loss_pct";

/// Metrics a survey sample can carry, with their display thresholds
pub fn default_catalog() -> Vec<MetricConfig> {
    vec![
        MetricConfig::new(RSSI_DBM, "RSSI (dBm)", -50.0, -80.0),
        MetricConfig::new(SNR_DB, "SNR (dB)", 25.0, 10.0),
        MetricConfig::new(PING_AVG_MS, "Latency to router (ms)", 2.0, 30.0),
        MetricConfig::new(PING_JITTER_MS, "Jitter (ms)", 2.0, 20.0),
        MetricConfig::new(PING_LOSS_PCT, "Packet loss (%)", 0.0, 10.0),
    ]
}

pub fn find_metric<'a>(catalog: &'a [MetricConfig], key: &str) -> Option<&'a MetricConfig> {
    catalog.iter().find(|metric| metric.key == key)
}

/// Human readable value, unit picked from the key suffix
pub fn format_metric_value(value: Option<f64>, metric: &MetricConfig) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return "unknown".to_string();
    };

    let key = metric.key.as_str();
    if key.ends_with("_ms") {
        format!("{:.1} ms", value)
    } else if key.ends_with("_pct") {
        format!("{:.1}%", value)
    } else if key.ends_with("_dbm") {
        format!("{} dBm", value)
    } else if key.ends_with("_db") {
        format!("{:.1} dB", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_keys() {
        let catalog = default_catalog();
        let keys: Vec<&str> = catalog.iter().map(|m| m.key.as_str()).collect();

        assert_eq!(keys, vec![RSSI_DBM, SNR_DB, PING_AVG_MS, PING_JITTER_MS, PING_LOSS_PCT]);
        assert!(find_metric(&catalog, RSSI_DBM).expect("rssi metric").higher_is_better());
        assert!(!find_metric(&catalog, PING_AVG_MS).expect("latency metric").higher_is_better());
        assert!(find_metric(&catalog, "throughput").is_none());
    }

    #[test]
    fn test_format_values() {
        let catalog = default_catalog();
        let fmt = |key: &str, value: f64| {
            format_metric_value(Some(value), find_metric(&catalog, key).expect("metric"))
        };

        assert_eq!(fmt(RSSI_DBM, -61.0), "-61 dBm");
        assert_eq!(fmt(SNR_DB, 31.26), "31.3 dB");
        assert_eq!(fmt(PING_AVG_MS, 4.04), "4.0 ms");
        assert_eq!(fmt(PING_LOSS_PCT, 12.5), "12.5%");
        assert_eq!(format_metric_value(None, &catalog[0]), "unknown");
    }
}
