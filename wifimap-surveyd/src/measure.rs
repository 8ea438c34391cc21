use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use wifimap_common::{LinkInfo, Sample};
use wifimap_core::metrics::{PING_AVG_MS, PING_JITTER_MS, PING_LOSS_PCT, RSSI_DBM, SNR_DB};
use wifimap_scan::{now_ms, PingStats};

use crate::config::MeasureConfig;
use crate::scanner::ScanService;

/// Metric values for one sample. Every catalog key is present, `None` when
/// the measurement was unavailable.
pub fn sample_metrics(link: &LinkInfo, ping: Option<&PingStats>) -> BTreeMap<String, Option<f64>> {
    let mut metrics = BTreeMap::new();

    metrics.insert(RSSI_DBM.to_string(), link.rssi_dbm);
    metrics.insert(SNR_DB.to_string(), link.snr_db());
    metrics.insert(PING_AVG_MS.to_string(), ping.and_then(|p| p.avg_ms));
    metrics.insert(PING_JITTER_MS.to_string(), ping.and_then(|p| p.jitter_ms));
    metrics.insert(PING_LOSS_PCT.to_string(), ping.and_then(|p| p.loss_pct));

    metrics
}

/// Measures the link at the surveyor's current position
pub async fn measure_sample(scanner: &ScanService, config: &MeasureConfig, x: f64, y: f64) -> Sample {
    let link = scanner.link_info().await;

    let ping = if config.ping {
        match scanner.gateway().await {
            Some(gateway) => scanner.ping(gateway, config.ping_count).await,
            None => {
                log::debug!("No default gateway, skipping ping");
                None
            }
        }
    } else {
        None
    };

    Sample {
        id: now_ms(),
        x,
        y,
        metrics: sample_metrics(&link, ping.as_ref()),
        band: link.band,
        ssid: link.ssid,
        created_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wifimap_common::Band;

    use super::*;
    use crate::scanner::tests::FakeProvider;

    fn link() -> LinkInfo {
        LinkInfo {
            ssid: Some("Office".into()),
            band: Some(Band::Ghz5),
            channel: Some(36),
            rssi_dbm: Some(-58.0),
            noise_dbm: Some(-92.0),
            ..LinkInfo::default()
        }
    }

    #[test]
    fn test_metrics_without_ping() {
        let metrics = sample_metrics(&link(), None);

        assert_eq!(metrics.len(), 5);
        assert_eq!(metrics[RSSI_DBM], Some(-58.0));
        assert_eq!(metrics[SNR_DB], Some(34.0));
        assert_eq!(metrics[PING_AVG_MS], None);
    }

    #[tokio::test]
    async fn test_measure_with_ping() {
        let provider = FakeProvider {
            link: link(),
            gateway: Some("192.168.1.1".parse().expect("address")),
            ping: Some(PingStats {
                loss_pct: Some(0.0),
                avg_ms: Some(3.2),
                min_ms: Some(1.0),
                max_ms: Some(6.0),
                jitter_ms: Some(5.0),
            }),
            ..FakeProvider::default()
        };
        let scanner = ScanService::new(Arc::new(provider), 45_000);

        let sample = measure_sample(&scanner, &MeasureConfig::default(), 12.0, 34.0).await;

        assert_eq!((sample.x, sample.y), (12.0, 34.0));
        assert_eq!(sample.band, Some(Band::Ghz5));
        assert_eq!(sample.ssid.as_deref(), Some("Office"));
        assert_eq!(sample.metric(PING_AVG_MS), Some(3.2));
        assert_eq!(sample.metric(PING_JITTER_MS), Some(5.0));
        assert!(sample.created_at.is_some());
    }

    #[tokio::test]
    async fn test_measure_ping_disabled() {
        let provider = FakeProvider {
            link: link(),
            gateway: Some("192.168.1.1".parse().expect("address")),
            ..FakeProvider::default()
        };
        let scanner = ScanService::new(Arc::new(provider), 45_000);
        let config = MeasureConfig {
            ping: false,
            ping_count: 4,
        };

        let sample = measure_sample(&scanner, &config, 0.0, 0.0).await;

        assert_eq!(sample.metric(RSSI_DBM), Some(-58.0));
        assert_eq!(sample.metrics.get(PING_LOSS_PCT), Some(&None));
    }
}
