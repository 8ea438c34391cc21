use std::net::IpAddr;
use std::sync::Arc;

use tokio::sync::Mutex;
use wifimap_common::LinkInfo;
use wifimap_scan::{now_ms, CurrentTime, PingStats, ScanError, ScanProvider, ScanResult, ScanSnapshot, TimedMemo};

/// Shares one scan provider between requests and memoizes scans.
///
/// Provider calls block on external tools, so they run on the blocking pool.
/// The memo lock is held for the whole scan: concurrent callers wait for the
/// running scan and then get its result from the memo.
pub struct ScanService {
    provider: Arc<dyn ScanProvider>,
    memo: Mutex<TimedMemo<ScanResult>>,
}

async fn blocking<T, F>(provider: &Arc<dyn ScanProvider>, f: F) -> Result<T, ScanError>
where
    T: Send + 'static,
    F: FnOnce(&dyn ScanProvider) -> Result<T, ScanError> + Send + 'static,
{
    let provider = provider.clone();
    tokio::task::spawn_blocking(move || f(provider.as_ref()))
        .await
        .map_err(|e| ScanError::CommandFailed(format!("scan task failed: {}", e)))?
}

impl ScanService {
    pub fn new(provider: Arc<dyn ScanProvider>, cache_ttl_ms: CurrentTime) -> Self {
        Self {
            provider,
            memo: Mutex::new(TimedMemo::new(cache_ttl_ms)),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub async fn scan(&self, force: bool) -> ScanSnapshot {
        self.scan_at(now_ms(), force).await
    }

    /// Scans at most once per ttl unless `force` is set. A failed scan is
    /// reported as an empty result and is not memoized.
    pub async fn scan_at(&self, now: CurrentTime, force: bool) -> ScanSnapshot {
        let mut memo = self.memo.lock().await;

        if !force {
            if let Some(cached) = memo.get(now) {
                return ScanSnapshot {
                    result: cached.value.clone(),
                    cache_hit: true,
                };
            }
        }

        match blocking(&self.provider, move |p| p.scan(now)).await {
            Ok(result) => {
                log::debug!(
                    "Scan via {} found {} networks",
                    result.source,
                    result.networks.len()
                );
                let stored = memo.store(now, result);
                ScanSnapshot {
                    result: stored.value.clone(),
                    cache_hit: false,
                }
            }
            Err(err) => {
                log::warn!("Scan failed: {}", err);
                ScanSnapshot {
                    result: ScanResult::empty(now),
                    cache_hit: false,
                }
            }
        }
    }

    pub async fn link_info(&self) -> LinkInfo {
        match blocking(&self.provider, |p| p.link_info()).await {
            Ok(info) => info,
            Err(err) => {
                log::warn!("Link info unavailable: {}", err);
                LinkInfo::default()
            }
        }
    }

    pub async fn gateway(&self) -> Option<IpAddr> {
        match blocking(&self.provider, |p| p.gateway()).await {
            Ok(gateway) => gateway,
            Err(err) => {
                log::warn!("Gateway lookup failed: {}", err);
                None
            }
        }
    }

    pub async fn ping(&self, host: IpAddr, count: u32) -> Option<PingStats> {
        match blocking(&self.provider, move |p| p.ping(host, count)).await {
            Ok(stats) => Some(stats),
            Err(err) => {
                log::warn!("Ping to {} failed: {}", host, err);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use wifimap_common::{Band, ObservedNetwork};
    use wifimap_scan::ScanSource;

    use super::*;

    /// Provider with canned answers that counts scans
    #[derive(Default)]
    pub struct FakeProvider {
        pub scans: AtomicUsize,
        pub fail_scan: bool,
        pub link: LinkInfo,
        pub gateway: Option<IpAddr>,
        pub ping: Option<PingStats>,
    }

    impl ScanProvider for FakeProvider {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn scan(&self, now: CurrentTime) -> Result<ScanResult, ScanError> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            if self.fail_scan {
                return Err(ScanError::Timeout("scan".into()));
            }
            Ok(ScanResult {
                t: now,
                source: ScanSource::Iw,
                networks: vec![ObservedNetwork {
                    ssid: Some("Lab".into()),
                    band: Some(Band::Ghz2_4),
                    channel: Some(6),
                    rssi_dbm: Some(-50.0),
                    ..ObservedNetwork::default()
                }],
            })
        }

        fn link_info(&self) -> Result<LinkInfo, ScanError> {
            Ok(self.link.clone())
        }

        fn gateway(&self) -> Result<Option<IpAddr>, ScanError> {
            Ok(self.gateway)
        }

        fn ping(&self, _host: IpAddr, _count: u32) -> Result<PingStats, ScanError> {
            self.ping.ok_or(ScanError::NotSupported)
        }
    }

    #[tokio::test]
    async fn test_scan_is_memoized() {
        let provider = Arc::new(FakeProvider::default());
        let service = ScanService::new(provider.clone(), 45_000);

        let first = service.scan_at(1_000, false).await;
        let second = service.scan_at(30_000, false).await;
        let expired = service.scan_at(46_000, false).await;

        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(second.result.t, 1_000);
        assert!(!expired.cache_hit);
        assert_eq!(expired.result.t, 46_000);
        assert_eq!(provider.scans.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_force_bypasses_memo() {
        let provider = Arc::new(FakeProvider::default());
        let service = ScanService::new(provider.clone(), 45_000);

        service.scan_at(0, false).await;
        let forced = service.scan_at(10, true).await;

        assert!(!forced.cache_hit);
        assert_eq!(forced.result.t, 10);
        assert_eq!(provider.scans.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_scan_is_empty_and_not_cached() {
        let provider = Arc::new(FakeProvider {
            fail_scan: true,
            ..FakeProvider::default()
        });
        let service = ScanService::new(provider.clone(), 45_000);

        let first = service.scan_at(0, false).await;
        let second = service.scan_at(1, false).await;

        assert!(first.result.networks.is_empty());
        assert_eq!(first.result.source, ScanSource::Unavailable);
        assert!(!second.cache_hit);
        assert_eq!(provider.scans.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_ping_failure_is_none() {
        let service = ScanService::new(Arc::new(FakeProvider::default()), 45_000);

        assert_eq!(service.ping("10.0.0.1".parse().expect("address"), 4).await, None);
        assert_eq!(service.gateway().await, None);
    }
}
