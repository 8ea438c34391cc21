use serde::{Deserialize, Serialize};

/// Display scale for one metric.
///
/// `good` maps to intensity 1.0 and `bad` to 0.0. Either may be the larger
/// number: RSSI is better when higher, latency is better when lower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    pub key: String,
    pub label: String,
    pub good: f64,
    pub bad: f64,
}

impl MetricConfig {
    pub fn new(key: &str, label: &str, good: f64, bad: f64) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            good,
            bad,
        }
    }

    pub fn higher_is_better(&self) -> bool {
        self.good > self.bad
    }
}
