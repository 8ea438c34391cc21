use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::network::Band;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// One measurement taken at a position on the floor plan
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub metrics: BTreeMap<String, Option<f64>>,
    #[serde(default)]
    pub band: Option<Band>,
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Sample {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    pub fn with_metric(mut self, key: &str, value: f64) -> Self {
        self.metrics.insert(key.to_string(), Some(value));
        self
    }

    pub fn with_band(mut self, band: Band) -> Self {
        self.band = Some(band);
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Numeric value of `key`, `None` when missing, null or not finite
    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics
            .get(key)
            .copied()
            .flatten()
            .filter(|value| value.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_lookup() {
        let mut sample = Sample::at(10.0, 20.0).with_metric("rssi_dbm", -61.0);
        sample.metrics.insert("snr_db".into(), None);
        sample.metrics.insert("ping_avg_ms".into(), Some(f64::NAN));

        assert_eq!(sample.metric("rssi_dbm"), Some(-61.0));
        assert_eq!(sample.metric("snr_db"), None);
        assert_eq!(sample.metric("ping_avg_ms"), None);
        assert_eq!(sample.metric("ping_loss_pct"), None);
    }

    #[test]
    fn test_sample_json_shape() {
        let json = r#"{"id":7,"x":12.5,"y":40,"metrics":{"rssi_dbm":-55,"snr_db":null},"band":"5","ssid":"Office"}"#;
        let sample: Sample = serde_json::from_str(json).expect("parsed sample");

        assert_eq!(sample.id, 7);
        assert_eq!(sample.band, Some(Band::Ghz5));
        assert_eq!(sample.metric("rssi_dbm"), Some(-55.0));
        assert_eq!(sample.metric("snr_db"), None);
        assert_eq!(sample.created_at, None);
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_sq(&b), 25.0);
    }
}
