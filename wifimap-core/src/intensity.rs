use wifimap_common::{MetricConfig, Sample};

pub const CONTRAST_STANDARD: f64 = 1.5;
pub const CONTRAST_HIGH: f64 = 2.0;

/// Observed spread of one metric over the current sample set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

/// Which values anchor intensities 0.0 and 1.0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    /// The metric's own `good`/`bad` thresholds
    #[default]
    Fixed,
    /// Min/max of the samples being drawn
    Auto,
}

/// Exponent applied after the linear mapping. Values above 1 push mid-range
/// intensities towards the ends.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Contrast {
    #[default]
    Standard,
    High,
    Custom(f64),
}

impl Contrast {
    pub fn from_high(high: bool) -> Self {
        if high {
            Contrast::High
        } else {
            Contrast::Standard
        }
    }

    pub fn exponent(&self) -> f64 {
        match self {
            Contrast::Standard => CONTRAST_STANDARD,
            Contrast::High => CONTRAST_HIGH,
            Contrast::Custom(exponent) if exponent.is_finite() && *exponent > 0.0 => *exponent,
            Contrast::Custom(_) => CONTRAST_STANDARD,
        }
    }
}

/// Min and max of `key` over the samples that carry it
pub fn metric_range(samples: &[Sample], key: &str) -> Option<MetricRange> {
    samples
        .iter()
        .filter_map(|sample| sample.metric(key))
        .fold(None, |range, value| match range {
            None => Some(MetricRange {
                min: value,
                max: value,
            }),
            Some(MetricRange { min, max }) => Some(MetricRange {
                min: min.min(value),
                max: max.max(value),
            }),
        })
}

/// Maps `value` onto [0, 1] where 1 is good.
///
/// Without a `range` the metric thresholds are the anchors. With a range the
/// observed max maps to 1 and the observed min to 0 for every metric.
///
/// Returns `None` for a degenerate scale (equal or non-finite anchors) or a
/// non-finite value.
pub fn normalize_intensity(
    value: f64,
    metric: &MetricConfig,
    range: Option<MetricRange>,
    contrast: Contrast,
) -> Option<f64> {
    let (good, bad) = match range {
        Some(range) => (range.max, range.min),
        None => (metric.good, metric.bad),
    };

    if !value.is_finite() || !good.is_finite() || !bad.is_finite() || good == bad {
        return None;
    }

    // Same formula for both directions: the sign of (good - bad) flips it
    let t = (value - bad) / (good - bad);

    Some(t.clamp(0.0, 1.0).powf(contrast.exponent()))
}
