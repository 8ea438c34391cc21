use wifimap_common::{Point, Sample};

pub const DEFAULT_IDW_POWER: f64 = 2.0;

/// Samples further away than this (floor-plan pixels) don't contribute
pub const DEFAULT_CUTOFF_RADIUS: f64 = 220.0;

pub const DEFAULT_MIN_DISTANCE: f64 = 1.0;

/// Pick radius for [`nearest_sample`] lookups from a pointer position
pub const DEFAULT_PICK_RADIUS: f64 = 10.0;

/// Inverse-distance weighting parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdwParams {
    pub power: f64,
    pub cutoff_radius: f64,
    /// Distances are floored to this value so a query on top of a sample
    /// doesn't produce an infinite weight
    pub min_distance: f64,
}

impl Default for IdwParams {
    fn default() -> Self {
        Self {
            power: DEFAULT_IDW_POWER,
            cutoff_radius: DEFAULT_CUTOFF_RADIUS,
            min_distance: DEFAULT_MIN_DISTANCE,
        }
    }
}

impl IdwParams {
    pub fn with_cutoff_radius(mut self, radius: f64) -> Self {
        self.cutoff_radius = radius;
        self
    }

    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    /// Weighted average of `metric` over the samples within the cutoff radius
    /// of `query`. Returns `None` when no sample in range carries a value.
    pub fn estimate(&self, query: Point, samples: &[Sample], metric: &str) -> Option<f64> {
        if !query.is_finite() {
            return None;
        }

        let cutoff_sq = self.cutoff_radius * self.cutoff_radius;
        let mut weight_sum = 0.0;
        let mut value_sum = 0.0;

        for sample in samples {
            let position = sample.position();
            if !position.is_finite() {
                continue;
            }

            let distance_sq = query.distance_sq(&position);
            if distance_sq > cutoff_sq {
                continue;
            }

            let Some(value) = sample.metric(metric) else {
                continue;
            };

            let distance = distance_sq.sqrt().max(self.min_distance);
            let weight = 1.0 / distance.powf(self.power);

            weight_sum += weight;
            value_sum += weight * value;
        }

        if weight_sum > 0.0 && weight_sum.is_finite() {
            Some(value_sum / weight_sum)
        } else {
            None
        }
    }
}

/// IDW estimate with the default parameters
pub fn estimate_value_at(query: Point, samples: &[Sample], metric: &str) -> Option<f64> {
    IdwParams::default().estimate(query, samples, metric)
}

/// Closest sample to `query`, if one lies within `max_distance`
pub fn nearest_sample<'a>(query: Point, samples: &'a [Sample], max_distance: f64) -> Option<&'a Sample> {
    let mut closest: Option<(&Sample, f64)> = None;

    for sample in samples {
        let position = sample.position();
        if !position.is_finite() {
            continue;
        }

        let distance_sq = query.distance_sq(&position);
        match closest {
            Some((_, best)) if distance_sq >= best => {}
            _ => closest = Some((sample, distance_sq)),
        }
    }

    closest
        .filter(|(_, distance_sq)| *distance_sq <= max_distance * max_distance)
        .map(|(sample, _)| sample)
}
