use wifimap_common::{Band, MetricConfig, Point, Sample};

use crate::intensity::{metric_range, normalize_intensity, Contrast, MetricRange, ScaleMode};
use crate::interpolate::IdwParams;

pub const DEFAULT_GRID_STEP: f64 = 24.0;

/// Which samples take part in a render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandFilter {
    #[default]
    All,
    Only(Band),
}

impl BandFilter {
    pub fn accepts(&self, sample: &Sample) -> bool {
        match self {
            BandFilter::All => true,
            BandFilter::Only(band) => sample.band == Some(*band),
        }
    }
}

pub fn filter_samples(samples: &[Sample], filter: BandFilter) -> Vec<Sample> {
    samples
        .iter()
        .filter(|sample| filter.accepts(sample))
        .cloned()
        .collect()
}

/// Area covered by the grid, starting at the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatFieldOptions {
    pub grid_step: f64,
    pub idw: IdwParams,
    pub scale: ScaleMode,
    pub contrast: Contrast,
    pub band: BandFilter,
}

impl Default for HeatFieldOptions {
    fn default() -> Self {
        Self {
            grid_step: DEFAULT_GRID_STEP,
            idw: IdwParams::default(),
            scale: ScaleMode::Fixed,
            contrast: Contrast::Standard,
            band: BandFilter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatCell {
    pub x: f64,
    pub y: f64,
    pub value: f64,
    pub intensity: f64,
}

/// Renderable grid of estimated intensities. Cells with nothing to draw are
/// left out.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatField {
    pub step: f64,
    pub cells: Vec<HeatCell>,
    /// Anchors used in auto scale mode
    pub range: Option<MetricRange>,
}

impl HeatField {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Evaluates the interpolator and normalizer on a regular grid over `surface`.
///
/// The field is rebuilt from scratch on every call.
pub fn build_heat_field(
    surface: Surface,
    samples: &[Sample],
    metric: &MetricConfig,
    options: &HeatFieldOptions,
) -> HeatField {
    let step = options.grid_step;
    let mut field = HeatField {
        step,
        ..Default::default()
    };

    if !surface.is_valid() || !step.is_finite() || step <= 0.0 {
        log::debug!(
            "Heat field: invalid surface {}x{} or step {}",
            surface.width,
            surface.height,
            step
        );
        return field;
    }

    let points: Vec<Sample> = samples
        .iter()
        .filter(|sample| {
            options.band.accepts(sample)
                && sample.position().is_finite()
                && sample.metric(&metric.key).is_some()
        })
        .cloned()
        .collect();

    if points.is_empty() {
        return field;
    }

    if options.scale == ScaleMode::Auto {
        field.range = metric_range(&points, &metric.key);
    }

    let columns = (surface.width / step).floor() as usize;
    let rows = (surface.height / step).floor() as usize;

    for row in 0..=rows {
        let y = row as f64 * step;
        for column in 0..=columns {
            let x = column as f64 * step;

            let Some(value) = options.idw.estimate(Point::new(x, y), &points, &metric.key) else {
                continue;
            };

            let intensity = match normalize_intensity(value, metric, field.range, options.contrast) {
                Some(intensity) if intensity > 0.0 => intensity,
                _ => continue,
            };

            field.cells.push(HeatCell {
                x,
                y,
                value,
                intensity,
            });
        }
    }

    log::trace!(
        "Heat field: {} cells from {} samples for {}",
        field.cells.len(),
        points.len(),
        metric.key
    );

    field
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rssi() -> MetricConfig {
        MetricConfig::new("rssi_dbm", "RSSI (dBm)", -50.0, -80.0)
    }

    #[test]
    fn test_empty_samples_give_empty_field() {
        let field = build_heat_field(Surface::new(480.0, 320.0), &[], &rssi(), &HeatFieldOptions::default());

        assert!(field.is_empty());
        assert_eq!(field.step, DEFAULT_GRID_STEP);
    }

    #[test]
    fn test_invalid_step_or_surface() {
        let samples = [Sample::at(10.0, 10.0).with_metric("rssi_dbm", -55.0)];
        let options = HeatFieldOptions {
            grid_step: 0.0,
            ..Default::default()
        };

        assert!(build_heat_field(Surface::new(100.0, 100.0), &samples, &rssi(), &options).is_empty());
        assert!(build_heat_field(
            Surface::new(f64::NAN, 100.0),
            &samples,
            &rssi(),
            &HeatFieldOptions::default()
        )
        .is_empty());
    }

    #[test]
    fn test_grid_covers_surface_inclusive() {
        let samples = [Sample::at(24.0, 24.0).with_metric("rssi_dbm", -50.0)];

        let field = build_heat_field(Surface::new(48.0, 48.0), &samples, &rssi(), &HeatFieldOptions::default());

        // 3x3 grid, all within the cutoff of the single sample
        assert_eq!(field.cells.len(), 9);
        assert!(field.cells.iter().all(|cell| cell.intensity > 0.999));
        assert!(field.cells.iter().any(|cell| cell.x == 48.0 && cell.y == 48.0));
    }

    #[test]
    fn test_skips_cells_out_of_reach_and_at_zero() {
        let samples = [
            Sample::at(0.0, 0.0).with_metric("rssi_dbm", -45.0),
            Sample::at(960.0, 0.0).with_metric("rssi_dbm", -90.0),
        ];

        let field = build_heat_field(Surface::new(960.0, 0.0), &samples, &rssi(), &HeatFieldOptions::default());

        assert!(!field.is_empty());
        // Cells around the weak sample normalize to zero and cells in the
        // middle are out of reach of both samples
        assert!(field.cells.iter().all(|cell| cell.x <= 220.0));
        assert!(field.cells.iter().all(|cell| cell.intensity > 0.0));
    }

    #[test]
    fn test_band_filter() {
        let samples = [
            Sample::at(0.0, 0.0).with_metric("rssi_dbm", -55.0).with_band(Band::Ghz5),
            Sample::at(0.0, 0.0).with_metric("rssi_dbm", -60.0).with_band(Band::Ghz2_4),
        ];
        let options = HeatFieldOptions {
            band: BandFilter::Only(Band::Ghz2_4),
            ..Default::default()
        };

        let field = build_heat_field(Surface::new(0.0, 0.0), &samples, &rssi(), &options);

        assert_eq!(field.cells.len(), 1);
        assert!((field.cells[0].value + 60.0).abs() < 1e-9);
        assert_eq!(filter_samples(&samples, BandFilter::Only(Band::Ghz5)).len(), 1);
        assert_eq!(filter_samples(&samples, BandFilter::All).len(), 2);
    }

    #[test]
    fn test_auto_scale_is_relative_to_samples() {
        let samples = [
            Sample::at(0.0, 0.0).with_metric("rssi_dbm", -70.0),
            Sample::at(48.0, 0.0).with_metric("rssi_dbm", -68.0),
        ];
        let fixed = build_heat_field(Surface::new(48.0, 0.0), &samples, &rssi(), &HeatFieldOptions::default());
        let auto = build_heat_field(
            Surface::new(48.0, 0.0),
            &samples,
            &rssi(),
            &HeatFieldOptions {
                scale: ScaleMode::Auto,
                ..Default::default()
            },
        );

        assert_eq!(auto.range, Some(MetricRange { min: -70.0, max: -68.0 }));
        assert_eq!(fixed.range, None);

        let fixed_max = fixed.cells.iter().map(|c| c.intensity).fold(0.0, f64::max);
        let auto_max = auto.cells.iter().map(|c| c.intensity).fold(0.0, f64::max);
        assert!(fixed_max < 0.3);
        assert!(auto_max > 0.99);
    }

    #[test]
    fn test_unplaced_samples_do_not_stretch_range() {
        let samples = [
            Sample::at(0.0, 0.0).with_metric("rssi_dbm", -70.0),
            Sample::at(48.0, 0.0).with_metric("rssi_dbm", -68.0),
            Sample::at(f64::NAN, 0.0).with_metric("rssi_dbm", -40.0),
            Sample::at(24.0, f64::INFINITY).with_metric("rssi_dbm", -95.0),
        ];
        let options = HeatFieldOptions {
            scale: ScaleMode::Auto,
            ..Default::default()
        };

        let field = build_heat_field(Surface::new(48.0, 0.0), &samples, &rssi(), &options);

        assert_eq!(field.range, Some(MetricRange { min: -70.0, max: -68.0 }));
        assert!(field.cells.iter().all(|c| c.value >= -70.0 && c.value <= -68.0));
    }
}
