//! Signal estimation and channel scoring.
//!
//! Everything in here is a pure function over the input collections: no I/O,
//! no shared state, and no errors. Sparse or dirty input produces empty maps
//! and `None` values instead.

pub mod congestion;
pub mod heatfield;
pub mod intensity;
pub mod interpolate;
pub mod metrics;

pub use congestion::{compute_congestion, rssi_weight, ChannelScores};
pub use heatfield::{build_heat_field, filter_samples, BandFilter, HeatCell, HeatField, HeatFieldOptions, Surface};
pub use intensity::{metric_range, normalize_intensity, Contrast, MetricRange, ScaleMode};
pub use interpolate::{estimate_value_at, nearest_sample, IdwParams};
pub use metrics::{default_catalog, find_metric, format_metric_value};
