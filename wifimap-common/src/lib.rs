pub mod metric;
pub mod network;
pub mod report;
pub mod sample;

pub use metric::MetricConfig;
pub use network::{Band, LinkInfo, ObservedNetwork};
pub use report::{BandReport, CongestionReport, Recommendation};
pub use sample::{Point, Sample};
