use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::network::Channel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub channel: Channel,
    pub width_mhz: u32,
    pub reason: String,
    /// Accumulated score of the recommended channel
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandReport {
    #[serde(rename = "scoresByChannel")]
    pub scores_by_channel: BTreeMap<Channel, f64>,
    pub recommended: Recommendation,
    /// Networks whose RSSI was replaced by the default weight
    pub missing_rssi: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongestionReport {
    pub band24: BandReport,
    pub band5: BandReport,
}
