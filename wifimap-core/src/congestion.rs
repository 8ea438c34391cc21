use std::collections::BTreeMap;

use wifimap_common::network::Channel;
use wifimap_common::{Band, BandReport, CongestionReport, ObservedNetwork, Recommendation};

pub const RSSI_FLOOR_DBM: f64 = -90.0;
pub const RSSI_CEILING_DBM: f64 = -30.0;
pub const WEIGHT_EXPONENT: f64 = 1.8;

/// Stand-in for networks reported without a usable RSSI
pub const DEFAULT_RSSI_DBM: f64 = -80.0;

pub const MIN_CHANNEL: i64 = 1;
pub const MAX_CHANNEL: i64 = 165;

/// Non-overlapping 2.4 GHz channels
pub const PREFERRED_24: [Channel; 3] = [1, 6, 11];

/// 5 GHz candidates used when nothing was observed on the band
pub const FALLBACK_5: [Channel; 4] = [36, 40, 44, 48];

/// Highest 5 GHz score that still allows an 80 MHz recommendation
pub const WIDE_WIDTH_MAX_SCORE: f64 = 2.0;

// (channel distance, share of the network weight)
const OVERLAP_24: [(i64, f64); 2] = [(1, 0.6), (2, 0.3)];

const MISSING_RSSI_NOTE: &str = " RSSI missing for some networks; using low default weight.";

/// Maps RSSI onto a congestion weight in [0, 1].
///
/// The value is clamped to [-90, -30] dBm, rescaled linearly and raised to
/// [`WEIGHT_EXPONENT`] so strong neighbours dominate weak ones.
pub fn rssi_weight(rssi_dbm: f64) -> f64 {
    let normalized =
        (rssi_dbm.clamp(RSSI_FLOOR_DBM, RSSI_CEILING_DBM) - RSSI_FLOOR_DBM) / (RSSI_CEILING_DBM - RSSI_FLOOR_DBM);
    normalized.powf(WEIGHT_EXPONENT)
}

/// Weight of a network and whether its RSSI had to be defaulted
pub fn network_weight(rssi_dbm: Option<f64>) -> (f64, bool) {
    match rssi_dbm.filter(|rssi| rssi.is_finite()) {
        Some(rssi) => (rssi_weight(rssi), false),
        None => (rssi_weight(DEFAULT_RSSI_DBM), true),
    }
}

/// Accumulated interference weight per channel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelScores {
    scores: BTreeMap<Channel, f64>,
}

impl ChannelScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to `channel`. Channels outside [1, 165] are dropped.
    pub fn add(&mut self, channel: i64, value: f64) {
        if !(MIN_CHANNEL..=MAX_CHANNEL).contains(&channel) {
            return;
        }

        *self.scores.entry(channel as Channel).or_insert(0.0) += value;
    }

    pub fn get(&self, channel: Channel) -> f64 {
        self.scores.get(&channel).copied().unwrap_or(0.0)
    }

    pub fn max(&self) -> f64 {
        self.scores.values().copied().fold(0.0, f64::max)
    }

    /// Scored channels in ascending order
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.scores.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<Channel, f64> {
        self.scores
    }
}

#[derive(Debug, Default)]
struct BandScores {
    scores: ChannelScores,
    missing: usize,
}

fn score_band_24(networks: &[ObservedNetwork]) -> BandScores {
    let mut band = BandScores::default();

    for network in networks.iter().filter(|n| n.band == Some(Band::Ghz2_4)) {
        let Some(channel) = network.valid_channel() else {
            continue;
        };

        let (weight, defaulted) = network_weight(network.rssi_dbm);
        if defaulted {
            band.missing += 1;
        }

        let channel = channel as i64;
        band.scores.add(channel, weight);
        for (offset, share) in OVERLAP_24 {
            band.scores.add(channel - offset, weight * share);
            band.scores.add(channel + offset, weight * share);
        }
    }

    band
}

fn score_band_5(networks: &[ObservedNetwork]) -> BandScores {
    let mut band = BandScores::default();

    for network in networks.iter().filter(|n| n.band == Some(Band::Ghz5)) {
        let Some(channel) = network.valid_channel() else {
            continue;
        };

        let (weight, defaulted) = network_weight(network.rssi_dbm);
        if defaulted {
            band.missing += 1;
        }

        band.scores.add(channel as i64, weight);
    }

    band
}

/// Lowest scoring candidate; the first one wins a tie
pub fn lowest_channel(
    scores: &ChannelScores,
    candidates: impl IntoIterator<Item = Channel>,
) -> Option<(Channel, f64)> {
    let mut best: Option<(Channel, f64)> = None;
    for channel in candidates {
        let score = scores.get(channel);
        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some((channel, score)),
        }
    }
    best
}

/// 5 GHz width for the highest observed channel score
pub fn recommend_width_5(max_score: f64) -> u32 {
    if max_score > WIDE_WIDTH_MAX_SCORE {
        40
    } else {
        80
    }
}

fn missing_note(missing: usize) -> &'static str {
    if missing > 0 {
        MISSING_RSSI_NOTE
    } else {
        ""
    }
}

fn report_band_24(band: BandScores) -> BandReport {
    let (channel, score) =
        lowest_channel(&band.scores, PREFERRED_24).unwrap_or((PREFERRED_24[0], 0.0));

    log::trace!("Congestion: 2.4 GHz recommends channel {} (score {:.2})", channel, score);

    BandReport {
        recommended: Recommendation {
            channel,
            width_mhz: 20,
            reason: format!(
                "Lowest congestion among 1/6/11 (score {:.2}).{}",
                score,
                missing_note(band.missing)
            ),
            score,
        },
        missing_rssi: band.missing,
        scores_by_channel: band.scores.into_map(),
    }
}

fn report_band_5(band: BandScores) -> BandReport {
    let best = if band.scores.is_empty() {
        lowest_channel(&band.scores, FALLBACK_5)
    } else {
        lowest_channel(&band.scores, band.scores.channels())
    };
    let (channel, score) = best.unwrap_or((FALLBACK_5[0], 0.0));

    let max_score = band.scores.max();
    let width_mhz = recommend_width_5(max_score);
    let reason = if width_mhz == 80 {
        "Low congestion detected; 80 MHz should be fine."
    } else {
        "Higher congestion detected; 40 MHz should be more stable."
    };

    log::trace!(
        "Congestion: 5 GHz recommends channel {} at {} MHz (score {:.2}, max {:.2})",
        channel,
        width_mhz,
        score,
        max_score
    );

    BandReport {
        recommended: Recommendation {
            channel,
            width_mhz,
            reason: format!("{}{}", reason, missing_note(band.missing)),
            score,
        },
        missing_rssi: band.missing,
        scores_by_channel: band.scores.into_map(),
    }
}

/// Scores every 2.4 and 5 GHz channel and recommends the least congested one
/// per band. Networks on other bands or without a channel don't contribute.
pub fn compute_congestion(networks: &[ObservedNetwork]) -> CongestionReport {
    let report = CongestionReport {
        band24: report_band_24(score_band_24(networks)),
        band5: report_band_5(score_band_5(networks)),
    };

    log::debug!(
        "Congestion: scored {} networks -> 2.4 GHz ch {}, 5 GHz ch {} @ {} MHz",
        networks.len(),
        report.band24.recommended.channel,
        report.band5.recommended.channel,
        report.band5.recommended.width_mhz
    );

    report
}
