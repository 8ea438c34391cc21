//! Mapping between the typed records and the protobuf messages. Incoming
//! values are checked here so the rest of the daemon only sees valid input.

use tonic::Status;
use wifimap_common::{Band, BandReport, LinkInfo, MetricConfig, ObservedNetwork, Sample};
use wifimap_core::{BandFilter, HeatField};
use wifimap_scan::ScanSnapshot;

use crate::store::{Floorplan, Project, StoreError};

use super::wifimap;

pub fn band_str(band: Option<Band>) -> String {
    band.map(|b| b.as_str().to_string()).unwrap_or_default()
}

/// Empty or unrecognised band strings are treated as "no band"
pub fn parse_band(text: &str) -> Option<Band> {
    if text.trim().is_empty() {
        return None;
    }
    text.parse().ok()
}

pub fn band_filter(text: &str) -> BandFilter {
    parse_band(text).map(BandFilter::Only).unwrap_or(BandFilter::All)
}

pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

pub fn position(x: f64, y: f64) -> Result<(f64, f64), Status> {
    if !x.is_finite() || !y.is_finite() {
        return Err(Status::invalid_argument("x and y are required numbers"));
    }
    Ok((x, y))
}

pub fn meta(link: &LinkInfo, mode: &str, platform: &str) -> wifimap::MetaResponse {
    wifimap::MetaResponse {
        ssid: link.ssid.clone(),
        bssid: link.bssid.clone(),
        band: band_str(link.band),
        channel: link.channel,
        channel_width_mhz: link.channel_width_mhz,
        rssi_dbm: finite(link.rssi_dbm),
        noise_dbm: finite(link.noise_dbm),
        mode: mode.to_string(),
        platform: platform.to_string(),
    }
}

pub fn network(network: &ObservedNetwork) -> wifimap::Network {
    wifimap::Network {
        ssid: network.ssid.clone(),
        bssid: network.bssid.clone(),
        band: band_str(network.band),
        channel: network.channel,
        channel_width_mhz: network.channel_width_mhz,
        rssi_dbm: network.rssi(),
    }
}

pub fn scan(snapshot: &ScanSnapshot) -> wifimap::ScanResponse {
    wifimap::ScanResponse {
        t: snapshot.result.t,
        source: snapshot.result.source.to_string(),
        cache_hit: snapshot.cache_hit,
        networks: snapshot.result.networks.iter().map(network).collect(),
    }
}

pub fn band_report(report: &BandReport) -> wifimap::BandReport {
    wifimap::BandReport {
        scores: report
            .scores_by_channel
            .iter()
            .map(|(channel, score)| wifimap::ChannelScore {
                channel: *channel,
                score: *score,
            })
            .collect(),
        recommended: Some(wifimap::Recommendation {
            channel: report.recommended.channel,
            width_mhz: report.recommended.width_mhz,
            reason: report.recommended.reason.clone(),
            score: report.recommended.score,
        }),
        missing_rssi: report.missing_rssi as u32,
    }
}

pub fn metric(metric: &MetricConfig) -> wifimap::Metric {
    wifimap::Metric {
        key: metric.key.clone(),
        label: metric.label.clone(),
        good: metric.good,
        bad: metric.bad,
    }
}

pub fn project(project: &Project) -> wifimap::Project {
    wifimap::Project {
        id: project.id.clone(),
        name: project.name.clone(),
        sample_count: project.samples.len() as u32,
        has_floorplan: project.floorplan.is_some(),
    }
}

pub fn floorplan(floorplan: &Floorplan) -> wifimap::Floorplan {
    wifimap::Floorplan {
        image: floorplan.image.clone(),
        content_type: floorplan.content_type.clone(),
        width: floorplan.width,
        height: floorplan.height,
    }
}

pub fn floorplan_record(floorplan: wifimap::Floorplan) -> Floorplan {
    let content_type = if floorplan.content_type.trim().is_empty() {
        "application/octet-stream".to_string()
    } else {
        floorplan.content_type
    };

    Floorplan {
        content_type,
        width: floorplan.width,
        height: floorplan.height,
        image: floorplan.image,
    }
}

pub fn sample(sample: &Sample) -> wifimap::Sample {
    wifimap::Sample {
        id: sample.id,
        x: sample.x,
        y: sample.y,
        metrics: sample
            .metrics
            .iter()
            .map(|(key, value)| wifimap::MetricValue {
                key: key.clone(),
                value: finite(*value),
            })
            .collect(),
        band: band_str(sample.band),
        ssid: sample.ssid.clone(),
        created_at: sample.created_at.clone().unwrap_or_default(),
    }
}

pub fn heatmap(field: &HeatField, metric_config: &MetricConfig) -> wifimap::HeatmapResponse {
    wifimap::HeatmapResponse {
        step: field.step,
        cells: field
            .cells
            .iter()
            .map(|cell| wifimap::HeatCell {
                x: cell.x,
                y: cell.y,
                value: cell.value,
                intensity: cell.intensity,
            })
            .collect(),
        range_min: field.range.map(|r| r.min),
        range_max: field.range.map(|r| r.max),
        metric: Some(metric(metric_config)),
    }
}

pub fn store_status(err: StoreError) -> Status {
    match err {
        StoreError::UnknownProject(_) => Status::not_found(err.to_string()),
        StoreError::InvalidName(_) | StoreError::InvalidFloorplan(_) => {
            Status::invalid_argument(err.to_string())
        }
        StoreError::Io(_) | StoreError::Serialization(_) => Status::internal(err.to_string()),
    }
}
