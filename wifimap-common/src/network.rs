use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

pub type Channel = u32;

/// Wi-Fi frequency band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "2.4")]
    Ghz2_4,
    #[serde(rename = "5")]
    Ghz5,
    #[serde(rename = "6")]
    Ghz6,
}

impl Band {
    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Ghz2_4 => "2.4",
            Band::Ghz5 => "5",
            Band::Ghz6 => "6",
        }
    }

    /// Channels 1..=14 live in 2.4 GHz, everything above is treated as 5 GHz.
    /// Channel numbers alone can't tell 6 GHz apart.
    pub fn from_channel(channel: Channel) -> Option<Self> {
        match channel {
            0 => None,
            1..=14 => Some(Band::Ghz2_4),
            _ => Some(Band::Ghz5),
        }
    }

    pub fn from_frequency_mhz(freq: u32) -> Option<Self> {
        match freq {
            2400..=2500 => Some(Band::Ghz2_4),
            4900..=5900 => Some(Band::Ghz5),
            5925..=7125 => Some(Band::Ghz6),
            _ => None,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownBand;

impl fmt::Display for UnknownBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown band")
    }
}

impl std::error::Error for UnknownBand {}

impl FromStr for Band {
    type Err = UnknownBand;

    /// Accepts the wire names ("2.4", "5", "6") as well as the tokens OS tools
    /// print ("2g", "5GHz", "2.4 GHz").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        let token = token.trim_end_matches("hz").trim_end_matches('g').trim();
        match token {
            "2" | "2.4" => Ok(Band::Ghz2_4),
            "5" => Ok(Band::Ghz5),
            "6" => Ok(Band::Ghz6),
            _ => Err(UnknownBand),
        }
    }
}

/// A network seen by a scan, already normalized by the scan provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservedNetwork {
    pub ssid: Option<String>,
    pub bssid: Option<String>,
    pub band: Option<Band>,
    pub channel: Option<Channel>,
    pub channel_width_mhz: Option<u32>,
    pub rssi_dbm: Option<f64>,
}

impl ObservedNetwork {
    /// RSSI as a usable number. NaN and infinities count as absent.
    pub fn rssi(&self) -> Option<f64> {
        self.rssi_dbm.filter(|rssi| rssi.is_finite())
    }

    /// Channel as a usable number. Channel 0 counts as absent.
    pub fn valid_channel(&self) -> Option<Channel> {
        self.channel.filter(|channel| *channel != 0)
    }
}

/// Current association of the local interface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkInfo {
    pub ssid: Option<String>,
    pub bssid: Option<String>,
    pub band: Option<Band>,
    pub channel: Option<Channel>,
    pub channel_width_mhz: Option<u32>,
    pub rssi_dbm: Option<f64>,
    pub noise_dbm: Option<f64>,
}

impl LinkInfo {
    pub fn snr_db(&self) -> Option<f64> {
        match (self.rssi_dbm, self.noise_dbm) {
            (Some(rssi), Some(noise)) if rssi.is_finite() && noise.is_finite() => {
                Some(rssi - noise)
            }
            _ => None,
        }
    }
}
