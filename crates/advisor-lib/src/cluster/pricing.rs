//! Cloud-mode price table and per-cluster hourly score

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Hourly price per worker, keyed by flavor name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable {
    prices: BTreeMap<String, f64>,
}

impl PriceTable {
    pub fn new(prices: BTreeMap<String, f64>) -> Self {
        Self { prices }
    }

    pub fn get(&self, flavor: &str) -> Option<f64> {
        self.prices.get(flavor).copied()
    }

    /// Price by raw name first, then by normalized name
    pub fn lookup(&self, raw: &str, normalized: &str) -> Option<f64> {
        self.get(raw).or_else(|| self.get(normalized))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.prices.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Score for one live cluster
///
/// `Unpriced` marks clusters whose flavor had no price, so their zero cost
/// is never reported as GREEN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClusterScore {
    Green,
    Amber,
    Red,
    Unpriced,
}

impl ClusterScore {
    pub const ALL: [ClusterScore; 4] = [
        ClusterScore::Green,
        ClusterScore::Amber,
        ClusterScore::Red,
        ClusterScore::Unpriced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterScore::Green => "GREEN",
            ClusterScore::Amber => "AMBER",
            ClusterScore::Red => "RED",
            ClusterScore::Unpriced => "UNPRICED",
        }
    }

    /// Hex fill colour used by reports
    pub fn color(&self) -> u32 {
        match self {
            ClusterScore::Green => 0x24A148,
            ClusterScore::Amber => 0xF1C21B,
            ClusterScore::Red => 0xFA4D56,
            ClusterScore::Unpriced => 0x8D8D8D,
        }
    }
}

impl fmt::Display for ClusterScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hourly bounds: GREEN up to `green`, AMBER up to `amber`, both inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyThresholds {
    pub green: f64,
    pub amber: f64,
}

impl HourlyThresholds {
    /// Zero or one zone share the single-zone tier; three or more share the top tier
    pub fn for_zone_count(zones: usize) -> Self {
        match zones {
            0 | 1 => Self {
                green: 1.0,
                amber: 2.0,
            },
            2 => Self {
                green: 2.0,
                amber: 4.0,
            },
            _ => Self {
                green: 3.0,
                amber: 6.0,
            },
        }
    }
}

/// Score a live cluster's total hourly cost
pub fn score_cluster_hourly(total_hourly: f64, zones: usize, priced: bool) -> ClusterScore {
    if !priced {
        return ClusterScore::Unpriced;
    }

    let thresholds = HourlyThresholds::for_zone_count(zones);
    if total_hourly <= thresholds.green {
        ClusterScore::Green
    } else if total_hourly <= thresholds.amber {
        ClusterScore::Amber
    } else {
        ClusterScore::Red
    }
}
