use crate::models::{Severity, ZoneCount};
use serde::{Deserialize, Serialize};

/// Traffic-light classification of projected monthly spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScoreLevel {
    Green,
    Amber,
    Red,
}

impl ScoreLevel {
    pub const ALL: [ScoreLevel; 3] = [ScoreLevel::Green, ScoreLevel::Amber, ScoreLevel::Red];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreLevel::Green => "GREEN",
            ScoreLevel::Amber => "AMBER",
            ScoreLevel::Red => "RED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreLevel::Green => "Optimal Cost",
            ScoreLevel::Amber => "Moderate Cost",
            ScoreLevel::Red => "High Cost",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ScoreLevel::Green => "Cost is within optimal range",
            ScoreLevel::Amber => "Cost is moderate - review for optimization opportunities",
            ScoreLevel::Red => "Cost is high - optimization recommended",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ScoreLevel::Green => Severity::Low,
            ScoreLevel::Amber => Severity::Medium,
            ScoreLevel::Red => Severity::High,
        }
    }

    /// Hex colour without the leading `#`
    pub fn color(&self) -> &'static str {
        match self {
            ScoreLevel::Green => "24A148",
            ScoreLevel::Amber => "F1C21B",
            ScoreLevel::Red => "FA4D56",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ScoreLevel::Green => "🟢",
            ScoreLevel::Amber => "🟡",
            ScoreLevel::Red => "🔴",
        }
    }
}

impl std::str::FromStr for ScoreLevel {
    type Err = crate::error::AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GREEN" => Ok(ScoreLevel::Green),
            "AMBER" => Ok(ScoreLevel::Amber),
            "RED" => Ok(ScoreLevel::Red),
            _ => Err(crate::error::AdvisorError::UnknownScoreLevel(s.to_string())),
        }
    }
}

/// Monthly bounds: GREEN below `green`, AMBER up to and including `amber`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreThresholds {
    pub green: f64,
    pub amber: f64,
}

impl ScoreThresholds {
    pub fn for_zones(zones: ZoneCount) -> Self {
        match zones {
            ZoneCount::One => Self {
                green: 2000.0,
                amber: 5000.0,
            },
            ZoneCount::Two => Self {
                green: 4000.0,
                amber: 10000.0,
            },
            ZoneCount::Three => Self {
                green: 6000.0,
                amber: 15000.0,
            },
        }
    }
}

/// Classification of a scenario's monthly cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostScore {
    pub level: ScoreLevel,
    pub label: String,
    pub severity: Severity,
    pub message: String,
    pub thresholds: ScoreThresholds,
    pub monthly_cost: f64,
}

/// Score a monthly cost against the zone-scaled thresholds
pub fn score_cost(monthly_cost: f64, zones: ZoneCount) -> CostScore {
    let thresholds = ScoreThresholds::for_zones(zones);

    let level = if monthly_cost < thresholds.green {
        ScoreLevel::Green
    } else if monthly_cost <= thresholds.amber {
        ScoreLevel::Amber
    } else {
        ScoreLevel::Red
    };

    CostScore {
        level,
        label: level.label().to_string(),
        severity: level.severity(),
        message: level.message().to_string(),
        thresholds,
        monthly_cost,
    }
}
