//! Core data models for the sizing advisor

use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named minimum-resource profile for a bundle of application components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineProfile {
    pub id: String,
    pub name: String,
    pub components: Vec<String>,
    /// Minimum worker count per zone
    pub workers: u32,
    /// Minimum vCPU per node
    pub vcpu: u32,
    /// Minimum RAM per node in GB
    pub ram_gb: u32,
    /// Minimum disk per node in GB
    pub disk_gb: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub use_case: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub industry_solutions: Vec<String>,
}

impl BaselineProfile {
    /// Build a user-defined profile, rejecting zero minimums
    pub fn custom(name: impl Into<String>, workers: u32, vcpu: u32, ram_gb: u32, disk_gb: u32) -> Result<Self> {
        let profile = Self {
            id: "custom".to_string(),
            name: name.into(),
            components: Vec::new(),
            workers,
            vcpu,
            ram_gb,
            disk_gb,
            description: "User-defined configuration".to_string(),
            use_case: String::new(),
            industry_solutions: Vec::new(),
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Check that every minimum is at least 1
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("workers", self.workers),
            ("vcpu", self.vcpu),
            ("ram_gb", self.ram_gb),
            ("disk_gb", self.disk_gb),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(AdvisorError::InvalidBaseline(format!(
                    "{} must be at least 1 for baseline '{}'",
                    field, self.id
                )));
            }
        }
        Ok(())
    }

    pub fn has_component(&self, component: &str) -> bool {
        self.components.iter().any(|c| c == component)
    }
}

/// Flavor family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlavorSeries {
    /// Balanced
    Bx2,
    /// Balanced dense (more memory per vCPU)
    Bx3d,
}

impl FlavorSeries {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlavorSeries::Bx2 => "bx2",
            FlavorSeries::Bx3d => "bx3d",
        }
    }

    /// The series with less memory per vCPU
    pub fn is_lower_density(&self) -> bool {
        match self {
            FlavorSeries::Bx2 => true,
            FlavorSeries::Bx3d => false,
        }
    }
}

impl fmt::Display for FlavorSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlavorSeries {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bx2" => Ok(FlavorSeries::Bx2),
            "bx3d" => Ok(FlavorSeries::Bx3d),
            other => Err(AdvisorError::UnknownFlavor(format!("series {}", other))),
        }
    }
}

/// Priced compute-node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFlavor {
    pub id: String,
    /// Provider name, e.g. `bx2.16x32`
    pub name: String,
    pub series: FlavorSeries,
    pub vcpu: u32,
    pub ram_gb: u32,
    pub storage_gb: u32,
    pub storage_type: String,
    /// Network class label, e.g. `24Gbps`
    pub network: String,
    /// USD per node-hour
    pub hourly_rate: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

impl NodeFlavor {
    /// Numeric prefix of the network label (`"16Gbps"` -> 16)
    pub fn network_gbps(&self) -> Option<u32> {
        let digits: String = self
            .network
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}

/// Zone replication factor, restricted to 1, 2 or 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ZoneCount {
    One,
    Two,
    Three,
}

impl ZoneCount {
    pub const ALL: [ZoneCount; 3] = [ZoneCount::One, ZoneCount::Two, ZoneCount::Three];

    pub fn get(self) -> u8 {
        match self {
            ZoneCount::One => 1,
            ZoneCount::Two => 2,
            ZoneCount::Three => 3,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.get())
    }
}

impl TryFrom<u8> for ZoneCount {
    type Error = AdvisorError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(ZoneCount::One),
            2 => Ok(ZoneCount::Two),
            3 => Ok(ZoneCount::Three),
            other => Err(AdvisorError::InvalidZoneCount(other)),
        }
    }
}

impl From<ZoneCount> for u8 {
    fn from(zones: ZoneCount) -> u8 {
        zones.get()
    }
}

impl fmt::Display for ZoneCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Risk severity, ordered most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Severity::High => "🔴",
            Severity::Medium => "🟡",
            Severity::Low => "🔵",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommendation priority, ordered most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Configuration,
    Availability,
    Cost,
    Optimization,
    Performance,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 5] = [
        RiskCategory::Configuration,
        RiskCategory::Availability,
        RiskCategory::Cost,
        RiskCategory::Optimization,
        RiskCategory::Performance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Configuration => "configuration",
            RiskCategory::Availability => "availability",
            RiskCategory::Cost => "cost",
            RiskCategory::Optimization => "optimization",
            RiskCategory::Performance => "performance",
        }
    }
}

/// Recommendation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    Success,
    Optimization,
    Critical,
    Availability,
    Info,
    BestPractice,
    Scalability,
    Performance,
    Cost,
    Reliability,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::Success => "success",
            RecommendationKind::Optimization => "optimization",
            RecommendationKind::Critical => "critical",
            RecommendationKind::Availability => "availability",
            RecommendationKind::Info => "info",
            RecommendationKind::BestPractice => "best-practice",
            RecommendationKind::Scalability => "scalability",
            RecommendationKind::Performance => "performance",
            RecommendationKind::Cost => "cost",
            RecommendationKind::Reliability => "reliability",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            RecommendationKind::Critical => "🔴",
            RecommendationKind::Optimization => "🟡",
            RecommendationKind::Success => "🟢",
            RecommendationKind::BestPractice => "💡",
            RecommendationKind::Info => "ℹ️",
            RecommendationKind::Availability => "🛡️",
            RecommendationKind::Scalability => "📈",
            RecommendationKind::Performance => "⚡",
            RecommendationKind::Cost => "💰",
            RecommendationKind::Reliability => "🔧",
        }
    }
}

impl FromStr for RecommendationKind {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(AdvisorError::from)
    }
}

/// A single risk identified for a configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFinding {
    /// Stable key, e.g. `insufficient-vcpu`
    pub id: String,
    pub severity: Severity,
    pub category: RiskCategory,
    pub title: String,
    pub message: String,
    pub impact: String,
    pub recommendation: String,
}

/// A single piece of advice for a configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationFinding {
    /// Stable key used for deduplication
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub message: String,
    pub action: String,
}
