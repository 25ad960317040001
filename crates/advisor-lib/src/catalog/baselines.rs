use super::{ValidationIssue, ValidationReport};
use crate::error::{AdvisorError, Result};
use crate::models::{BaselineProfile, Severity};
use serde::{Deserialize, Serialize};

/// Read-only lookup over the baseline profiles
#[derive(Debug, Clone, Default)]
pub struct BaselineCatalog {
    baselines: Vec<BaselineProfile>,
}

impl BaselineCatalog {
    pub fn new(baselines: Vec<BaselineProfile>) -> Self {
        Self { baselines }
    }

    pub fn get(&self, id: &str) -> Option<&BaselineProfile> {
        self.baselines.iter().find(|b| b.id == id)
    }

    /// Like [`get`](Self::get) but reports a missing id as an error
    pub fn require(&self, id: &str) -> Result<&BaselineProfile> {
        self.get(id)
            .ok_or_else(|| AdvisorError::UnknownBaseline(id.to_string()))
    }

    /// All baselines in catalog order
    pub fn all(&self) -> &[BaselineProfile] {
        &self.baselines
    }
}

/// Resources a user intends to provision, checked against a baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineInput {
    pub workers: u32,
    pub vcpu: u32,
    pub ram_gb: u32,
    pub disk_gb: u32,
}

/// Compare intended resources to a baseline's minimums
pub fn validate_baseline_input(baseline: &BaselineProfile, input: &BaselineInput) -> ValidationReport {
    let mut issues = Vec::new();

    if input.workers < baseline.workers {
        issues.push(ValidationIssue {
            field: "workers".into(),
            severity: Severity::High,
            message: format!(
                "Workers ({}) below baseline minimum ({})",
                input.workers, baseline.workers
            ),
        });
    }
    if input.vcpu < baseline.vcpu {
        issues.push(ValidationIssue {
            field: "vcpu".into(),
            severity: Severity::High,
            message: format!(
                "vCPU ({}) below baseline requirement ({})",
                input.vcpu, baseline.vcpu
            ),
        });
    }
    if input.ram_gb < baseline.ram_gb {
        issues.push(ValidationIssue {
            field: "ram".into(),
            severity: Severity::High,
            message: format!(
                "RAM ({}GB) below baseline requirement ({}GB)",
                input.ram_gb, baseline.ram_gb
            ),
        });
    }
    if input.disk_gb < baseline.disk_gb {
        issues.push(ValidationIssue {
            field: "disk".into(),
            severity: Severity::Medium,
            message: format!(
                "Disk ({}GB) below baseline requirement ({}GB)",
                input.disk_gb, baseline.disk_gb
            ),
        });
    }

    ValidationReport::from_issues(issues)
}
