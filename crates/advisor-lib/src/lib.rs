//! Sizing advisor library for PFVT cluster configurations
//!
//! This crate provides the core functionality for:
//! - Baseline and flavor catalogs
//! - Cost calculation, cost scoring, risk assessment and recommendations
//! - Live cluster analysis against a cloud inventory
//! - Scenario storage, spreadsheet reports and the deploy seam
//! - Health checks and observability

pub mod advisor;
pub mod catalog;
pub mod cloud;
pub mod cluster;
pub mod costing;
pub mod deploy;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod recommendations;
pub mod report;
pub mod risk;
pub mod scenario;

pub use advisor::{advise, AdvisoryResult};
pub use catalog::Catalog;
pub use error::{AdvisorError, Result};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{AdvisorMetrics, StructuredLogger};
