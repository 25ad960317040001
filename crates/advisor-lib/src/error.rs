//! Error types for the sizing advisor
//!
//! The pure costing pipeline never fails for well-formed input. Errors come
//! from boundary validation (zone counts, custom baselines), catalog lookups,
//! and the external collaborators (cloud source, scenario store, report sink).

use thiserror::Error;

/// Errors produced by the advisor library
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Zone count outside the supported 1-3 range
    #[error("invalid zone count {0}: must be 1, 2 or 3")]
    InvalidZoneCount(u8),

    /// Baseline violates its minimums (e.g. zero workers)
    #[error("invalid baseline: {0}")]
    InvalidBaseline(String),

    #[error("baseline not found: {0}")]
    UnknownBaseline(String),

    #[error("flavor not found: {0}")]
    UnknownFlavor(String),

    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),

    /// Catalog data file is inconsistent
    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cloud mode has no credentials
    #[error("{0} not configured")]
    NotConfigured(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Non-2xx response from the cloud provider
    #[error("cloud API error ({status}): {message}")]
    CloudApi { status: u16, message: String },

    #[error("report error: {0}")]
    Report(String),

    /// Score label other than GREEN, AMBER or RED
    #[error("unknown cost score: {0}")]
    UnknownScoreLevel(String),

    #[error("invalid import data: {0}")]
    InvalidImport(String),

    #[error("invalid deploy request: {0}")]
    InvalidDeploy(String),
}

impl AdvisorError {
    /// Returns true for failures worth retrying against a remote service
    pub fn is_transient(&self) -> bool {
        match self {
            AdvisorError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            AdvisorError::CloudApi { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<url::ParseError> for AdvisorError {
    fn from(err: url::ParseError) -> Self {
        AdvisorError::InvalidUrl(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AdvisorError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AdvisorError::Report(err.to_string())
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AdvisorError::InvalidZoneCount(4).to_string(),
            "invalid zone count 4: must be 1, 2 or 3"
        );
        assert_eq!(
            AdvisorError::NotConfigured("IBM Cloud service".into()).to_string(),
            "IBM Cloud service not configured"
        );
    }

    #[test]
    fn test_transient_classification() {
        let server = AdvisorError::CloudApi {
            status: 503,
            message: "unavailable".into(),
        };
        let throttled = AdvisorError::CloudApi {
            status: 429,
            message: "slow down".into(),
        };
        let forbidden = AdvisorError::CloudApi {
            status: 403,
            message: "forbidden".into(),
        };

        assert!(server.is_transient());
        assert!(throttled.is_transient());
        assert!(!forbidden.is_transient());
        assert!(!AdvisorError::UnknownFlavor("x".into()).is_transient());
    }
}
