//! Error types for lazy resolution and identity caching

use thiserror::Error;

use crate::identity::EntityKind;

#[derive(Debug, Error)]
pub enum ArmoryError {
    /// The field is neither a core nor an optional field of the entity kind.
    #[error("Unknown field '{field}' for {kind}")]
    UnknownField { kind: EntityKind, field: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A field that should exist after a successful fetch is absent or has
    /// an unexpected shape.
    #[error("Shape anomaly in {kind} field '{field}': {reason}")]
    ShapeAnomaly {
        kind: EntityKind,
        field: String,
        reason: String,
    },

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Invalid locale '{locale}': {reason}")]
    InvalidLocale { locale: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

impl ArmoryError {
    pub fn shape(kind: EntityKind, field: &str, reason: impl Into<String>) -> Self {
        Self::ShapeAnomaly {
            kind,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures reported by the remote data provider.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

/// The upstream provider could not produce a record for a target.
#[derive(Debug, Clone, Error)]
#[error("Fetch failed for {target}: {failure}")]
pub struct FetchError {
    pub target: String,
    pub failure: FetchFailure,
}

impl FetchError {
    pub fn new(target: impl Into<String>, failure: FetchFailure) -> Self {
        Self {
            target: target.into(),
            failure,
        }
    }

    /// HTTP status code, if the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match &self.failure {
            FetchFailure::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("host unreachable: {0}")]
    Unreachable(String),

    #[error("HTTP status {code}: {}", .reason.as_deref().unwrap_or("no reason given"))]
    Status { code: u16, reason: Option<String> },

    #[error("malformed body: {0}")]
    MalformedBody(String),
}

pub type Result<T> = std::result::Result<T, ArmoryError>;
