//! Error types used throughout the workspace

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{OpportunityType, TaskStatus};

/// Failure of a backend call
///
/// Cloneable so a single failed fetch can be handed to every caller that
/// shared it.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum FetchError {
    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Transport(String),

    /// The request exceeded the client timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The backend answered with a non-2xx status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The body could not be decoded into the expected entity
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The client is misconfigured (bad base URL, unbuildable client)
    #[error("Client configuration error: {0}")]
    Config(String),
}

impl FetchError {
    /// Stable short name, used as a log field
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Http { .. } => "http",
            Self::Decode(_) => "decode",
            Self::Config(_) => "config",
        }
    }

    /// HTTP status for [`FetchError::Http`]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether repeating the same request can succeed
    ///
    /// Network and HTTP failures are retried by the caches and offered as a
    /// user retry. Decode and configuration failures repeat deterministically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_) | Self::Http { .. })
    }
}

/// A request rejected locally, before any network call
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum ValidationError {
    /// Requested status equals the cached one
    #[error("Task is already {0}")]
    NoOp(TaskStatus),

    /// Attempted to leave a terminal status
    #[error("Cannot move task from {from} to {to}: {from} is terminal")]
    TerminalState { from: TaskStatus, to: TaskStatus },

    /// No analysis is selected
    #[error("No analysis selected")]
    InactiveKey,

    /// The cached snapshot has no gap for this opportunity
    #[error("Analysis has no gap for {0}")]
    UnknownGap(OpportunityType),

    /// Email address does not look like one
    #[error("Invalid email address: {0:?}")]
    InvalidEmail(String),

    /// Hourly rate is negative or not a number
    #[error("Invalid hourly rate: {0}")]
    InvalidHourlyRate(f64),
}

/// A decoded dashboard snapshot that breaks the analysis invariants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Expected {expected} gaps, found {found}")]
    GapCount { expected: usize, found: usize },

    #[error("Duplicate gap for {0}")]
    DuplicateGap(OpportunityType),

    #[error("Gap {opportunity} has complexity {complexity}, expected 1-10")]
    ComplexityOutOfRange { opportunity: OpportunityType, complexity: u8 },

    #[error("Gap {opportunity} is {status} but marked_date is missing")]
    MissingMarkedDate { opportunity: OpportunityType, status: TaskStatus },

    #[error("Gap {0} is NOT_STARTED but has a marked_date")]
    UnexpectedMarkedDate(OpportunityType),
}

impl From<SnapshotError> for FetchError {
    fn from(err: SnapshotError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Configuration could not be loaded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config file: {0}")]
    Io(String),

    #[error("Invalid {format} format: {message}")]
    Parse { format: &'static str, message: String },
}

/// Result type alias for configuration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
