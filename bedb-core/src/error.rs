//! Error taxonomy shared by every connector.

use std::fmt;

use thiserror::Error;

/// Result type for connection operations.
pub type DbResult<T> = Result<T, DbError>;

/// Boxed driver error carried by [`DbError::Rejected`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse classification of a [`DbError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Detected before any network I/O. Never worth retrying.
    Configuration,
    /// Open or liveness probe failed against the server.
    Connectivity,
}

/// The step of a connect call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Opening the client or pool.
    Open,
    /// Post-open liveness probe.
    Ping,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Ping => f.write_str("ping"),
        }
    }
}

/// Errors returned by the connectors.
///
/// `target` names the store and, for MongoDB, the resolved mode
/// (`mongodb:tunnel`, `postgres`, ...), so a failure can be traced to its
/// branch without extra logging.
#[derive(Error, Debug)]
pub enum DbError {
    /// Unknown or missing mode, invalid identity fields, unreadable config.
    #[error("configuration error [{target}]: {message}")]
    Configuration { target: String, message: String },

    /// The shared connect deadline expired.
    #[error("connectivity error [{target}]: {stage} timed out after {timeout_ms}ms")]
    Timeout {
        target: String,
        stage: Stage,
        timeout_ms: u64,
    },

    /// The driver or server rejected the open or the probe.
    #[error("connectivity error [{target}]: {stage} failed: {source}")]
    Rejected {
        target: String,
        stage: Stage,
        #[source]
        source: BoxError,
    },
}

impl DbError {
    /// Create a configuration error.
    pub fn config(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(target: impl Into<String>, stage: Stage, timeout_ms: u64) -> Self {
        Self::Timeout {
            target: target.into(),
            stage,
            timeout_ms,
        }
    }

    /// Create a rejection error wrapping the driver's error.
    pub fn rejected(target: impl Into<String>, stage: Stage, source: impl Into<BoxError>) -> Self {
        Self::Rejected {
            target: target.into(),
            stage,
            source: source.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Timeout { .. } | Self::Rejected { .. } => ErrorKind::Connectivity,
        }
    }

    /// Check if this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Check if this is a connectivity error (timeout or rejection).
    pub fn is_connectivity(&self) -> bool {
        self.kind() == ErrorKind::Connectivity
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// The store/mode label this error was raised for.
    pub fn target(&self) -> &str {
        match self {
            Self::Configuration { target, .. }
            | Self::Timeout { target, .. }
            | Self::Rejected { target, .. } => target,
        }
    }

    /// The failing stage, if the error happened after configuration.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Configuration { .. } => None,
            Self::Timeout { stage, .. } | Self::Rejected { stage, .. } => Some(*stage),
        }
    }
}
