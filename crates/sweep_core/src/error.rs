use thiserror::Error;

/// Convenience alias for `Result<T, SweepError>`.
pub type SweepResult<T> = Result<T, SweepError>;

/// Top-level error type that all pipeline errors convert into.
///
/// Only fatal conditions surface here: discovery problems, configuration
/// problems, and a broken dispatch mechanism. A single shard's failure is
/// not an error at this level; it is data, recorded in the aggregate as a
/// [`crate::ShardOutcome::Failure`].
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure connecting to or querying a database. Carries the driver-level
/// message; cloneable so a shard outcome can own its error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("connect to `{target}` failed: {message}")]
    Connect { target: String, message: String },

    #[error("query on `{target}` failed: {message}")]
    Query { target: String, message: String },

    #[error("teardown of `{target}` failed: {message}")]
    Close { target: String, message: String },
}

impl DatabaseError {
    pub fn connect(target: impl Into<String>, message: impl Into<String>) -> Self {
        DatabaseError::Connect {
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn query(target: impl Into<String>, message: impl Into<String>) -> Self {
        DatabaseError::Query {
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn close(target: impl Into<String>, message: impl Into<String>) -> Self {
        DatabaseError::Close {
            target: target.into(),
            message: message.into(),
        }
    }

    /// The database or host the operation was aimed at.
    pub fn target(&self) -> &str {
        match self {
            DatabaseError::Connect { target, .. }
            | DatabaseError::Query { target, .. }
            | DatabaseError::Close { target, .. } => target,
        }
    }
}

/// Fatal: the run cannot determine which shards to target.
///
/// An empty filter result is deliberately an error of its own: a pattern
/// that matches nothing must never look like a successful run over zero
/// shards.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("cannot enumerate databases: {0}")]
    Enumerate(#[from] DatabaseError),

    #[error("no databases match shard pattern `{pattern}`")]
    NoMatch { pattern: String },
}

/// Fatal: bad or missing configuration, detected before any connection is
/// attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown renderer `{name}` (available: {available})")]
    UnknownRenderer { name: String, available: String },

    #[error("missing required value: {0}")]
    Missing(&'static str),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
