use std::fmt;

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::row::RowSet;

/// Server address and credentials. Resolved once at startup, then shared
/// read-only across every concurrent worker.
#[derive(Clone)]
pub struct ConnectionParams {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl ConnectionParams {
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        ConnectionParams {
            hostname: hostname.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

// The password must never reach logs or error output.
impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Capability to open connections against the configured server.
///
/// Implemented by the real driver adapter in the binary and by fakes in
/// tests; the pipeline only ever sees this trait.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection, optionally scoped to a database.
    async fn connect(&self, database: Option<&str>)
        -> Result<Box<dyn Connection>, DatabaseError>;
}

/// One open connection. Each worker owns its connection exclusively; a
/// connection is never shared across worker boundaries.
#[async_trait]
pub trait Connection: Send {
    /// Execute a SQL string and return the full result set.
    async fn query(&mut self, sql: &str) -> Result<RowSet, DatabaseError>;

    /// Tear the connection down. Consuming the handle makes a double
    /// close unrepresentable; drivers also release on drop as a backstop
    /// for abandoned handles.
    async fn close(self: Box<Self>) -> Result<(), DatabaseError>;
}
