//! Session interface port (boundary with the capability-provider transport).
//!
//! The core never speaks the wire protocol to reach a provider; it only
//! needs "list tools / list resources / connect" per spec.md section 6.
//! Grounded on the teacher's `domain::ports::McpClient` trait shape.

use async_trait::async_trait;
use thiserror::Error;

/// A tool advertised by a connected provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTool {
    pub name: String,
    pub description: String,
}

/// A resource advertised by a connected provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResource {
    pub name: String,
    pub uri: String,
}

/// Errors from the session transport. All are treated as transient by C3 —
/// a single provider's failure is logged and counted, never aborts a
/// discovery round (spec section 4.2).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("provider not found: {0}")]
    NotFound(String),
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("request timed out")]
    Timeout,
    #[error("cancelled")]
    Cancelled,
}

/// The capability-provider session boundary (spec.md section 6).
///
/// Implementations talk whatever transport/session protocol is actually in
/// use; the core only calls these four methods, all cancellable at the
/// caller's discretion via the surrounding async task.
#[async_trait]
pub trait SessionClient: Send + Sync {
    /// Names of providers currently connected to this session.
    async fn list_connected(&self) -> Result<Vec<String>, SessionError>;

    /// Tools advertised by a connected provider.
    async fn list_tools(&self, provider: &str) -> Result<Vec<SessionTool>, SessionError>;

    /// Resources advertised by a connected provider.
    async fn list_resources(&self, provider: &str) -> Result<Vec<SessionResource>, SessionError>;

    /// Attempt to (re)connect to a named provider.
    async fn connect(&self, provider: &str) -> Result<(), SessionError>;
}
