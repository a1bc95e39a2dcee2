use thiserror::Error;

/// Failures raised by the realtime channel.
///
/// TLS trust failures get their own variant because on development hosts
/// they are almost always a self-signed certificate the user has not
/// accepted yet, and the caller routes that case to a remediation flow
/// instead of a plain retry.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The backend origin could not be turned into a stream endpoint.
    #[error("invalid endpoint: {0}")]
    Endpoint(String),

    /// The transport could not be established.
    #[error("connect to {url} failed: {reason}")]
    Connect { url: String, reason: String },

    /// The peer's certificate chain was not trusted.
    #[error("TLS trust failure connecting to {url}: {reason}")]
    Tls { url: String, reason: String },

    /// The connect attempt did not complete in time.
    #[error("connect to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// The health probe on a development host did not succeed.
    #[error("health probe of {url} failed: {reason}")]
    Preflight { url: String, reason: String },

    /// The link has shut down and accepts no further commands.
    #[error("channel is closed")]
    Closed,
}

impl ChannelError {
    /// True when the failure points at an untrusted development
    /// certificate rather than an unreachable backend.
    pub fn is_tls_trust(&self) -> bool {
        matches!(self, ChannelError::Tls { .. })
    }
}
