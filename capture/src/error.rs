//! Capture-side error types.

use thiserror::Error;

/// Why a hardware source failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The device refused to open the stream (hardware gone, permission
    /// revoked at the OS level, or already claimed by another app).
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The stream ended on its own while the session was still running.
    #[error("stream ended unexpectedly")]
    Ended,

    /// A read from an open stream failed.
    #[error("source read failed: {0}")]
    Read(String),
}

/// A producer failure, tagged with which producer it came from so the
/// orchestrator can map it onto the user-facing taxonomy.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera capture failed: {0}")]
    Camera(#[source] SourceError),

    #[error("motion sensor failed: {0}")]
    Sensor(#[source] SourceError),
}
