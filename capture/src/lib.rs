//! The two capture producers: video chunker and motion sampler.
//!
//! Both run as background tasks that read from a hardware source trait and
//! emit into a bounded channel the orchestrator owns. Producers never talk
//! to the transport; the orchestrator forwards their output, so capture
//! logic is testable without any network and the transport can be swapped
//! without touching this crate.

pub mod chunker;
pub mod error;
pub mod handle;
pub mod sampler;
pub mod source;

pub use chunker::{VideoChunker, VideoEvent};
pub use error::{CaptureError, SourceError};
pub use handle::ProducerHandle;
pub use sampler::{MotionEvent, MotionSampler};
pub use source::{MotionSource, StreamInfo, VideoSource};

/// Default segment interval in milliseconds.
pub const DEFAULT_SEGMENT_INTERVAL_MS: u64 = 250;

/// Default nominal motion sampling rate in Hz.
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 60;
