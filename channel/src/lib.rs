//! Realtime channel between a capture session and the verification backend.
//!
//! One WebSocket carries everything: binary frames for video segments going
//! up, text frames for telemetry batches going up and control messages
//! coming down. The link rides out transient outages with a fixed-delay
//! redial, queues outbound frames while the transport is down, and never
//! arms more than one redial timer at a time.

pub mod endpoint;
pub mod error;
pub mod link;
pub mod preflight;
pub mod reconnect;

pub use endpoint::{health_url, is_development_host, stream_url};
pub use error::ChannelError;
pub use link::{LinkConfig, LinkEvent, RealtimeLink, CONNECT_TIMEOUT_MS};
pub use preflight::probe_health;
pub use reconnect::{LinkState, ReconnectPolicy, RECONNECT_DELAY_MS};
