//! Parallax verification client — orchestrates one capture session.
//!
//! The orchestrator is the central coordinator that:
//! - Routes the entry URL (session or landing page)
//! - Runs the passive eligibility check, then the permission prompts
//! - Starts the video and motion producers and the realtime stream
//! - Batches telemetry and forwards segments in capture order
//! - Drives the challenge phases, local timers yielding to the server
//! - Classifies every failure onto the user-facing taxonomy
//! - Tears everything down once, idempotently, on every exit path

pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod presentation;
pub mod redirect;
pub mod shutdown;
pub mod stats;
pub mod telemetry;

pub use config::ClientConfig;
pub use error::ClientError;
pub use logging::{init_logging, LogFormat};
pub use orchestrator::{Orchestrator, SessionOutcome};
pub use presentation::{Page, PresentationSurface};
pub use redirect::completion_url;
pub use shutdown::ShutdownController;
pub use stats::{ClientStats, StatsSnapshot};
pub use telemetry::{TelemetryBuffer, DEFAULT_BATCH_SIZE};
