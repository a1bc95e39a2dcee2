//! Parallax agent — runs a verification session from the command line.
//!
//! Devices are synthetic: an endless camera and motion sensor from the
//! nullables crate stand in for real hardware, which makes the agent a
//! full-pipeline exercise tool against a real backend.

mod console;

use clap::Parser;
use console::ConsoleSurface;
use parallax_client::{
    init_logging, ClientConfig, LogFormat, Orchestrator, SessionOutcome, ShutdownController,
};
use parallax_nullables::{NullCamera, NullMotionSensor, NullPlatform};
use std::path::PathBuf;
use url::Url;

#[derive(Parser)]
#[command(name = "parallax-agent", about = "Parallax verification session agent")]
struct Cli {
    /// Verification entry URL (carries session_id and return_url).
    /// Without one the agent shows the landing guidance and exits.
    #[arg(long, env = "PARALLAX_ENTRY_URL")]
    url: Option<Url>,

    /// Backend origin, e.g. "https://localhost:8443".
    /// When a config file is provided, defaults to the file's origin.
    #[arg(long, env = "PARALLAX_ORIGIN")]
    origin: Option<Url>,

    /// Answer every prompt yes instead of reading stdin.
    #[arg(long, env = "PARALLAX_ASSUME_YES")]
    yes: bool,

    /// Synthetic video bytes per camera read.
    #[arg(long, default_value_t = 4_096, env = "PARALLAX_FRAME_BYTES")]
    frame_bytes: usize,

    /// Milliseconds between synthetic camera reads.
    #[arg(long, default_value_t = 33, env = "PARALLAX_FRAME_PACE_MS")]
    frame_pace_ms: u64,

    /// Skip the development-host health preflight.
    #[arg(long, env = "PARALLAX_NO_PREFLIGHT")]
    no_preflight: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "PARALLAX_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "PARALLAX_LOG_FORMAT")]
    log_format: String,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    fn parse_format(s: &str) -> LogFormat {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Human,
        }
    }

    let file_config: Option<ClientConfig> = if let Some(ref config_path) = cli.config {
        match config_path.to_str() {
            Some(path) => match ClientConfig::from_toml_file(path) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    eprintln!("Failed to load config file: {e}, using CLI defaults");
                    None
                }
            },
            None => {
                eprintln!("Config path is not valid UTF-8, using CLI defaults");
                None
            }
        }
    } else {
        None
    };

    let mut config = file_config.unwrap_or_default();
    if let Some(origin) = cli.origin {
        config.origin = origin;
    }
    if cli.no_preflight {
        config.health_preflight = false;
    }
    config.log_level = cli.log_level;
    config.log_format = cli.log_format;

    init_logging(parse_format(&config.log_format), &config.log_level);
    tracing::info!(origin = %config.origin, "agent starting");

    let entry = match cli.url {
        Some(url) => url,
        None => Url::parse("https://verify.local/")?,
    };

    let platform = NullPlatform::handheld();
    let surface = ConsoleSurface::new(cli.yes);
    let camera = NullCamera::endless(cli.frame_bytes, cli.frame_pace_ms);
    let sensor = NullMotionSensor::endless();
    let shutdown = ShutdownController::new();

    let orchestrator = Orchestrator::new(config, &platform, &surface);
    let session = orchestrator.run_session(&entry, camera, sensor, shutdown.subscribe());
    tokio::pin!(session);

    let outcome = tokio::select! {
        outcome = &mut session => outcome,
        _ = shutdown.wait_for_signal() => session.await,
    };

    let stats = orchestrator.stats();
    tracing::info!(
        segments = stats.segments_sent,
        samples = stats.samples_collected,
        batches = stats.batches_sent,
        reconnects = stats.reconnects,
        "agent exiting"
    );

    match outcome {
        SessionOutcome::Scored(verdict) if verdict.status.is_success() => Ok(()),
        SessionOutcome::Scored(verdict) => {
            anyhow::bail!("verification failed with trust score {}", verdict.trust_score)
        }
        SessionOutcome::Failed { kind, message } => {
            anyhow::bail!("session failed ({}): {message}", kind.as_str())
        }
        SessionOutcome::Landing | SessionOutcome::Abandoned => Ok(()),
    }
}
