//! Console renderer for the presentation surface.
//!
//! Prints the session to stdout and answers prompts from stdin (or
//! automatically with `--yes`). Rendering goes to stdout; operational
//! logging stays on the tracing subscriber.

use async_trait::async_trait;
use parallax_capability::CompatibilityReport;
use parallax_client::{Page, PresentationSurface};
use parallax_messages::{BrandingConfig, StatusNotice};
use parallax_types::{ChallengePhase, FailureKind, Verdict};
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

pub struct ConsoleSurface {
    assume_yes: bool,
}

impl ConsoleSurface {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    async fn read_yes_no(&self, default: bool) -> bool {
        if self.assume_yes {
            println!("  [--yes] continuing");
            return true;
        }
        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        match reader.read_line(&mut line).await {
            Ok(0) => default,
            Ok(_) => match line.trim().to_lowercase().as_str() {
                "" => default,
                "y" | "yes" => true,
                _ => false,
            },
            Err(_) => false,
        }
    }
}

#[async_trait]
impl PresentationSurface for ConsoleSurface {
    fn show_page(&self, page: Page) {
        match page {
            Page::Landing => {
                println!("No session in the URL.");
                println!("Open a verification link carrying a session_id to begin.");
            }
            Page::Ready => println!("Session loaded; device is eligible."),
            Page::Capture => println!("Capture running."),
            Page::CloseTab => println!("Done. You can close this window."),
        }
    }

    fn apply_branding(&self, branding: &BrandingConfig) {
        if let Some(logo) = &branding.logo_url {
            println!("[branding: {logo}]");
        }
    }

    fn show_compatibility(&self, report: &CompatibilityReport) {
        println!("This device cannot run the verification:");
        for error in report.errors() {
            println!("  - {error}");
        }
    }

    async fn prompt_permission(&self) -> bool {
        println!("Begin verification? Camera and motion access will be requested. [Y/n]");
        self.read_yes_no(true).await
    }

    async fn prompt_retry(&self, errors: &[String]) -> bool {
        println!("Permission was refused:");
        for error in errors {
            println!("  - {error}");
        }
        println!("Try again? [y/N]");
        self.read_yes_no(false).await
    }

    fn show_phase(&self, _phase: ChallengePhase, title: &str, instruction: &str) {
        println!("==> {title}");
        println!("    {instruction}");
    }

    fn show_status(&self, notice: &StatusNotice) {
        println!("  [{:?}] {}", notice.level, notice.message);
    }

    fn show_result(&self, verdict: &Verdict) {
        println!("Verification {}: trust score {}", verdict.status, verdict.trust_score);
        if let Some(reasoning) = &verdict.reasoning {
            println!("  {reasoning}");
        }
    }

    fn show_error(&self, kind: FailureKind, message: &str) {
        println!("Verification stopped ({}): {message}", kind.as_str());
    }

    fn redirect(&self, url: &Url) {
        println!("Continue at: {url}");
    }
}
