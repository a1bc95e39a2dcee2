//! The seam between the verification core and whatever renders it.
//!
//! The orchestrator never draws anything; it narrates the session through
//! this trait and a renderer (browser page, console, test recorder) decides
//! what that looks like. The two `prompt_*` methods are the only places the
//! core waits on the user.

use async_trait::async_trait;
use parallax_capability::CompatibilityReport;
use parallax_messages::{BrandingConfig, StatusNotice};
use parallax_types::{ChallengePhase, FailureKind, Verdict};
use url::Url;

/// Top-level page states outside the challenge itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    /// No session in the URL; nothing to verify.
    Landing,
    /// A session is loaded and the device passed the baseline check.
    Ready,
    /// Capture and challenge underway.
    Capture,
    /// Terminal state on a flow with no return URL: the user just leaves.
    CloseTab,
}

/// What the orchestrator can ask a renderer to do.
#[async_trait]
pub trait PresentationSurface: Send + Sync {
    fn show_page(&self, page: Page);

    /// Tenant look-and-feel pushed by the backend at session start.
    fn apply_branding(&self, branding: &BrandingConfig);

    /// Terminal incompatibility screen listing every blocker.
    fn show_compatibility(&self, report: &CompatibilityReport);

    /// Gate before the permission prompts; the browser requires a user
    /// gesture and the console wants an enter key. `false` means the user
    /// declined to begin.
    async fn prompt_permission(&self) -> bool;

    /// Offer another run at the permission step after a denial.
    async fn prompt_retry(&self, errors: &[String]) -> bool;

    fn show_phase(&self, phase: ChallengePhase, title: &str, instruction: &str);

    /// Non-terminal backend notice.
    fn show_status(&self, notice: &StatusNotice);

    /// Terminal verdict screen.
    fn show_result(&self, verdict: &Verdict);

    /// Terminal or recoverable failure screen.
    fn show_error(&self, kind: FailureKind, message: &str);

    /// Leave the page for `url`. Managed flows use this for the return
    /// redirect; development certificate remediation also lands here.
    fn redirect(&self, url: &Url);
}
