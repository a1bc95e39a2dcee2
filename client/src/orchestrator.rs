//! The verification orchestrator.
//!
//! Runs one session end to end: route the entry URL, check eligibility,
//! negotiate permissions, start the producers and the stream, drive the
//! challenge, and tear everything down once a terminal message arrives.
//! Components never end the session themselves; every failure funnels
//! through here and is mapped onto a user-facing outcome first.

use std::time::Duration;

use parallax_capability::{check_baseline, check_with_permissions, DevicePlatform};
use parallax_capture::{
    CaptureError, MotionEvent, MotionSampler, MotionSource, ProducerHandle, VideoChunker,
    VideoEvent, VideoSource,
};
use parallax_challenge::PhaseController;
use parallax_channel::{health_url, ChannelError, LinkConfig, LinkEvent, RealtimeLink};
use parallax_messages::ControlMessage;
use parallax_types::{ChallengePhase, EntryRoute, FailureKind, Timestamp, Verdict};
use tokio::sync::{broadcast, mpsc};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::presentation::{Page, PresentationSurface};
use crate::redirect::completion_url;
use crate::stats::{ClientStats, StatsSnapshot};
use crate::telemetry::TelemetryBuffer;

/// Buffered events per producer channel.
const EVENT_BUFFER: usize = 64;

/// How one session ended.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionOutcome {
    /// The backend scored the session. A failing score still lands here;
    /// the protocol ran to completion either way.
    Scored(Verdict),
    /// The session stopped before a verdict.
    Failed { kind: FailureKind, message: String },
    /// The entry URL carried no session; only the landing page was shown.
    Landing,
    /// The user or the host process walked away mid-flow.
    Abandoned,
}

/// Ties the capability checker, the producers, the channel and the
/// challenge controller together for one session at a time.
pub struct Orchestrator<'a> {
    config: ClientConfig,
    platform: &'a dyn DevicePlatform,
    surface: &'a dyn PresentationSurface,
    stats: ClientStats,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: ClientConfig,
        platform: &'a dyn DevicePlatform,
        surface: &'a dyn PresentationSurface,
    ) -> Self {
        Self {
            config,
            platform,
            surface,
            stats: ClientStats::new(),
        }
    }

    /// Counters accumulated so far, for summaries and tests.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Run one verification session to its terminal state.
    ///
    /// Never returns an error: whatever goes wrong has already been shown
    /// to the user and classified by the time this resolves. A shutdown
    /// signal ends the session as [`SessionOutcome::Abandoned`] after the
    /// same teardown as every other path.
    pub async fn run_session<V, M>(
        &self,
        entry_url: &Url,
        camera: V,
        sensor: M,
        mut shutdown: broadcast::Receiver<()>,
    ) -> SessionOutcome
    where
        V: VideoSource + 'static,
        M: MotionSource + 'static,
    {
        let params = match EntryRoute::from_url(entry_url) {
            EntryRoute::Verify(params) => params,
            EntryRoute::Landing => {
                tracing::info!("no session in the entry URL");
                self.surface.show_page(Page::Landing);
                return SessionOutcome::Landing;
            }
        };
        tracing::info!(session = %params.session_id, "session starting");

        // Stage one: passive eligibility. No prompt has happened yet, so an
        // ineligible device is turned away without ever asking for anything.
        let baseline = check_baseline(&self.platform.profile());
        if !baseline.compatible() {
            self.surface.show_compatibility(&baseline);
            let kind = baseline
                .failure_kind()
                .unwrap_or(FailureKind::DeviceIncompatible);
            return self.fail(kind, &baseline.errors().join("; "));
        }

        self.surface.show_page(Page::Ready);
        if !self.surface.prompt_permission().await {
            tracing::info!("user declined to begin");
            return SessionOutcome::Abandoned;
        }

        // Stage two: permission prompts. Each retry re-prompts from scratch
        // because the user may have changed OS settings in between.
        loop {
            let report = check_with_permissions(self.platform).await;
            if report.compatible() {
                break;
            }
            self.surface.show_compatibility(&report);
            if !self.surface.prompt_retry(&report.errors()).await {
                let kind = report.failure_kind().unwrap_or(FailureKind::PermissionDenied);
                return self.fail(kind, &report.errors().join("; "));
            }
        }

        self.surface.show_page(Page::Capture);

        let (link_events, mut link_rx) = mpsc::channel(EVENT_BUFFER);
        let link_config = LinkConfig {
            origin: self.config.origin.clone(),
            session_id: params.session_id.clone(),
            connect_timeout_ms: self.config.connect_timeout_ms,
            reconnect_delay_ms: self.config.reconnect_delay_ms,
            health_preflight: self.config.health_preflight,
        };
        let mut link = match RealtimeLink::connect(link_config, link_events).await {
            Ok(link) => link,
            Err(err) => return self.connect_failed(err),
        };

        let (video_events, mut video_rx) = mpsc::channel(EVENT_BUFFER);
        let mut video = match VideoChunker::initialize(camera).await {
            Ok(chunker) => chunker.start(self.config.segment_interval_ms, video_events),
            Err(err) => {
                link.close().await;
                return self.fail_client(err.into());
            }
        };

        let (motion_events, mut motion_rx) = mpsc::channel(EVENT_BUFFER);
        let mut motion = match MotionSampler::subscribe(sensor, self.config.sample_rate_hz).await {
            Ok(sampler) => sampler.start(motion_events),
            Err(err) => {
                video.stop().await;
                link.close().await;
                return self.fail_client(err.into());
            }
        };

        let mut controller = PhaseController::new(self.config.dwell.clone(), Timestamp::now());
        self.render_phases(&mut controller);
        let mut telemetry = TelemetryBuffer::new(self.config.batch_size);

        let outcome = loop {
            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    tracing::info!("shutdown during session");
                    break SessionOutcome::Abandoned;
                }

                event = link_rx.recv() => match event {
                    Some(LinkEvent::Control(message)) => {
                        self.stats.record_control_message();
                        let terminal = self.apply_control(message, &mut controller);
                        self.render_phases(&mut controller);
                        if let Some(outcome) = terminal {
                            break outcome;
                        }
                    }
                    Some(LinkEvent::Reopened) => {
                        self.stats.record_reconnect();
                        tracing::info!("stream reopened");
                    }
                    Some(LinkEvent::ConnectionLost { due_at }) => {
                        tracing::warn!(redial_at = %due_at, "stream lost, redial pending");
                    }
                    Some(LinkEvent::Closed) | None => {
                        break self.fail(
                            FailureKind::ChannelUnavailable,
                            "the stream closed before a verdict",
                        );
                    }
                },

                event = video_rx.recv() => match event {
                    Some(VideoEvent::Segment(segment)) => {
                        self.stats.record_segment();
                        if link.send_video(segment).await.is_err() {
                            break self.fail(
                                FailureKind::ChannelUnavailable,
                                "the stream closed before a verdict",
                            );
                        }
                    }
                    Some(VideoEvent::Fault(fault)) => {
                        break self.fail_client(CaptureError::Camera(fault).into());
                    }
                    None => {
                        break self.fail(FailureKind::CaptureUnavailable, "camera task ended");
                    }
                },

                event = motion_rx.recv() => match event {
                    Some(MotionEvent::Sample(sample)) => {
                        self.stats.record_samples(1);
                        if let Some(batch) = telemetry.push(sample) {
                            self.stats.record_batch();
                            if link.send_telemetry(batch).await.is_err() {
                                break self.fail(
                                    FailureKind::ChannelUnavailable,
                                    "the stream closed before a verdict",
                                );
                            }
                        }
                    }
                    Some(MotionEvent::Fault(fault)) => {
                        break self.fail_client(CaptureError::Sensor(fault).into());
                    }
                    None => {
                        break self.fail(FailureKind::SensorUnavailable, "sensor task ended");
                    }
                },

                _ = phase_timer(controller.next_deadline()) => {
                    controller.on_tick(Timestamp::now());
                    self.render_phases(&mut controller);
                }
            }
        };

        if let SessionOutcome::Scored(verdict) = &outcome {
            tracing::info!(
                status = %verdict.status,
                trust_score = verdict.trust_score,
                "verdict received"
            );
            self.surface.show_result(verdict);
        }

        self.teardown(
            &mut link,
            &mut link_rx,
            &mut video,
            &mut video_rx,
            &mut motion,
            &mut motion_rx,
            &mut telemetry,
        )
        .await;

        if let SessionOutcome::Scored(verdict) = &outcome {
            match &params.return_url {
                Some(return_url) => {
                    let target = completion_url(return_url, &params.session_id, verdict);
                    tracing::info!(target = %target, "redirecting");
                    self.surface.redirect(&target);
                }
                None => self.surface.show_page(Page::CloseTab),
            }
        }

        let snapshot = self.stats.snapshot();
        tracing::info!(
            session = %params.session_id,
            segments = snapshot.segments_sent,
            samples = snapshot.samples_collected,
            batches = snapshot.batches_sent,
            reconnects = snapshot.reconnects,
            control = snapshot.control_messages,
            "session over"
        );
        outcome
    }

    /// Apply one control message; `Some` means the session is over.
    fn apply_control(
        &self,
        message: ControlMessage,
        controller: &mut PhaseController,
    ) -> Option<SessionOutcome> {
        tracing::debug!(kind = message.kind(), "control message");
        match message {
            ControlMessage::Branding(branding) => {
                self.surface.apply_branding(&branding);
                None
            }
            ControlMessage::PhaseChange(directive) => {
                controller.force(
                    directive.phase,
                    directive.title,
                    directive.instruction,
                    Timestamp::now(),
                );
                None
            }
            ControlMessage::Status(notice) => {
                tracing::info!(level = ?notice.level, notice = %notice.message, "backend status");
                self.surface.show_status(&notice);
                None
            }
            ControlMessage::Verdict(verdict) => {
                let phase = if verdict.status.is_success() {
                    ChallengePhase::Complete
                } else {
                    ChallengePhase::Failed
                };
                controller.force(phase, None, None, Timestamp::now());
                Some(SessionOutcome::Scored(verdict))
            }
            ControlMessage::Error(error) => Some(self.fail(
                FailureKind::ServerReportedFailure,
                &error.message,
            )),
        }
    }

    fn render_phases(&self, controller: &mut PhaseController) {
        for change in controller.drain_events() {
            tracing::info!(phase = %change.phase, "phase");
            self.surface
                .show_phase(change.phase, &change.title, &change.instruction);
        }
    }

    /// Classify, show and log a failure.
    fn fail(&self, kind: FailureKind, message: &str) -> SessionOutcome {
        tracing::warn!(kind = kind.as_str(), detail = message, "session failed");
        self.surface.show_error(kind, message);
        SessionOutcome::Failed {
            kind,
            message: message.to_owned(),
        }
    }

    fn fail_client(&self, error: ClientError) -> SessionOutcome {
        self.fail(error.failure_kind(), &error.to_string())
    }

    /// The initial connect failed. On development hosts a refused health
    /// probe or an untrusted certificate routes the user to the health page
    /// where the certificate can be accepted.
    fn connect_failed(&self, err: ChannelError) -> SessionOutcome {
        if err.is_tls_trust() || matches!(err, ChannelError::Preflight { .. }) {
            if let Ok(health) = health_url(&self.config.origin) {
                tracing::warn!(error = %err, health = %health, "routing user to certificate acceptance");
                self.surface.redirect(&health);
            }
        }
        self.fail(FailureKind::ChannelUnavailable, &err.to_string())
    }

    /// Release everything, on every exit path, in the same order: producers
    /// first so nothing new is emitted, then the buffered leftovers, then
    /// the channel. Safe to run against already-stopped pieces.
    #[allow(clippy::too_many_arguments)]
    async fn teardown(
        &self,
        link: &mut RealtimeLink,
        link_rx: &mut mpsc::Receiver<LinkEvent>,
        video: &mut ProducerHandle,
        video_rx: &mut mpsc::Receiver<VideoEvent>,
        motion: &mut ProducerHandle,
        motion_rx: &mut mpsc::Receiver<MotionEvent>,
        telemetry: &mut TelemetryBuffer,
    ) {
        // The stopping producer may be mid-send into a full event channel,
        // so keep draining while waiting for it to finish.
        let mut segments = Vec::new();
        {
            let stopping = video.stop();
            tokio::pin!(stopping);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stopping => break,
                    event = video_rx.recv() => match event {
                        Some(VideoEvent::Segment(segment)) => segments.push(segment),
                        Some(VideoEvent::Fault(_)) => {}
                        None => {
                            (&mut stopping).await;
                            break;
                        }
                    },
                }
            }
        }
        while let Ok(event) = video_rx.try_recv() {
            if let VideoEvent::Segment(segment) = event {
                segments.push(segment);
            }
        }

        let mut samples = Vec::new();
        {
            let stopping = motion.stop();
            tokio::pin!(stopping);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stopping => break,
                    event = motion_rx.recv() => match event {
                        Some(MotionEvent::Sample(sample)) => samples.push(sample),
                        Some(MotionEvent::Fault(_)) => {}
                        None => {
                            (&mut stopping).await;
                            break;
                        }
                    },
                }
            }
        }
        while let Ok(event) = motion_rx.try_recv() {
            if let MotionEvent::Sample(sample) = event {
                samples.push(sample);
            }
        }

        // Flush the leftovers. The link may already be gone; a send failure
        // here changes nothing about the outcome.
        for segment in segments {
            self.stats.record_segment();
            let _ = link.send_video(segment).await;
        }
        for sample in samples {
            self.stats.record_samples(1);
            if let Some(batch) = telemetry.push(sample) {
                self.stats.record_batch();
                let _ = link.send_telemetry(batch).await;
            }
        }
        if let Some(batch) = telemetry.flush() {
            self.stats.record_batch();
            let _ = link.send_telemetry(batch).await;
        }

        link.close().await;
        while link_rx.try_recv().is_ok() {}
        tracing::debug!("teardown complete");
    }
}

/// Sleep until the controller's next deadline, or forever when it has none.
async fn phase_timer(deadline: Option<Timestamp>) {
    match deadline {
        Some(due) => {
            let remaining = due.as_millis().saturating_sub(Timestamp::now().as_millis());
            tokio::time::sleep(Duration::from_millis(remaining)).await;
        }
        None => std::future::pending::<()>().await,
    }
}
