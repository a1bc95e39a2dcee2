//! Time-sliced video segmentation.
//!
//! The chunker reads encoded bytes from a [`VideoSource`] and cuts one
//! [`VideoSegment`] per interval. Segments leave in strict capture order;
//! nothing is buffered beyond the single window being accumulated.

use crate::error::{CaptureError, SourceError};
use crate::handle::ProducerHandle;
use crate::source::{StreamInfo, VideoSource};
use parallax_types::{Timestamp, VideoSegment};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

/// What the chunker emits into the orchestrator's channel.
#[derive(Debug)]
pub enum VideoEvent {
    Segment(VideoSegment),
    /// The source failed or ended mid-session. The task exits after this.
    Fault(SourceError),
}

// ── Window accumulation ─────────────────────────────────────────────────

/// Accumulates encoded bytes for the current capture window.
///
/// Cutting takes the buffer and starts the next window at the cut instant.
/// An empty window cuts to nothing and keeps its start, so quiet spans are
/// folded into the next non-empty segment instead of emitting zero-length
/// ones.
#[derive(Debug)]
struct SegmentWindow {
    next_sequence: u64,
    started_at: Timestamp,
    buffer: Vec<u8>,
}

impl SegmentWindow {
    fn new(now: Timestamp) -> Self {
        Self {
            next_sequence: 0,
            started_at: now,
            buffer: Vec::new(),
        }
    }

    fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    fn cut(&mut self, now: Timestamp) -> Option<VideoSegment> {
        if self.buffer.is_empty() {
            return None;
        }
        let segment = VideoSegment {
            sequence: self.next_sequence,
            started_at: self.started_at,
            ended_at: now,
            data: std::mem::take(&mut self.buffer),
        };
        self.next_sequence += 1;
        self.started_at = now;
        Some(segment)
    }
}

// ── Chunker ─────────────────────────────────────────────────────────────

/// Owns the camera source between acquisition and the start of capture.
pub struct VideoChunker<S: VideoSource> {
    source: S,
    info: StreamInfo,
}

impl<S: VideoSource + 'static> VideoChunker<S> {
    /// Acquire the camera stream.
    ///
    /// Failure here means hardware or permission disappeared after the
    /// eligibility checks passed, which is a different situation from a
    /// permission refusal and maps to a different user message.
    pub async fn initialize(mut source: S) -> Result<Self, CaptureError> {
        let info = source.open().await.map_err(CaptureError::Camera)?;
        tracing::debug!(
            width = info.width,
            height = info.height,
            mime = %info.mime_type,
            "camera stream open"
        );
        Ok(Self { source, info })
    }

    pub fn info(&self) -> &StreamInfo {
        &self.info
    }

    /// Spawn the capture loop, cutting a segment every `interval_ms`.
    pub fn start(self, interval_ms: u64, events: mpsc::Sender<VideoEvent>) -> ProducerHandle {
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run(self.source, interval_ms, events, stop_rx));
        ProducerHandle::new(stop_tx, task)
    }
}

async fn run(
    mut source: impl VideoSource,
    interval_ms: u64,
    events: mpsc::Sender<VideoEvent>,
    mut stop: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; swallow it so the first window
    // spans a full interval.
    ticker.tick().await;
    let mut window = SegmentWindow::new(Timestamp::now());

    loop {
        tokio::select! {
            biased;
            _ = &mut stop => {
                // Flush the partial window so session end loses no footage.
                if let Some(segment) = window.cut(Timestamp::now()) {
                    let _ = events.send(VideoEvent::Segment(segment)).await;
                }
                tracing::debug!("video chunker stopping");
                break;
            }
            _ = ticker.tick() => {
                if let Some(segment) = window.cut(Timestamp::now()) {
                    if events.send(VideoEvent::Segment(segment)).await.is_err() {
                        // Receiver gone, the session is tearing down.
                        break;
                    }
                }
            }
            read = source.read() => match read {
                Ok(Some(bytes)) => window.push(&bytes),
                Ok(None) => {
                    if let Some(segment) = window.cut(Timestamp::now()) {
                        let _ = events.send(VideoEvent::Segment(segment)).await;
                    }
                    let _ = events.send(VideoEvent::Fault(SourceError::Ended)).await;
                    break;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "video source read failed");
                    let _ = events.send(VideoEvent::Fault(err)).await;
                    break;
                }
            }
        }
    }
    source.close().await;
}
