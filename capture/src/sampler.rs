//! Motion sample forwarding.
//!
//! One sensor reading in, one sample out. The sampler never batches,
//! decimates, or interpolates; batching into transport units happens in the
//! orchestrator, and jitter in the sensor cadence passes through untouched.

use crate::error::{CaptureError, SourceError};
use crate::handle::ProducerHandle;
use crate::source::MotionSource;
use parallax_types::MotionSample;
use tokio::sync::{mpsc, oneshot};

/// What the sampler emits into the orchestrator's channel.
#[derive(Debug)]
pub enum MotionEvent {
    Sample(MotionSample),
    /// The sensor failed or its subscription ended. The task exits after this.
    Fault(SourceError),
}

/// Owns the sensor source between subscription and the start of forwarding.
pub struct MotionSampler<S: MotionSource> {
    source: S,
}

impl<S: MotionSource + 'static> MotionSampler<S> {
    /// Subscribe to the sensor at `rate_hz`.
    ///
    /// Fails with a sensor fault when the motion grant was never obtained.
    /// Motion permission is separate from camera permission on some
    /// platforms, so this failing says nothing about video capture.
    pub async fn subscribe(mut source: S, rate_hz: u32) -> Result<Self, CaptureError> {
        source.open(rate_hz).await.map_err(CaptureError::Sensor)?;
        tracing::debug!(rate_hz, "motion sensor subscribed");
        Ok(Self { source })
    }

    /// Spawn the forwarding loop.
    pub fn start(self, events: mpsc::Sender<MotionEvent>) -> ProducerHandle {
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run(self.source, events, stop_rx));
        ProducerHandle::new(stop_tx, task)
    }
}

async fn run(
    mut source: impl MotionSource,
    events: mpsc::Sender<MotionEvent>,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => {
                tracing::debug!("motion sampler stopping");
                break;
            }
            reading = source.next_reading() => match reading {
                Ok(Some(sample)) => {
                    if events.send(MotionEvent::Sample(sample)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    let _ = events.send(MotionEvent::Fault(SourceError::Ended)).await;
                    break;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "motion source read failed");
                    let _ = events.send(MotionEvent::Fault(err)).await;
                    break;
                }
            }
        }
    }
    source.close().await;
}
