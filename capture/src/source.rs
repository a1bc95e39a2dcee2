//! Hardware source traits, the seam between capture logic and devices.

use crate::error::SourceError;
use async_trait::async_trait;
use parallax_types::MotionSample;

/// What the camera opened with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    /// Container/codec of the encoded byte stream, e.g. `video/webm;codecs=vp8`.
    pub mime_type: String,
}

/// A camera producing encoded video bytes.
///
/// `read` yields bytes in encode order as the device produces them and must
/// be cancel-safe: the chunker polls it inside a `select!` and drops the
/// future whenever a segment boundary or stop signal wins the race.
#[async_trait]
pub trait VideoSource: Send {
    /// Acquire the camera stream.
    async fn open(&mut self) -> Result<StreamInfo, SourceError>;

    /// Next burst of encoded bytes. `Ok(None)` means the stream ended.
    async fn read(&mut self) -> Result<Option<Vec<u8>>, SourceError>;

    /// Release the camera. Must be safe to call on a never-opened source.
    async fn close(&mut self);
}

/// A motion sensor producing one reading per sensor event.
///
/// `next_reading` must be cancel-safe for the same reason as
/// [`VideoSource::read`].
#[async_trait]
pub trait MotionSource: Send {
    /// Subscribe to the sensor at the given nominal rate.
    ///
    /// Fails with [`SourceError::Unavailable`] when the motion grant was
    /// never obtained; motion permission is separate from camera permission
    /// on some platforms.
    async fn open(&mut self, rate_hz: u32) -> Result<(), SourceError>;

    /// Next sensor reading. `Ok(None)` means the subscription ended.
    async fn next_reading(&mut self) -> Result<Option<MotionSample>, SourceError>;

    /// Unsubscribe. Must be safe to call on a never-opened source.
    async fn close(&mut self);
}
