//! The seam between eligibility logic and the host device.

use async_trait::async_trait;
use parallax_types::DeviceProfile;

/// Outcome of a permission prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grant {
    Granted,
    Denied,
}

impl Grant {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// What the host device exposes to the eligibility checker.
///
/// `profile` must never prompt; the two `request_*` calls may suspend for as
/// long as the user takes to answer. Motion is a separate grant from camera
/// on some platforms; where no explicit motion grant exists the
/// implementation resolves immediately with `Granted`.
#[async_trait]
pub trait DevicePlatform: Send + Sync {
    /// Passive probe of form factor, OS, browser, and API presence.
    fn profile(&self) -> DeviceProfile;

    /// Prompt for camera access.
    async fn request_camera_access(&self) -> Grant;

    /// Prompt for motion sensor access.
    async fn request_motion_access(&self) -> Grant;
}
