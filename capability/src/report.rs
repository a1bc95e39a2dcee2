//! Compatibility report and the reasons a device can be turned away.

use parallax_types::{BrowserFamily, DeviceProfile, FailureKind, FormFactor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One reason a device cannot proceed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blocker {
    /// Verification needs a device the user can pan; desktops cannot.
    NotHandheld(FormFactor),
    /// The browser family has no supported version at all.
    UnsupportedBrowser(BrowserFamily),
    /// The browser is supported but this version predates the minimum.
    OutdatedBrowser {
        family: BrowserFamily,
        major: u32,
        minimum: u32,
    },
    MissingCameraApi,
    MissingMotionApi,
    CameraDenied,
    MotionDenied,
}

impl Blocker {
    /// Which taxonomy entry this blocker maps to.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::NotHandheld(_)
            | Self::UnsupportedBrowser(_)
            | Self::OutdatedBrowser { .. }
            | Self::MissingCameraApi
            | Self::MissingMotionApi => FailureKind::DeviceIncompatible,
            Self::CameraDenied | Self::MotionDenied => FailureKind::PermissionDenied,
        }
    }
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotHandheld(form_factor) => write!(
                f,
                "verification requires a phone or tablet, but this looks like a {form_factor}"
            ),
            Self::UnsupportedBrowser(family) => {
                write!(f, "this browser ({family}) is not supported")
            }
            Self::OutdatedBrowser {
                family,
                major,
                minimum,
            } => write!(
                f,
                "{family} {major} is too old, version {minimum} or newer is required"
            ),
            Self::MissingCameraApi => f.write_str("this browser cannot capture camera video"),
            Self::MissingMotionApi => f.write_str("this browser exposes no motion sensor"),
            Self::CameraDenied => f.write_str("camera access was not granted"),
            Self::MotionDenied => f.write_str("motion sensor access was not granted"),
        }
    }
}

/// What the eligibility stages report back.
///
/// Produced twice per session: once by the passive baseline stage and once
/// after the permission prompts. Never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub device: DeviceProfile,
    pub blockers: Vec<Blocker>,
}

impl CompatibilityReport {
    pub fn clear(device: DeviceProfile) -> Self {
        Self {
            device,
            blockers: Vec::new(),
        }
    }

    pub fn compatible(&self) -> bool {
        self.blockers.is_empty()
    }

    /// User-facing reason strings, in rule order.
    pub fn errors(&self) -> Vec<String> {
        self.blockers.iter().map(ToString::to_string).collect()
    }

    /// The taxonomy entry for the first (most fundamental) blocker.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.blockers.first().map(Blocker::failure_kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocker_text_is_user_ready() {
        let blocker = Blocker::OutdatedBrowser {
            family: BrowserFamily::Safari,
            major: 12,
            minimum: 15,
        };
        assert_eq!(
            blocker.to_string(),
            "Safari 12 is too old, version 15 or newer is required"
        );
    }

    #[test]
    fn blockers_map_to_taxonomy() {
        assert_eq!(
            Blocker::NotHandheld(FormFactor::Desktop).failure_kind(),
            FailureKind::DeviceIncompatible
        );
        assert_eq!(
            Blocker::CameraDenied.failure_kind(),
            FailureKind::PermissionDenied
        );
        assert_eq!(
            Blocker::MotionDenied.failure_kind(),
            FailureKind::PermissionDenied
        );
    }
}
