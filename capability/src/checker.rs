//! The two eligibility stages.

use crate::platform::DevicePlatform;
use crate::report::{Blocker, CompatibilityReport};
use parallax_types::DeviceProfile;

/// Passive eligibility rules. Never prompts.
///
/// Collects every blocker rather than stopping at the first, so the report
/// can show the user the full picture.
pub fn check_baseline(profile: &DeviceProfile) -> CompatibilityReport {
    let mut blockers = Vec::new();

    if !profile.form_factor.is_handheld() {
        blockers.push(Blocker::NotHandheld(profile.form_factor));
    }

    match profile.browser.minimum_major() {
        None => blockers.push(Blocker::UnsupportedBrowser(profile.browser)),
        Some(minimum) if profile.browser_major < minimum => {
            blockers.push(Blocker::OutdatedBrowser {
                family: profile.browser,
                major: profile.browser_major,
                minimum,
            });
        }
        Some(_) => {}
    }

    if !profile.has_camera_api {
        blockers.push(Blocker::MissingCameraApi);
    }
    if !profile.has_motion_api {
        blockers.push(Blocker::MissingMotionApi);
    }

    let report = CompatibilityReport {
        device: profile.clone(),
        blockers,
    };
    if !report.compatible() {
        tracing::info!(device = %profile.summary(), blockers = report.blockers.len(), "baseline check failed");
    }
    report
}

/// Active permission pass: camera first, then motion.
///
/// A denial produces a report with the matching blocker instead of an
/// error. The motion prompt is skipped after a camera denial so the user
/// answers one question per attempt. Holds no state between calls, so a
/// retry after a denial prompts again.
pub async fn check_with_permissions(platform: &dyn DevicePlatform) -> CompatibilityReport {
    let profile = platform.profile();

    if !platform.request_camera_access().await.is_granted() {
        tracing::info!(device = %profile.summary(), "camera permission denied");
        return CompatibilityReport {
            device: profile,
            blockers: vec![Blocker::CameraDenied],
        };
    }

    if !platform.request_motion_access().await.is_granted() {
        tracing::info!(device = %profile.summary(), "motion permission denied");
        return CompatibilityReport {
            device: profile,
            blockers: vec![Blocker::MotionDenied],
        };
    }

    CompatibilityReport::clear(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Grant;
    use async_trait::async_trait;
    use parallax_types::{BrowserFamily, FormFactor, OsFamily};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn eligible_profile() -> DeviceProfile {
        DeviceProfile {
            form_factor: FormFactor::Phone,
            os: OsFamily::Ios,
            browser: BrowserFamily::Safari,
            browser_major: 17,
            has_camera_api: true,
            has_motion_api: true,
        }
    }

    struct ScriptedPlatform {
        profile: DeviceProfile,
        camera: Grant,
        motion: Grant,
        camera_prompts: AtomicU32,
        motion_prompts: AtomicU32,
    }

    impl ScriptedPlatform {
        fn new(camera: Grant, motion: Grant) -> Self {
            Self {
                profile: eligible_profile(),
                camera,
                motion,
                camera_prompts: AtomicU32::new(0),
                motion_prompts: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl DevicePlatform for ScriptedPlatform {
        fn profile(&self) -> DeviceProfile {
            self.profile.clone()
        }

        async fn request_camera_access(&self) -> Grant {
            self.camera_prompts.fetch_add(1, Ordering::SeqCst);
            self.camera
        }

        async fn request_motion_access(&self) -> Grant {
            self.motion_prompts.fetch_add(1, Ordering::SeqCst);
            self.motion
        }
    }

    #[test]
    fn baseline_passes_modern_phone() {
        let report = check_baseline(&eligible_profile());
        assert!(report.compatible());
        assert!(report.errors().is_empty());
    }

    #[test]
    fn baseline_rejects_desktop_with_specific_error() {
        let mut profile = eligible_profile();
        profile.form_factor = FormFactor::Desktop;
        profile.os = OsFamily::MacOs;
        let report = check_baseline(&profile);
        assert!(!report.compatible());
        assert_eq!(
            report.blockers,
            vec![Blocker::NotHandheld(FormFactor::Desktop)]
        );
        assert!(report.errors()[0].contains("desktop"));
    }

    #[test]
    fn baseline_rejects_outdated_browser() {
        let mut profile = eligible_profile();
        profile.browser_major = 14;
        let report = check_baseline(&profile);
        assert_eq!(
            report.blockers,
            vec![Blocker::OutdatedBrowser {
                family: BrowserFamily::Safari,
                major: 14,
                minimum: 15,
            }]
        );
    }

    #[test]
    fn baseline_rejects_unknown_browser() {
        let mut profile = eligible_profile();
        profile.browser = BrowserFamily::Other;
        let report = check_baseline(&profile);
        assert_eq!(
            report.blockers,
            vec![Blocker::UnsupportedBrowser(BrowserFamily::Other)]
        );
    }

    #[test]
    fn baseline_collects_every_blocker() {
        let profile = DeviceProfile {
            form_factor: FormFactor::Desktop,
            os: OsFamily::Windows,
            browser: BrowserFamily::Chrome,
            browser_major: 60,
            has_camera_api: false,
            has_motion_api: false,
        };
        let report = check_baseline(&profile);
        assert_eq!(report.blockers.len(), 4);
    }

    #[tokio::test]
    async fn permission_pass_grants_both() {
        let platform = ScriptedPlatform::new(Grant::Granted, Grant::Granted);
        let report = check_with_permissions(&platform).await;
        assert!(report.compatible());
        assert_eq!(platform.camera_prompts.load(Ordering::SeqCst), 1);
        assert_eq!(platform.motion_prompts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn camera_denial_skips_motion_prompt() {
        let platform = ScriptedPlatform::new(Grant::Denied, Grant::Granted);
        let report = check_with_permissions(&platform).await;
        assert_eq!(report.blockers, vec![Blocker::CameraDenied]);
        assert_eq!(platform.motion_prompts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn motion_denial_is_its_own_blocker() {
        let platform = ScriptedPlatform::new(Grant::Granted, Grant::Denied);
        let report = check_with_permissions(&platform).await;
        assert_eq!(report.blockers, vec![Blocker::MotionDenied]);
    }

    #[tokio::test]
    async fn denial_is_not_cached_between_attempts() {
        let platform = ScriptedPlatform::new(Grant::Denied, Grant::Granted);
        let first = check_with_permissions(&platform).await;
        let second = check_with_permissions(&platform).await;
        assert_eq!(first, second);
        // Both attempts prompted; nothing remembered the first refusal.
        assert_eq!(platform.camera_prompts.load(Ordering::SeqCst), 2);
    }
}
