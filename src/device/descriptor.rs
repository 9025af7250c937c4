//! Device descriptor builder
//!
//! Classifies the local viewport into a compact [`DeviceDescriptor`] that
//! both peers of a call exchange over signaling. Classification is a pure
//! function of (width, height, user-agent, touch); only `captured_at`
//! depends on when it ran.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use super::types::{AspectRatio, DeviceClass, Orientation, VideoTier, ViewportSizeClass};
use super::viewport::{Viewport, ViewportSource};

/// Widest viewport that counts as a phone when touch is present
pub const MOBILE_MAX_WIDTH: u32 = 768;
/// Widest viewport that counts as a tablet when touch is present
pub const TABLET_MAX_WIDTH: u32 = 1024;

/// Maximum |ratio - candidate| for a canonical aspect ratio match
pub const ASPECT_RATIO_TOLERANCE: f64 = 0.1;

/// Area below which a viewport is `Small`
pub const SMALL_AREA_THRESHOLD: u64 = 400_000;
/// Area below which a viewport is `Medium`
pub const MEDIUM_AREA_THRESHOLD: u64 = 800_000;

/// Longest side below which a phone gets the `Low` tier
pub const LOW_TIER_MAX_DIMENSION: u32 = 800;
/// Longest side below which a tablet gets the `Medium` tier
pub const TABLET_MEDIUM_TIER_MAX_DIMENSION: u32 = 1200;

/// Age after which a descriptor should be recaptured
pub const DESCRIPTOR_MAX_AGE_SECS: i64 = 30;

const MOBILE_UA_TOKENS: &[&str] = &["iphone", "ipod", "blackberry", "iemobile", "opera mini", "webos"];
const TABLET_UA_TOKENS: &[&str] = &["ipad", "tablet", "kindle", "silk", "playbook"];

/// Summary of one party's screen characteristics relevant to video layout
#[typeshare]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub device_class: DeviceClass,
    pub orientation: Orientation,
    pub aspect_ratio: AspectRatio,
    pub viewport_size_class: ViewportSizeClass,
    pub preferred_video_tier: VideoTier,
    /// Capture time, used only to judge freshness
    #[typeshare(serialized_as = "String")]
    pub captured_at: DateTime<Utc>,
}

impl DeviceDescriptor {
    /// Capture the descriptor of the local environment.
    ///
    /// Never fails: without a viewport (server rendering) this returns
    /// [`DeviceDescriptor::server_default`].
    pub fn capture(source: &dyn ViewportSource) -> Self {
        match source.snapshot() {
            Some(viewport) => Self::classify(&viewport),
            None => Self::server_default(),
        }
    }

    /// Classify explicit viewport readings
    pub fn classify(viewport: &Viewport) -> Self {
        Self::classify_at(viewport, Utc::now())
    }

    /// Classify with an explicit capture time
    pub fn classify_at(viewport: &Viewport, captured_at: DateTime<Utc>) -> Self {
        let device_class = classify_device(viewport);
        let orientation = Orientation::from_dimensions(viewport.width, viewport.height);
        let aspect_ratio = match_aspect_ratio(viewport.width, viewport.height)
            .unwrap_or_else(|| fallback_aspect_ratio(device_class, orientation));

        Self {
            device_class,
            orientation,
            aspect_ratio,
            viewport_size_class: classify_viewport_size(viewport.area()),
            preferred_video_tier: preferred_tier(device_class, viewport.max_dimension()),
            captured_at,
        }
    }

    /// Fixed descriptor used outside a browser context
    pub fn server_default() -> Self {
        Self {
            device_class: DeviceClass::Desktop,
            orientation: Orientation::Landscape,
            aspect_ratio: AspectRatio::Wide16x9,
            viewport_size_class: ViewportSizeClass::Large,
            preferred_video_tier: VideoTier::High,
            captured_at: Utc::now(),
        }
    }

    /// Equal in every field except `captured_at`
    pub fn same_classification(&self, other: &Self) -> bool {
        !self.differs_meaningfully(other) && self.preferred_video_tier == other.preferred_video_tier
    }

    /// Whether `other` warrants a layout transition.
    ///
    /// Pixel jitter that keeps orientation, class, ratio and size bucket
    /// (mobile browser chrome showing/hiding) is not a change.
    pub fn differs_meaningfully(&self, other: &Self) -> bool {
        self.orientation != other.orientation
            || self.device_class != other.device_class
            || self.aspect_ratio != other.aspect_ratio
            || self.viewport_size_class != other.viewport_size_class
    }

    /// Age relative to `now`
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now - self.captured_at
    }

    /// Captured within the default 30 second window
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }

    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        self.is_fresh_within(now, Duration::seconds(DESCRIPTOR_MAX_AGE_SECS))
    }

    /// Captured within `max_age` of `now`
    pub fn is_fresh_within(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age_at(now) <= max_age
    }
}

fn ua_matches(user_agent: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|token| user_agent.contains(token))
}

fn is_mobile_user_agent(user_agent: &str) -> bool {
    ua_matches(user_agent, MOBILE_UA_TOKENS)
        || (user_agent.contains("android") && user_agent.contains("mobile"))
}

fn is_tablet_user_agent(user_agent: &str) -> bool {
    ua_matches(user_agent, TABLET_UA_TOKENS)
        || (user_agent.contains("android") && !user_agent.contains("mobile"))
}

/// User-agent tokens first, then width combined with touch support
pub fn classify_device(viewport: &Viewport) -> DeviceClass {
    let ua = viewport.user_agent.to_ascii_lowercase();

    if is_mobile_user_agent(&ua) || (viewport.width <= MOBILE_MAX_WIDTH && viewport.touch) {
        DeviceClass::Mobile
    } else if is_tablet_user_agent(&ua)
        || (viewport.width > MOBILE_MAX_WIDTH && viewport.width <= TABLET_MAX_WIDTH && viewport.touch)
    {
        DeviceClass::Tablet
    } else {
        DeviceClass::Desktop
    }
}

/// First canonical ratio within tolerance, in candidate order
pub fn match_aspect_ratio(width: u32, height: u32) -> Option<AspectRatio> {
    if height == 0 {
        return None;
    }
    let ratio = width as f64 / height as f64;
    AspectRatio::CANDIDATES
        .into_iter()
        .find(|candidate| (ratio - candidate.value()).abs() < ASPECT_RATIO_TOLERANCE)
}

/// Ratio used when no canonical ratio is close enough
pub fn fallback_aspect_ratio(device_class: DeviceClass, orientation: Orientation) -> AspectRatio {
    match (device_class, orientation) {
        (DeviceClass::Mobile, Orientation::Portrait) => AspectRatio::Tall9x16,
        (DeviceClass::Mobile, Orientation::Landscape) => AspectRatio::Wide16x9,
        (DeviceClass::Tablet, Orientation::Portrait) => AspectRatio::Standard3x4,
        (DeviceClass::Tablet, Orientation::Landscape) => AspectRatio::Standard4x3,
        (DeviceClass::Desktop, _) => AspectRatio::Wide16x9,
    }
}

pub fn classify_viewport_size(area: u64) -> ViewportSizeClass {
    if area < SMALL_AREA_THRESHOLD {
        ViewportSizeClass::Small
    } else if area < MEDIUM_AREA_THRESHOLD {
        ViewportSizeClass::Medium
    } else {
        ViewportSizeClass::Large
    }
}

/// Tier from device class and the longest viewport side.
///
/// Only the longest side counts, so a tall phone (375x812) lands in
/// `Medium` rather than `Low`.
pub fn preferred_tier(device_class: DeviceClass, max_dimension: u32) -> VideoTier {
    match device_class {
        DeviceClass::Mobile if max_dimension < LOW_TIER_MAX_DIMENSION => VideoTier::Low,
        DeviceClass::Mobile => VideoTier::Medium,
        DeviceClass::Tablet if max_dimension < TABLET_MEDIUM_TIER_MAX_DIMENSION => VideoTier::Medium,
        _ => VideoTier::High,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::viewport::NoViewport;

    const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const IPAD_UA: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/604.1";
    const ANDROID_PHONE_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Mobile Safari/537.36";
    const ANDROID_TABLET_UA: &str = "Mozilla/5.0 (Linux; Android 14; SM-X710) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
    const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    #[test]
    fn test_tall_iphone_scenario() {
        let descriptor = DeviceDescriptor::classify(&Viewport::new(375, 812, IPHONE_UA, true));

        assert_eq!(descriptor.device_class, DeviceClass::Mobile);
        assert_eq!(descriptor.orientation, Orientation::Portrait);
        // 0.4618 is just outside 0.1 of 9/16, so this is the fallback
        assert_eq!(match_aspect_ratio(375, 812), None);
        assert_eq!(descriptor.aspect_ratio, AspectRatio::Tall9x16);
        assert_eq!(descriptor.viewport_size_class, ViewportSizeClass::Small);
        // 812 is not < 800
        assert_eq!(descriptor.preferred_video_tier, VideoTier::Medium);
    }

    #[test]
    fn test_full_hd_desktop_scenario() {
        let descriptor = DeviceDescriptor::classify(&Viewport::new(1920, 1080, DESKTOP_UA, false));

        assert_eq!(descriptor.device_class, DeviceClass::Desktop);
        assert_eq!(descriptor.orientation, Orientation::Landscape);
        assert_eq!(descriptor.aspect_ratio, AspectRatio::Wide16x9);
        assert_eq!(descriptor.viewport_size_class, ViewportSizeClass::Large);
        assert_eq!(descriptor.preferred_video_tier, VideoTier::High);
    }

    #[test]
    fn test_ipad_portrait() {
        let descriptor = DeviceDescriptor::classify(&Viewport::new(820, 1180, IPAD_UA, true));

        assert_eq!(descriptor.device_class, DeviceClass::Tablet);
        assert_eq!(descriptor.orientation, Orientation::Portrait);
        assert_eq!(descriptor.aspect_ratio, AspectRatio::Standard3x4);
        assert_eq!(descriptor.viewport_size_class, ViewportSizeClass::Large);
        assert_eq!(descriptor.preferred_video_tier, VideoTier::Medium);
    }

    #[test]
    fn test_android_user_agents() {
        let phone = Viewport::new(1080, 2400, ANDROID_PHONE_UA, true);
        assert_eq!(classify_device(&phone), DeviceClass::Mobile);

        let tablet = Viewport::new(1280, 800, ANDROID_TABLET_UA, true);
        assert_eq!(classify_device(&tablet), DeviceClass::Tablet);
    }

    #[test]
    fn test_touch_width_classification() {
        // Unknown UA falls back to width + touch
        assert_eq!(classify_device(&Viewport::new(768, 1024, "", true)), DeviceClass::Mobile);
        assert_eq!(classify_device(&Viewport::new(769, 1024, "", true)), DeviceClass::Tablet);
        assert_eq!(classify_device(&Viewport::new(1024, 768, "", true)), DeviceClass::Tablet);
        assert_eq!(classify_device(&Viewport::new(1025, 768, "", true)), DeviceClass::Desktop);
        // Narrow window without touch is still a desktop
        assert_eq!(classify_device(&Viewport::new(500, 900, DESKTOP_UA, false)), DeviceClass::Desktop);
    }

    #[test]
    fn test_aspect_ratio_candidate_order() {
        assert_eq!(match_aspect_ratio(1920, 1080), Some(AspectRatio::Wide16x9));
        assert_eq!(match_aspect_ratio(1080, 1920), Some(AspectRatio::Tall9x16));
        assert_eq!(match_aspect_ratio(1024, 768), Some(AspectRatio::Standard4x3));
        assert_eq!(match_aspect_ratio(768, 1024), Some(AspectRatio::Standard3x4));
        assert_eq!(match_aspect_ratio(2560, 1080), Some(AspectRatio::Ultrawide21x9));
        // 2.0 is within 0.1 of 18.5/9 but not of 16/9 or 21/9
        assert_eq!(match_aspect_ratio(2000, 1000), Some(AspectRatio::Phone18_5x9));
        // Square matches nothing
        assert_eq!(match_aspect_ratio(1000, 1000), None);
        assert_eq!(match_aspect_ratio(1000, 0), None);
    }

    #[test]
    fn test_fallback_table() {
        assert_eq!(
            fallback_aspect_ratio(DeviceClass::Mobile, Orientation::Landscape),
            AspectRatio::Wide16x9
        );
        assert_eq!(
            fallback_aspect_ratio(DeviceClass::Tablet, Orientation::Portrait),
            AspectRatio::Standard3x4
        );
        assert_eq!(
            fallback_aspect_ratio(DeviceClass::Tablet, Orientation::Landscape),
            AspectRatio::Standard4x3
        );
        assert_eq!(
            fallback_aspect_ratio(DeviceClass::Desktop, Orientation::Portrait),
            AspectRatio::Wide16x9
        );
    }

    #[test]
    fn test_viewport_size_thresholds() {
        assert_eq!(classify_viewport_size(399_999), ViewportSizeClass::Small);
        assert_eq!(classify_viewport_size(400_000), ViewportSizeClass::Medium);
        assert_eq!(classify_viewport_size(799_999), ViewportSizeClass::Medium);
        assert_eq!(classify_viewport_size(800_000), ViewportSizeClass::Large);
    }

    #[test]
    fn test_preferred_tier_thresholds() {
        assert_eq!(preferred_tier(DeviceClass::Mobile, 799), VideoTier::Low);
        assert_eq!(preferred_tier(DeviceClass::Mobile, 800), VideoTier::Medium);
        assert_eq!(preferred_tier(DeviceClass::Tablet, 1199), VideoTier::Medium);
        assert_eq!(preferred_tier(DeviceClass::Tablet, 1200), VideoTier::High);
        assert_eq!(preferred_tier(DeviceClass::Desktop, 640), VideoTier::High);
    }

    #[test]
    fn test_orientation_and_labels_hold_for_all_sizes() {
        for width in (100..=3000).step_by(137) {
            for height in (100..=3000).step_by(149) {
                let descriptor = DeviceDescriptor::classify(&Viewport::new(width, height, "", true));
                let expected = if width > height {
                    Orientation::Landscape
                } else {
                    Orientation::Portrait
                };
                assert_eq!(descriptor.orientation, expected, "{}x{}", width, height);
                assert!(AspectRatio::CANDIDATES.contains(&descriptor.aspect_ratio));
            }
        }
    }

    #[test]
    fn test_classification_is_idempotent() {
        let viewport = Viewport::new(1366, 768, DESKTOP_UA, false);
        let first = DeviceDescriptor::classify(&viewport);
        let second = DeviceDescriptor::classify(&viewport);
        assert!(first.same_classification(&second));
    }

    #[test]
    fn test_server_default() {
        let descriptor = DeviceDescriptor::capture(&NoViewport);
        assert_eq!(descriptor.device_class, DeviceClass::Desktop);
        assert_eq!(descriptor.orientation, Orientation::Landscape);
        assert_eq!(descriptor.aspect_ratio, AspectRatio::Wide16x9);
        assert_eq!(descriptor.viewport_size_class, ViewportSizeClass::Large);
        assert_eq!(descriptor.preferred_video_tier, VideoTier::High);
    }

    #[test]
    fn test_meaningful_change_ignores_tier_and_time() {
        let a = DeviceDescriptor::classify(&Viewport::new(375, 812, IPHONE_UA, true));
        // Browser chrome hides: same buckets, different pixels
        let b = DeviceDescriptor::classify(&Viewport::new(375, 760, IPHONE_UA, true));
        assert!(!a.differs_meaningfully(&b));

        let rotated = DeviceDescriptor::classify(&Viewport::new(812, 375, IPHONE_UA, true));
        assert!(a.differs_meaningfully(&rotated));
    }

    #[test]
    fn test_freshness() {
        let captured = Utc::now();
        let descriptor =
            DeviceDescriptor::classify_at(&Viewport::new(1920, 1080, DESKTOP_UA, false), captured);

        assert!(descriptor.is_fresh_at(captured + Duration::seconds(30)));
        assert!(!descriptor.is_fresh_at(captured + Duration::seconds(31)));
        assert!(descriptor.is_fresh_within(captured + Duration::seconds(50), Duration::seconds(60)));
    }

    #[test]
    fn test_wire_shape() {
        let descriptor = DeviceDescriptor::classify(&Viewport::new(375, 812, IPHONE_UA, true));
        let json = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(json["deviceClass"], "mobile");
        assert_eq!(json["orientation"], "portrait");
        assert_eq!(json["aspectRatio"], "9/16");
        assert_eq!(json["viewportSizeClass"], "small");
        assert_eq!(json["preferredVideoTier"], "medium");
        assert!(json["capturedAt"].is_string());

        let decoded: DeviceDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, descriptor);
    }
}
