//! Video layout decisions for a (local, remote) descriptor pair

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::device::{AspectRatio, DeviceClass, DeviceDescriptor, ViewportSizeClass};

/// How the remote video is fitted into the local container
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitStrategy {
    /// Fill the container, same orientation on both sides
    Fill,
    /// Full remote frame with bars above and below
    Letterbox,
    /// Full remote frame with bars left and right
    Pillarbox,
    /// Fill the container, cropping the overflow
    Crop,
}

impl FitStrategy {
    /// CSS `object-fit` value
    pub fn object_fit(&self) -> &'static str {
        match self {
            FitStrategy::Fill | FitStrategy::Crop => "cover",
            FitStrategy::Letterbox | FitStrategy::Pillarbox => "contain",
        }
    }
}

/// Container sizing rule
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerSize {
    /// Small viewports, tightest bound
    Constrained,
    Standard,
    /// Large viewports, loosest bound
    Expanded,
}

impl ContainerSize {
    /// Share of the viewport height the video container may occupy
    pub fn max_viewport_fraction(&self) -> f64 {
        match self {
            ContainerSize::Constrained => 0.6,
            ContainerSize::Standard => 0.75,
            ContainerSize::Expanded => 0.9,
        }
    }
}

/// Call control touch target size
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchTargetSize {
    Compact,
    Medium,
    Large,
}

impl TouchTargetSize {
    /// Minimum edge length in CSS pixels
    pub fn min_px(&self) -> u32 {
        match self {
            TouchTargetSize::Compact => 44,
            TouchTargetSize::Medium => 48,
            TouchTargetSize::Large => 56,
        }
    }
}

/// Layout consumed by the video rendering component
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoLayoutConfig {
    pub container: ContainerSize,
    pub fit_strategy: FitStrategy,
    /// Remote peer's aspect ratio
    pub aspect_ratio_hint: AspectRatio,
    pub touch_target_size: TouchTargetSize,
}

/// Compute the layout for showing `remote` video on the `local` device.
///
/// Pure; does not touch coordinator state. Remote descriptors are taken
/// as-is, validating them is the signaling layer's job.
pub fn compute_layout(local: &DeviceDescriptor, remote: &DeviceDescriptor) -> VideoLayoutConfig {
    let (container, touch_target_size) = match local.viewport_size_class {
        ViewportSizeClass::Small => (ContainerSize::Constrained, TouchTargetSize::Compact),
        ViewportSizeClass::Medium => (ContainerSize::Standard, TouchTargetSize::Medium),
        ViewportSizeClass::Large => (ContainerSize::Expanded, TouchTargetSize::Large),
    };

    VideoLayoutConfig {
        container,
        fit_strategy: fit_strategy(local, remote),
        aspect_ratio_hint: remote.aspect_ratio,
        touch_target_size,
    }
}

fn fit_strategy(local: &DeviceDescriptor, remote: &DeviceDescriptor) -> FitStrategy {
    match (local.device_class, remote.device_class) {
        // Never crop wide desktop content on a phone
        (DeviceClass::Mobile, DeviceClass::Desktop) => FitStrategy::Letterbox,
        (DeviceClass::Desktop, DeviceClass::Mobile) => FitStrategy::Pillarbox,
        _ if local.orientation == remote.orientation => FitStrategy::Fill,
        _ => FitStrategy::Letterbox,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Orientation, VideoTier};
    use chrono::Utc;

    fn descriptor(
        device_class: DeviceClass,
        orientation: Orientation,
        viewport_size_class: ViewportSizeClass,
        aspect_ratio: AspectRatio,
    ) -> DeviceDescriptor {
        DeviceDescriptor {
            device_class,
            orientation,
            aspect_ratio,
            viewport_size_class,
            preferred_video_tier: VideoTier::Medium,
            captured_at: Utc::now(),
        }
    }

    fn mobile_portrait() -> DeviceDescriptor {
        descriptor(
            DeviceClass::Mobile,
            Orientation::Portrait,
            ViewportSizeClass::Small,
            AspectRatio::Tall9x16,
        )
    }

    fn desktop_landscape() -> DeviceDescriptor {
        descriptor(
            DeviceClass::Desktop,
            Orientation::Landscape,
            ViewportSizeClass::Large,
            AspectRatio::Wide16x9,
        )
    }

    #[test]
    fn test_fit_strategy_truth_table() {
        let tablet_landscape = descriptor(
            DeviceClass::Tablet,
            Orientation::Landscape,
            ViewportSizeClass::Large,
            AspectRatio::Standard4x3,
        );

        assert_eq!(
            compute_layout(&mobile_portrait(), &desktop_landscape()).fit_strategy,
            FitStrategy::Letterbox
        );
        assert_eq!(
            compute_layout(&desktop_landscape(), &mobile_portrait()).fit_strategy,
            FitStrategy::Pillarbox
        );
        assert_eq!(
            compute_layout(&desktop_landscape(), &desktop_landscape()).fit_strategy,
            FitStrategy::Fill
        );
        assert_eq!(
            compute_layout(&mobile_portrait(), &tablet_landscape).fit_strategy,
            FitStrategy::Letterbox
        );
    }

    #[test]
    fn test_device_class_rules_win_over_orientation() {
        // A landscape phone watching a landscape desktop still letterboxes
        let mobile_landscape = descriptor(
            DeviceClass::Mobile,
            Orientation::Landscape,
            ViewportSizeClass::Small,
            AspectRatio::Wide16x9,
        );
        assert_eq!(
            compute_layout(&mobile_landscape, &desktop_landscape()).fit_strategy,
            FitStrategy::Letterbox
        );
    }

    #[test]
    fn test_sizing_follows_local_viewport() {
        let layout = compute_layout(&mobile_portrait(), &desktop_landscape());
        assert_eq!(layout.container, ContainerSize::Constrained);
        assert_eq!(layout.touch_target_size, TouchTargetSize::Compact);
        assert_eq!(layout.aspect_ratio_hint, AspectRatio::Wide16x9);

        let layout = compute_layout(&desktop_landscape(), &mobile_portrait());
        assert_eq!(layout.container, ContainerSize::Expanded);
        assert_eq!(layout.touch_target_size, TouchTargetSize::Large);
        assert_eq!(layout.aspect_ratio_hint, AspectRatio::Tall9x16);

        let medium = descriptor(
            DeviceClass::Tablet,
            Orientation::Portrait,
            ViewportSizeClass::Medium,
            AspectRatio::Standard3x4,
        );
        let layout = compute_layout(&medium, &mobile_portrait());
        assert_eq!(layout.container, ContainerSize::Standard);
        assert_eq!(layout.touch_target_size, TouchTargetSize::Medium);
        assert_eq!(layout.fit_strategy, FitStrategy::Fill);
    }

    #[test]
    fn test_compute_layout_is_pure() {
        let local = mobile_portrait();
        let remote = desktop_landscape();
        assert_eq!(compute_layout(&local, &remote), compute_layout(&local, &remote));
    }

    #[test]
    fn test_rendering_hints() {
        assert_eq!(FitStrategy::Letterbox.object_fit(), "contain");
        assert_eq!(FitStrategy::Fill.object_fit(), "cover");
        assert!(TouchTargetSize::Compact.min_px() >= 44);
        assert!(
            ContainerSize::Constrained.max_viewport_fraction()
                < ContainerSize::Expanded.max_viewport_fraction()
        );
    }
}
