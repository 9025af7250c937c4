//! Orientation transition state and easing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::device::{DeviceDescriptor, Orientation};

/// Snapshot of the coordinator state handed to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrientationTransitionState {
    /// Local descriptor
    pub current: DeviceDescriptor,
    /// Descriptor before the in-flight transition
    pub previous: Option<DeviceDescriptor>,
    pub is_transitioning: bool,
    /// Set only while transitioning
    pub transition_started_at: Option<DateTime<Utc>>,
}

impl OrientationTransitionState {
    /// Stable state around `current`
    pub fn stable(current: DeviceDescriptor) -> Self {
        Self {
            current,
            previous: None,
            is_transitioning: false,
            transition_started_at: None,
        }
    }

    /// Whether the in-flight transition flips orientation
    pub fn is_orientation_flip(&self) -> bool {
        match &self.previous {
            Some(previous) => self.is_transitioning && previous.orientation != self.current.orientation,
            None => false,
        }
    }

    /// Rotation for the video container at `eased_progress`
    pub fn rotation_degrees(&self, eased_progress: f64) -> f64 {
        match (&self.previous, self.is_transitioning) {
            (Some(previous), true) => {
                rotation_degrees(previous.orientation, self.current.orientation, eased_progress)
            }
            _ => 0.0,
        }
    }
}

/// Cubic ease-in-out over `t` in [0, 1]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// CSS rotation applied while the layout animates between orientations.
///
/// Starts at ±90° and unwinds to 0 as progress reaches 1. Turning to
/// landscape starts at -90°, turning to portrait at +90°.
pub fn rotation_degrees(from: Orientation, to: Orientation, eased_progress: f64) -> f64 {
    let remaining = 1.0 - eased_progress.clamp(0.0, 1.0);
    match (from, to) {
        (Orientation::Portrait, Orientation::Landscape) => -90.0 * remaining,
        (Orientation::Landscape, Orientation::Portrait) => 90.0 * remaining,
        _ => 0.0,
    }
}
