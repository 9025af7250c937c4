use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Main application configuration
#[typeshare]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Orientation coordinator settings
    pub coordinator: CoordinatorConfig,
    /// Remote descriptor freshness settings
    pub freshness: FreshnessConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Orientation coordinator configuration
///
/// Fixed when the coordinator is first constructed.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Quiet period after the last viewport signal before recomputing
    pub debounce_ms: u32,
    /// Length of the transition window
    pub transition_duration_ms: u32,
    /// When false, transitions end as soon as they start
    pub enable_smooth_transitions: bool,
    /// Orientation changes never require reacquiring the camera stream
    pub preserve_video_stream: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            transition_duration_ms: 500,
            enable_smooth_transitions: true,
            preserve_video_stream: true,
        }
    }
}

/// Freshness of descriptors received from the remote peer
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessConfig {
    /// Descriptors older than this should be recaptured
    pub max_age_secs: u32,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self { max_age_secs: 30 }
    }
}

/// Logging configuration
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum seconds between repeated subscriber failure warnings
    pub subscriber_log_throttle_secs: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            subscriber_log_throttle_secs: 5,
        }
    }
}
