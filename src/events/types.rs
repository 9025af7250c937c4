//! Layout event types
//!
//! Defines the events broadcast through the event bus.

use serde::{Deserialize, Serialize};

use crate::device::DeviceDescriptor;

/// Layout event enumeration
///
/// Tagged with the event name for serialization:
/// ```json
/// {
///   "event": "orientation.transition_started",
///   "data": { "from": { ... }, "to": { ... }, "duration_ms": 500 }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum LayoutEvent {
    /// A meaningful descriptor change opened a transition window
    #[serde(rename = "orientation.transition_started")]
    TransitionStarted {
        from: DeviceDescriptor,
        to: DeviceDescriptor,
        /// Window length, 0 when smooth transitions are disabled
        duration_ms: u32,
    },

    /// The transition window closed and the layout is stable again
    #[serde(rename = "orientation.transition_ended")]
    TransitionEnded { current: DeviceDescriptor },

    /// A recompute found no meaningful change
    #[serde(rename = "orientation.descriptor_refreshed")]
    DescriptorRefreshed { current: DeviceDescriptor },

    /// A subscriber panicked while being notified
    #[serde(rename = "orientation.subscriber_failed")]
    SubscriberFailed { subscriber_id: u64, message: String },
}

impl LayoutEvent {
    /// Event name as serialized
    pub fn name(&self) -> &'static str {
        match self {
            LayoutEvent::TransitionStarted { .. } => "orientation.transition_started",
            LayoutEvent::TransitionEnded { .. } => "orientation.transition_ended",
            LayoutEvent::DescriptorRefreshed { .. } => "orientation.descriptor_refreshed",
            LayoutEvent::SubscriberFailed { .. } => "orientation.subscriber_failed",
        }
    }
}
