//! Device descriptor builder
//!
//! Turns the local viewport, user-agent and touch support into a
//! [`DeviceDescriptor`] that is exchanged with the remote peer.

pub mod descriptor;
pub mod types;
pub mod viewport;

pub use descriptor::DeviceDescriptor;
pub use types::{AspectRatio, DeviceClass, Orientation, VideoTier, ViewportSizeClass};
pub use viewport::{NoViewport, SharedViewport, Viewport, ViewportSignal, ViewportSource};
