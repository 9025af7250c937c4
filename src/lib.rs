//! Harthio layout - device-aware video call layout
//!
//! This crate classifies the local device into a serializable descriptor,
//! coordinates smooth orientation transitions without touching the media
//! stream, and decides how a remote peer's video is fitted on screen.

pub mod config;
pub mod device;
pub mod error;
pub mod events;
pub mod orientation;
pub mod utils;

pub use device::DeviceDescriptor;
pub use error::{AppError, Result};
pub use orientation::{compute_layout, OrientationCoordinator, VideoLayoutConfig};
