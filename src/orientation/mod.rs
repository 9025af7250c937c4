//! Orientation transition coordination and video layout
//!
//! [`OrientationCoordinator`] keeps the local descriptor current and runs
//! the transition window; [`compute_layout`] combines a local and a remote
//! descriptor into the [`VideoLayoutConfig`] used by the video UI.

pub mod coordinator;
pub mod layout;
pub mod state;

pub use coordinator::{OrientationCoordinator, Subscription};
pub use layout::{compute_layout, ContainerSize, FitStrategy, TouchTargetSize, VideoLayoutConfig};
pub use state::{ease_in_out_cubic, rotation_degrees, OrientationTransitionState};
