//! Device classification types
//!
//! These are the fields of a [`DeviceDescriptor`](super::DeviceDescriptor)
//! and travel to the remote peer over the signaling channel, so every type
//! here is serde-serializable and exported to TypeScript.

use serde::{Deserialize, Serialize};
use std::fmt;
use typeshare::typeshare;

/// Broad device class
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceClass::Mobile => write!(f, "mobile"),
            DeviceClass::Tablet => write!(f, "tablet"),
            DeviceClass::Desktop => write!(f, "desktop"),
        }
    }
}

/// Screen orientation, derived purely from width > height
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Landscape => write!(f, "landscape"),
        }
    }
}

/// Canonical aspect ratio label
///
/// Serialized as the ratio label (`"16/9"`, `"18.5/9"`, ...) so the remote
/// peer can apply it directly as a CSS hint.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16/9")]
    Wide16x9,
    #[serde(rename = "9/16")]
    Tall9x16,
    #[serde(rename = "4/3")]
    Standard4x3,
    #[serde(rename = "3/4")]
    Standard3x4,
    #[serde(rename = "21/9")]
    Ultrawide21x9,
    #[serde(rename = "18.5/9")]
    Phone18_5x9,
}

impl AspectRatio {
    /// Candidates in matching order; the first one within tolerance wins.
    pub const CANDIDATES: [AspectRatio; 6] = [
        AspectRatio::Wide16x9,
        AspectRatio::Tall9x16,
        AspectRatio::Standard4x3,
        AspectRatio::Standard3x4,
        AspectRatio::Ultrawide21x9,
        AspectRatio::Phone18_5x9,
    ];

    /// Numeric width / height value
    pub fn value(&self) -> f64 {
        match self {
            AspectRatio::Wide16x9 => 16.0 / 9.0,
            AspectRatio::Tall9x16 => 9.0 / 16.0,
            AspectRatio::Standard4x3 => 4.0 / 3.0,
            AspectRatio::Standard3x4 => 3.0 / 4.0,
            AspectRatio::Ultrawide21x9 => 21.0 / 9.0,
            AspectRatio::Phone18_5x9 => 18.5 / 9.0,
        }
    }

    /// Label as exchanged with peers
    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Wide16x9 => "16/9",
            AspectRatio::Tall9x16 => "9/16",
            AspectRatio::Standard4x3 => "4/3",
            AspectRatio::Standard3x4 => "3/4",
            AspectRatio::Ultrawide21x9 => "21/9",
            AspectRatio::Phone18_5x9 => "18.5/9",
        }
    }

    /// Value for the CSS `aspect-ratio` property
    pub fn css_value(&self) -> &'static str {
        match self {
            AspectRatio::Wide16x9 => "16 / 9",
            AspectRatio::Tall9x16 => "9 / 16",
            AspectRatio::Standard4x3 => "4 / 3",
            AspectRatio::Standard3x4 => "3 / 4",
            AspectRatio::Ultrawide21x9 => "21 / 9",
            AspectRatio::Phone18_5x9 => "18.5 / 9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Viewport area bucket
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportSizeClass {
    Small,
    Medium,
    Large,
}

/// Recommended video quality tier
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for VideoTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoTier::Low => write!(f, "low"),
            VideoTier::Medium => write!(f, "medium"),
            VideoTier::High => write!(f, "high"),
        }
    }
}
