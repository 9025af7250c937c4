//! Viewport environment abstraction
//!
//! The descriptor builder and the coordinator never read a browser window
//! directly. Hosts expose the local viewport through [`ViewportSource`]:
//! a WASM shell forwards `resize`, `orientationchange` and Visual Viewport
//! `resize` events, a server-side renderer uses [`NoViewport`].

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Signal channel capacity; bursts beyond this are coalesced anyway
const SIGNAL_CHANNEL_CAPACITY: usize = 64;

/// Raw environment readings for one capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Viewport width in CSS pixels
    pub width: u32,
    /// Viewport height in CSS pixels
    pub height: u32,
    /// `navigator.userAgent`
    pub user_agent: String,
    /// Whether touch input is available (`ontouchstart` or max touch points)
    pub touch: bool,
}

impl Viewport {
    pub fn new(width: u32, height: u32, user_agent: impl Into<String>, touch: bool) -> Self {
        Self {
            width,
            height,
            user_agent: user_agent.into(),
            touch,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// Environment change signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportSignal {
    /// Window `resize`
    Resize,
    /// `orientationchange`
    OrientationChange,
    /// Visual Viewport `resize` (mobile browser chrome show/hide)
    VisualViewportResize,
}

/// Source of the local viewport
pub trait ViewportSource: Send + Sync {
    /// Current readings, or `None` outside a browser context
    fn snapshot(&self) -> Option<Viewport>;

    /// Subscribe to change signals, or `None` if the environment has none
    fn signals(&self) -> Option<broadcast::Receiver<ViewportSignal>>;
}

/// Environment without a viewport (server rendering, headless tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoViewport;

impl ViewportSource for NoViewport {
    fn snapshot(&self) -> Option<Viewport> {
        None
    }

    fn signals(&self) -> Option<broadcast::Receiver<ViewportSignal>> {
        None
    }
}

/// In-memory viewport updated by the host
///
/// Every update stores the new readings and broadcasts the given signal to
/// listeners, the same way a browser fires `resize` after the window
/// dimensions have changed.
pub struct SharedViewport {
    current: RwLock<Viewport>,
    signal_tx: broadcast::Sender<ViewportSignal>,
}

impl SharedViewport {
    pub fn new(initial: Viewport) -> Self {
        let (signal_tx, _) = broadcast::channel(SIGNAL_CHANNEL_CAPACITY);
        Self {
            current: RwLock::new(initial),
            signal_tx,
        }
    }

    /// Replace the readings and emit `signal`
    pub fn update(&self, viewport: Viewport, signal: ViewportSignal) {
        *self.current.write() = viewport;
        // No listener attached yet is fine
        let _ = self.signal_tx.send(signal);
    }

    /// Change only the dimensions, keeping user-agent and touch support.
    ///
    /// Emits `OrientationChange` when the dimensions flip orientation,
    /// `Resize` otherwise.
    pub fn resize(&self, width: u32, height: u32) {
        let signal = {
            let mut current = self.current.write();
            let flipped = (current.width > current.height) != (width > height);
            current.width = width;
            current.height = height;
            if flipped {
                ViewportSignal::OrientationChange
            } else {
                ViewportSignal::Resize
            }
        };
        let _ = self.signal_tx.send(signal);
    }

    /// Number of attached listeners
    pub fn listener_count(&self) -> usize {
        self.signal_tx.receiver_count()
    }
}

impl ViewportSource for SharedViewport {
    fn snapshot(&self) -> Option<Viewport> {
        Some(self.current.read().clone())
    }

    fn signals(&self) -> Option<broadcast::Receiver<ViewportSignal>> {
        Some(self.signal_tx.subscribe())
    }
}
