//! Orientation transition coordinator
//!
//! Owns the single [`OrientationTransitionState`] for the local viewport:
//! - trailing-edge debounce of viewport signals
//! - transition window between the previous and current descriptor
//! - subscriber notification with immediate replay on subscribe
//!
//! The camera stream is never part of this: a transition only changes
//! layout state, so callers keep their media stream across rotations.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::layout::{compute_layout, VideoLayoutConfig};
use super::state::{ease_in_out_cubic, OrientationTransitionState};
use crate::config::{AppConfig, CoordinatorConfig};
use crate::device::{DeviceDescriptor, ViewportSignal, ViewportSource};
use crate::events::{EventBus, LayoutEvent};
use crate::utils::LogThrottler;
use crate::warn_throttled;

/// Default interval between repeated warnings for one failing subscriber
const SUBSCRIBER_LOG_THROTTLE_SECS: u64 = 5;

static INSTANCE: OnceLock<OrientationCoordinator> = OnceLock::new();

type Callback = Arc<dyn Fn(&OrientationTransitionState) + Send + Sync>;

struct Subscriber {
    id: u64,
    callback: Callback,
}

/// One outstanding timer per role.
///
/// The generation is bumped whenever the timer is replaced or cancelled, so
/// a timer task that already woke up cannot apply stale work.
#[derive(Default)]
struct TimerSlot {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl TimerSlot {
    /// Abort the pending timer and return the generation for its successor
    fn cancel(&mut self) -> u64 {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation += 1;
        self.generation
    }

    fn is_pending(&self) -> bool {
        self.handle.is_some()
    }
}

struct Inner {
    state: OrientationTransitionState,
    /// Monotonic start of the in-flight transition
    transition_started: Option<Instant>,
    debounce: TimerSlot,
    transition_end: TimerSlot,
    listener: Option<JoinHandle<()>>,
    destroyed: bool,
}

struct Shared {
    config: CoordinatorConfig,
    source: Arc<dyn ViewportSource>,
    inner: Mutex<Inner>,
    subscribers: Mutex<Vec<Subscriber>>,
    next_subscriber_id: AtomicU64,
    recompute_count: AtomicU64,
    events: RwLock<Option<Arc<EventBus>>>,
    throttler: LogThrottler,
}

/// Coordinator handle
///
/// Cheap to clone; all clones share one state timeline. Use
/// [`OrientationCoordinator::instance`] for the process-wide coordinator,
/// or [`OrientationCoordinator::new`] to inject one explicitly.
#[derive(Clone)]
pub struct OrientationCoordinator {
    shared: Arc<Shared>,
}

/// Handle returned by [`OrientationCoordinator::subscribe`]
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop receiving notifications. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.subscribers.lock().retain(|s| s.id != self.id);
        }
    }
}

impl OrientationCoordinator {
    /// Create a coordinator around `source`, capturing the initial descriptor
    pub fn new(config: CoordinatorConfig, source: Arc<dyn ViewportSource>) -> Self {
        Self::with_log_throttle(config, source, SUBSCRIBER_LOG_THROTTLE_SECS)
    }

    /// Create from the application configuration
    pub fn from_app_config(config: &AppConfig, source: Arc<dyn ViewportSource>) -> Self {
        Self::with_log_throttle(
            config.coordinator,
            source,
            config.logging.subscriber_log_throttle_secs as u64,
        )
    }

    fn with_log_throttle(
        config: CoordinatorConfig,
        source: Arc<dyn ViewportSource>,
        throttle_secs: u64,
    ) -> Self {
        let current = DeviceDescriptor::capture(source.as_ref());
        info!(
            "Creating orientation coordinator: {} {} {} (debounce {}ms, transition {}ms, smooth {})",
            current.device_class,
            current.orientation,
            current.aspect_ratio,
            config.debounce_ms,
            config.transition_duration_ms,
            config.enable_smooth_transitions
        );

        Self {
            shared: Arc::new(Shared {
                config,
                source,
                inner: Mutex::new(Inner {
                    state: OrientationTransitionState::stable(current),
                    transition_started: None,
                    debounce: TimerSlot::default(),
                    transition_end: TimerSlot::default(),
                    listener: None,
                    destroyed: false,
                }),
                subscribers: Mutex::new(Vec::new()),
                next_subscriber_id: AtomicU64::new(1),
                recompute_count: AtomicU64::new(0),
                events: RwLock::new(None),
                throttler: LogThrottler::with_secs(throttle_secs),
            }),
        }
    }

    /// Process-wide coordinator.
    ///
    /// The first call constructs it with `config` and `source`; later calls
    /// return the same instance and ignore their arguments.
    pub fn instance(config: CoordinatorConfig, source: Arc<dyn ViewportSource>) -> Self {
        let coordinator = INSTANCE.get_or_init(|| Self::new(config, source));
        if coordinator.config() != &config {
            warn!(
                "Orientation coordinator already configured ({:?}), ignoring {:?}",
                coordinator.config(),
                config
            );
        }
        coordinator.clone()
    }

    /// Process-wide coordinator if it has been created
    pub fn try_instance() -> Option<Self> {
        INSTANCE.get().cloned()
    }

    /// Whether both handles point at the same coordinator
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.shared.config
    }

    /// Orientation changes never require reacquiring the camera stream
    pub fn preserve_video_stream(&self) -> bool {
        self.shared.config.preserve_video_stream
    }

    /// Mirror transitions onto an event bus
    pub fn set_event_bus(&self, events: Arc<EventBus>) {
        *self.shared.events.write() = Some(events);
    }

    /// Attach the environment listener.
    ///
    /// Spawns a task forwarding the source's signals to
    /// [`handle_signal`](Self::handle_signal). No-op when already attached,
    /// destroyed, outside a tokio runtime, or when the source has no signals.
    pub fn start(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.destroyed || inner.listener.is_some() {
            return;
        }
        let Some(mut signals) = self.shared.source.signals() else {
            debug!("Viewport source has no signals, listener not attached");
            return;
        };
        let Ok(runtime) = Handle::try_current() else {
            warn!("No tokio runtime, viewport listener not attached");
            return;
        };

        let weak = Arc::downgrade(&self.shared);
        inner.listener = Some(runtime.spawn(async move {
            loop {
                let signal = match signals.recv().await {
                    Ok(signal) => signal,
                    // Missed signals are coalesced by the debounce anyway
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("Viewport listener lagged by {} signals", skipped);
                        ViewportSignal::Resize
                    }
                    Err(RecvError::Closed) => break,
                };
                match weak.upgrade() {
                    Some(shared) => OrientationCoordinator { shared }.handle_signal(signal),
                    None => break,
                }
            }
            debug!("Viewport listener stopped");
        }));
        debug!("Viewport listener attached");
    }

    /// Register `callback`, invoking it once right away with the current state
    /// and again after every state change.
    ///
    /// A panicking callback is caught and logged; other subscribers are
    /// still notified.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&OrientationTransitionState) + Send + Sync + 'static,
    {
        let id = self.shared.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let callback: Callback = Arc::new(callback);

        let snapshot = {
            let inner = self.shared.inner.lock();
            if !inner.destroyed {
                self.shared.subscribers.lock().push(Subscriber {
                    id,
                    callback: callback.clone(),
                });
            }
            inner.state.clone()
        };

        self.invoke(id, &callback, &snapshot);

        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.lock().len()
    }

    /// Snapshot copy of the current state
    pub fn current_state(&self) -> OrientationTransitionState {
        self.shared.inner.lock().state.clone()
    }

    pub fn is_transitioning(&self) -> bool {
        self.shared.inner.lock().state.is_transitioning
    }

    /// Number of descriptor recomputes so far
    pub fn recompute_count(&self) -> u64 {
        self.shared.recompute_count.load(Ordering::Relaxed)
    }

    /// Whether a debounce timer is waiting to fire
    pub fn has_pending_debounce(&self) -> bool {
        self.shared.inner.lock().debounce.is_pending()
    }

    /// Eased transition progress in [0, 1]; 1.0 when stable
    pub fn transition_progress(&self) -> f64 {
        let inner = self.shared.inner.lock();
        let Some(started) = inner.transition_started else {
            return 1.0;
        };
        if !inner.state.is_transitioning {
            return 1.0;
        }

        let duration = self.transition_duration();
        if duration.is_zero() {
            return 1.0;
        }
        let t = started.elapsed().as_secs_f64() / duration.as_secs_f64();
        ease_in_out_cubic(t)
    }

    /// Layout for showing `remote` against the current local descriptor
    pub fn layout_for(&self, remote: &DeviceDescriptor) -> VideoLayoutConfig {
        compute_layout(&self.current_state().current, remote)
    }

    /// Recompute now and apply the change logic, bypassing the debounce
    pub fn force_update(&self) {
        if self.shared.inner.lock().destroyed {
            return;
        }
        self.recompute();
    }

    /// Feed one environment signal through the debounce.
    ///
    /// Each signal replaces the pending debounce timer, so a burst results
    /// in a single recompute once signals stop for `debounce_ms`. Outside a
    /// tokio runtime the recompute happens immediately.
    pub fn handle_signal(&self, signal: ViewportSignal) {
        let Ok(runtime) = Handle::try_current() else {
            debug!("Viewport signal {:?} without runtime, applying now", signal);
            self.force_update();
            return;
        };

        let mut inner = self.shared.inner.lock();
        if inner.destroyed {
            return;
        }

        let generation = inner.debounce.cancel();
        let delay = Duration::from_millis(self.shared.config.debounce_ms as u64);
        let weak = Arc::downgrade(&self.shared);
        inner.debounce.handle = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = weak.upgrade() {
                OrientationCoordinator { shared }.on_debounce_elapsed(generation);
            }
        }));
    }

    /// Cancel both timers, detach the listener and drop all subscribers.
    ///
    /// Idempotent. Later signals and updates are ignored.
    pub fn destroy(&self) {
        {
            let mut inner = self.shared.inner.lock();
            if inner.destroyed {
                return;
            }
            inner.destroyed = true;
            inner.debounce.cancel();
            inner.transition_end.cancel();
            if let Some(listener) = inner.listener.take() {
                listener.abort();
            }
        }
        self.shared.subscribers.lock().clear();
        info!("Orientation coordinator destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.inner.lock().destroyed
    }

    fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.shared.config.transition_duration_ms as u64)
    }

    fn on_debounce_elapsed(&self, generation: u64) {
        {
            let mut inner = self.shared.inner.lock();
            if inner.destroyed || inner.debounce.generation != generation {
                return;
            }
            // Running inside this timer's own task, nothing to abort
            inner.debounce.handle = None;
        }
        self.recompute();
    }

    fn recompute(&self) {
        let descriptor = DeviceDescriptor::capture(self.shared.source.as_ref());
        self.shared.recompute_count.fetch_add(1, Ordering::Relaxed);
        self.apply_descriptor(descriptor);
    }

    fn apply_descriptor(&self, descriptor: DeviceDescriptor) {
        let smooth = self.shared.config.enable_smooth_transitions
            && self.shared.config.transition_duration_ms > 0;
        let runtime = Handle::try_current().ok();

        let (snapshot, from, end_now) = {
            let mut inner = self.shared.inner.lock();
            if inner.destroyed {
                return;
            }
            if !inner.state.current.differs_meaningfully(&descriptor) {
                debug!(
                    "Descriptor unchanged ({} {} {})",
                    descriptor.device_class, descriptor.orientation, descriptor.aspect_ratio
                );
                let current = inner.state.current.clone();
                drop(inner);
                self.publish(LayoutEvent::DescriptorRefreshed { current });
                return;
            }

            // A change mid-transition restarts the window with the newest pair
            let generation = inner.transition_end.cancel();
            let from = std::mem::replace(&mut inner.state.current, descriptor);
            inner.state.previous = Some(from.clone());
            inner.state.is_transitioning = true;
            inner.state.transition_started_at = Some(Utc::now());
            inner.transition_started = Some(Instant::now());

            let end_now = match (smooth, runtime) {
                (true, Some(runtime)) => {
                    let duration = self.transition_duration();
                    let weak = Arc::downgrade(&self.shared);
                    inner.transition_end.handle = Some(runtime.spawn(async move {
                        tokio::time::sleep(duration).await;
                        if let Some(shared) = weak.upgrade() {
                            OrientationCoordinator { shared }.end_transition(generation);
                        }
                    }));
                    None
                }
                _ => Some(generation),
            };

            (inner.state.clone(), from, end_now)
        };

        info!(
            "Orientation transition: {} {} {} -> {} {} {}",
            from.device_class,
            from.orientation,
            from.aspect_ratio,
            snapshot.current.device_class,
            snapshot.current.orientation,
            snapshot.current.aspect_ratio
        );
        self.notify(&snapshot);
        self.publish(LayoutEvent::TransitionStarted {
            from,
            to: snapshot.current.clone(),
            duration_ms: if end_now.is_some() {
                0
            } else {
                self.shared.config.transition_duration_ms
            },
        });

        if let Some(generation) = end_now {
            self.end_transition(generation);
        }
    }

    fn end_transition(&self, generation: u64) {
        let snapshot = {
            let mut inner = self.shared.inner.lock();
            if inner.destroyed
                || inner.transition_end.generation != generation
                || !inner.state.is_transitioning
            {
                return;
            }
            inner.transition_end.handle = None;
            inner.state.previous = None;
            inner.state.is_transitioning = false;
            inner.state.transition_started_at = None;
            inner.transition_started = None;
            inner.state.clone()
        };

        debug!("Orientation transition finished");
        self.notify(&snapshot);
        self.publish(LayoutEvent::TransitionEnded {
            current: snapshot.current,
        });
    }

    fn notify(&self, snapshot: &OrientationTransitionState) {
        // Callbacks run outside the lock so they may call back into us
        let subscribers: Vec<(u64, Callback)> = self
            .shared
            .subscribers
            .lock()
            .iter()
            .map(|s| (s.id, s.callback.clone()))
            .collect();

        for (id, callback) in &subscribers {
            self.invoke(*id, callback, snapshot);
        }
    }

    fn invoke(&self, id: u64, callback: &Callback, snapshot: &OrientationTransitionState) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| callback(snapshot)));
        if let Err(payload) = result {
            let message = panic_message(payload.as_ref());
            let key = format!("subscriber_{}", id);
            warn_throttled!(
                self.shared.throttler,
                &key,
                "Orientation subscriber {} panicked: {}",
                id,
                message
            );
            self.publish(LayoutEvent::SubscriberFailed {
                subscriber_id: id,
                message,
            });
        }
    }

    fn publish(&self, event: LayoutEvent) {
        if let Some(ref events) = *self.shared.events.read() {
            events.publish(event);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
