//! Log throttling utility
//!
//! Limits how often the same warning is recorded, so a subscriber that
//! panics on every state change does not flood the log.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Tracks the last time each message key was logged
///
/// ```rust
/// use std::time::Duration;
/// use harthio_layout::utils::LogThrottler;
///
/// let throttler = LogThrottler::new(Duration::from_secs(5));
/// assert!(throttler.should_log("subscriber_panic"));
/// assert!(!throttler.should_log("subscriber_panic"));
/// ```
pub struct LogThrottler {
    last_logged: Mutex<HashMap<String, Instant>>,
    interval: Duration,
}

impl LogThrottler {
    /// Create a new log throttler with the specified interval
    pub fn new(interval: Duration) -> Self {
        Self {
            last_logged: Mutex::new(HashMap::new()),
            interval,
        }
    }

    /// Create a new log throttler with interval specified in seconds
    pub fn with_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Returns `true` if `key` has not been logged within the interval,
    /// recording the current time when it does.
    pub fn should_log(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut map = self.last_logged.lock();
        if let Some(last) = map.get(key) {
            if now.duration_since(*last) < self.interval {
                return false;
            }
        }
        map.insert(key.to_string(), now);
        true
    }

    /// Forget a single key so its next occurrence is logged immediately
    pub fn clear(&self, key: &str) {
        self.last_logged.lock().remove(key);
    }

    /// Forget every key
    pub fn clear_all(&self) {
        self.last_logged.lock().clear();
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.last_logged.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_logged.lock().is_empty()
    }
}

impl Default for LogThrottler {
    /// 5 second interval
    fn default() -> Self {
        Self::with_secs(5)
    }
}

/// Throttled `tracing::warn!`
///
/// ```rust
/// use harthio_layout::utils::LogThrottler;
/// use harthio_layout::warn_throttled;
///
/// let throttler = LogThrottler::default();
/// warn_throttled!(throttler, "subscriber_panic", "subscriber {} panicked", 3);
/// ```
#[macro_export]
macro_rules! warn_throttled {
    ($throttler:expr, $key:expr, $($arg:tt)*) => {
        if $throttler.should_log($key) {
            tracing::warn!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_first_call_logs() {
        let throttler = LogThrottler::with_secs(1);
        assert!(throttler.should_log("key"));
    }

    #[test]
    fn test_throttling_expires() {
        let throttler = LogThrottler::new(Duration::from_millis(50));

        assert!(throttler.should_log("key"));
        assert!(!throttler.should_log("key"));

        thread::sleep(Duration::from_millis(80));
        assert!(throttler.should_log("key"));
    }

    #[test]
    fn test_keys_are_independent() {
        let throttler = LogThrottler::with_secs(10);

        assert!(throttler.should_log("subscriber_1"));
        assert!(throttler.should_log("subscriber_2"));
        assert!(!throttler.should_log("subscriber_1"));
        assert_eq!(throttler.len(), 2);
    }

    #[test]
    fn test_clear() {
        let throttler = LogThrottler::with_secs(10);

        assert!(throttler.should_log("key"));
        throttler.clear("key");
        assert!(throttler.should_log("key"));

        throttler.clear_all();
        assert!(throttler.is_empty());
    }
}
