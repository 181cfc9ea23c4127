use std::collections::HashMap;
use std::sync::Mutex;

use time::{Duration, OffsetDateTime};
use tracing::warn;

#[derive(Debug, Clone, Copy)]
struct AttemptWindow {
    count: u32,
    reset_at: OffsetDateTime,
}

/// Sliding lockout window per identifier (login email in practice). Purely
/// in-process: counters are lost on restart and not shared across instances,
/// which is an accepted limitation of a single-process deployment, not
/// something this type tries to paper over. Swapping in a distributed store
/// means replacing this type behind the same `check` contract; the credential
/// service only ever sees the boolean.
pub struct LoginRateLimiter {
    max_attempts: u32,
    lockout: Duration,
    windows: Mutex<HashMap<String, AttemptWindow>>,
}

impl LoginRateLimiter {
    pub fn new(max_attempts: u32, lockout: Duration) -> Self {
        Self {
            max_attempts,
            lockout,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Records an attempt for `identifier` and reports whether it is
    /// permitted. Once the attempt cap is hit the counter stops moving, so a
    /// lockout always ends `lockout` after the first attempt of its window.
    pub fn check(&self, identifier: &str) -> bool {
        self.check_at(identifier, OffsetDateTime::now_utc())
    }

    fn check_at(&self, identifier: &str, now: OffsetDateTime) -> bool {
        // One guard spans the whole read-modify-write; concurrent attempts
        // for the same identifier cannot lose updates.
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        match windows.get_mut(identifier) {
            Some(window) if now < window.reset_at => {
                if window.count >= self.max_attempts {
                    warn!(identifier = %identifier, "login attempts locked out");
                    return false;
                }
                window.count += 1;
                true
            }
            _ => {
                windows.insert(
                    identifier.to_string(),
                    AttemptWindow {
                        count: 1,
                        reset_at: now + self.lockout,
                    },
                );
                true
            }
        }
    }
}
