//! Client-side login attempt limiting.
//!
//! Counts consecutive authentication rejections; once the threshold is hit,
//! further attempts are blocked for the cooldown window no matter what the
//! network does. Only explicit rejections count; a timeout or connection
//! error says nothing about the password. The counter resets on success or
//! when the cooldown lapses.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use fieldops_core::config::AuthConfig;

/// Verdict for an attempted login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginGate {
    /// The attempt may proceed.
    Allowed,

    /// Blocked; `retry_in` is the remaining cooldown.
    Blocked { retry_in: Duration },
}

#[derive(Default)]
struct LimiterState {
    rejections: u32,
    blocked_until: Option<Instant>,
}

/// Consecutive-rejection limiter for interactive login.
pub struct LoginRateLimiter {
    max_attempts: u32,
    cooldown: Duration,
    state: Mutex<LimiterState>,
}

impl LoginRateLimiter {
    /// Limiter blocking after `max_attempts` rejections for `cooldown`.
    pub fn new(max_attempts: u32, cooldown: Duration) -> Self {
        Self {
            max_attempts,
            cooldown,
            state: Mutex::new(LimiterState::default()),
        }
    }

    /// Limiter tuned from config.
    pub fn from_config(auth: &AuthConfig) -> Self {
        Self::new(
            auth.max_login_attempts,
            Duration::from_secs(auth.login_cooldown_secs),
        )
    }

    /// Check whether a login attempt may proceed right now.
    pub fn check(&self) -> LoginGate {
        let mut state = self.state.lock().expect("limiter lock");

        if let Some(until) = state.blocked_until {
            let now = Instant::now();
            if now < until {
                return LoginGate::Blocked {
                    retry_in: until - now,
                };
            }
            // Cooldown lapsed: forgive past rejections.
            state.blocked_until = None;
            state.rejections = 0;
        }

        LoginGate::Allowed
    }

    /// Record an authentication rejection.
    pub fn record_rejection(&self) {
        let mut state = self.state.lock().expect("limiter lock");
        state.rejections += 1;
        if state.rejections >= self.max_attempts {
            state.blocked_until = Some(Instant::now() + self.cooldown);
        }
    }

    /// Reset after a successful login.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("limiter lock");
        state.rejections = 0;
        state.blocked_until = None;
    }

    /// Current consecutive-rejection count.
    pub fn rejections(&self) -> u32 {
        self.state.lock().expect("limiter lock").rejections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> LoginRateLimiter {
        LoginRateLimiter::new(10, Duration::from_secs(300))
    }

    #[tokio::test(start_paused = true)]
    async fn test_allows_until_threshold() {
        let limiter = limiter();
        for _ in 0..9 {
            limiter.record_rejection();
            assert_eq!(limiter.check(), LoginGate::Allowed);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocks_at_threshold_with_remaining_time() {
        let limiter = limiter();
        for _ in 0..10 {
            assert_eq!(limiter.check(), LoginGate::Allowed);
            limiter.record_rejection();
        }

        match limiter.check() {
            LoginGate::Blocked { retry_in } => {
                assert!(retry_in <= Duration::from_secs(300));
                assert!(retry_in > Duration::from_secs(290));
            }
            LoginGate::Allowed => panic!("expected the 11th attempt to be blocked"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_expiry_resets_counter() {
        let limiter = limiter();
        for _ in 0..10 {
            limiter.record_rejection();
        }
        assert!(matches!(limiter.check(), LoginGate::Blocked { .. }));

        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(limiter.check(), LoginGate::Allowed);
        assert_eq!(limiter.rejections(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_counter() {
        let limiter = limiter();
        for _ in 0..9 {
            limiter.record_rejection();
        }
        limiter.reset();
        assert_eq!(limiter.rejections(), 0);

        // A fresh run of rejections is needed to block again.
        limiter.record_rejection();
        assert_eq!(limiter.check(), LoginGate::Allowed);
    }
}
