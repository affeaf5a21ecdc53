// 🚦 Rate Limiter - Fixed-window counters keyed by caller identity
//
// Speed bump for the PDF import and translation endpoints:
// - Each identifier (IP + route, API key prefix, ...) gets `limit` requests
//   per window
// - The window restarts on the first request after it expired
// - Expired entries are swept lazily during `check`, at most once per
//   sweep interval (no background thread)
//
// In-process only: counters are lost on restart and not shared between
// instances.

use crate::clock::{Clock, SystemClock};
use crate::error::{ImportError, Result};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How often expired entries are swept (default: 5 minutes)
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Longest accepted window (one year)
pub const MAX_WINDOW_MS: u64 = 365 * 24 * 60 * 60 * 1000;

static GLOBAL_LIMITER: Lazy<RateLimiter> = Lazy::new(RateLimiter::new);

// ============================================================================
// POLICY + DECISION
// ============================================================================

/// Requests allowed per window for one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub limit: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    /// Validated policy; a zero limit or zero window would never admit a
    /// sensible request stream
    pub fn new(limit: u32, window_ms: u64) -> Result<Self> {
        if limit == 0 {
            return Err(ImportError::InvalidPolicy("limit must be at least 1".to_string()));
        }
        if window_ms == 0 {
            return Err(ImportError::InvalidPolicy("window must be at least 1ms".to_string()));
        }
        if window_ms > MAX_WINDOW_MS {
            return Err(ImportError::InvalidPolicy(format!(
                "window must be at most {}ms",
                MAX_WINDOW_MS
            )));
        }
        Ok(RateLimitPolicy {
            limit,
            window: Duration::from_millis(window_ms),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,

    /// Requests left in the current window
    pub remaining: u32,
}

// ============================================================================
// RATE LIMITER
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    reset_at: Instant,
}

struct LimiterState {
    entries: HashMap<String, RateLimitEntry>,
    last_sweep: Instant,
}

pub struct RateLimiter {
    /// Entries and sweep bookkeeping behind one lock: check-and-increment
    /// must be atomic or concurrent callers undercount
    state: Mutex<LimiterState>,
    clock: Arc<dyn Clock>,
    sweep_interval: Duration,
}

impl RateLimiter {
    /// Limiter on the system clock with the default sweep interval
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), DEFAULT_SWEEP_INTERVAL)
    }

    pub fn with_clock(clock: Arc<dyn Clock>, sweep_interval: Duration) -> Self {
        let now = clock.now();
        RateLimiter {
            state: Mutex::new(LimiterState {
                entries: HashMap::new(),
                last_sweep: now,
            }),
            clock,
            sweep_interval,
        }
    }

    /// Process-wide limiter shared by all endpoints
    pub fn global() -> &'static RateLimiter {
        &GLOBAL_LIMITER
    }

    /// Count a request for `identifier` against `limit` per `window_ms`
    ///
    /// Fails only for an invalid policy (zero limit or window). Being over
    /// the limit is a normal `allowed: false` decision.
    pub fn check(&self, identifier: &str, limit: u32, window_ms: u64) -> Result<RateLimitDecision> {
        let policy = RateLimitPolicy::new(limit, window_ms)?;
        Ok(self.check_policy(identifier, &policy))
    }

    pub fn check_policy(&self, identifier: &str, policy: &RateLimitPolicy) -> RateLimitDecision {
        let now = self.clock.now();
        let mut guard = self.lock_state();
        let state = &mut *guard;

        if now.duration_since(state.last_sweep) >= self.sweep_interval {
            Self::sweep(state, now);
        }

        match state.entries.get_mut(identifier) {
            Some(entry) if now < entry.reset_at => {
                if entry.count >= policy.limit {
                    warn!(identifier, limit = policy.limit, "Rate limit exceeded");
                    return RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                    };
                }

                entry.count += 1;
                RateLimitDecision {
                    allowed: true,
                    remaining: policy.limit - entry.count,
                }
            }
            _ => {
                // First request, or the previous window has ended
                state.entries.insert(
                    identifier.to_string(),
                    RateLimitEntry {
                        count: 1,
                        reset_at: Self::window_end(now, policy.window),
                    },
                );
                RateLimitDecision {
                    allowed: true,
                    remaining: policy.limit - 1,
                }
            }
        }
    }

    /// Forget the counter for one identifier
    pub fn reset(&self, identifier: &str) {
        self.lock_state().entries.remove(identifier);
    }

    /// Number of identifiers currently tracked (expired ones included until
    /// the next sweep)
    pub fn len(&self) -> usize {
        self.lock_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Policies built field by field skip the window bound; never overflow
    // the platform's Instant
    fn window_end(now: Instant, window: Duration) -> Instant {
        now.checked_add(window)
            .or_else(|| now.checked_add(Duration::from_millis(MAX_WINDOW_MS)))
            .unwrap_or(now)
    }

    fn sweep(state: &mut LimiterState, now: Instant) {
        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.reset_at > now);
        state.last_sweep = now;

        debug!(
            removed = before - state.entries.len(),
            remaining = state.entries.len(),
            "Swept expired rate limit entries"
        );
    }

    // Counters are soft state: a panic elsewhere must not disable limiting
    fn lock_state(&self) -> MutexGuard<'_, LimiterState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use std::sync::Barrier;
    use std::thread;

    fn mock_limiter() -> (RateLimiter, MockClock) {
        let clock = MockClock::new(Instant::now());
        let limiter = RateLimiter::with_clock(Arc::new(clock.clone()), DEFAULT_SWEEP_INTERVAL);
        (limiter, clock)
    }

    #[test]
    fn test_window_counts_down_then_rejects() {
        let (limiter, clock) = mock_limiter();

        let remaining: Vec<u32> = (0..3)
            .map(|_| {
                let decision = limiter.check("x", 3, 1000).unwrap();
                assert!(decision.allowed);
                decision.remaining
            })
            .collect();
        assert_eq!(remaining, vec![2, 1, 0]);

        clock.advance(Duration::from_millis(500));
        assert_eq!(
            limiter.check("x", 3, 1000).unwrap(),
            RateLimitDecision { allowed: false, remaining: 0 }
        );
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let (limiter, clock) = mock_limiter();

        for _ in 0..4 {
            limiter.check("x", 3, 1000).unwrap();
        }

        // Reset happens exactly at reset_at
        clock.advance(Duration::from_millis(1000));
        assert_eq!(
            limiter.check("x", 3, 1000).unwrap(),
            RateLimitDecision { allowed: true, remaining: 2 }
        );
    }

    #[test]
    fn test_rejection_does_not_extend_window() {
        let (limiter, clock) = mock_limiter();

        limiter.check("x", 1, 1000).unwrap();
        for _ in 0..5 {
            clock.advance(Duration::from_millis(150));
            assert!(!limiter.check("x", 1, 1000).unwrap().allowed);
        }

        clock.advance(Duration::from_millis(250));
        assert!(limiter.check("x", 1, 1000).unwrap().allowed);
    }

    #[test]
    fn test_identifiers_are_independent() {
        let (limiter, _clock) = mock_limiter();

        assert!(limiter.check("10.0.0.1:/api/import", 1, 60_000).unwrap().allowed);
        assert!(!limiter.check("10.0.0.1:/api/import", 1, 60_000).unwrap().allowed);
        assert!(limiter.check("10.0.0.2:/api/import", 1, 60_000).unwrap().allowed);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let (limiter, _clock) = mock_limiter();

        assert!(matches!(
            limiter.check("x", 0, 1000),
            Err(ImportError::InvalidPolicy(_))
        ));
        assert!(matches!(
            limiter.check("x", 3, 0),
            Err(ImportError::InvalidPolicy(_))
        ));
        assert!(limiter.is_empty());
    }

    #[test]
    fn test_window_upper_bound() {
        assert!(RateLimitPolicy::new(1, MAX_WINDOW_MS).is_ok());
        assert!(matches!(
            RateLimitPolicy::new(1, MAX_WINDOW_MS + 1),
            Err(ImportError::InvalidPolicy(_))
        ));
        assert!(RateLimitPolicy::new(1, u64::MAX).is_err());
    }

    #[test]
    fn test_unbounded_window_built_in_code_does_not_panic() {
        let (limiter, _clock) = mock_limiter();
        let policy = RateLimitPolicy {
            limit: 1,
            window: Duration::MAX,
        };

        assert!(limiter.check_policy("x", &policy).allowed);
        assert_eq!(
            limiter.check_policy("x", &policy),
            RateLimitDecision { allowed: false, remaining: 0 }
        );
    }

    #[test]
    fn test_lazy_sweep_removes_expired_entries() {
        let (limiter, clock) = mock_limiter();

        limiter.check("a", 5, 1000).unwrap();
        limiter.check("b", 5, 10 * 60 * 1000).unwrap();
        assert_eq!(limiter.len(), 2);

        // "a" expired, but no sweep before the interval passes
        clock.advance(Duration::from_secs(2));
        limiter.check("c", 5, 1000).unwrap();
        assert_eq!(limiter.len(), 3);

        clock.advance(DEFAULT_SWEEP_INTERVAL);
        limiter.check("d", 5, 1000).unwrap();

        // "a" and "c" expired, "b" still inside its 10 minute window
        assert_eq!(limiter.len(), 2);
    }

    #[test]
    fn test_reset_identifier() {
        let (limiter, _clock) = mock_limiter();

        limiter.check("x", 1, 1000).unwrap();
        assert!(!limiter.check("x", 1, 1000).unwrap().allowed);

        limiter.reset("x");
        assert!(limiter.check("x", 1, 1000).unwrap().allowed);
    }

    #[test]
    fn test_concurrent_checks_admit_exactly_limit() {
        const THREADS: usize = 32;

        let limiter = Arc::new(RateLimiter::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    limiter
                        .check("fresh", THREADS as u32, 60_000)
                        .unwrap()
                        .allowed
                })
            })
            .collect();

        let allowed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|allowed| *allowed)
            .count();

        assert_eq!(allowed, THREADS);
        assert!(!limiter.check("fresh", THREADS as u32, 60_000).unwrap().allowed);
    }

    #[test]
    fn test_concurrent_overload_admits_only_limit() {
        const THREADS: usize = 40;
        const LIMIT: u32 = 10;

        let limiter = Arc::new(RateLimiter::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    limiter.check("busy", LIMIT, 60_000).unwrap().allowed
                })
            })
            .collect();

        let allowed = handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .filter(|allowed| *allowed)
            .count();

        assert_eq!(allowed, LIMIT as usize);
    }

    #[test]
    fn test_global_limiter_is_shared() {
        let identifier = "test_global_limiter_is_shared";

        assert!(RateLimiter::global().check(identifier, 1, 60_000).unwrap().allowed);
        assert!(!RateLimiter::global().check(identifier, 1, 60_000).unwrap().allowed);
    }
}
