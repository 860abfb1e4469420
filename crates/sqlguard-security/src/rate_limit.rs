//! Sliding-window rate limiting per caller identity
//!
//! Each identity owns a [`RateWindow`] holding the instants of its admitted
//! requests. Every check first drops instants that fell out of the window, so
//! a burst straddling a bucket boundary cannot double the effective limit the
//! way a fixed-window counter would. State is in-memory only.

use crate::{RateLimitConfig, SecurityError, SecurityResult};
use dashmap::DashMap;
use sqlguard_validation::sanitize_for_logging;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Admitted request instants for one identity, oldest first, together with
/// the window length they were last admitted under
#[derive(Debug, Clone, Default)]
pub struct RateWindow {
    timestamps: VecDeque<Instant>,
    window: Duration,
}

impl RateWindow {
    /// Drop every instant older than `now - window`
    fn purge(&mut self, now: Instant) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    fn try_admit(&mut self, now: Instant, window: Duration, max_requests: u32) -> RateLimitInfo {
        self.window = window;
        self.purge(now);

        let allowed = self.timestamps.len() < max_requests as usize;
        if allowed {
            self.timestamps.push_back(now);
        }

        let retry_after = if allowed {
            None
        } else {
            // A window too long to add to an Instant never frees up sooner
            // than its own length
            self.timestamps.front().map(|&oldest| {
                oldest
                    .checked_add(window)
                    .map_or(window, |expiry| expiry.saturating_duration_since(now))
            })
        };

        RateLimitInfo {
            current: self.timestamps.len() as u32,
            limit: max_requests,
            allowed,
            retry_after,
        }
    }

    /// Requests currently counted against the identity
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    fn last_admitted(&self) -> Option<Instant> {
        self.timestamps.back().copied()
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests counted in the window, including this one when admitted
    pub current: u32,
    /// Maximum allowed requests
    pub limit: u32,
    /// Whether the request was admitted
    pub allowed: bool,
    /// Time until the oldest counted request leaves the window, when rejected
    pub retry_after: Option<Duration>,
}

/// In-memory sliding-window rate limiter keyed by caller identity.
///
/// Windows live in a sharded map, so a check only locks the shard holding
/// that identity. Share one limiter between generators with `Arc`.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, RateWindow>,
}

impl RateLimiter {
    /// Create a new rate limiter with configuration
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    /// Create strict rate limiting (10 requests per minute)
    pub fn strict() -> Self {
        Self::new(RateLimitConfig::strict())
    }

    /// Create permissive rate limiting (1000 requests per minute)
    pub fn permissive() -> Self {
        Self::new(RateLimitConfig::permissive())
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Admit or reject a request from `identity`.
    ///
    /// A rejected request is not recorded. `max_requests == 0` rejects
    /// everything.
    pub fn admit(&self, identity: &str, max_requests: u32, window_seconds: u64) -> bool {
        self.admit_at(identity, max_requests, window_seconds, Instant::now())
    }

    /// [`admit`](Self::admit) evaluated at an explicit instant
    pub fn admit_at(
        &self,
        identity: &str,
        max_requests: u32,
        window_seconds: u64,
        now: Instant,
    ) -> bool {
        self.check_at(identity, max_requests, window_seconds, now)
            .allowed
    }

    /// Check `identity` against the configured limits
    pub fn check(&self, identity: &str) -> SecurityResult<RateLimitInfo> {
        self.check_with(identity, self.config.max_requests, self.config.window_seconds)
    }

    /// Check `identity` against explicit limits, failing with
    /// [`SecurityError::RateLimitExceeded`] on rejection
    pub fn check_with(
        &self,
        identity: &str,
        max_requests: u32,
        window_seconds: u64,
    ) -> SecurityResult<RateLimitInfo> {
        let info = self.check_at(identity, max_requests, window_seconds, Instant::now());

        if info.allowed {
            Ok(info)
        } else {
            let identity = sanitize_for_logging(identity, 64);
            tracing::warn!(
                "Rate limit exceeded for '{}': {}/{} requests in {}s window",
                identity,
                info.current,
                info.limit,
                window_seconds
            );
            Err(SecurityError::RateLimitExceeded {
                identity,
                limit: max_requests,
                window_seconds,
            })
        }
    }

    fn check_at(
        &self,
        identity: &str,
        max_requests: u32,
        window_seconds: u64,
        now: Instant,
    ) -> RateLimitInfo {
        let window = Duration::from_secs(window_seconds);

        let (info, is_new) = match self.windows.get_mut(identity) {
            Some(mut entry) => (entry.try_admit(now, window, max_requests), false),
            None => {
                let mut entry = self.windows.entry(identity.to_string()).or_default();
                (entry.try_admit(now, window, max_requests), true)
            }
        };

        // No shard lock may be held past this point
        if is_new && self.windows.len() > self.config.max_tracked_identities {
            self.evict(now);
        }

        info
    }

    /// Remove identities with no requests left inside their own window
    pub fn sweep_idle(&self) -> usize {
        self.sweep_idle_at(Instant::now())
    }

    fn sweep_idle_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, entry| {
            entry.purge(now);
            !entry.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    fn evict(&self, now: Instant) {
        let mut evicted = self.sweep_idle_at(now);

        let excess = self
            .windows
            .len()
            .saturating_sub(self.config.max_tracked_identities);
        if excess > 0 {
            let mut by_age: Vec<(String, Option<Instant>)> = self
                .windows
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().last_admitted()))
                .collect();
            by_age.sort_by_key(|(_, last)| *last);

            for (identity, _) in by_age.into_iter().take(excess) {
                self.windows.remove(&identity);
                evicted += 1;
            }
        }

        tracing::debug!(
            "Rate limiter evicted {} identities ({} still tracked)",
            evicted,
            self.windows.len()
        );
    }

    /// Number of identities currently holding a window
    pub fn tracked_identities(&self) -> usize {
        self.windows.len()
    }

    /// Requests currently counted against `identity`
    pub fn current_count(&self, identity: &str) -> usize {
        self.windows
            .get(identity)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    /// Forget every identity
    pub fn reset(&self) {
        self.windows.clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_admits_exactly_max_requests_in_burst() {
        let limiter = RateLimiter::default();
        let start = Instant::now();

        let admitted: Vec<bool> = (0..10)
            .map(|i| limiter.admit_at("test_user", 5, 10, start + millis(i * 100)))
            .collect();

        assert_eq!(admitted, vec![true, true, true, true, true, false, false, false, false, false]);
        assert_eq!(limiter.current_count("test_user"), 5);
    }

    #[test]
    fn test_window_slides() {
        let limiter = RateLimiter::default();
        let start = Instant::now();

        assert!(limiter.admit_at("user", 2, 10, start));
        assert!(limiter.admit_at("user", 2, 10, start + millis(5_000)));
        assert!(!limiter.admit_at("user", 2, 10, start + millis(9_000)));

        // The first request has left the window, the second has not
        assert!(limiter.admit_at("user", 2, 10, start + millis(10_001)));
        assert!(!limiter.admit_at("user", 2, 10, start + millis(10_002)));
        assert!(limiter.admit_at("user", 2, 10, start + millis(15_001)));
    }

    #[test]
    fn test_no_boundary_burst() {
        let limiter = RateLimiter::default();
        let start = Instant::now();

        for i in 0..3 {
            assert!(limiter.admit_at("user", 3, 10, start + millis(9_000 + i)));
        }
        // A fixed 10s bucket would reset here and admit three more
        assert!(!limiter.admit_at("user", 3, 10, start + millis(10_500)));
    }

    #[test]
    fn test_identities_are_independent() {
        let limiter = RateLimiter::default();
        let now = Instant::now();

        assert!(limiter.admit_at("alice", 1, 60, now));
        assert!(!limiter.admit_at("alice", 1, 60, now));
        assert!(limiter.admit_at("bob", 1, 60, now));
        assert_eq!(limiter.tracked_identities(), 2);
    }

    #[test]
    fn test_zero_max_requests_rejects() {
        let limiter = RateLimiter::default();
        assert!(!limiter.admit("anyone", 0, 60));
        assert_eq!(limiter.current_count("anyone"), 0);
    }

    #[test]
    fn test_rejection_does_not_record() {
        let limiter = RateLimiter::default();
        let start = Instant::now();

        assert!(limiter.admit_at("user", 1, 10, start));
        for i in 1..5 {
            assert!(!limiter.admit_at("user", 1, 10, start + millis(i * 1_000)));
        }
        // Only the admitted request counts, so the window frees up at 10s
        assert!(limiter.admit_at("user", 1, 10, start + millis(10_001)));
    }

    #[test]
    fn test_check_uses_configured_limits() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 2,
            window_seconds: 60,
            ..RateLimitConfig::default()
        });

        let info = limiter.check("user").unwrap();
        assert!(info.allowed);
        assert_eq!(info.current, 1);
        assert_eq!(info.limit, 2);

        assert!(limiter.check("user").is_ok());

        let err = limiter.check("user").unwrap_err();
        assert_eq!(
            err,
            SecurityError::RateLimitExceeded {
                identity: "user".to_string(),
                limit: 2,
                window_seconds: 60
            }
        );
    }

    #[test]
    fn test_retry_after_reported_on_rejection() {
        let limiter = RateLimiter::default();
        let start = Instant::now();

        limiter.admit_at("user", 1, 10, start);
        let info = limiter.check_at("user", 1, 10, start + millis(4_000));
        assert!(!info.allowed);
        assert_eq!(info.retry_after, Some(millis(6_000)));
    }

    #[test]
    fn test_idle_identities_evicted_at_capacity() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 10,
            window_seconds: 1,
            max_tracked_identities: 3,
        });
        let start = Instant::now();

        for name in ["a", "b", "c"] {
            assert!(limiter.admit_at(name, 10, 1, start));
        }
        assert_eq!(limiter.tracked_identities(), 3);

        // a, b and c are idle by now and get swept when d arrives
        assert!(limiter.admit_at("d", 10, 1, start + millis(2_000)));
        assert_eq!(limiter.tracked_identities(), 1);
        assert_eq!(limiter.current_count("d"), 1);
    }

    #[test]
    fn test_least_recent_identity_evicted_when_all_active() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 10,
            window_seconds: 60,
            max_tracked_identities: 2,
        });
        let start = Instant::now();

        limiter.admit_at("oldest", 10, 60, start);
        limiter.admit_at("middle", 10, 60, start + millis(10));
        limiter.admit_at("newest", 10, 60, start + millis(20));

        assert_eq!(limiter.tracked_identities(), 2);
        assert_eq!(limiter.current_count("oldest"), 0);
        assert_eq!(limiter.current_count("middle"), 1);
        assert_eq!(limiter.current_count("newest"), 1);
    }

    #[test]
    fn test_rejection_with_unbounded_window() {
        let limiter = RateLimiter::default();

        assert!(limiter.admit("caller", 1, u64::MAX));
        assert!(!limiter.admit("caller", 1, u64::MAX));

        let start = Instant::now();
        let info = limiter.check_at("other", 0, u64::MAX, start);
        assert!(!info.allowed);
        assert_eq!(info.retry_after, None);

        limiter.admit_at("other", 1, u64::MAX, start);
        let info = limiter.check_at("other", 1, u64::MAX, start + millis(1));
        assert!(!info.allowed);
        assert!(info.retry_after.is_some());
    }

    #[test]
    fn test_check_with_explicit_limits() {
        let limiter = RateLimiter::default();

        assert!(limiter.check_with("caller<script>", 1, 30).is_ok());
        let err = limiter.check_with("caller<script>", 1, 30).unwrap_err();
        assert_eq!(
            err,
            SecurityError::RateLimitExceeded {
                identity: sanitize_for_logging("caller<script>", 64),
                limit: 1,
                window_seconds: 30
            }
        );
    }

    #[test]
    fn test_eviction_keeps_each_identity_window() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 10,
            window_seconds: 60,
            max_tracked_identities: 2,
        });
        let start = Instant::now();

        assert!(limiter.admit_at("hourly", 1, 3_600, start));
        assert!(limiter.admit_at("brief", 10, 1, start));

        // The sweep triggered by a 1s caller must not purge the hourly window
        assert!(limiter.admit_at("late", 10, 1, start + millis(5_000)));
        assert_eq!(limiter.current_count("hourly"), 1);
        assert_eq!(limiter.current_count("brief"), 0);
        assert!(!limiter.admit_at("hourly", 1, 3_600, start + millis(6_000)));
    }

    #[test]
    fn test_reset_clears_state() {
        let limiter = RateLimiter::default();
        limiter.admit("user", 1, 60);
        limiter.reset();
        assert_eq!(limiter.tracked_identities(), 0);
        assert!(limiter.admit("user", 1, 60));
    }
}
