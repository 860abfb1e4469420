//! Rate limiting configuration

use serde::{Deserialize, Serialize};

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,

    /// Sliding window length in seconds
    pub window_seconds: u64,

    /// Identities tracked before idle windows are swept and the least
    /// recently admitted callers evicted
    pub max_tracked_identities: usize,
}

impl RateLimitConfig {
    /// 10 requests per minute
    pub fn strict() -> Self {
        Self {
            max_requests: 10,
            window_seconds: 60,
            ..Self::default()
        }
    }

    /// 1000 requests per minute
    pub fn permissive() -> Self {
        Self {
            max_requests: 1000,
            window_seconds: 60,
            ..Self::default()
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_seconds: 60, // 1 minute
            max_tracked_identities: 10_000,
        }
    }
}
