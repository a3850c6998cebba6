// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::Mutex;
use std::time::SystemTime;

/// A token bucket rate limiter.
///
/// The bucket holds up to `burst` tokens and starts full. Tokens are refilled continuously at
/// `limit` tokens per second. Admission never blocks: a request is either admitted right away,
/// consuming its tokens, or refused.
///
/// Time is passed in by the caller so that the limiter shares the caller's view of the clock.
pub struct RateLimiter {
    bucket: Option<Bucket>,
}

struct Bucket {
    limit: f64,
    burst: f64,
    state: Mutex<BucketState>,
}

struct BucketState {
    tokens: f64,
    last: Option<SystemTime>,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bucket {
            None => f.debug_struct("RateLimiter").field("limit", &"inf").finish(),
            Some(bucket) => {
                let state = bucket.state.lock().unwrap_or_else(|e| e.into_inner());
                f.debug_struct("RateLimiter")
                    .field("limit", &bucket.limit)
                    .field("burst", &bucket.burst)
                    .field("tokens", &state.tokens)
                    .finish()
            }
        }
    }
}

impl RateLimiter {
    /// A limiter admitting everything
    pub fn unbounded() -> Self {
        RateLimiter { bucket: None }
    }

    /// Creates a limiter refilling `limit` tokens per second, holding at most `burst` tokens.
    ///
    /// A burst of 0 refuses everything.
    pub fn new(limit: f64, burst: u64) -> Self {
        let burst = burst as f64;
        RateLimiter {
            bucket: Some(Bucket {
                limit: limit.max(0.0),
                burst,
                state: Mutex::new(BucketState {
                    tokens: burst,
                    last: None,
                }),
            }),
        }
    }

    /// Sizes a limiter for spans that were kept at `sample_rate` before reaching it.
    ///
    /// The burst is `ceil(sample_rate * limit)`. Without a limit, everything is admitted.
    pub fn from_throughput(sample_rate: f64, limit: Option<f64>) -> Self {
        match limit {
            None => Self::unbounded(),
            Some(limit) => {
                let burst = (sample_rate * limit).ceil().max(0.0) as u64;
                Self::new(limit, burst)
            }
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.bucket.is_none()
    }

    /// Tokens refilled per second, `None` when unbounded
    pub fn limit(&self) -> Option<f64> {
        self.bucket.as_ref().map(|b| b.limit)
    }

    /// Capacity of the bucket, `None` when unbounded
    pub fn burst(&self) -> Option<u64> {
        self.bucket.as_ref().map(|b| b.burst as u64)
    }

    /// Admits a single request at `now`
    pub fn try_admit(&self, now: SystemTime) -> bool {
        self.try_admit_n(now, 1)
    }

    /// Admits `n` requests at `now` if enough tokens are available, consuming them.
    ///
    /// A timestamp earlier than the previous one counts as no time elapsed.
    pub fn try_admit_n(&self, now: SystemTime, n: u64) -> bool {
        let Some(bucket) = &self.bucket else {
            return true;
        };
        let n = n as f64;
        if n > bucket.burst {
            return false;
        }

        let mut state = bucket.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(last) = state.last {
            let elapsed = now.duration_since(last).unwrap_or_default();
            state.tokens = (state.tokens + elapsed.as_secs_f64() * bucket.limit).min(bucket.burst);
            if now > last {
                state.last = Some(now);
            }
        } else {
            state.last = Some(now);
        }

        if state.tokens >= n {
            state.tokens -= n;
            true
        } else {
            false
        }
    }
}
