//! Blocking sliding-window rate limiter.
//!
//! # Design
//! The limiter keeps the grant instants of the last `window` in a queue. A
//! permit is available while fewer than `limit` grants fall inside the window;
//! otherwise the caller sleeps until the oldest grant expires and retries.
//! The lock is never held while sleeping, so throttled threads do not block
//! each other's bookkeeping.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{ApiError, Result};

#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    grants: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// At most `limit` permits in any interval of length `window`.
    pub fn new(limit: u32, window: Duration) -> Result<Self> {
        if limit == 0 {
            return Err(ApiError::InvalidRequestLimit);
        }
        if window.is_zero() {
            return Err(ApiError::InvalidWindow);
        }
        let limit = limit as usize;
        Ok(Self {
            limit,
            window,
            grants: Mutex::new(VecDeque::with_capacity(limit)),
        })
    }

    pub fn limit(&self) -> u32 {
        self.limit as u32
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Take a permit if one is free, otherwise report how long to wait.
    pub fn try_acquire(&self) -> std::result::Result<(), Duration> {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&self, now: Instant) -> std::result::Result<(), Duration> {
        let mut grants = self.grants.lock();
        while let Some(&oldest) = grants.front() {
            if now.duration_since(oldest) >= self.window {
                grants.pop_front();
            } else {
                break;
            }
        }
        if grants.len() < self.limit {
            grants.push_back(now);
            return Ok(());
        }
        // Full window: the front entry is still live.
        let oldest = grants[0];
        Err((oldest + self.window).saturating_duration_since(now))
    }

    /// Block the current thread until a permit is granted.
    pub fn acquire(&self) {
        loop {
            match self.try_acquire() {
                Ok(()) => return,
                Err(wait) => {
                    debug!(wait_ms = wait.as_millis() as u64, limit = self.limit, "request throttled");
                    std::thread::sleep(wait);
                }
            }
        }
    }

    /// Permits granted inside the current window.
    pub fn in_flight(&self) -> usize {
        let now = Instant::now();
        self.grants
            .lock()
            .iter()
            .filter(|&&t| now.duration_since(t) < self.window)
            .count()
    }
}
