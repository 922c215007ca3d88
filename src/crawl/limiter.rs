// src/crawl/limiter.rs
// =============================================================================
// Politeness: a minimum delay after each request to the site.
//
// Every fetch calls throttle() before it starts and finished() once it has
// returned, whether it succeeded or not. The limiter keeps the earliest
// instant the next request may start:
// - throttle() reserves a slot under a lock, pushes the next slot one delay
//   further, and sleeps until its own slot
// - finished() moves the next slot to at least `delay` after the fetch ended
//
// So a slow fetch never eats into the delay: the next request waits a full
// delay measured from the end of the previous one. With several fetches in
// flight they all share one limiter, so the spacing holds for the whole
// crawl, not per worker.
//
// The first request of a crawl goes out immediately.
// =============================================================================

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    // Waits until this caller is allowed to send its request
    pub async fn throttle(&self) {
        let start = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let start = match *next_slot {
                Some(slot) if slot > now => slot,
                _ => now,
            };
            *next_slot = Some(start + self.delay);
            start
        };

        if start > Instant::now() {
            sleep_until(start).await;
        }
    }

    // Records that a fetch has just returned
    pub async fn finished(&self) {
        let mut next_slot = self.next_slot.lock().await;
        let after_fetch = Instant::now() + self.delay;
        *next_slot = match *next_slot {
            Some(slot) if slot > after_fetch => Some(slot),
            _ => Some(after_fetch),
        };
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why reserve the slot before sleeping?
//    - The lock is held only long enough to compute the slot, never during
//      the sleep, so concurrent callers queue up one delay apart instead of
//      all waking at the same moment
//
// 2. Why does finished() keep a later slot?
//    - Another task may already have reserved a slot further out; moving the
//      next slot backwards would let two requests start inside one delay
//
// 3. Why tokio::time::Instant?
//    - sleep_until takes a tokio Instant, and it lets the runtime's clock
//      drive the timer
// -----------------------------------------------------------------------------
