//! Download delay between consecutive dispatches
//!
//! The delay is measured between dispatch instants, not from the end of the
//! previous fetch, so time spent fetching counts toward the wait.

use rand::Rng;
use std::time::{Duration, Instant};

/// Lower bound of the randomized delay, as a multiple of the base delay
pub const JITTER_MIN: f64 = 0.5;

/// Upper bound of the randomized delay, as a multiple of the base delay
pub const JITTER_MAX: f64 = 1.5;

/// Spaces out request dispatches
#[derive(Debug)]
pub struct Politeness {
    delay: Duration,
    randomize: bool,
    last_dispatch: Option<Instant>,
}

impl Politeness {
    /// Creates a gate with the given base delay
    ///
    /// With `randomize`, each wait is drawn uniformly from
    /// `[0.5, 1.5] x delay`.
    pub fn new(delay: Duration, randomize: bool) -> Self {
        Self {
            delay,
            randomize,
            last_dispatch: None,
        }
    }

    /// Base delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Delay to apply before the next dispatch
    pub fn next_delay(&self) -> Duration {
        if !self.randomize || self.delay.is_zero() {
            return self.delay;
        }
        let factor = rand::thread_rng().gen_range(JITTER_MIN..=JITTER_MAX);
        self.delay.mul_f64(factor)
    }

    /// Waits until the next dispatch is allowed and records it
    ///
    /// The first call returns immediately.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_dispatch {
            let target = self.next_delay();
            let elapsed = last.elapsed();
            if elapsed < target {
                let remaining = target - elapsed;
                tracing::trace!("Politeness delay: sleeping {:?}", remaining);
                tokio::time::sleep(remaining).await;
            }
        }
        self.last_dispatch = Some(Instant::now());
    }
}
