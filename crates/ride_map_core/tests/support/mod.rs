#![allow(dead_code)]

pub mod screen;

use std::time::{Duration, Instant};

/// Real-time deadline for worker-thread results.
pub const RESULT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

pub fn deadline() -> Instant {
    Instant::now() + RESULT_TIMEOUT
}
