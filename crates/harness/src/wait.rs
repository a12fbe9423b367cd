//! Wait mechanisms.
//!
//! Every wait in the harness is a bounded poll: the probe runs at least
//! once, then every `poll_interval` until it reports success or the
//! deadline passes. Probe errors abort the wait immediately.

use crate::result::HarnessResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms without new requests)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Deadline for the whole wait
    pub timeout: Duration,
    /// Pause between probes
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Timeout in whole milliseconds
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Result of a wait operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Whether the condition was met before the deadline
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of probes run
    pub attempts: u32,
}

/// Poll `probe` until it yields `true` or the deadline passes.
pub async fn poll_until<F, Fut>(mut probe: F, options: WaitOptions) -> HarnessResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = HarnessResult<bool>>,
{
    let start = Instant::now();
    let deadline = start + options.timeout;
    let mut attempts = 0;

    loop {
        attempts += 1;
        if probe().await? {
            return Ok(WaitResult {
                success: true,
                elapsed: start.elapsed(),
                attempts,
            });
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(WaitResult {
                success: false,
                elapsed: start.elapsed(),
                attempts,
            });
        }
        tokio::time::sleep(options.poll_interval.min(deadline - now)).await;
    }
}
