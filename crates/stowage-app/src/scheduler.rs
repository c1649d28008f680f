//! Fixed-interval loop around the backup cycle.
//!
//! # Design
//! - A failed cycle is logged with its full source chain plus the structured
//!   error detail (status codes, response bodies, exit codes, paths) and never
//!   stops the loop.
//! - The same interval is slept after every cycle, successful or not; there is
//!   no backoff and no retry budget.
//! - Sleeping goes through [`Sleeper`] so the loop can be driven in tests
//!   without waiting.

use std::convert::Infallible;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use crate::cycle::{Cycle, CycleReport};
use crate::error::{CycleResult, error_chain};

/// Suspends the scheduler between cycles.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs a cycle, logs its outcome, and sleeps, forever.
pub struct Scheduler<C, Z> {
    cycle: C,
    sleeper: Z,
    interval: Duration,
    sequence: u64,
}

impl<C, Z> Scheduler<C, Z>
where
    C: Cycle,
    Z: Sleeper,
{
    /// Schedule `cycle` every `interval` using `sleeper`.
    #[must_use]
    pub const fn new(cycle: C, sleeper: Z, interval: Duration) -> Self {
        Self {
            cycle,
            sleeper,
            interval,
            sequence: 0,
        }
    }

    /// Number of cycles started so far.
    #[must_use]
    pub const fn cycles_started(&self) -> u64 {
        self.sequence
    }

    /// Run one cycle, log the outcome, then sleep the interval.
    ///
    /// The cycle result is returned for inspection; the loop itself ignores it.
    pub async fn tick(&mut self) -> CycleResult<CycleReport> {
        self.sequence += 1;
        let outcome = self.cycle.run(self.sequence).await;
        match &outcome {
            Ok(report) => info!(
                sequence = self.sequence,
                archive = %report.archive_name,
                archive_bytes = report.archive_bytes,
                files = report.files,
                folder_id = %report.folder_id,
                file_id = %report.remote_file_id,
                elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
                "backup cycle completed"
            ),
            Err(err) => error!(
                sequence = self.sequence,
                step = err.step().as_str(),
                error = %error_chain(err),
                detail = ?err,
                "backup cycle failed"
            ),
        }
        info!(
            interval_secs = self.interval.as_secs(),
            "sleeping until next backup cycle"
        );
        self.sleeper.sleep(self.interval).await;
        outcome
    }

    /// Run cycles until the process is terminated.
    pub async fn run(mut self) -> Infallible {
        loop {
            let _ = self.tick().await;
        }
    }
}
