//! Simulated slow task
//!
//! Each run picks a duration from a fixed menu and, independently, decides
//! whether to fail outright. The random draw is a plain synchronous function
//! over any [`Rng`] so it can be driven by a seeded generator in tests; the
//! suspension is applied afterwards by [`complete`].

use rand::Rng;
use std::time::Duration;
use thiserror::Error;

/// Possible task durations in milliseconds, drawn uniformly
pub const DURATIONS_MS: [u64; 10] = [100, 150, 200, 250, 300, 500, 1000, 1500, 2000, 3000];

/// Messages a failed task can report, drawn uniformly
pub const FAILURE_MESSAGES: [&str; 6] = [
    "Server Down",
    "Network Error",
    "Database Error",
    "Internal Server Error",
    "Gateway Timeout",
    "Bad Gateway",
];

/// A task fails when a roll of 1..=FAILURE_DIE_SIDES comes up as the top face
pub const FAILURE_DIE_SIDES: u32 = 6;

/// Simulated task failure
///
/// The only recoverable error kind in the service. It is reported to
/// clients in the `/slow` response body, never as an HTTP error status.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{message}")]
pub struct TaskFailure {
    message: &'static str,
}

impl TaskFailure {
    /// Get the human-readable failure message
    pub fn message(&self) -> &'static str {
        self.message
    }
}

/// Result of a single draw, before any time has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Succeed after sleeping for `duration_ms`
    Success { duration_ms: u64 },
    /// Fail immediately
    Failure(TaskFailure),
}

/// Pick a duration uniformly from [`DURATIONS_MS`]
pub fn pick_duration<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    DURATIONS_MS[rng.random_range(0..DURATIONS_MS.len())]
}

/// Decide whether the task fails, and with which message
///
/// Returns `Some` with probability `1 / FAILURE_DIE_SIDES`.
pub fn pick_failure<R: Rng + ?Sized>(rng: &mut R) -> Option<TaskFailure> {
    if rng.random_range(1..=FAILURE_DIE_SIDES) != FAILURE_DIE_SIDES {
        return None;
    }

    let message = FAILURE_MESSAGES[rng.random_range(0..FAILURE_MESSAGES.len())];
    Some(TaskFailure { message })
}

/// Draw a complete outcome
///
/// The duration is always drawn first so the failure decision stays
/// independent of it; a failure simply discards the drawn duration.
pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> TaskOutcome {
    let duration_ms = pick_duration(rng);
    match pick_failure(rng) {
        Some(failure) => TaskOutcome::Failure(failure),
        None => TaskOutcome::Success { duration_ms },
    }
}

/// Carry out a drawn outcome
///
/// Success suspends the calling task (without blocking the runtime) for the
/// drawn duration and then yields it. Failure returns at once.
pub async fn complete(outcome: TaskOutcome) -> Result<u64, TaskFailure> {
    match outcome {
        TaskOutcome::Success { duration_ms } => {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
            Ok(duration_ms)
        }
        TaskOutcome::Failure(failure) => Err(failure),
    }
}

/// Run the simulated task once using the thread-local generator
pub async fn run_task() -> Result<u64, TaskFailure> {
    // ThreadRng is !Send; keep it out of the await.
    let outcome = draw(&mut rand::rng());
    complete(outcome).await
}
