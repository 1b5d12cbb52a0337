// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bounded retry with a per-attempt timeout for saving finished workouts.
//!
//! Finishing a session is the only point where a whole workout becomes
//! durable, so the write gets a few attempts before the error reaches the
//! caller.

use std::time::Duration;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::Workout;

/// How hard to try when persisting a finished workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistPolicy {
    /// Upper bound for one `save_workout` call
    pub timeout: Duration,
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Pause between attempts
    pub backoff: Duration,
}

impl Default for PersistPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Save `workout`, retrying transient failures according to `policy`.
///
/// A `Conflict` on a retry means an earlier, timed-out attempt did land;
/// that counts as success.
pub async fn save_workout_with_retry<S: Store>(
    store: &S,
    user_id: &str,
    workout: &Workout,
    policy: &PersistPolicy,
) -> Result<String> {
    let mut attempt = 1;

    loop {
        let result = match tokio::time::timeout(policy.timeout, store.save_workout(user_id, workout))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(format!(
                "Saving workout {} took longer than {:?}",
                workout.id, policy.timeout
            ))),
        };

        match result {
            Ok(id) => {
                if attempt > 1 {
                    tracing::info!(user_id, workout_id = %id, attempt, "Workout saved after retry");
                }
                return Ok(id);
            }
            Err(AppError::Conflict(_)) if attempt > 1 => {
                tracing::info!(
                    user_id,
                    workout_id = %workout.id,
                    attempt,
                    "Workout already stored by an earlier attempt"
                );
                return Ok(workout.id.clone());
            }
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                tracing::warn!(
                    user_id,
                    workout_id = %workout.id,
                    attempt,
                    error = %e,
                    "Saving workout failed, retrying"
                );
                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(
                    user_id,
                    workout_id = %workout.id,
                    attempt,
                    error = %e,
                    "Saving workout failed"
                );
                return Err(e);
            }
        }
    }
}
