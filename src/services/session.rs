// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Active-workout session state machine.
//!
//! A session is either idle or holds one in-progress workout: the exercises
//! picked at start, the sets logged against each, and an elapsed-time
//! counter that the caller advances. Finishing computes calories, hands the
//! workout to the store and returns to idle; if the store fails, the session
//! is left exactly as it was so finishing can be retried.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{Exercise, Set, SetKind, SetMeasure, Workout, WorkoutExercise};
use crate::services::calories::{calculate_exercise_calories, calculate_workout_calories};
use crate::services::persist::{save_workout_with_retry, PersistPolicy};
use crate::time_utils::format_utc_rfc3339;

/// Errors from session operations that don't involve storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("A workout is already in progress")]
    AlreadyActive,

    #[error("No workout is in progress")]
    Inactive,

    #[error("Elapsed time cannot be negative (got {0})")]
    NegativeElapsed(i64),

    #[error("Exercise {exercise_id} records sets as {expected:?}")]
    MeasureMismatch {
        exercise_id: String,
        expected: SetKind,
    },

    #[error("Sets must record a positive number of reps or seconds")]
    NonPositive,
}

impl SessionError {
    /// Whether the error comes from the order of calls rather than their input.
    pub fn is_state_error(&self) -> bool {
        matches!(self, SessionError::AlreadyActive | SessionError::Inactive)
    }
}

/// The workout being built while a session is active.
#[derive(Debug, Clone)]
struct ActiveWorkout {
    start_time: DateTime<Utc>,
    elapsed_seconds: u64,
    exercises: Vec<WorkoutExercise>,
}

impl ActiveWorkout {
    fn find_mut(&mut self, exercise_id: &str) -> Option<&mut WorkoutExercise> {
        self.exercises
            .iter_mut()
            .find(|e| e.exercise.id == exercise_id)
    }

    fn to_workout(&self, end_time: DateTime<Utc>, notes: Option<String>) -> Workout {
        Workout {
            id: format!("workout-{}", end_time.timestamp_millis()),
            start_time: self.start_time,
            end_time,
            duration_seconds: self.elapsed_seconds,
            exercises: self.exercises.clone(),
            total_calories: calculate_workout_calories(&self.exercises),
            notes,
        }
    }
}

#[derive(Debug, Clone, Default)]
enum SessionState {
    #[default]
    Idle,
    Active(ActiveWorkout),
}

/// One user's workout session.
#[derive(Debug, Clone, Default)]
pub struct WorkoutSession {
    state: SessionState,
}

impl WorkoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    /// Elapsed seconds of the active workout; 0 when idle.
    pub fn elapsed_seconds(&self) -> u64 {
        match &self.state {
            SessionState::Active(active) => active.elapsed_seconds,
            SessionState::Idle => 0,
        }
    }

    /// Exercises and sets of the active workout; empty when idle.
    pub fn exercises(&self) -> &[WorkoutExercise] {
        match &self.state {
            SessionState::Active(active) => &active.exercises,
            SessionState::Idle => &[],
        }
    }

    /// Begin a workout with the given exercises, in order.
    ///
    /// Repeated exercise IDs keep only their first occurrence.
    pub fn start(&mut self, exercises: Vec<Exercise>) -> std::result::Result<(), SessionError> {
        if self.is_active() {
            return Err(SessionError::AlreadyActive);
        }

        let mut selected: Vec<WorkoutExercise> = Vec::with_capacity(exercises.len());
        for exercise in exercises {
            if selected.iter().all(|e| e.exercise.id != exercise.id) {
                selected.push(WorkoutExercise::new(exercise));
            }
        }

        self.state = SessionState::Active(ActiveWorkout {
            start_time: Utc::now(),
            elapsed_seconds: 0,
            exercises: selected,
        });
        Ok(())
    }

    /// Append a set to an exercise of the active workout.
    ///
    /// Returns `Ok(None)` without changing anything when the exercise isn't
    /// part of this workout.
    pub fn add_set(
        &mut self,
        exercise_id: &str,
        measure: SetMeasure,
    ) -> std::result::Result<Option<Set>, SessionError> {
        let SessionState::Active(active) = &mut self.state else {
            return Err(SessionError::Inactive);
        };
        let Some(entry) = active.find_mut(exercise_id) else {
            return Ok(None);
        };
        if !measure.is_positive() {
            return Err(SessionError::NonPositive);
        }

        let expected = entry.exercise.set_kind();
        if measure.kind() != expected {
            return Err(SessionError::MeasureMismatch {
                exercise_id: exercise_id.to_string(),
                expected,
            });
        }

        let set = Set {
            set_number: entry.sets.len() as u32 + 1,
            measure,
            timestamp: Utc::now(),
        };
        entry.sets.push(set.clone());
        Ok(Some(set))
    }

    /// Drop the most recent set of an exercise.
    ///
    /// Returns `Ok(None)` when the exercise isn't part of this workout or
    /// has no sets yet.
    pub fn remove_last_set(
        &mut self,
        exercise_id: &str,
    ) -> std::result::Result<Option<Set>, SessionError> {
        let SessionState::Active(active) = &mut self.state else {
            return Err(SessionError::Inactive);
        };
        Ok(active
            .find_mut(exercise_id)
            .and_then(|entry| entry.sets.pop()))
    }

    /// Set the elapsed-time counter to an absolute value.
    pub fn update_elapsed_time(&mut self, seconds: i64) -> std::result::Result<(), SessionError> {
        let SessionState::Active(active) = &mut self.state else {
            return Err(SessionError::Inactive);
        };
        if seconds < 0 {
            return Err(SessionError::NegativeElapsed(seconds));
        }
        active.elapsed_seconds = seconds as u64;
        Ok(())
    }

    /// Finalize the workout, persist it and return to idle.
    ///
    /// On any storage error the session stays active and unchanged.
    pub async fn finish<S: Store>(
        &mut self,
        store: &S,
        user_id: &str,
        notes: Option<String>,
        policy: &PersistPolicy,
    ) -> Result<Workout> {
        let workout = match &self.state {
            SessionState::Active(active) => active.to_workout(Utc::now(), notes),
            SessionState::Idle => return Err(SessionError::Inactive.into()),
        };

        save_workout_with_retry(store, user_id, &workout, policy).await?;

        tracing::info!(
            user_id,
            workout_id = %workout.id,
            start_time = %format_utc_rfc3339(workout.start_time),
            duration_seconds = workout.duration_seconds,
            exercises = workout.exercises.len(),
            sets = workout.total_sets(),
            total_calories = workout.total_calories,
            "Workout finished"
        );

        self.reset();
        Ok(workout)
    }

    /// Abandon the current workout without saving anything.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Read-only view of the session for display.
    pub fn snapshot(&self) -> SessionSnapshot {
        match &self.state {
            SessionState::Idle => SessionSnapshot::default(),
            SessionState::Active(active) => {
                let exercises: Vec<ExerciseProgress> = active
                    .exercises
                    .iter()
                    .map(|entry| ExerciseProgress {
                        set_kind: entry.exercise.set_kind(),
                        calories: calculate_exercise_calories(&entry.exercise, &entry.sets),
                        exercise: entry.exercise.clone(),
                        sets: entry.sets.clone(),
                    })
                    .collect();

                SessionSnapshot {
                    active: true,
                    start_time: Some(active.start_time),
                    elapsed_seconds: active.elapsed_seconds,
                    estimated_calories: exercises.iter().map(|e| e.calories).sum(),
                    exercises,
                }
            }
        }
    }
}

/// Per-exercise progress within a session snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseProgress {
    pub exercise: Exercise,
    /// Which field new sets of this exercise must carry
    pub set_kind: SetKind,
    pub sets: Vec<Set>,
    pub calories: f64,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    pub active: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub elapsed_seconds: u64,
    pub exercises: Vec<ExerciseProgress>,
    pub estimated_calories: f64,
}

/// Per-user sessions shared across requests.
pub type SessionRegistry = Arc<DashMap<String, Arc<Mutex<WorkoutSession>>>>;

/// The session of `user_id`, created idle on first use.
///
/// The returned handle is locked by the caller; the map shard lock is
/// released before that happens.
pub fn session_for(registry: &SessionRegistry, user_id: &str) -> Arc<Mutex<WorkoutSession>> {
    registry
        .entry(user_id.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(WorkoutSession::new())))
        .clone()
}

/// The session of `user_id` if one exists. Never creates an entry.
pub fn existing_session(
    registry: &SessionRegistry,
    user_id: &str,
) -> Option<Arc<Mutex<WorkoutSession>>> {
    registry.get(user_id).map(|entry| entry.value().clone())
}

/// Drop the entry of `user_id` when it is idle and no request holds it.
///
/// Callers must release their own handle first. `remove_if` holds the
/// shard write lock, so `session_for` can't hand out a new clone while the
/// count is checked.
pub fn release_if_idle(registry: &SessionRegistry, user_id: &str) -> bool {
    registry
        .remove_if(user_id, |_, handle| {
            Arc::strong_count(handle) == 1
                && handle
                    .try_lock()
                    .map(|session| !session.is_active())
                    .unwrap_or(false)
        })
        .is_some()
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        if err.is_state_error() {
            AppError::InvalidState(err)
        } else {
            AppError::BadRequest(err.to_string())
        }
    }
}
