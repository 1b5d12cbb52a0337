// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout records: sets, per-exercise groupings and finished workouts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Exercise, SetKind};

/// What a single set recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SetMeasure {
    Reps { count: u32 },
    Duration { seconds: u32 },
}

impl SetMeasure {
    pub fn kind(&self) -> SetKind {
        match self {
            SetMeasure::Reps { .. } => SetKind::Reps,
            SetMeasure::Duration { .. } => SetKind::Duration,
        }
    }

    /// Zero reps or zero seconds never describe a performed set.
    pub fn is_positive(&self) -> bool {
        match *self {
            SetMeasure::Reps { count } => count > 0,
            SetMeasure::Duration { seconds } => seconds > 0,
        }
    }
}

/// One recorded performance unit within an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Set {
    /// 1-based, sequential per exercise within a session
    pub set_number: u32,
    pub measure: SetMeasure,
    pub timestamp: DateTime<Utc>,
}

/// An exercise snapshot plus the sets performed against it, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub exercise: Exercise,
    #[serde(default)]
    pub sets: Vec<Set>,
}

impl WorkoutExercise {
    pub fn new(exercise: Exercise) -> Self {
        Self {
            exercise,
            sets: Vec::new(),
        }
    }
}

/// A finished, immutable workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// `workout-<unix millis>`, also part of the document ID
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Elapsed-time counter at finish; not derived from start/end
    pub duration_seconds: u64,
    pub exercises: Vec<WorkoutExercise>,
    /// Sum of per-exercise calories computed at finish
    pub total_calories: f64,
    pub notes: Option<String>,
}

impl Workout {
    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}
