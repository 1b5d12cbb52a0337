// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod exercise;
pub mod workout;

pub use exercise::{CalorieModel, Exercise, ExerciseCategory, ExerciseInput, SetKind};
pub use workout::{Set, SetMeasure, Workout, WorkoutExercise};
