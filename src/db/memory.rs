// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store used offline and in tests.

use std::sync::Arc;

use dashmap::DashMap;

use crate::db::{sort_newest_first, sort_oldest_first, Store};
use crate::error::{AppError, Result};
use crate::models::{Exercise, Workout};

/// Exercises and workouts held in memory, keyed by user ID.
///
/// Clones share the same underlying data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    exercises: Arc<DashMap<String, Vec<Exercise>>>,
    workouts: Arc<DashMap<String, Vec<Workout>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn upsert(&self, user_id: &str, exercise: &Exercise) {
        let mut catalog = self.exercises.entry(user_id.to_string()).or_default();
        match catalog.iter_mut().find(|e| e.id == exercise.id) {
            Some(existing) => *existing = exercise.clone(),
            None => catalog.push(exercise.clone()),
        }
    }
}

impl Store for MemoryStore {
    async fn load_exercises(&self, user_id: &str) -> Result<Vec<Exercise>> {
        let mut exercises = self
            .exercises
            .get(user_id)
            .map(|c| c.value().clone())
            .unwrap_or_default();
        sort_oldest_first(&mut exercises);
        Ok(exercises)
    }

    async fn save_exercise(&self, user_id: &str, exercise: &Exercise) -> Result<()> {
        self.upsert(user_id, exercise);
        Ok(())
    }

    async fn save_exercises(&self, user_id: &str, exercises: &[Exercise]) -> Result<()> {
        for exercise in exercises {
            self.upsert(user_id, exercise);
        }
        Ok(())
    }

    async fn update_exercise(&self, user_id: &str, exercise: &Exercise) -> Result<()> {
        let mut catalog = self
            .exercises
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("Exercise {} not found", exercise.id)))?;
        let existing = catalog
            .iter_mut()
            .find(|e| e.id == exercise.id)
            .ok_or_else(|| AppError::NotFound(format!("Exercise {} not found", exercise.id)))?;
        *existing = exercise.clone();
        Ok(())
    }

    async fn delete_exercise(&self, user_id: &str, exercise_id: &str) -> Result<()> {
        let mut catalog = self
            .exercises
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("Exercise {} not found", exercise_id)))?;
        let before = catalog.len();
        catalog.retain(|e| e.id != exercise_id);
        if catalog.len() == before {
            return Err(AppError::NotFound(format!(
                "Exercise {} not found",
                exercise_id
            )));
        }
        Ok(())
    }

    async fn delete_exercises(&self, user_id: &str, exercise_ids: &[String]) -> Result<()> {
        if let Some(mut catalog) = self.exercises.get_mut(user_id) {
            catalog.retain(|e| !exercise_ids.contains(&e.id));
        }
        Ok(())
    }

    async fn save_workout(&self, user_id: &str, workout: &Workout) -> Result<String> {
        let mut history = self.workouts.entry(user_id.to_string()).or_default();
        if history.iter().any(|w| w.id == workout.id) {
            return Err(AppError::Conflict(format!(
                "Workout {} already exists",
                workout.id
            )));
        }
        history.push(workout.clone());
        Ok(workout.id.clone())
    }

    async fn load_workouts(&self, user_id: &str) -> Result<Vec<Workout>> {
        let mut workouts = self
            .workouts
            .get(user_id)
            .map(|h| h.value().clone())
            .unwrap_or_default();
        sort_newest_first(&mut workouts);
        Ok(workouts)
    }

    async fn load_workout(&self, user_id: &str, workout_id: &str) -> Result<Option<Workout>> {
        Ok(self
            .workouts
            .get(user_id)
            .and_then(|h| h.iter().find(|w| w.id == workout_id).cloned()))
    }

    async fn delete_workout(&self, user_id: &str, workout_id: &str) -> Result<()> {
        let mut history = self
            .workouts
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", workout_id)))?;
        let before = history.len();
        history.retain(|w| w.id != workout_id);
        if history.len() == before {
            return Err(AppError::NotFound(format!("Workout {} not found", workout_id)));
        }
        Ok(())
    }
}
