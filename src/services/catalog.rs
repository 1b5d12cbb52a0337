// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalog service.
//!
//! Handles:
//! 1. Seeding the predefined exercises the first time a user's catalog is read
//! 2. Validating and storing user-defined exercises
//! 3. Resolving the exercises picked for a new session
//! 4. Cleaning up duplicate entries

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{CalorieModel, Exercise, ExerciseCategory, ExerciseInput};

/// Built-in exercises: (id, name, category, calorie model, description).
const PREDEFINED: [(&str, &str, ExerciseCategory, CalorieModel, &str); 7] = [
    (
        "ex-1",
        "Abdominales",
        ExerciseCategory::Strength,
        CalorieModel::RepBased(0.15),
        "Abdominales tradicionales",
    ),
    (
        "ex-2",
        "Flexiones",
        ExerciseCategory::Strength,
        CalorieModel::RepBased(0.32),
        "Flexiones de pecho",
    ),
    (
        "ex-3",
        "Sentadillas",
        ExerciseCategory::Strength,
        CalorieModel::RepBased(0.28),
        "Sentadillas sin peso",
    ),
    (
        "ex-4",
        "Plancha",
        ExerciseCategory::Strength,
        CalorieModel::DurationBased(3.5),
        "Plancha isométrica",
    ),
    (
        "ex-5",
        "Burpees",
        ExerciseCategory::Cardio,
        CalorieModel::RepBased(0.5),
        "Burpees completos",
    ),
    (
        "ex-6",
        "Saltar la cuerda",
        ExerciseCategory::Cardio,
        CalorieModel::DurationBased(12.0),
        "Saltar la cuerda",
    ),
    (
        "ex-7",
        "Estiramientos",
        ExerciseCategory::Flexibility,
        CalorieModel::DurationBased(2.0),
        "Rutina de estiramientos",
    ),
];

/// The built-in exercises, stamped with `created_at`.
pub fn predefined_exercises(created_at: DateTime<Utc>) -> Vec<Exercise> {
    PREDEFINED
        .iter()
        .map(|(id, name, category, model, description)| Exercise {
            id: id.to_string(),
            name: name.to_string(),
            category: *category,
            is_custom: false,
            calorie_model: *model,
            description: Some(description.to_string()),
            created_at,
        })
        .collect()
}

/// Exercise catalog operations for one store.
#[derive(Clone)]
pub struct ExerciseCatalog<S> {
    store: S,
}

impl<S: Store> ExerciseCatalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All exercises of a user, seeding the predefined set if it is missing.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Exercise>> {
        let mut exercises = self.store.load_exercises(user_id).await?;

        if exercises.iter().all(|e| e.is_custom) {
            let seed = predefined_exercises(Utc::now());
            self.store.save_exercises(user_id, &seed).await?;
            tracing::info!(user_id, count = seed.len(), "Seeded predefined exercises");

            // Seeded entries are the newest, so they go last in creation order.
            exercises.extend(seed);
        }

        Ok(exercises)
    }

    /// Resolve `ids` against the catalog, keeping the requested order.
    pub async fn select(&self, user_id: &str, ids: &[String]) -> Result<Vec<Exercise>> {
        let catalog = self.list(user_id).await?;

        ids.iter()
            .map(|id| {
                catalog
                    .iter()
                    .find(|e| &e.id == id)
                    .cloned()
                    .ok_or_else(|| AppError::NotFound(format!("Exercise {} not found", id)))
            })
            .collect()
    }

    /// Create a user-defined exercise.
    pub async fn create(&self, user_id: &str, input: ExerciseInput) -> Result<Exercise> {
        input.validate()?;

        let now = Utc::now();
        let id = format!("custom-{}", now.timestamp_nanos_opt().unwrap_or_default());
        let exercise = input.into_exercise(id, now);

        self.store.save_exercise(user_id, &exercise).await?;
        tracing::info!(user_id, exercise_id = %exercise.id, "Custom exercise created");
        Ok(exercise)
    }

    /// Edit a user-defined exercise. Predefined exercises are read-only.
    pub async fn update(
        &self,
        user_id: &str,
        exercise_id: &str,
        input: ExerciseInput,
    ) -> Result<Exercise> {
        input.validate()?;

        let mut exercise = self.find_custom(user_id, exercise_id).await?;
        input.apply_to(&mut exercise);

        self.store.update_exercise(user_id, &exercise).await?;
        tracing::info!(user_id, exercise_id, "Custom exercise updated");
        Ok(exercise)
    }

    /// Delete a user-defined exercise. Past workouts keep their snapshot.
    pub async fn delete(&self, user_id: &str, exercise_id: &str) -> Result<()> {
        self.find_custom(user_id, exercise_id).await?;
        self.store.delete_exercise(user_id, exercise_id).await?;
        tracing::info!(user_id, exercise_id, "Custom exercise deleted");
        Ok(())
    }

    /// Remove exercises whose names collide (trimmed, case-insensitive).
    ///
    /// Predefined entries win over custom ones, then older over newer.
    /// Returns how many exercises were removed.
    pub async fn remove_duplicates(&self, user_id: &str) -> Result<usize> {
        let mut exercises = self.store.load_exercises(user_id).await?;
        exercises.sort_by(|a, b| {
            a.is_custom
                .cmp(&b.is_custom)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut seen = HashSet::new();
        let duplicates: Vec<String> = exercises
            .into_iter()
            .filter(|e| !seen.insert(e.dedupe_key()))
            .map(|e| e.id)
            .collect();

        if !duplicates.is_empty() {
            self.store.delete_exercises(user_id, &duplicates).await?;
        }

        tracing::info!(user_id, removed = duplicates.len(), "Duplicate exercises removed");
        Ok(duplicates.len())
    }

    async fn find_custom(&self, user_id: &str, exercise_id: &str) -> Result<Exercise> {
        let exercise = self
            .store
            .load_exercises(user_id)
            .await?
            .into_iter()
            .find(|e| e.id == exercise_id)
            .ok_or_else(|| AppError::NotFound(format!("Exercise {} not found", exercise_id)))?;

        if !exercise.is_custom {
            return Err(AppError::BadRequest(format!(
                "Exercise {} is predefined and cannot be modified",
                exercise_id
            )));
        }
        Ok(exercise)
    }
}
