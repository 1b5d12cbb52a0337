// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence layer: Firestore in production, an in-process store offline.
//!
//! Everything is scoped by the authenticated user's ID; one user never sees
//! another user's exercises or workouts.

pub mod firestore;
pub mod memory;

use std::future::Future;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::{Exercise, Workout};

/// Collection names as constants.
pub mod collections {
    /// Exercise catalog entries (keyed by `{user_id}_{exercise_id}`)
    pub const EXERCISES: &str = "exercises";
    /// Finished workouts (keyed by `{user_id}_{workout_id}`)
    pub const WORKOUTS: &str = "workouts";
}

/// Durable storage for the exercise catalog and finished workouts.
pub trait Store: Send + Sync {
    /// All exercises of a user, oldest first.
    fn load_exercises(&self, user_id: &str) -> impl Future<Output = Result<Vec<Exercise>>> + Send;

    /// Create or overwrite one exercise.
    fn save_exercise(
        &self,
        user_id: &str,
        exercise: &Exercise,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Create or overwrite several exercises.
    fn save_exercises(
        &self,
        user_id: &str,
        exercises: &[Exercise],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Overwrite an existing exercise; `NotFound` if it doesn't exist.
    fn update_exercise(
        &self,
        user_id: &str,
        exercise: &Exercise,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete one exercise; `NotFound` if it doesn't exist.
    fn delete_exercise(
        &self,
        user_id: &str,
        exercise_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete several exercises, ignoring IDs that don't exist.
    fn delete_exercises(
        &self,
        user_id: &str,
        exercise_ids: &[String],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Store a finished workout. Create-only: `Conflict` if the ID is taken.
    fn save_workout(
        &self,
        user_id: &str,
        workout: &Workout,
    ) -> impl Future<Output = Result<String>> + Send;

    /// All workouts of a user, newest `start_time` first.
    fn load_workouts(&self, user_id: &str) -> impl Future<Output = Result<Vec<Workout>>> + Send;

    fn load_workout(
        &self,
        user_id: &str,
        workout_id: &str,
    ) -> impl Future<Output = Result<Option<Workout>>> + Send;

    /// Delete a workout; `NotFound` if it doesn't exist.
    fn delete_workout(
        &self,
        user_id: &str,
        workout_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Storage backend selected at startup.
#[derive(Clone)]
pub enum Database {
    Firestore(FirestoreDb),
    Memory(MemoryStore),
}

impl Store for Database {
    async fn load_exercises(&self, user_id: &str) -> Result<Vec<Exercise>> {
        match self {
            Database::Firestore(db) => db.load_exercises(user_id).await,
            Database::Memory(db) => db.load_exercises(user_id).await,
        }
    }

    async fn save_exercise(&self, user_id: &str, exercise: &Exercise) -> Result<()> {
        match self {
            Database::Firestore(db) => db.save_exercise(user_id, exercise).await,
            Database::Memory(db) => db.save_exercise(user_id, exercise).await,
        }
    }

    async fn save_exercises(&self, user_id: &str, exercises: &[Exercise]) -> Result<()> {
        match self {
            Database::Firestore(db) => db.save_exercises(user_id, exercises).await,
            Database::Memory(db) => db.save_exercises(user_id, exercises).await,
        }
    }

    async fn update_exercise(&self, user_id: &str, exercise: &Exercise) -> Result<()> {
        match self {
            Database::Firestore(db) => db.update_exercise(user_id, exercise).await,
            Database::Memory(db) => db.update_exercise(user_id, exercise).await,
        }
    }

    async fn delete_exercise(&self, user_id: &str, exercise_id: &str) -> Result<()> {
        match self {
            Database::Firestore(db) => db.delete_exercise(user_id, exercise_id).await,
            Database::Memory(db) => db.delete_exercise(user_id, exercise_id).await,
        }
    }

    async fn delete_exercises(&self, user_id: &str, exercise_ids: &[String]) -> Result<()> {
        match self {
            Database::Firestore(db) => db.delete_exercises(user_id, exercise_ids).await,
            Database::Memory(db) => db.delete_exercises(user_id, exercise_ids).await,
        }
    }

    async fn save_workout(&self, user_id: &str, workout: &Workout) -> Result<String> {
        match self {
            Database::Firestore(db) => db.save_workout(user_id, workout).await,
            Database::Memory(db) => db.save_workout(user_id, workout).await,
        }
    }

    async fn load_workouts(&self, user_id: &str) -> Result<Vec<Workout>> {
        match self {
            Database::Firestore(db) => db.load_workouts(user_id).await,
            Database::Memory(db) => db.load_workouts(user_id).await,
        }
    }

    async fn load_workout(&self, user_id: &str, workout_id: &str) -> Result<Option<Workout>> {
        match self {
            Database::Firestore(db) => db.load_workout(user_id, workout_id).await,
            Database::Memory(db) => db.load_workout(user_id, workout_id).await,
        }
    }

    async fn delete_workout(&self, user_id: &str, workout_id: &str) -> Result<()> {
        match self {
            Database::Firestore(db) => db.delete_workout(user_id, workout_id).await,
            Database::Memory(db) => db.delete_workout(user_id, workout_id).await,
        }
    }
}

/// Sort workouts newest first.
pub(crate) fn sort_newest_first(workouts: &mut [Workout]) {
    workouts.sort_by(|a, b| b.start_time.cmp(&a.start_time));
}

/// Sort exercises oldest first, ties broken by ID.
pub(crate) fn sort_oldest_first(exercises: &mut [Exercise]) {
    exercises.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}
