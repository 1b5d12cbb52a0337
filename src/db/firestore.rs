// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Exercises (per-user catalog, predefined and custom)
//! - Workouts (finished sessions, create-only)
//!
//! Both collections are flat; each document carries the owning `user_id`
//! and its ID is prefixed with it so catalogs of different users never
//! collide. Reads by ID also check the stored owner.

use crate::db::{collections, sort_newest_first, sort_oldest_first, Store};
use crate::error::AppError;
use crate::models::{Exercise, Workout};
use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Stored exercise document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExerciseDoc {
    user_id: String,
    exercise: Exercise,
}

/// Stored workout document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkoutDoc {
    user_id: String,
    workout: Workout,
}

/// Document ID for a user-owned record.
///
/// Neither escaped part contains `_`, so the separator is unambiguous.
fn doc_id(user_id: &str, id: &str) -> String {
    format!("{}_{}", escape_key_part(user_id), escape_key_part(id))
}

/// Percent-encode one part of a document ID. `urlencoding` leaves `_`
/// alone, so it is escaped here.
fn escape_key_part(part: &str) -> String {
    urlencoding::encode(part).replace('_', "%5F")
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client; every operation returns a database error.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    async fn get_exercise_doc(
        &self,
        user_id: &str,
        exercise_id: &str,
    ) -> Result<Option<ExerciseDoc>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EXERCISES)
            .obj()
            .one(&doc_id(user_id, exercise_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
            .map(|doc: Option<ExerciseDoc>| doc.filter(|d| d.user_id == user_id))
    }

    async fn get_workout_doc(
        &self,
        user_id: &str,
        workout_id: &str,
    ) -> Result<Option<WorkoutDoc>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::WORKOUTS)
            .obj()
            .one(&doc_id(user_id, workout_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
            .map(|doc: Option<WorkoutDoc>| doc.filter(|d| d.user_id == user_id))
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete(&self, doc_ids: &[String], collection: &str) -> Result<(), AppError> {
        let client = self.get_client()?;

        for chunk in doc_ids.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for doc_id in chunk {
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

impl Store for FirestoreDb {
    // ─── Exercise Operations ─────────────────────────────────────

    async fn load_exercises(&self, user_id: &str) -> Result<Vec<Exercise>, AppError> {
        let docs: Vec<ExerciseDoc> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::EXERCISES)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut exercises: Vec<Exercise> = docs.into_iter().map(|d| d.exercise).collect();
        sort_oldest_first(&mut exercises);
        Ok(exercises)
    }

    async fn save_exercise(&self, user_id: &str, exercise: &Exercise) -> Result<(), AppError> {
        let doc = ExerciseDoc {
            user_id: user_id.to_string(),
            exercise: exercise.clone(),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::EXERCISES)
            .document_id(doc_id(user_id, &exercise.id))
            .object(&doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Uses concurrent writes with a limit to avoid overloading Firestore.
    async fn save_exercises(&self, user_id: &str, exercises: &[Exercise]) -> Result<(), AppError> {
        let client = self.get_client()?;

        stream::iter(exercises.to_vec())
            .map(|exercise| async move {
                let doc = ExerciseDoc {
                    user_id: user_id.to_string(),
                    exercise,
                };

                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::EXERCISES)
                    .document_id(doc_id(user_id, &doc.exercise.id))
                    .object(&doc)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(())
    }

    async fn update_exercise(&self, user_id: &str, exercise: &Exercise) -> Result<(), AppError> {
        if self.get_exercise_doc(user_id, &exercise.id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Exercise {} not found",
                exercise.id
            )));
        }
        self.save_exercise(user_id, exercise).await
    }

    async fn delete_exercise(&self, user_id: &str, exercise_id: &str) -> Result<(), AppError> {
        if self.get_exercise_doc(user_id, exercise_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Exercise {} not found",
                exercise_id
            )));
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::EXERCISES)
            .document_id(doc_id(user_id, exercise_id))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_exercises(
        &self,
        user_id: &str,
        exercise_ids: &[String],
    ) -> Result<(), AppError> {
        let doc_ids: Vec<String> = exercise_ids.iter().map(|id| doc_id(user_id, id)).collect();
        self.batch_delete(&doc_ids, collections::EXERCISES).await?;
        tracing::debug!(user_id, count = doc_ids.len(), "Deleted exercises");
        Ok(())
    }

    // ─── Workout Operations ──────────────────────────────────────

    async fn save_workout(&self, user_id: &str, workout: &Workout) -> Result<String, AppError> {
        let doc = WorkoutDoc {
            user_id: user_id.to_string(),
            workout: workout.clone(),
        };

        let _: WorkoutDoc = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::WORKOUTS)
            .document_id(doc_id(user_id, &workout.id))
            .object(&doc)
            .execute()
            .await
            .map_err(|e| match e {
                firestore::errors::FirestoreError::DataConflictError(_) => {
                    AppError::Conflict(format!("Workout {} already exists", workout.id))
                }
                other => AppError::Database(other.to_string()),
            })?;

        Ok(workout.id.clone())
    }

    async fn load_workouts(&self, user_id: &str) -> Result<Vec<Workout>, AppError> {
        let docs: Vec<WorkoutDoc> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUTS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Sorted here: RFC3339 strings with varying fractional digits don't
        // order correctly as Firestore strings.
        let mut workouts: Vec<Workout> = docs.into_iter().map(|d| d.workout).collect();
        sort_newest_first(&mut workouts);
        Ok(workouts)
    }

    async fn load_workout(
        &self,
        user_id: &str,
        workout_id: &str,
    ) -> Result<Option<Workout>, AppError> {
        Ok(self
            .get_workout_doc(user_id, workout_id)
            .await?
            .map(|d| d.workout))
    }

    async fn delete_workout(&self, user_id: &str, workout_id: &str) -> Result<(), AppError> {
        if self.get_workout_doc(user_id, workout_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Workout {} not found",
                workout_id
            )));
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::WORKOUTS)
            .document_id(doc_id(user_id, workout_id))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(user_id, workout_id, "Workout deleted");
        Ok(())
    }
}
