// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with `FIRESTORE_EMULATOR_HOST` pointing at it; otherwise they are skipped.
//!
//! The emulator provides a clean state for each test run.

use chrono::{Duration, TimeZone, Utc};
use rutina_tracker::db::Store;
use rutina_tracker::error::AppError;
use rutina_tracker::models::{
    CalorieModel, Exercise, ExerciseCategory, Set, SetMeasure, Workout, WorkoutExercise,
};
use rutina_tracker::services::catalog::predefined_exercises;
use rutina_tracker::services::ExerciseCatalog;

mod common;
use common::test_db;

/// Generate a unique user ID for test isolation.
fn unique_user_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test-user-{}", nanos)
}

fn custom_exercise(id: &str, name: &str) -> Exercise {
    Exercise {
        id: id.to_string(),
        name: name.to_string(),
        category: ExerciseCategory::Cardio,
        is_custom: true,
        calorie_model: CalorieModel::DurationBased(8.0),
        description: Some("Máquina de remo".to_string()),
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
    }
}

fn workout(id: &str, days_ago: i64) -> Workout {
    let start = Utc.with_ymd_and_hms(2024, 3, 10, 18, 0, 0).unwrap() - Duration::days(days_ago);
    let exercise = custom_exercise("custom-1", "Remo");
    Workout {
        id: id.to_string(),
        start_time: start,
        end_time: start + Duration::minutes(20),
        duration_seconds: 1200,
        exercises: vec![WorkoutExercise {
            exercise,
            sets: vec![Set {
                set_number: 1,
                measure: SetMeasure::Duration { seconds: 600 },
                timestamp: start + Duration::minutes(10),
            }],
        }],
        total_calories: 80.0,
        notes: Some("Tarde tranquila".to_string()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// EXERCISE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_exercise_crud() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    assert!(db.load_exercises(&user_id).await.unwrap().is_empty());

    let mut exercise = custom_exercise("custom-1", "Remo");
    db.save_exercise(&user_id, &exercise).await.unwrap();

    let loaded = db.load_exercises(&user_id).await.unwrap();
    assert_eq!(loaded, vec![exercise.clone()]);

    exercise.name = "Remo intenso".to_string();
    exercise.calorie_model = CalorieModel::DurationBased(11.0);
    db.update_exercise(&user_id, &exercise).await.unwrap();
    assert_eq!(db.load_exercises(&user_id).await.unwrap()[0], exercise);

    db.delete_exercise(&user_id, "custom-1").await.unwrap();
    assert!(db.load_exercises(&user_id).await.unwrap().is_empty());

    assert!(matches!(
        db.delete_exercise(&user_id, "custom-1").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        db.update_exercise(&user_id, &exercise).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_bulk_save_and_delete() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    let seed = predefined_exercises(Utc::now());
    db.save_exercises(&user_id, &seed).await.unwrap();
    assert_eq!(db.load_exercises(&user_id).await.unwrap().len(), seed.len());

    let ids: Vec<String> = seed.iter().take(3).map(|e| e.id.clone()).collect();
    db.delete_exercises(&user_id, &ids).await.unwrap();
    assert_eq!(
        db.load_exercises(&user_id).await.unwrap().len(),
        seed.len() - 3
    );
}

#[tokio::test]
async fn test_catalog_seeding_against_firestore() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();
    let catalog = ExerciseCatalog::new(db.clone());

    let first = catalog.list(&user_id).await.unwrap();
    let second = catalog.list(&user_id).await.unwrap();

    assert_eq!(first.len(), 7);
    assert_eq!(second.len(), 7);
}

#[tokio::test]
async fn test_exercises_scoped_by_user() {
    require_emulator!();

    let db = test_db().await;
    let alice = unique_user_id();
    let bob = unique_user_id();

    db.save_exercise(&alice, &custom_exercise("custom-1", "Remo"))
        .await
        .unwrap();

    assert!(db.load_exercises(&bob).await.unwrap().is_empty());
    assert!(matches!(
        db.delete_exercise(&bob, "custom-1").await,
        Err(AppError::NotFound(_))
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// WORKOUT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_workout_roundtrip() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();
    let original = workout("workout-1710093600000", 0);

    let id = db.save_workout(&user_id, &original).await.unwrap();
    assert_eq!(id, original.id);

    let fetched = db.load_workout(&user_id, &id).await.unwrap();
    assert_eq!(fetched, Some(original));
}

#[tokio::test]
async fn test_workout_save_is_create_only() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();
    let original = workout("workout-1", 0);

    db.save_workout(&user_id, &original).await.unwrap();
    assert!(matches!(
        db.save_workout(&user_id, &original).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_workouts_newest_first_and_delete() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    for (id, days_ago) in [("workout-a", 3), ("workout-b", 0), ("workout-c", 7)] {
        db.save_workout(&user_id, &workout(id, days_ago))
            .await
            .unwrap();
    }

    let ids: Vec<String> = db
        .load_workouts(&user_id)
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.id)
        .collect();
    assert_eq!(ids, vec!["workout-b", "workout-a", "workout-c"]);

    db.delete_workout(&user_id, "workout-a").await.unwrap();
    assert_eq!(db.load_workouts(&user_id).await.unwrap().len(), 2);
    assert!(db.load_workout(&user_id, "workout-a").await.unwrap().is_none());
    assert!(matches!(
        db.delete_workout(&user_id, "workout-a").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_workout_ids_cannot_reach_across_users() {
    require_emulator!();

    let db = test_db().await;
    let prefix = unique_user_id();
    let owner = format!("{}_b", prefix);
    let original = workout("workout-1", 0);
    db.save_workout(&owner, &original).await.unwrap();

    // Would join to the owner's key if `_` went unescaped
    let crafted = format!("b_{}", original.id);
    assert!(db.load_workout(&prefix, &crafted).await.unwrap().is_none());
    assert!(matches!(
        db.delete_workout(&prefix, &crafted).await,
        Err(AppError::NotFound(_))
    ));

    assert_eq!(db.load_workout(&owner, &original.id).await.unwrap(), Some(original));
}
