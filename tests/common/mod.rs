// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use rutina_tracker::config::Config;
use rutina_tracker::db::{Database, FirestoreDb, MemoryStore, Store};
use rutina_tracker::error::{AppError, Result};
use rutina_tracker::models::{Exercise, Workout};
use rutina_tracker::routes::create_router;
use rutina_tracker::AppState;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = Database::Memory(MemoryStore::new());
    let state = Arc::new(AppState::new(config, db));

    (create_router(state.clone()), state)
}

/// Create a session token for `user_id`.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    rutina_tracker::middleware::auth::create_jwt(user_id, signing_key).unwrap()
}

/// Send one authenticated request with an optional JSON body.
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    token: &str,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Store whose workout saves can be made to fail or stall.
///
/// Everything except `save_workout` goes straight to the wrapped
/// `MemoryStore`.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    /// Number of upcoming saves that fail with a database error
    failures_left: Arc<AtomicU32>,
    /// Saves never complete
    hang: Arc<AtomicBool>,
    /// The next save is written but its reply never arrives
    land_then_hang: Arc<AtomicBool>,
    attempts: Arc<AtomicU32>,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, count: u32) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    pub fn hang_forever(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub fn land_then_hang_once(&self) {
        self.land_then_hang.store(true, Ordering::SeqCst);
    }

    pub fn save_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Store for FlakyStore {
    async fn load_exercises(&self, user_id: &str) -> Result<Vec<Exercise>> {
        self.inner.load_exercises(user_id).await
    }

    async fn save_exercise(&self, user_id: &str, exercise: &Exercise) -> Result<()> {
        self.inner.save_exercise(user_id, exercise).await
    }

    async fn save_exercises(&self, user_id: &str, exercises: &[Exercise]) -> Result<()> {
        self.inner.save_exercises(user_id, exercises).await
    }

    async fn update_exercise(&self, user_id: &str, exercise: &Exercise) -> Result<()> {
        self.inner.update_exercise(user_id, exercise).await
    }

    async fn delete_exercise(&self, user_id: &str, exercise_id: &str) -> Result<()> {
        self.inner.delete_exercise(user_id, exercise_id).await
    }

    async fn delete_exercises(&self, user_id: &str, exercise_ids: &[String]) -> Result<()> {
        self.inner.delete_exercises(user_id, exercise_ids).await
    }

    async fn save_workout(&self, user_id: &str, workout: &Workout) -> Result<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.hang.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.land_then_hang.swap(false, Ordering::SeqCst) {
            self.inner.save_workout(user_id, workout).await?;
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::Database("injected failure".to_string()));
        }

        self.inner.save_workout(user_id, workout).await
    }

    async fn load_workouts(&self, user_id: &str) -> Result<Vec<Workout>> {
        self.inner.load_workouts(user_id).await
    }

    async fn load_workout(&self, user_id: &str, workout_id: &str) -> Result<Option<Workout>> {
        self.inner.load_workout(user_id, workout_id).await
    }

    async fn delete_workout(&self, user_id: &str, workout_id: &str) -> Result<()> {
        self.inner.delete_workout(user_id, workout_id).await
    }
}
