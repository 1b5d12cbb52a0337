// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Active workout session routes.
//!
//! Each user has at most one session. Requests for the same user are
//! serialized on that session's lock; finishing holds it while the workout
//! is written so no set can slip in between.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Set, SetMeasure, Workout};
use crate::routes::validate_id;
use crate::services::{
    existing_session, release_if_idle, session_for, SessionError, SessionSnapshot,
    WorkoutSession,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_SESSION_EXERCISES: usize = 50;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/session/start", post(start_session))
        .route("/api/session/sets", post(add_set))
        .route(
            "/api/session/sets/{exercise_id}/last",
            delete(remove_last_set),
        )
        .route("/api/session/elapsed", put(update_elapsed))
        .route("/api/session/finish", post(finish_session))
        .route("/api/session/reset", post(reset_session))
}

/// The user's session for operations that need one. Only `start` creates
/// sessions, so a missing entry means idle.
fn current_session(state: &AppState, user_id: &str) -> Result<Arc<Mutex<WorkoutSession>>> {
    existing_session(&state.sessions, user_id).ok_or_else(|| SessionError::Inactive.into())
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SessionSnapshot>> {
    let Some(handle) = existing_session(&state.sessions, &user.user_id) else {
        return Ok(Json(SessionSnapshot::default()));
    };
    let session = handle.lock().await;
    Ok(Json(session.snapshot()))
}

// ─── Start ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StartRequest {
    pub exercise_ids: Vec<String>,
}

async fn start_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<StartRequest>,
) -> Result<Json<SessionSnapshot>> {
    if request.exercise_ids.is_empty() {
        return Err(AppError::BadRequest(
            "Select at least one exercise".to_string(),
        ));
    }
    if request.exercise_ids.len() > MAX_SESSION_EXERCISES {
        return Err(AppError::BadRequest(format!(
            "At most {} exercises per workout",
            MAX_SESSION_EXERCISES
        )));
    }

    let handle = session_for(&state.sessions, &user.user_id);
    let result = start_locked(&state, &user, &request, &handle).await;
    drop(handle);
    if result.is_err() {
        // A failed start must not leave an idle entry behind
        release_if_idle(&state.sessions, &user.user_id);
    }
    result.map(Json)
}

async fn start_locked(
    state: &AppState,
    user: &AuthUser,
    request: &StartRequest,
    handle: &Mutex<WorkoutSession>,
) -> Result<SessionSnapshot> {
    let mut session = handle.lock().await;

    // Checked before touching the catalog; `start` enforces it again.
    if session.is_active() {
        return Err(SessionError::AlreadyActive.into());
    }

    let exercises = state
        .catalog
        .select(&user.user_id, &request.exercise_ids)
        .await?;
    session.start(exercises)?;

    tracing::info!(
        user_id = %user.user_id,
        exercises = session.exercises().len(),
        "Workout started"
    );

    Ok(session.snapshot())
}

// ─── Sets ────────────────────────────────────────────────────

/// A set as entered by the user: exactly one of the two fields.
#[derive(Deserialize)]
pub struct AddSetRequest {
    pub exercise_id: String,
    pub reps: Option<i64>,
    pub duration_seconds: Option<i64>,
}

impl AddSetRequest {
    fn measure(&self) -> Result<SetMeasure> {
        match (self.reps, self.duration_seconds) {
            (Some(reps), None) => Ok(SetMeasure::Reps {
                count: positive_u32(reps, "reps")?,
            }),
            (None, Some(seconds)) => Ok(SetMeasure::Duration {
                seconds: positive_u32(seconds, "duration_seconds")?,
            }),
            _ => Err(AppError::BadRequest(
                "Provide exactly one of reps or duration_seconds".to_string(),
            )),
        }
    }
}

fn positive_u32(value: i64, field: &str) -> Result<u32> {
    if value <= 0 {
        return Err(AppError::BadRequest(format!("{} must be positive", field)));
    }
    u32::try_from(value).map_err(|_| AppError::BadRequest(format!("{} is too large", field)))
}

/// Result of a set change. `set` is `None` when nothing changed.
#[derive(Serialize)]
pub struct SetChange {
    pub set: Option<Set>,
    pub session: SessionSnapshot,
}

async fn add_set(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<AddSetRequest>,
) -> Result<Json<SetChange>> {
    validate_id(&request.exercise_id)?;
    let measure = request.measure()?;

    let handle = current_session(&state, &user.user_id)?;
    let mut session = handle.lock().await;

    let set = session.add_set(&request.exercise_id, measure)?;
    if set.is_none() {
        tracing::debug!(
            user_id = %user.user_id,
            exercise_id = %request.exercise_id,
            "Set ignored: exercise not in workout"
        );
    }

    Ok(Json(SetChange {
        set,
        session: session.snapshot(),
    }))
}

async fn remove_last_set(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(exercise_id): Path<String>,
) -> Result<Json<SetChange>> {
    validate_id(&exercise_id)?;

    let handle = current_session(&state, &user.user_id)?;
    let mut session = handle.lock().await;

    let set = session.remove_last_set(&exercise_id)?;
    Ok(Json(SetChange {
        set,
        session: session.snapshot(),
    }))
}

// ─── Elapsed Time ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ElapsedRequest {
    pub seconds: i64,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ElapsedResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub elapsed_seconds: u64,
}

/// Called by the client once per second while the workout screen is open.
async fn update_elapsed(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ElapsedRequest>,
) -> Result<Json<ElapsedResponse>> {
    let handle = current_session(&state, &user.user_id)?;
    let mut session = handle.lock().await;

    session.update_elapsed_time(request.seconds)?;
    Ok(Json(ElapsedResponse {
        elapsed_seconds: session.elapsed_seconds(),
    }))
}

// ─── Finish / Reset ──────────────────────────────────────────

#[derive(Deserialize, Validate, Default)]
pub struct FinishRequest {
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

async fn finish_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<FinishRequest>,
) -> Result<(StatusCode, Json<Workout>)> {
    request.validate()?;
    let notes = request
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let handle = current_session(&state, &user.user_id)?;
    let mut session = handle.lock().await;

    let workout = session
        .finish(
            &state.db,
            &user.user_id,
            notes,
            &state.config.persist_policy(),
        )
        .await?;

    drop(session);
    drop(handle);
    release_if_idle(&state.sessions, &user.user_id);

    Ok((StatusCode::CREATED, Json(workout)))
}

/// Abandon the current workout without saving.
async fn reset_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SessionSnapshot>> {
    if let Some(handle) = existing_session(&state.sessions, &user.user_id) {
        let mut session = handle.lock().await;
        if session.is_active() {
            tracing::info!(user_id = %user.user_id, "Workout discarded");
        }
        session.reset();
    }
    release_if_idle(&state.sessions, &user.user_id);

    Ok(Json(SessionSnapshot::default()))
}
