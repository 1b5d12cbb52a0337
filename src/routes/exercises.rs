// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalog routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Exercise, ExerciseInput};
use crate::routes::validate_id;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/exercises", get(list_exercises).post(create_exercise))
        .route(
            "/api/exercises/{id}",
            put(update_exercise).delete(delete_exercise),
        )
        .route("/api/exercises/dedupe", post(remove_duplicates))
}

/// List the user's catalog, seeding the predefined exercises on first use.
async fn list_exercises(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Exercise>>> {
    Ok(Json(state.catalog.list(&user.user_id).await?))
}

async fn create_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<ExerciseInput>,
) -> Result<(StatusCode, Json<Exercise>)> {
    let exercise = state.catalog.create(&user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

async fn update_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<ExerciseInput>,
) -> Result<Json<Exercise>> {
    validate_id(&id)?;
    Ok(Json(state.catalog.update(&user.user_id, &id, input).await?))
}

async fn delete_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    validate_id(&id)?;
    state.catalog.delete(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DedupeResponse {
    pub removed: usize,
}

async fn remove_duplicates(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DedupeResponse>> {
    let removed = state.catalog.remove_duplicates(&user.user_id).await?;
    Ok(Json(DedupeResponse { removed }))
}
