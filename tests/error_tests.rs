// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use rutina_tracker::error::AppError;
use rutina_tracker::models::SetKind;
use rutina_tracker::services::SessionError;

#[test]
fn test_is_transient_matches() {
    assert!(AppError::Database("unavailable".to_string()).is_transient());
    assert!(AppError::Timeout("save took too long".to_string()).is_transient());
}

#[test]
fn test_is_transient_no_match() {
    assert!(!AppError::Conflict("workout-1".to_string()).is_transient());
    assert!(!AppError::NotFound("workout-1".to_string()).is_transient());
    assert!(!AppError::BadRequest("Bad Request".to_string()).is_transient());
    assert!(!AppError::InvalidState(SessionError::Inactive).is_transient());
}

#[test]
fn test_session_errors_map_by_kind() {
    assert!(matches!(
        AppError::from(SessionError::AlreadyActive),
        AppError::InvalidState(SessionError::AlreadyActive)
    ));
    assert!(matches!(
        AppError::from(SessionError::NegativeElapsed(-1)),
        AppError::BadRequest(_)
    ));
    assert!(matches!(
        AppError::from(SessionError::MeasureMismatch {
            exercise_id: "ex-1".to_string(),
            expected: SetKind::Reps,
        }),
        AppError::BadRequest(_)
    ));
}

#[test]
fn test_status_codes() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
        (AppError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
        (
            AppError::InvalidState(SessionError::Inactive),
            StatusCode::CONFLICT,
        ),
        (AppError::Conflict("x".to_string()), StatusCode::CONFLICT),
        (
            AppError::Database("x".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (AppError::Timeout("x".to_string()), StatusCode::GATEWAY_TIMEOUT),
        (
            AppError::Internal(anyhow::anyhow!("boom")),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, expected) in cases {
        let label = err.to_string();
        assert_eq!(err.into_response().status(), expected, "{}", label);
    }
}
