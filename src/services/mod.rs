// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod calories;
pub mod catalog;
pub mod persist;
pub mod session;

pub use catalog::ExerciseCatalog;
pub use persist::PersistPolicy;
pub use session::{
    existing_session, release_if_idle, session_for, SessionError, SessionRegistry,
    SessionSnapshot, WorkoutSession,
};
