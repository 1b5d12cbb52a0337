// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Rutina: personal workout logging
//!
//! This crate provides the backend API for picking exercises, logging sets
//! during an active workout session and reviewing workout history.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::{ExerciseCatalog, SessionRegistry};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub catalog: ExerciseCatalog<Database>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        Self {
            config,
            catalog: ExerciseCatalog::new(db.clone()),
            db,
            sessions: SessionRegistry::default(),
        }
    }
}
