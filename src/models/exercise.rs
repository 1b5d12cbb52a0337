// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalog model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Upper bound accepted for either calorie rate.
const MAX_CALORIE_RATE: f64 = 1000.0;

/// Broad grouping shown in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseCategory {
    Strength,
    Cardio,
    Flexibility,
}

/// How sets of an exercise convert into energy expenditure.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rate", rename_all = "snake_case")]
pub enum CalorieModel {
    /// Calories burned per repetition.
    RepBased(f64),
    /// Calories burned per minute of work.
    DurationBased(f64),
    /// Contributes zero calories regardless of sets logged.
    #[default]
    None,
}

/// Which measurement a set of this exercise records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetKind {
    Reps,
    Duration,
}

impl CalorieModel {
    /// Rep-based exercises collect repetition counts; everything else collects seconds.
    pub fn set_kind(&self) -> SetKind {
        match self {
            CalorieModel::RepBased(_) => SetKind::Reps,
            CalorieModel::DurationBased(_) | CalorieModel::None => SetKind::Duration,
        }
    }
}

/// A catalog entry, either predefined or user-defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique within one user's catalog (also part of the document ID)
    pub id: String,
    pub name: String,
    pub category: ExerciseCategory,
    /// `false` for the seeded built-in exercises
    pub is_custom: bool,
    pub calorie_model: CalorieModel,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    pub fn set_kind(&self) -> SetKind {
        self.calorie_model.set_kind()
    }

    /// Key used to detect duplicate catalog entries.
    pub fn dedupe_key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// Create/edit payload for a user-defined exercise.
///
/// At most one of the two rates may be present; neither means the exercise
/// burns no tracked calories.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_single_rate"))]
pub struct ExerciseInput {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    pub category: ExerciseCategory,
    #[validate(range(min = 0.0, max = MAX_CALORIE_RATE))]
    pub calories_per_rep: Option<f64>,
    #[validate(range(min = 0.0, max = MAX_CALORIE_RATE))]
    pub calories_per_minute: Option<f64>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl ExerciseInput {
    pub fn calorie_model(&self) -> CalorieModel {
        match (self.calories_per_rep, self.calories_per_minute) {
            (Some(rate), _) => CalorieModel::RepBased(rate),
            (None, Some(rate)) => CalorieModel::DurationBased(rate),
            (None, None) => CalorieModel::None,
        }
    }

    /// Build a new user-defined exercise from this input.
    pub fn into_exercise(self, id: String, created_at: DateTime<Utc>) -> Exercise {
        let calorie_model = self.calorie_model();
        Exercise {
            id,
            name: self.name.trim().to_string(),
            category: self.category,
            is_custom: true,
            calorie_model,
            description: normalize_description(self.description),
            created_at,
        }
    }

    /// Overwrite the editable fields of an existing exercise.
    ///
    /// Identity, origin and creation time are kept.
    pub fn apply_to(self, exercise: &mut Exercise) {
        exercise.calorie_model = self.calorie_model();
        exercise.name = self.name.trim().to_string();
        exercise.category = self.category;
        exercise.description = normalize_description(self.description);
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_single_rate(input: &ExerciseInput) -> Result<(), ValidationError> {
    if input.calories_per_rep.is_some() && input.calories_per_minute.is_some() {
        return Err(ValidationError::new("multiple_calorie_rates"));
    }
    Ok(())
}
