// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calorie estimation from an exercise's calorie model and its logged sets.

use crate::models::{CalorieModel, Exercise, Set, SetMeasure, WorkoutExercise};

/// Calories burned by `sets` of `exercise`, rounded to one decimal place.
///
/// A set only counts when its measure matches the exercise's model
/// (reps for rep-based, seconds for duration-based).
pub fn calculate_exercise_calories(exercise: &Exercise, sets: &[Set]) -> f64 {
    let total: f64 = sets
        .iter()
        .map(|set| match (exercise.calorie_model, set.measure) {
            (CalorieModel::RepBased(rate), SetMeasure::Reps { count }) => rate * f64::from(count),
            (CalorieModel::DurationBased(rate), SetMeasure::Duration { seconds }) => {
                rate * f64::from(seconds) / 60.0
            }
            _ => 0.0,
        })
        .sum();

    round_to_tenth(total)
}

/// Sum of the per-exercise values; no rounding at this level.
pub fn calculate_workout_calories(exercises: &[WorkoutExercise]) -> f64 {
    exercises
        .iter()
        .map(|e| calculate_exercise_calories(&e.exercise, &e.sets))
        .sum()
}

/// `f64::round` rounds half away from zero.
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExerciseCategory;
    use chrono::Utc;

    fn exercise(model: CalorieModel) -> Exercise {
        Exercise {
            id: "ex-test".to_string(),
            name: "Test".to_string(),
            category: ExerciseCategory::Strength,
            is_custom: false,
            calorie_model: model,
            description: None,
            created_at: Utc::now(),
        }
    }

    fn sets(measures: &[SetMeasure]) -> Vec<Set> {
        measures
            .iter()
            .enumerate()
            .map(|(i, m)| Set {
                set_number: i as u32 + 1,
                measure: *m,
                timestamp: Utc::now(),
            })
            .collect()
    }

    fn reps(count: u32) -> SetMeasure {
        SetMeasure::Reps { count }
    }

    fn secs(seconds: u32) -> SetMeasure {
        SetMeasure::Duration { seconds }
    }

    #[test]
    fn test_rep_based() {
        let push_ups = exercise(CalorieModel::RepBased(0.32));
        let logged = sets(&[reps(10), reps(12), reps(8)]);

        assert_eq!(calculate_exercise_calories(&push_ups, &logged), 9.6);
    }

    #[test]
    fn test_duration_based() {
        let rope = exercise(CalorieModel::DurationBased(12.0));
        let logged = sets(&[secs(90)]);

        assert_eq!(calculate_exercise_calories(&rope, &logged), 18.0);
    }

    #[test]
    fn test_no_model_is_zero() {
        let logged = sets(&[secs(600), reps(50)]);
        assert_eq!(
            calculate_exercise_calories(&exercise(CalorieModel::None), &logged),
            0.0
        );
    }

    #[test]
    fn test_mismatched_measure_ignored() {
        let squats = exercise(CalorieModel::RepBased(0.28));
        let logged = sets(&[reps(10), secs(60)]);

        assert_eq!(calculate_exercise_calories(&squats, &logged), 2.8);
    }

    #[test]
    fn test_rounds_to_one_decimal() {
        // 3.5 * 50 / 60 = 2.91666...
        let plank = exercise(CalorieModel::DurationBased(3.5));
        assert_eq!(calculate_exercise_calories(&plank, &sets(&[secs(50)])), 2.9);

        // Half rounds away from zero: 0.25 -> 0.3
        let quarter = exercise(CalorieModel::RepBased(0.25));
        assert_eq!(calculate_exercise_calories(&quarter, &sets(&[reps(1)])), 0.3);
    }

    #[test]
    fn test_idempotent() {
        let plank = exercise(CalorieModel::DurationBased(3.5));
        let logged = sets(&[secs(45), secs(30)]);

        let first = calculate_exercise_calories(&plank, &logged);
        let second = calculate_exercise_calories(&plank, &logged);
        assert_eq!(first, second);
    }

    #[test]
    fn test_workout_total_sums_rounded_parts() {
        // Each part rounds on its own: 0.25 -> 0.3, 0.25 -> 0.3; total 0.6 rather than 0.5
        let a = WorkoutExercise {
            exercise: exercise(CalorieModel::RepBased(0.25)),
            sets: sets(&[reps(1)]),
        };
        let b = a.clone();

        let total = calculate_workout_calories(&[a, b]);
        assert!((total - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_empty_workout_is_zero() {
        assert_eq!(calculate_workout_calories(&[]), 0.0);
    }
}
