//! Default catalog of exercises and built-in program definitions.
//!
//! This module provides the built-in exercise registry (with per-exercise
//! load increments) and the shipped program definitions. All three
//! progression philosophies the engine serves appear here: linear load
//! growth with failure-driven stage regression, double progression, and
//! static accessory work.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with built-in exercises and programs
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns
/// a cached reference. This function is retained for testing and custom
/// catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn exercise(id: &str, name: &str, increment: f64) -> (String, Exercise) {
    (
        id.to_string(),
        Exercise {
            id: id.to_string(),
            name: name.to_string(),
            increment,
            reference_url: None,
        },
    )
}

fn stage(sets: u32, reps: u32) -> Stage {
    Stage {
        sets,
        reps,
        amrap: false,
    }
}

fn amrap_stage(sets: u32, reps: u32) -> Stage {
    Stage {
        sets,
        reps,
        amrap: true,
    }
}

/// Primary-lift slot: add weight on success, drop down the sets/reps ladder
/// on a mid-ladder failure, percent deload off the bottom rung
fn t1_slot(id: &str, exercise_id: &str) -> Slot {
    Slot {
        id: id.to_string(),
        exercise_id: exercise_id.to_string(),
        tier: "T1".into(),
        role: None,
        stages: vec![amrap_stage(5, 3), amrap_stage(6, 2), amrap_stage(10, 1)],
        start_weight_key: exercise_id.to_string(),
        start_weight_multiplier: 1.0,
        start_weight_offset: 0.0,
        on_success: ProgressionRule::AddWeight,
        on_mid_stage_fail: ProgressionRule::AdvanceStage,
        on_final_stage_fail: ProgressionRule::DeloadPercent { percent: 10.0 },
        on_final_stage_success: None,
        on_undefined: None,
    }
}

/// Volume slot for a lift trained heavy on another day; starts at a
/// fraction of the same configured weight and progresses independently
fn t2_slot(id: &str, exercise_id: &str, start_weight_key: &str) -> Slot {
    Slot {
        id: id.to_string(),
        exercise_id: exercise_id.to_string(),
        tier: "T2".into(),
        role: None,
        stages: vec![stage(3, 10), stage(3, 8), stage(3, 6)],
        start_weight_key: start_weight_key.to_string(),
        start_weight_multiplier: 0.65,
        start_weight_offset: 0.0,
        on_success: ProgressionRule::AddWeight,
        on_mid_stage_fail: ProgressionRule::AdvanceStage,
        on_final_stage_fail: ProgressionRule::DeloadPercent { percent: 10.0 },
        on_final_stage_success: None,
        on_undefined: None,
    }
}

/// Double-progression accessory: reps climb 8 -> 12 at a fixed weight,
/// then the weight goes up and the ladder restarts
fn t3_slot(id: &str, exercise_id: &str) -> Slot {
    Slot {
        id: id.to_string(),
        exercise_id: exercise_id.to_string(),
        tier: "T3".into(),
        role: None,
        stages: vec![
            stage(3, 8),
            stage(3, 9),
            stage(3, 10),
            stage(3, 11),
            amrap_stage(3, 12),
        ],
        start_weight_key: exercise_id.to_string(),
        start_weight_multiplier: 1.0,
        start_weight_offset: 0.0,
        on_success: ProgressionRule::AdvanceStage,
        on_mid_stage_fail: ProgressionRule::NoChange,
        on_final_stage_fail: ProgressionRule::NoChange,
        on_final_stage_success: Some(ProgressionRule::AddWeightResetStage { amount: 2.5 }),
        on_undefined: None,
    }
}

/// Static accessory: fixed prescription, no progression
fn accessory_slot(id: &str, exercise_id: &str, sets: u32, reps: u32) -> Slot {
    Slot {
        id: id.to_string(),
        exercise_id: exercise_id.to_string(),
        tier: "ACC".into(),
        role: None,
        stages: vec![stage(sets, reps)],
        start_weight_key: exercise_id.to_string(),
        start_weight_multiplier: 1.0,
        start_weight_offset: 0.0,
        on_success: ProgressionRule::NoChange,
        on_mid_stage_fail: ProgressionRule::NoChange,
        on_final_stage_fail: ProgressionRule::NoChange,
        on_final_stage_success: None,
        on_undefined: None,
    }
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    let mut exercises = HashMap::new();
    let mut programs = HashMap::new();

    // ========================================================================
    // Exercises
    // ========================================================================

    for (id, ex) in [
        exercise("squat", "Back Squat", 2.5),
        exercise("bench_press", "Bench Press", 2.5),
        exercise("deadlift", "Deadlift", 5.0),
        exercise("overhead_press", "Overhead Press", 2.5),
        exercise("barbell_row", "Barbell Row", 2.5),
        exercise("lat_pulldown", "Lat Pulldown", 2.5),
        exercise("ez_curl", "EZ-Bar Curl", 1.0),
    ] {
        exercises.insert(id, ex);
    }

    // ========================================================================
    // Programs
    // ========================================================================

    // 12-week, 4-day linear program. Each main lift appears twice per
    // cycle: once heavy (T1) and once for volume (T2) keyed to the same
    // configured start weight at 65%.
    programs.insert(
        "linear_4day".into(),
        ProgramDefinition {
            id: "linear_4day".into(),
            name: "Linear 4-Day".into(),
            cycle_length: 4,
            total_workouts: 48,
            days: vec![
                Day {
                    name: "Day A1".into(),
                    slots: vec![
                        t1_slot("t1_squat", "squat"),
                        t2_slot("t2_bench", "bench_press", "bench_press"),
                        t3_slot("t3_pulldown_a", "lat_pulldown"),
                    ],
                },
                Day {
                    name: "Day A2".into(),
                    slots: vec![
                        t1_slot("t1_press", "overhead_press"),
                        t2_slot("t2_deadlift", "deadlift", "deadlift"),
                        t3_slot("t3_row_a", "barbell_row"),
                    ],
                },
                Day {
                    name: "Day B1".into(),
                    slots: vec![
                        t1_slot("t1_bench", "bench_press"),
                        t2_slot("t2_squat", "squat", "squat"),
                        t3_slot("t3_pulldown_b", "lat_pulldown"),
                    ],
                },
                Day {
                    name: "Day B2".into(),
                    slots: vec![
                        t1_slot("t1_deadlift", "deadlift"),
                        t2_slot("t2_press", "overhead_press", "overhead_press"),
                        t3_slot("t3_row_b", "barbell_row"),
                        accessory_slot("acc_curl", "ez_curl", 3, 12),
                    ],
                },
            ],
            reference_url: None,
        },
    );

    // 6-week, 3-day peaking block. Start weights are configured as the
    // *target* for the final week; each T1 slot walks five increment steps
    // backward and climbs toward the target (reverse periodization).
    let peak_t1 = |id: &str, exercise_id: &str| Slot {
        stages: vec![stage(5, 3)],
        start_weight_offset: 5.0,
        on_mid_stage_fail: ProgressionRule::NoChange,
        on_final_stage_fail: ProgressionRule::DeloadPercent { percent: 5.0 },
        ..t1_slot(id, exercise_id)
    };

    programs.insert(
        "peak_3day".into(),
        ProgramDefinition {
            id: "peak_3day".into(),
            name: "Peak 3-Day".into(),
            cycle_length: 3,
            total_workouts: 18,
            days: vec![
                Day {
                    name: "Squat Day".into(),
                    slots: vec![
                        peak_t1("peak_squat", "squat"),
                        t3_slot("peak_row", "barbell_row"),
                    ],
                },
                Day {
                    name: "Bench Day".into(),
                    slots: vec![
                        peak_t1("peak_bench", "bench_press"),
                        accessory_slot("peak_curl", "ez_curl", 3, 10),
                    ],
                },
                Day {
                    name: "Deadlift Day".into(),
                    slots: vec![
                        peak_t1("peak_deadlift", "deadlift"),
                        t3_slot("peak_pulldown", "lat_pulldown"),
                    ],
                },
            ],
            reference_url: None,
        },
    );

    Catalog {
        exercises,
        programs,
    }
}

impl Catalog {
    /// Look up a program definition by id
    pub fn program(&self, id: &str) -> crate::Result<&ProgramDefinition> {
        self.programs
            .get(id)
            .ok_or_else(|| crate::Error::Catalog(format!("unknown program '{}'", id)))
    }

    /// Apply per-exercise increment overrides (from the app config)
    pub fn with_increments(&self, overrides: &HashMap<String, f64>) -> Catalog {
        let mut catalog = self.clone();
        for (id, increment) in overrides {
            if let Some(ex) = catalog.exercises.get_mut(id) {
                ex.increment = *increment;
            } else {
                tracing::warn!("Increment override for unknown exercise '{}'", id);
            }
        }
        catalog
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, ex) in &self.exercises {
            if id.is_empty() || ex.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if id != &ex.id {
                errors.push(format!(
                    "Exercise key '{}' doesn't match exercise.id '{}'",
                    id, ex.id
                ));
            }
            if ex.increment <= 0.0 {
                errors.push(format!("Exercise '{}' has non-positive increment", id));
            }
            if (ex.increment * 2.0).fract() != 0.0 {
                errors.push(format!(
                    "Exercise '{}' increment {} is not a multiple of 0.5",
                    id, ex.increment
                ));
            }
        }

        for (id, program) in &self.programs {
            if id != &program.id {
                errors.push(format!(
                    "Program key '{}' doesn't match definition.id '{}'",
                    id, program.id
                ));
            }
            if program.cycle_length == 0 {
                errors.push(format!("Program '{}' has zero cycle length", id));
            }
            if program.total_workouts == 0 {
                errors.push(format!("Program '{}' has zero total workouts", id));
            }
            if program.days.len() < program.cycle_length as usize {
                errors.push(format!(
                    "Program '{}' defines {} days for a {}-day cycle",
                    id,
                    program.days.len(),
                    program.cycle_length
                ));
            }

            let mut seen_slots = std::collections::HashSet::new();
            for day in &program.days {
                for slot in &day.slots {
                    if !seen_slots.insert(slot.id.as_str()) {
                        errors.push(format!(
                            "Program '{}' has duplicate slot id '{}'",
                            id, slot.id
                        ));
                    }
                    if slot.stages.is_empty() {
                        errors.push(format!(
                            "Program '{}' slot '{}' has an empty stage ladder",
                            id, slot.id
                        ));
                    }
                    if !self.exercises.contains_key(&slot.exercise_id) {
                        errors.push(format!(
                            "Program '{}' slot '{}' references non-existent exercise '{}'",
                            id, slot.id, slot.exercise_id
                        ));
                    }
                    if slot.start_weight_multiplier <= 0.0 {
                        errors.push(format!(
                            "Program '{}' slot '{}' has non-positive start weight multiplier",
                            id, slot.id
                        ));
                    }
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.exercises.len(), 7);
        assert_eq!(catalog.programs.len(), 2);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_program_lookup() {
        let catalog = build_default_catalog();
        assert!(catalog.program("linear_4day").is_ok());
        assert!(matches!(
            catalog.program("nonexistent"),
            Err(crate::Error::Catalog(_))
        ));
    }

    #[test]
    fn test_increment_overrides() {
        let catalog = build_default_catalog();
        let mut overrides = HashMap::new();
        overrides.insert("squat".to_string(), 5.0);

        let custom = catalog.with_increments(&overrides);
        assert_eq!(custom.exercises["squat"].increment, 5.0);
        assert_eq!(custom.exercises["bench_press"].increment, 2.5);
        // Original untouched
        assert_eq!(catalog.exercises["squat"].increment, 2.5);
    }

    #[test]
    fn test_validate_flags_duplicate_slot_ids() {
        let mut catalog = build_default_catalog();
        let program = catalog.programs.get_mut("linear_4day").unwrap();
        let dup = program.days[0].slots[0].clone();
        program.days[1].slots.push(dup);

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("duplicate slot id")));
    }

    #[test]
    fn test_validate_flags_unknown_exercise() {
        let mut catalog = build_default_catalog();
        let program = catalog.programs.get_mut("peak_3day").unwrap();
        program.days[0].slots[0].exercise_id = "leg_press".into();

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("non-existent exercise")));
    }
}
