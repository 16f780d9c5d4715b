//! Core domain types for the liftplan progression system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Program definitions (days, slots, stages)
//! - Progression rules
//! - Recorded results and the sparse results map
//! - Engine output rows
//! - Exercise registry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

// ============================================================================
// Program Definition Types
// ============================================================================

/// Display/progression role of a slot within a day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Primary,
    Secondary,
}

impl Role {
    /// Default role derived from a slot's tier label.
    ///
    /// Tier labels are free-form; by convention only labels starting with
    /// "T1" mark the primary lift of a day. An explicit `role` on the slot
    /// overrides this.
    pub fn default_for_tier(tier: &str) -> Role {
        if tier.trim().to_ascii_lowercase().starts_with("t1") {
            Role::Primary
        } else {
            Role::Secondary
        }
    }
}

/// One rung on a slot's sets/reps ladder
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stage {
    pub sets: u32,
    pub reps: u32,
    /// Last set is performed for max reps rather than the prescribed count
    #[serde(default)]
    pub amrap: bool,
}

/// State transition applied to a slot after an occurrence
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressionRule {
    /// Add the exercise's increment to the working weight
    AddWeight,
    /// Move one rung down the sets/reps ladder; weight unchanged
    AdvanceStage,
    /// Cut the working weight by a percentage and restart the ladder
    DeloadPercent { percent: f64 },
    /// Add a fixed amount and restart the ladder (double-progression graduation)
    AddWeightResetStage { amount: f64 },
    /// Identity transition
    NoChange,
}

/// One exercise assignment within a day template.
///
/// A slot owns an independent progression state threaded across every
/// occurrence of its day in the cycle. Slot ids are stable and unique
/// within a program definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub exercise_id: String,
    /// Free-form grouping label (e.g. "T1"); carries no progression meaning
    pub tier: String,
    #[serde(default)]
    pub role: Option<Role>,
    pub stages: Vec<Stage>,
    /// Key into the start-weights map for the initial working weight
    pub start_weight_key: String,
    /// Fraction of the configured start weight this slot begins at
    #[serde(default = "default_multiplier")]
    pub start_weight_multiplier: f64,
    /// Number of increment steps to walk the start weight backward
    /// (reverse/target periodization)
    #[serde(default)]
    pub start_weight_offset: f64,
    pub on_success: ProgressionRule,
    pub on_mid_stage_fail: ProgressionRule,
    pub on_final_stage_fail: ProgressionRule,
    /// Fired on a success at the final stage; falls back to `on_success`
    #[serde(default)]
    pub on_final_stage_success: Option<ProgressionRule>,
    /// Fired when no result was recorded; falls back to `no_change`
    #[serde(default)]
    pub on_undefined: Option<ProgressionRule>,
}

fn default_multiplier() -> f64 {
    1.0
}

impl Slot {
    /// Effective role: explicit override, else derived from the tier label
    pub fn role(&self) -> Role {
        self.role.unwrap_or_else(|| Role::default_for_tier(&self.tier))
    }
}

/// A day template: named, ordered list of slots
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Day {
    pub name: String,
    pub slots: Vec<Slot>,
}

/// A complete multi-week training program definition
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgramDefinition {
    pub id: String,
    pub name: String,
    /// Length of the repeating day rotation; day for workout `i` is
    /// `days[i % cycle_length]`
    pub cycle_length: u32,
    /// Total number of workouts to project, independent of `cycle_length`
    pub total_workouts: u32,
    pub days: Vec<Day>,
    pub reference_url: Option<String>,
}

/// Starting numeric parameters supplied once per program instance,
/// keyed by `start_weight_key`
pub type StartWeights = HashMap<String, f64>;

// ============================================================================
// Result Types
// ============================================================================

/// Outcome of one attempted slot occurrence
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Fail,
}

/// A recorded result for one slot at one workout index
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SlotResult {
    pub outcome: Outcome,
    /// Reps achieved on the AMRAP set, if the stage had one
    #[serde(default)]
    pub amrap_reps: Option<u32>,
    #[serde(default)]
    pub rpe: Option<f64>,
}

/// Sparse map of recorded results: workout index -> slot id -> result.
///
/// An absent entry means the occurrence was not attempted (or its result
/// was cleared). Ordered maps keep serialization deterministic.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ResultsMap(pub BTreeMap<u32, BTreeMap<String, SlotResult>>);

impl ResultsMap {
    pub fn get(&self, workout: u32, slot_id: &str) -> Option<&SlotResult> {
        self.0.get(&workout).and_then(|slots| slots.get(slot_id))
    }

    pub fn set(&mut self, workout: u32, slot_id: &str, entry: SlotResult) {
        self.0
            .entry(workout)
            .or_default()
            .insert(slot_id.to_string(), entry);
    }

    pub fn clear(&mut self, workout: u32, slot_id: &str) {
        if let Some(slots) = self.0.get_mut(&workout) {
            slots.remove(slot_id);
            if slots.is_empty() {
                self.0.remove(&workout);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One event in the append-only results journal.
///
/// `entry: None` clears any previously recorded result for the slot at
/// that workout index. The journal folds in order into a [`ResultsMap`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResultEvent {
    pub id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub workout: u32,
    pub slot_id: String,
    pub entry: Option<SlotResult>,
}

impl ResultEvent {
    /// New event recording a result
    pub fn record(workout: u32, slot_id: impl Into<String>, entry: SlotResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            logged_at: Utc::now(),
            workout,
            slot_id: slot_id.into(),
            entry: Some(entry),
        }
    }

    /// New event clearing a previously recorded result
    pub fn clear(workout: u32, slot_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            logged_at: Utc::now(),
            workout,
            slot_id: slot_id.into(),
            entry: None,
        }
    }
}

// ============================================================================
// Engine State and Output Types
// ============================================================================

/// Per-slot working state threaded across occurrences
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotState {
    pub weight: f64,
    /// Index into the slot's `stages`; always `< stages.len()`
    pub stage: usize,
}

/// One slot's prescription within a projected workout
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SlotRow {
    pub slot_id: String,
    pub exercise_id: String,
    pub tier: String,
    pub role: Role,
    /// Weight the lifter trains at for this occurrence (state *before*
    /// this occurrence's result is applied)
    pub weight: f64,
    pub stage: usize,
    pub stages_count: usize,
    pub sets: u32,
    pub reps: u32,
    pub amrap: bool,
    /// Presentation flag: the slot has moved off its first stage
    pub is_changed: bool,
    /// Presentation flag: the previous occurrence's failure triggered a
    /// deload into this state
    pub is_deload: bool,
    pub result: Option<SlotResult>,
}

/// One fully-assembled workout in the projection
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutRow {
    pub index: u32,
    pub day_name: String,
    pub slots: Vec<SlotRow>,
}

// ============================================================================
// Exercise Registry and Catalog Types
// ============================================================================

/// An exercise definition with its load increment
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    /// Smallest load step for this exercise; a multiple of 0.5
    pub increment: f64,
    pub reference_url: Option<String>,
}

/// The complete catalog of exercises and built-in program definitions
#[derive(Clone, Debug)]
pub struct Catalog {
    pub exercises: HashMap<String, Exercise>,
    pub programs: HashMap<String, ProgramDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults_from_tier() {
        assert_eq!(Role::default_for_tier("T1"), Role::Primary);
        assert_eq!(Role::default_for_tier("t1"), Role::Primary);
        assert_eq!(Role::default_for_tier(" T1 "), Role::Primary);
        assert_eq!(Role::default_for_tier("T2"), Role::Secondary);
        assert_eq!(Role::default_for_tier("accessory"), Role::Secondary);
        assert_eq!(Role::default_for_tier(""), Role::Secondary);
    }

    #[test]
    fn test_rule_serde_tagging() {
        let rule = ProgressionRule::DeloadPercent { percent: 10.0 };
        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains(r#""type":"deload_percent""#));

        let parsed: ProgressionRule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rule);

        let parsed: ProgressionRule = serde_json::from_str(r#"{"type":"add_weight"}"#).unwrap();
        assert_eq!(parsed, ProgressionRule::AddWeight);
    }

    #[test]
    fn test_results_map_set_get_clear() {
        let mut results = ResultsMap::default();
        assert!(results.get(3, "t1_squat").is_none());

        results.set(
            3,
            "t1_squat",
            SlotResult {
                outcome: Outcome::Success,
                amrap_reps: Some(5),
                rpe: None,
            },
        );
        assert_eq!(
            results.get(3, "t1_squat").map(|r| r.outcome),
            Some(Outcome::Success)
        );

        results.clear(3, "t1_squat");
        assert!(results.get(3, "t1_squat").is_none());
        assert!(results.is_empty());
    }

    #[test]
    fn test_results_map_json_keys_are_strings() {
        // Workout indices serialize as JSON object keys
        let mut results = ResultsMap::default();
        results.set(
            12,
            "t3_row",
            SlotResult {
                outcome: Outcome::Fail,
                amrap_reps: None,
                rpe: Some(9.5),
            },
        );

        let json = serde_json::to_string(&results).unwrap();
        assert!(json.contains(r#""12""#));

        let parsed: ResultsMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, results);
    }

    #[test]
    fn test_slot_result_optional_fields_default() {
        let parsed: SlotResult = serde_json::from_str(r#"{"outcome":"fail"}"#).unwrap();
        assert_eq!(parsed.outcome, Outcome::Fail);
        assert!(parsed.amrap_reps.is_none());
        assert!(parsed.rpe.is_none());
    }
}
