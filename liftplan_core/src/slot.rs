//! Per-slot progression state threading.
//!
//! A [`SlotThreader`] owns the working state of one slot and walks it
//! forward across every occurrence of the slot's day template. The state
//! it reports for an occurrence is always the state *before* that
//! occurrence's result is applied — what the lifter actually trained at —
//! so editing a historical result never changes the row it was logged
//! against, only later occurrences of the same slot.

use crate::rules::{apply_rule, round_half, RuleContext};
use crate::{Error, Outcome, ProgressionRule, Result, Slot, SlotResult, SlotState, StartWeights};

/// Threads one slot's `(weight, stage)` state across its occurrences
#[derive(Debug)]
pub struct SlotThreader<'a> {
    slot: &'a Slot,
    ctx: RuleContext,
    state: SlotState,
    arrived_by_deload: bool,
}

impl<'a> SlotThreader<'a> {
    /// Build a threader at the slot's initial state.
    ///
    /// The starting weight is the configured value scaled by the slot's
    /// multiplier, rounded, then walked backward by `start_weight_offset`
    /// increment steps (reverse/target periodization). A missing
    /// `start_weight_key` or an empty stage ladder is an authoring defect
    /// and aborts the whole projection.
    pub fn new(slot: &'a Slot, start_weights: &StartWeights, increment: f64) -> Result<Self> {
        if slot.stages.is_empty() {
            return Err(Error::Configuration(format!(
                "slot '{}' has an empty stage ladder",
                slot.id
            )));
        }

        let base = *start_weights.get(&slot.start_weight_key).ok_or_else(|| {
            Error::Configuration(format!(
                "slot '{}' references start weight key '{}' which is not configured",
                slot.id, slot.start_weight_key
            ))
        })?;

        let weight = round_half(
            round_half(base * slot.start_weight_multiplier)
                - slot.start_weight_offset * increment,
        );

        tracing::debug!(
            "Slot {}: initial state {} @ stage 0 (base {}, x{}, offset {})",
            slot.id,
            weight,
            base,
            slot.start_weight_multiplier,
            slot.start_weight_offset
        );

        Ok(Self {
            slot,
            ctx: RuleContext {
                increment,
                last_stage: slot.stages.len() - 1,
            },
            state: SlotState { weight, stage: 0 },
            arrived_by_deload: false,
        })
    }

    /// State the next occurrence of this slot trains at
    pub fn state(&self) -> SlotState {
        self.state
    }

    /// True when the transition into the current state was a
    /// failure-triggered deload
    pub fn arrived_by_deload(&self) -> bool {
        self.arrived_by_deload
    }

    /// Select the rule fired by a recorded (or absent) result at the
    /// current stage
    pub fn select_rule(&self, result: Option<&SlotResult>) -> &ProgressionRule {
        let is_final = self.state.stage == self.ctx.last_stage;

        match result {
            None => self
                .slot
                .on_undefined
                .as_ref()
                .unwrap_or(&ProgressionRule::NoChange),
            Some(entry) => match entry.outcome {
                Outcome::Success if is_final => self
                    .slot
                    .on_final_stage_success
                    .as_ref()
                    .unwrap_or(&self.slot.on_success),
                Outcome::Success => &self.slot.on_success,
                Outcome::Fail if is_final => &self.slot.on_final_stage_fail,
                Outcome::Fail => &self.slot.on_mid_stage_fail,
            },
        }
    }

    /// Apply the transition derived from an occurrence's result, moving the
    /// threader to the state for the slot's next occurrence
    pub fn advance(&mut self, result: Option<&SlotResult>) {
        let rule = self.select_rule(result).clone();

        let failed = matches!(result, Some(r) if r.outcome == Outcome::Fail);
        self.arrived_by_deload = failed
            && matches!(
                rule,
                ProgressionRule::DeloadPercent { .. } | ProgressionRule::AddWeightResetStage { .. }
            );

        let next = apply_rule(&rule, self.state, self.ctx);
        tracing::debug!(
            "Slot {}: {:?} -> {} @ stage {}",
            self.slot.id,
            rule,
            next.weight,
            next.stage
        );
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Stage, StartWeights};

    fn stage(sets: u32, reps: u32) -> Stage {
        Stage {
            sets,
            reps,
            amrap: false,
        }
    }

    fn success() -> SlotResult {
        SlotResult {
            outcome: Outcome::Success,
            amrap_reps: None,
            rpe: None,
        }
    }

    fn fail() -> SlotResult {
        SlotResult {
            outcome: Outcome::Fail,
            amrap_reps: None,
            rpe: None,
        }
    }

    /// Linear slot: 3 stages, add weight on success, drop a stage on
    /// mid-ladder failure, percent deload at the bottom of the ladder
    fn linear_slot() -> Slot {
        Slot {
            id: "t1_squat".into(),
            exercise_id: "squat".into(),
            tier: "T1".into(),
            role: None,
            stages: vec![stage(5, 3), stage(6, 2), stage(10, 1)],
            start_weight_key: "squat".into(),
            start_weight_multiplier: 1.0,
            start_weight_offset: 0.0,
            on_success: ProgressionRule::AddWeight,
            on_mid_stage_fail: ProgressionRule::AdvanceStage,
            on_final_stage_fail: ProgressionRule::DeloadPercent { percent: 10.0 },
            on_final_stage_success: None,
            on_undefined: None,
        }
    }

    /// Double-progression slot: 5 stages (reps 8..12), stage advances on
    /// success, weight grows only when the terminal stage is beaten
    fn double_progression_slot() -> Slot {
        Slot {
            id: "t3_row".into(),
            exercise_id: "barbell_row".into(),
            tier: "T3".into(),
            role: None,
            stages: (8..=12).map(|reps| stage(3, reps)).collect(),
            start_weight_key: "barbell_row".into(),
            start_weight_multiplier: 1.0,
            start_weight_offset: 0.0,
            on_success: ProgressionRule::AdvanceStage,
            on_mid_stage_fail: ProgressionRule::NoChange,
            on_final_stage_fail: ProgressionRule::NoChange,
            on_final_stage_success: Some(ProgressionRule::AddWeightResetStage { amount: 2.5 }),
            on_undefined: None,
        }
    }

    fn weights(key: &str, value: f64) -> StartWeights {
        let mut w = StartWeights::new();
        w.insert(key.to_string(), value);
        w
    }

    #[test]
    fn test_missing_start_weight_key_is_configuration_error() {
        let slot = linear_slot();
        let err = SlotThreader::new(&slot, &StartWeights::new(), 5.0).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_empty_stages_is_configuration_error() {
        let mut slot = linear_slot();
        slot.stages.clear();
        let err = SlotThreader::new(&slot, &weights("squat", 60.0), 5.0).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_initial_state_applies_multiplier_and_offset() {
        let mut slot = linear_slot();
        slot.start_weight_multiplier = 0.85;
        slot.start_weight_offset = 2.0;

        // round_half(100 * 0.85) - 2 * 2.5 = 85 - 5 = 80
        let threader = SlotThreader::new(&slot, &weights("squat", 100.0), 2.5).unwrap();
        assert_eq!(
            threader.state(),
            SlotState {
                weight: 80.0,
                stage: 0
            }
        );
    }

    #[test]
    fn test_multiplier_product_is_rounded_before_offset() {
        let mut slot = linear_slot();
        slot.start_weight_multiplier = 0.85;

        // 97 * 0.85 = 82.45 -> 82.5
        let threader = SlotThreader::new(&slot, &weights("squat", 97.0), 2.5).unwrap();
        assert_eq!(threader.state().weight, 82.5);
    }

    #[test]
    fn test_linear_success_adds_weight() {
        let slot = linear_slot();
        let mut threader = SlotThreader::new(&slot, &weights("squat", 60.0), 5.0).unwrap();
        assert_eq!(
            threader.state(),
            SlotState {
                weight: 60.0,
                stage: 0
            }
        );

        threader.advance(Some(&success()));
        assert_eq!(
            threader.state(),
            SlotState {
                weight: 65.0,
                stage: 0
            }
        );
    }

    #[test]
    fn test_linear_mid_stage_fail_regresses_ladder() {
        let slot = linear_slot();
        let mut threader = SlotThreader::new(&slot, &weights("squat", 60.0), 5.0).unwrap();

        threader.advance(Some(&fail()));
        assert_eq!(
            threader.state(),
            SlotState {
                weight: 60.0,
                stage: 1
            }
        );
        assert!(!threader.arrived_by_deload());
    }

    #[test]
    fn test_linear_final_stage_fail_deloads() {
        let slot = linear_slot();
        let mut threader = SlotThreader::new(&slot, &weights("squat", 60.0), 5.0).unwrap();

        // Fail down the ladder to the final stage, then fail again
        threader.advance(Some(&fail()));
        threader.advance(Some(&fail()));
        assert_eq!(threader.state().stage, 2);

        threader.advance(Some(&fail()));
        assert_eq!(
            threader.state(),
            SlotState {
                weight: 54.0,
                stage: 0
            }
        );
        assert!(threader.arrived_by_deload());

        // Any further transition clears the flag
        threader.advance(Some(&success()));
        assert!(!threader.arrived_by_deload());
    }

    #[test]
    fn test_double_progression_ladder_then_weight() {
        let slot = double_progression_slot();
        let mut threader = SlotThreader::new(&slot, &weights("barbell_row", 40.0), 2.5).unwrap();

        // Five successes climb the ladder with no weight change
        for expected_stage in 1..=4 {
            threader.advance(Some(&success()));
            assert_eq!(threader.state().weight, 40.0);
            assert_eq!(threader.state().stage, expected_stage);
        }

        // Success at the terminal stage graduates: +2.5, back to stage 0
        threader.advance(Some(&success()));
        assert_eq!(
            threader.state(),
            SlotState {
                weight: 42.5,
                stage: 0
            }
        );
        // Graduation is success-triggered, not a deload
        assert!(!threader.arrived_by_deload());
    }

    #[test]
    fn test_undefined_defaults_to_no_change() {
        let slot = linear_slot();
        let mut threader = SlotThreader::new(&slot, &weights("squat", 60.0), 5.0).unwrap();

        // Unattempted occurrences leave a flat projection
        for _ in 0..10 {
            threader.advance(None);
            assert_eq!(
                threader.state(),
                SlotState {
                    weight: 60.0,
                    stage: 0
                }
            );
        }
    }

    #[test]
    fn test_explicit_on_undefined_fires_when_absent() {
        let mut slot = linear_slot();
        slot.on_undefined = Some(ProgressionRule::DeloadPercent { percent: 5.0 });
        let mut threader = SlotThreader::new(&slot, &weights("squat", 60.0), 5.0).unwrap();

        threader.advance(None);
        assert_eq!(threader.state().weight, 57.0);
        // Absent result is not a failure; no deload flag
        assert!(!threader.arrived_by_deload());
    }

    #[test]
    fn test_final_stage_success_falls_back_to_on_success() {
        let slot = linear_slot(); // no on_final_stage_success
        let mut threader = SlotThreader::new(&slot, &weights("squat", 60.0), 5.0).unwrap();

        threader.advance(Some(&fail()));
        threader.advance(Some(&fail()));
        assert_eq!(threader.state().stage, 2);

        // Success at the final stage uses on_success (add_weight)
        threader.advance(Some(&success()));
        assert_eq!(
            threader.state(),
            SlotState {
                weight: 65.0,
                stage: 2
            }
        );
    }
}
