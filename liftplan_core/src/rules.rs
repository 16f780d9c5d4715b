//! Progression rule interpreter.
//!
//! One pure transition function serves every progression strategy in the
//! system: linear load growth with failure-driven stage regression, double
//! progression where load grows only at the terminal stage, and static
//! accessory work. The interpreter has no notion of *why* a rule fired;
//! rule selection lives in the slot threader.

use crate::{ProgressionRule, SlotState};

/// Round a weight to the nearest 0.5 unit.
///
/// Applied immediately after every weight mutation; no intermediate state
/// ever carries an unrounded fractional weight between occurrences.
pub fn round_half(weight: f64) -> f64 {
    (weight * 2.0).round() / 2.0
}

/// Numeric context a rule is applied under
#[derive(Clone, Copy, Debug)]
pub struct RuleContext {
    /// Load increment of the slot's exercise
    pub increment: f64,
    /// Index of the slot's last stage
    pub last_stage: usize,
}

/// Apply a progression rule to a slot state, producing the next state.
///
/// Pure and total over all five variants. `advance_stage` clamps at the
/// last stage; the threader only selects it below the final stage, so the
/// clamp is an invariant guard rather than a normal path.
pub fn apply_rule(rule: &ProgressionRule, state: SlotState, ctx: RuleContext) -> SlotState {
    match rule {
        ProgressionRule::AddWeight => SlotState {
            weight: round_half(state.weight + ctx.increment),
            stage: state.stage,
        },
        ProgressionRule::AdvanceStage => SlotState {
            weight: state.weight,
            stage: (state.stage + 1).min(ctx.last_stage),
        },
        ProgressionRule::DeloadPercent { percent } => SlotState {
            weight: round_half(state.weight * (1.0 - percent / 100.0)),
            stage: 0,
        },
        ProgressionRule::AddWeightResetStage { amount } => SlotState {
            weight: round_half(state.weight + amount),
            stage: 0,
        },
        ProgressionRule::NoChange => state,
    }
}
