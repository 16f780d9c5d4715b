//! Workout projection engine.
//!
//! Reconstructs the complete prescribed state of every workout in a program
//! from the definition, the configured start weights, and the sparse results
//! map. One forward pass, one threader per slot id; every change to the
//! results map is handled by calling [`project`] again rather than patching
//! rows incrementally. The pass is O(total_workouts x slots-per-day), small
//! enough that full recomputation is always the right move.

use crate::slot::SlotThreader;
use crate::{
    Catalog, Error, ProgramDefinition, Result, ResultsMap, SlotRow, StartWeights, WorkoutRow,
};
use std::collections::HashMap;

/// Project every workout of a program definition.
///
/// Deterministic: identical inputs always produce identical rows. Aborts
/// with [`Error::Configuration`] on authoring defects (missing start weight
/// key, unknown exercise, empty stage ladder, bad cycle geometry, duplicate
/// slot ids) rather than emitting partially-correct rows.
pub fn project(
    definition: &ProgramDefinition,
    catalog: &Catalog,
    start_weights: &StartWeights,
    results: &ResultsMap,
) -> Result<Vec<WorkoutRow>> {
    if definition.cycle_length == 0 {
        return Err(Error::Configuration(format!(
            "program '{}' has a zero cycle length",
            definition.id
        )));
    }
    if definition.total_workouts == 0 {
        return Err(Error::Configuration(format!(
            "program '{}' has zero total workouts",
            definition.id
        )));
    }

    let cycle = definition.cycle_length as usize;
    if definition.days.len() < cycle {
        return Err(Error::Configuration(format!(
            "program '{}' declares a cycle of {} days but defines only {}",
            definition.id,
            cycle,
            definition.days.len()
        )));
    }

    // One threader per distinct slot id across the whole definition
    let mut threaders: HashMap<&str, SlotThreader> = HashMap::new();
    for day in &definition.days {
        for slot in &day.slots {
            if threaders.contains_key(slot.id.as_str()) {
                return Err(Error::Configuration(format!(
                    "duplicate slot id '{}' in program '{}'",
                    slot.id, definition.id
                )));
            }

            let exercise = catalog.exercises.get(&slot.exercise_id).ok_or_else(|| {
                Error::Configuration(format!(
                    "slot '{}' references unknown exercise '{}'",
                    slot.id, slot.exercise_id
                ))
            })?;

            threaders.insert(
                slot.id.as_str(),
                SlotThreader::new(slot, start_weights, exercise.increment)?,
            );
        }
    }

    let mut rows = Vec::with_capacity(definition.total_workouts as usize);

    for index in 0..definition.total_workouts {
        let day = &definition.days[index as usize % cycle];
        let mut slot_rows = Vec::with_capacity(day.slots.len());

        for slot in &day.slots {
            let threader = threaders.get_mut(slot.id.as_str()).ok_or_else(|| {
                Error::Configuration(format!("slot '{}' has no threaded state", slot.id))
            })?;

            let state = threader.state();
            let stage = &slot.stages[state.stage];
            let result = results.get(index, &slot.id);

            slot_rows.push(SlotRow {
                slot_id: slot.id.clone(),
                exercise_id: slot.exercise_id.clone(),
                tier: slot.tier.clone(),
                role: slot.role(),
                weight: state.weight,
                stage: state.stage,
                stages_count: slot.stages.len(),
                sets: stage.sets,
                reps: stage.reps,
                amrap: stage.amrap,
                is_changed: state.stage > 0,
                is_deload: threader.arrived_by_deload(),
                result: result.cloned(),
            });

            // The transition from this occurrence's result determines the
            // state at the slot's next occurrence
            threader.advance(result);
        }

        rows.push(WorkoutRow {
            index,
            day_name: day.name.clone(),
            slots: slot_rows,
        });
    }

    tracing::debug!(
        "Projected {} workouts for program '{}'",
        rows.len(),
        definition.id
    );
    Ok(rows)
}
