use clap::{Parser, Subcommand};
use liftplan_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "liftplan")]
#[command(about = "Barbell program planner and progression tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Project the configured program and print every workout (default)
    Plan {
        /// First workout index to print
        #[arg(long, default_value_t = 0)]
        from: u32,

        /// Number of workouts to print (all remaining if omitted)
        #[arg(long)]
        count: Option<u32>,
    },

    /// Record a result for one slot at one workout index
    Log {
        /// Workout index (0-based, as shown by `plan`)
        workout: u32,

        /// Slot id (as shown by `plan`)
        slot: String,

        /// Outcome: pass or fail
        outcome: String,

        /// Reps achieved on the AMRAP set
        #[arg(long)]
        amrap: Option<u32>,

        /// Perceived exertion (RPE)
        #[arg(long)]
        rpe: Option<f64>,
    },

    /// Clear a previously recorded result
    Clear {
        /// Workout index
        workout: u32,

        /// Slot id
        slot: String,
    },

    /// Remove the most recent journal entry
    Undo,

    /// List built-in program definitions
    Programs,
}

fn main() -> Result<()> {
    // Initialize logging
    liftplan_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Plan { from, count }) => cmd_plan(data_dir, &config, from, count),
        Some(Commands::Log {
            workout,
            slot,
            outcome,
            amrap,
            rpe,
        }) => cmd_log(data_dir, &config, workout, slot, outcome, amrap, rpe),
        Some(Commands::Clear { workout, slot }) => cmd_clear(data_dir, &config, workout, slot),
        Some(Commands::Undo) => cmd_undo(data_dir, &config),
        Some(Commands::Programs) => cmd_programs(),
        None => cmd_plan(data_dir, &config, 0, None),
    }
}

/// Load the catalog (with increment overrides), resolve the configured
/// program, and fold the journal into a results map
fn load_projection_inputs(
    data_dir: &PathBuf,
    config: &Config,
) -> Result<(Catalog, ProgramDefinition, ResultsMap)> {
    let catalog = get_default_catalog().with_increments(&config.increments);

    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Catalog("Invalid catalog".into()));
    }

    let program = catalog.program(&config.program.id)?.clone();
    let results = journal(data_dir).results()?;

    Ok((catalog, program, results))
}

fn journal(data_dir: &PathBuf) -> ResultJournal {
    ResultJournal::new(data_dir.join("results.wal"))
}

fn cmd_plan(data_dir: PathBuf, config: &Config, from: u32, count: Option<u32>) -> Result<()> {
    let (catalog, program, results) = load_projection_inputs(&data_dir, config)?;
    let rows = project(&program, &catalog, &config.start_weights, &results)?;

    let to = count
        .map(|c| from.saturating_add(c))
        .unwrap_or(program.total_workouts);

    println!("{} ({} workouts, {}-day cycle)", program.name, program.total_workouts, program.cycle_length);
    println!();
    println!(
        "{:>4}  {:<12} {:<16} {:>8}  {:>5}  {:<8} {}",
        "#", "Day", "Slot", "Weight", "Stage", "Scheme", "Result"
    );

    for row in rows.iter().filter(|r| r.index >= from && r.index < to) {
        for (i, slot) in row.slots.iter().enumerate() {
            let index = if i == 0 {
                format!("{}", row.index)
            } else {
                String::new()
            };
            let day = if i == 0 { row.day_name.as_str() } else { "" };

            let mut scheme = format!("{}x{}", slot.sets, slot.reps);
            if slot.amrap {
                scheme.push('+');
            }

            let result = match &slot.result {
                Some(r) => format_result(r),
                None => String::new(),
            };
            let marker = if slot.is_deload { " (deload)" } else { "" };

            println!(
                "{:>4}  {:<12} {:<16} {:>8.1}  {:>2}/{:<2}  {:<8} {}{}",
                index,
                day,
                slot.slot_id,
                slot.weight,
                slot.stage + 1,
                slot.stages_count,
                scheme,
                result,
                marker
            );
        }
    }

    Ok(())
}

fn format_result(result: &SlotResult) -> String {
    let mut text = match result.outcome {
        Outcome::Success => "pass".to_string(),
        Outcome::Fail => "fail".to_string(),
    };
    if let Some(reps) = result.amrap_reps {
        text.push_str(&format!(" ({}+ reps)", reps));
    }
    if let Some(rpe) = result.rpe {
        text.push_str(&format!(" @{}", rpe));
    }
    text
}

fn cmd_log(
    data_dir: PathBuf,
    config: &Config,
    workout: u32,
    slot: String,
    outcome: String,
    amrap: Option<u32>,
    rpe: Option<f64>,
) -> Result<()> {
    let outcome = match outcome.to_lowercase().as_str() {
        "pass" | "success" => Outcome::Success,
        "fail" | "failure" => Outcome::Fail,
        other => {
            return Err(Error::Journal(format!(
                "unknown outcome '{}' (expected pass or fail)",
                other
            )))
        }
    };

    let (catalog, program, _) = load_projection_inputs(&data_dir, config)?;

    // Reject coordinates the program can never reach
    if workout >= program.total_workouts {
        return Err(Error::Journal(format!(
            "workout index {} out of range (program has {} workouts)",
            workout, program.total_workouts
        )));
    }
    let day = &program.days[workout as usize % program.cycle_length as usize];
    if !day.slots.iter().any(|s| s.id == slot) {
        return Err(Error::Journal(format!(
            "slot '{}' does not occur at workout {} ({})",
            slot, workout, day.name
        )));
    }

    let entry = SlotResult {
        outcome,
        amrap_reps: amrap,
        rpe,
    };
    let journal = journal(&data_dir);
    journal.append(&ResultEvent::record(workout, &slot, entry))?;
    let outcome_text = match outcome {
        Outcome::Success => "pass",
        Outcome::Fail => "fail",
    };
    println!("✓ Logged {} for {} at workout {}", outcome_text, slot, workout);

    // Reproject and show where the slot lands next
    let results = journal.results()?;
    let rows = project(&program, &catalog, &config.start_weights, &results)?;
    if let Some((row, next)) = rows
        .iter()
        .filter(|r| r.index > workout)
        .find_map(|r| r.slots.iter().find(|s| s.slot_id == slot).map(|s| (r, s)))
    {
        let mut scheme = format!("{}x{}", next.sets, next.reps);
        if next.amrap {
            scheme.push('+');
        }
        println!(
            "  Next {}: workout {} ({}) @ {:.1} - {}{}",
            slot,
            row.index,
            row.day_name,
            next.weight,
            scheme,
            if next.is_deload { " (deload)" } else { "" }
        );
    }

    Ok(())
}

fn cmd_clear(data_dir: PathBuf, config: &Config, workout: u32, slot: String) -> Result<()> {
    // Only validate that the program exists; clearing an already-absent
    // result is harmless
    let _ = load_projection_inputs(&data_dir, config)?;

    journal(&data_dir).append(&ResultEvent::clear(workout, &slot))?;
    println!("✓ Cleared result for {} at workout {}", slot, workout);
    Ok(())
}

fn cmd_undo(data_dir: PathBuf, _config: &Config) -> Result<()> {
    match journal(&data_dir).undo()? {
        Some(event) => {
            let what = match event.entry {
                Some(_) => "result",
                None => "clear",
            };
            println!(
                "✓ Undid {} for {} at workout {}",
                what, event.slot_id, event.workout
            );
        }
        None => println!("Nothing to undo."),
    }
    Ok(())
}

fn cmd_programs() -> Result<()> {
    let catalog = get_default_catalog();

    let mut programs: Vec<_> = catalog.programs.values().collect();
    programs.sort_by_key(|p| &p.id);

    for program in programs {
        println!("{} - {}", program.id, program.name);
        println!(
            "    {} workouts, {}-day cycle",
            program.total_workouts, program.cycle_length
        );
        for day in &program.days {
            let slots: Vec<_> = day.slots.iter().map(|s| s.id.as_str()).collect();
            println!("    {}: {}", day.name, slots.join(", "));
        }
        println!();
    }

    Ok(())
}
