#![forbid(unsafe_code)]

//! Core domain model and progression engine for liftplan.
//!
//! This crate provides:
//! - Domain types (programs, days, slots, stages, results)
//! - The progression rule interpreter and per-slot state threading
//! - The workout projection engine (deterministic, replayable)
//! - The exercise/program catalog
//! - Results journal persistence with undo

pub mod types;
pub mod error;
pub mod rules;
pub mod slot;
pub mod engine;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod journal;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use rules::{apply_rule, round_half, RuleContext};
pub use slot::SlotThreader;
pub use engine::project;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use journal::{fold_events, ResultJournal};
