use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_SPARRING_EXERCISE: &str = "Non-Stop Sparring";
pub const DEFAULT_MONDAY_DRILL: &str = "Shadowboxing";

/// Program-level knobs for the assembly engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramConfig {
    /// Station 3 exercise on the fixed-drill days.
    pub sparring_exercise_name: String,
    /// Monday Station 1 Phase 1 drill.
    pub monday_drill_name: String,
    /// Seeds the rotation RNG; entropy when unset.
    pub rotation_seed: Option<u64>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            sparring_exercise_name: DEFAULT_SPARRING_EXERCISE.to_string(),
            monday_drill_name: DEFAULT_MONDAY_DRILL.to_string(),
            rotation_seed: None,
        }
    }
}

impl ProgramConfig {
    pub fn from_env() -> Result<Self> {
        let sparring_exercise_name = env::var("SPARRING_EXERCISE_NAME")
            .ok()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SPARRING_EXERCISE.to_string());
        let monday_drill_name = env::var("MONDAY_DRILL_NAME")
            .ok()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MONDAY_DRILL.to_string());
        let rotation_seed = env::var("ROTATION_SEED")
            .ok()
            .map(|seed| seed.parse().context("ROTATION_SEED must be an unsigned integer"))
            .transpose()?;

        Ok(Self {
            sparring_exercise_name,
            monday_drill_name,
            rotation_seed,
        })
    }
}
