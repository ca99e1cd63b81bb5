// Run configuration.
//
// `SimConfig` holds the construction parameters of a simulation: grid
// dimensions and adjacency rule, the day/night cycle, warming rate, random
// seed, viability threshold and optional step budget. It is serde-derivable
// so a run can be described in a JSON file (missing fields take their
// defaults), and the CLI builds one from its flags.
//
// Dimensions and cycle length are signed so that a nonsensical value can be
// represented and then recovered. `sanitized` replaces any non-positive or
// oversized one with its default and logs a warning; the step engine always
// sanitizes before building a field, so bad input is never fatal.
//
// Species parameters are not part of the config. They are compiled into the
// `SpeciesTable` (see `species.rs`).
//
// **Critical constraint: determinism.** Two runs with equal configs (and
// species tables) produce identical histories.

use crate::field::Neighborhood;
use crate::species::SpeciesTable;
use crate::types::SpeciesSet;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DEPTH: i64 = 80;
pub const DEFAULT_WIDTH: i64 = 120;
pub const DEFAULT_DAY_NIGHT_CYCLE: i64 = 1000;

/// Largest accepted field, in cells.
pub const MAX_CELLS: i64 = 1 << 26;

/// Every species the initial population may contain.
pub const SEEDABLE: SpeciesSet = SpeciesSet::of(&SpeciesTable::SEEDING_ORDER);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Rows in the field.
    pub depth: i64,
    /// Columns in the field.
    pub width: i64,
    /// Steps per full day/night cycle.
    pub day_night_cycle: i64,
    /// Baseline warming per full cycle, in degrees.
    pub daily_temp_increase: f64,
    pub seed: u64,
    pub neighborhood: Neighborhood,
    /// Fewer distinct living species than this ends the run.
    pub min_viable_species: usize,
    /// Species considered when populating the field. Others are skipped
    /// without a draw.
    pub seeded_species: SpeciesSet,
    /// Stop after this many steps even if still viable.
    pub max_steps: Option<u64>,
    /// Pause between steps when animating. Only the CLI honors this.
    pub step_delay_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            width: DEFAULT_WIDTH,
            day_night_cycle: DEFAULT_DAY_NIGHT_CYCLE,
            daily_temp_increase: 1.0,
            seed: 42,
            neighborhood: Neighborhood::Moore,
            min_viable_species: 2,
            seeded_species: SEEDABLE,
            max_steps: None,
            step_delay_ms: 0,
        }
    }
}

impl SimConfig {
    /// A default config with the given dimensions.
    pub fn with_size(depth: i64, width: i64) -> Self {
        Self {
            depth,
            width,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Copy of this config with every invalid value replaced by its default.
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();
        if !dimensions_valid(out.depth, out.width) {
            tracing::warn!(
                depth = out.depth,
                width = out.width,
                "field dimensions must be positive and at most {MAX_CELLS} cells, \
                 using {DEFAULT_DEPTH}x{DEFAULT_WIDTH}"
            );
            out.depth = DEFAULT_DEPTH;
            out.width = DEFAULT_WIDTH;
        }
        if out.day_night_cycle <= 0 || u32::try_from(out.day_night_cycle).is_err() {
            tracing::warn!(
                cycle = out.day_night_cycle,
                "day/night cycle must be between 1 and {}, using {DEFAULT_DAY_NIGHT_CYCLE}",
                u32::MAX
            );
            out.day_night_cycle = DEFAULT_DAY_NIGHT_CYCLE;
        }
        if !out.daily_temp_increase.is_finite() {
            tracing::warn!("daily temperature increase is not finite, using 1.0");
            out.daily_temp_increase = 1.0;
        }
        out
    }

    /// Field dimensions as `(depth, width)`. Assumes a sanitized config.
    pub fn dimensions(&self) -> (usize, usize) {
        (
            usize::try_from(self.depth).unwrap_or(DEFAULT_DEPTH as usize),
            usize::try_from(self.width).unwrap_or(DEFAULT_WIDTH as usize),
        )
    }

    /// Cycle length. Assumes a sanitized config.
    pub fn period(&self) -> u32 {
        u32::try_from(self.day_night_cycle).unwrap_or(DEFAULT_DAY_NIGHT_CYCLE as u32)
    }
}

/// Both sides positive and addressable by a `Location`, and the whole grid
/// no larger than `MAX_CELLS`.
fn dimensions_valid(depth: i64, width: i64) -> bool {
    let max_side = i64::from(i32::MAX);
    (1..=max_side).contains(&depth)
        && (1..=max_side).contains(&width)
        && depth.checked_mul(width).is_some_and(|cells| cells <= MAX_CELLS)
}
