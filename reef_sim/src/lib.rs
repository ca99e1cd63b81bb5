// reef_sim: discrete-time reef ecosystem simulation library.
//
// A rectangular field of cells is populated by sharks, dolphins, turtles,
// crabs, small fish, seagrass, algae and the corpses they leave behind. Each
// step every occupant acts in turn: animals mate, catch and spread disease,
// feed and move; plants spread and get grazed; corpses decompose. A cosine
// day/night cycle gates some species and drives a slowly warming
// temperature. The run ends when too few species survive.
//
// This crate has no rendering or I/O. It can be tested, benchmarked and run
// headless; the `reef_cli` crate drives it from the command line.
//
// Module overview:
// - `sim.rs`:         SimState, the step loop, seeding, lifecycle phases.
// - `behavior.rs`:    Generic per-turn algorithms (feed, mate, infect, die).
// - `habitat.rs`:     Entity arena plus field, kept mutually consistent.
// - `field.rs`:       Dense 2D occupancy grid and adjacency queries.
// - `entity.rs`:      The single Entity type for every occupant.
// - `species.rs`:     SpeciesData / SpeciesTable, data-driven species behavior.
// - `environment.rs`: Illumination, temperature and the day/night clock.
// - `stats.rs`:       Population counts and the viability policy.
// - `event.rs`:       Narrative SimEvents returned from each step.
// - `render.rs`:      Renderer trait and the read-only StatusReport.
// - `config.rs`:      SimConfig, construction parameters.
// - `types.rs`:       Location, EntityId, Species, capability bitsets.
// - `prng`:           Re-exported from `reef_prng`: xoshiro256++ PRNG with SplitMix64 seeding.
//
// **Critical constraint: determinism.** All randomness comes from one seeded
// `ReefRng` owned by the habitat and passed explicitly to whatever needs it.
// No `HashMap`, no system time, no OS entropy. Use `BTreeMap` for ordered
// collections.

pub mod behavior;
pub mod config;
pub mod entity;
pub mod environment;
pub mod event;
pub mod field;
pub mod habitat;
pub use reef_prng as prng;
pub mod render;
pub mod sim;
pub mod species;
pub mod stats;
pub mod types;

use thiserror::Error;
use types::Location;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("location {location} is outside the field")]
    OutOfBounds { location: Location },
    #[error("location {location} is already occupied")]
    CellOccupied { location: Location },
    #[error("unknown species {0:?}")]
    UnknownSpecies(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_the_location() {
        let err = SimError::OutOfBounds {
            location: Location::new(-1, 4),
        };
        assert_eq!(err.to_string(), "location (-1, 4) is outside the field");
        assert_eq!(
            SimError::UnknownSpecies("kraken".into()).to_string(),
            "unknown species \"kraken\""
        );
    }
}
