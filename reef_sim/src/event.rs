// Narrative events emitted by the step engine.
//
// Each call to `SimState::step` returns the events of that step in a
// `StepResult`. They describe what happened (births, deaths and their causes,
// corpses appearing, day/night flips, termination) for logs, renderers and
// tests. Nothing in the simulation reads them back.
//
// Ordering within a step is deterministic: the phase change first (it happens
// before any entity acts), then births and corpses in creation order, then
// deaths in creation order of the entity that died, then termination.
//
// See also: `sim.rs` for where these are produced.

use crate::environment::DayPhase;
use crate::types::{DeathCause, EntityId, Location, Species};
use serde::{Deserialize, Serialize};

/// A narrative event tagged with the step it happened in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub step: u64,
    pub kind: SimEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimEventKind {
    /// An offspring or seedling was placed.
    Born {
        id: EntityId,
        species: Species,
        at: Location,
    },
    /// A death left remains behind.
    CorpseLeft { id: EntityId, at: Location },
    Died {
        id: EntityId,
        species: Species,
        cause: DeathCause,
    },
    PhaseChanged { phase: DayPhase },
    Terminated { reason: TerminationReason },
}

/// Why the engine stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Too few living species remain.
    NotViable,
    /// The configured step limit was reached.
    StepBudgetExhausted,
}

/// Everything one step produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub events: Vec<SimEvent>,
}

impl StepResult {
    pub fn births(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, SimEventKind::Born { .. }))
            .count()
    }

    pub fn deaths(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, SimEventKind::Died { .. }))
            .count()
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        self.events.iter().find_map(|e| match e.kind {
            SimEventKind::Terminated { reason } => Some(reason),
            _ => None,
        })
    }
}
