// The renderer contract: how the step engine publishes its state.
//
// The engine calls `Renderer::show_status` once after `reset` and once per
// completed step. A renderer receives a `StatusReport` that borrows the
// engine's state read-only, so it cannot mutate the field or any entity.
// Concrete renderers (ASCII, JSON lines, summaries) live in the CLI crate;
// the core only ships `NullRenderer` for headless runs and tests.

use crate::environment::DayPhase;
use crate::habitat::Habitat;
use crate::stats::PopulationStats;
use crate::types::{Location, Species};
use serde::{Deserialize, Serialize};

/// What a renderer may know about one occupied cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub species: Species,
    pub infected: bool,
}

/// Read-only view of the field.
#[derive(Clone, Copy)]
pub struct FieldSnapshot<'a> {
    habitat: &'a Habitat,
}

impl<'a> FieldSnapshot<'a> {
    pub fn new(habitat: &'a Habitat) -> Self {
        Self { habitat }
    }

    pub fn depth(&self) -> usize {
        self.habitat.field().depth()
    }

    pub fn width(&self) -> usize {
        self.habitat.field().width()
    }

    /// The occupant of `loc`; `None` for empty or out-of-bounds cells.
    pub fn cell(&self, loc: Location) -> Option<CellView> {
        self.habitat.entity_at(loc).map(|e| CellView {
            species: e.species,
            infected: e.infected,
        })
    }

    /// Row-major iteration over the occupied cells.
    pub fn occupied(self) -> impl Iterator<Item = (Location, CellView)> + 'a {
        let habitat = self.habitat;
        habitat.field().occupants().filter_map(move |(loc, id)| {
            habitat.entity(id).map(|e| {
                (
                    loc,
                    CellView {
                        species: e.species,
                        infected: e.infected,
                    },
                )
            })
        })
    }
}

/// Everything published for one step.
#[derive(Clone, Copy)]
pub struct StatusReport<'a> {
    pub step: u64,
    pub field: FieldSnapshot<'a>,
    pub stats: &'a PopulationStats,
    pub illumination: f64,
    pub phase: DayPhase,
    pub temperature: f64,
}

impl StatusReport<'_> {
    pub fn day_label(&self) -> &'static str {
        self.phase.label()
    }

    /// Gray level for empty water, 0..=255.
    pub fn empty_shade(&self) -> u8 {
        (255.0 * self.illumination.clamp(0.0, 1.0)).round() as u8
    }
}

pub trait Renderer {
    fn show_status(&mut self, status: &StatusReport<'_>);
}

/// Discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn show_status(&mut self, _status: &StatusReport<'_>) {}
}
