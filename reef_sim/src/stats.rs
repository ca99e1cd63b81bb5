// Population counts and the viability policy.
//
// Counts are rebuilt from scratch every step by scanning the field rather
// than maintained incrementally, so they always describe exactly what a
// renderer would draw. Corpses are counted (they occupy cells) but do not
// count as a living species for viability.

use crate::habitat::Habitat;
use crate::types::Species;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationStats {
    counts: BTreeMap<Species, usize>,
}

impl PopulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the counts with a fresh scan of the habitat's field.
    pub fn recount(&mut self, habitat: &Habitat) {
        self.counts.clear();
        for (loc, _) in habitat.field().occupants() {
            if let Some(entity) = habitat.entity_at(loc) {
                *self.counts.entry(entity.species).or_default() += 1;
            }
        }
    }

    pub fn count(&self, species: Species) -> usize {
        self.counts.get(&species).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Species with a nonzero count, in `Species` order.
    pub fn counts(&self) -> impl Iterator<Item = (Species, usize)> + '_ {
        self.counts.iter().map(|(sp, n)| (*sp, *n))
    }

    /// Distinct non-corpse species still present.
    pub fn living_species(&self) -> usize {
        self.counts
            .iter()
            .filter(|(sp, n)| **sp != Species::Corpse && **n > 0)
            .count()
    }

    pub fn is_viable(&self, min_species: usize) -> bool {
        self.living_species() >= min_species
    }

    /// One-line summary such as `Shark: 3 Crab: 12`.
    pub fn details(&self) -> String {
        let mut out = String::new();
        for (sp, n) in self.counts() {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{sp}: {n}");
        }
        out
    }
}
