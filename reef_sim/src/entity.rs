// The single entity type for every occupant of the reef.
//
// Plants, animals and corpses share one struct. Constant per-species
// parameters live in the `SpeciesTable` (see `species.rs`); this struct only
// holds what changes over an individual's life: age, food, vitality,
// infection, accumulated death probability, breeding countdown, and where it
// currently sits.
//
// Liveness and location are private. They change together, through
// `Habitat::kill` and `Habitat::relocate`, so that a dead entity never keeps
// a location and the field never references a dead entity.

use crate::prng::ReefRng;
use crate::species::SpeciesData;
use crate::types::{Capabilities, DeathCause, EntityId, Gender, Kingdom, Location, Species};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub species: Species,
    pub kingdom: Kingdom,
    alive: bool,
    location: Option<Location>,
    /// Where it was seeded, born or left behind.
    pub born_at: Location,
    /// Steps lived. Only grows while alive.
    pub age: u32,
    pub food_level: i32,
    pub max_food_level: i32,
    /// What a predator gains from eating this entity.
    pub food_value: i32,
    /// Remaining bites for plants.
    pub vitality: i32,
    /// `None` for species that do not breed.
    pub gender: Option<Gender>,
    /// Steps until a female can conceive again.
    pub time_until_impregnation: i32,
    pub infected: bool,
    /// Accumulates past the species' decay age.
    pub death_probability: f64,
    pub death_cause: Option<DeathCause>,
}

impl Entity {
    /// Build a newborn of `species` at `location`. Breeding species draw
    /// their gender from `rng`; nothing else is random.
    pub fn new(
        id: EntityId,
        species: Species,
        data: &SpeciesData,
        location: Location,
        rng: &mut ReefRng,
    ) -> Self {
        let gender = if data.has(Capabilities::CAN_BREED) {
            Some(if rng.random_bool(data.male_ratio) {
                Gender::Male
            } else {
                Gender::Female
            })
        } else {
            None
        };
        Self {
            id,
            species,
            kingdom: data.kingdom,
            alive: true,
            location: Some(location),
            born_at: location,
            age: 0,
            food_level: data.initial_food_level.min(data.max_food_level),
            max_food_level: data.max_food_level,
            food_value: data.food_value,
            vitality: data.initial_vitality,
            gender,
            time_until_impregnation: 0,
            infected: false,
            death_probability: 0.0,
            death_cause: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Current cell, or `None` once dead.
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn is_female(&self) -> bool {
        self.gender == Some(Gender::Female)
    }

    /// Add `amount` to the food level, never exceeding `max_food_level`.
    pub fn increment_food_level(&mut self, amount: i32) {
        self.food_level = self.food_level.saturating_add(amount).min(self.max_food_level);
    }

    pub fn decrement_food_level(&mut self) {
        self.food_level -= 1;
    }

    pub fn increment_age(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    pub(crate) fn set_location(&mut self, location: Location) {
        self.location = Some(location);
    }

    /// Mark dead and return the cell the entity occupied. Dying twice keeps
    /// the first cause.
    pub(crate) fn mark_dead(&mut self, cause: DeathCause) -> Option<Location> {
        if !self.alive {
            return None;
        }
        self.alive = false;
        self.death_cause = Some(cause);
        self.location.take()
    }
}
