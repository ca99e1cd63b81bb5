// The entity arena and its field, kept mutually consistent.
//
// `Habitat` owns every entity (keyed by `EntityId` in a `BTreeMap`, so
// iteration order is creation order) together with the `Field` that
// references them, the species registry and the simulation's random stream.
// Behavior code borrows these pieces separately, which is why the fields are
// crate-visible rather than hidden behind `&mut self` accessors.
//
// Invariants maintained here:
// - every alive entity has `location() == Some(loc)` and `field.get(loc)`
//   returns its id;
// - a dead entity has no location and no cell references it;
// - dead entities stay in the arena until `purge_dead` so that later actors
//   in the same step can still see that they died.
//
// See also: `behavior.rs` for the algorithms that drive these mutations,
// `sim.rs` for the step engine that owns the habitat.

use crate::entity::Entity;
use crate::field::Field;
use crate::prng::ReefRng;
use crate::species::{SpeciesData, SpeciesTable};
use crate::types::{DeathCause, EntityId, Location, Species};
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
pub struct Habitat {
    pub(crate) field: Field,
    pub(crate) entities: BTreeMap<EntityId, Entity>,
    pub(crate) species: SpeciesTable,
    pub(crate) rng: ReefRng,
    next_id: u64,
}

impl Habitat {
    pub fn new(field: Field, species: SpeciesTable, rng: ReefRng) -> Self {
        Self {
            field,
            entities: BTreeMap::new(),
            species,
            rng,
            next_id: 0,
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn species_table(&self) -> &SpeciesTable {
        &self.species
    }

    pub fn data(&self, species: Species) -> &SpeciesData {
        self.species.get(species)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// The entity occupying `loc`, if any.
    pub fn entity_at(&self, loc: Location) -> Option<&Entity> {
        self.field.get(loc).and_then(|id| self.entities.get(&id))
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.get(&id).is_some_and(Entity::is_alive)
    }

    /// All entities, alive or awaiting purge, in creation order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Snapshot of the current ids in creation order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Create a newborn of `species` at `loc` and register it in the field.
    /// The caller picks a free cell.
    pub fn spawn(&mut self, species: Species, loc: Location) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        let entity = Entity::new(id, species, self.species.get(species), loc, &mut self.rng);
        self.field.place(id, loc);
        self.entities.insert(id, entity);
        id
    }

    /// Move an entity, clearing the cell it left. No-op for unknown or dead
    /// entities.
    pub fn relocate(&mut self, id: EntityId, to: Location) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if !entity.is_alive() {
            return;
        }
        if let Some(from) = entity.location() {
            if self.field.get(from) == Some(id) {
                self.field.clear(from);
            }
        }
        entity.set_location(to);
        self.field.place(id, to);
    }

    /// Mark an entity dead and free its cell. Returns the vacated location,
    /// or `None` if the entity was unknown or already dead.
    pub fn kill(&mut self, id: EntityId, cause: DeathCause) -> Option<Location> {
        let vacated = self.entities.get_mut(&id)?.mark_dead(cause)?;
        if self.field.get(vacated) == Some(id) {
            self.field.clear(vacated);
        }
        tracing::trace!(entity = %id, ?cause, at = %vacated, "death");
        Some(vacated)
    }

    /// Drop every dead entity from the arena. Returns how many were removed.
    pub fn purge_dead(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, e| e.is_alive());
        before - self.entities.len()
    }

    /// Remove every entity and empty the field. Ids keep counting up.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.field.clear_all();
    }

    /// Check the field/arena agreement. Returns the first violation found.
    pub fn check_consistency(&self) -> Result<(), String> {
        for entity in self.entities.values() {
            match (entity.is_alive(), entity.location()) {
                (true, Some(loc)) => {
                    if self.field.get(loc) != Some(entity.id) {
                        return Err(format!("{} thinks it is at {loc} but the cell disagrees", entity.id));
                    }
                }
                (true, None) => return Err(format!("{} is alive with no location", entity.id)),
                (false, Some(loc)) => return Err(format!("{} is dead but still at {loc}", entity.id)),
                (false, None) => {}
            }
        }
        for (loc, id) in self.field.occupants() {
            match self.entities.get(&id) {
                Some(e) if e.is_alive() && e.location() == Some(loc) => {}
                Some(_) => return Err(format!("cell {loc} references stale {id}")),
                None => return Err(format!("cell {loc} references unknown {id}")),
            }
        }
        Ok(())
    }
}
