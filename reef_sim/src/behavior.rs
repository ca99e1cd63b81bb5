// Generic per-turn behavior for every kind of occupant.
//
// These are free functions over `&mut Habitat` and an `EntityId`. They read
// species parameters from the species table and never branch on the species
// tag itself: the entity's kingdom picks the turn routine (`act`), and the
// species' `Capabilities` switch individual steps on or off.
//
// Animal turn, in order:
//   1. day-active species skip the whole turn at night;
//   2. a female next to an opposite-gender mate may conceive and give birth
//      into free neighboring cells;
//   3. the disease check runs (spontaneous infection or self-cure), and a
//      carrier tries to infect its living animal neighbors;
//   4. it eats an adjacent food source (moving into the cell if the prey was
//      consumed whole) or else moves to a free neighbor; with nowhere to go it
//      dies of overcrowding;
//   5. it ages, gets hungrier, and `decide_death` runs.
//
// Plant turn: maybe reproduce (within `reproduction_range`, day-gated for
// some species), die if grazed down to zero vitality, age, `decide_death`.
//
// Corpse turn: a per-step decomposition draw.
//
// Every interaction checks the neighbor's liveness first, so an entity that
// died earlier in the same pass is never eaten, mated with or infected.
//
// All randomness comes from `habitat.rng`, in a fixed order, which keeps a
// run reproducible from its seed.

use crate::habitat::Habitat;
use crate::types::{Capabilities, DeathCause, EntityId, Kingdom, Location, Species};

/// Environmental inputs shared by every actor during one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnContext {
    pub is_day: bool,
    pub temperature: f64,
}

/// Run one entity's turn. Offspring and corpses created during the turn are
/// appended to `newborns`. Does nothing for dead or unknown entities.
pub fn act(habitat: &mut Habitat, id: EntityId, ctx: TurnContext, newborns: &mut Vec<EntityId>) {
    let Some(entity) = habitat.entity(id) else {
        return;
    };
    if !entity.is_alive() {
        return;
    }
    match entity.kingdom {
        Kingdom::Animal => act_animal(habitat, id, ctx, newborns),
        Kingdom::Plant => act_plant(habitat, id, ctx, newborns),
        Kingdom::Carrion => act_corpse(habitat, id),
    }
}

fn act_animal(habitat: &mut Habitat, id: EntityId, ctx: TurnContext, newborns: &mut Vec<EntityId>) {
    let Some(species) = habitat.entity(id).map(|e| e.species) else {
        return;
    };
    let data = *habitat.data(species);

    if data.has(Capabilities::DAY_ACTIVE) && !ctx.is_day {
        return;
    }

    if data.has(Capabilities::CAN_BREED) && found_mate(habitat, id) && is_female(habitat, id) {
        let litter = impregnate(habitat, id);
        give_birth(habitat, id, litter, newborns);
    }

    if data.has(Capabilities::CAN_INFECT) && check_infected(habitat, id) {
        spread_infection(habitat, id);
    }

    let Some(here) = habitat.entity(id).and_then(|e| e.location()) else {
        return;
    };
    let destination = find_food(habitat, id)
        .or_else(|| habitat.field.free_adjacent_location(here, &mut habitat.rng));
    match destination {
        Some(to) => habitat.relocate(id, to),
        None => {
            leave_corpse_after_death(habitat, id, DeathCause::Overcrowding, newborns);
            return;
        }
    }

    if let Some(entity) = habitat.entity_mut(id) {
        entity.increment_age();
        entity.decrement_food_level();
    }
    if let Some(cause) = decide_death(habitat, id, ctx.temperature) {
        leave_corpse_after_death(habitat, id, cause, newborns);
    }
}

fn act_plant(habitat: &mut Habitat, id: EntityId, ctx: TurnContext, newborns: &mut Vec<EntityId>) {
    let Some(species) = habitat.entity(id).map(|e| e.species) else {
        return;
    };
    let day_gated = habitat.data(species).has(Capabilities::DAY_REPRODUCE);

    if can_reproduce(habitat, id) && (ctx.is_day || !day_gated) {
        reproduce(habitat, id, newborns);
    }

    if habitat.entity(id).is_some_and(|e| e.vitality <= 0) {
        habitat.kill(id, DeathCause::Grazed);
        return;
    }

    if let Some(entity) = habitat.entity_mut(id) {
        entity.increment_age();
    }
    if let Some(cause) = decide_death(habitat, id, ctx.temperature) {
        habitat.kill(id, cause);
    }
}

fn act_corpse(habitat: &mut Habitat, id: EntityId) {
    let Some(species) = habitat.entity(id).map(|e| e.species) else {
        return;
    };
    let p = habitat.data(species).decomposition_probability;
    if let Some(entity) = habitat.entity_mut(id) {
        entity.increment_age();
    }
    if habitat.rng.random_bool(p) {
        habitat.kill(id, DeathCause::Decomposed);
    }
}

fn is_female(habitat: &Habitat, id: EntityId) -> bool {
    habitat.entity(id).is_some_and(|e| e.is_female())
}

fn location_of(habitat: &Habitat, id: EntityId) -> Option<Location> {
    habitat.entity(id).and_then(|e| e.location())
}

/// Eat the first edible, living neighbor found in a shuffled scan.
///
/// Animals and carrion are consumed whole: the food dies and its cell is
/// returned so the eater can move in. Plants lose one point of vitality and
/// stay put, so `None` is returned. Either way the eater's food level rises
/// by the food's value, clamped to its maximum.
pub fn find_food(habitat: &mut Habitat, id: EntityId) -> Option<Location> {
    let entity = habitat.entity(id)?;
    let here = entity.location()?;
    let diet = habitat.data(entity.species).diet;

    for n in habitat.field.adjacent_locations(here, &mut habitat.rng) {
        let Some(food_id) = habitat.field.get(n) else {
            continue;
        };
        let Some(food) = habitat.entities.get_mut(&food_id) else {
            continue;
        };
        if !food.is_alive() || !diet.contains(food.species) {
            continue;
        }
        let value = food.food_value;
        let eaten_whole = match food.kingdom {
            Kingdom::Plant => {
                food.vitality -= 1;
                false
            }
            Kingdom::Animal | Kingdom::Carrion => true,
        };
        if eaten_whole {
            habitat.kill(food_id, DeathCause::Eaten);
        }
        if let Some(eater) = habitat.entity_mut(id) {
            eater.increment_food_level(value);
        }
        return eaten_whole.then_some(n);
    }
    None
}

/// Whether a living neighbor of the same species and opposite gender is
/// adjacent. Changes nothing but the random stream.
pub fn found_mate(habitat: &mut Habitat, id: EntityId) -> bool {
    let Some(entity) = habitat.entity(id) else {
        return false;
    };
    let (Some(here), Some(gender)) = (entity.location(), entity.gender) else {
        return false;
    };
    let species = entity.species;
    let wanted = gender.opposite();

    habitat
        .field
        .adjacent_locations(here, &mut habitat.rng)
        .into_iter()
        .filter_map(|n| habitat.field.get(n))
        .filter_map(|other| habitat.entities.get(&other))
        .any(|other| other.is_alive() && other.species == species && other.gender == Some(wanted))
}

/// Count down the breeding timer; once it has run out and the entity is old
/// enough, a successful draw yields a litter of 1..=max and restarts the
/// timer. Returns the litter size, or 0.
pub fn impregnate(habitat: &mut Habitat, id: EntityId) -> u32 {
    let Some(species) = habitat.entity(id).map(|e| e.species) else {
        return 0;
    };
    let data = *habitat.data(species);
    let Some(entity) = habitat.entities.get_mut(&id) else {
        return 0;
    };

    entity.time_until_impregnation -= 1;
    let can_breed = entity.time_until_impregnation <= 0 && entity.age >= data.breeding_age;
    if can_breed && habitat.rng.random_bool(data.impregnation_probability) {
        let litter = habitat
            .rng
            .range_usize_inclusive(1, data.max_litter_size.max(1) as usize) as u32;
        entity.time_until_impregnation = data.pregnancy_period;
        litter
    } else {
        0
    }
}

/// Place up to `litter` newborns of the parent's species into free adjacent
/// cells. Fewer are born when space runs out.
pub fn give_birth(habitat: &mut Habitat, parent: EntityId, litter: u32, newborns: &mut Vec<EntityId>) {
    if litter == 0 {
        return;
    }
    let Some(entity) = habitat.entity(parent) else {
        return;
    };
    let species = entity.species;
    let Some(here) = entity.location() else {
        return;
    };
    let free = habitat.field.free_adjacent_locations(here, &mut habitat.rng);
    for loc in free.into_iter().take(litter as usize) {
        newborns.push(habitat.spawn(species, loc));
    }
}

/// Try to pass the disease to every living, not-yet-infected animal
/// neighbor, one `spreading_probability` draw each.
pub fn spread_infection(habitat: &mut Habitat, id: EntityId) {
    let Some(entity) = habitat.entity(id) else {
        return;
    };
    let Some(here) = entity.location() else {
        return;
    };
    let p = habitat.data(entity.species).spreading_probability;

    for n in habitat.field.adjacent_locations(here, &mut habitat.rng) {
        let Some(other_id) = habitat.field.get(n) else {
            continue;
        };
        let Some(other) = habitat.entities.get_mut(&other_id) else {
            continue;
        };
        let susceptible = other.is_alive()
            && !other.infected
            && habitat.species.get(other.species).has(Capabilities::CAN_INFECT);
        if susceptible && habitat.rng.random_bool(p) {
            other.infected = true;
        }
    }
}

/// Disease check for one entity. A carrier with the self-cure capability may
/// recover; a healthy entity may catch the disease spontaneously. Returns
/// whether it is infected afterwards.
pub fn check_infected(habitat: &mut Habitat, id: EntityId) -> bool {
    let Some(species) = habitat.entity(id).map(|e| e.species) else {
        return false;
    };
    let data = *habitat.data(species);
    let Some(entity) = habitat.entities.get_mut(&id) else {
        return false;
    };

    if entity.infected {
        if data.has(Capabilities::SELF_CURE) && habitat.rng.random_bool(data.cure_probability) {
            entity.infected = false;
        }
    } else if habitat.rng.random_bool(data.infection_probability) {
        entity.infected = true;
    }
    entity.infected
}

/// Evaluate the death conditions in priority order and report the first one
/// that applies. Only that condition is evaluated:
///   1. infected: certain death;
///   2. past the decay age: accrue `rate_of_decay` and draw;
///   3. out of food: certain death;
///   4. outside the temperature band: certain death.
///
/// Does not kill; the caller decides whether the death leaves a corpse.
pub fn decide_death(habitat: &mut Habitat, id: EntityId, temperature: f64) -> Option<DeathCause> {
    let species = habitat.entity(id)?.species;
    let data = *habitat.data(species);
    let entity = habitat.entities.get_mut(&id)?;
    if !entity.is_alive() {
        return None;
    }

    if entity.infected {
        Some(DeathCause::Infection)
    } else if entity.age > data.age_of_decay {
        entity.death_probability += data.rate_of_decay;
        habitat
            .rng
            .random_bool(entity.death_probability)
            .then_some(DeathCause::OldAge)
    } else if entity.food_level <= 0 {
        Some(DeathCause::Starvation)
    } else if !data.tolerates(temperature) {
        Some(DeathCause::Temperature)
    } else {
        None
    }
}

/// Kill the entity and, for species that leave remains, roll
/// `corpse_probability` to put a corpse in the vacated cell.
pub fn leave_corpse_after_death(
    habitat: &mut Habitat,
    id: EntityId,
    cause: DeathCause,
    newborns: &mut Vec<EntityId>,
) {
    let Some(species) = habitat.entity(id).map(|e| e.species) else {
        return;
    };
    let data = *habitat.data(species);
    let Some(vacated) = habitat.kill(id, cause) else {
        return;
    };
    if data.has(Capabilities::LEAVES_CORPSE) && habitat.rng.random_bool(data.corpse_probability) {
        newborns.push(habitat.spawn(Species::Corpse, vacated));
    }
}

/// Old enough and a successful draw.
pub fn can_reproduce(habitat: &mut Habitat, id: EntityId) -> bool {
    let Some(entity) = habitat.entity(id) else {
        return false;
    };
    let data = habitat.data(entity.species);
    let (age, min_age, p) = (entity.age, data.reproduction_age, data.reproduction_probability);
    age >= min_age && habitat.rng.random_bool(p)
}

/// Seed one same-species plant into a free cell within the species'
/// reproduction range.
pub fn reproduce(habitat: &mut Habitat, id: EntityId, newborns: &mut Vec<EntityId>) {
    let Some(here) = location_of(habitat, id) else {
        return;
    };
    let Some(species) = habitat.entity(id).map(|e| e.species) else {
        return;
    };
    let range = habitat.data(species).reproduction_range.max(1);
    if let Some(spot) = habitat.field.free_location_within(here, range, &mut habitat.rng) {
        newborns.push(habitat.spawn(species, spot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, Neighborhood};
    use crate::prng::ReefRng;
    use crate::species::SpeciesTable;
    use crate::types::Gender;

    const DAY: TurnContext = TurnContext {
        is_day: true,
        temperature: 15.0,
    };
    const NIGHT: TurnContext = TurnContext {
        is_day: false,
        temperature: 15.0,
    };

    /// Default table with disease switched off so outcomes are certain.
    fn calm_table() -> SpeciesTable {
        let mut table = SpeciesTable::default();
        for sp in Species::ALL {
            let data = table.get_mut(sp);
            data.infection_probability = 0.0;
            data.spreading_probability = 0.0;
        }
        table
    }

    fn habitat(depth: usize, width: usize, table: SpeciesTable) -> Habitat {
        Habitat::new(Field::new(depth, width, Neighborhood::Moore), table, ReefRng::new(7))
    }

    fn surround(h: &mut Habitat, centre: Location, species: Species) -> Vec<EntityId> {
        let mut rng = ReefRng::new(0);
        h.field()
            .adjacent_locations(centre, &mut rng)
            .into_iter()
            .collect::<Vec<_>>()
            .into_iter()
            .map(|loc| h.spawn(species, loc))
            .collect()
    }

    #[test]
    fn predator_kills_adjacent_prey_outright() {
        let mut h = habitat(1, 2, calm_table());
        let shark = h.spawn(Species::Shark, Location::new(0, 0));
        let fish = h.spawn(Species::SmallFish, Location::new(0, 1));
        h.entity_mut(shark).unwrap().food_level = 1;

        assert_eq!(find_food(&mut h, shark), Some(Location::new(0, 1)));
        assert!(!h.is_alive(fish));
        assert_eq!(h.entity(fish).unwrap().death_cause, Some(DeathCause::Eaten));
        assert!(h.field().get(Location::new(0, 1)).is_none());
        assert_eq!(h.entity(shark).unwrap().food_level, 1 + 9);
        assert!(h.check_consistency().is_ok());
    }

    #[test]
    fn herbivore_only_grazes_plants() {
        let mut h = habitat(1, 2, calm_table());
        let fish = h.spawn(Species::SmallFish, Location::new(0, 0));
        let grass = h.spawn(Species::Seagrass, Location::new(0, 1));
        h.entity_mut(fish).unwrap().food_level = 2;

        assert_eq!(find_food(&mut h, fish), None);
        let grass_after = h.entity(grass).unwrap();
        assert!(grass_after.is_alive());
        assert_eq!(grass_after.vitality, 2);
        assert_eq!(h.field().get(Location::new(0, 1)), Some(grass));
        assert_eq!(h.entity(fish).unwrap().food_level, 2 + 4);
    }

    #[test]
    fn feeding_is_clamped_to_max() {
        let mut h = habitat(1, 2, calm_table());
        let shark = h.spawn(Species::Shark, Location::new(0, 0));
        h.spawn(Species::SmallFish, Location::new(0, 1));
        h.entity_mut(shark).unwrap().food_level = 15;
        find_food(&mut h, shark);
        assert_eq!(h.entity(shark).unwrap().food_level, 16);
    }

    #[test]
    fn food_outside_diet_is_ignored() {
        let mut h = habitat(1, 2, calm_table());
        let shark = h.spawn(Species::Shark, Location::new(0, 0));
        let grass = h.spawn(Species::Seagrass, Location::new(0, 1));
        assert_eq!(find_food(&mut h, shark), None);
        assert_eq!(h.entity(grass).unwrap().vitality, 3);
    }

    #[test]
    fn dead_neighbors_are_not_eaten() {
        let mut h = habitat(1, 2, calm_table());
        let shark = h.spawn(Species::Shark, Location::new(0, 0));
        let fish = h.spawn(Species::SmallFish, Location::new(0, 1));
        h.kill(fish, DeathCause::Starvation);
        assert_eq!(find_food(&mut h, shark), None);
    }

    #[test]
    fn crabs_scavenge_corpses() {
        let mut h = habitat(1, 2, calm_table());
        let crab = h.spawn(Species::Crab, Location::new(0, 0));
        let corpse = h.spawn(Species::Corpse, Location::new(0, 1));
        h.entity_mut(crab).unwrap().food_level = 1;
        assert_eq!(find_food(&mut h, crab), Some(Location::new(0, 1)));
        assert!(!h.is_alive(corpse));
        assert_eq!(h.entity(crab).unwrap().food_level, 5);
    }

    #[test]
    fn mate_requires_same_species_and_opposite_gender() {
        let mut h = habitat(1, 3, calm_table());
        let a = h.spawn(Species::Turtle, Location::new(0, 0));
        let b = h.spawn(Species::Turtle, Location::new(0, 1));
        h.spawn(Species::Dolphin, Location::new(0, 2));
        h.entity_mut(a).unwrap().gender = Some(Gender::Female);
        h.entity_mut(b).unwrap().gender = Some(Gender::Female);
        assert!(!found_mate(&mut h, a));

        h.entity_mut(b).unwrap().gender = Some(Gender::Male);
        assert!(found_mate(&mut h, a));
        assert!(found_mate(&mut h, b));

        h.kill(b, DeathCause::Eaten);
        assert!(!found_mate(&mut h, a));
    }

    #[test]
    fn impregnation_respects_age_and_countdown() {
        let mut table = calm_table();
        table.get_mut(Species::Shark).impregnation_probability = 1.0;
        let mut h = habitat(3, 3, table);
        let shark = h.spawn(Species::Shark, Location::new(1, 1));

        // Too young.
        assert_eq!(impregnate(&mut h, shark), 0);

        h.entity_mut(shark).unwrap().age = 10;
        let litter = impregnate(&mut h, shark);
        assert!((1..=4).contains(&litter));
        assert_eq!(h.entity(shark).unwrap().time_until_impregnation, 6);

        // Countdown blocks the next five attempts, the sixth succeeds.
        for _ in 0..5 {
            assert_eq!(impregnate(&mut h, shark), 0);
        }
        assert!(impregnate(&mut h, shark) > 0);
    }

    #[test]
    fn birth_is_bounded_by_free_cells() {
        let mut h = habitat(1, 3, calm_table());
        let mother = h.spawn(Species::Crab, Location::new(0, 1));
        let mut newborns = Vec::new();
        give_birth(&mut h, mother, 6, &mut newborns);
        assert_eq!(newborns.len(), 2);
        for child in &newborns {
            let child = h.entity(*child).unwrap();
            assert_eq!(child.species, Species::Crab);
            assert_eq!(child.age, 0);
        }
        assert!(h.check_consistency().is_ok());
    }

    #[test]
    fn infection_spreads_to_animal_neighbors_only() {
        let mut table = calm_table();
        table.get_mut(Species::Dolphin).spreading_probability = 1.0;
        let mut h = habitat(1, 3, table);
        let grass = h.spawn(Species::Seagrass, Location::new(0, 0));
        let carrier = h.spawn(Species::Dolphin, Location::new(0, 1));
        let fish = h.spawn(Species::SmallFish, Location::new(0, 2));
        h.entity_mut(carrier).unwrap().infected = true;

        spread_infection(&mut h, carrier);
        assert!(h.entity(fish).unwrap().infected);
        assert!(!h.entity(grass).unwrap().infected);
    }

    #[test]
    fn self_cure_is_a_capability() {
        let mut table = calm_table();
        table.get_mut(Species::SmallFish).cure_probability = 1.0;
        table.get_mut(Species::Shark).cure_probability = 1.0;
        let mut h = habitat(1, 2, table);
        let fish = h.spawn(Species::SmallFish, Location::new(0, 0));
        let shark = h.spawn(Species::Shark, Location::new(0, 1));
        h.entity_mut(fish).unwrap().infected = true;
        h.entity_mut(shark).unwrap().infected = true;

        assert!(!check_infected(&mut h, fish));
        // Sharks lack SELF_CURE, so the probability is never consulted.
        assert!(check_infected(&mut h, shark));
    }

    #[test]
    fn spontaneous_infection() {
        let mut table = calm_table();
        table.get_mut(Species::Crab).infection_probability = 1.0;
        let mut h = habitat(1, 1, table);
        let crab = h.spawn(Species::Crab, Location::new(0, 0));
        assert!(check_infected(&mut h, crab));
        assert!(h.entity(crab).unwrap().infected);
    }

    #[test]
    fn infection_outranks_old_age() {
        let mut h = habitat(1, 1, calm_table());
        let shark = h.spawn(Species::Shark, Location::new(0, 0));
        {
            let e = h.entity_mut(shark).unwrap();
            e.infected = true;
            e.age = 1_000;
            e.food_level = 0;
        }
        for _ in 0..50 {
            assert_eq!(decide_death(&mut h, shark, 1_000.0), Some(DeathCause::Infection));
        }
        // The age branch never ran, so nothing accrued.
        assert_eq!(h.entity(shark).unwrap().death_probability, 0.0);
    }

    #[test]
    fn age_branch_shadows_starvation_and_temperature() {
        let mut table = calm_table();
        table.get_mut(Species::Shark).rate_of_decay = 0.0;
        let mut h = habitat(1, 1, table);
        let shark = h.spawn(Species::Shark, Location::new(0, 0));
        {
            let e = h.entity_mut(shark).unwrap();
            e.age = 141;
            e.food_level = 0;
        }
        assert_eq!(decide_death(&mut h, shark, 1_000.0), None);
    }

    #[test]
    fn old_age_accrues_until_certain() {
        let mut table = calm_table();
        table.get_mut(Species::Shark).rate_of_decay = 0.5;
        let mut h = habitat(1, 1, table);
        let shark = h.spawn(Species::Shark, Location::new(0, 0));
        h.entity_mut(shark).unwrap().age = 141;
        let mut cause = None;
        for _ in 0..3 {
            cause = decide_death(&mut h, shark, 15.0);
            if cause.is_some() {
                break;
            }
        }
        assert_eq!(cause, Some(DeathCause::OldAge));
    }

    #[test]
    fn starvation_and_temperature() {
        let mut h = habitat(1, 2, calm_table());
        let crab = h.spawn(Species::Crab, Location::new(0, 0));
        assert_eq!(decide_death(&mut h, crab, 20.0), None);
        assert_eq!(decide_death(&mut h, crab, 51.0), Some(DeathCause::Temperature));
        h.entity_mut(crab).unwrap().food_level = 0;
        assert_eq!(decide_death(&mut h, crab, 51.0), Some(DeathCause::Starvation));
    }

    #[test]
    fn overcrowded_animal_dies_on_its_turn() {
        let mut h = habitat(3, 3, calm_table());
        let centre = Location::new(1, 1);
        let shark = h.spawn(Species::Shark, centre);
        surround(&mut h, centre, Species::Seagrass);

        let mut newborns = Vec::new();
        act(&mut h, shark, DAY, &mut newborns);

        let dead = h.entity(shark).unwrap();
        assert!(!dead.is_alive());
        assert_eq!(dead.death_cause, Some(DeathCause::Overcrowding));
        // Either the cell is empty or a corpse took it.
        match h.field().get(centre) {
            None => assert!(newborns.is_empty()),
            Some(id) => {
                assert_eq!(newborns, vec![id]);
                assert_eq!(h.entity(id).unwrap().species, Species::Corpse);
            }
        }
        assert!(h.check_consistency().is_ok());
    }

    #[test]
    fn certain_corpse_fills_the_vacated_cell() {
        let mut table = calm_table();
        table.get_mut(Species::Turtle).corpse_probability = 1.0;
        let mut h = habitat(1, 1, table);
        let turtle = h.spawn(Species::Turtle, Location::new(0, 0));
        let mut newborns = Vec::new();
        act(&mut h, turtle, DAY, &mut newborns);
        assert_eq!(newborns.len(), 1);
        assert_eq!(h.entity_at(Location::new(0, 0)).unwrap().species, Species::Corpse);
    }

    #[test]
    fn animal_turn_moves_ages_and_hungers() {
        let mut h = habitat(3, 3, calm_table());
        let fish = h.spawn(Species::SmallFish, Location::new(1, 1));
        let mut newborns = Vec::new();
        act(&mut h, fish, DAY, &mut newborns);
        let e = h.entity(fish).unwrap();
        assert!(e.is_alive());
        assert_ne!(e.location(), Some(Location::new(1, 1)));
        assert_eq!(e.age, 1);
        assert_eq!(e.food_level, 8);
        assert!(h.check_consistency().is_ok());
    }

    #[test]
    fn day_active_species_rest_at_night() {
        let mut h = habitat(3, 3, calm_table());
        let crab = h.spawn(Species::Crab, Location::new(1, 1));
        let mut newborns = Vec::new();
        act(&mut h, crab, NIGHT, &mut newborns);
        let e = h.entity(crab).unwrap();
        assert_eq!(e.location(), Some(Location::new(1, 1)));
        assert_eq!(e.age, 0);
    }

    #[test]
    fn grazed_out_plant_dies_on_its_turn() {
        let mut h = habitat(1, 1, calm_table());
        let grass = h.spawn(Species::Seagrass, Location::new(0, 0));
        h.entity_mut(grass).unwrap().vitality = 0;
        act(&mut h, grass, DAY, &mut Vec::new());
        assert_eq!(h.entity(grass).unwrap().death_cause, Some(DeathCause::Grazed));
        assert!(h.field().get(Location::new(0, 0)).is_none());
    }

    #[test]
    fn algae_seeds_within_range_only_by_day() {
        let mut table = calm_table();
        table.get_mut(Species::Algae).reproduction_probability = 1.0;
        table.get_mut(Species::Algae).reproduction_age = 0;
        let mut h = habitat(1, 7, table);
        let algae = h.spawn(Species::Algae, Location::new(0, 3));

        let mut newborns = Vec::new();
        act(&mut h, algae, NIGHT, &mut newborns);
        assert!(newborns.is_empty());

        act(&mut h, algae, DAY, &mut newborns);
        assert_eq!(newborns.len(), 1);
        let child = h.entity(newborns[0]).unwrap().location().unwrap();
        assert!(child.chebyshev_distance(Location::new(0, 3)) <= 3);
    }

    #[test]
    fn corpse_decomposes_eventually() {
        let mut h = habitat(1, 1, calm_table());
        let corpse = h.spawn(Species::Corpse, Location::new(0, 0));
        let mut turns = 0;
        while h.is_alive(corpse) && turns < 1_000 {
            act(&mut h, corpse, DAY, &mut Vec::new());
            turns += 1;
        }
        assert_eq!(h.entity(corpse).unwrap().death_cause, Some(DeathCause::Decomposed));
    }
}
