// Species data: data-driven organism behavior.
//
// All behavioral differences between species (sharks, crabs, seagrass, ...)
// are expressed as data in `SpeciesData`, collected in a `SpeciesTable`
// keyed by `Species`. The sim uses a single `Entity` type and the generic
// algorithms in `behavior.rs` read species-specific values from this table
// at runtime. Which algorithm runs for a species is decided by its `kingdom`
// and `capabilities`, never by matching on the species tag.
//
// The table is also the species registry: `Entity::new` reads the entry for
// a species to build a newborn, so seeding, offspring and corpses all go
// through one compile-time-known constructor.
//
// The constants here are compiled in. Tests may clone the default table and
// tweak individual entries. Nothing preys on dolphins or turtles, so their
// food value is zero. The creation probabilities of dolphin, turtle, crab
// and algae are tuning values, not derived from the food web.
//
// See also: `entity.rs` for the per-instance state these values seed,
// `sim.rs` for the seeding policy that reads `creation_probability`.

use crate::types::{Capabilities, Kingdom, Species, SpeciesSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-species constant parameters. `Copy`, so behavior code can take a
/// snapshot of an entry and keep mutating the habitat around it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub kingdom: Kingdom,
    pub capabilities: Capabilities,

    /// Species this one may eat. Empty for plants and corpses.
    pub diet: SpeciesSet,

    /// Age after which death probability starts to accrue.
    pub age_of_decay: u32,
    /// Added to the accumulated death probability every step past
    /// `age_of_decay`.
    pub rate_of_decay: f64,

    pub max_food_level: i32,
    /// Food level a newborn starts with.
    pub initial_food_level: i32,
    /// Food level a predator gains from eating one of these.
    pub food_value: i32,

    /// Bites a plant can take before it dies. Zero for non-plants.
    pub initial_vitality: i32,

    // Animal reproduction.
    pub breeding_age: u32,
    pub max_litter_size: u32,
    pub pregnancy_period: i32,
    pub impregnation_probability: f64,
    /// Chance a newborn is male.
    pub male_ratio: f64,

    // Plant reproduction.
    pub reproduction_age: u32,
    pub reproduction_probability: f64,
    /// How far (in steps) a plant can seed an offspring.
    pub reproduction_range: u32,

    // Disease.
    pub infection_probability: f64,
    pub spreading_probability: f64,
    /// Only consulted when `capabilities` has `SELF_CURE`.
    pub cure_probability: f64,

    /// Chance a death leaves a corpse. Only consulted with `LEAVES_CORPSE`.
    pub corpse_probability: f64,
    /// Per-step chance a corpse disappears.
    pub decomposition_probability: f64,

    pub min_temp: f64,
    pub max_temp: f64,

    /// Per-cell chance of placing this species during initial seeding.
    pub creation_probability: f64,
}

impl SpeciesData {
    pub fn is_animal(&self) -> bool {
        self.capabilities.contains(Capabilities::ANIMAL)
    }

    pub fn has(&self, capability: Capabilities) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn tolerates(&self, temperature: f64) -> bool {
        (self.min_temp..=self.max_temp).contains(&temperature)
    }

    /// Shared animal template; species constructors override what differs.
    fn animal() -> Self {
        Self {
            kingdom: Kingdom::Animal,
            capabilities: Capabilities::ANIMAL
                | Capabilities::CAN_BREED
                | Capabilities::CAN_INFECT
                | Capabilities::LEAVES_CORPSE,
            diet: SpeciesSet::EMPTY,
            age_of_decay: 0,
            rate_of_decay: 0.1,
            max_food_level: 1,
            initial_food_level: 1,
            food_value: 0,
            initial_vitality: 0,
            breeding_age: 0,
            max_litter_size: 1,
            pregnancy_period: 0,
            impregnation_probability: 0.0,
            male_ratio: 0.5,
            reproduction_age: 0,
            reproduction_probability: 0.0,
            reproduction_range: 1,
            infection_probability: 0.0005,
            spreading_probability: 0.05,
            cure_probability: 0.0,
            corpse_probability: 0.1,
            decomposition_probability: 0.0,
            min_temp: -99.0,
            max_temp: 99.0,
            creation_probability: 0.0,
        }
    }

    /// Shared plant template.
    fn plant() -> Self {
        Self {
            kingdom: Kingdom::Plant,
            capabilities: Capabilities::NONE,
            infection_probability: 0.0,
            spreading_probability: 0.0,
            corpse_probability: 0.0,
            ..Self::animal()
        }
    }

    pub fn shark() -> Self {
        Self {
            diet: SpeciesSet::of(&[Species::SmallFish]),
            age_of_decay: 140,
            max_food_level: 16,
            initial_food_level: 16,
            breeding_age: 10,
            max_litter_size: 4,
            pregnancy_period: 6,
            impregnation_probability: 0.9,
            creation_probability: 0.02,
            ..Self::animal()
        }
    }

    pub fn dolphin() -> Self {
        Self {
            diet: SpeciesSet::of(&[Species::SmallFish, Species::Crab]),
            age_of_decay: 200,
            max_food_level: 80,
            initial_food_level: 40,
            breeding_age: 25,
            max_litter_size: 4,
            pregnancy_period: 6,
            impregnation_probability: 0.3,
            creation_probability: 0.01,
            ..Self::animal()
        }
    }

    pub fn turtle() -> Self {
        Self {
            capabilities: Self::animal().capabilities | Capabilities::SELF_CURE,
            diet: SpeciesSet::of(&[Species::Crab, Species::Seagrass]),
            age_of_decay: 200,
            max_food_level: 60,
            initial_food_level: 30,
            breeding_age: 18,
            max_litter_size: 4,
            pregnancy_period: 6,
            impregnation_probability: 0.4,
            cure_probability: 0.1,
            creation_probability: 0.015,
            ..Self::animal()
        }
    }

    pub fn crab() -> Self {
        Self {
            capabilities: Self::animal().capabilities | Capabilities::DAY_ACTIVE,
            diet: SpeciesSet::of(&[Species::Algae, Species::Corpse, Species::SmallFish]),
            age_of_decay: 50,
            max_food_level: 20,
            initial_food_level: 20,
            food_value: 8,
            breeding_age: 6,
            max_litter_size: 6,
            pregnancy_period: 5,
            impregnation_probability: 0.8,
            min_temp: 0.0,
            max_temp: 50.0,
            creation_probability: 0.03,
            ..Self::animal()
        }
    }

    pub fn small_fish() -> Self {
        Self {
            capabilities: Self::animal().capabilities | Capabilities::SELF_CURE,
            diet: SpeciesSet::of(&[Species::Seagrass]),
            age_of_decay: 30,
            max_food_level: 9,
            initial_food_level: 9,
            food_value: 9,
            breeding_age: 5,
            max_litter_size: 4,
            pregnancy_period: 1,
            impregnation_probability: 0.12,
            cure_probability: 0.2,
            creation_probability: 0.08,
            ..Self::animal()
        }
    }

    pub fn seagrass() -> Self {
        Self {
            age_of_decay: 30,
            food_value: 4,
            initial_vitality: 3,
            reproduction_age: 1,
            reproduction_probability: 0.06,
            reproduction_range: 1,
            creation_probability: 0.03,
            ..Self::plant()
        }
    }

    pub fn algae() -> Self {
        Self {
            capabilities: Capabilities::DAY_REPRODUCE,
            age_of_decay: 60,
            food_value: 5,
            initial_vitality: 4,
            reproduction_age: 5,
            reproduction_probability: 0.08,
            reproduction_range: 3,
            min_temp: 0.0,
            max_temp: 30.0,
            creation_probability: 0.04,
            ..Self::plant()
        }
    }

    pub fn corpse() -> Self {
        Self {
            kingdom: Kingdom::Carrion,
            age_of_decay: u32::MAX,
            food_value: 4,
            decomposition_probability: 0.1,
            ..Self::plant()
        }
    }
}

/// The species registry: one `SpeciesData` per `Species`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesTable {
    entries: BTreeMap<Species, SpeciesData>,
}

impl SpeciesTable {
    /// Species tested, in this order, against each cell during seeding.
    /// The first successful draw wins the cell.
    pub const SEEDING_ORDER: [Species; 7] = [
        Species::Shark,
        Species::Dolphin,
        Species::Turtle,
        Species::Crab,
        Species::SmallFish,
        Species::Algae,
        Species::Seagrass,
    ];

    pub fn get(&self, species: Species) -> &SpeciesData {
        // Every variant is inserted by `Default` and entries are never
        // removed, so the lookup cannot miss.
        &self.entries[&species]
    }

    pub fn get_mut(&mut self, species: Species) -> &mut SpeciesData {
        self.entries
            .entry(species)
            .or_insert_with(|| default_data(species))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Species, &SpeciesData)> {
        self.entries.iter().map(|(sp, data)| (*sp, data))
    }
}

impl Default for SpeciesTable {
    fn default() -> Self {
        Self {
            entries: Species::ALL
                .into_iter()
                .map(|sp| (sp, default_data(sp)))
                .collect(),
        }
    }
}

fn default_data(species: Species) -> SpeciesData {
    match species {
        Species::Shark => SpeciesData::shark(),
        Species::Dolphin => SpeciesData::dolphin(),
        Species::Turtle => SpeciesData::turtle(),
        Species::Crab => SpeciesData::crab(),
        Species::SmallFish => SpeciesData::small_fish(),
        Species::Seagrass => SpeciesData::seagrass(),
        Species::Algae => SpeciesData::algae(),
        Species::Corpse => SpeciesData::corpse(),
    }
}
