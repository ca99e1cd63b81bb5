// Core value types shared across the simulation.
//
// Grid addressing (`Location`), entity handles (`EntityId`), the species and
// kingdom tags, gender, death causes, and the two small bitsets used by the
// species table: `SpeciesSet` (diets) and `Capabilities` (behavior switches).
//
// All types are plain `Copy` values with structural equality, so they can be
// used as `BTreeMap` keys and compared freely in tests.

use crate::SimError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell address in the field. Row grows downward, column grows rightward.
/// Never mutated after construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub row: i32,
    pub col: i32,
}

impl Location {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Chebyshev distance: the number of king moves between two cells.
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        (self.row - other.row)
            .unsigned_abs()
            .max((self.col - other.col).unsigned_abs())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Entity handles
// ---------------------------------------------------------------------------

/// Handle to an entity in the habitat arena. Allocated sequentially, so
/// ordering by id is ordering by creation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Species
// ---------------------------------------------------------------------------

/// Every kind of occupant the reef knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Shark,
    Dolphin,
    Turtle,
    Crab,
    SmallFish,
    Seagrass,
    Algae,
    Corpse,
}

impl Species {
    pub const ALL: [Species; 8] = [
        Species::Shark,
        Species::Dolphin,
        Species::Turtle,
        Species::Crab,
        Species::SmallFish,
        Species::Seagrass,
        Species::Algae,
        Species::Corpse,
    ];

    pub const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    pub fn name(self) -> &'static str {
        match self {
            Species::Shark => "Shark",
            Species::Dolphin => "Dolphin",
            Species::Turtle => "Turtle",
            Species::Crab => "Crab",
            Species::SmallFish => "SmallFish",
            Species::Seagrass => "Seagrass",
            Species::Algae => "Algae",
            Species::Corpse => "Corpse",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = SimError;

    /// Case-insensitive; accepts `small_fish` and `small-fish` as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        Species::ALL
            .into_iter()
            .find(|sp| sp.name().to_lowercase() == folded)
            .ok_or_else(|| SimError::UnknownSpecies(s.to_string()))
    }
}

/// Broad classification that decides how an occupant is eaten.
///
/// Animals and carrion are consumed whole (killed, cell freed); plants lose
/// one point of vitality per bite and stay in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kingdom {
    Animal,
    Plant,
    Carrion,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn opposite(self) -> Self {
        match self {
            Gender::Female => Gender::Male,
            Gender::Male => Gender::Female,
        }
    }
}

/// Why an entity stopped being alive. Recorded on the entity and reported
/// through narrative events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeathCause {
    Infection,
    OldAge,
    Starvation,
    Temperature,
    Overcrowding,
    Eaten,
    Grazed,
    Decomposed,
}

// ---------------------------------------------------------------------------
// Bitsets
// ---------------------------------------------------------------------------

/// A set of species, one bit per `Species` variant. Used for diets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeciesSet(u16);

impl SpeciesSet {
    pub const EMPTY: SpeciesSet = SpeciesSet(0);

    pub const fn of(members: &[Species]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < members.len() {
            bits |= members[i].bit();
            i += 1;
        }
        SpeciesSet(bits)
    }

    pub const fn contains(self, species: Species) -> bool {
        self.0 & species.bit() != 0
    }

    pub fn insert(&mut self, species: Species) {
        self.0 |= species.bit();
    }

    pub fn remove(&mut self, species: Species) {
        self.0 &= !species.bit();
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Species> {
        Species::ALL.into_iter().filter(move |sp| self.contains(*sp))
    }
}

/// Behavior switches consulted by the generic algorithms in `behavior.rs`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);
    /// Member of the animal kingdom: moves, feeds, can be infected.
    pub const ANIMAL: Capabilities = Capabilities(1 << 0);
    /// Mates with an adjacent opposite-gender neighbor and gives birth.
    pub const CAN_BREED: Capabilities = Capabilities(1 << 1);
    /// Catches and spreads disease.
    pub const CAN_INFECT: Capabilities = Capabilities(1 << 2);
    /// An infected individual may recover on its own.
    pub const SELF_CURE: Capabilities = Capabilities(1 << 3);
    /// Does nothing at all during the night.
    pub const DAY_ACTIVE: Capabilities = Capabilities(1 << 4);
    /// Plant reproduction only happens in daylight.
    pub const DAY_REPRODUCE: Capabilities = Capabilities(1 << 5);
    /// Death may leave a corpse behind.
    pub const LEAVES_CORPSE: Capabilities = Capabilities(1 << 6);

    pub const fn union(self, other: Capabilities) -> Capabilities {
        Capabilities(self.0 | other.0)
    }

    pub const fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Capabilities) -> Capabilities {
        self.union(rhs)
    }
}
