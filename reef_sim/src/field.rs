// Dense 2D occupancy grid: the reef's spatial truth.
//
// The field is stored as a flat `Vec<Option<EntityId>>` indexed by
// `row * width + col`, giving O(1) read/write access. Out-of-bounds reads
// return `None`; out-of-bounds writes are no-ops. Locations outside
// [0, depth) x [0, width) are never generated by the adjacency queries;
// there is no wraparound.
//
// The field only stores handles. Keeping each entity's recorded location in
// agreement with the cell that references it is the job of `habitat.rs`,
// which is the only caller that issues `place` during a run.
//
// Adjacency results come back in a freshly shuffled order on every call so
// that no direction is favored. The shuffle draws from the simulation's
// `ReefRng`, which keeps the order reproducible.

use crate::prng::ReefRng;
use crate::types::{EntityId, Location};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Neighbor list. Never longer than eight for direct adjacency.
pub type Neighbors = SmallVec<[Location; 8]>;

/// Which cells count as adjacent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Neighborhood {
    /// Eight-connected: edges and corners.
    #[default]
    Moore,
    /// Four-connected: edges only.
    VonNeumann,
}

impl Neighborhood {
    fn offsets(self) -> &'static [(i32, i32)] {
        const MOORE: [(i32, i32); 8] = [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ];
        const VON_NEUMANN: [(i32, i32); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
        match self {
            Neighborhood::Moore => &MOORE,
            Neighborhood::VonNeumann => &VON_NEUMANN,
        }
    }

    /// Whether `(dr, dc)` lies within `range` steps under this metric.
    fn reaches(self, dr: i32, dc: i32, range: u32) -> bool {
        let (dr, dc) = (dr.unsigned_abs(), dc.unsigned_abs());
        match self {
            Neighborhood::Moore => dr.max(dc) <= range,
            Neighborhood::VonNeumann => dr + dc <= range,
        }
    }
}

/// Fixed-size occupancy grid.
#[derive(Clone, Debug)]
pub struct Field {
    /// Flat storage: index = row * width + col.
    cells: Vec<Option<EntityId>>,
    depth: usize,
    width: usize,
    neighborhood: Neighborhood,
}

impl Field {
    /// Create an empty field. Both dimensions must already be positive and
    /// small enough to allocate; `SimConfig::sanitized` guarantees both.
    pub fn new(depth: usize, width: usize, neighborhood: Neighborhood) -> Self {
        Self {
            cells: vec![None; depth * width],
            depth,
            width,
            neighborhood,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    pub fn in_bounds(&self, loc: Location) -> bool {
        loc.row >= 0
            && loc.col >= 0
            && (loc.row as usize) < self.depth
            && (loc.col as usize) < self.width
    }

    fn index(&self, loc: Location) -> Option<usize> {
        if self.in_bounds(loc) {
            Some(loc.row as usize * self.width + loc.col as usize)
        } else {
            None
        }
    }

    /// Register `id` at `loc`, overwriting whatever the cell held.
    /// No-op for out-of-bounds locations.
    pub fn place(&mut self, id: EntityId, loc: Location) {
        if let Some(i) = self.index(loc) {
            self.cells[i] = Some(id);
        }
    }

    /// Drop the occupant reference at `loc`. Clearing an empty or
    /// out-of-bounds cell does nothing.
    pub fn clear(&mut self, loc: Location) {
        if let Some(i) = self.index(loc) {
            self.cells[i] = None;
        }
    }

    pub fn clear_all(&mut self) {
        self.cells.fill(None);
    }

    pub fn get(&self, loc: Location) -> Option<EntityId> {
        self.index(loc).and_then(|i| self.cells[i])
    }

    pub fn is_free(&self, loc: Location) -> bool {
        self.in_bounds(loc) && self.get(loc).is_none()
    }

    /// Every in-bounds neighbor of `loc`, shuffled.
    pub fn adjacent_locations(&self, loc: Location, rng: &mut ReefRng) -> Neighbors {
        let mut out: Neighbors = self
            .neighborhood
            .offsets()
            .iter()
            .map(|&(dr, dc)| Location::new(loc.row + dr, loc.col + dc))
            .filter(|n| self.in_bounds(*n))
            .collect();
        rng.shuffle(&mut out);
        out
    }

    /// All unoccupied neighbors of `loc`, shuffled.
    pub fn free_adjacent_locations(&self, loc: Location, rng: &mut ReefRng) -> Neighbors {
        let mut free = self.adjacent_locations(loc, rng);
        free.retain(|n| self.get(*n).is_none());
        free
    }

    /// The first unoccupied neighbor in a shuffled scan, if any.
    pub fn free_adjacent_location(&self, loc: Location, rng: &mut ReefRng) -> Option<Location> {
        self.adjacent_locations(loc, rng)
            .into_iter()
            .find(|n| self.get(*n).is_none())
    }

    /// Every in-bounds cell within `range` steps of `loc` (excluding `loc`
    /// itself), shuffled. `range == 1` is exactly `adjacent_locations`.
    pub fn locations_within(&self, loc: Location, range: u32, rng: &mut ReefRng) -> Vec<Location> {
        let r = range as i32;
        let mut out = Vec::new();
        for dr in -r..=r {
            for dc in -r..=r {
                if (dr, dc) == (0, 0) || !self.neighborhood.reaches(dr, dc, range) {
                    continue;
                }
                let n = Location::new(loc.row + dr, loc.col + dc);
                if self.in_bounds(n) {
                    out.push(n);
                }
            }
        }
        rng.shuffle(&mut out);
        out
    }

    /// The first unoccupied cell within `range` steps of `loc`, if any.
    pub fn free_location_within(
        &self,
        loc: Location,
        range: u32,
        rng: &mut ReefRng,
    ) -> Option<Location> {
        self.locations_within(loc, range, rng)
            .into_iter()
            .find(|n| self.get(*n).is_none())
    }

    /// Occupied cells in row-major order.
    pub fn occupants(&self) -> impl Iterator<Item = (Location, EntityId)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|id| (Location::new((i / width) as i32, (i % width) as i32), id))
        })
    }
}
