// Core simulation state and step loop.
//
// `SimState` is the single source of truth for a reef run. It owns the
// habitat (field, entity arena, species table and random stream), the
// environment model, the day/night clock, population statistics and the
// run's lifecycle phase:
//
//   Idle ──reset/step──▶ Running ──not viable / step budget──▶ Terminal
//
// `new()` builds an empty field and leaves the run Idle. `reset()` clears the
// field, populates it and publishes the initial status. Scenario code can
// skip `reset()` and `place()` entities by hand instead; the first `step()`
// starts the run either way.
//
// ## One step
//
//   1. advance the step counter;
//   2. recompute illumination and temperature for the new step;
//   3. flip the day/night flag if its threshold was reached;
//   4. let every entity that existed when the step began act, in creation
//      order, skipping any that died earlier in the pass. Offspring and
//      corpses are placed into the field immediately (they hold their cells)
//      but do not act until the next step;
//   5. report births and deaths, then purge the dead from the arena;
//   6. recount the population and publish a `StatusReport` to the renderer;
//   7. check viability and the step budget.
//
// Entities act strictly one at a time. A neighbor killed earlier in the pass
// is visible as dead to every later actor, which is reproducible because the
// traversal order and the random stream are both fixed.
//
// ## Seeding
//
// `populate` visits cells in row-major order and tests each against the
// species creation probabilities in `SpeciesTable::SEEDING_ORDER`, one draw
// per species, until one succeeds. The probabilities are not normalized.
//
// See also: `behavior.rs` for the per-entity turn, `habitat.rs` for the
// arena, `environment.rs` for the cycle model, `render.rs` for the publish
// contract.
//
// **Critical constraint: determinism.** The random stream is seeded once in
// `with_species_table` and never reseeded, not even by `reset`. Given equal
// configs and species tables, two runs produce identical histories.

use crate::SimError;
use crate::behavior::{self, TurnContext};
use crate::config::SimConfig;
use crate::environment::{DayNightClock, DayPhase, Environment, EnvironmentReading};
use crate::event::{SimEvent, SimEventKind, StepResult, TerminationReason};
use crate::field::Field;
use crate::habitat::Habitat;
use crate::prng::ReefRng;
use crate::render::{FieldSnapshot, Renderer, StatusReport};
use crate::species::SpeciesTable;
use crate::stats::PopulationStats;
use crate::types::{EntityId, Location, Species};
use serde::{Deserialize, Serialize};

/// Steps run by `run_long_simulation`.
pub const LONG_RUN_STEPS: u64 = 4000;

/// Lifecycle of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Idle,
    Running,
    Terminal(TerminationReason),
}

pub struct SimState {
    step: u64,
    config: SimConfig,
    habitat: Habitat,
    environment: Environment,
    clock: DayNightClock,
    reading: EnvironmentReading,
    phase: RunPhase,
    stats: PopulationStats,
}

impl SimState {
    /// Create an unpopulated simulation with the default species table.
    pub fn new(config: SimConfig) -> Self {
        Self::with_species_table(config, SpeciesTable::default())
    }

    /// Create an unpopulated simulation. Invalid config values are replaced
    /// by their defaults (with a warning).
    pub fn with_species_table(config: SimConfig, species: SpeciesTable) -> Self {
        let config = config.sanitized();
        let (depth, width) = config.dimensions();
        let field = Field::new(depth, width, config.neighborhood);
        let habitat = Habitat::new(field, species, ReefRng::new(config.seed));
        let environment = Environment::new(config.period(), config.daily_temp_increase);
        Self {
            step: 0,
            clock: DayNightClock::new(environment.period),
            reading: environment.reading(0),
            environment,
            config,
            habitat,
            phase: RunPhase::Idle,
            stats: PopulationStats::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn habitat(&self) -> &Habitat {
        &self.habitat
    }

    pub fn species_table(&self) -> &SpeciesTable {
        self.habitat.species_table()
    }

    pub fn stats(&self) -> &PopulationStats {
        &self.stats
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn reading(&self) -> EnvironmentReading {
        self.reading
    }

    pub fn day_phase(&self) -> DayPhase {
        self.clock.phase()
    }

    pub fn run_phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, RunPhase::Terminal(_))
    }

    /// Viability of the current population under the configured threshold.
    pub fn is_viable(&self) -> bool {
        self.stats.is_viable(self.config.min_viable_species)
    }

    pub fn snapshot(&self) -> FieldSnapshot<'_> {
        FieldSnapshot::new(&self.habitat)
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    /// Return to step 0 with a freshly populated field and publish the
    /// initial status. The random stream carries on from where it was.
    pub fn reset(&mut self, renderer: &mut dyn Renderer) {
        self.step = 0;
        self.habitat.clear();
        self.clock = DayNightClock::new(self.environment.period);
        self.reading = self.environment.reading(0);
        self.populate();
        self.phase = RunPhase::Running;
        self.publish(renderer);
    }

    /// Seed the field: each cell gets at most one occupant, chosen by
    /// sequential first-match draws in seeding order.
    fn populate(&mut self) {
        let (depth, width) = (self.habitat.field.depth(), self.habitat.field.width());
        let allowed = self.config.seeded_species;
        for row in 0..depth as i32 {
            for col in 0..width as i32 {
                let loc = Location::new(row, col);
                for species in SpeciesTable::SEEDING_ORDER {
                    if !allowed.contains(species) {
                        continue;
                    }
                    let p = self.habitat.data(species).creation_probability;
                    if self.habitat.rng.random_bool(p) {
                        self.habitat.spawn(species, loc);
                        break;
                    }
                }
            }
        }
        self.stats.recount(&self.habitat);
        tracing::debug!(population = %self.stats.details(), "field populated");
    }

    /// Put a single entity into a free cell.
    pub fn place(&mut self, species: Species, location: Location) -> Result<EntityId, SimError> {
        let field = &self.habitat.field;
        if !field.in_bounds(location) {
            return Err(SimError::OutOfBounds { location });
        }
        if !field.is_free(location) {
            return Err(SimError::CellOccupied { location });
        }
        let id = self.habitat.spawn(species, location);
        self.stats.recount(&self.habitat);
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Running
    // -----------------------------------------------------------------------

    /// Advance one step. Does nothing once the run is Terminal.
    pub fn step(&mut self, renderer: &mut dyn Renderer) -> StepResult {
        if self.is_terminal() {
            return StepResult::default();
        }
        self.phase = RunPhase::Running;
        self.step += 1;
        let step = self.step;
        let mut events = Vec::new();

        self.reading = self.environment.reading(step);
        if let Some(phase) = self.clock.advance(step) {
            tracing::debug!(step, phase = phase.label(), "day/night flip");
            events.push(SimEvent {
                step,
                kind: SimEventKind::PhaseChanged { phase },
            });
        }

        let ctx = TurnContext {
            is_day: self.clock.phase().is_day(),
            temperature: self.reading.temperature,
        };
        let mut newborns = Vec::new();
        for id in self.habitat.ids() {
            behavior::act(&mut self.habitat, id, ctx, &mut newborns);
        }

        self.record_births(step, &newborns, &mut events);
        self.record_deaths(step, &mut events);
        self.habitat.purge_dead();

        self.stats.recount(&self.habitat);
        self.publish(renderer);

        if let Some(reason) = self.termination_reason() {
            self.phase = RunPhase::Terminal(reason);
            tracing::info!(
                step,
                ?reason,
                population = %self.stats.details(),
                "simulation finished"
            );
            events.push(SimEvent {
                step,
                kind: SimEventKind::Terminated { reason },
            });
        }

        StepResult { events }
    }

    /// Run up to `steps` steps, stopping early if the run terminates.
    /// Returns the number of steps actually taken.
    pub fn simulate(&mut self, steps: u64, renderer: &mut dyn Renderer) -> u64 {
        let mut taken = 0;
        while taken < steps && !self.is_terminal() {
            self.step(renderer);
            taken += 1;
        }
        taken
    }

    pub fn run_long_simulation(&mut self, renderer: &mut dyn Renderer) -> u64 {
        self.simulate(LONG_RUN_STEPS, renderer)
    }

    fn termination_reason(&self) -> Option<TerminationReason> {
        if !self.is_viable() {
            Some(TerminationReason::NotViable)
        } else if self.config.max_steps.is_some_and(|max| self.step >= max) {
            Some(TerminationReason::StepBudgetExhausted)
        } else {
            None
        }
    }

    fn record_births(&self, step: u64, newborns: &[EntityId], events: &mut Vec<SimEvent>) {
        for &id in newborns {
            let Some(entity) = self.habitat.entity(id) else {
                continue;
            };
            let kind = match entity.species {
                Species::Corpse => SimEventKind::CorpseLeft {
                    id,
                    at: entity.born_at,
                },
                species => SimEventKind::Born {
                    id,
                    species,
                    at: entity.born_at,
                },
            };
            events.push(SimEvent { step, kind });
        }
    }

    /// Everything dead in the arena died this step; earlier deaths were
    /// purged at the end of their own step.
    fn record_deaths(&self, step: u64, events: &mut Vec<SimEvent>) {
        for entity in self.habitat.entities().filter(|e| !e.is_alive()) {
            if let Some(cause) = entity.death_cause {
                events.push(SimEvent {
                    step,
                    kind: SimEventKind::Died {
                        id: entity.id,
                        species: entity.species,
                        cause,
                    },
                });
            }
        }
    }

    fn publish(&self, renderer: &mut dyn Renderer) {
        let report = StatusReport {
            step: self.step,
            field: FieldSnapshot::new(&self.habitat),
            stats: &self.stats,
            illumination: self.reading.illumination,
            phase: self.clock.phase(),
            temperature: self.reading.temperature,
        };
        renderer.show_status(&report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Neighborhood;
    use crate::render::NullRenderer;
    use crate::types::DeathCause;
    use std::collections::BTreeMap;

    fn small_config(seed: u64) -> SimConfig {
        SimConfig {
            seed,
            ..SimConfig::with_size(30, 40)
        }
    }

    fn calm_table() -> SpeciesTable {
        let mut table = SpeciesTable::default();
        for sp in Species::ALL {
            table.get_mut(sp).infection_probability = 0.0;
        }
        table
    }

    fn counts(sim: &SimState) -> BTreeMap<Species, usize> {
        sim.stats().counts().collect()
    }

    /// Records every status it is shown.
    #[derive(Default)]
    struct Recorder {
        steps: Vec<u64>,
        totals: Vec<usize>,
        labels: Vec<&'static str>,
    }

    impl Renderer for Recorder {
        fn show_status(&mut self, status: &StatusReport<'_>) {
            self.steps.push(status.step);
            self.totals.push(status.stats.total());
            self.labels.push(status.day_label());
        }
    }

    #[test]
    fn new_sim_is_idle_and_empty() {
        let sim = SimState::new(small_config(1));
        assert_eq!(sim.run_phase(), RunPhase::Idle);
        assert_eq!(sim.step_count(), 0);
        assert!(sim.habitat().is_empty());
        assert_eq!(sim.day_phase(), DayPhase::Day);
    }

    #[test]
    fn invalid_dimensions_use_defaults() {
        let sim = SimState::new(SimConfig::with_size(0, -5));
        let field = sim.habitat().field();
        assert_eq!((field.depth(), field.width()), (80, 120));
    }

    #[test]
    fn reset_populates_and_publishes() {
        let mut sim = SimState::new(small_config(5));
        let mut recorder = Recorder::default();
        sim.reset(&mut recorder);
        assert_eq!(sim.run_phase(), RunPhase::Running);
        assert!(sim.stats().total() > 0);
        assert_eq!(recorder.steps, vec![0]);
        assert_eq!(recorder.totals, vec![sim.stats().total()]);
        assert_eq!(sim.stats().count(Species::Corpse), 0);

        sim.simulate(3, &mut recorder);
        assert_eq!(recorder.steps, vec![0, 1, 2, 3]);
    }

    #[test]
    fn seeding_respects_the_allowed_set() {
        let config = SimConfig {
            seeded_species: crate::types::SpeciesSet::of(&[Species::Crab, Species::Algae]),
            ..small_config(11)
        };
        let mut sim = SimState::new(config);
        sim.reset(&mut NullRenderer);
        for (sp, n) in sim.stats().counts() {
            assert!(matches!(sp, Species::Crab | Species::Algae), "{sp}: {n}");
        }
        assert!(sim.stats().count(Species::Crab) > 0);
    }

    #[test]
    fn same_seed_same_history() {
        let run = |seed| {
            let mut sim = SimState::new(small_config(seed));
            sim.reset(&mut NullRenderer);
            let mut history = vec![counts(&sim)];
            for _ in 0..150 {
                sim.step(&mut NullRenderer);
                history.push(counts(&sim));
            }
            history
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn reset_does_not_reseed() {
        let mut sim = SimState::new(SimConfig {
            seed: 3,
            ..SimConfig::with_size(40, 40)
        });
        sim.reset(&mut NullRenderer);
        let first: Vec<_> = sim.snapshot().occupied().collect();
        sim.reset(&mut NullRenderer);
        let second: Vec<_> = sim.snapshot().occupied().collect();
        assert_eq!(sim.step_count(), 0);
        assert_ne!(first, second);
    }

    #[test]
    fn field_stays_consistent_while_running() {
        let mut sim = SimState::new(SimConfig {
            min_viable_species: 0,
            day_night_cycle: 40,
            ..SimConfig::with_size(25, 25)
        });
        sim.reset(&mut NullRenderer);
        for _ in 0..200 {
            sim.step(&mut NullRenderer);
            sim.habitat().check_consistency().unwrap();
            // After the purge every entity in the arena is alive and on the
            // field exactly once.
            assert_eq!(sim.habitat().len(), sim.stats().total());
            assert!(sim.habitat().entities().all(|e| e.is_alive()));
        }
    }

    #[test]
    fn von_neumann_field_stays_consistent_while_running() {
        let mut sim = SimState::new(SimConfig {
            min_viable_species: 0,
            day_night_cycle: 40,
            neighborhood: Neighborhood::VonNeumann,
            ..SimConfig::with_size(25, 25)
        });
        assert_eq!(sim.habitat().field().neighborhood(), Neighborhood::VonNeumann);
        sim.reset(&mut NullRenderer);
        for _ in 0..200 {
            let result = sim.step(&mut NullRenderer);
            sim.habitat().check_consistency().unwrap();
            assert_eq!(sim.habitat().len(), sim.stats().total());
            assert!(sim.habitat().entities().all(|e| e.is_alive()));
            for event in &result.events {
                if let SimEventKind::Born { at, .. } = event.kind {
                    assert!(sim.habitat().field().in_bounds(at));
                }
            }
        }
    }

    #[test]
    fn long_run_takes_the_full_step_count() {
        let mut sim = SimState::new(SimConfig {
            min_viable_species: 0,
            ..SimConfig::with_size(6, 6)
        });
        sim.reset(&mut NullRenderer);
        assert_eq!(sim.run_long_simulation(&mut NullRenderer), LONG_RUN_STEPS);
        assert_eq!(sim.step_count(), 4000);
        assert_eq!(sim.run_phase(), RunPhase::Running);
    }

    #[test]
    fn long_run_stops_when_not_viable() {
        let mut sim = SimState::with_species_table(SimConfig::with_size(3, 3), calm_table());
        sim.place(Species::Shark, Location::new(1, 1)).unwrap();
        sim.place(Species::SmallFish, Location::new(0, 0)).unwrap();
        let taken = sim.run_long_simulation(&mut NullRenderer);
        assert!(taken < LONG_RUN_STEPS);
        assert_eq!(taken, sim.step_count());
        assert_eq!(sim.run_phase(), RunPhase::Terminal(TerminationReason::NotViable));
    }

    #[test]
    fn place_rejects_bad_cells() {
        let mut sim = SimState::new(SimConfig::with_size(3, 3));
        let loc = Location::new(1, 1);
        sim.place(Species::Crab, loc).unwrap();
        assert_eq!(sim.stats().count(Species::Crab), 1);
        assert!(matches!(
            sim.place(Species::Shark, loc),
            Err(SimError::CellOccupied { location }) if location == loc
        ));
        assert!(matches!(
            sim.place(Species::Shark, Location::new(3, 0)),
            Err(SimError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn extinction_halts_the_run() {
        let mut sim = SimState::with_species_table(SimConfig::with_size(3, 3), calm_table());
        let shark = sim.place(Species::Shark, Location::new(1, 1)).unwrap();
        let fish = sim.place(Species::SmallFish, Location::new(0, 0)).unwrap();
        assert!(sim.is_viable());

        let result = sim.step(&mut NullRenderer);
        assert_eq!(sim.run_phase(), RunPhase::Terminal(TerminationReason::NotViable));
        assert_eq!(result.termination(), Some(TerminationReason::NotViable));
        assert!(result.events.iter().any(|e| e.kind
            == SimEventKind::Died {
                id: fish,
                species: Species::SmallFish,
                cause: DeathCause::Eaten,
            }));
        assert!(sim.habitat().is_alive(shark));
        assert!(!sim.is_viable());

        // The loop stops: no further steps are taken.
        assert_eq!(sim.simulate(10, &mut NullRenderer), 0);
        assert_eq!(sim.step(&mut NullRenderer), StepResult::default());
        assert_eq!(sim.step_count(), 1);
    }

    #[test]
    fn single_species_is_not_viable() {
        let mut sim = SimState::new(SimConfig {
            seeded_species: crate::types::SpeciesSet::of(&[Species::Seagrass]),
            ..small_config(2)
        });
        sim.reset(&mut NullRenderer);
        assert!(!sim.is_viable());
        sim.step(&mut NullRenderer);
        assert!(sim.is_terminal());
    }

    #[test]
    fn step_budget_ends_the_run() {
        let mut sim = SimState::new(SimConfig {
            max_steps: Some(5),
            min_viable_species: 0,
            ..small_config(4)
        });
        sim.reset(&mut NullRenderer);
        assert_eq!(sim.simulate(100, &mut NullRenderer), 5);
        assert_eq!(
            sim.run_phase(),
            RunPhase::Terminal(TerminationReason::StepBudgetExhausted)
        );
    }

    #[test]
    fn phase_flip_is_reported() {
        let mut sim = SimState::new(SimConfig {
            day_night_cycle: 8,
            min_viable_species: 0,
            ..SimConfig::with_size(5, 5)
        });
        let mut recorder = Recorder::default();
        sim.reset(&mut recorder);
        let first = sim.step(&mut recorder);
        assert!(first.events.iter().all(|e| !matches!(e.kind, SimEventKind::PhaseChanged { .. })));
        let second = sim.step(&mut recorder);
        assert!(second.events.iter().any(|e| e.kind
            == SimEventKind::PhaseChanged {
                phase: DayPhase::Night
            }));
        assert_eq!(sim.day_phase(), DayPhase::Night);
        assert_eq!(recorder.labels, vec!["Day", "Day", "Night"]);
    }

    #[test]
    fn births_are_reported_where_they_happened() {
        let mut table = calm_table();
        let algae = table.get_mut(Species::Algae);
        algae.reproduction_age = 0;
        algae.reproduction_probability = 1.0;
        let mut sim = SimState::with_species_table(
            SimConfig {
                min_viable_species: 0,
                ..SimConfig::with_size(5, 5)
            },
            table,
        );
        let parent = Location::new(2, 2);
        sim.place(Species::Algae, parent).unwrap();
        let result = sim.step(&mut NullRenderer);
        let born: Vec<_> = result
            .events
            .iter()
            .filter_map(|e| match e.kind {
                SimEventKind::Born { species, at, .. } => Some((species, at)),
                _ => None,
            })
            .collect();
        assert_eq!(born.len(), 1);
        assert_eq!(born[0].0, Species::Algae);
        assert!(born[0].1.chebyshev_distance(parent) <= 3);
        assert_eq!(sim.stats().count(Species::Algae), 2);
    }

    #[test]
    fn reading_tracks_the_step() {
        let mut sim = SimState::new(SimConfig {
            min_viable_species: 0,
            ..SimConfig::with_size(4, 4)
        });
        sim.simulate(10, &mut NullRenderer);
        let expected = sim.environment().reading(10);
        assert_eq!(sim.reading(), expected);
    }
}
