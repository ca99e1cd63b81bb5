// Day/night and temperature model.
//
// Both readings are pure functions of the step index:
//
//   wave         = cos(2π · step / period)
//   illumination = 0.375 · wave + 0.625           (range [0.25, 1.0])
//   temperature  = 5 · wave + 15 + step · (daily_temp_increase / period)
//
// so illumination is periodic with the cycle length and temperature is
// periodic around a slowly rising baseline.
//
// The day/night flag is not derived from the wave. `DayNightClock` keeps a
// running threshold that starts a quarter of the way into the first cycle
// and moves on by half a cycle every time it is reached, flipping the phase.
// With a cosine wave that puts the flips at the points where illumination
// crosses its midpoint.
//
// See also: `sim.rs`, which advances the clock once per step.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Whether the reef is lit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPhase {
    #[default]
    Day,
    Night,
}

impl DayPhase {
    pub fn is_day(self) -> bool {
        self == DayPhase::Day
    }

    pub fn flipped(self) -> Self {
        match self {
            DayPhase::Day => DayPhase::Night,
            DayPhase::Night => DayPhase::Day,
        }
    }

    /// Human-readable label handed to renderers.
    pub fn label(self) -> &'static str {
        match self {
            DayPhase::Day => "Day",
            DayPhase::Night => "Night",
        }
    }
}

/// Cycle parameters. `period` must be positive; `SimConfig::sanitized`
/// guarantees it before an `Environment` is built.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub period: u32,
    pub daily_temp_increase: f64,
}

/// Environment values for one step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentReading {
    pub illumination: f64,
    pub temperature: f64,
}

impl Environment {
    pub fn new(period: u32, daily_temp_increase: f64) -> Self {
        Self {
            period,
            daily_temp_increase,
        }
    }

    pub fn wave(&self, step: u64) -> f64 {
        (TAU * step as f64 / f64::from(self.period)).cos()
    }

    pub fn illumination(&self, step: u64) -> f64 {
        0.375 * self.wave(step) + 0.625
    }

    pub fn temperature(&self, step: u64) -> f64 {
        5.0 * self.wave(step) + 15.0 + self.drift(step)
    }

    /// The linear warming term on its own.
    pub fn drift(&self, step: u64) -> f64 {
        step as f64 * (self.daily_temp_increase / f64::from(self.period))
    }

    pub fn reading(&self, step: u64) -> EnvironmentReading {
        EnvironmentReading {
            illumination: self.illumination(step),
            temperature: self.temperature(step),
        }
    }
}

/// Tracks the day/night flag across steps.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayNightClock {
    phase: DayPhase,
    next_flip: f64,
    half_cycle: f64,
}

impl DayNightClock {
    /// A clock in the day phase at step 0.
    pub fn new(period: u32) -> Self {
        let period = f64::from(period);
        Self {
            phase: DayPhase::Day,
            next_flip: period / 4.0,
            half_cycle: period / 2.0,
        }
    }

    pub fn phase(&self) -> DayPhase {
        self.phase
    }

    /// Account for `step`. Returns the new phase if a boundary was crossed.
    /// Steps are expected to arrive in increasing order; a step that jumps
    /// over several boundaries flips once per boundary.
    pub fn advance(&mut self, step: u64) -> Option<DayPhase> {
        let before = self.phase;
        while step as f64 >= self.next_flip {
            self.phase = self.phase.flipped();
            self.next_flip += self.half_cycle;
        }
        (self.phase != before).then_some(self.phase)
    }
}
