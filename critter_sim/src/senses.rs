use std::f64::consts::{PI, TAU};

use critter_brain::ports::Sense;

use crate::config::FeedConfig;
use crate::population::Critter;
use crate::prng::Prng;

/// One step's worth of sense values. A sense left unset is not written, so
/// the matching input cell just decays.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SenseFrame {
    values: [Option<f64>; Sense::ALL.len()],
}

impl SenseFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sense: Sense, value: f64) -> Self {
        self.set(sense, value);
        self
    }

    pub fn set(&mut self, sense: Sense, value: f64) {
        self.values[slot(sense)] = Some(value);
    }

    pub fn get(&self, sense: Sense) -> Option<f64> {
        self.values[slot(sense)]
    }

    /// Set senses in port order.
    pub fn iter(&self) -> impl Iterator<Item = (Sense, f64)> + '_ {
        Sense::ALL
            .iter()
            .zip(self.values.iter())
            .filter_map(|(s, v)| v.map(|v| (*s, v)))
    }
}

fn slot(sense: Sense) -> usize {
    match sense {
        Sense::FoodAngle => 0,
        Sense::FoodDistance => 1,
        Sense::NeighborAngle => 2,
        Sense::NeighborDistance => 3,
        Sense::Energy => 4,
        Sense::Heading => 5,
    }
}

/// Source of sense values for each critter, once per step.
pub trait SenseFeed {
    fn sense(&mut self, step: u64, critter: &Critter) -> SenseFrame;
}

impl<F> SenseFeed for F
where
    F: FnMut(u64, &Critter) -> SenseFrame,
{
    fn sense(&mut self, step: u64, critter: &Critter) -> SenseFrame {
        self(step, critter)
    }
}

/// Wrap an angle into `[-PI, PI)`.
#[inline]
pub fn wrap_angle(a: f64) -> f64 {
    (a + PI).rem_euclid(TAU) - PI
}

/// Deterministic synthetic senses: food and neighbours come and go on fixed
/// schedules, offset per critter, with seeded jitter on top.
///
/// Angles follow the port convention: `heading - bearing`, so a positive
/// food angle asks for a negative turn.
#[derive(Debug, Clone)]
pub struct ScriptedFeed {
    cfg: FeedConfig,
    rng: Prng,
    lifespan: Option<u64>,
}

impl ScriptedFeed {
    pub fn new(cfg: FeedConfig, seed: u64) -> Self {
        Self {
            cfg,
            rng: Prng::new(seed),
            lifespan: None,
        }
    }

    /// Report energy as the fraction of lifespan left.
    pub fn with_lifespan(mut self, lifespan: Option<u64>) -> Self {
        self.lifespan = lifespan;
        self
    }

    fn energy(&self, critter: &Critter) -> f64 {
        match self.lifespan {
            Some(span) if span > 0 => 1.0 - (critter.age() as f64 / span as f64).min(1.0),
            _ => 1.0,
        }
    }
}

impl SenseFeed for ScriptedFeed {
    fn sense(&mut self, step: u64, critter: &Critter) -> SenseFrame {
        let cfg = &self.cfg;
        let serial = critter.serial();
        let mut frame = SenseFrame::new()
            .with(Sense::Heading, critter.heading())
            .with(Sense::Energy, self.energy(critter));

        let t = step.wrapping_add(serial.wrapping_mul(7));
        let window = t / cfg.food_period;
        let within = t % cfg.food_period;
        if within < cfg.food_visible {
            let bearing = wrap_angle(serial as f64 * 1.3 + window as f64 * 2.1);
            let closing = 1.0 - within as f64 / cfg.food_visible as f64;
            let angle = wrap_angle(critter.heading() - bearing) + self.rng.jitter(cfg.jitter);
            let distance = (cfg.food_distance * closing).max(0.1) + self.rng.jitter(cfg.jitter);
            frame.set(Sense::FoodAngle, angle);
            frame.set(Sense::FoodDistance, distance.max(0.0));
        }

        let t = step.wrapping_add(serial.wrapping_mul(13));
        if t % cfg.neighbor_period < cfg.neighbor_visible {
            frame.set(Sense::NeighborAngle, self.rng.gen_range_f64(-PI, PI));
            frame.set(Sense::NeighborDistance, self.rng.gen_range_f64(0.5, 3.0));
        }

        frame
    }
}
