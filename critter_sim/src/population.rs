use std::sync::Arc;

use critter_brain::definition::{BrainDefinition, Builder};
use critter_brain::graph::BrainGraph;
use critter_brain::ports::{Actuator, ACCEL, TURN};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

use crate::config::SimConfig;
use crate::senses::{wrap_angle, SenseFeed};

new_key_type! {
    /// Stable handle to a critter in a [`Population`].
    pub struct CritterId;
}

/// What a critter asked for on its last step. An inactive actuator asks for
/// nothing, which reads as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Actuation {
    pub turn: f64,
    pub accel: f64,
}

impl Actuation {
    fn read(brain: &BrainGraph) -> Self {
        Self {
            turn: brain.read_output(TURN).unwrap_or(0.0),
            accel: brain.read_output(ACCEL).unwrap_or(0.0),
        }
    }

    pub fn get(&self, actuator: Actuator) -> f64 {
        match actuator {
            Actuator::Turn => self.turn,
            Actuator::Accel => self.accel,
        }
    }
}

/// One simulated critter: its own brain plus the little state the brain
/// steers. Speed may go negative when a brain asks to back off.
#[derive(Debug, Clone)]
pub struct Critter {
    serial: u64,
    brain: BrainGraph,
    definition: Arc<BrainDefinition>,
    actuation: Actuation,
    heading: f64,
    speed: f64,
    age: u64,
}

impl Critter {
    /// Spawn order, unique within a population.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn brain(&self) -> &BrainGraph {
        &self.brain
    }

    pub fn definition(&self) -> &Arc<BrainDefinition> {
        &self.definition
    }

    pub fn actuation(&self) -> Actuation {
        self.actuation
    }

    /// Radians, wrapped to `[-PI, PI)`.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Steps lived since (re)spawn.
    pub fn age(&self) -> u64 {
        self.age
    }

    fn respawn(&mut self) {
        self.brain.reset();
        self.actuation = Actuation::default();
        self.heading = 0.0;
        self.speed = 0.0;
        self.age = 0;
    }
}

/// Aggregate of one [`Population::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepSummary {
    pub step: u64,
    pub critters: usize,
    /// Critters whose turn actuator was active.
    pub turning: usize,
    pub mean_abs_turn: f64,
    pub mean_speed: f64,
    /// Brains that hit the settle round cap this step.
    pub unsettled: usize,
    pub transmissions: usize,
    pub respawned: usize,
}

/// Owns every critter and drives their brains in lockstep.
#[derive(Debug)]
pub struct Population {
    critters: SlotMap<CritterId, Critter>,
    builder: Builder,
    next_serial: u64,
    step: u64,
    lifespan: Option<u64>,
    drag: f64,
}

impl Default for Population {
    fn default() -> Self {
        Self::new(&SimConfig::default().with_lifespan(None))
    }
}

impl Population {
    pub fn new(cfg: &SimConfig) -> Self {
        Self {
            critters: SlotMap::with_key(),
            builder: Builder::new().with_config(cfg.settle),
            next_serial: 0,
            step: 0,
            lifespan: cfg.lifespan,
            drag: cfg.drag,
        }
    }

    /// Build a fresh brain from `definition` and add a critter around it.
    pub fn spawn(&mut self, definition: Arc<BrainDefinition>) -> CritterId {
        let brain = self.builder.build(&definition);
        let serial = self.next_serial;
        self.next_serial += 1;
        let id = self.critters.insert(Critter {
            serial,
            brain,
            definition,
            actuation: Actuation::default(),
            heading: 0.0,
            speed: 0.0,
            age: 0,
        });
        debug!(serial, ?id, "critter spawned");
        id
    }

    /// Remove a critter, returning it (and its brain) to the caller.
    pub fn remove(&mut self, id: CritterId) -> Option<Critter> {
        self.critters.remove(id)
    }

    pub fn get(&self, id: CritterId) -> Option<&Critter> {
        self.critters.get(id)
    }

    pub fn len(&self) -> usize {
        self.critters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.critters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CritterId, &Critter)> + '_ {
        self.critters.iter()
    }

    /// Steps completed so far.
    pub fn steps(&self) -> u64 {
        self.step
    }

    /// Advance every critter by one step.
    ///
    /// Per critter, strictly in this order: sense, write every input, tick
    /// once, read every actuator, apply. No critter observes another's brain.
    pub fn step<F: SenseFeed + ?Sized>(&mut self, feed: &mut F) -> StepSummary {
        let step = self.step;
        let mut summary = StepSummary {
            step,
            critters: self.critters.len(),
            ..StepSummary::default()
        };

        for critter in self.critters.values_mut() {
            let frame = feed.sense(step, critter);
            for (sense, value) in frame.iter() {
                critter.brain.write_input(sense.index(), value);
            }

            let report = critter.brain.tick();
            summary.transmissions += report.transmissions;
            if !report.settled {
                summary.unsettled += 1;
            }

            let act = Actuation::read(&critter.brain);
            critter.actuation = act;
            critter.heading = wrap_angle(critter.heading + act.turn);
            critter.speed = (critter.speed + act.accel) * self.drag;
            critter.age += 1;

            if act.turn != 0.0 {
                summary.turning += 1;
            }
            summary.mean_abs_turn += act.turn.abs();
            summary.mean_speed += critter.speed;

            if self.lifespan.is_some_and(|span| critter.age >= span) {
                trace!(serial = critter.serial, age = critter.age, "lifespan reached; respawning");
                critter.respawn();
                summary.respawned += 1;
            }
        }

        if summary.critters > 0 {
            summary.mean_abs_turn /= summary.critters as f64;
            summary.mean_speed /= summary.critters as f64;
        }
        self.step += 1;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::senses::SenseFrame;
    use critter_brain::ports::Sense;
    use critter_brain::stock;

    fn no_senses(_: u64, _: &Critter) -> SenseFrame {
        SenseFrame::new()
    }

    #[test]
    fn spawn_get_remove() {
        let mut pop = Population::default();
        let def = Arc::new(stock::forager());
        let a = pop.spawn(def.clone());
        let b = pop.spawn(def.clone());
        assert_eq!(pop.len(), 2);
        assert_eq!(pop.get(a).unwrap().serial(), 0);
        assert_eq!(pop.get(b).unwrap().serial(), 1);
        assert!(Arc::ptr_eq(pop.get(a).unwrap().definition(), &def));

        let gone = pop.remove(a).unwrap();
        assert_eq!(gone.serial(), 0);
        assert!(pop.get(a).is_none());
        assert!(pop.remove(a).is_none());
        assert_eq!(pop.len(), 1);
    }

    #[test]
    fn step_writes_ticks_and_reads_once() {
        let mut pop = Population::default();
        let id = pop.spawn(Arc::new(stock::forager()));

        let mut feed = |_: u64, _: &Critter| {
            SenseFrame::new()
                .with(Sense::FoodAngle, 1.0)
                .with(Sense::FoodDistance, 4.0)
        };
        let summary = pop.step(&mut feed);

        let critter = pop.get(id).unwrap();
        assert_eq!(critter.brain().tick_count(), 1);
        assert!(critter.brain().pending_inputs().is_empty());
        assert!((critter.actuation().turn + 0.4).abs() < 1e-12);
        assert!((critter.actuation().accel - 0.2).abs() < 1e-12);
        assert!((critter.heading() + 0.4).abs() < 1e-12);
        assert!((critter.speed() - 0.18).abs() < 1e-12);
        assert_eq!(summary.step, 0);
        assert_eq!(summary.turning, 1);
        assert!(summary.transmissions > 0);
        assert_eq!(pop.steps(), 1);
    }

    #[test]
    fn inactive_actuator_reads_as_zero() {
        let mut pop = Population::default();
        let id = pop.spawn(Arc::new(stock::drifter()));
        pop.step(&mut no_senses);
        let critter = pop.get(id).unwrap();
        assert_eq!(critter.actuation(), Actuation::default());
        assert_eq!(critter.heading(), 0.0);
    }

    #[test]
    fn brains_are_independent() {
        let mut pop = Population::default();
        let def = Arc::new(stock::drifter());
        let fed = pop.spawn(def.clone());
        let hungry = pop.spawn(def);

        let mut feed = move |_: u64, c: &Critter| {
            if c.serial() == 0 {
                SenseFrame::new().with(Sense::Energy, 1.0)
            } else {
                SenseFrame::new()
            }
        };
        pop.step(&mut feed);

        assert_eq!(pop.get(fed).unwrap().actuation().turn, 0.25);
        assert_eq!(pop.get(hungry).unwrap().actuation().turn, 0.0);
    }

    #[test]
    fn forager_closes_on_fixed_food() {
        let mut pop = Population::default();
        let id = pop.spawn(Arc::new(stock::forager()));
        let bearing = 1.0;
        let mut feed = move |_: u64, c: &Critter| {
            SenseFrame::new()
                .with(Sense::FoodAngle, wrap_angle(c.heading() - bearing))
                .with(Sense::FoodDistance, 3.0)
                .with(Sense::Heading, c.heading())
        };
        for _ in 0..30 {
            pop.step(&mut feed);
        }
        let critter = pop.get(id).unwrap();
        assert!((critter.heading() - bearing).abs() < 0.01);
        // Constant 0.2 accel under 0.9 drag approaches 0.2 * 0.9 / 0.1.
        assert!((critter.speed() - 1.8).abs() < 0.1);
    }

    #[test]
    fn lifespan_respawns_with_fresh_brain() {
        let cfg = SimConfig::default().with_lifespan(Some(3));
        let mut pop = Population::new(&cfg);
        let id = pop.spawn(Arc::new(stock::forager()));
        let mut feed = |_: u64, _: &Critter| SenseFrame::new().with(Sense::FoodDistance, 4.0);

        assert_eq!(pop.step(&mut feed).respawned, 0);
        assert_eq!(pop.step(&mut feed).respawned, 0);
        assert_eq!(pop.step(&mut feed).respawned, 1);

        let critter = pop.get(id).unwrap();
        assert_eq!(critter.age(), 0);
        assert_eq!(critter.speed(), 0.0);
        assert_eq!(critter.brain().tick_count(), 0);
        assert_eq!(critter.serial(), 0);
    }

    #[test]
    fn scripted_runs_are_reproducible() {
        use crate::senses::ScriptedFeed;

        let cfg = SimConfig::default().with_population(4).with_lifespan(Some(50));
        let run = || {
            let def = Arc::new(stock::forager());
            let mut pop = Population::new(&cfg);
            for _ in 0..cfg.population {
                pop.spawn(def.clone());
            }
            let mut feed = ScriptedFeed::new(cfg.feed.clone(), cfg.seed).with_lifespan(cfg.lifespan);
            (0..120).map(|_| pop.step(&mut feed)).collect::<Vec<_>>()
        };
        let a = run();
        assert_eq!(a, run());
        assert_eq!(a.iter().map(|s| s.respawned).sum::<usize>(), 8);
        assert!(a.iter().any(|s| s.turning > 0));
    }

    #[test]
    fn empty_population_steps_cleanly() {
        let mut pop = Population::default();
        let summary = pop.step(&mut no_senses);
        assert_eq!(summary.critters, 0);
        assert_eq!(summary.mean_speed, 0.0);
        assert!(pop.is_empty());
    }
}
