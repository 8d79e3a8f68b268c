//! Critter simulation driver.
//!
//! Headless: spawns a population of critters, each with its own brain built
//! from one shared definition, and runs them against a scripted sense feed.
//! There is no world, physics or rendering here; each step only exercises
//! the write-inputs, tick, read-outputs cycle and logs what the brains did.
//!
//! Usage: `critter-sim [config.json]`

use std::process::ExitCode;
use std::sync::Arc;

use critter_brain::observer::GraphAdapter;
use critter_brain::ports::Actuator;
use tracing::{error, info};

mod config;
mod error;
mod population;
mod prng;
mod senses;

use config::SimConfig;
use error::SimError;
use population::Population;
use senses::ScriptedFeed;

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), SimError> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading config from {path}");
            SimConfig::from_json_file(&path)?
        }
        None => SimConfig::default(),
    };
    cfg.validate().map_err(SimError::InvalidConfig)?;

    let definition = Arc::new(cfg.load_definition()?);
    let dangling = definition.dangling_links().count();
    if dangling > 0 {
        info!("Definition has {dangling} link(s) that will not be wired");
    }

    let mut population = Population::new(&cfg);
    for _ in 0..cfg.population {
        population.spawn(definition.clone());
    }
    let mut feed = ScriptedFeed::new(cfg.feed.clone(), cfg.seed).with_lifespan(cfg.lifespan);

    info!(
        critters = population.len(),
        steps = cfg.steps,
        cells = definition.cells.len(),
        links = definition.links.len(),
        "Simulation starting"
    );

    let mut unsettled = 0usize;
    let mut respawned = 0usize;
    for _ in 0..cfg.steps {
        let s = population.step(&mut feed);
        unsettled += s.unsettled;
        respawned += s.respawned;
        if s.step % cfg.log_every == 0 {
            info!(
                step = s.step,
                turning = s.turning,
                mean_abs_turn = s.mean_abs_turn,
                mean_speed = s.mean_speed,
                sent = s.transmissions,
                unsettled = s.unsettled,
                "step"
            );
        }
    }

    if let Some((_, first)) = population.iter().next() {
        let snap = GraphAdapter::new(first.brain()).snapshot();
        let act = first.actuation();
        info!(
            serial = first.serial(),
            ticks = snap.tick_count,
            active_cells = snap.active_count(),
            turn = act.get(Actuator::Turn),
            accel = act.get(Actuator::Accel),
            "First critter at end of run"
        );
    }
    info!(
        steps = population.steps(),
        unsettled, respawned, "Simulation finished"
    );
    Ok(())
}
