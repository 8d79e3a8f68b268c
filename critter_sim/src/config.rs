use std::path::{Path, PathBuf};

use critter_brain::definition::BrainDefinition;
use critter_brain::graph::SettleConfig;
use critter_brain::stock;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Run configuration, loaded from JSON. Every field has a default, so `{}` is
/// a valid config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub population: usize,
    pub steps: u64,
    pub seed: u64,
    /// Emit a summary every this many steps.
    pub log_every: u64,
    /// Steps before a critter is respawned with a fresh brain; `None` lives forever.
    pub lifespan: Option<u64>,
    /// Fraction of speed kept each step after the accel request is applied.
    pub drag: f64,
    /// JSON brain definition. Falls back to the `stock` brain when unset.
    pub definition: Option<PathBuf>,
    pub stock: String,
    pub settle: SettleConfig,
    pub feed: FeedConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            population: 16,
            steps: 500,
            seed: 7,
            log_every: 50,
            lifespan: Some(400),
            drag: 0.9,
            definition: None,
            stock: "forager".to_string(),
            settle: SettleConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn with_population(mut self, population: usize) -> Self {
        self.population = population;
        self
    }

    pub fn with_steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_lifespan(mut self, lifespan: Option<u64>) -> Self {
        self.lifespan = lifespan;
        self
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate().map_err(SimError::InvalidConfig)?;
        Ok(cfg)
    }

    /// Validate the configuration, returning an error message if invalid.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.log_every == 0 {
            return Err("log_every must be >= 1");
        }
        if self.lifespan == Some(0) {
            return Err("lifespan must be >= 1");
        }
        if !(0.0..1.0).contains(&self.drag) {
            return Err("drag must be within [0, 1)");
        }
        self.settle.validate()?;
        self.feed.validate()?;
        Ok(())
    }

    /// The brain every critter is built from.
    pub fn load_definition(&self) -> Result<BrainDefinition, SimError> {
        if let Some(path) = &self.definition {
            return Ok(BrainDefinition::from_json_file(path)?);
        }
        match self.stock.as_str() {
            "forager" => Ok(stock::forager()),
            "drifter" => Ok(stock::drifter()),
            other => Err(SimError::UnknownStock(other.to_string())),
        }
    }
}

/// Shape of the scripted sense stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Food reappears at a new bearing every `food_period` steps...
    pub food_period: u64,
    /// ...and stays visible for this many of them.
    pub food_visible: u64,
    /// Distance at which food first appears; it closes in while visible.
    pub food_distance: f64,
    pub neighbor_period: u64,
    pub neighbor_visible: u64,
    /// Amplitude of the uniform noise added to angles and distances.
    pub jitter: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            food_period: 40,
            food_visible: 25,
            food_distance: 5.0,
            neighbor_period: 60,
            neighbor_visible: 10,
            jitter: 0.02,
        }
    }
}

impl FeedConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.food_period == 0 || self.neighbor_period == 0 {
            return Err("feed periods must be >= 1");
        }
        if self.food_visible > self.food_period || self.neighbor_visible > self.neighbor_period {
            return Err("feed visible window cannot exceed its period");
        }
        if !self.food_distance.is_finite() || self.food_distance <= 0.0 {
            return Err("food_distance must be finite and > 0");
        }
        if !self.jitter.is_finite() || self.jitter < 0.0 {
            return Err("jitter must be finite and >= 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_the_default() {
        let cfg = SimConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, SimConfig::default());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = SimConfig::from_json_str(
            r#"{ "population": 3, "settle": { "max_settle_rounds": 8 }, "feed": { "jitter": 0 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.population, 3);
        assert_eq!(cfg.settle.max_settle_rounds, 8);
        assert_eq!(cfg.settle.epsilon, SettleConfig::default().epsilon);
        assert_eq!(cfg.feed.jitter, 0.0);
        assert_eq!(cfg.feed.food_period, FeedConfig::default().food_period);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(SimConfig::default().validate().is_ok());
        let small = SimConfig::default()
            .with_population(2)
            .with_steps(10)
            .with_seed(1);
        assert!(small.validate().is_ok());
        assert!(SimConfig::default().with_lifespan(Some(0)).validate().is_err());

        let mut cfg = SimConfig::default();
        cfg.drag = 1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = SimConfig::default();
        cfg.settle.max_settle_rounds = 0;
        assert!(cfg.validate().is_err());

        let err = SimConfig::from_json_str(r#"{ "feed": { "food_visible": 99 } }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn stock_brains_resolve_by_name() {
        let mut cfg = SimConfig::default();
        assert_eq!(cfg.load_definition().unwrap(), stock::forager());
        cfg.stock = "drifter".into();
        assert_eq!(cfg.load_definition().unwrap(), stock::drifter());
        cfg.stock = "jellyfish".into();
        assert!(matches!(
            cfg.load_definition(),
            Err(SimError::UnknownStock(_))
        ));
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let err = SimConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SimError::Io { .. }));
    }
}
