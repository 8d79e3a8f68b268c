#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, string::String, vec::Vec};
#[cfg(feature = "std")]
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::debug;

use crate::cell::{CellIndex, CellParams};
use crate::graph::{BrainGraph, SettleConfig, MAX_CELL_INDEX};
use crate::link::LinkParams;

/// Problems found by [`BrainDefinition::validate`] or while loading one.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("cell {index}: threshold {threshold} must be a number >= 0")]
    BadThreshold { index: CellIndex, threshold: f64 },

    #[error("cell {index}: decay {decay} must be within [0, 1]")]
    BadDecay { index: CellIndex, decay: f64 },

    #[error("cell index {index} is above the limit of {max}")]
    IndexOutOfRange { index: CellIndex, max: CellIndex },

    #[error("link {from} -> {to} references missing cell {missing}")]
    DanglingLink {
        from: CellIndex,
        to: CellIndex,
        missing: CellIndex,
    },

    #[cfg(feature = "serde")]
    #[error("invalid definition json: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "std")]
    #[error("could not read definition: {0}")]
    Io(#[from] std::io::Error),
}

/// Declarative description of a brain: cell parameters keyed by index plus
/// an ordered list of links.
///
/// Definitions are plain data. Any number of critters may be built from one
/// definition; each gets its own [`BrainGraph`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BrainDefinition {
    #[cfg_attr(feature = "serde", serde(default))]
    pub cells: BTreeMap<CellIndex, CellParams>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub links: Vec<LinkParams>,
}

impl BrainDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) the cell at `index`.
    pub fn cell(mut self, index: CellIndex, params: CellParams) -> Self {
        self.cells.insert(index, params);
        self
    }

    /// Append a link. A later link for the same ordered pair overrides an
    /// earlier one when built.
    pub fn link(mut self, link: LinkParams) -> Self {
        self.links.push(link);
        self
    }

    /// Links whose source, target or gate is not a defined cell.
    pub fn dangling_links(&self) -> impl Iterator<Item = &LinkParams> + '_ {
        self.links
            .iter()
            .filter(move |l| self.missing_endpoint(l).is_some())
    }

    fn missing_endpoint(&self, link: &LinkParams) -> Option<CellIndex> {
        let endpoints = [Some(link.source), Some(link.target), link.gate];
        endpoints
            .into_iter()
            .flatten()
            .find(|i| !self.is_buildable(*i))
    }

    fn is_buildable(&self, index: CellIndex) -> bool {
        index <= MAX_CELL_INDEX && self.cells.contains_key(&index)
    }

    /// Strict authoring check.
    ///
    /// [`Builder::build`] never fails; it clamps parameters and drops what it
    /// cannot wire. Call this where a malformed definition should be reported
    /// instead (for example when loading from a file).
    pub fn validate(&self) -> Result<(), DefinitionError> {
        for (&index, p) in &self.cells {
            if index > MAX_CELL_INDEX {
                return Err(DefinitionError::IndexOutOfRange {
                    index,
                    max: MAX_CELL_INDEX,
                });
            }
            if p.threshold.is_nan() || p.threshold < 0.0 {
                return Err(DefinitionError::BadThreshold {
                    index,
                    threshold: p.threshold,
                });
            }
            if !(0.0..=1.0).contains(&p.decay) {
                return Err(DefinitionError::BadDecay {
                    index,
                    decay: p.decay,
                });
            }
        }
        for link in &self.links {
            if let Some(missing) = self.missing_endpoint(link) {
                return Err(DefinitionError::DanglingLink {
                    from: link.source,
                    to: link.target,
                    missing,
                });
            }
        }
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(feature = "serde")]
    pub fn to_json_string(&self) -> Result<String, DefinitionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read and validate a JSON definition file.
    #[cfg(all(feature = "std", feature = "serde"))]
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, DefinitionError> {
        let text = std::fs::read_to_string(path)?;
        let def = Self::from_json_str(&text)?;
        def.validate()?;
        Ok(def)
    }
}

/// Compiles definitions into runtime graphs.
///
/// Holds only the settle configuration given to every graph it builds, so one
/// builder can serve any number of critters and definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Builder {
    cfg: SettleConfig,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, cfg: SettleConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn config(&self) -> &SettleConfig {
        &self.cfg
    }

    /// Build a fresh graph. Cells are added first, then links in definition
    /// order; links with a missing endpoint or gate are dropped.
    pub fn build(&self, def: &BrainDefinition) -> BrainGraph {
        let mut graph = BrainGraph::new(self.cfg);
        for (&index, &params) in &def.cells {
            graph.add_cell(index, params);
        }
        let mut dropped = 0usize;
        for &link in &def.links {
            if !graph.add_link(link) {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!(dropped, kept = graph.link_count(), "built graph with dropped links");
        }
        graph
    }
}

/// Build a graph with the default settle configuration.
pub fn build(def: &BrainDefinition) -> BrainGraph {
    Builder::new().build(def)
}
