#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cell::CellIndex;

/// Authored description of one weighted edge.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkParams {
    pub source: CellIndex,
    pub target: CellIndex,
    pub factor: f64,
    /// Cell whose activation enables this link.
    #[cfg_attr(feature = "serde", serde(default, alias = "gateCell"))]
    pub gate: Option<CellIndex>,
}

impl LinkParams {
    pub fn new(source: CellIndex, target: CellIndex, factor: f64) -> Self {
        Self {
            source,
            target,
            factor,
            gate: None,
        }
    }

    pub fn gated_by(mut self, gate: CellIndex) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Identity of the link: at most one per ordered pair.
    #[inline]
    pub fn key(&self) -> (CellIndex, CellIndex) {
        (self.source, self.target)
    }
}

/// A compiled link whose endpoints (and gate) are known to exist.
///
/// Links carry no behaviour; the graph evaluates them during settle rounds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Link {
    pub source: CellIndex,
    pub target: CellIndex,
    pub factor: f64,
    pub gate: Option<CellIndex>,
}

impl Link {
    #[inline]
    pub fn key(&self) -> (CellIndex, CellIndex) {
        (self.source, self.target)
    }

    /// Value carried for an emitted source signal. Inactive sources carry nothing.
    #[inline]
    pub fn carry(&self, emitted: Option<f64>) -> Option<f64> {
        emitted.map(|v| v * self.factor)
    }
}

impl From<LinkParams> for Link {
    fn from(p: LinkParams) -> Self {
        Self {
            source: p.source,
            target: p.target,
            factor: p.factor,
            gate: p.gate,
        }
    }
}

impl From<Link> for LinkParams {
    fn from(l: Link) -> Self {
        Self {
            source: l.source,
            target: l.target,
            factor: l.factor,
            gate: l.gate,
        }
    }
}
