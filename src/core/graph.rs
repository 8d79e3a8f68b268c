// no_std support: use core and alloc when std is not available
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(not(feature = "std"))]
use hashbrown::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::{debug, trace};

use crate::cell::{Cell, CellIndex, CellParams};
use crate::link::{Link, LinkParams};

/// Default cap on settle rounds per tick.
pub const MAX_SETTLE_ROUNDS: usize = 4;

/// Hard ceiling for a configured round cap.
pub const MAX_ROUNDS_LIMIT: usize = 64;

/// Largest cell index a graph accepts. Cells live in a slot array indexed
/// directly by their index, so this bounds memory per critter.
pub const MAX_CELL_INDEX: CellIndex = 4095;

/// Default change below which a round counts as "no change".
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Settle-loop parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SettleConfig {
    /// Upper bound on propagation rounds in one tick.
    pub max_settle_rounds: usize,
    /// A round whose largest change is at most this is considered settled.
    pub epsilon: f64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            max_settle_rounds: MAX_SETTLE_ROUNDS,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl SettleConfig {
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_settle_rounds = rounds;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Validate the configuration, returning an error message if invalid.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_settle_rounds == 0 {
            return Err("max_settle_rounds must be >= 1");
        }
        if self.max_settle_rounds > MAX_ROUNDS_LIMIT {
            return Err("max_settle_rounds too large");
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err("epsilon must be finite and >= 0");
        }
        Ok(())
    }
}

/// Outcome of one [`BrainGraph::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickReport {
    /// Rounds actually run (at least 1 unless the graph is empty of links).
    pub rounds: usize,
    /// False when the round cap was hit while values were still moving.
    pub settled: bool,
    /// Link transmissions summed over all rounds.
    pub transmissions: usize,
}

/// The runtime brain of one critter: an arena of cells plus the links
/// between them, advanced by a bounded synchronous settle loop.
///
/// Per simulation step the owner calls [`write_input`](Self::write_input) for
/// every sensory port, then [`tick`](Self::tick), then
/// [`read_output`](Self::read_output) for every actuator port.
#[derive(Debug, Clone)]
pub struct BrainGraph {
    cfg: SettleConfig,

    // Sparse slots: `cells[i]` holds the cell with index `i`, if defined.
    cells: Vec<Option<Cell>>,
    cell_count: usize,

    // Creation order is evaluation order (ties resolve to the earlier link).
    links: Vec<Link>,
    link_slots: HashMap<(CellIndex, CellIndex), usize>,

    pending_input: Vec<(CellIndex, f64)>,

    // Per-round aggregation buffer, one entry per slot.
    round_writes: Vec<Option<f64>>,

    ticks: u64,
    last_report: TickReport,
}

impl Default for BrainGraph {
    fn default() -> Self {
        Self::new(SettleConfig::default())
    }
}

impl BrainGraph {
    /// An empty graph. Cells and links are added with
    /// [`add_cell`](Self::add_cell) and [`add_link`](Self::add_link), or
    /// compiled from a definition by [`crate::definition::Builder`].
    pub fn new(cfg: SettleConfig) -> Self {
        Self {
            cfg,
            cells: Vec::new(),
            cell_count: 0,
            links: Vec::new(),
            link_slots: HashMap::new(),
            pending_input: Vec::new(),
            round_writes: Vec::new(),
            ticks: 0,
            last_report: TickReport::default(),
        }
    }

    /// Insert (or replace) the cell at `index`.
    ///
    /// Returns false if the index is above [`MAX_CELL_INDEX`].
    pub fn add_cell(&mut self, index: CellIndex, params: CellParams) -> bool {
        if index > MAX_CELL_INDEX {
            debug!(index, "cell index above limit; dropped");
            return false;
        }
        if index >= self.cells.len() {
            self.cells.resize_with(index + 1, || None);
        }
        let slot = &mut self.cells[index];
        if slot.is_none() {
            self.cell_count += 1;
        }
        *slot = Some(Cell::new(index, params));
        true
    }

    /// Add a link between existing cells.
    ///
    /// A link naming a missing source, target or gate is dropped and false is
    /// returned. A link for an ordered pair that already exists replaces the
    /// factor and gate of that link, keeping its place in evaluation order.
    pub fn add_link(&mut self, params: LinkParams) -> bool {
        let gate_ok = params.gate.map_or(true, |g| self.has_cell(g));
        if !self.has_cell(params.source) || !self.has_cell(params.target) || !gate_ok {
            debug!(
                source = params.source,
                target = params.target,
                gate = ?params.gate,
                "link references a missing cell; dropped"
            );
            return false;
        }

        let link = Link::from(params);
        match self.link_slots.get(&link.key()) {
            Some(&pos) => self.links[pos] = link,
            None => {
                self.link_slots.insert(link.key(), self.links.len());
                self.links.push(link);
            }
        }
        true
    }

    /// Remove the link for the ordered pair `(source, target)`.
    pub fn remove_link(&mut self, source: CellIndex, target: CellIndex) -> bool {
        let Some(pos) = self.link_slots.remove(&(source, target)) else {
            return false;
        };
        self.links.remove(pos);
        for p in self.link_slots.values_mut() {
            if *p > pos {
                *p -= 1;
            }
        }
        true
    }

    #[inline]
    pub fn has_cell(&self, index: CellIndex) -> bool {
        self.cell(index).is_some()
    }

    #[inline]
    pub fn cell(&self, index: CellIndex) -> Option<&Cell> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    /// All defined cells, in index order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter().filter_map(Option::as_ref)
    }

    /// All links, in evaluation order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn last_report(&self) -> TickReport {
        self.last_report
    }

    /// Writes queued for the next tick, in call order.
    pub fn pending_inputs(&self) -> &[(CellIndex, f64)] {
        &self.pending_input
    }

    /// Returns the current configuration (read-only).
    #[must_use]
    pub fn config(&self) -> &SettleConfig {
        &self.cfg
    }

    /// Update the live settle configuration.
    ///
    /// Returns an error (and keeps the old configuration) if validation fails.
    pub fn update_config<F>(&mut self, f: F) -> Result<(), &'static str>
    where
        F: FnOnce(&mut SettleConfig),
    {
        let mut cfg = self.cfg;
        f(&mut cfg);
        cfg.validate()?;
        self.cfg = cfg;
        Ok(())
    }

    /// Queue a raw value for the cell at `index`.
    ///
    /// Nothing propagates until the next [`tick`](Self::tick). Writes to an
    /// index this graph does not define are discarded.
    pub fn write_input(&mut self, index: CellIndex, value: f64) {
        if !self.has_cell(index) {
            return;
        }
        self.pending_input.push((index, value));
    }

    /// The emitted value of the cell at `index`, `None` for an inactive or
    /// undefined cell. Meaningful after a tick.
    #[inline]
    pub fn read_output(&self, index: CellIndex) -> Option<f64> {
        self.cell(index).and_then(Cell::read)
    }

    /// Alias for [`tick`](Self::tick).
    pub fn commit(&mut self) -> TickReport {
        self.tick()
    }

    /// Advance one tick: apply queued inputs, settle, then decay.
    ///
    /// Settling runs synchronous rounds. In each round every link (in
    /// creation order) reads its source and gate as they stood at the start of
    /// the round; deliveries to the same target keep the largest magnitude;
    /// all deliveries are then committed at once. Rounds stop when nothing
    /// changes by more than `epsilon` or after `max_settle_rounds`, in which
    /// case the residue simply carries into the next tick.
    pub fn tick(&mut self) -> TickReport {
        for (index, value) in self.pending_input.drain(..) {
            if let Some(cell) = self.cells.get_mut(index).and_then(Option::as_mut) {
                cell.write(value);
            }
        }

        let mut report = TickReport::default();
        if !self.links.is_empty() {
            let max_rounds = self.cfg.max_settle_rounds.clamp(1, MAX_ROUNDS_LIMIT);
            while report.rounds < max_rounds {
                report.rounds += 1;
                let (sent, changed) = self.settle_round();
                report.transmissions += sent;
                if !changed {
                    report.settled = true;
                    break;
                }
            }
        } else {
            report.settled = true;
        }

        for cell in self.cells.iter_mut().flatten() {
            cell.decay();
        }

        if !report.settled {
            trace!(
                tick = self.ticks,
                rounds = report.rounds,
                "settle round cap reached; residue carries over"
            );
        }

        self.ticks = self.ticks.wrapping_add(1);
        self.last_report = report;
        report
    }

    /// Forget all live values and queued inputs, re-seeding initial values.
    pub fn reset(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            cell.reset();
        }
        self.pending_input.clear();
        self.ticks = 0;
        self.last_report = TickReport::default();
    }

    /// One synchronous propagation round. Returns (transmissions, changed).
    fn settle_round(&mut self) -> (usize, bool) {
        let Self {
            cells,
            links,
            round_writes,
            cfg,
            ..
        } = self;

        round_writes.clear();
        round_writes.resize(cells.len(), None);

        // Cells are not mutated until commit, so every read below sees the
        // round-start state, gates included.
        let mut sent = 0usize;
        for link in links.iter() {
            if let Some(g) = link.gate {
                if !cells[g].as_ref().is_some_and(Cell::is_active) {
                    continue;
                }
            }
            let emitted = cells[link.source].as_ref().and_then(Cell::read);
            let Some(v) = link.carry(emitted) else {
                continue;
            };
            if v.is_nan() {
                continue;
            }
            sent += 1;
            let slot = &mut round_writes[link.target];
            match *slot {
                Some(prev) if prev.abs() >= v.abs() => {}
                _ => *slot = Some(v),
            }
        }

        let mut changed = false;
        for (slot, write) in cells.iter_mut().zip(round_writes.iter()) {
            let (Some(cell), Some(v)) = (slot.as_mut(), *write) else {
                continue;
            };
            if !within(cell.value(), v, cfg.epsilon) {
                changed = true;
            }
            cell.write(v);
        }

        (sent, changed)
    }
}

#[inline]
fn within(old: Option<f64>, new: f64, epsilon: f64) -> bool {
    match old {
        Some(o) => o == new || (o - new).abs() <= epsilon,
        None => false,
    }
}
