use crate::cell::CellIndex;
use crate::graph::{BrainGraph, TickReport};
use crate::ports;

/// A read-only snapshot of what a brain is doing.
///
/// Observers cannot mutate or steer the graph. Snapshotting is on demand and
/// allocates; the tick loop is unaffected.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSnapshot {
    pub tick_count: u64,
    pub last_report: TickReport,
    pub cells: Vec<CellReading>,
    pub link_count: usize,
}

/// One cell as seen from outside, in index order.
#[derive(Debug, Clone, PartialEq)]
pub struct CellReading {
    pub index: CellIndex,
    /// Raw live value.
    pub value: Option<f64>,
    /// What [`BrainGraph::read_output`] would return.
    pub output: Option<f64>,
    pub active: bool,
}

impl CellReading {
    /// Port role of this cell, if it sits on a sense or actuator index.
    pub fn label(&self) -> Option<&'static str> {
        ports::label_for(self.index)
    }
}

impl GraphSnapshot {
    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|c| c.active).count()
    }

    pub fn reading(&self, index: CellIndex) -> Option<&CellReading> {
        self.cells.iter().find(|c| c.index == index)
    }
}

pub struct GraphAdapter<'a> {
    graph: &'a BrainGraph,
}

impl<'a> GraphAdapter<'a> {
    pub fn new(graph: &'a BrainGraph) -> Self {
        Self { graph }
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        let cells = self
            .graph
            .cells()
            .map(|c| CellReading {
                index: c.index(),
                value: c.value(),
                output: c.read(),
                active: c.is_active(),
            })
            .collect();

        GraphSnapshot {
            tick_count: self.graph.tick_count(),
            last_report: self.graph.last_report(),
            cells,
            link_count: self.graph.link_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::build;
    use crate::ports::{ACCEL, TURN};
    use crate::stock;

    #[test]
    fn snapshot_reflects_graph_state() {
        let mut brain = build(&stock::drifter());
        brain.write_input(ports::ENERGY, 1.0);
        brain.tick();

        let snap = GraphAdapter::new(&brain).snapshot();
        assert_eq!(snap.tick_count, 1);
        assert_eq!(snap.link_count, 2);
        assert_eq!(snap.cells.len(), brain.cell_count());
        assert!(snap.cells.windows(2).all(|w| w[0].index < w[1].index));

        let turn = snap.reading(TURN).unwrap();
        assert_eq!(turn.value, Some(0.5));
        assert_eq!(turn.output, Some(0.25));
        assert!(turn.active);
        assert_eq!(turn.label(), Some("turn"));

        assert_eq!(snap.reading(ACCEL).unwrap().output, Some(0.1));
    }

    #[test]
    fn snapshot_does_not_disturb_the_graph() {
        let mut brain = build(&stock::forager());
        brain.write_input(ports::FOOD_DISTANCE, 2.0);
        let before = GraphAdapter::new(&brain).snapshot();
        let again = GraphAdapter::new(&brain).snapshot();
        assert_eq!(before, again);
        assert_eq!(brain.pending_inputs().len(), 1);

        brain.tick();
        let after = GraphAdapter::new(&brain).snapshot();
        assert_eq!(after.tick_count, 1);
        assert!(after.active_count() > 0);
    }
}
