#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable index of a cell inside one graph.
///
/// Indices are the contract between brain definitions and the system that
/// drives them (see [`crate::ports`]).
pub type CellIndex = usize;

/// Authored parameters for one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellParams {
    /// Minimum absolute value for the cell to count as active.
    pub threshold: f64,
    /// Fraction of the value lost per tick, in `[0, 1]`.
    pub decay: f64,
    /// Constant emitted instead of the live value while the cell is active.
    #[cfg_attr(feature = "serde", serde(default, alias = "staticValue"))]
    pub static_value: Option<f64>,
    /// Live value seeded when the graph is built (or reset).
    #[cfg_attr(feature = "serde", serde(default))]
    pub initial: Option<f64>,
}

impl Default for CellParams {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            decay: 0.0,
            static_value: None,
            initial: None,
        }
    }
}

impl CellParams {
    pub fn new(threshold: f64, decay: f64) -> Self {
        Self {
            threshold,
            decay,
            ..Default::default()
        }
    }

    /// A sensory port: active once written, zeroed by decay every tick.
    pub fn input() -> Self {
        Self::new(0.0, 1.0)
    }

    /// A constant source that emits `value` from the first tick on.
    pub fn constant(value: f64) -> Self {
        Self::new(0.0, 0.0).with_static(value).with_initial(value)
    }

    pub fn with_static(mut self, value: f64) -> Self {
        self.static_value = Some(value);
        self
    }

    pub fn with_initial(mut self, value: f64) -> Self {
        self.initial = Some(value);
        self
    }
}

/// A scalar register with threshold, decay and optional static output.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    index: CellIndex,
    threshold: f64,
    decay: f64,
    static_value: Option<f64>,
    initial: Option<f64>,
    value: Option<f64>,
}

impl Cell {
    /// Build a cell from authored parameters.
    ///
    /// Out-of-range parameters are clamped rather than rejected; strict checks
    /// live in [`crate::definition::BrainDefinition::validate`].
    pub fn new(index: CellIndex, params: CellParams) -> Self {
        let threshold = if params.threshold.is_nan() {
            0.0
        } else {
            params.threshold.max(0.0)
        };
        let decay = if params.decay.is_nan() {
            0.0
        } else {
            params.decay.clamp(0.0, 1.0)
        };
        let initial = params.initial.filter(|v| !v.is_nan());

        Self {
            index,
            threshold,
            decay,
            static_value: params.static_value,
            initial,
            value: initial,
        }
    }

    #[inline]
    pub fn index(&self) -> CellIndex {
        self.index
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[inline]
    pub fn decay_rate(&self) -> f64 {
        self.decay
    }

    #[inline]
    pub fn static_value(&self) -> Option<f64> {
        self.static_value
    }

    /// Raw register contents, `None` if never written.
    #[inline]
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        match self.value {
            Some(v) => v.abs() >= self.threshold,
            None => false,
        }
    }

    /// Emitted signal: `None` while inactive, otherwise the static value if
    /// set, else the live value.
    #[inline]
    pub fn read(&self) -> Option<f64> {
        if !self.is_active() {
            return None;
        }
        self.static_value.or(self.value)
    }

    /// Overwrite the live value. NaN counts as "no signal" and is ignored.
    #[inline]
    pub fn write(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.value = Some(value);
    }

    /// Forget the live value entirely.
    pub fn clear(&mut self) {
        self.value = None;
    }

    /// Back to the freshly built state.
    pub(crate) fn reset(&mut self) {
        match self.initial {
            Some(v) => self.value = Some(v),
            None => self.clear(),
        }
    }

    /// Apply one tick of multiplicative decay.
    #[inline]
    pub fn decay(&mut self) {
        if self.decay == 0.0 {
            return;
        }
        if let Some(v) = self.value.as_mut() {
            // Full decay zeroes outright; inf * 0 would leave NaN behind.
            if self.decay >= 1.0 {
                *v = 0.0;
            } else {
                *v *= 1.0 - self.decay;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(params: CellParams, value: f64) -> Cell {
        let mut cell = Cell::new(0, params);
        cell.write(value);
        cell
    }

    #[test]
    fn never_written_cell_reads_none() {
        let cell = Cell::new(3, CellParams::new(0.0, 0.0));
        assert_eq!(cell.value(), None);
        assert_eq!(cell.read(), None);
        assert!(!cell.is_active());
    }

    #[test]
    fn zero_decay_is_a_no_op() {
        let mut cell = written(CellParams::new(0.0, 0.0), 2.5);
        cell.decay();
        assert_eq!(cell.value(), Some(2.5));
    }

    #[test]
    fn full_decay_zeroes_the_value() {
        let mut cell = written(CellParams::new(0.0, 1.0), -7.0);
        cell.decay();
        assert_eq!(cell.value(), Some(0.0));
    }

    #[test]
    fn partial_decay_scales_in_place() {
        let mut cell = written(CellParams::new(0.0, 0.25), 8.0);
        cell.decay();
        assert_eq!(cell.value(), Some(6.0));
    }

    #[test]
    fn full_decay_zeroes_infinite_values() {
        let mut cell = written(CellParams::new(0.0, 1.0), f64::INFINITY);
        cell.decay();
        assert_eq!(cell.value(), Some(0.0));

        let mut cell = written(CellParams::new(0.0, 1.0), f64::NEG_INFINITY);
        cell.decay();
        assert_eq!(cell.value(), Some(0.0));

        let mut cell = written(CellParams::new(0.0, 0.5), f64::INFINITY);
        cell.decay();
        assert_eq!(cell.value(), Some(f64::INFINITY));
    }

    #[test]
    fn decay_leaves_unwritten_cell_unset() {
        let mut cell = Cell::new(0, CellParams::new(0.0, 0.5));
        cell.decay();
        assert_eq!(cell.value(), None);
    }

    #[test]
    fn sub_threshold_reads_none_regardless_of_sign() {
        let params = CellParams::new(1.0, 0.0);
        assert_eq!(written(params, 0.5).read(), None);
        assert_eq!(written(params, -0.5).read(), None);
        assert_eq!(written(params, 1.0).read(), Some(1.0));
        assert_eq!(written(params, -1.5).read(), Some(-1.5));
    }

    #[test]
    fn static_value_overrides_live_value_while_active() {
        let params = CellParams::new(0.5, 0.0).with_static(3.0);
        assert_eq!(written(params, 0.9).read(), Some(3.0));
        assert_eq!(written(params, -42.0).read(), Some(3.0));
        assert_eq!(written(params, 0.1).read(), None);
    }

    #[test]
    fn nan_write_is_ignored() {
        let mut cell = written(CellParams::new(0.0, 0.0), 1.0);
        cell.write(f64::NAN);
        assert_eq!(cell.value(), Some(1.0));
    }

    #[test]
    fn construction_clamps_parameters() {
        let cell = Cell::new(0, CellParams::new(-1.0, 1.5));
        assert_eq!(cell.threshold(), 0.0);
        assert_eq!(cell.decay_rate(), 1.0);

        let cell = Cell::new(0, CellParams::new(f64::NAN, f64::NAN));
        assert_eq!(cell.threshold(), 0.0);
        assert_eq!(cell.decay_rate(), 0.0);
    }

    #[test]
    fn constant_cell_is_live_from_construction() {
        let mut cell = Cell::new(12, CellParams::constant(1.0));
        assert_eq!(cell.read(), Some(1.0));
        cell.decay();
        assert_eq!(cell.read(), Some(1.0));
        cell.clear();
        assert_eq!(cell.read(), None);
        cell.reset();
        assert_eq!(cell.read(), Some(1.0));
    }

    #[test]
    fn reset_without_initial_forgets_the_value() {
        let mut cell = written(CellParams::new(0.0, 0.0), 4.0);
        cell.reset();
        assert_eq!(cell.value(), None);
        assert!(!cell.is_active());
    }
}
