//! Ready-made brain definitions wired against [`crate::ports`].

use crate::cell::CellParams;
use crate::definition::BrainDefinition;
use crate::link::LinkParams;
use crate::ports::*;

/// Constant drive cell used by the stock brains.
pub const DRIVE: usize = FIRST_GENERAL;
/// Turn-persistence cell in [`forager`].
pub const TURN_HOLD: usize = FIRST_GENERAL + 1;

/// Distance ports double as presence gates: zero (nothing sensed) is inactive.
fn presence() -> CellParams {
    CellParams::new(0.01, 1.0)
}

/// Steers toward food while food is sensed, shies away from neighbours,
/// cruises on a constant drive, and keeps turning briefly after the food
/// disappears through a small turn -> hold -> turn loop.
pub fn forager() -> BrainDefinition {
    BrainDefinition::new()
        .cell(FOOD_ANGLE, CellParams::input())
        .cell(FOOD_DISTANCE, presence())
        .cell(NEIGHBOR_ANGLE, CellParams::input())
        .cell(NEIGHBOR_DISTANCE, presence())
        .cell(ENERGY, CellParams::input())
        .cell(HEADING, CellParams::input())
        .cell(TURN, CellParams::new(0.0, 0.5))
        .cell(ACCEL, CellParams::new(0.0, 0.0))
        .cell(DRIVE, CellParams::constant(1.0))
        .cell(TURN_HOLD, CellParams::new(0.05, 0.5))
        .link(LinkParams::new(FOOD_ANGLE, TURN, -0.8).gated_by(FOOD_DISTANCE))
        .link(LinkParams::new(NEIGHBOR_ANGLE, TURN, 0.3).gated_by(NEIGHBOR_DISTANCE))
        .link(LinkParams::new(DRIVE, ACCEL, 0.2))
        .link(LinkParams::new(FOOD_DISTANCE, ACCEL, 0.05))
        .link(LinkParams::new(TURN, TURN_HOLD, 0.5))
        .link(LinkParams::new(TURN_HOLD, TURN, 1.0))
}

/// Circles at a fixed rate while it has energy: the turn actuator is clamped
/// to a static output once driven past its threshold.
pub fn drifter() -> BrainDefinition {
    BrainDefinition::new()
        .cell(ENERGY, CellParams::new(0.1, 1.0))
        .cell(TURN, CellParams::new(0.5, 0.5).with_static(0.25))
        .cell(ACCEL, CellParams::new(0.0, 0.0))
        .cell(DRIVE, CellParams::constant(1.0))
        .link(LinkParams::new(DRIVE, TURN, 1.0).gated_by(ENERGY))
        .link(LinkParams::new(DRIVE, ACCEL, 0.1).gated_by(ENERGY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::build;

    #[test]
    fn stock_definitions_validate() {
        assert!(forager().validate().is_ok());
        assert!(drifter().validate().is_ok());
        assert_eq!(forager().dangling_links().count(), 0);
    }

    #[test]
    fn forager_turns_toward_food() {
        let mut brain = build(&forager());
        brain.write_input(FOOD_ANGLE, 1.0);
        brain.write_input(FOOD_DISTANCE, 4.0);
        brain.tick();
        let right = brain.read_output(TURN).unwrap();
        assert!(right < 0.0);

        let mut brain = build(&forager());
        brain.write_input(FOOD_ANGLE, -1.0);
        brain.write_input(FOOD_DISTANCE, 4.0);
        brain.tick();
        let left = brain.read_output(TURN).unwrap();
        assert!(left > 0.0);
        assert!((left + right).abs() < 1e-12);
    }

    #[test]
    fn forager_ignores_food_angle_without_food() {
        let mut brain = build(&forager());
        brain.write_input(FOOD_ANGLE, 1.0);
        brain.tick();
        assert_eq!(brain.read_output(TURN), None);
        assert_eq!(brain.read_output(ACCEL), Some(0.2));
    }

    #[test]
    fn forager_turn_fades_after_food_is_gone() {
        let mut brain = build(&forager());
        brain.write_input(FOOD_ANGLE, 1.0);
        brain.write_input(FOOD_DISTANCE, 4.0);
        brain.tick();
        let start = brain.read_output(TURN).unwrap().abs();

        for _ in 0..20 {
            brain.tick();
        }
        let end = brain.read_output(TURN).unwrap().abs();
        assert!(end < start);
        assert!(end < 0.01);
    }

    #[test]
    fn forager_hurries_toward_distant_food() {
        let mut brain = build(&forager());
        brain.write_input(FOOD_DISTANCE, 10.0);
        brain.tick();
        assert_eq!(brain.read_output(ACCEL), Some(0.5));
    }

    #[test]
    fn drifter_turns_at_clamped_rate_while_fed() {
        let mut brain = build(&drifter());
        brain.tick();
        assert_eq!(brain.read_output(TURN), None);

        brain.write_input(ENERGY, 1.0);
        brain.tick();
        assert_eq!(brain.cell(TURN).and_then(|c| c.value()), Some(0.5));
        assert_eq!(brain.read_output(TURN), Some(0.25));
        assert_eq!(brain.read_output(ACCEL), Some(0.1));

        // Unfed: the live value decays below threshold and the clamp lets go.
        brain.tick();
        assert_eq!(brain.read_output(TURN), None);
    }
}
