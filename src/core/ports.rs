//! Port contract between brain definitions and the simulation driving them.
//!
//! Memory map:
//!
//! | index | role |
//! |-------|------|
//! | 0 | food angle (relative to heading) |
//! | 1 | food distance |
//! | 2 | neighbour angle (relative) |
//! | 3 | neighbour distance |
//! | 4 | energy |
//! | 5 | heading |
//! | 10 | turn |
//! | 11 | accel |
//! | 12..=60 | general purpose |

use crate::cell::CellIndex;

pub const FOOD_ANGLE: CellIndex = 0;
pub const FOOD_DISTANCE: CellIndex = 1;
pub const NEIGHBOR_ANGLE: CellIndex = 2;
pub const NEIGHBOR_DISTANCE: CellIndex = 3;
pub const ENERGY: CellIndex = 4;
pub const HEADING: CellIndex = 5;

pub const TURN: CellIndex = 10;
pub const ACCEL: CellIndex = 11;

pub const FIRST_GENERAL: CellIndex = 12;
pub const LAST_GENERAL: CellIndex = 60;

/// Values the simulation writes into a brain every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    FoodAngle,
    FoodDistance,
    NeighborAngle,
    NeighborDistance,
    Energy,
    Heading,
}

impl Sense {
    pub const ALL: [Sense; 6] = [
        Sense::FoodAngle,
        Sense::FoodDistance,
        Sense::NeighborAngle,
        Sense::NeighborDistance,
        Sense::Energy,
        Sense::Heading,
    ];

    #[inline]
    pub fn index(self) -> CellIndex {
        match self {
            Sense::FoodAngle => FOOD_ANGLE,
            Sense::FoodDistance => FOOD_DISTANCE,
            Sense::NeighborAngle => NEIGHBOR_ANGLE,
            Sense::NeighborDistance => NEIGHBOR_DISTANCE,
            Sense::Energy => ENERGY,
            Sense::Heading => HEADING,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sense::FoodAngle => "food_angle",
            Sense::FoodDistance => "food_distance",
            Sense::NeighborAngle => "neighbor_angle",
            Sense::NeighborDistance => "neighbor_distance",
            Sense::Energy => "energy",
            Sense::Heading => "heading",
        }
    }
}

/// Values the simulation reads back after each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actuator {
    Turn,
    Accel,
}

impl Actuator {
    pub const ALL: [Actuator; 2] = [Actuator::Turn, Actuator::Accel];

    #[inline]
    pub fn index(self) -> CellIndex {
        match self {
            Actuator::Turn => TURN,
            Actuator::Accel => ACCEL,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Actuator::Turn => "turn",
            Actuator::Accel => "accel",
        }
    }
}

/// Role of an index under the port contract.
pub fn label_for(index: CellIndex) -> Option<&'static str> {
    Sense::ALL
        .iter()
        .find(|s| s.index() == index)
        .map(|s| s.label())
        .or_else(|| {
            Actuator::ALL
                .iter()
                .find(|a| a.index() == index)
                .map(|a| a.label())
        })
}
