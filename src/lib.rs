//! # critter_brain
//!
//! A tiny signal-propagation network used as the decision-making "brain" of
//! simulated critters.
//!
//! A brain is a sparse set of indexed cells joined by weighted, optionally
//! gated links. Each tick queued inputs are applied, signals settle through
//! the links for a bounded number of simultaneous rounds, and then every cell
//! decays toward zero.
//!
//! ## Quick Start
//!
//! ```
//! use critter_brain::prelude::*;
//!
//! let def = BrainDefinition::new()
//!     .cell(0, CellParams::new(0.0, 0.0))
//!     .cell(1, CellParams::new(0.0, 0.5))
//!     .link(LinkParams::new(0, 1, 2.0));
//!
//! let mut brain = build(&def);
//! brain.write_input(0, 3.0);
//! brain.tick();
//!
//! // 6.0 delivered, then halved by decay.
//! assert_eq!(brain.read_output(1), Some(3.0));
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support, definition files
//! - `serde` (default): JSON definitions and serializable configs
//!
//! ## no_std Support
//!
//! Disable default features for `no_std` environments:
//! ```toml
//! critter_brain = { version = "0.1", default-features = false }
//! ```
//!
//! ## Modules
//!
//! - [`graph`]: The runtime graph and its settle loop
//! - [`definition`]: Authoring, validation and building
//! - [`ports`]: Sense/actuator index contract
//! - [`stock`]: Ready-made definitions
//! - [`observer`]: Read-only observation adapters

// no_std support
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[path = "core/cell.rs"]
pub mod cell;

#[path = "core/link.rs"]
pub mod link;

#[path = "core/graph.rs"]
pub mod graph;

#[path = "core/definition.rs"]
pub mod definition;

#[path = "core/ports.rs"]
pub mod ports;

#[path = "core/stock.rs"]
pub mod stock;

#[cfg(feature = "std")]
pub mod observer;

/// Prelude module for convenient imports.
///
/// ```
/// use critter_brain::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cell::{Cell, CellIndex, CellParams};
    pub use crate::definition::{build, BrainDefinition, Builder, DefinitionError};
    pub use crate::graph::{BrainGraph, SettleConfig, TickReport};
    pub use crate::link::{Link, LinkParams};
    pub use crate::ports::{Actuator, Sense};
}
