//! # Rogue Core
//!
//! Selection and quest logic for the roguelike progression layer. This crate
//! reads the static tables and save state defined in `rogue_rules` and never
//! drives the game loop itself; the host calls in at fixed points (room
//! entered, battle won, shop opened).
//!
//! ## Core Components
//!
//! - **rng**: Deterministic random streams with snapshot, restore and guards
//! - **query**: Candidate queries over the species and item tables
//! - **weights**: Weighted draws, with or without replacement
//! - **quest**: Quest catalog, trigger evaluation and reward collection
//! - **generation**: Run content built from the pieces above
//! - **events** / **popups**: The seams the host plugs into

pub mod error;
pub mod events;
pub mod generation;
pub mod popups;
pub mod query;
pub mod quest;
pub mod rng;
pub mod weights;

pub use error::*;
pub use events::*;
pub use popups::*;
pub use query::*;
pub use quest::*;
pub use rng::*;
pub use weights::*;
