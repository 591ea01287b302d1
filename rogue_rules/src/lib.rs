//! # Rogue Rules
//!
//! The data layer of the roguelike progression system. It holds the static
//! species and item tables, the shared vocabularies (types, pockets, config
//! keys, flags, tiers) and the typed save block that persists between runs.
//! This crate contains no selection or quest logic.

pub mod config;
pub mod entities;
pub mod mechanics;
pub mod save_state;

pub use config::*;
pub use entities::*;
pub use mechanics::*;
pub use save_state::*;
