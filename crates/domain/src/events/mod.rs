//! Domain Events
//!
//! Values the pure resolvers return instead of mutating state.

pub mod combat_events;

pub use combat_events::*;
