//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod memory;
pub mod ports;
pub mod presenter;
pub mod scenario;
pub mod settings;
pub mod update_queue;
