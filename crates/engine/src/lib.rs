//! HERO System combat engine.
//!
//! ## Structure
//!
//! - `use_cases/` - Attack resolution and the apply stage
//! - `infrastructure/` - Ports and their adapters (memory stores, dice, clock, settings)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
