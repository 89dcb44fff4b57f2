//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Actor and item storage
//! - Defense lookup (which powers protect a target against an attack)
//! - Committing actor updates
//! - Rendering results
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{ActorBatches, ActorRepo, ItemRepo, PersistencePort};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{DefenseOptions, DefensePort, PresentationPort};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockActorRepo, MockItemRepo, MockPersistencePort};

#[cfg(test)]
pub use external::MockDefensePort;

#[cfg(test)]
pub use testing::{MockClockPort, MockRandomPort};

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, PortDice, RandomPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{PersistenceError, RepoError};
