//! Testability ports for injecting time and randomness.

use chrono::{DateTime, Utc};
use herocombat_domain::RandomSource;
use uuid::Uuid;

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RandomPort: Send + Sync {
    /// A d6 face in `1..=6`.
    fn die_face(&self) -> u8;
    fn gen_uuid(&self) -> Uuid;
}

/// Lets the domain's roller draw faces from a [`RandomPort`].
pub struct PortDice<'a>(pub &'a dyn RandomPort);

impl RandomSource for PortDice<'_> {
    fn next_die_face(&mut self) -> u8 {
        self.0.die_face()
    }
}
