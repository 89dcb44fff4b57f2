//! Game system traits.
//!
//! A game system names itself and exposes the edition-level constants the
//! combat pipeline needs. The resolvers themselves are free functions in
//! the system's module.

use crate::value_objects::Edition;

/// Core trait all game systems must implement.
pub trait GameSystem: Send + Sync {
    /// Unique identifier for this game system (e.g., "hero6e").
    fn system_id(&self) -> &str;

    /// Human-readable display name.
    fn display_name(&self) -> &str;

    /// Rules edition every resolution under this system uses.
    fn edition(&self) -> Edition;

    /// Characteristics a sheet of this system can carry.
    fn stat_names(&self) -> &[&str];

    /// To-hit penalty for attacking at `distance`.
    fn range_penalty(&self, distance: f64) -> i32 {
        super::hero::range_penalty(distance, self.edition())
    }

    /// Knockback total converted to the system's distance unit.
    fn knockback_distance(&self, total: i32) -> i32 {
        total * self.edition().knockback_scale()
    }
}
