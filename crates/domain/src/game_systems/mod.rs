//! Game systems.
//!
//! Only the HERO System is implemented, once per edition. The registry
//! lets callers pick a system by id ("hero5e", "hero6e").

pub mod hero;
mod traits;

pub use hero::HeroSystem;
pub use traits::GameSystem;

use std::sync::Arc;

use crate::value_objects::Edition;

/// Registry of available game systems.
pub struct GameSystemRegistry {
    systems: Vec<Arc<dyn GameSystem>>,
}

impl Default for GameSystemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSystemRegistry {
    /// Create a new registry with both HERO editions.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(HeroSystem::fifth()));
        registry.register(Arc::new(HeroSystem::sixth()));
        registry
    }

    /// Create an empty registry without built-in systems.
    pub fn empty() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    pub fn register(&mut self, system: Arc<dyn GameSystem>) {
        self.systems.push(system);
    }

    /// Get a game system by its ID.
    pub fn get(&self, system_id: &str) -> Option<Arc<dyn GameSystem>> {
        self.systems
            .iter()
            .find(|s| s.system_id() == system_id)
            .cloned()
    }

    /// First registered system running `edition`.
    pub fn for_edition(&self, edition: Edition) -> Option<Arc<dyn GameSystem>> {
        self.systems
            .iter()
            .find(|s| s.edition() == edition)
            .cloned()
    }

    /// List all registered system IDs.
    pub fn list_systems(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.system_id()).collect()
    }
}
