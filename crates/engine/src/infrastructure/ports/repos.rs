//! Storage port traits.

use std::collections::BTreeMap;

use async_trait::async_trait;
use herocombat_domain::{ActorId, ActorSheet, ActorUpdate, AttackItem, ItemId};

use super::error::{PersistenceError, RepoError};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActorRepo: Send + Sync {
    async fn get(&self, id: ActorId) -> Result<Option<ActorSheet>, RepoError>;
    async fn list(&self) -> Result<Vec<ActorSheet>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepo: Send + Sync {
    async fn get(&self, id: ItemId) -> Result<Option<AttackItem>, RepoError>;
    async fn save(&self, item: &AttackItem) -> Result<(), RepoError>;
}

/// Every actor's updates from one resolution, keyed and ordered by actor.
pub type ActorBatches = BTreeMap<ActorId, Vec<ActorUpdate>>;

/// Commits actor updates produced by a resolution.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersistencePort: Send + Sync {
    /// Apply every batch as one write across all the actors involved.
    /// Either every update lands or none do. Returns the stored sheets in
    /// actor id order.
    async fn apply_resolution(
        &self,
        batches: ActorBatches,
    ) -> Result<Vec<ActorSheet>, PersistenceError>;
}
