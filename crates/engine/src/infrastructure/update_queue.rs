//! Per-actor serialization of committed updates.
//!
//! Two resolutions touching the same actor must not interleave their
//! writes. Each actor gets a lock; a commit takes every lock it needs in
//! id order, then hands every actor's batch to storage as one write.

use std::sync::Arc;

use dashmap::DashMap;
use herocombat_domain::{ActorId, ActorSheet, CombatEffect};
use tokio::sync::Mutex;

use crate::infrastructure::ports::{ActorBatches, PersistenceError, PersistencePort};

pub struct ActorUpdateQueue {
    locks: DashMap<ActorId, Arc<Mutex<()>>>,
    persistence: Arc<dyn PersistencePort>,
}

impl ActorUpdateQueue {
    pub fn new(persistence: Arc<dyn PersistencePort>) -> Self {
        Self {
            locks: DashMap::new(),
            persistence,
        }
    }

    fn lock_for(&self, actor: ActorId) -> Arc<Mutex<()>> {
        self.locks
            .entry(actor)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Group effects by actor and write them all at once.
    ///
    /// Effects that change nothing are dropped. A failure leaves every
    /// actor as it was. Returns the sheets as stored after the write, in
    /// actor id order.
    pub async fn commit(
        &self,
        effects: &[CombatEffect],
    ) -> Result<Vec<ActorSheet>, PersistenceError> {
        let mut batches = ActorBatches::new();
        for effect in effects.iter().filter(|e| !e.update.is_noop()) {
            batches
                .entry(effect.actor)
                .or_default()
                .push(effect.update.clone());
        }
        if batches.is_empty() {
            return Ok(Vec::new());
        }

        // BTreeMap keys are sorted, so every commit locks in the same order
        let mut guards = Vec::with_capacity(batches.len());
        for actor in batches.keys() {
            guards.push(self.lock_for(*actor).lock_owned().await);
        }

        tracing::debug!(
            actors = batches.len(),
            updates = batches.values().map(Vec::len).sum::<usize>(),
            "Committing actor updates"
        );
        let saved = self.persistence.apply_resolution(batches).await;
        drop(guards);
        saved
    }

    /// Number of actors that have ever been locked.
    pub fn tracked_actors(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryActors;
    use crate::infrastructure::ports::{ActorRepo, MockPersistencePort};
    use herocombat_domain::{ActorCondition, Edition};
    use uuid::Uuid;

    #[tokio::test]
    async fn groups_effects_per_actor() {
        let first = ActorId::new();
        let second = ActorId::new();

        let mut persistence = MockPersistencePort::new();
        persistence
            .expect_apply_resolution()
            .times(1)
            .returning(|batches| {
                Ok(batches
                    .into_iter()
                    .map(|(actor, updates)| {
                        let mut sheet = ActorSheet::new("Target", Edition::Sixth);
                        sheet.id = actor;
                        for update in &updates {
                            sheet.apply(update);
                        }
                        sheet
                    })
                    .collect())
            });

        let queue = ActorUpdateQueue::new(Arc::new(persistence));
        let saved = queue
            .commit(&[
                CombatEffect::damage(first, 3, 12),
                CombatEffect::condition(second, ActorCondition::KnockedDown),
                CombatEffect::condition(first, ActorCondition::Stunned),
                CombatEffect::damage(second, 0, 0),
            ])
            .await
            .expect("commit");

        assert_eq!(saved.len(), 2);
        assert_eq!(queue.tracked_actors(), 2);
        let first_sheet = saved
            .iter()
            .find(|s| s.id == first)
            .expect("first actor saved");
        assert_eq!(first_sheet.characteristic("STUN"), Some(-12));
        assert!(first_sheet.has_condition(ActorCondition::Stunned));
    }

    #[tokio::test]
    async fn nothing_to_commit_skips_persistence() {
        let persistence = MockPersistencePort::new();
        let queue = ActorUpdateQueue::new(Arc::new(persistence));
        let saved = queue
            .commit(&[CombatEffect::damage(ActorId::new(), 0, 0)])
            .await
            .expect("commit");
        assert!(saved.is_empty());
        assert_eq!(queue.tracked_actors(), 0);
    }

    #[tokio::test]
    async fn failure_surfaces() {
        let mut persistence = MockPersistencePort::new();
        persistence
            .expect_apply_resolution()
            .returning(|batches| {
                let actor = batches.keys().next().copied().unwrap_or_default();
                Err(PersistenceError::ActorMissing(actor))
            });
        let queue = ActorUpdateQueue::new(Arc::new(persistence));
        let result = queue
            .commit(&[CombatEffect::damage(ActorId::new(), 1, 1)])
            .await;
        assert!(matches!(result, Err(PersistenceError::ActorMissing(_))));
    }

    #[tokio::test]
    async fn failed_commit_leaves_every_actor_unchanged() {
        // The stored actor sorts first, so its batch is staged before the
        // missing one fails
        let mut stored = ActorSheet::new("Ogre", Edition::Sixth).with_characteristic("STUN", 20);
        stored.id = ActorId::from_uuid(Uuid::from_u128(1));
        let stored_id = stored.id;
        let vanished = ActorId::from_uuid(Uuid::from_u128(u128::MAX));
        let actors = Arc::new(InMemoryActors::new([stored]));
        let queue = ActorUpdateQueue::new(actors.clone());

        let result = queue
            .commit(&[
                CombatEffect::damage(stored_id, 1, 10),
                CombatEffect::damage(vanished, 1, 10),
            ])
            .await;

        assert!(matches!(result, Err(PersistenceError::ActorMissing(id)) if id == vanished));
        let after = actors.get(stored_id).await.expect("get").expect("present");
        assert_eq!(after.characteristic("STUN"), Some(20));
    }
}
