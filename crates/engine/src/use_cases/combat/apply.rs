//! Apply stage: commits a resolution's effects and pays its costs.

use std::sync::Arc;

use herocombat_domain::{ActorSheet, AttackItem, CombatEffect};

use crate::infrastructure::ports::{ItemRepo, PersistenceError};
use crate::infrastructure::update_queue::ActorUpdateQueue;

/// Effects the attacker pays for using `item`: END spent.
pub fn resource_effects(attacker: &ActorSheet, item: &AttackItem) -> Vec<CombatEffect> {
    if item.end_cost > 0 {
        vec![CombatEffect::characteristic(
            attacker.id,
            "END",
            -item.end_cost,
        )]
    } else {
        Vec::new()
    }
}

pub struct ApplyResolution {
    queue: Arc<ActorUpdateQueue>,
    items: Arc<dyn ItemRepo>,
}

impl ApplyResolution {
    pub fn new(queue: Arc<ActorUpdateQueue>, items: Arc<dyn ItemRepo>) -> Self {
        Self { queue, items }
    }

    /// Spend one charge from `item` if it has any, then commit `effects`.
    ///
    /// The two land together. A failed charge write stops before any actor
    /// changes, and a failed commit gives the charge back.
    pub async fn execute(
        &self,
        effects: &[CombatEffect],
        item: &AttackItem,
    ) -> Result<Vec<ActorSheet>, PersistenceError> {
        if let Some(charges) = item.charges {
            let mut spent = item.clone();
            spent.charges = Some(charges.saturating_sub(1));
            self.items.save(&spent).await?;
        }

        match self.queue.commit(effects).await {
            Ok(saved) => {
                if let Some(charges) = item.charges {
                    tracing::debug!(
                        item = %item.name,
                        remaining = charges.saturating_sub(1),
                        "Charge used"
                    );
                }
                Ok(saved)
            }
            Err(err) => {
                if item.charges.is_some() {
                    if let Err(restore) = self.items.save(item).await {
                        tracing::error!(
                            item = %item.name,
                            error = %restore,
                            "Could not give back a charge after a failed commit"
                        );
                    }
                }
                Err(err)
            }
        }
    }
}
