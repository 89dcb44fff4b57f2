//! In-memory adapters for actors, items, and defenses.
//!
//! Used by the scenario runner and by tests. Each store sits behind a tokio
//! `RwLock`; `apply_resolution` applies every batch to copies under one
//! write lock and only stores them when every update succeeded.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use herocombat_domain::{ActorId, ActorSheet, AttackItem, DefenseProfile, DefenseTag, ItemId};

use crate::infrastructure::ports::{
    ActorBatches, ActorRepo, DefenseOptions, DefensePort, ItemRepo, PersistenceError,
    PersistencePort, RepoError,
};

// =============================================================================
// Actors
// =============================================================================

#[derive(Default)]
pub struct InMemoryActors {
    actors: RwLock<HashMap<ActorId, ActorSheet>>,
}

impl InMemoryActors {
    pub fn new(sheets: impl IntoIterator<Item = ActorSheet>) -> Self {
        Self {
            actors: RwLock::new(sheets.into_iter().map(|s| (s.id, s)).collect()),
        }
    }

    pub async fn insert(&self, sheet: ActorSheet) {
        self.actors.write().await.insert(sheet.id, sheet);
    }
}

#[async_trait]
impl ActorRepo for InMemoryActors {
    async fn get(&self, id: ActorId) -> Result<Option<ActorSheet>, RepoError> {
        Ok(self.actors.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<ActorSheet>, RepoError> {
        let mut sheets: Vec<ActorSheet> = self.actors.read().await.values().cloned().collect();
        sheets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sheets)
    }
}

#[async_trait]
impl PersistencePort for InMemoryActors {
    async fn apply_resolution(
        &self,
        batches: ActorBatches,
    ) -> Result<Vec<ActorSheet>, PersistenceError> {
        let mut actors = self.actors.write().await;

        let mut staged = Vec::with_capacity(batches.len());
        for (actor, updates) in &batches {
            let mut sheet = actors
                .get(actor)
                .cloned()
                .ok_or(PersistenceError::ActorMissing(*actor))?;
            for update in updates {
                if !sheet.apply(update) {
                    return Err(PersistenceError::Rejected {
                        actor: *actor,
                        reason: format!("{} has nothing matching {:?}", sheet.name, update),
                    });
                }
            }
            staged.push(sheet);
        }

        for sheet in &staged {
            actors.insert(sheet.id, sheet.clone());
        }
        Ok(staged)
    }
}

// =============================================================================
// Items
// =============================================================================

#[derive(Default)]
pub struct InMemoryItems {
    items: RwLock<HashMap<ItemId, AttackItem>>,
}

impl InMemoryItems {
    pub fn new(items: impl IntoIterator<Item = AttackItem>) -> Self {
        Self {
            items: RwLock::new(items.into_iter().map(|i| (i.id, i)).collect()),
        }
    }
}

#[async_trait]
impl ItemRepo for InMemoryItems {
    async fn get(&self, id: ItemId) -> Result<Option<AttackItem>, RepoError> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn save(&self, item: &AttackItem) -> Result<(), RepoError> {
        self.items.write().await.insert(item.id, item.clone());
        Ok(())
    }
}

// =============================================================================
// Defenses
// =============================================================================

/// Which part of a [`DefenseProfile`] a defense adds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DefenseField {
    Normal,
    Resistant,
    Impenetrable,
    DamageReduction,
    DamageNegation,
    KnockbackResistance,
    Hardened,
}

/// One listed defense on an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefenseEntry {
    pub source_id: String,
    pub name: String,
    pub field: DefenseField,
    pub value: u32,
}

impl DefenseEntry {
    pub fn new(
        source_id: impl Into<String>,
        name: impl Into<String>,
        field: DefenseField,
        value: u32,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            name: name.into(),
            field,
            value,
        }
    }
}

/// Sums each actor's listed defenses, skipping the ones the attacker chose
/// to ignore.
#[derive(Default)]
pub struct ListedDefenses {
    entries: HashMap<ActorId, Vec<DefenseEntry>>,
}

impl ListedDefenses {
    pub fn new(entries: HashMap<ActorId, Vec<DefenseEntry>>) -> Self {
        Self { entries }
    }

    pub fn profile_for(
        &self,
        actor: ActorId,
        options: &DefenseOptions,
    ) -> (DefenseProfile, Vec<DefenseTag>) {
        let mut profile = DefenseProfile::default();
        let mut tags = Vec::new();
        let entries = self.entries.get(&actor).map(Vec::as_slice).unwrap_or(&[]);

        for entry in entries.iter().filter(|e| !options.ignores(&e.source_id)) {
            let slot = match entry.field {
                DefenseField::Normal => &mut profile.normal,
                DefenseField::Resistant => &mut profile.resistant,
                DefenseField::Impenetrable => &mut profile.impenetrable,
                DefenseField::DamageReduction => &mut profile.damage_reduction_percent,
                DefenseField::DamageNegation => &mut profile.damage_negation_dc,
                DefenseField::KnockbackResistance => &mut profile.knockback_resistance,
                DefenseField::Hardened => &mut profile.hardened,
            };
            *slot += entry.value;
            tags.push(DefenseTag::new(
                entry.source_id.clone(),
                entry.name.clone(),
                entry.value as i32,
            ));
        }
        profile.damage_reduction_percent = profile.damage_reduction_percent.min(100);
        (profile, tags)
    }
}

#[async_trait]
impl DefensePort for ListedDefenses {
    async fn determine_defense(
        &self,
        target: &ActorSheet,
        _item: &AttackItem,
        options: &DefenseOptions,
    ) -> Result<(DefenseProfile, Vec<DefenseTag>), RepoError> {
        Ok(self.profile_for(target.id, options))
    }
}
