//! Scenario files for the runner.
//!
//! A scenario lists actors (with their defenses), attack items, and the
//! attacks to resolve in order. Ids are fixed in the file so attacks can
//! refer to them.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use herocombat_domain::{ActorSheet, AttackItem, Edition};
use herocombat_shared::AttackRequest;

use super::memory::{DefenseEntry, InMemoryActors, InMemoryItems, ListedDefenses};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid scenario {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioActor {
    #[serde(flatten)]
    pub sheet: ActorSheet,
    #[serde(default)]
    pub defenses: Vec<DefenseEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Overrides `HERO_EDITION` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<Edition>,
    #[serde(default)]
    pub actors: Vec<ScenarioActor>,
    #[serde(default)]
    pub items: Vec<AttackItem>,
    #[serde(default)]
    pub attacks: Vec<AttackRequest>,
}

/// In-memory stores built from a scenario.
pub struct ScenarioStores {
    pub actors: InMemoryActors,
    pub items: InMemoryItems,
    pub defenses: ListedDefenses,
    pub attacks: Vec<AttackRequest>,
}

impl Scenario {
    pub async fn load(path: &Path) -> Result<Self, ScenarioError> {
        let display = path.display().to_string();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ScenarioError::Io {
                path: display.clone(),
                source,
            })?;
        Self::parse(&text).map_err(|source| ScenarioError::Parse {
            path: display,
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn into_stores(self) -> ScenarioStores {
        let mut defenses = HashMap::new();
        let mut sheets = Vec::with_capacity(self.actors.len());
        for actor in self.actors {
            defenses.insert(actor.sheet.id, actor.defenses);
            sheets.push(actor.sheet);
        }
        ScenarioStores {
            actors: InMemoryActors::new(sheets),
            items: InMemoryItems::new(self.items),
            defenses: ListedDefenses::new(defenses),
            attacks: self.attacks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{ActorRepo, DefenseOptions, ItemRepo};
    use herocombat_domain::{ActorId, AttackKind, ItemId};

    const SCENARIO: &str = r#"{
        "edition": "fifth",
        "actors": [
            {
                "id": "00000000-0000-4000-8000-000000000001",
                "name": "Blaster",
                "characteristics": {"OCV": 7, "END": 30}
            },
            {
                "id": "00000000-0000-4000-8000-000000000002",
                "name": "Ogre",
                "characteristics": {"DCV": 4, "CON": 20, "BODY": 15, "STUN": 40},
                "defenses": [
                    {"sourceId": "pd", "name": "PD", "field": "normal", "value": 8}
                ]
            }
        ],
        "items": [
            {
                "id": "00000000-0000-4000-8000-0000000000a1",
                "name": "Plasma Bolt",
                "kind": "normal",
                "dice": {"dice": 8},
                "endCost": 4
            }
        ],
        "attacks": [
            {
                "attackerId": "00000000-0000-4000-8000-000000000001",
                "itemId": "00000000-0000-4000-8000-0000000000a1",
                "targets": [{"actorId": "00000000-0000-4000-8000-000000000002", "distance": 10}]
            }
        ]
    }"#;

    #[tokio::test]
    async fn builds_stores_from_json() {
        let scenario = Scenario::parse(SCENARIO).expect("parse");
        assert_eq!(scenario.edition, Some(Edition::Fifth));

        let ogre_id = ActorId::from(
            uuid::Uuid::parse_str("00000000-0000-4000-8000-000000000002").expect("uuid"),
        );
        let item_id = ItemId::from(
            uuid::Uuid::parse_str("00000000-0000-4000-8000-0000000000a1").expect("uuid"),
        );

        let stores = scenario.into_stores();
        let ogre = stores.actors.get(ogre_id).await.expect("get").expect("ogre");
        assert_eq!(ogre.characteristic("CON"), Some(20));
        assert_eq!(stores.actors.list().await.expect("list").len(), 2);

        let bolt = stores.items.get(item_id).await.expect("get").expect("bolt");
        assert_eq!(bolt.kind, AttackKind::Normal);
        assert_eq!(bolt.end_cost, 4);

        let (defense, _) = stores.defenses.profile_for(ogre_id, &DefenseOptions::default());
        assert_eq!(defense.normal, 8);
        assert_eq!(stores.attacks.len(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let result = Scenario::load(Path::new("/nonexistent/scenario.json")).await;
        assert!(matches!(result, Err(ScenarioError::Io { .. })));
    }
}
