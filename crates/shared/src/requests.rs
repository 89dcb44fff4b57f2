//! Attack requests sent to the engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use herocombat_domain::game_systems::hero::SituationalModifiers;

/// One attack: who, with what, at whom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackRequest {
    pub attacker_id: Uuid,
    pub item_id: Uuid,
    #[serde(default)]
    pub targets: Vec<TargetRequest>,
    #[serde(default)]
    pub modifiers: SituationalModifiers,
    /// Placed area template, for area attacks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateData>,
    #[serde(default)]
    pub options: AttackOptions,
}

impl AttackRequest {
    pub fn new(attacker_id: Uuid, item_id: Uuid) -> Self {
        Self {
            attacker_id,
            item_id,
            targets: Vec::new(),
            modifiers: SituationalModifiers::default(),
            template: None,
            options: AttackOptions::default(),
        }
    }

    pub fn with_target(mut self, target: TargetRequest) -> Self {
        self.targets.push(target);
        self
    }

    pub fn with_template(mut self, size: f64) -> Self {
        self.template = Some(TemplateData { size });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRequest {
    pub actor_id: Uuid,
    /// Distance from the attacker in the edition's unit
    #[serde(default)]
    pub distance: f64,
    /// Distance from an explosion's center
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_from_origin: Option<f64>,
    /// Defenses the attacker chose to ignore for this target
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_defense_ids: Vec<String>,
}

impl TargetRequest {
    pub fn new(actor_id: Uuid, distance: f64) -> Self {
        Self {
            actor_id,
            distance,
            distance_from_origin: None,
            ignore_defense_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateData {
    pub size: f64,
}

/// Per-attack overrides of the engine settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttackOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_hit_locations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knockback: Option<bool>,
    pub standard_effect: bool,
    /// Roll to hit but stop before damage
    pub to_hit_only: bool,
    /// Body dealt by the attack an absorption power is soaking up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming_body: Option<i32>,
}
