//! Actor sheet - the combat-relevant slice of a character
//!
//! Only what the resolvers read is modeled here: characteristics, a flat
//! power list, and active conditions. Everything else about a character
//! lives with whatever system owns the full record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::events::ActorUpdate;
use crate::value_objects::Edition;
use crate::{ActorId, PowerId};

/// Conditions the combat pipeline reads or grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActorCondition {
    Stunned,
    KnockedDown,
    KnockedBack,
    /// Flying or otherwise off the ground; less knockback
    Airborne,
    /// More knockback
    Underwater,
    /// Automaton-style immunity to Stun
    TakesNoStun,
}

impl fmt::Display for ActorCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Stunned => "Stunned",
            Self::KnockedDown => "Knocked Down",
            Self::KnockedBack => "Knocked Back",
            Self::Airborne => "Airborne",
            Self::Underwater => "Underwater",
            Self::TakesNoStun => "Takes No Stun",
        };
        write!(f, "{}", label)
    }
}

/// A power on the sheet, as adjustment powers see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerEntry {
    #[serde(default)]
    pub id: PowerId,
    /// Name the player gave it ("Fire Blast")
    pub name: String,
    /// Rules type ("ENERGYBLAST", "FLIGHT")
    pub power_type: String,
    #[serde(default)]
    pub active_points: i32,
    /// Net points added or drained by adjustment powers
    #[serde(default)]
    pub adjustment: i32,
}

impl PowerEntry {
    pub fn new(name: impl Into<String>, power_type: impl Into<String>, active_points: i32) -> Self {
        Self {
            id: PowerId::new(),
            name: name.into(),
            power_type: power_type.into(),
            active_points,
            adjustment: 0,
        }
    }

    pub fn effective_points(&self) -> i32 {
        self.active_points + self.adjustment
    }
}

/// Combat-facing view of one character.
///
/// Characteristic keys are stored upper-case; lookups ignore case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorSheet {
    #[serde(default)]
    pub id: ActorId,
    pub name: String,
    #[serde(default)]
    pub edition: Edition,
    #[serde(default)]
    pub characteristics: BTreeMap<String, i32>,
    #[serde(default)]
    pub powers: Vec<PowerEntry>,
    #[serde(default)]
    pub conditions: Vec<ActorCondition>,
    /// Whether the actor is placed on the scene
    #[serde(default = "default_true")]
    pub has_token: bool,
}

fn default_true() -> bool {
    true
}

impl ActorSheet {
    pub fn new(name: impl Into<String>, edition: Edition) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            edition,
            characteristics: BTreeMap::new(),
            powers: Vec::new(),
            conditions: Vec::new(),
            has_token: true,
        }
    }

    pub fn with_characteristic(mut self, key: &str, value: i32) -> Self {
        self.characteristics.insert(normalize_key(key), value);
        self
    }

    pub fn with_power(mut self, power: PowerEntry) -> Self {
        self.powers.push(power);
        self
    }

    pub fn with_condition(mut self, condition: ActorCondition) -> Self {
        self.add_condition(condition);
        self
    }

    pub fn without_token(mut self) -> Self {
        self.has_token = false;
        self
    }

    pub fn characteristic(&self, key: &str) -> Option<i32> {
        self.characteristics.get(&normalize_key(key)).copied()
    }

    pub fn has_characteristic(&self, key: &str) -> bool {
        self.characteristics.contains_key(&normalize_key(key))
    }

    /// Power whose player-facing name matches exactly (case-insensitive).
    pub fn power_named(&self, name: &str) -> Option<&PowerEntry> {
        let name = name.trim();
        self.powers
            .iter()
            .find(|p| p.name.trim().eq_ignore_ascii_case(name))
    }

    /// Power matching by name first, then by rules type.
    pub fn find_power(&self, identifier: &str) -> Option<&PowerEntry> {
        let identifier = identifier.trim();
        self.power_named(identifier).or_else(|| {
            self.powers
                .iter()
                .find(|p| p.power_type.eq_ignore_ascii_case(identifier))
        })
    }

    pub fn has_condition(&self, condition: ActorCondition) -> bool {
        self.conditions.contains(&condition)
    }

    pub fn add_condition(&mut self, condition: ActorCondition) {
        if !self.has_condition(condition) {
            self.conditions.push(condition);
        }
    }

    /// Adds `delta` to a characteristic, creating it at zero when absent.
    /// Returns the new value.
    pub fn adjust_characteristic(&mut self, key: &str, delta: i32) -> i32 {
        let value = self.characteristics.entry(normalize_key(key)).or_insert(0);
        *value += delta;
        *value
    }

    /// Adds `delta` to a power's adjustment. Returns the power's new
    /// effective points, or `None` when the sheet has no such power.
    pub fn adjust_power(&mut self, identifier: &str, delta: i32) -> Option<i32> {
        let identifier = identifier.trim();
        let index = self
            .powers
            .iter()
            .position(|p| p.name.trim().eq_ignore_ascii_case(identifier))
            .or_else(|| {
                self.powers
                    .iter()
                    .position(|p| p.power_type.eq_ignore_ascii_case(identifier))
            })?;
        let power = &mut self.powers[index];
        power.adjustment += delta;
        Some(power.effective_points())
    }

    /// Current value of whatever `identifier` names: a characteristic, or a
    /// power's effective points.
    pub fn current_value(&self, identifier: &str) -> Option<i32> {
        self.characteristic(identifier)
            .or_else(|| self.find_power(identifier).map(PowerEntry::effective_points))
    }

    /// Apply one persisted update. Returns false when the update targets a
    /// power this sheet does not have.
    pub fn apply(&mut self, update: &ActorUpdate) -> bool {
        match update {
            ActorUpdate::Damage { body, stun } => {
                self.adjust_characteristic("BODY", -body);
                self.adjust_characteristic("STUN", -stun);
                true
            }
            ActorUpdate::CharacteristicDelta { key, delta } => {
                self.adjust_characteristic(key, *delta);
                true
            }
            ActorUpdate::PowerStateChange { power, delta } => {
                self.adjust_power(power, *delta).is_some()
            }
            ActorUpdate::Condition(condition) => {
                self.add_condition(*condition);
                true
            }
        }
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_uppercase()
}
