//! Defense values applied against one attack.
//!
//! Produced by the defense port for a (target, attack) pair; consumed by the
//! damage and knockback resolvers.

use serde::{Deserialize, Serialize};

use super::rounding::round_favor_player_up;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefenseProfile {
    pub normal: u32,
    pub resistant: u32,
    /// Portion of defense that penetrating damage cannot get through
    pub impenetrable: u32,
    pub damage_reduction_percent: u32,
    /// Damage classes stripped from the attack before it is read
    pub damage_negation_dc: u32,
    pub knockback_resistance: u32,
    /// Levels of Hardened; armor piercing needs more levels than this
    pub hardened: u32,
}

impl DefenseProfile {
    pub fn new(normal: u32, resistant: u32) -> Self {
        Self {
            normal,
            resistant,
            ..Self::default()
        }
    }

    pub fn with_impenetrable(mut self, value: u32) -> Self {
        self.impenetrable = value;
        self
    }

    pub fn with_damage_reduction(mut self, percent: u32) -> Self {
        self.damage_reduction_percent = percent.min(100);
        self
    }

    pub fn with_damage_negation(mut self, dc: u32) -> Self {
        self.damage_negation_dc = dc;
        self
    }

    pub fn with_knockback_resistance(mut self, value: u32) -> Self {
        self.knockback_resistance = value;
        self
    }

    pub fn with_hardened(mut self, levels: u32) -> Self {
        self.hardened = levels;
        self
    }

    pub fn total(&self) -> i32 {
        (self.normal + self.resistant) as i32
    }

    /// Whether armor piercing at `levels` gets past this defense's hardening.
    pub fn is_pierced_by(&self, levels: u32) -> bool {
        levels > 0 && levels > self.hardened
    }

    /// Normal and resistant defense halved, remainder kept by the defender.
    pub fn halved(&self) -> Self {
        let half = |v: u32| round_favor_player_up(f64::from(v) / 2.0).max(0) as u32;
        Self {
            normal: half(self.normal),
            resistant: half(self.resistant),
            ..self.clone()
        }
    }
}

/// Human-readable breakdown of where a defense value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefenseTag {
    /// Id of the power or characteristic; used by `ignore_defense_ids`
    pub source_id: String,
    pub name: String,
    pub value: i32,
    pub title: String,
}

impl DefenseTag {
    pub fn new(source_id: impl Into<String>, name: impl Into<String>, value: i32) -> Self {
        let name = name.into();
        Self {
            source_id: source_id.into(),
            title: format!("{} {:+}", name, value),
            name,
            value,
        }
    }
}
