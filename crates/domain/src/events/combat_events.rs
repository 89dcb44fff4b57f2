//! Combat-related domain events
//!
//! The resolvers never touch actor state. They return these values instead:
//! `CombatEffect`s for the apply stage to persist, and `DataWarning`s for
//! the caller to log.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::ActorCondition;
use crate::value_objects::Edition;
use crate::ActorId;

/// One change to one actor, as the persistence layer receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActorUpdate {
    /// Body and Stun lost
    Damage { body: i32, stun: i32 },
    CharacteristicDelta { key: String, delta: i32 },
    PowerStateChange { power: String, delta: i32 },
    Condition(ActorCondition),
}

impl ActorUpdate {
    /// Updates that change nothing are dropped before persisting.
    pub fn is_noop(&self) -> bool {
        match self {
            Self::Damage { body, stun } => *body == 0 && *stun == 0,
            Self::CharacteristicDelta { delta, .. } | Self::PowerStateChange { delta, .. } => {
                *delta == 0
            }
            Self::Condition(_) => false,
        }
    }
}

/// A side effect produced by resolution, addressed to an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatEffect {
    pub actor: ActorId,
    pub update: ActorUpdate,
}

impl CombatEffect {
    pub fn damage(actor: ActorId, body: i32, stun: i32) -> Self {
        Self {
            actor,
            update: ActorUpdate::Damage { body, stun },
        }
    }

    pub fn characteristic(actor: ActorId, key: impl Into<String>, delta: i32) -> Self {
        Self {
            actor,
            update: ActorUpdate::CharacteristicDelta {
                key: key.into(),
                delta,
            },
        }
    }

    pub fn power(actor: ActorId, power: impl Into<String>, delta: i32) -> Self {
        Self {
            actor,
            update: ActorUpdate::PowerStateChange {
                power: power.into(),
                delta,
            },
        }
    }

    pub fn condition(actor: ActorId, condition: ActorCondition) -> Self {
        Self {
            actor,
            update: ActorUpdate::Condition(condition),
        }
    }
}

/// Problems with stored character data that do not stop resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataWarning {
    UnknownModifier {
        item: String,
        modifier: String,
    },
    UnknownModifierOption {
        item: String,
        modifier: String,
        option: String,
    },
    ModifierNotInEdition {
        item: String,
        modifier: String,
        edition: Edition,
    },
    /// Variable effect with an advantage value outside the known tiers
    UnknownVariableEffectCost {
        item: String,
        cost: f64,
    },
    /// Adjustment targets past the simultaneous-effect cap
    SkippedAdjustmentTargets {
        item: String,
        skipped: Vec<String>,
    },
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownModifier { item, modifier } => {
                write!(f, "{}: unknown modifier {} has no effect", item, modifier)
            }
            Self::UnknownModifierOption {
                item,
                modifier,
                option,
            } => write!(
                f,
                "{}: unknown option {} on {}, using the default",
                item, option, modifier
            ),
            Self::ModifierNotInEdition {
                item,
                modifier,
                edition,
            } => write!(f, "{}: {} does not exist in {}", item, modifier, edition),
            Self::UnknownVariableEffectCost { item, cost } => write!(
                f,
                "{}: variable effect cost {} is not a known tier, affecting one target",
                item, cost
            ),
            Self::SkippedAdjustmentTargets { item, skipped } => write!(
                f,
                "{}: cannot affect {} at once",
                item,
                skipped.join(", ")
            ),
        }
    }
}

/// Outcome of a success roll against one defender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HitOutcome {
    /// Hit by the given margin
    Hit { margin: i32 },
    /// Missed by the given margin (negative)
    Miss { margin: i32 },
    /// Natural 3
    AutomaticHit,
    /// Natural 18
    AutomaticMiss,
    /// Area attack that needs no roll against this target
    AreaHit,
}

impl HitOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. } | Self::AutomaticHit | Self::AreaHit)
    }
}
