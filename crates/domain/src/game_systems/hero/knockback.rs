//! Knockback.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::ActorCondition;
use crate::events::CombatEffect;
use crate::value_objects::{Basic, Edition, RandomSource, Roll, RollSpec};
use crate::ActorId;

const BASE_POOL: i32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KnockbackInput {
    /// Body before defenses
    pub body: i32,
    /// 0 = none, 1 = normal, 2 = double
    pub multiplier: u8,
    pub resistance: u32,
    pub airborne: bool,
    pub underwater: bool,
    pub killing: bool,
    pub martial: bool,
    pub edition: Edition,
}

impl KnockbackInput {
    /// Dice subtracted from the knockback total, never below zero.
    pub fn pool(&self) -> u32 {
        let pool = BASE_POOL - i32::from(self.airborne)
            + i32::from(self.underwater)
            + i32::from(self.killing)
            + i32::from(self.martial);
        pool.max(0) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KnockbackResult {
    NoKnockback,
    Knockdown,
    /// Distance in the edition's unit
    KnockedBack { distance: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct KnockbackOutcome {
    pub result: KnockbackResult,
    pub roll: Roll<Basic>,
    pub unit: &'static str,
}

impl KnockbackOutcome {
    pub fn condition(&self) -> Option<ActorCondition> {
        match self.result {
            KnockbackResult::NoKnockback => None,
            KnockbackResult::Knockdown => Some(ActorCondition::KnockedDown),
            KnockbackResult::KnockedBack { .. } => Some(ActorCondition::KnockedBack),
        }
    }

    pub fn effect(&self, target: ActorId) -> Option<CombatEffect> {
        self.condition()
            .map(|condition| CombatEffect::condition(target, condition))
    }
}

impl fmt::Display for KnockbackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.result {
            KnockbackResult::NoKnockback => write!(f, "No Knockback"),
            KnockbackResult::Knockdown => write!(f, "Inflicts Knockdown"),
            KnockbackResult::KnockedBack { distance } => {
                write!(f, "Knocked Back {}{}", distance, self.unit)
            }
        }
    }
}

/// Roll knockback. Returns `None` without touching the source when the
/// attack does no knockback.
pub fn resolve_knockback<R: RandomSource + ?Sized>(
    input: KnockbackInput,
    source: &mut R,
) -> Option<KnockbackOutcome> {
    if input.multiplier == 0 {
        return None;
    }

    let roll = RollSpec::<Basic>::new(input.edition)
        .add_number(input.body * i32::from(input.multiplier), "Body")
        .sub_number(input.resistance as i32, "Knockback Resistance")
        .sub_labeled_dice(input.pool(), "Knockback")
        .roll(source);

    let total = roll.basic_total();
    let result = match total {
        t if t < 0 => KnockbackResult::NoKnockback,
        0 => KnockbackResult::Knockdown,
        t => KnockbackResult::KnockedBack {
            distance: t * input.edition.knockback_scale(),
        },
    };

    Some(KnockbackOutcome {
        result,
        roll,
        unit: input.edition.distance_unit(),
    })
}
