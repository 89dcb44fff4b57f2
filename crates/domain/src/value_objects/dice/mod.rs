//! Dice for the HERO System: d6 pools with typed flavors.
//!
//! Build a [`RollSpec`], roll it once against a [`RandomSource`], then read
//! the totals its flavor allows. [`DamageRoll`] wraps the damage-capable
//! flavors for code that only learns the flavor at runtime.

mod formula;
mod kind;
mod record;
mod roll;
mod source;
mod term;

pub use formula::{DamageDice, DiceParseError};
pub use kind::{
    Adjustment, Basic, DamageKind, Entangle, Flash, Killing, Normal, RollFlavor, RollKind, Success,
};
pub use record::{AuditTerm, AuditTotal, RollAudit, RollError, RollRecord};
pub use roll::{Roll, RollModifiers, RollSpec, StunMultiplierRoll, SubRolls};
pub use source::RandomSource;
pub use term::{normal_body_for_value, RollTerm, TermKind};

#[cfg(test)]
pub(crate) use source::ScriptedDice;

use super::hit_location::HitLocationRoll;

/// A rolled attack whose flavor is only known at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum DamageRoll {
    Normal(Roll<Normal>),
    Killing(Roll<Killing>),
    Adjustment(Roll<Adjustment>),
    Flash(Roll<Flash>),
    Entangle(Roll<Entangle>),
}

impl DamageRoll {
    pub fn flavor(&self) -> RollFlavor {
        match self {
            DamageRoll::Normal(_) => RollFlavor::Normal,
            DamageRoll::Killing(_) => RollFlavor::Killing,
            DamageRoll::Adjustment(_) => RollFlavor::Adjustment,
            DamageRoll::Flash(_) => RollFlavor::Flash,
            DamageRoll::Entangle(_) => RollFlavor::Entangle,
        }
    }

    pub fn is_killing(&self) -> bool {
        matches!(self, DamageRoll::Killing(_))
    }

    /// Pre-defense Body.
    ///
    /// Flash and entangle read their own total; adjustment counts Body the
    /// way normal damage does.
    pub fn raw_body(&self) -> i32 {
        match self {
            DamageRoll::Normal(roll) => roll.body_total(),
            DamageRoll::Killing(roll) => roll.body_total(),
            DamageRoll::Adjustment(roll) => roll.normal_body_sum().max(0),
            DamageRoll::Flash(roll) => roll.flash_total(),
            DamageRoll::Entangle(roll) => roll.entangle_total(),
        }
    }

    /// Pre-defense Stun, or the amount moved for adjustment powers.
    pub fn raw_stun(&self) -> i32 {
        match self {
            DamageRoll::Normal(roll) => roll.stun_total(),
            DamageRoll::Killing(roll) => roll.stun_total(),
            DamageRoll::Adjustment(roll) => roll.adjustment_total(),
            DamageRoll::Flash(roll) => roll.flash_total(),
            DamageRoll::Entangle(roll) => roll.entangle_total(),
        }
    }

    /// Body counted as if the dice were normal damage.
    pub fn body_for_penetrating(&self) -> i32 {
        match self {
            DamageRoll::Killing(roll) => roll.reinterpret::<Normal>().body_total(),
            other => other.raw_body(),
        }
    }

    pub fn stun_multiplier(&self) -> Option<i32> {
        match self {
            DamageRoll::Killing(roll) => Some(roll.stun_multiplier()),
            _ => None,
        }
    }

    pub fn hit_location(&self) -> Option<&HitLocationRoll> {
        match self {
            DamageRoll::Normal(roll) => roll.hit_location(),
            DamageRoll::Killing(roll) => roll.hit_location(),
            _ => None,
        }
    }

    pub fn dice_count(&self) -> usize {
        match self {
            DamageRoll::Normal(roll) => roll.dice_count(),
            DamageRoll::Killing(roll) => roll.dice_count(),
            DamageRoll::Adjustment(roll) => roll.dice_count(),
            DamageRoll::Flash(roll) => roll.dice_count(),
            DamageRoll::Entangle(roll) => roll.dice_count(),
        }
    }

    pub fn without_highest_terms(&self, count: usize) -> Self {
        match self {
            DamageRoll::Normal(roll) => DamageRoll::Normal(roll.without_highest_terms(count)),
            DamageRoll::Killing(roll) => DamageRoll::Killing(roll.without_highest_terms(count)),
            DamageRoll::Adjustment(roll) => {
                DamageRoll::Adjustment(roll.without_highest_terms(count))
            }
            DamageRoll::Flash(roll) => DamageRoll::Flash(roll.without_highest_terms(count)),
            DamageRoll::Entangle(roll) => DamageRoll::Entangle(roll.without_highest_terms(count)),
        }
    }

    pub fn audit(&self) -> RollAudit {
        match self {
            DamageRoll::Normal(roll) => roll.audit(),
            DamageRoll::Killing(roll) => roll.audit(),
            DamageRoll::Adjustment(roll) => roll.audit(),
            DamageRoll::Flash(roll) => roll.audit(),
            DamageRoll::Entangle(roll) => roll.audit(),
        }
    }

    pub fn to_record(&self) -> RollRecord {
        match self {
            DamageRoll::Normal(roll) => roll.to_record(),
            DamageRoll::Killing(roll) => roll.to_record(),
            DamageRoll::Adjustment(roll) => roll.to_record(),
            DamageRoll::Flash(roll) => roll.to_record(),
            DamageRoll::Entangle(roll) => roll.to_record(),
        }
    }

    pub fn from_record(record: RollRecord) -> Result<Self, RollError> {
        match record.flavor {
            RollFlavor::Normal => Roll::from_record(record).map(DamageRoll::Normal),
            RollFlavor::Killing => Roll::from_record(record).map(DamageRoll::Killing),
            RollFlavor::Adjustment => Roll::from_record(record).map(DamageRoll::Adjustment),
            RollFlavor::Flash => Roll::from_record(record).map(DamageRoll::Flash),
            RollFlavor::Entangle => Roll::from_record(record).map(DamageRoll::Entangle),
            other => Err(RollError::NotDamage(other)),
        }
    }
}

impl From<Roll<Normal>> for DamageRoll {
    fn from(roll: Roll<Normal>) -> Self {
        DamageRoll::Normal(roll)
    }
}

impl From<Roll<Killing>> for DamageRoll {
    fn from(roll: Roll<Killing>) -> Self {
        DamageRoll::Killing(roll)
    }
}

impl From<Roll<Adjustment>> for DamageRoll {
    fn from(roll: Roll<Adjustment>) -> Self {
        DamageRoll::Adjustment(roll)
    }
}

impl From<Roll<Flash>> for DamageRoll {
    fn from(roll: Roll<Flash>) -> Self {
        DamageRoll::Flash(roll)
    }
}

impl From<Roll<Entangle>> for DamageRoll {
    fn from(roll: Roll<Entangle>) -> Self {
        DamageRoll::Entangle(roll)
    }
}
