//! HERO System combat rules, 5th and 6th edition.
//!
//! Each resolver is a pure function over typed rolls and sheets. None of
//! them touch persistence; they hand back effects for the caller to apply.

mod adjustment;
mod damage;
mod knockback;
mod to_hit;

pub use adjustment::{
    resolve_adjustment, simultaneous_cap, AbsorptionInput, AdjustmentError, AdjustmentOutcome,
    AdjustmentRequest, AdjustmentResult, AdjustmentSpec,
};
pub use damage::{
    explosion_falloff, is_stunned, resolve_damage, roll_damage, DamageNote, DamageOutcome,
    DamageRequest, DamageRollOptions, KnockbackSituation,
};
pub use knockback::{resolve_knockback, KnockbackInput, KnockbackOutcome, KnockbackResult};
pub use to_hit::{
    check_resources, offset_penalty, range_penalty, resolve_to_hit, AreaTemplate, AttackFailure,
    LabeledModifier, PenaltyOffset, PenaltySkillLevels, SituationalModifiers, TargetHit,
    ToHitRequest, ToHitResult, ToHitTarget,
};

use super::traits::GameSystem;
use crate::value_objects::Edition;

/// One edition of the HERO System rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeroSystem {
    edition: Edition,
}

impl HeroSystem {
    pub fn new(edition: Edition) -> Self {
        Self { edition }
    }

    pub fn fifth() -> Self {
        Self::new(Edition::Fifth)
    }

    pub fn sixth() -> Self {
        Self::new(Edition::Sixth)
    }
}

impl Default for HeroSystem {
    fn default() -> Self {
        Self::new(Edition::default())
    }
}

impl GameSystem for HeroSystem {
    fn system_id(&self) -> &str {
        self.edition.system_id()
    }

    fn display_name(&self) -> &str {
        match self.edition {
            Edition::Fifth => "HERO System 5th Edition",
            Edition::Sixth => "HERO System 6th Edition",
        }
    }

    fn edition(&self) -> Edition {
        self.edition
    }

    fn stat_names(&self) -> &[&str] {
        self.edition.characteristics()
    }
}
