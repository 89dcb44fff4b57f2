//! Damage against defenses.
//!
//! Steps run in a fixed order; moving any of them changes results:
//!
//! 0. damage negation strips dice, armor piercing halves defenses
//! 1. raw Body / Stun
//! 2. reduced penetration
//! 3. knockback, from Body before defenses
//! 4. defenses
//! 5. hit location multipliers
//! 6. damage reduction
//! 7. penetrating floor
//! 8. minimum damage (Stun >= Body)
//! 9. stun-only / body-only / effect-only override

use serde::{Deserialize, Serialize};
use std::fmt;

use super::knockback::{resolve_knockback, KnockbackInput, KnockbackOutcome};
use crate::entities::{
    ActorCondition, ActorSheet, AttackItem, AttackKind, AttackProfile, StunBodyDamage,
};
use crate::events::CombatEffect;
use crate::value_objects::{
    round_favor_player_down, Adjustment, DamageRoll, DefenseProfile, Edition, Entangle, Flash,
    Killing, LocationName, Normal, RandomSource, RollFlavor,
};
use crate::ActorId;

/// Target circumstances that change the knockback pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KnockbackSituation {
    pub airborne: bool,
    pub underwater: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct DamageRequest<'a> {
    pub roll: &'a DamageRoll,
    pub profile: &'a AttackProfile,
    pub defense: &'a DefenseProfile,
    pub situation: KnockbackSituation,
    pub edition: Edition,
}

/// Notes attached to a damage result for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DamageNote {
    DamageNegation { dice_removed: u32 },
    ArmorPiercing,
    ReducedPenetration,
    DamageReduction { percent: u32 },
    PenetratingDamage,
    MinimumDamage,
    StunOnly,
    BodyOnly,
    EffectOnly,
}

impl fmt::Display for DamageNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DamageNegation { dice_removed } => {
                write!(f, "damage negation removed {} dice", dice_removed)
            }
            Self::ArmorPiercing => write!(f, "armor piercing halved defenses"),
            Self::ReducedPenetration => write!(f, "reduced penetration"),
            Self::DamageReduction { percent } => write!(f, "{}% damage reduction", percent),
            Self::PenetratingDamage => write!(f, "penetrating damage"),
            Self::MinimumDamage => write!(f, "minimum damage invoked"),
            Self::StunOnly => write!(f, "does stun only"),
            Self::BodyOnly => write!(f, "does body only"),
            Self::EffectOnly => write!(f, "does effect only"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DamageOutcome {
    pub flavor: RollFlavor,
    pub body: i32,
    pub stun: i32,
    /// Before defenses (after negation)
    pub raw_body: i32,
    pub raw_stun: i32,
    pub body_for_penetrating: i32,
    pub hit_location: Option<String>,
    pub stun_multiplier: Option<i32>,
    pub notes: Vec<DamageNote>,
    pub knockback: Option<KnockbackOutcome>,
    /// Defenses as actually applied
    pub applied_defense: DefenseProfile,
}

impl DamageOutcome {
    pub fn has_note(&self, note: DamageNote) -> bool {
        self.notes.contains(&note)
    }

    /// Effects to persist against the target.
    ///
    /// Only normal and killing damage reduce Body and Stun directly; the
    /// other flavors are consumed by their own resolvers.
    pub fn effects(&self, target: ActorId) -> Vec<CombatEffect> {
        let mut effects = Vec::new();
        if matches!(self.flavor, RollFlavor::Normal | RollFlavor::Killing)
            && (self.body > 0 || self.stun > 0)
        {
            effects.push(CombatEffect::damage(target, self.body, self.stun));
        }
        if let Some(effect) = self.knockback.as_ref().and_then(|kb| kb.effect(target)) {
            effects.push(effect);
        }
        effects
    }
}

/// Table options for rolling an item's damage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DamageRollOptions {
    pub edition: Edition,
    pub use_hit_locations: bool,
    pub aimed_location: Option<LocationName>,
    /// Forces standard effect even when the item does not have it
    pub standard_effect: bool,
}

/// Roll an item's dice under the flavor its kind calls for.
pub fn roll_damage<R: RandomSource + ?Sized>(
    item: &AttackItem,
    profile: &AttackProfile,
    options: DamageRollOptions,
    source: &mut R,
) -> DamageRoll {
    let standard_effect = options.standard_effect || profile.standard_effect;
    // Only Body and Stun damage lands on a body part
    let locations = options.use_hit_locations && profile.area.is_none();
    match item.kind {
        AttackKind::Normal => item
            .dice
            .to_spec::<Normal>(options.edition)
            .with_standard_effect(standard_effect)
            .with_hit_locations(locations)
            .aimed_at(options.aimed_location)
            .roll(source)
            .into(),
        AttackKind::Killing => item
            .dice
            .to_spec::<Killing>(options.edition)
            .with_standard_effect(standard_effect)
            .with_hit_locations(locations)
            .aimed_at(options.aimed_location)
            .with_stun_multiplier_levels(profile.stun_multiplier_levels)
            .roll(source)
            .into(),
        AttackKind::Adjustment { .. } => item
            .dice
            .to_spec::<Adjustment>(options.edition)
            .with_standard_effect(standard_effect)
            .roll(source)
            .into(),
        AttackKind::Flash => item
            .dice
            .to_spec::<Flash>(options.edition)
            .with_standard_effect(standard_effect)
            .roll(source)
            .into(),
        AttackKind::Entangle => item
            .dice
            .to_spec::<Entangle>(options.edition)
            .with_standard_effect(standard_effect)
            .roll(source)
            .into(),
    }
}

/// Remove one die per `step` of distance from the origin of an explosion.
pub fn explosion_falloff(roll: &DamageRoll, distance: f64, step: f64) -> DamageRoll {
    if distance <= 0.0 || step <= 0.0 || !distance.is_finite() {
        return roll.clone();
    }
    let removed = (distance / step).floor() as usize;
    roll.without_highest_terms(removed)
}

/// Stunned when Stun taken exceeds CON, unless the target takes no Stun.
/// A sheet without CON cannot be checked and is not stunned.
pub fn is_stunned(outcome: &DamageOutcome, target: &ActorSheet) -> bool {
    if target.has_condition(ActorCondition::TakesNoStun) {
        return false;
    }
    target
        .characteristic("CON")
        .is_some_and(|con| outcome.stun > con)
}

/// Apply defenses and damage rules to an already rolled attack.
pub fn resolve_damage<R: RandomSource + ?Sized>(
    request: DamageRequest<'_>,
    source: &mut R,
) -> DamageOutcome {
    let profile = request.profile;
    let mut notes = Vec::new();

    // 0. Negation, then piercing
    let negation = request.defense.damage_negation_dc;
    let roll = if negation > 0 {
        let before = request.roll.dice_count();
        let reduced = request.roll.without_highest_terms(negation as usize);
        notes.push(DamageNote::DamageNegation {
            dice_removed: (before - reduced.dice_count()) as u32,
        });
        reduced
    } else {
        request.roll.clone()
    };
    let defense = if request.defense.is_pierced_by(profile.armor_piercing) {
        notes.push(DamageNote::ArmorPiercing);
        request.defense.halved()
    } else {
        request.defense.clone()
    };
    let normal_pd = defense.normal as i32;
    let resistant_pd = defense.resistant as i32;
    let killing = roll.is_killing();

    // 1. Raw totals
    let raw_body = roll.raw_body();
    let raw_stun = roll.raw_stun();
    let body_for_penetrating = roll.body_for_penetrating();
    let mut body = raw_body;
    let mut stun = raw_stun;

    // 2. Reduced penetration, applied on top of the normal subtraction below
    if profile.reduced_penetration {
        if killing {
            body -= resistant_pd;
        }
        body -= normal_pd;
        notes.push(DamageNote::ReducedPenetration);
    }

    // 3. Knockback
    let knockback = if matches!(roll.flavor(), RollFlavor::Normal | RollFlavor::Killing) {
        resolve_knockback(
            KnockbackInput {
                body: body.max(0),
                multiplier: profile.knockback_multiplier,
                resistance: defense.knockback_resistance,
                airborne: request.situation.airborne,
                underwater: request.situation.underwater,
                killing,
                martial: profile.martial,
                edition: request.edition,
            },
            source,
        )
    } else {
        None
    };

    // 4. Defenses
    if killing {
        body -= resistant_pd;
        stun -= normal_pd + resistant_pd;
    } else {
        body -= normal_pd + resistant_pd;
        stun -= normal_pd + resistant_pd;
    }
    body = body.max(0);
    stun = stun.max(0);

    // 5. Hit location
    let location = roll.hit_location();
    if let Some(location) = location {
        let entry = location.entry();
        body = entry.body_x.apply(body);
        if !killing {
            stun = entry.n_stun_x.apply(stun);
        }
    }

    // 6. Damage reduction
    let reduction = defense.damage_reduction_percent.min(100);
    if reduction > 0 {
        let scale = f64::from(100 - reduction) / 100.0;
        body = round_favor_player_down(f64::from(body) * scale);
        stun = round_favor_player_down(f64::from(stun) * scale);
        notes.push(DamageNote::DamageReduction { percent: reduction });
    }

    // 7. Penetrating floor
    if profile.penetrating > 0 {
        let floor = (body_for_penetrating - defense.impenetrable as i32).max(0);
        let pool = if killing { &mut body } else { &mut stun };
        if *pool < floor {
            *pool = floor;
            notes.push(DamageNote::PenetratingDamage);
        }
    }

    // 8. Minimum damage
    if stun < body {
        stun = body;
        notes.push(DamageNote::MinimumDamage);
    }

    // 9. Override
    match profile.stun_body {
        StunBodyDamage::StunAndBody => {}
        StunBodyDamage::StunOnly => {
            body = 0;
            notes.push(DamageNote::StunOnly);
        }
        StunBodyDamage::BodyOnly => {
            stun = 0;
            notes.push(DamageNote::BodyOnly);
        }
        StunBodyDamage::EffectOnly => {
            body = 0;
            stun = 0;
            notes.push(DamageNote::EffectOnly);
        }
    }

    DamageOutcome {
        flavor: roll.flavor(),
        body,
        stun,
        raw_body,
        raw_stun,
        body_for_penetrating,
        hit_location: location.map(|l| l.label()),
        stun_multiplier: roll.stun_multiplier(),
        notes,
        knockback,
        applied_defense: defense,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_systems::hero::knockback::KnockbackResult;
    use crate::value_objects::{
        Adjustment, Killing, LocationName, Normal, RollSpec, ScriptedDice,
    };

    fn no_kb_profile() -> AttackProfile {
        AttackProfile::default()
    }

    fn resolve(
        roll: &DamageRoll,
        profile: &AttackProfile,
        defense: &DefenseProfile,
        dice: &mut ScriptedDice,
    ) -> DamageOutcome {
        resolve_damage(
            DamageRequest {
                roll,
                profile,
                defense,
                situation: KnockbackSituation::default(),
                edition: Edition::Sixth,
            },
            dice,
        )
    }

    fn normal(faces: &[u8], pips: i32) -> DamageRoll {
        let mut dice = ScriptedDice::new(faces.to_vec());
        RollSpec::<Normal>::new(Edition::Sixth)
            .add_dice(faces.len() as u32)
            .add_number(pips, "Pip")
            .roll(&mut dice)
            .into()
    }

    fn killing(faces: &[u8], multiplier_face: u8) -> DamageRoll {
        let mut all = faces.to_vec();
        all.push(multiplier_face);
        let mut dice = ScriptedDice::new(all);
        RollSpec::<Killing>::new(Edition::Sixth)
            .add_dice(faces.len() as u32)
            .roll(&mut dice)
            .into()
    }

    #[test]
    fn normal_attack_example() {
        let roll = normal(&[6, 4, 2], 1);
        let mut dice = ScriptedDice::new(Vec::<u8>::new());
        let outcome = resolve(&roll, &no_kb_profile(), &DefenseProfile::new(4, 0), &mut dice);
        assert_eq!(outcome.raw_stun, 13);
        assert_eq!(outcome.stun, 9);
        assert_eq!(outcome.body, 0);
        assert!(!outcome.has_note(DamageNote::MinimumDamage));
    }

    #[test]
    fn killing_attack_example() {
        // Body 4, multiplier face 5 -> x3
        let roll = killing(&[4], 5);
        let mut dice = ScriptedDice::new(Vec::<u8>::new());
        let outcome = resolve(&roll, &no_kb_profile(), &DefenseProfile::new(0, 2), &mut dice);
        assert_eq!(outcome.stun_multiplier, Some(3));
        assert_eq!(outcome.body, 2);
        assert_eq!(outcome.stun, 10);
    }

    #[test]
    fn knockback_uses_body_before_defense() {
        let roll = normal(&[6, 6, 6], 0);
        let profile = AttackProfile {
            knockback_multiplier: 1,
            ..AttackProfile::default()
        };
        let mut dice = ScriptedDice::new([1, 1]);
        let outcome = resolve(&roll, &profile, &DefenseProfile::new(20, 0), &mut dice);
        assert_eq!(outcome.body, 0);
        let knockback = outcome.knockback.as_ref().expect("knockback rolled");
        assert_eq!(knockback.result, KnockbackResult::KnockedBack { distance: 8 });
        // No damage got through, only the knockback condition remains
        let effects = outcome.effects(ActorId::new());
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn minimum_damage_raises_stun() {
        // Killing Body 6 x1 (face 1 -> ceil(0.5) = 1), Stun 6; PD 10 eats Stun
        let roll = killing(&[6], 1);
        let mut dice = ScriptedDice::new(Vec::<u8>::new());
        let outcome = resolve(&roll, &no_kb_profile(), &DefenseProfile::new(10, 2), &mut dice);
        assert_eq!(outcome.body, 4);
        assert_eq!(outcome.stun, 4);
        assert!(outcome.has_note(DamageNote::MinimumDamage));
    }

    #[test]
    fn penetrating_floor_for_normal_and_killing() {
        let profile = AttackProfile {
            penetrating: 1,
            ..AttackProfile::default()
        };
        let mut dice = ScriptedDice::new(Vec::<u8>::new());

        let roll = normal(&[6, 5, 5], 0);
        let outcome = resolve(&roll, &profile, &DefenseProfile::new(30, 0), &mut dice);
        assert_eq!(outcome.body_for_penetrating, 4);
        assert_eq!(outcome.stun, 4);
        assert_eq!(outcome.body, 0);
        assert!(outcome.has_note(DamageNote::PenetratingDamage));

        let roll = killing(&[6, 5], 2);
        let defense = DefenseProfile::new(0, 20).with_impenetrable(1);
        let outcome = resolve(&roll, &profile, &defense, &mut dice);
        assert_eq!(outcome.body_for_penetrating, 3);
        assert_eq!(outcome.body, 2);
        assert_eq!(outcome.stun, 2);
    }

    #[test]
    fn damage_negation_strips_highest_dice_first() {
        let roll = normal(&[6, 2, 5], 0);
        let defense = DefenseProfile::default().with_damage_negation(1);
        let mut dice = ScriptedDice::new(Vec::<u8>::new());
        let outcome = resolve(&roll, &no_kb_profile(), &defense, &mut dice);
        assert_eq!(outcome.raw_stun, 7);
        assert_eq!(outcome.raw_body, 2);
        assert!(outcome.has_note(DamageNote::DamageNegation { dice_removed: 1 }));
    }

    #[test]
    fn armor_piercing_halves_unless_hardened() {
        let roll = normal(&[6, 6, 6, 6], 0);
        let profile = AttackProfile {
            armor_piercing: 1,
            ..AttackProfile::default()
        };
        let mut dice = ScriptedDice::new(Vec::<u8>::new());

        let outcome = resolve(&roll, &profile, &DefenseProfile::new(15, 0), &mut dice);
        assert_eq!(outcome.applied_defense.normal, 8);
        assert_eq!(outcome.stun, 16);

        let hardened = DefenseProfile::new(15, 0).with_hardened(1);
        let outcome = resolve(&roll, &profile, &hardened, &mut dice);
        assert_eq!(outcome.stun, 9);
        assert!(!outcome.has_note(DamageNote::ArmorPiercing));
    }

    #[test]
    fn reduced_penetration_double_applies() {
        let roll = killing(&[6, 6], 3);
        let profile = AttackProfile {
            reduced_penetration: true,
            ..AttackProfile::default()
        };
        let mut dice = ScriptedDice::new(Vec::<u8>::new());
        let outcome = resolve(&roll, &profile, &DefenseProfile::new(2, 3), &mut dice);
        // 12 - 3 - 2 = 7, then -3 resistant = 4
        assert_eq!(outcome.body, 4);
        assert_eq!(outcome.stun, 24 - 5);
    }

    #[test]
    fn damage_reduction_rounds_down_on_halves() {
        let roll = normal(&[5, 5, 3], 0);
        let defense = DefenseProfile::default().with_damage_reduction(50);
        let mut dice = ScriptedDice::new(Vec::<u8>::new());
        let outcome = resolve(&roll, &no_kb_profile(), &defense, &mut dice);
        assert_eq!(outcome.stun, 6);
        // Body 3 * 0.5 = 1.5 -> 1
        assert_eq!(outcome.body, 1);
    }

    #[test]
    fn damage_reduction_floors_quarter_fractions() {
        let roll = normal(&[6, 2, 1], 0);
        let defense = DefenseProfile::default().with_damage_reduction(25);
        let mut dice = ScriptedDice::new(Vec::<u8>::new());
        let outcome = resolve(&roll, &no_kb_profile(), &defense, &mut dice);
        assert_eq!(outcome.raw_stun, 9);
        // 9 * 0.75 = 6.75
        assert_eq!(outcome.stun, 6);
        // 3 * 0.75 = 2.25
        assert_eq!(outcome.body, 2);
    }

    #[test]
    fn hit_location_scales_normal_stun_and_body() {
        // Aimed at the head: NSTUNx2, BODYx2
        let mut dice = ScriptedDice::new([6, 6]);
        let roll: DamageRoll = RollSpec::<Normal>::new(Edition::Sixth)
            .add_dice(2)
            .with_hit_locations(true)
            .aimed_at(Some(LocationName::Head))
            .roll(&mut dice)
            .into();
        let mut none = ScriptedDice::new(Vec::<u8>::new());
        let outcome = resolve(&roll, &no_kb_profile(), &DefenseProfile::new(2, 0), &mut none);
        assert_eq!(outcome.stun, 20);
        assert_eq!(outcome.body, 4);
        assert_eq!(outcome.hit_location.as_deref(), Some("Head"));
    }

    #[test]
    fn overrides_run_last() {
        let roll = normal(&[6, 6], 0);
        let mut dice = ScriptedDice::new(Vec::<u8>::new());
        for (mode, body, stun) in [
            (StunBodyDamage::StunOnly, 0, 12),
            (StunBodyDamage::BodyOnly, 4, 0),
            (StunBodyDamage::EffectOnly, 0, 0),
        ] {
            let profile = AttackProfile {
                stun_body: mode,
                ..AttackProfile::default()
            };
            let outcome = resolve(&roll, &profile, &DefenseProfile::default(), &mut dice);
            assert_eq!((outcome.body, outcome.stun), (body, stun));
        }
    }

    #[test]
    fn adjustment_subtracts_like_normal_damage() {
        let mut dice = ScriptedDice::new([6, 5, 4]);
        let roll: DamageRoll = RollSpec::<Adjustment>::new(Edition::Sixth)
            .add_dice(3)
            .roll(&mut dice)
            .into();
        let mut none = ScriptedDice::new(Vec::<u8>::new());
        let outcome = resolve(&roll, &no_kb_profile(), &DefenseProfile::new(5, 0), &mut none);
        assert_eq!(outcome.raw_stun, 15);
        assert_eq!(outcome.stun, 10);
        assert!(outcome.knockback.is_none());
        assert!(outcome.effects(ActorId::new()).is_empty());
    }

    #[test]
    fn explosion_falloff_removes_a_die_per_step() {
        let roll = normal(&[6, 5, 2, 1], 0);
        let at_origin = explosion_falloff(&roll, 0.0, 2.0);
        assert_eq!(at_origin.raw_stun(), 14);
        let two_steps = explosion_falloff(&roll, 5.0, 2.0);
        assert_eq!(two_steps.raw_stun(), 3);
        let far = explosion_falloff(&roll, 100.0, 2.0);
        assert_eq!(far.raw_stun(), 0);
    }

    #[test]
    fn rolls_items_under_their_own_flavor() {
        use crate::value_objects::DamageDice;

        let blast = AttackItem::new("Blast", AttackKind::Normal, DamageDice::new(2));
        let (profile, _) = blast.profile(Edition::Sixth);
        let mut dice = ScriptedDice::new([6, 1]);
        let roll = roll_damage(&blast, &profile, DamageRollOptions::default(), &mut dice);
        assert_eq!(roll.flavor(), RollFlavor::Normal);
        assert_eq!(roll.raw_stun(), 7);
        assert_eq!(roll.raw_body(), 2);

        let claws = AttackItem::new("Claws", AttackKind::Killing, DamageDice::new(1));
        let (profile, _) = claws.profile(Edition::Sixth);
        // Body die, then the stun multiplier die
        let mut dice = ScriptedDice::new([4, 6]);
        let roll = roll_damage(&claws, &profile, DamageRollOptions::default(), &mut dice);
        assert!(roll.is_killing());
        assert_eq!(roll.stun_multiplier(), Some(3));
        assert_eq!(dice.remaining(), 0);

        let options = DamageRollOptions {
            standard_effect: true,
            ..DamageRollOptions::default()
        };
        let mut dice = ScriptedDice::new(Vec::<u8>::new());
        let roll = roll_damage(&blast, &blast.profile(Edition::Sixth).0, options, &mut dice);
        assert_eq!(roll.raw_stun(), 6);
    }

    #[test]
    fn stunning_check() {
        let roll = normal(&[6, 6, 6], 0);
        let mut dice = ScriptedDice::new(Vec::<u8>::new());
        let outcome = resolve(&roll, &no_kb_profile(), &DefenseProfile::default(), &mut dice);
        let target = ActorSheet::new("Lab Tech", Edition::Sixth).with_characteristic("CON", 10);
        assert!(is_stunned(&outcome, &target));
        let robot = target.clone().with_condition(ActorCondition::TakesNoStun);
        assert!(!is_stunned(&outcome, &robot));
        let tough = ActorSheet::new("Brick", Edition::Sixth).with_characteristic("CON", 18);
        assert!(!is_stunned(&outcome, &tough));
    }
}
