//! Roll builder and evaluated roll.
//!
//! A `RollSpec<K>` collects terms. `roll` consumes it, draws every face
//! exactly once, and returns a `Roll<K>`. An evaluated roll never draws again:
//! clones, falloff copies and flavor reinterpretations all reuse the same
//! faces.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use super::kind::{
    Adjustment, Basic, DamageKind, Entangle, Flash, Killing, Normal, RollFlavor, RollKind, Success,
};
use super::source::RandomSource;
use super::term::{RollTerm, TermKind};
use crate::value_objects::edition::Edition;
use crate::value_objects::hit_location::{HitLocation, HitLocationRoll, LocationName, Side};

/// Face every die shows under the standard-effect rule.
const STANDARD_EFFECT_FACE: u8 = 3;

/// Switches that change how a roll is read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollModifiers {
    pub edition: Edition,
    /// Increased stun multiplier levels (killing only)
    pub stun_multiplier_levels: i32,
    /// Dice are not rolled; each reads as 3
    pub standard_effect: bool,
    /// Body totals read as zero
    pub no_body: bool,
    pub use_hit_locations: bool,
    /// Placed shot; skips the location roll
    pub aimed_location: Option<LocationName>,
    /// Success threshold; zero is the roll-under convention
    pub success_target: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StunMultiplierRoll {
    /// `None` when the multiplier came from a hit location
    pub face: Option<u8>,
    pub base: i32,
    pub levels: i32,
    pub total: i32,
}

/// Secondary rolls made alongside the main terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubRolls {
    pub hit_location: Option<HitLocationRoll>,
    pub stun_multiplier: Option<StunMultiplierRoll>,
}

/// An unevaluated roll.
#[derive(Debug, Clone, PartialEq)]
pub struct RollSpec<K: RollKind> {
    terms: Vec<RollTerm>,
    modifiers: RollModifiers,
    kind: PhantomData<K>,
}

impl<K: RollKind> RollSpec<K> {
    pub fn new(edition: Edition) -> Self {
        Self {
            terms: Vec::new(),
            modifiers: RollModifiers {
                edition,
                ..RollModifiers::default()
            },
            kind: PhantomData,
        }
    }

    pub fn add_dice(self, count: u32) -> Self {
        self.push_dice(TermKind::Die, count, false, None)
    }

    pub fn add_labeled_dice(self, count: u32, label: impl Into<String>) -> Self {
        self.push_dice(TermKind::Die, count, false, Some(label.into()))
    }

    pub fn add_half_dice(self, count: u32) -> Self {
        self.push_dice(TermKind::HalfDie, count, false, None)
    }

    pub fn add_dice_minus_one(self, count: u32) -> Self {
        self.push_dice(TermKind::DieMinusOne, count, false, None)
    }

    /// Negative-weighted dice, used for penalty pools.
    pub fn sub_dice(self, count: u32) -> Self {
        self.push_dice(TermKind::Die, count, true, None)
    }

    pub fn sub_labeled_dice(self, count: u32, label: impl Into<String>) -> Self {
        self.push_dice(TermKind::Die, count, true, Some(label.into()))
    }

    /// Add a flat number. Zero is skipped so audits stay readable.
    pub fn add_number(mut self, value: i32, label: impl Into<String>) -> Self {
        if value != 0 {
            self.terms.push(RollTerm::number(value, Some(label.into())));
        }
        self
    }

    pub fn sub_number(self, value: i32, label: impl Into<String>) -> Self {
        self.add_number(-value, label)
    }

    pub fn with_standard_effect(mut self, enabled: bool) -> Self {
        self.modifiers.standard_effect = enabled;
        self
    }

    pub fn with_no_body(mut self, enabled: bool) -> Self {
        self.modifiers.no_body = enabled;
        self
    }

    pub fn with_hit_locations(mut self, enabled: bool) -> Self {
        self.modifiers.use_hit_locations = enabled;
        self
    }

    pub fn aimed_at(mut self, location: Option<LocationName>) -> Self {
        self.modifiers.aimed_location = location;
        self
    }

    pub fn with_stun_multiplier_levels(mut self, levels: i32) -> Self {
        self.modifiers.stun_multiplier_levels = levels;
        self
    }

    pub fn with_success_target(mut self, target: i32) -> Self {
        self.modifiers.success_target = target;
        self
    }

    pub fn terms(&self) -> &[RollTerm] {
        &self.terms
    }

    pub fn modifiers(&self) -> &RollModifiers {
        &self.modifiers
    }

    /// Evaluate every term once.
    ///
    /// Faces are drawn in term order, then the hit location (3d6, plus a side
    /// die for paired locations), then the killing stun multiplier.
    pub fn roll<R: RandomSource + ?Sized>(self, source: &mut R) -> Roll<K> {
        let standard = self.modifiers.standard_effect;
        let mut terms = self.terms;
        for term in terms.iter_mut().filter(|t| t.kind.is_dice()) {
            term.face = Some(draw(source, standard));
        }

        let is_damage = matches!(K::FLAVOR, RollFlavor::Normal | RollFlavor::Killing);
        let hit_location = if is_damage && self.modifiers.use_hit_locations {
            Some(roll_hit_location(self.modifiers.aimed_location, source))
        } else {
            None
        };

        let stun_multiplier = if K::FLAVOR == RollFlavor::Killing {
            Some(roll_stun_multiplier(
                &self.modifiers,
                hit_location.as_ref(),
                source,
            ))
        } else {
            None
        };

        Roll {
            terms,
            modifiers: self.modifiers,
            sub_rolls: SubRolls {
                hit_location,
                stun_multiplier,
            },
            kind: PhantomData,
        }
    }

    fn push_dice(mut self, kind: TermKind, count: u32, negative: bool, label: Option<String>) -> Self {
        for _ in 0..count {
            self.terms.push(RollTerm::die(kind, negative, label.clone()));
        }
        self
    }
}

fn draw<R: RandomSource + ?Sized>(source: &mut R, standard_effect: bool) -> u8 {
    if standard_effect {
        STANDARD_EFFECT_FACE
    } else {
        source.next_die_face().clamp(1, 6)
    }
}

fn roll_hit_location<R: RandomSource + ?Sized>(
    aimed: Option<LocationName>,
    source: &mut R,
) -> HitLocationRoll {
    let (location, faces) = match aimed {
        Some(location) => (location, Vec::new()),
        None => {
            let faces: Vec<u8> = (0..3).map(|_| draw(source, false)).collect();
            let total: u8 = faces.iter().sum();
            (HitLocation::for_roll(total).name, faces)
        }
    };
    let side_face = HitLocation::get(location)
        .sided
        .then(|| draw(source, false));
    HitLocationRoll {
        location,
        side: side_face.map(Side::from_face),
        faces,
        side_face,
        aimed: aimed.is_some(),
    }
}

fn roll_stun_multiplier<R: RandomSource + ?Sized>(
    modifiers: &RollModifiers,
    hit_location: Option<&HitLocationRoll>,
    source: &mut R,
) -> StunMultiplierRoll {
    let (face, base) = match hit_location {
        Some(location) => (None, location.entry().stun_x.apply(1)),
        None => {
            let face = draw(source, modifiers.standard_effect);
            let base = match modifiers.edition {
                // ½d6, rounded up
                Edition::Sixth => (i32::from(face) + 1) / 2,
                // d6-1, minimum 1
                Edition::Fifth => (i32::from(face) - 1).max(1),
            };
            (Some(face), base)
        }
    };
    StunMultiplierRoll {
        face,
        base,
        levels: modifiers.stun_multiplier_levels,
        total: (base + modifiers.stun_multiplier_levels).max(1),
    }
}

/// An evaluated roll.
#[derive(Debug, Clone, PartialEq)]
pub struct Roll<K: RollKind> {
    pub(super) terms: Vec<RollTerm>,
    pub(super) modifiers: RollModifiers,
    pub(super) sub_rolls: SubRolls,
    pub(super) kind: PhantomData<K>,
}

impl<K: RollKind> Roll<K> {
    pub fn flavor(&self) -> RollFlavor {
        K::FLAVOR
    }

    pub fn terms(&self) -> &[RollTerm] {
        &self.terms
    }

    pub fn modifiers(&self) -> &RollModifiers {
        &self.modifiers
    }

    pub fn sub_rolls(&self) -> &SubRolls {
        &self.sub_rolls
    }

    pub fn edition(&self) -> Edition {
        self.modifiers.edition
    }

    /// Number of dice-equivalent terms still in the roll.
    pub fn dice_count(&self) -> usize {
        self.terms.iter().filter(|t| t.kind.is_dice()).count()
    }

    /// Copy of this roll with up to `count` of its strongest added dice removed.
    ///
    /// Full dice go before half and minus-one dice, higher values first, ties
    /// by position. Flat numbers and subtracted dice are never removed.
    pub fn without_highest_terms(&self, count: usize) -> Self {
        let mut candidates: Vec<usize> = self
            .terms
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind.is_dice() && !t.negative)
            .map(|(i, _)| i)
            .collect();
        candidates.sort_by(|&a, &b| {
            self.terms[a]
                .strength_cmp(&self.terms[b])
                .then_with(|| a.cmp(&b))
        });
        let removed: Vec<usize> = candidates.into_iter().take(count).collect();

        let terms = self
            .terms
            .iter()
            .enumerate()
            .filter(|(i, _)| !removed.contains(i))
            .map(|(_, t)| t.clone())
            .collect();

        Self {
            terms,
            modifiers: self.modifiers.clone(),
            sub_rolls: self.sub_rolls.clone(),
            kind: PhantomData,
        }
    }

    /// Same faces, read under another flavor.
    pub fn reinterpret<K2: RollKind>(&self) -> Roll<K2> {
        Roll {
            terms: self.terms.clone(),
            modifiers: self.modifiers.clone(),
            sub_rolls: self.sub_rolls.clone(),
            kind: PhantomData,
        }
    }

    pub(crate) fn signed_sum(&self) -> i32 {
        self.terms.iter().map(RollTerm::signed_value).sum()
    }

    pub(crate) fn normal_body_sum(&self) -> i32 {
        if self.modifiers.no_body {
            return 0;
        }
        self.terms.iter().map(RollTerm::signed_normal_body).sum()
    }

    pub(crate) fn killing_body(&self) -> i32 {
        if self.modifiers.no_body {
            0
        } else {
            self.signed_sum().max(0)
        }
    }

    pub(crate) fn killing_stun_multiplier(&self) -> i32 {
        self.sub_rolls
            .stun_multiplier
            .as_ref()
            .map(|m| m.total)
            .unwrap_or_else(|| (1 + self.modifiers.stun_multiplier_levels).max(1))
    }

    pub(crate) fn killing_stun(&self) -> i32 {
        self.signed_sum().max(0) * self.killing_stun_multiplier()
    }
}

impl Roll<Success> {
    pub fn success_total(&self) -> i32 {
        self.signed_sum()
    }

    pub fn is_success(&self) -> bool {
        self.success_total() >= self.modifiers.success_target
    }

    /// Sum of the faces shown, ignoring sign and flat numbers.
    pub fn natural_total(&self) -> i32 {
        self.terms
            .iter()
            .filter_map(|t| t.face)
            .map(i32::from)
            .sum()
    }

    /// Automatic result on an extreme natural roll.
    ///
    /// `Some(true)` when every die shows 1, `Some(false)` when every die
    /// shows 6, otherwise `None`.
    pub fn auto_success(&self) -> Option<bool> {
        let dice = self.dice_count() as i32;
        if dice == 0 {
            return None;
        }
        let natural = self.natural_total();
        if natural == dice {
            Some(true)
        } else if natural == dice * 6 {
            Some(false)
        } else {
            None
        }
    }
}

impl Roll<Normal> {
    pub fn body_total(&self) -> i32 {
        self.normal_body_sum().max(0)
    }

    pub fn stun_total(&self) -> i32 {
        self.signed_sum().max(0)
    }
}

impl Roll<Killing> {
    pub fn body_total(&self) -> i32 {
        self.killing_body()
    }

    pub fn stun_multiplier(&self) -> i32 {
        self.killing_stun_multiplier()
    }

    pub fn stun_total(&self) -> i32 {
        self.killing_stun()
    }
}

impl<K: DamageKind> Roll<K> {
    pub fn hit_location(&self) -> Option<&HitLocationRoll> {
        self.sub_rolls.hit_location.as_ref()
    }
}

impl Roll<Adjustment> {
    pub fn adjustment_total(&self) -> i32 {
        self.signed_sum().max(0)
    }
}

impl Roll<Flash> {
    /// Segments of flash, counted like normal-damage Body.
    pub fn flash_total(&self) -> i32 {
        self.normal_body_sum().max(0)
    }
}

impl Roll<Entangle> {
    /// Entangle Body, counted like normal-damage Body.
    pub fn entangle_total(&self) -> i32 {
        self.normal_body_sum().max(0)
    }
}

impl Roll<Basic> {
    pub fn basic_total(&self) -> i32 {
        self.signed_sum()
    }
}
