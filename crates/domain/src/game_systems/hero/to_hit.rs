//! Attack rolls.
//!
//! The roll is built as 11 + OCV + modifiers - 3d6, so a hit is simply
//! "total >= defender's DCV". Every target gets its own dice from a clone of
//! the same base builder.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{ActorSheet, AttackItem, AttackProfile};
use crate::events::HitOutcome;
use crate::value_objects::{
    round_favor_player_up, Edition, HitLocation, LocationName, RandomSource, Roll, RollSpec,
    Success,
};
use crate::ActorId;

/// Base of every attack roll.
const BASE_ROLL: i32 = 11;
/// Each autofire shot after the first is this much harder.
const AUTOFIRE_STEP: i32 = 2;

/// Reasons an attack cannot be made at all.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttackFailure {
    #[error("No attacking actor found")]
    NoActor,
    #[error("No token found for {0}")]
    NoToken(String),
    #[error("No area template found")]
    NoTemplate,
    #[error("{item} has no charges left")]
    NoCharges { item: String },
    #[error("{item} costs {required} END but only {available} is left")]
    InsufficientEndurance {
        item: String,
        required: i32,
        available: i32,
    },
}

/// What penalty skill levels are bought against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PenaltyOffset {
    Range,
    HitLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltySkillLevels {
    pub levels: i32,
    pub offsets: PenaltyOffset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledModifier {
    pub label: String,
    pub value: i32,
}

/// Situational modifiers chosen for one attack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SituationalModifiers {
    pub combat_skill_levels: i32,
    pub maneuver_bonus: i32,
    /// Brace's bonus; only offsets range penalties
    pub brace_bonus: i32,
    pub aimed_location: Option<LocationName>,
    pub penalty_skill_levels: Option<PenaltySkillLevels>,
    /// Shots fired, for autofire attacks
    pub autofire_shots: Option<u32>,
    pub extra: Vec<LabeledModifier>,
}

/// The area template placed for an area attack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaTemplate {
    /// Radius, length or width, in the edition's distance unit
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToHitTarget {
    pub actor: ActorId,
    pub name: String,
    /// DCV or DMCV; may be fractional after halving
    pub defense_value: f64,
    /// Distance from the attacker
    pub distance: f64,
    /// Distance from an area's origin, for explosion falloff
    #[serde(default)]
    pub distance_from_origin: Option<f64>,
}

/// One attack against zero or more targets.
#[derive(Debug, Clone, Copy)]
pub struct ToHitRequest<'a> {
    pub profile: &'a AttackProfile,
    /// Attacker's OCV or OMCV
    pub offense: i32,
    pub offense_label: &'a str,
    pub edition: Edition,
    pub targets: &'a [ToHitTarget],
    pub modifiers: &'a SituationalModifiers,
    pub template: Option<&'a AreaTemplate>,
}

/// The result for one target, or one autofire shot at it.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetHit {
    pub actor: ActorId,
    pub name: String,
    /// 1 for the first shot
    pub shot: u32,
    pub outcome: HitOutcome,
    /// Defense after rounding; `None` for area hits
    pub defense: Option<i32>,
    pub total: i32,
    pub margin: Option<i32>,
    pub range_penalty: i32,
    pub distance_from_origin: Option<f64>,
    pub roll: Roll<Success>,
}

impl TargetHit {
    pub fn is_hit(&self) -> bool {
        self.outcome.is_hit()
    }

    /// "+2", "+0", "-3"
    pub fn margin_label(&self) -> Option<String> {
        self.margin.map(|m| format!("{:+}", m))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToHitResult {
    /// The single roll shown for area and untargeted attacks
    pub attack_roll: Option<Roll<Success>>,
    pub hits: Vec<TargetHit>,
}

impl ToHitResult {
    pub fn hit_count(&self) -> usize {
        self.hits.iter().filter(|h| h.is_hit()).count()
    }
}

/// `-2 × ceil(log2(distance / factor))`, never positive.
pub fn range_penalty(distance: f64, edition: Edition) -> i32 {
    if distance <= 0.0 || !distance.is_finite() {
        return 0;
    }
    let steps = (distance / edition.range_factor()).log2().ceil();
    (-2 * steps as i32).min(0)
}

/// Reduce a penalty by a bonus without turning it into a bonus.
pub fn offset_penalty(penalty: i32, bonus: i32) -> i32 {
    if penalty >= 0 {
        return penalty;
    }
    (penalty + bonus.max(0)).min(0)
}

/// Charges and endurance checks made before anything is rolled.
pub fn check_resources(item: &AttackItem, attacker: &ActorSheet) -> Result<(), AttackFailure> {
    if item.charges == Some(0) {
        return Err(AttackFailure::NoCharges {
            item: item.name.clone(),
        });
    }
    if item.end_cost > 0 {
        let available = attacker.characteristic("END").unwrap_or(0);
        if available < item.end_cost {
            return Err(AttackFailure::InsufficientEndurance {
                item: item.name.clone(),
                required: item.end_cost,
                available,
            });
        }
    }
    Ok(())
}

/// Roll to hit every target.
pub fn resolve_to_hit<R: RandomSource + ?Sized>(
    request: ToHitRequest<'_>,
    source: &mut R,
) -> Result<ToHitResult, AttackFailure> {
    let modifiers = request.modifiers;
    let psl = modifiers.penalty_skill_levels;
    let base = base_spec(&request);

    if request.profile.area_always_hits() {
        if request.template.is_none() {
            return Err(AttackFailure::NoTemplate);
        }
        let roll = base
            .with_success_target(request.edition.area_dcv())
            .roll(source);
        let hits = request
            .targets
            .iter()
            .map(|target| TargetHit {
                actor: target.actor,
                name: target.name.clone(),
                shot: 1,
                outcome: HitOutcome::AreaHit,
                defense: None,
                total: roll.success_total(),
                margin: None,
                range_penalty: 0,
                distance_from_origin: target.distance_from_origin,
                roll: roll.clone(),
            })
            .collect();
        return Ok(ToHitResult {
            attack_roll: Some(roll),
            hits,
        });
    }

    if request.targets.is_empty() {
        return Ok(ToHitResult {
            attack_roll: Some(base.roll(source)),
            hits: Vec::new(),
        });
    }

    let mut hits = Vec::new();
    for target in request.targets {
        let mut penalty = range_penalty(target.distance, request.edition);
        penalty = offset_penalty(penalty, modifiers.brace_bonus);
        if let Some(levels) = psl.filter(|p| p.offsets == PenaltyOffset::Range) {
            penalty = offset_penalty(penalty, levels.levels);
        }

        let defense = round_favor_player_up(target.defense_value);
        let roll = base
            .clone()
            .add_number(penalty, "Range Penalty")
            .with_success_target(defense)
            .roll(source);
        let total = roll.success_total();
        let auto = roll.auto_success();

        hits.push(TargetHit {
            actor: target.actor,
            name: target.name.clone(),
            shot: 1,
            outcome: outcome_for(auto, total, defense),
            defense: Some(defense),
            total,
            margin: Some(total - defense),
            range_penalty: penalty,
            distance_from_origin: target.distance_from_origin,
            roll: roll.clone(),
        });

        // Known approximation: later autofire shots reuse the first roll
        // at -2 per shot instead of rolling again.
        if request.targets.len() == 1 {
            for shot in 1..autofire_shots(&request) {
                let shot_total = total - AUTOFIRE_STEP * shot as i32;
                let shot_auto = auto.filter(|hit| !hit);
                hits.push(TargetHit {
                    actor: target.actor,
                    name: target.name.clone(),
                    shot: shot + 1,
                    outcome: outcome_for(shot_auto, shot_total, defense),
                    defense: Some(defense),
                    total: shot_total,
                    margin: Some(shot_total - defense),
                    range_penalty: penalty,
                    distance_from_origin: target.distance_from_origin,
                    roll: roll.clone(),
                });
            }
        }
    }

    Ok(ToHitResult {
        attack_roll: None,
        hits,
    })
}

fn base_spec(request: &ToHitRequest<'_>) -> RollSpec<Success> {
    let modifiers = request.modifiers;
    let mut spec = RollSpec::<Success>::new(request.edition)
        .add_number(BASE_ROLL, "Base")
        .add_number(request.offense, request.offense_label)
        .add_number(modifiers.combat_skill_levels, "Combat Skill Levels")
        .add_number(modifiers.maneuver_bonus, "Maneuver");

    if let Some(location) = modifiers.aimed_location {
        let mut penalty = HitLocation::get(location).ocv_penalty;
        if let Some(levels) = modifiers
            .penalty_skill_levels
            .filter(|p| p.offsets == PenaltyOffset::HitLocation)
        {
            penalty = offset_penalty(penalty, levels.levels);
        }
        spec = spec.add_number(penalty, format!("Aimed at {}", location));
    }

    for extra in &modifiers.extra {
        spec = spec.add_number(extra.value, extra.label.clone());
    }

    spec.sub_labeled_dice(3, "3d6")
}

fn autofire_shots(request: &ToHitRequest<'_>) -> u32 {
    match (request.profile.autofire_shots, request.modifiers.autofire_shots) {
        (Some(max), Some(fired)) => fired.clamp(1, max),
        _ => 1,
    }
}

fn outcome_for(auto: Option<bool>, total: i32, defense: i32) -> HitOutcome {
    match auto {
        Some(true) => HitOutcome::AutomaticHit,
        Some(false) => HitOutcome::AutomaticMiss,
        None if defense <= total => HitOutcome::Hit {
            margin: total - defense,
        },
        None => HitOutcome::Miss {
            margin: total - defense,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AreaEffect, AreaShape, AttackKind};
    use crate::value_objects::{DamageDice, ScriptedDice};

    fn target(name: &str, dcv: f64, distance: f64) -> ToHitTarget {
        ToHitTarget {
            actor: ActorId::new(),
            name: name.to_string(),
            defense_value: dcv,
            distance,
            distance_from_origin: None,
        }
    }

    fn request<'a>(
        profile: &'a AttackProfile,
        targets: &'a [ToHitTarget],
        modifiers: &'a SituationalModifiers,
    ) -> ToHitRequest<'a> {
        ToHitRequest {
            profile,
            offense: 7,
            offense_label: "OCV",
            edition: Edition::Sixth,
            targets,
            modifiers,
            template: None,
        }
    }

    #[test]
    fn range_penalty_examples() {
        assert_eq!(range_penalty(16.0, Edition::Sixth), -2);
        assert_eq!(range_penalty(40.0, Edition::Sixth), -6);
        assert_eq!(range_penalty(8.0, Edition::Sixth), 0);
        assert_eq!(range_penalty(2.0, Edition::Sixth), 0);
        assert_eq!(range_penalty(0.0, Edition::Sixth), 0);
        assert_eq!(range_penalty(16.0, Edition::Fifth), -4);
    }

    #[test]
    fn offsets_never_become_bonuses() {
        assert_eq!(offset_penalty(-4, 2), -2);
        assert_eq!(offset_penalty(-4, 10), 0);
        assert_eq!(offset_penalty(0, 3), 0);
        assert_eq!(offset_penalty(-4, -3), -4);
    }

    #[test]
    fn hit_compares_total_to_rounded_defense() {
        let profile = AttackProfile::default();
        let targets = [target("Viper Agent", 5.5, 4.0)];
        let modifiers = SituationalModifiers::default();
        // 11 + 7 - (4+4+4) = 6 vs DCV 5.5 rounded up to 6
        let mut dice = ScriptedDice::new([4, 4, 4]);
        let result =
            resolve_to_hit(request(&profile, &targets, &modifiers), &mut dice).expect("rolls");
        let hit = &result.hits[0];
        assert_eq!(hit.total, 6);
        assert_eq!(hit.defense, Some(6));
        assert!(hit.is_hit());
        assert_eq!(hit.margin_label().as_deref(), Some("+0"));
    }

    #[test]
    fn each_target_rolls_its_own_dice() {
        let profile = AttackProfile::default();
        let targets = [target("Near", 3.0, 2.0), target("Far", 3.0, 40.0)];
        let modifiers = SituationalModifiers::default();
        let mut dice = ScriptedDice::new([5, 5, 5, 2, 2, 2]);
        let result =
            resolve_to_hit(request(&profile, &targets, &modifiers), &mut dice).expect("rolls");
        assert_eq!(result.hits[0].total, 3);
        assert_eq!(result.hits[1].range_penalty, -6);
        assert_eq!(result.hits[1].total, 18 - 6 - 6);
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn natural_rolls_override_the_numbers() {
        let profile = AttackProfile::default();
        let targets = [target("Untouchable", 30.0, 0.0)];
        let modifiers = SituationalModifiers::default();
        let mut dice = ScriptedDice::new([1, 1, 1]);
        let result =
            resolve_to_hit(request(&profile, &targets, &modifiers), &mut dice).expect("rolls");
        assert_eq!(result.hits[0].outcome, HitOutcome::AutomaticHit);
        assert_eq!(result.hits[0].margin, Some(15 - 30));
    }

    #[test]
    fn brace_and_psls_offset_range() {
        let profile = AttackProfile::default();
        let targets = [target("Sniper Nest", 3.0, 40.0)];
        let modifiers = SituationalModifiers {
            brace_bonus: 2,
            penalty_skill_levels: Some(PenaltySkillLevels {
                levels: 3,
                offsets: PenaltyOffset::Range,
            }),
            ..SituationalModifiers::default()
        };
        let mut dice = ScriptedDice::new([3, 3, 3]);
        let result =
            resolve_to_hit(request(&profile, &targets, &modifiers), &mut dice).expect("rolls");
        assert_eq!(result.hits[0].range_penalty, -1);
    }

    #[test]
    fn aimed_shots_pay_the_location_penalty() {
        let profile = AttackProfile::default();
        let targets = [target("Mechanon", 3.0, 0.0)];
        let modifiers = SituationalModifiers {
            aimed_location: Some(LocationName::Head),
            penalty_skill_levels: Some(PenaltySkillLevels {
                levels: 2,
                offsets: PenaltyOffset::HitLocation,
            }),
            ..SituationalModifiers::default()
        };
        let mut dice = ScriptedDice::new([3, 3, 3]);
        let result =
            resolve_to_hit(request(&profile, &targets, &modifiers), &mut dice).expect("rolls");
        // 11 + 7 - 6 - 9
        assert_eq!(result.hits[0].total, 3);
    }

    #[test]
    fn autofire_reuses_first_roll() {
        let item = AttackItem::new("Assault Rifle", AttackKind::Killing, DamageDice::new(2))
            .with_modifier(crate::entities::ItemModifier::new("AUTOFIRE").with_levels(5));
        let (profile, _) = item.profile(Edition::Sixth);
        let targets = [target("Thug", 4.0, 0.0)];
        let modifiers = SituationalModifiers {
            autofire_shots: Some(3),
            ..SituationalModifiers::default()
        };
        let mut dice = ScriptedDice::new([3, 3, 4]);
        let result =
            resolve_to_hit(request(&profile, &targets, &modifiers), &mut dice).expect("rolls");
        let totals: Vec<i32> = result.hits.iter().map(|h| h.total).collect();
        assert_eq!(totals, vec![8, 6, 4]);
        assert_eq!(result.hit_count(), 3);
        assert_eq!(result.hits[2].shot, 3);
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn area_attacks_need_a_template() {
        let profile = AttackProfile {
            area: Some(AreaEffect {
                shape: AreaShape::Radius,
                explosion: true,
                selective: false,
            }),
            ..AttackProfile::default()
        };
        let targets = [target("A", 8.0, 0.0), target("B", 8.0, 0.0)];
        let modifiers = SituationalModifiers::default();
        let mut dice = ScriptedDice::new([6, 6, 5]);
        assert_eq!(
            resolve_to_hit(request(&profile, &targets, &modifiers), &mut dice),
            Err(AttackFailure::NoTemplate)
        );

        let template = AreaTemplate { size: 4.0 };
        let mut req = request(&profile, &targets, &modifiers);
        req.template = Some(&template);
        let result = resolve_to_hit(req, &mut dice).expect("area roll");
        assert!(result.attack_roll.is_some());
        assert!(result.hits.iter().all(|h| h.outcome == HitOutcome::AreaHit));
        assert!(result.hits.iter().all(|h| h.margin.is_none()));
    }

    #[test]
    fn zero_targets_still_roll_once() {
        let profile = AttackProfile::default();
        let modifiers = SituationalModifiers::default();
        let mut dice = ScriptedDice::new([2, 3, 4]);
        let result = resolve_to_hit(request(&profile, &[], &modifiers), &mut dice).expect("rolls");
        assert!(result.hits.is_empty());
        assert_eq!(
            result.attack_roll.map(|r| r.success_total()),
            Some(18 - 9)
        );
    }

    #[test]
    fn resources_are_checked() {
        let attacker = ActorSheet::new("Ironclad", Edition::Sixth).with_characteristic("END", 3);
        let item = AttackItem::new("Punch", AttackKind::Normal, DamageDice::new(12));
        assert!(check_resources(&item.clone().with_end_cost(3), &attacker).is_ok());
        assert!(matches!(
            check_resources(&item.clone().with_end_cost(6), &attacker),
            Err(AttackFailure::InsufficientEndurance { available: 3, .. })
        ));
        assert!(matches!(
            check_resources(&item.with_charges(0), &attacker),
            Err(AttackFailure::NoCharges { .. })
        ));
    }
}
