//! Adjustment powers: drain, aid, healing, transfer, absorption, suppress,
//! dispel.
//!
//! The item's input string names what is lowered and what is raised.
//! Transfer writes both sides as `"A, B -> C, D"`; every other power lists
//! one side only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{ActorSheet, AdjustmentPower, SimultaneousEffect};
use crate::events::{CombatEffect, DataWarning};
use crate::value_objects::Edition;
use crate::ActorId;

const TRANSFER_ARROW: &str = "->";

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdjustmentError {
    #[error("{power} has nothing listed to adjust")]
    MissingInput { power: AdjustmentPower },
    #[error("Transfer input must look like \"A, B -> C, D\", got \"{input}\"")]
    MalformedTransfer { input: String },
    #[error("{power} cannot affect {identifier} on {actor}")]
    InvalidTarget {
        power: AdjustmentPower,
        identifier: String,
        actor: String,
    },
    #[error("Transfer needs the attacker's sheet to raise")]
    MissingSource,
}

/// Parsed adjustment target lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentSpec {
    pub reduces: Vec<String>,
    pub enhances: Vec<String>,
    /// Set once every identifier has been checked against the sheets
    pub valid: bool,
}

impl AdjustmentSpec {
    pub fn parse(power: AdjustmentPower, input: &str) -> Result<Self, AdjustmentError> {
        let spec = if power == AdjustmentPower::Transfer {
            let (reduces, enhances) = input.split_once(TRANSFER_ARROW).ok_or_else(|| {
                AdjustmentError::MalformedTransfer {
                    input: input.to_string(),
                }
            })?;
            let spec = Self {
                reduces: split_list(reduces),
                enhances: split_list(enhances),
                valid: false,
            };
            if spec.reduces.is_empty() || spec.enhances.is_empty() {
                return Err(AdjustmentError::MalformedTransfer {
                    input: input.to_string(),
                });
            }
            spec
        } else if power.enhances_only() {
            Self {
                enhances: split_list(input),
                ..Self::default()
            }
        } else {
            Self {
                reduces: split_list(input),
                ..Self::default()
            }
        };

        if spec.reduces.is_empty() && spec.enhances.is_empty() {
            return Err(AdjustmentError::MissingInput { power });
        }
        Ok(spec)
    }

    /// Check every identifier, marking the spec valid on success.
    ///
    /// Aid, healing, absorption and the raised side of a transfer must name
    /// something the changed sheet really has. Everything else only needs to
    /// be a characteristic of the edition or a power the target has by name
    /// or type. The asymmetry is deliberate and kept as-is.
    pub fn validate(
        &mut self,
        power: AdjustmentPower,
        edition: Edition,
        target: &ActorSheet,
        source: Option<&ActorSheet>,
    ) -> Result<(), AdjustmentError> {
        for identifier in &self.reduces {
            if !permissive_match(edition, target, identifier) {
                return Err(invalid(power, identifier, target));
            }
        }

        let enhanced_sheet = if power == AdjustmentPower::Transfer {
            source.ok_or(AdjustmentError::MissingSource)?
        } else {
            target
        };
        for identifier in &self.enhances {
            let ok = if power.enhances_only() || power == AdjustmentPower::Transfer {
                strict_match(enhanced_sheet, identifier)
            } else {
                permissive_match(edition, enhanced_sheet, identifier)
            };
            if !ok {
                return Err(invalid(power, identifier, enhanced_sheet));
            }
        }

        self.valid = true;
        Ok(())
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn strict_match(sheet: &ActorSheet, identifier: &str) -> bool {
    sheet.has_characteristic(identifier) || sheet.power_named(identifier).is_some()
}

fn permissive_match(edition: Edition, sheet: &ActorSheet, identifier: &str) -> bool {
    edition.is_characteristic(identifier) || sheet.find_power(identifier).is_some()
}

fn invalid(power: AdjustmentPower, identifier: &str, sheet: &ActorSheet) -> AdjustmentError {
    AdjustmentError::InvalidTarget {
        power,
        identifier: identifier.to_string(),
        actor: sheet.name.clone(),
    }
}

/// How many identifiers one use may affect; `None` is unbounded.
pub fn simultaneous_cap(
    edition: Edition,
    simultaneous: SimultaneousEffect,
    item_name: &str,
) -> (Option<usize>, Option<DataWarning>) {
    match (edition, simultaneous) {
        (Edition::Fifth, SimultaneousEffect::VariableEffect { cost: Some(cost) }) => {
            if is_tier(cost, 0.5) {
                (Some(2), None)
            } else if is_tier(cost, 1.0) {
                (Some(4), None)
            } else if is_tier(cost, 2.0) {
                (None, None)
            } else {
                (
                    Some(1),
                    Some(DataWarning::UnknownVariableEffectCost {
                        item: item_name.to_string(),
                        cost,
                    }),
                )
            }
        }
        (Edition::Sixth, SimultaneousEffect::ExpandedEffect { levels }) => {
            (Some(levels.max(1) as usize), None)
        }
        _ => (Some(1), None),
    }
}

fn is_tier(cost: f64, tier: f64) -> bool {
    (cost - tier).abs() < f64::EPSILON
}

/// Absorption's extra limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorptionInput {
    /// Body of the attack being absorbed
    pub attack_body: i32,
    /// The absorbing power's own maximum, already rolled if it is dice
    pub cap: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct AdjustmentRequest<'a> {
    pub item_name: &'a str,
    pub power: AdjustmentPower,
    pub input: Option<&'a str>,
    pub simultaneous: SimultaneousEffect,
    pub edition: Edition,
    pub target: &'a ActorSheet,
    /// The attacker; required for transfer
    pub source: Option<&'a ActorSheet>,
    /// Amount left after defenses
    pub defended: i32,
    /// Amount before defenses; what a transfer gives the attacker
    pub raw: i32,
    pub absorption: Option<AbsorptionInput>,
}

/// One identifier changed on one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentOutcome {
    pub actor: ActorId,
    pub identifier: String,
    pub delta: i32,
    /// Value after the change, when the sheet knows the identifier
    pub resulting_value: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentResult {
    pub spec: AdjustmentSpec,
    pub outcomes: Vec<AdjustmentOutcome>,
    /// Identifiers past the simultaneous-effect cap
    pub skipped: Vec<String>,
    pub effects: Vec<CombatEffect>,
    pub warnings: Vec<DataWarning>,
}

/// Work out which identifiers move and by how much.
///
/// Nothing is changed on either sheet; the result carries effects for the
/// apply stage.
pub fn resolve_adjustment(
    request: AdjustmentRequest<'_>,
) -> Result<AdjustmentResult, AdjustmentError> {
    let power = request.power;
    let input = request
        .input
        .filter(|s| !s.trim().is_empty())
        .ok_or(AdjustmentError::MissingInput { power })?;
    let mut spec = AdjustmentSpec::parse(power, input)?;
    spec.validate(power, request.edition, request.target, request.source)?;

    let (cap, cap_warning) =
        simultaneous_cap(request.edition, request.simultaneous, request.item_name);
    let mut warnings: Vec<DataWarning> = cap_warning.into_iter().collect();
    let mut skipped = Vec::new();
    let mut outcomes = Vec::new();

    let (reduced, excess) = split_at_cap(&spec.reduces, cap);
    skipped.extend(excess.iter().cloned());
    for identifier in reduced {
        outcomes.push(outcome_for(
            request.edition,
            request.target,
            identifier,
            -request.defended,
        ));
    }

    let (enhanced, excess) = split_at_cap(&spec.enhances, cap);
    skipped.extend(excess.iter().cloned());
    let (enhanced_sheet, amount) = match (power, request.source) {
        (AdjustmentPower::Transfer, Some(source)) => (source, request.raw),
        (AdjustmentPower::Absorption, _) => (
            request.target,
            absorbed_amount(request.defended, request.absorption),
        ),
        _ => (request.target, request.defended),
    };
    for identifier in enhanced {
        outcomes.push(outcome_for(
            request.edition,
            enhanced_sheet,
            identifier,
            amount,
        ));
    }

    if !skipped.is_empty() {
        warnings.push(DataWarning::SkippedAdjustmentTargets {
            item: request.item_name.to_string(),
            skipped: skipped.clone(),
        });
    }

    let effects = outcomes
        .iter()
        .filter(|o| o.delta != 0)
        .map(|o| effect_for(request.edition, request, o))
        .collect();

    Ok(AdjustmentResult {
        spec,
        outcomes,
        skipped,
        effects,
        warnings,
    })
}

fn split_at_cap(list: &[String], cap: Option<usize>) -> (&[String], &[String]) {
    match cap {
        Some(cap) if cap < list.len() => list.split_at(cap),
        _ => (list, &[]),
    }
}

/// min(defended, cap, attack Body)
fn absorbed_amount(defended: i32, absorption: Option<AbsorptionInput>) -> i32 {
    match absorption {
        Some(input) => defended.min(input.cap).min(input.attack_body).max(0),
        None => defended,
    }
}

fn is_characteristic(edition: Edition, sheet: &ActorSheet, identifier: &str) -> bool {
    sheet.has_characteristic(identifier)
        || (edition.is_characteristic(identifier) && sheet.find_power(identifier).is_none())
}

fn outcome_for(
    edition: Edition,
    sheet: &ActorSheet,
    identifier: &str,
    delta: i32,
) -> AdjustmentOutcome {
    let current = if is_characteristic(edition, sheet, identifier) {
        sheet.characteristic(identifier)
    } else {
        sheet.find_power(identifier).map(|p| p.effective_points())
    };
    AdjustmentOutcome {
        actor: sheet.id,
        identifier: identifier.to_string(),
        delta,
        resulting_value: current.map(|value| value + delta),
    }
}

fn effect_for(
    edition: Edition,
    request: AdjustmentRequest<'_>,
    outcome: &AdjustmentOutcome,
) -> CombatEffect {
    let sheet = match request.source {
        Some(source) if source.id == outcome.actor => source,
        _ => request.target,
    };
    if is_characteristic(edition, sheet, &outcome.identifier) {
        CombatEffect::characteristic(
            outcome.actor,
            outcome.identifier.to_ascii_uppercase(),
            outcome.delta,
        )
    } else {
        let power = sheet
            .find_power(&outcome.identifier)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| outcome.identifier.clone());
        CombatEffect::power(outcome.actor, power, outcome.delta)
    }
}
