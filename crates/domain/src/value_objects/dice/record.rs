//! Serialized rolls and audit output.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use thiserror::Error;

use super::kind::{RollFlavor, RollKind};
use super::roll::{Roll, RollModifiers, SubRolls};
use super::term::{RollTerm, TermKind};

/// Failure restoring a roll from a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollError {
    #[error("Record holds a {found} roll, expected {expected}")]
    FlavorMismatch {
        expected: RollFlavor,
        found: RollFlavor,
    },
    #[error("Term {index} has no rolled face")]
    MissingFace { index: usize },
    #[error("Term {index} has face {face}, outside 1-6")]
    InvalidFace { index: usize, face: u8 },
    #[error("Record is missing its {0} sub-roll")]
    MissingSubRoll(&'static str),
    #[error("A {0} roll cannot deal damage")]
    NotDamage(RollFlavor),
}

/// A rolled roll in transferable form.
///
/// Holds every face, so restoring it on another process reproduces the same
/// totals without drawing again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollRecord {
    pub flavor: RollFlavor,
    pub terms: Vec<RollTerm>,
    #[serde(default)]
    pub modifiers: RollModifiers,
    #[serde(default)]
    pub sub_rolls: SubRolls,
}

impl<K: RollKind> Roll<K> {
    pub fn to_record(&self) -> RollRecord {
        RollRecord {
            flavor: K::FLAVOR,
            terms: self.terms.clone(),
            modifiers: self.modifiers.clone(),
            sub_rolls: self.sub_rolls.clone(),
        }
    }

    pub fn from_record(record: RollRecord) -> Result<Self, RollError> {
        if record.flavor != K::FLAVOR {
            return Err(RollError::FlavorMismatch {
                expected: K::FLAVOR,
                found: record.flavor,
            });
        }
        for (index, term) in record.terms.iter().enumerate() {
            if !term.kind.is_dice() {
                continue;
            }
            match term.face {
                None if !record.modifiers.standard_effect => {
                    return Err(RollError::MissingFace { index })
                }
                Some(face) if !(1..=6).contains(&face) => {
                    return Err(RollError::InvalidFace { index, face })
                }
                _ => {}
            }
        }

        let is_damage = matches!(K::FLAVOR, RollFlavor::Normal | RollFlavor::Killing);
        if is_damage && record.modifiers.use_hit_locations && record.sub_rolls.hit_location.is_none()
        {
            return Err(RollError::MissingSubRoll("hit location"));
        }
        if K::FLAVOR == RollFlavor::Killing && record.sub_rolls.stun_multiplier.is_none() {
            return Err(RollError::MissingSubRoll("stun multiplier"));
        }

        Ok(Self {
            terms: record.terms,
            modifiers: record.modifiers,
            sub_rolls: record.sub_rolls,
            kind: PhantomData,
        })
    }

    /// Ordered term breakdown plus the totals meaningful for this flavor.
    pub fn audit(&self) -> RollAudit {
        let counts_body = matches!(
            K::FLAVOR,
            RollFlavor::Normal | RollFlavor::Flash | RollFlavor::Entangle
        );
        let terms = self
            .terms
            .iter()
            .map(|term| AuditTerm {
                label: term.display_label(),
                kind: term.kind,
                negative: term.negative,
                face: term.face,
                value: term.signed_value(),
                body: (counts_body && term.kind.is_dice()).then(|| term.signed_normal_body()),
            })
            .collect();

        let totals = match K::FLAVOR {
            RollFlavor::Success => vec![AuditTotal::new("Total", self.signed_sum())],
            RollFlavor::Normal => vec![
                AuditTotal::new("Stun", self.signed_sum().max(0)),
                AuditTotal::new("Body", self.normal_body_sum().max(0)),
            ],
            RollFlavor::Killing => vec![
                AuditTotal::new("Body", self.killing_body()),
                AuditTotal::new("Stun", self.killing_stun()),
            ],
            RollFlavor::Adjustment => {
                vec![AuditTotal::new("Active Points", self.signed_sum().max(0))]
            }
            RollFlavor::Flash => vec![AuditTotal::new("Segments", self.normal_body_sum().max(0))],
            RollFlavor::Entangle => vec![AuditTotal::new("Body", self.normal_body_sum().max(0))],
            RollFlavor::Basic => vec![AuditTotal::new("Total", self.signed_sum())],
        };

        RollAudit {
            flavor: K::FLAVOR,
            terms,
            totals,
            hit_location: self.sub_rolls.hit_location.as_ref().map(|l| l.label()),
            stun_multiplier: self.sub_rolls.stun_multiplier.as_ref().map(|m| m.total),
            standard_effect: self.modifiers.standard_effect,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTerm {
    pub label: String,
    pub kind: TermKind,
    pub negative: bool,
    pub face: Option<u8>,
    /// Signed contribution to the total
    pub value: i32,
    /// Normal-style Body for dice, when the flavor counts it
    pub body: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTotal {
    pub name: String,
    pub value: i32,
}

impl AuditTotal {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Everything a presenter needs to explain a roll without recomputing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollAudit {
    pub flavor: RollFlavor,
    pub terms: Vec<AuditTerm>,
    pub totals: Vec<AuditTotal>,
    pub hit_location: Option<String>,
    pub stun_multiplier: Option<i32>,
    pub standard_effect: bool,
}

impl RollAudit {
    pub fn total(&self, name: &str) -> Option<i32> {
        self.totals.iter().find(|t| t.name == name).map(|t| t.value)
    }
}
