//! Individual roll terms.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::value_objects::rounding::round_favor_player_down;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TermKind {
    /// A full d6
    Die,
    /// A d6 halved: 1-3 for the usual "½d6"
    HalfDie,
    /// A d6 read one lower, never below zero
    DieMinusOne,
    /// A flat number
    Number,
}

impl TermKind {
    pub fn is_dice(&self) -> bool {
        !matches!(self, TermKind::Number)
    }

    /// Full dice outrank partial dice, which outrank flat numbers.
    pub fn rank(&self) -> u8 {
        match self {
            TermKind::Die => 2,
            TermKind::HalfDie | TermKind::DieMinusOne => 1,
            TermKind::Number => 0,
        }
    }

    fn default_label(&self) -> &'static str {
        match self {
            TermKind::Die => "d6",
            TermKind::HalfDie => "½d6",
            TermKind::DieMinusOne => "d6-1",
            TermKind::Number => "",
        }
    }
}

/// Body a single normal-damage die is worth for a given value.
pub fn normal_body_for_value(value: i32) -> i32 {
    match value {
        v if v <= 1 => 0,
        v if v >= 6 => 2,
        _ => 1,
    }
}

/// One signed contribution to a roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollTerm {
    pub kind: TermKind,
    /// Subtracted rather than added
    pub negative: bool,
    pub label: Option<String>,
    /// Face shown once rolled; always `None` for numbers
    pub face: Option<u8>,
    /// Magnitude of a flat number; zero for dice
    pub number: i32,
}

impl RollTerm {
    pub fn die(kind: TermKind, negative: bool, label: Option<String>) -> Self {
        Self {
            kind,
            negative,
            label,
            face: None,
            number: 0,
        }
    }

    pub fn number(value: i32, label: Option<String>) -> Self {
        Self {
            kind: TermKind::Number,
            negative: value < 0,
            label,
            face: None,
            number: value.abs(),
        }
    }

    pub fn is_rolled(&self) -> bool {
        !self.kind.is_dice() || self.face.is_some()
    }

    /// Unsigned value this term contributes. Unrolled dice read as zero.
    pub fn magnitude(&self) -> i32 {
        match (self.kind, self.face) {
            (TermKind::Number, _) => self.number,
            (_, None) => 0,
            (TermKind::Die, Some(face)) => i32::from(face),
            (TermKind::HalfDie, Some(face)) => {
                round_favor_player_down(f64::from(face) / 2.0).max(1)
            }
            (TermKind::DieMinusOne, Some(face)) => (i32::from(face) - 1).max(0),
        }
    }

    pub fn signed_value(&self) -> i32 {
        self.signed(self.magnitude())
    }

    /// Normal-damage Body for this term; flat numbers carry none.
    pub fn signed_normal_body(&self) -> i32 {
        if self.kind.is_dice() {
            self.signed(normal_body_for_value(self.magnitude()))
        } else {
            0
        }
    }

    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => self.kind.default_label().to_string(),
        }
    }

    fn signed(&self, value: i32) -> i32 {
        if self.negative {
            -value
        } else {
            value
        }
    }

    /// Ordering used when stripping the strongest dice (explosion falloff,
    /// damage negation): rank first, then value, highest first.
    pub(crate) fn strength_cmp(&self, other: &Self) -> Ordering {
        other
            .kind
            .rank()
            .cmp(&self.kind.rank())
            .then_with(|| other.magnitude().cmp(&self.magnitude()))
    }
}
