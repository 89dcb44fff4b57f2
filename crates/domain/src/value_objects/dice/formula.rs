//! HERO damage notation: "3d6", "2½d6+1", "4d6-1".
//!
//! Only six-sided dice exist in this system. A trailing "-1" reads as one
//! die-minus-one rather than a flat penalty, so "3d6-1" is 2d6 plus a d6-1.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::kind::RollKind;
use super::roll::RollSpec;
use crate::value_objects::edition::Edition;

/// Error when parsing a dice formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceParseError {
    /// The formula string is empty
    #[error("Empty dice formula")]
    Empty,
    /// Invalid format - expected Nd6, N½d6 or Nd6+M
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
    /// Anything other than d6
    #[error("Only d6 is supported, got d{0}")]
    InvalidDieSize(String),
    /// Parsed to nothing at all
    #[error("Dice formula has no dice and no pips")]
    NoTerms,
}

/// Damage dice as written on an attack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DamageDice {
    /// Whole d6
    pub dice: u32,
    pub half_die: bool,
    /// One extra d6-1
    pub minus_one: bool,
    /// Flat adds
    pub pips: i32,
}

impl DamageDice {
    pub fn new(dice: u32) -> Self {
        Self {
            dice,
            ..Self::default()
        }
    }

    pub fn with_half_die(mut self) -> Self {
        self.half_die = true;
        self
    }

    pub fn with_pips(mut self, pips: i32) -> Self {
        self.pips = pips;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.dice == 0 && !self.half_die && !self.minus_one && self.pips == 0
    }

    /// Parse HERO notation.
    ///
    /// Accepted forms:
    /// - "3d6", "d6"
    /// - "2½d6", "2.5d6", "2 1/2d6", "½d6"
    /// - "3d6+1", "1d6-1"
    pub fn parse(input: &str) -> Result<Self, DiceParseError> {
        let normalized = input
            .trim()
            .to_lowercase()
            .replace(" 1/2", "½")
            .replace("1/2", "½")
            .replace(".5", "½")
            .replace(' ', "");
        if normalized.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let d_pos = normalized.find('d').ok_or_else(|| {
            DiceParseError::InvalidFormat(format!("Missing 'd' separator in '{}'", input.trim()))
        })?;

        let count_str = &normalized[..d_pos];
        let (count_str, half_die) = match count_str.strip_suffix('½') {
            Some(rest) => (rest, true),
            None => (count_str, false),
        };
        let dice: u32 = match (count_str.is_empty(), half_die) {
            (true, true) => 0,
            (true, false) => 1,
            _ => count_str.parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid dice count: '{}'", count_str))
            })?,
        };

        let after_d = &normalized[d_pos + 1..];
        let split = after_d.find(['+', '-']).unwrap_or(after_d.len());
        let (size_str, modifier_str) = after_d.split_at(split);
        if size_str != "6" {
            return Err(DiceParseError::InvalidDieSize(size_str.to_string()));
        }

        let modifier: i32 = if modifier_str.is_empty() {
            0
        } else {
            modifier_str
                .strip_prefix('+')
                .unwrap_or(modifier_str)
                .parse()
                .map_err(|_| {
                    DiceParseError::InvalidFormat(format!("Invalid modifier: '{}'", modifier_str))
                })?
        };

        let parsed = if modifier == -1 && dice > 0 {
            Self {
                dice: dice - 1,
                half_die,
                minus_one: true,
                pips: 0,
            }
        } else {
            Self {
                dice,
                half_die,
                minus_one: false,
                pips: modifier,
            }
        };

        if parsed.is_empty() {
            return Err(DiceParseError::NoTerms);
        }
        Ok(parsed)
    }

    /// Builder holding these dice, ready for modifiers and a roll.
    pub fn to_spec<K: RollKind>(&self, edition: Edition) -> RollSpec<K> {
        let mut spec = RollSpec::<K>::new(edition).add_dice(self.dice);
        if self.half_die {
            spec = spec.add_half_dice(1);
        }
        if self.minus_one {
            spec = spec.add_dice_minus_one(1);
        }
        spec.add_number(self.pips, "Pips")
    }
}

impl fmt::Display for DamageDice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.dice + u32::from(self.minus_one);
        match (whole, self.half_die) {
            (0, true) => write!(f, "½d6")?,
            (n, true) => write!(f, "{}½d6", n)?,
            (n, false) => write!(f, "{}d6", n)?,
        }
        if self.minus_one {
            write!(f, "-1")?;
        }
        if self.pips != 0 {
            write!(f, "{:+}", self.pips)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for DamageDice {
    type Err = DiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::dice::kind::Normal;
    use crate::value_objects::dice::source::ScriptedDice;
    use crate::value_objects::dice::term::TermKind;

    #[test]
    fn test_parse_simple() {
        assert_eq!(DamageDice::parse("3d6"), Ok(DamageDice::new(3)));
        assert_eq!(DamageDice::parse("D6"), Ok(DamageDice::new(1)));
    }

    #[test]
    fn test_parse_half_die() {
        let expected = DamageDice::new(2).with_half_die().with_pips(1);
        assert_eq!(DamageDice::parse("2½d6+1"), Ok(expected));
        assert_eq!(DamageDice::parse("2.5d6+1"), Ok(expected));
        assert_eq!(DamageDice::parse("2 1/2d6+1"), Ok(expected));
        assert_eq!(DamageDice::parse("½d6"), Ok(DamageDice::new(0).with_half_die()));
    }

    #[test]
    fn test_parse_minus_one() {
        let dice = DamageDice::parse("3d6-1").expect("parse");
        assert_eq!(dice.dice, 2);
        assert!(dice.minus_one);
        assert_eq!(dice.pips, 0);
        assert_eq!(dice.to_string(), "3d6-1");
    }

    #[test]
    fn test_parse_pip() {
        let dice = DamageDice::parse("1d6+1").expect("parse");
        assert_eq!(dice, DamageDice::new(1).with_pips(1));
        assert_eq!(dice.to_string(), "1d6+1");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(DamageDice::parse("  "), Err(DiceParseError::Empty));
        assert!(matches!(
            DamageDice::parse("2d8"),
            Err(DiceParseError::InvalidDieSize(_))
        ));
        assert!(matches!(
            DamageDice::parse("abc"),
            Err(DiceParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            DamageDice::parse("xd6"),
            Err(DiceParseError::InvalidFormat(_))
        ));
        assert_eq!(DamageDice::parse("0d6"), Err(DiceParseError::NoTerms));
    }

    #[test]
    fn test_spec_from_dice() {
        let spec = DamageDice::parse("2½d6+1")
            .expect("parse")
            .to_spec::<Normal>(Edition::Sixth);
        let kinds: Vec<TermKind> = spec.terms().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TermKind::Die, TermKind::Die, TermKind::HalfDie, TermKind::Number]
        );

        let mut dice = ScriptedDice::new([6, 4, 5]);
        let roll = spec.roll(&mut dice);
        assert_eq!(roll.stun_total(), 6 + 4 + 2 + 1);
    }
}
