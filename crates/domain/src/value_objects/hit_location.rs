//! Hit location table.
//!
//! A 3d6 location roll picks a body part. Each part carries damage
//! multipliers (in halves, so ½ and 1½ stay integral) and the OCV penalty
//! for aiming at it deliberately.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::rounding::round_favor_player_down;
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationName {
    Head,
    Hands,
    Arms,
    Shoulders,
    Chest,
    Stomach,
    Vitals,
    Thighs,
    Legs,
    Feet,
}

impl LocationName {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationName::Head => "Head",
            LocationName::Hands => "Hands",
            LocationName::Arms => "Arms",
            LocationName::Shoulders => "Shoulders",
            LocationName::Chest => "Chest",
            LocationName::Stomach => "Stomach",
            LocationName::Vitals => "Vitals",
            LocationName::Thighs => "Thighs",
            LocationName::Legs => "Legs",
            LocationName::Feet => "Feet",
        }
    }
}

impl fmt::Display for LocationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LocationName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HIT_LOCATIONS
            .iter()
            .map(|entry| entry.name)
            .find(|name| name.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::parse(format!("Unknown hit location: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// 1-3 is left, 4-6 is right.
    pub fn from_face(face: u8) -> Self {
        if face <= 3 {
            Side::Left
        } else {
            Side::Right
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "Left"),
            Side::Right => write!(f, "Right"),
        }
    }
}

/// A damage multiplier expressed in halves (`3` means x1½).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Multiplier {
    halves: u8,
}

impl Multiplier {
    pub const fn halves(halves: u8) -> Self {
        Self { halves }
    }

    pub const fn whole(times: u8) -> Self {
        Self { halves: times * 2 }
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.halves) / 2.0
    }

    /// Scale a damage value; fractions round in the defender's favor.
    pub fn apply(&self, value: i32) -> i32 {
        round_favor_player_down(f64::from(value) * self.as_f64())
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.halves / 2;
        match (whole, self.halves % 2) {
            (0, 1) => write!(f, "x½"),
            (w, 1) => write!(f, "x{}½", w),
            (w, _) => write!(f, "x{}", w),
        }
    }
}

/// One row of the location table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitLocation {
    pub name: LocationName,
    /// Lowest and highest 3d6 totals that land here
    pub roll_range: (u8, u8),
    /// Stun multiplier for killing attacks
    pub stun_x: Multiplier,
    /// Stun multiplier for normal attacks
    pub n_stun_x: Multiplier,
    pub body_x: Multiplier,
    /// OCV modifier when this location is aimed at
    pub ocv_penalty: i32,
    /// Limbs and shoulders come in pairs
    pub sided: bool,
}

const HIT_LOCATIONS: [HitLocation; 10] = [
    HitLocation {
        name: LocationName::Head,
        roll_range: (3, 5),
        stun_x: Multiplier::whole(5),
        n_stun_x: Multiplier::whole(2),
        body_x: Multiplier::whole(2),
        ocv_penalty: -8,
        sided: false,
    },
    HitLocation {
        name: LocationName::Hands,
        roll_range: (6, 6),
        stun_x: Multiplier::whole(1),
        n_stun_x: Multiplier::halves(1),
        body_x: Multiplier::halves(1),
        ocv_penalty: -6,
        sided: true,
    },
    HitLocation {
        name: LocationName::Arms,
        roll_range: (7, 8),
        stun_x: Multiplier::whole(2),
        n_stun_x: Multiplier::halves(1),
        body_x: Multiplier::halves(1),
        ocv_penalty: -5,
        sided: true,
    },
    HitLocation {
        name: LocationName::Shoulders,
        roll_range: (9, 9),
        stun_x: Multiplier::whole(3),
        n_stun_x: Multiplier::whole(1),
        body_x: Multiplier::whole(1),
        ocv_penalty: -5,
        sided: true,
    },
    HitLocation {
        name: LocationName::Chest,
        roll_range: (10, 11),
        stun_x: Multiplier::whole(3),
        n_stun_x: Multiplier::whole(1),
        body_x: Multiplier::whole(1),
        ocv_penalty: -3,
        sided: false,
    },
    HitLocation {
        name: LocationName::Stomach,
        roll_range: (12, 12),
        stun_x: Multiplier::whole(4),
        n_stun_x: Multiplier::halves(3),
        body_x: Multiplier::whole(1),
        ocv_penalty: -7,
        sided: false,
    },
    HitLocation {
        name: LocationName::Vitals,
        roll_range: (13, 13),
        stun_x: Multiplier::whole(4),
        n_stun_x: Multiplier::halves(3),
        body_x: Multiplier::whole(2),
        ocv_penalty: -8,
        sided: false,
    },
    HitLocation {
        name: LocationName::Thighs,
        roll_range: (14, 14),
        stun_x: Multiplier::whole(2),
        n_stun_x: Multiplier::whole(1),
        body_x: Multiplier::whole(1),
        ocv_penalty: -4,
        sided: true,
    },
    HitLocation {
        name: LocationName::Legs,
        roll_range: (15, 16),
        stun_x: Multiplier::whole(2),
        n_stun_x: Multiplier::halves(1),
        body_x: Multiplier::halves(1),
        ocv_penalty: -6,
        sided: true,
    },
    HitLocation {
        name: LocationName::Feet,
        roll_range: (17, 18),
        stun_x: Multiplier::whole(1),
        n_stun_x: Multiplier::halves(1),
        body_x: Multiplier::halves(1),
        ocv_penalty: -8,
        sided: true,
    },
];

impl HitLocation {
    /// The full table, head to feet.
    pub fn table() -> &'static [HitLocation] {
        &HIT_LOCATIONS
    }

    /// Location for a 3d6 total. Totals outside 3-18 clamp to the ends.
    pub fn for_roll(total: u8) -> &'static HitLocation {
        let total = total.clamp(3, 18);
        HIT_LOCATIONS
            .iter()
            .find(|entry| total >= entry.roll_range.0 && total <= entry.roll_range.1)
            .unwrap_or(&HIT_LOCATIONS[0])
    }

    pub fn get(name: LocationName) -> &'static HitLocation {
        HIT_LOCATIONS
            .iter()
            .find(|entry| entry.name == name)
            .unwrap_or(&HIT_LOCATIONS[0])
    }
}

/// The location sub-roll attached to a damage roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitLocationRoll {
    pub location: LocationName,
    pub side: Option<Side>,
    /// The 3d6 faces; empty for an aimed shot
    pub faces: Vec<u8>,
    pub side_face: Option<u8>,
    pub aimed: bool,
}

impl HitLocationRoll {
    pub fn entry(&self) -> &'static HitLocation {
        HitLocation::get(self.location)
    }

    /// "Left Arms", "Head"
    pub fn label(&self) -> String {
        match self.side {
            Some(side) => format!("{} {}", side, self.location),
            None => self.location.to_string(),
        }
    }
}
