//! Value objects - Immutable objects defined by their attributes

mod defense;
mod dice;
mod edition;
mod hit_location;
mod rounding;

pub use defense::{DefenseProfile, DefenseTag};
pub use dice::{
    normal_body_for_value, Adjustment, AuditTerm, AuditTotal, Basic, DamageDice, DamageKind,
    DamageRoll, DiceParseError, Entangle, Flash, Killing, Normal, RandomSource, Roll, RollAudit,
    RollError, RollFlavor, RollKind, RollModifiers, RollRecord, RollSpec, RollTerm,
    StunMultiplierRoll, SubRolls, Success, TermKind,
};
pub use edition::Edition;
pub use hit_location::{HitLocation, HitLocationRoll, LocationName, Multiplier, Side};
pub use rounding::{round_favor_player_down, round_favor_player_up};

#[cfg(test)]
pub(crate) use dice::ScriptedDice;
