//! Rounding conventions.
//!
//! Every fractional value in the resolvers goes through one of these two
//! helpers so the direction never flips per call site.

/// Floor. Any fraction is dropped.
///
/// Used for values where rounding up would hand the attacker extra effect
/// (half dice, percentage damage reduction, fractional hit-location multipliers).
pub fn round_favor_player_down(value: f64) -> i32 {
    value.floor() as i32
}

/// Ceiling. Any fraction counts as a whole point.
///
/// Used for defender values such as a fractional DCV before the hit check.
pub fn round_favor_player_up(value: f64) -> i32 {
    value.ceil() as i32
}
