//! HERO System combat domain.
//!
//! Dice, rule tables, sheets, and the pure resolvers that turn an attack
//! into effects. Nothing in this crate performs I/O or draws randomness
//! on its own; callers pass a [`RandomSource`].

pub mod entities;
pub mod error;
pub mod events;
pub mod game_systems;
pub mod ids;
pub mod value_objects;

pub use entities::{
    AbsorptionCap, ActorCondition, ActorSheet, AdjustmentPower, AreaEffect, AreaShape, AttackItem,
    AttackKind, AttackProfile, CombatValue, ItemModifier, PowerEntry, SimultaneousEffect,
    StunBodyDamage,
};

pub use error::DomainError;
pub use events::{ActorUpdate, CombatEffect, DataWarning, HitOutcome};

pub use game_systems::{GameSystem, GameSystemRegistry, HeroSystem};

pub use ids::{ActorId, ItemId, PowerId, ResolutionId};

pub use value_objects::{
    normal_body_for_value, round_favor_player_down, round_favor_player_up, Adjustment,
    AuditTerm, AuditTotal, Basic, DamageDice, DamageKind, DamageRoll, DefenseProfile, DefenseTag,
    DiceParseError, Edition, Entangle, Flash, HitLocation, HitLocationRoll, Killing,
    LocationName, Multiplier, Normal, RandomSource, Roll, RollAudit, RollError, RollFlavor,
    RollKind, RollModifiers, RollRecord, RollSpec, RollTerm, Side, StunMultiplierRoll, SubRolls,
    Success, TermKind,
};
