//! Use cases - user story orchestration across ports.

pub mod combat;

pub use combat::{
    ApplyResolution, AttackError, AttackResolution, CombatUseCases, ResolveAttack,
};
