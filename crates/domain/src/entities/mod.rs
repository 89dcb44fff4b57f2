//! Domain entities - combatants and the attacks they use

mod actor;
mod item;

pub use actor::{ActorCondition, ActorSheet, PowerEntry};
pub use item::{
    AbsorptionCap, AdjustmentPower, AreaEffect, AreaShape, AttackItem, AttackKind, AttackProfile,
    CombatValue, ItemModifier, SimultaneousEffect, StunBodyDamage,
};
