//! HeroCombat Shared - wire types for callers of the combat engine
//!
//! - Attack requests (who attacks whom, with what, under which modifiers)
//! - Attack reports (hits, damage, knockback, adjustments, warnings)
//! - Roll breakdowns built from domain roll audits
//!
//! # Design Principles
//!
//! 1. **No business logic** - Pure data types and serialization
//! 2. **No domain IDs** - use raw `uuid::Uuid` in DTOs

pub mod breakdown;
pub mod requests;
pub mod responses;

pub use breakdown::{BreakdownLine, RollBreakdown};
pub use requests::{AttackOptions, AttackRequest, TargetRequest, TemplateData};
pub use responses::{
    AdjustmentLine, AttackReport, DamageReport, ErrorCode, ResponseResult, TargetReport,
};
