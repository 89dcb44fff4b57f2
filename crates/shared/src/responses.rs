//! Reports returned from the engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use herocombat_domain::{Edition, HitOutcome};

use crate::breakdown::RollBreakdown;

// =============================================================================
// Response Result
// =============================================================================

/// Result of a request operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResponseResult {
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<serde_json::Value>,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
    /// Unknown response type for forward compatibility
    #[serde(other)]
    Unknown,
}

impl ResponseResult {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ResponseResult::Error {
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResponseResult::Error { .. })
    }
}

/// Error classification codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Actor or item not found
    NotFound,
    /// The attack could not be made (no token, no charges, no template)
    AttackAborted,
    /// Adjustment targets did not validate
    ValidationError,
    /// Resolution finished but the results were not saved
    PersistenceFailed,
    InternalError,
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Attack Report
// =============================================================================

/// Everything that happened during one attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackReport {
    pub resolution_id: Uuid,
    /// RFC 3339 timestamp
    pub resolved_at: String,
    pub edition: Edition,
    pub attacker: String,
    pub item: String,
    pub attack_roll: RollBreakdown,
    pub targets: Vec<TargetReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// False when the apply stage failed after resolution
    pub applied: bool,
}

impl AttackReport {
    pub fn hit_count(&self) -> usize {
        self.targets.iter().filter(|t| t.outcome.is_hit()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<Uuid>,
    pub name: String,
    /// Autofire shot index, 0 for single attacks
    #[serde(default)]
    pub shot: u32,
    pub outcome: HitOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<DamageReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<AdjustmentLine>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_adjustments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knockback: Option<String>,
    #[serde(default)]
    pub stunned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageReport {
    pub body: i32,
    pub stun: i32,
    pub raw_body: i32,
    pub raw_stun: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stun_multiplier: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defense_tags: Vec<String>,
    pub roll: RollBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentLine {
    pub actor_id: Uuid,
    pub identifier: String,
    pub delta: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resulting_value: Option<i32>,
}
