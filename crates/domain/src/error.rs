//! Unified error types for the domain layer
//!
//! Provides a common error type that can be used across all domain operations,
//! enabling consistent error handling without forcing adapters to use String or anyhow.

use thiserror::Error;

use crate::game_systems::hero::{AdjustmentError, AttackFailure};
use crate::value_objects::{DiceParseError, RollError};

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// A stored roll record could not be restored
    #[error("Roll error: {0}")]
    Roll(#[from] RollError),

    /// The attack could not be made at all
    #[error("Attack aborted: {0}")]
    Attack(#[from] AttackFailure),

    /// An adjustment power was misconfigured for its target
    #[error("Adjustment rejected: {0}")]
    Adjustment(#[from] AdjustmentError),
}

impl DomainError {
    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<DiceParseError> for DomainError {
    fn from(err: DiceParseError) -> Self {
        Self::Parse(err.to_string())
    }
}
