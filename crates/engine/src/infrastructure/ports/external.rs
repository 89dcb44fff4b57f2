//! Defense lookup and presentation ports.

use async_trait::async_trait;
use herocombat_domain::{ActorSheet, AttackItem, DefenseProfile, DefenseTag, RollAudit};
use herocombat_shared::AttackReport;

use super::error::RepoError;

/// Choices the attacker made about the target's defenses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefenseOptions {
    /// Source ids of defenses to leave out
    pub ignore_defense_ids: Vec<String>,
}

impl DefenseOptions {
    pub fn ignores(&self, source_id: &str) -> bool {
        self.ignore_defense_ids.iter().any(|id| id == source_id)
    }
}

/// Works out which of a target's defenses apply against an attack.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DefensePort: Send + Sync {
    async fn determine_defense(
        &self,
        target: &ActorSheet,
        item: &AttackItem,
        options: &DefenseOptions,
    ) -> Result<(DefenseProfile, Vec<DefenseTag>), RepoError>;
}

/// Turns results into text for a table.
pub trait PresentationPort: Send + Sync {
    /// One line per term plus a totals line.
    fn render_roll(&self, audit: &RollAudit) -> Vec<String>;

    fn render_report(&self, report: &AttackReport) -> String;
}
