//! Roll breakdowns: one line per term plus named totals.

use serde::{Deserialize, Serialize};

use herocombat_domain::{RollAudit, TermKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownLine {
    pub label: String,
    /// "3", "½d6: 2", "-1d6: 4"
    pub detail: String,
    pub value: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollBreakdown {
    pub flavor: String,
    pub lines: Vec<BreakdownLine>,
    pub totals: Vec<(String, i32)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stun_multiplier: Option<i32>,
}

impl RollBreakdown {
    pub fn total(&self, name: &str) -> Option<i32> {
        self.totals
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| *value)
    }
}

impl From<&RollAudit> for RollBreakdown {
    fn from(audit: &RollAudit) -> Self {
        let lines = audit
            .terms
            .iter()
            .map(|term| {
                let sign = if term.negative { "-" } else { "" };
                let detail = match (term.kind, term.face) {
                    (TermKind::Number, _) => format!("{}", term.value),
                    (kind, Some(face)) => format!("{}{}: {}", sign, die_label(kind), face),
                    (kind, None) => format!("{}{}", sign, die_label(kind)),
                };
                BreakdownLine {
                    label: term.label.clone(),
                    detail,
                    value: term.value,
                    body: term.body,
                }
            })
            .collect();

        Self {
            flavor: audit.flavor.to_string(),
            lines,
            totals: audit
                .totals
                .iter()
                .map(|t| (t.name.clone(), t.value))
                .collect(),
            hit_location: audit.hit_location.clone(),
            stun_multiplier: audit.stun_multiplier,
        }
    }
}

fn die_label(kind: TermKind) -> &'static str {
    match kind {
        TermKind::Die => "1d6",
        TermKind::HalfDie => "½d6",
        TermKind::DieMinusOne => "1d6-1",
        TermKind::Number => "",
    }
}
