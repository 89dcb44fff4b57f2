//! Plain-text rendering of rolls and attack reports.

use std::fmt::Write;

use herocombat_domain::{HitOutcome, RollAudit};
use herocombat_shared::{AttackReport, RollBreakdown, TargetReport};

use crate::infrastructure::ports::PresentationPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct TextPresenter;

impl TextPresenter {
    pub fn new() -> Self {
        Self
    }

    fn breakdown_lines(breakdown: &RollBreakdown) -> Vec<String> {
        let mut lines: Vec<String> = breakdown
            .lines
            .iter()
            .map(|line| match line.body {
                Some(body) => format!("  {}: {} (body {})", line.label, line.detail, body),
                None => format!("  {}: {}", line.label, line.detail),
            })
            .collect();
        if let Some(location) = &breakdown.hit_location {
            lines.push(format!("  Hit location: {}", location));
        }
        if let Some(multiplier) = breakdown.stun_multiplier {
            lines.push(format!("  Stun multiplier: x{}", multiplier));
        }
        let totals = breakdown
            .totals
            .iter()
            .map(|(name, value)| format!("{} {}", name, value))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("  = {}", totals));
        lines
    }

    fn outcome_label(target: &TargetReport) -> String {
        let base = match target.outcome {
            HitOutcome::Hit { .. } => "Hit",
            HitOutcome::Miss { .. } => "Miss",
            HitOutcome::AutomaticHit => "Automatic hit",
            HitOutcome::AutomaticMiss => "Automatic miss",
            HitOutcome::AreaHit => "Hit (area)",
        };
        match &target.margin {
            Some(margin) => format!("{} by {}", base, margin),
            None => base.to_string(),
        }
    }
}

impl PresentationPort for TextPresenter {
    fn render_roll(&self, audit: &RollAudit) -> Vec<String> {
        Self::breakdown_lines(&RollBreakdown::from(audit))
    }

    fn render_report(&self, report: &AttackReport) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} attacks with {} ({})",
            report.attacker, report.item, report.edition
        );
        for line in Self::breakdown_lines(&report.attack_roll) {
            let _ = writeln!(out, "{}", line);
        }

        for target in &report.targets {
            let shot = if target.shot > 1 {
                format!(" [shot {}]", target.shot)
            } else {
                String::new()
            };
            let _ = writeln!(
                out,
                "- {}{}: {}",
                target.name,
                shot,
                Self::outcome_label(target)
            );

            if let Some(damage) = &target.damage {
                for line in Self::breakdown_lines(&damage.roll) {
                    let _ = writeln!(out, "  {}", line);
                }
                let _ = writeln!(
                    out,
                    "    takes {} Stun, {} Body (rolled {} / {})",
                    damage.stun, damage.body, damage.raw_stun, damage.raw_body
                );
                if !damage.defense_tags.is_empty() {
                    let _ = writeln!(out, "    defenses: {}", damage.defense_tags.join(", "));
                }
                for note in &damage.notes {
                    let _ = writeln!(out, "    {}", note);
                }
            }
            for adjustment in &target.adjustments {
                let resulting = adjustment
                    .resulting_value
                    .map(|v| format!(" (now {})", v))
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "    {} {:+}{}",
                    adjustment.identifier, adjustment.delta, resulting
                );
            }
            if !target.skipped_adjustments.is_empty() {
                let _ = writeln!(
                    out,
                    "    not affected: {}",
                    target.skipped_adjustments.join(", ")
                );
            }
            if let Some(knockback) = &target.knockback {
                let _ = writeln!(out, "    {}", knockback);
            }
            if target.stunned {
                let _ = writeln!(out, "    Stunned!");
            }
        }

        for warning in &report.warnings {
            let _ = writeln!(out, "warning: {}", warning);
        }
        if !report.applied {
            let _ = writeln!(out, "(results were not saved)");
        }
        out
    }
}
