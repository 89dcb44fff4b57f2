//! Combat use cases.
//!
//! An attack runs in two stages. Resolution rolls to-hit, damage,
//! knockback and adjustments against read-only sheets and collects every
//! change as a `CombatEffect`. The apply stage then commits those effects
//! through the update queue. A failure before apply leaves every sheet as
//! it was.

use std::collections::HashMap;
use std::sync::Arc;

use herocombat_domain::game_systems::hero::{
    check_resources, explosion_falloff, is_stunned, resolve_adjustment, resolve_damage,
    resolve_to_hit, roll_damage, AbsorptionInput, AdjustmentError, AdjustmentRequest,
    AreaTemplate, AttackFailure, DamageOutcome, DamageRequest, DamageRollOptions,
    KnockbackSituation, TargetHit, ToHitRequest, ToHitTarget,
};
use herocombat_domain::{
    AbsorptionCap, ActorCondition, ActorId, ActorSheet, AdjustmentPower, AttackItem, AttackKind,
    Basic, CombatEffect, DamageRoll, DataWarning, DefenseProfile, DefenseTag, Edition,
    GameSystem, ItemId, RandomSource, ResolutionId,
};
use herocombat_shared::{
    AdjustmentLine, AttackReport, AttackRequest, DamageReport, ErrorCode, RollBreakdown,
    TargetReport,
};

mod apply;

pub use apply::{resource_effects, ApplyResolution};

use crate::infrastructure::ports::{
    ActorRepo, ClockPort, DefenseOptions, DefensePort, ItemRepo, PersistenceError, PortDice,
    RandomPort, RepoError,
};
use crate::infrastructure::settings::EngineSettings;

/// Container for combat use cases.
pub struct CombatUseCases {
    pub resolve: Arc<ResolveAttack>,
    pub apply: Arc<ApplyResolution>,
}

impl CombatUseCases {
    pub fn new(resolve: Arc<ResolveAttack>, apply: Arc<ApplyResolution>) -> Self {
        Self { resolve, apply }
    }
}

/// Errors that stop an attack.
#[derive(Debug, thiserror::Error)]
pub enum AttackError {
    #[error(transparent)]
    Aborted(#[from] AttackFailure),
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("Target not found: {0}")]
    TargetNotFound(ActorId),
    #[error(transparent)]
    Adjustment(#[from] AdjustmentError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    /// The attack resolved but its results were not stored.
    #[error("Failed to apply attack results: {source}")]
    Persistence {
        report: Box<AttackReport>,
        #[source]
        source: PersistenceError,
    },
}

impl AttackError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AttackError::Aborted(_) => ErrorCode::AttackAborted,
            AttackError::ItemNotFound(_) | AttackError::TargetNotFound(_) => ErrorCode::NotFound,
            AttackError::Adjustment(_) => ErrorCode::ValidationError,
            AttackError::Repo(e) if e.is_not_found() => ErrorCode::NotFound,
            AttackError::Repo(_) => ErrorCode::InternalError,
            AttackError::Persistence { .. } => ErrorCode::PersistenceFailed,
        }
    }
}

/// A resolved and stored attack.
#[derive(Debug)]
pub struct AttackResolution {
    pub id: ResolutionId,
    pub report: AttackReport,
    pub effects: Vec<CombatEffect>,
    pub warnings: Vec<DataWarning>,
    /// Sheets as stored after the apply stage
    pub saved: Vec<ActorSheet>,
}

/// Resolve one attack and apply its results.
pub struct ResolveAttack {
    system: Arc<dyn GameSystem>,
    settings: EngineSettings,
    actors: Arc<dyn ActorRepo>,
    items: Arc<dyn ItemRepo>,
    defense: Arc<dyn DefensePort>,
    apply: Arc<ApplyResolution>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

/// A target as it stands before the attack.
struct TargetState {
    sheet: ActorSheet,
    options: DefenseOptions,
}

impl ResolveAttack {
    pub fn new(
        system: Arc<dyn GameSystem>,
        settings: EngineSettings,
        actors: Arc<dyn ActorRepo>,
        items: Arc<dyn ItemRepo>,
        defense: Arc<dyn DefensePort>,
        apply: Arc<ApplyResolution>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            system,
            settings,
            actors,
            items,
            defense,
            apply,
            clock,
            random,
        }
    }

    pub async fn execute(&self, request: AttackRequest) -> Result<AttackResolution, AttackError> {
        let edition = self.system.edition();

        let attacker = self
            .actors
            .get(ActorId::from(request.attacker_id))
            .await?
            .ok_or(AttackFailure::NoActor)?;
        if !attacker.has_token {
            return Err(AttackFailure::NoToken(attacker.name.clone()).into());
        }

        let item_id = ItemId::from(request.item_id);
        let item = self
            .items
            .get(item_id)
            .await?
            .ok_or(AttackError::ItemNotFound(item_id))?;
        check_resources(&item, &attacker)?;

        let (mut profile, mut warnings) = item.profile(edition);
        for warning in &warnings {
            tracing::warn!(item = %item.name, warning = %warning, "Item data problem");
        }
        let knockback_enabled = request.options.knockback.unwrap_or(self.settings.knockback);
        if !knockback_enabled {
            profile.knockback_multiplier = 0;
        }

        let mut targets: HashMap<ActorId, TargetState> = HashMap::new();
        let mut to_hit_targets = Vec::with_capacity(request.targets.len());
        for target in &request.targets {
            let id = ActorId::from(target.actor_id);
            let sheet = self
                .actors
                .get(id)
                .await?
                .ok_or(AttackError::TargetNotFound(id))?;
            if !sheet.has_token {
                return Err(AttackFailure::NoToken(sheet.name.clone()).into());
            }
            let defense_value = sheet
                .characteristic(item.combat_value.defense_key())
                .unwrap_or(0);
            to_hit_targets.push(ToHitTarget {
                actor: id,
                name: sheet.name.clone(),
                defense_value: f64::from(defense_value),
                distance: target.distance,
                distance_from_origin: target.distance_from_origin,
            });
            targets.insert(
                id,
                TargetState {
                    sheet,
                    options: DefenseOptions {
                        ignore_defense_ids: target.ignore_defense_ids.clone(),
                    },
                },
            );
        }

        let offense_label = item.combat_value.offense_key();
        let offense = attacker.characteristic(offense_label).unwrap_or(0);
        let template = request.template.as_ref().map(|t| AreaTemplate { size: t.size });
        let mut dice = PortDice(self.random.as_ref());

        let to_hit = resolve_to_hit(
            ToHitRequest {
                profile: &profile,
                offense,
                offense_label,
                edition,
                targets: &to_hit_targets,
                modifiers: &request.modifiers,
                template: template.as_ref(),
            },
            &mut dice,
        )?;
        tracing::info!(
            attacker = %attacker.name,
            item = %item.name,
            targets = to_hit_targets.len(),
            hits = to_hit.hit_count(),
            "Attack rolled"
        );

        let roll_options = DamageRollOptions {
            edition,
            use_hit_locations: request
                .options
                .use_hit_locations
                .unwrap_or(self.settings.use_hit_locations),
            aimed_location: request.modifiers.aimed_location,
            standard_effect: request.options.standard_effect,
        };

        let mut effects = Vec::new();
        let mut reports = Vec::with_capacity(to_hit.hits.len());
        let mut defenses: HashMap<ActorId, (DefenseProfile, Vec<DefenseTag>)> = HashMap::new();
        // Area attacks roll damage once; every target reads the same dice
        let mut area_roll: Option<DamageRoll> = None;

        for hit in &to_hit.hits {
            let mut report = target_report(hit);
            let state = match targets.get(&hit.actor) {
                Some(state) if hit.is_hit() && !request.options.to_hit_only => state,
                _ => {
                    reports.push(report);
                    continue;
                }
            };
            let target = &state.sheet;

            if !defenses.contains_key(&hit.actor) {
                let found = self
                    .defense
                    .determine_defense(target, &item, &state.options)
                    .await?;
                defenses.insert(hit.actor, found);
            }
            let Some((defense, tags)) = defenses.get(&hit.actor) else {
                reports.push(report);
                continue;
            };

            let mut roll = if profile.area.is_some() {
                area_roll
                    .get_or_insert_with(|| roll_damage(&item, &profile, roll_options, &mut dice))
                    .clone()
            } else {
                roll_damage(&item, &profile, roll_options, &mut dice)
            };
            if let Some(distance) = hit.distance_from_origin.filter(|_| profile.is_explosion()) {
                roll = explosion_falloff(&roll, distance, edition.explosion_falloff_step());
            }

            let outcome = resolve_damage(
                DamageRequest {
                    roll: &roll,
                    profile: &profile,
                    defense,
                    situation: KnockbackSituation {
                        airborne: target.has_condition(ActorCondition::Airborne),
                        underwater: target.has_condition(ActorCondition::Underwater),
                    },
                    edition,
                },
                &mut dice,
            );

            if let Some(power) = item.kind.adjustment_power() {
                let incoming_body = request.options.incoming_body;
                if power == AdjustmentPower::Absorption && incoming_body.is_none() {
                    tracing::warn!(
                        item = %item.name,
                        "Absorption without an incoming attack absorbs nothing"
                    );
                }
                let absorption = (power == AdjustmentPower::Absorption)
                    .then(|| AbsorptionInput {
                        attack_body: incoming_body.unwrap_or(0).max(0),
                        cap: absorption_cap(&item, edition, &mut dice),
                    });
                let result = resolve_adjustment(AdjustmentRequest {
                    item_name: &item.name,
                    power,
                    input: item.adjustment_input.as_deref(),
                    simultaneous: profile.simultaneous,
                    edition,
                    target,
                    source: Some(&attacker),
                    defended: outcome.stun,
                    raw: outcome.raw_stun,
                    absorption,
                })?;
                report.adjustments = result
                    .outcomes
                    .iter()
                    .map(|o| AdjustmentLine {
                        actor_id: o.actor.to_uuid(),
                        identifier: o.identifier.clone(),
                        delta: o.delta,
                        resulting_value: o.resulting_value,
                    })
                    .collect();
                report.skipped_adjustments = result.skipped;
                warnings.extend(result.warnings);
                effects.extend(result.effects);
            } else {
                effects.extend(outcome.effects(target.id));
                if matches!(item.kind, AttackKind::Normal | AttackKind::Killing)
                    && is_stunned(&outcome, target)
                {
                    report.stunned = true;
                    effects.push(CombatEffect::condition(target.id, ActorCondition::Stunned));
                }
            }

            report.knockback = outcome.knockback.as_ref().map(ToString::to_string);
            report.damage = Some(damage_report(&roll, &outcome, tags));
            reports.push(report);
        }

        effects.extend(resource_effects(&attacker, &item));

        let id = ResolutionId::from(self.random.gen_uuid());
        let attack_roll = to_hit
            .attack_roll
            .as_ref()
            .or_else(|| to_hit.hits.first().map(|hit| &hit.roll))
            .map(|roll| RollBreakdown::from(&roll.audit()))
            .unwrap_or_default();
        let mut report = AttackReport {
            resolution_id: id.to_uuid(),
            resolved_at: self.clock.now().to_rfc3339(),
            edition,
            attacker: attacker.name.clone(),
            item: item.name.clone(),
            attack_roll,
            targets: reports,
            warnings: warnings.iter().map(ToString::to_string).collect(),
            applied: false,
        };

        match self.apply.execute(&effects, &item).await {
            Ok(saved) => {
                report.applied = true;
                tracing::info!(
                    resolution_id = %id,
                    attacker = %attacker.name,
                    effects = effects.len(),
                    actors = saved.len(),
                    "Attack applied"
                );
                Ok(AttackResolution {
                    id,
                    report,
                    effects,
                    warnings,
                    saved,
                })
            }
            Err(source) => {
                tracing::error!(
                    resolution_id = %id,
                    error = %source,
                    "Attack resolved but its results were not saved"
                );
                Err(AttackError::Persistence {
                    report: Box::new(report),
                    source,
                })
            }
        }
    }
}

fn target_report(hit: &TargetHit) -> TargetReport {
    TargetReport {
        actor_id: Some(hit.actor.to_uuid()),
        name: hit.name.clone(),
        shot: hit.shot,
        outcome: hit.outcome,
        margin: hit.margin_label(),
        damage: None,
        adjustments: Vec::new(),
        skipped_adjustments: Vec::new(),
        knockback: None,
        stunned: false,
    }
}

fn damage_report(roll: &DamageRoll, outcome: &DamageOutcome, tags: &[DefenseTag]) -> DamageReport {
    DamageReport {
        body: outcome.body,
        stun: outcome.stun,
        raw_body: outcome.raw_body,
        raw_stun: outcome.raw_stun,
        hit_location: outcome.hit_location.clone(),
        stun_multiplier: outcome.stun_multiplier,
        notes: outcome.notes.iter().map(ToString::to_string).collect(),
        defense_tags: tags.iter().map(|tag| tag.title.clone()).collect(),
        roll: RollBreakdown::from(&roll.audit()),
    }
}

/// Most an absorption can take in. Dice caps are rolled fresh each time.
fn absorption_cap<R: RandomSource + ?Sized>(
    item: &AttackItem,
    edition: Edition,
    source: &mut R,
) -> i32 {
    match item.absorption_cap {
        Some(AbsorptionCap::Fixed(cap)) => cap,
        Some(AbsorptionCap::Dice(dice)) => dice.to_spec::<Basic>(edition).roll(source).basic_total(),
        None => i32::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use herocombat_domain::{
        ActorUpdate, DamageDice, HeroSystem, HitOutcome, ItemModifier,
    };
    use herocombat_shared::TargetRequest;

    use crate::infrastructure::clock::{FixedClock, ScriptedRandom};
    use crate::infrastructure::memory::{
        DefenseEntry, DefenseField, InMemoryActors, InMemoryItems, ListedDefenses,
    };
    use crate::infrastructure::ports::{
        MockActorRepo, MockDefensePort, MockItemRepo, MockPersistencePort, PersistencePort,
    };
    use crate::infrastructure::update_queue::ActorUpdateQueue;

    fn hero() -> ActorSheet {
        ActorSheet::new("Defender", Edition::Sixth)
            .with_characteristic("OCV", 7)
            .with_characteristic("END", 20)
    }

    fn villain() -> ActorSheet {
        ActorSheet::new("Grond", Edition::Sixth)
            .with_characteristic("DCV", 4)
            .with_characteristic("CON", 20)
            .with_characteristic("STR", 30)
            .with_characteristic("STUN", 40)
            .with_characteristic("BODY", 15)
    }

    struct Fixture {
        resolve: ResolveAttack,
        actors: Arc<InMemoryActors>,
        random: Arc<ScriptedRandom>,
    }

    fn fixture(
        sheets: Vec<ActorSheet>,
        items: Vec<AttackItem>,
        defenses: ListedDefenses,
        faces: Vec<u8>,
    ) -> Fixture {
        let actors = Arc::new(InMemoryActors::new(sheets));
        let items: Arc<InMemoryItems> = Arc::new(InMemoryItems::new(items));
        let random = Arc::new(ScriptedRandom::new(faces));
        let apply = Arc::new(ApplyResolution::new(
            Arc::new(ActorUpdateQueue::new(actors.clone())),
            items.clone(),
        ));
        let resolve = ResolveAttack::new(
            Arc::new(HeroSystem::sixth()),
            EngineSettings::default(),
            actors.clone(),
            items,
            Arc::new(defenses),
            apply,
            Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
                    .single()
                    .expect("valid time"),
            )),
            random.clone(),
        );
        Fixture {
            resolve,
            actors,
            random,
        }
    }

    fn armored(target: &ActorSheet) -> ListedDefenses {
        ListedDefenses::new(HashMap::from([(
            target.id,
            vec![DefenseEntry::new("pd", "PD", DefenseField::Normal, 4)],
        )]))
    }

    #[tokio::test]
    async fn hit_applies_damage_and_knockback() {
        let attacker = hero();
        let target = villain();
        let item = AttackItem::new("Energy Blast", AttackKind::Normal, DamageDice::new(3))
            .with_end_cost(3);
        // to-hit 3,3,3; damage 6,4,2; knockback 1,1
        let fx = fixture(
            vec![attacker.clone(), target.clone()],
            vec![item.clone()],
            armored(&target),
            vec![3, 3, 3, 6, 4, 2, 1, 1],
        );

        let request = AttackRequest::new(attacker.id.to_uuid(), item.id.to_uuid())
            .with_target(TargetRequest::new(target.id.to_uuid(), 0.0));
        let resolution = fx.resolve.execute(request).await.expect("attack resolves");

        assert!(resolution.report.applied);
        assert_eq!(resolution.report.hit_count(), 1);
        let damage = resolution.report.targets[0]
            .damage
            .as_ref()
            .expect("damage rolled");
        assert_eq!((damage.raw_stun, damage.raw_body), (12, 4));
        assert_eq!((damage.stun, damage.body), (8, 0));
        assert_eq!(damage.defense_tags, vec!["PD +4".to_string()]);
        assert_eq!(
            resolution.report.targets[0].knockback.as_deref(),
            Some("Knocked Back 4m")
        );
        assert!(!resolution.report.targets[0].stunned);
        assert_eq!(fx.random.remaining(), 0);

        let stored = fx.actors.get(target.id).await.expect("repo").expect("target");
        assert_eq!(stored.characteristic("STUN"), Some(32));
        assert!(stored.has_condition(ActorCondition::KnockedBack));
        let stored = fx.actors.get(attacker.id).await.expect("repo").expect("attacker");
        assert_eq!(stored.characteristic("END"), Some(17));
    }

    #[tokio::test]
    async fn miss_still_costs_endurance() {
        let attacker = hero();
        let target = villain();
        let item =
            AttackItem::new("Bolt", AttackKind::Normal, DamageDice::new(6)).with_end_cost(2);
        let fx = fixture(
            vec![attacker.clone(), target.clone()],
            vec![item.clone()],
            ListedDefenses::default(),
            vec![6, 6, 5],
        );

        let request = AttackRequest::new(attacker.id.to_uuid(), item.id.to_uuid())
            .with_target(TargetRequest::new(target.id.to_uuid(), 0.0));
        let resolution = fx.resolve.execute(request).await.expect("attack resolves");

        assert_eq!(
            resolution.report.targets[0].outcome,
            HitOutcome::Miss { margin: -3 }
        );
        assert!(resolution.report.targets[0].damage.is_none());
        assert_eq!(resolution.effects.len(), 1);

        let stored = fx.actors.get(target.id).await.expect("repo").expect("target");
        assert_eq!(stored, target);
        let stored = fx.actors.get(attacker.id).await.expect("repo").expect("attacker");
        assert_eq!(stored.characteristic("END"), Some(18));
    }

    #[tokio::test]
    async fn big_hit_stuns_the_target() {
        let attacker = hero();
        let target = villain().with_characteristic("CON", 10);
        let item = AttackItem::new("Haymaker", AttackKind::Normal, DamageDice::new(3))
            .with_modifier(ItemModifier::new("NOKB"));
        let fx = fixture(
            vec![attacker.clone(), target.clone()],
            vec![item.clone()],
            ListedDefenses::default(),
            vec![3, 3, 3, 6, 6, 6],
        );

        let request = AttackRequest::new(attacker.id.to_uuid(), item.id.to_uuid())
            .with_target(TargetRequest::new(target.id.to_uuid(), 0.0));
        let resolution = fx.resolve.execute(request).await.expect("attack resolves");

        assert!(resolution.report.targets[0].stunned);
        assert!(resolution.report.targets[0].knockback.is_none());
        let stored = fx.actors.get(target.id).await.expect("repo").expect("target");
        assert!(stored.has_condition(ActorCondition::Stunned));
        assert_eq!(stored.characteristic("STUN"), Some(22));
    }

    #[tokio::test]
    async fn drain_lowers_the_listed_characteristic() {
        let attacker = hero();
        let target = villain();
        let item = AttackItem::new(
            "Weakness Ray",
            AttackKind::Adjustment {
                power: AdjustmentPower::Drain,
            },
            DamageDice::new(2),
        )
        .with_adjustment_input("STR");
        let fx = fixture(
            vec![attacker.clone(), target.clone()],
            vec![item.clone()],
            ListedDefenses::default(),
            vec![3, 3, 3, 5, 5],
        );

        let request = AttackRequest::new(attacker.id.to_uuid(), item.id.to_uuid())
            .with_target(TargetRequest::new(target.id.to_uuid(), 0.0));
        let resolution = fx.resolve.execute(request).await.expect("attack resolves");

        let lines = &resolution.report.targets[0].adjustments;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].identifier, "STR");
        assert_eq!(lines[0].delta, -10);
        assert!(resolution.effects.iter().all(|e| !matches!(
            e.update,
            ActorUpdate::Damage { .. }
        )));

        let stored = fx.actors.get(target.id).await.expect("repo").expect("target");
        assert_eq!(stored.characteristic("STR"), Some(20));
        assert_eq!(stored.characteristic("STUN"), Some(40));
    }

    #[tokio::test]
    async fn invalid_adjustment_changes_nothing() {
        let attacker = hero();
        let target = villain();
        let item = AttackItem::new(
            "Boost",
            AttackKind::Adjustment {
                power: AdjustmentPower::Aid,
            },
            DamageDice::new(2),
        )
        .with_adjustment_input("Flight")
        .with_end_cost(2);
        let fx = fixture(
            vec![attacker.clone(), target.clone()],
            vec![item.clone()],
            ListedDefenses::default(),
            vec![3, 3, 3, 5, 5],
        );

        let request = AttackRequest::new(attacker.id.to_uuid(), item.id.to_uuid())
            .with_target(TargetRequest::new(target.id.to_uuid(), 0.0));
        let err = fx.resolve.execute(request).await.expect_err("aid on a missing power");
        assert!(matches!(
            err,
            AttackError::Adjustment(AdjustmentError::InvalidTarget { .. })
        ));
        assert_eq!(err.error_code(), ErrorCode::ValidationError);

        let stored = fx.actors.get(attacker.id).await.expect("repo").expect("attacker");
        assert_eq!(stored.characteristic("END"), Some(20));
    }

    #[tokio::test]
    async fn area_attack_without_template_is_aborted() {
        let attacker = hero();
        let target = villain();
        let item = AttackItem::new("Fireball", AttackKind::Normal, DamageDice::new(4))
            .with_modifier(ItemModifier::new("AOE"));
        let fx = fixture(
            vec![attacker.clone(), target.clone()],
            vec![item.clone()],
            ListedDefenses::default(),
            Vec::new(),
        );

        let request = AttackRequest::new(attacker.id.to_uuid(), item.id.to_uuid())
            .with_target(TargetRequest::new(target.id.to_uuid(), 0.0));
        let err = fx.resolve.execute(request).await.expect_err("no template");
        assert!(matches!(err, AttackError::Aborted(AttackFailure::NoTemplate)));
        assert_eq!(err.error_code(), ErrorCode::AttackAborted);
    }

    #[tokio::test]
    async fn target_without_token_never_reaches_storage() {
        let attacker = hero();
        let target = villain().without_token();
        let item = AttackItem::new("Bolt", AttackKind::Normal, DamageDice::new(6));

        let mut actors = MockActorRepo::new();
        let sheets = HashMap::from([(attacker.id, attacker.clone()), (target.id, target.clone())]);
        actors
            .expect_get()
            .returning(move |id| Ok(sheets.get(&id).cloned()));
        let mut items = MockItemRepo::new();
        let stored_item = item.clone();
        items
            .expect_get()
            .returning(move |_| Ok(Some(stored_item.clone())));
        items.expect_save().never();
        let mut defense = MockDefensePort::new();
        defense.expect_determine_defense().never();
        let mut persistence = MockPersistencePort::new();
        persistence.expect_apply_resolution().never();

        let items: Arc<MockItemRepo> = Arc::new(items);
        let apply = Arc::new(ApplyResolution::new(
            Arc::new(ActorUpdateQueue::new(Arc::new(persistence))),
            items.clone(),
        ));
        let resolve = ResolveAttack::new(
            Arc::new(HeroSystem::sixth()),
            EngineSettings::default(),
            Arc::new(actors),
            items,
            Arc::new(defense),
            apply,
            Arc::new(FixedClock(Utc::now())),
            Arc::new(ScriptedRandom::new(Vec::new())),
        );

        let request = AttackRequest::new(attacker.id.to_uuid(), item.id.to_uuid())
            .with_target(TargetRequest::new(target.id.to_uuid(), 0.0));
        let err = resolve.execute(request).await.expect_err("no token");
        assert!(matches!(
            err,
            AttackError::Aborted(AttackFailure::NoToken(ref name)) if name == "Grond"
        ));
    }

    #[tokio::test]
    async fn failed_apply_returns_the_unsaved_report() {
        let attacker = hero();
        let target = villain();
        let item = AttackItem::new("Bolt", AttackKind::Normal, DamageDice::new(3));

        let readable = Arc::new(InMemoryActors::new(vec![attacker.clone(), target.clone()]));
        let mut persistence = MockPersistencePort::new();
        persistence
            .expect_apply_resolution()
            .returning(|_| Err(PersistenceError::ActorMissing(ActorId::new())));
        let persistence: Arc<dyn PersistencePort> = Arc::new(persistence);
        let items = Arc::new(InMemoryItems::new(vec![item.clone()]));
        let apply = Arc::new(ApplyResolution::new(
            Arc::new(ActorUpdateQueue::new(persistence)),
            items.clone(),
        ));
        let resolve = ResolveAttack::new(
            Arc::new(HeroSystem::sixth()),
            EngineSettings::default(),
            readable.clone(),
            items,
            Arc::new(ListedDefenses::default()),
            apply,
            Arc::new(FixedClock(Utc::now())),
            Arc::new(ScriptedRandom::new(vec![3, 3, 3, 6, 4, 2, 1, 1])),
        );

        let request = AttackRequest::new(attacker.id.to_uuid(), item.id.to_uuid())
            .with_target(TargetRequest::new(target.id.to_uuid(), 0.0));
        let err = resolve.execute(request).await.expect_err("storage fails");
        assert_eq!(err.error_code(), ErrorCode::PersistenceFailed);
        match err {
            AttackError::Persistence { report, .. } => {
                assert!(!report.applied);
                assert_eq!(report.hit_count(), 1);
            }
            other => panic!("unexpected error: {other}"),
        }

        let stored = readable.get(target.id).await.expect("repo").expect("target");
        assert_eq!(stored, target);
    }

    #[tokio::test]
    async fn area_attack_rolls_damage_once_for_every_target() {
        let attacker = hero();
        let near = villain();
        let far = ActorSheet::new("Henchman", Edition::Sixth)
            .with_characteristic("DCV", 3)
            .with_characteristic("CON", 20)
            .with_characteristic("STUN", 30)
            .with_characteristic("BODY", 10);
        let item = AttackItem::new("Shockwave", AttackKind::Normal, DamageDice::new(2))
            .with_modifier(ItemModifier::new("AOE"))
            .with_modifier(ItemModifier::new("NOKB"));
        // one area to-hit roll, then one 2d6 damage roll shared by both
        let fx = fixture(
            vec![attacker.clone(), near.clone(), far.clone()],
            vec![item.clone()],
            ListedDefenses::default(),
            vec![3, 3, 3, 6, 6],
        );

        let request = AttackRequest::new(attacker.id.to_uuid(), item.id.to_uuid())
            .with_target(TargetRequest::new(near.id.to_uuid(), 0.0))
            .with_target(TargetRequest::new(far.id.to_uuid(), 0.0))
            .with_template(4.0);
        let resolution = fx.resolve.execute(request).await.expect("attack resolves");

        assert_eq!(resolution.report.hit_count(), 2);
        let raw: Vec<(i32, i32)> = resolution
            .report
            .targets
            .iter()
            .map(|t| {
                let damage = t.damage.as_ref().expect("damage rolled");
                (damage.raw_stun, damage.raw_body)
            })
            .collect();
        assert_eq!(raw, vec![(12, 4), (12, 4)]);
        assert_eq!(fx.random.remaining(), 0);

        let stored = fx.actors.get(near.id).await.expect("repo").expect("near");
        assert_eq!(stored.characteristic("STUN"), Some(28));
        let stored = fx.actors.get(far.id).await.expect("repo").expect("far");
        assert_eq!(stored.characteristic("STUN"), Some(18));
    }

    #[tokio::test]
    async fn explosion_falloff_reuses_the_shared_dice() {
        let attacker = hero();
        let center = villain();
        let edge = villain();
        let item = AttackItem::new("Grenade", AttackKind::Normal, DamageDice::new(3))
            .with_modifier(ItemModifier::new("AOE"))
            .with_modifier(ItemModifier::new("EXPLOSION"))
            .with_modifier(ItemModifier::new("NOKB"));
        let fx = fixture(
            vec![attacker.clone(), center.clone(), edge.clone()],
            vec![item.clone()],
            ListedDefenses::default(),
            vec![3, 3, 3, 6, 4, 2],
        );

        let request = AttackRequest::new(attacker.id.to_uuid(), item.id.to_uuid())
            .with_target(TargetRequest {
                distance_from_origin: Some(0.0),
                ..TargetRequest::new(center.id.to_uuid(), 5.0)
            })
            .with_target(TargetRequest {
                distance_from_origin: Some(2.0),
                ..TargetRequest::new(edge.id.to_uuid(), 6.0)
            })
            .with_template(4.0);
        let resolution = fx.resolve.execute(request).await.expect("attack resolves");

        let raw: Vec<(i32, i32)> = resolution
            .report
            .targets
            .iter()
            .map(|t| {
                let damage = t.damage.as_ref().expect("damage rolled");
                (damage.raw_stun, damage.raw_body)
            })
            .collect();
        // One step out loses the 6 from the same roll
        assert_eq!(raw, vec![(12, 4), (6, 2)]);
        assert_eq!(fx.random.remaining(), 0);
    }

    #[tokio::test]
    async fn autofire_hits_each_deal_damage() {
        let attacker = hero();
        let target = villain();
        let item = AttackItem::new("Machine Pistol", AttackKind::Normal, DamageDice::new(2))
            .with_modifier(ItemModifier::new("AUTOFIRE").with_levels(2))
            .with_modifier(ItemModifier::new("NOKB"));
        // to-hit 3,3,3 for both shots; then 2d6 per shot
        let fx = fixture(
            vec![attacker.clone(), target.clone()],
            vec![item.clone()],
            ListedDefenses::default(),
            vec![3, 3, 3, 6, 6, 5, 5],
        );

        let mut request = AttackRequest::new(attacker.id.to_uuid(), item.id.to_uuid())
            .with_target(TargetRequest::new(target.id.to_uuid(), 0.0));
        request.modifiers.autofire_shots = Some(2);
        let resolution = fx.resolve.execute(request).await.expect("attack resolves");

        let shots: Vec<(u32, Option<i32>)> = resolution
            .report
            .targets
            .iter()
            .map(|t| (t.shot, t.damage.as_ref().map(|d| d.stun)))
            .collect();
        assert_eq!(shots, vec![(1, Some(12)), (2, Some(10))]);
        assert_eq!(fx.random.remaining(), 0);

        let stored = fx.actors.get(target.id).await.expect("repo").expect("target");
        assert_eq!(stored.characteristic("STUN"), Some(18));
        assert_eq!(stored.characteristic("BODY"), Some(9));
    }

    #[tokio::test]
    async fn absorption_is_limited_by_the_incoming_body() {
        let attacker = hero();
        let target = villain();
        let item = AttackItem::new(
            "Kinetic Sponge",
            AttackKind::Adjustment {
                power: AdjustmentPower::Absorption,
            },
            DamageDice::new(4),
        )
        .with_adjustment_input("STR")
        .with_absorption_cap(AbsorptionCap::Fixed(20));
        // rolls 24, capped at 20, but the absorbed hit only did 7 Body
        let fx = fixture(
            vec![attacker.clone(), target.clone()],
            vec![item.clone()],
            ListedDefenses::default(),
            vec![3, 3, 3, 6, 6, 6, 6],
        );

        let mut request = AttackRequest::new(attacker.id.to_uuid(), item.id.to_uuid())
            .with_target(TargetRequest::new(target.id.to_uuid(), 0.0));
        request.options.incoming_body = Some(7);
        let resolution = fx.resolve.execute(request).await.expect("attack resolves");

        let lines = &resolution.report.targets[0].adjustments;
        assert_eq!(lines.len(), 1);
        assert_eq!((lines[0].identifier.as_str(), lines[0].delta), ("STR", 7));
        let stored = fx.actors.get(target.id).await.expect("repo").expect("target");
        assert_eq!(stored.characteristic("STR"), Some(37));
    }
}
