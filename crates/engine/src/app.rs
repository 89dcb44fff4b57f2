//! Application state and composition.

use std::sync::Arc;

use herocombat_domain::{GameSystem, GameSystemRegistry, HeroSystem};
use herocombat_shared::AttackRequest;

use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    ports::{
        ActorRepo, ClockPort, DefensePort, ItemRepo, PersistencePort, PresentationPort, RandomPort,
    },
    presenter::TextPresenter,
    scenario::Scenario,
    settings::EngineSettings,
    update_queue::ActorUpdateQueue,
};
use crate::use_cases;

/// Main application state.
///
/// Holds the rules in use, the repositories, and the use cases built on them.
pub struct App {
    pub settings: EngineSettings,
    pub system: Arc<dyn GameSystem>,
    pub repositories: Repositories,
    pub use_cases: UseCases,
    pub presenter: Arc<dyn PresentationPort>,
}

/// Container for all repository ports.
pub struct Repositories {
    pub actor: Arc<dyn ActorRepo>,
    pub item: Arc<dyn ItemRepo>,
    pub defense: Arc<dyn DefensePort>,
}

/// Container for all use cases.
pub struct UseCases {
    pub combat: use_cases::CombatUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        settings: EngineSettings,
        actors: Arc<dyn ActorRepo>,
        persistence: Arc<dyn PersistencePort>,
        items: Arc<dyn ItemRepo>,
        defense: Arc<dyn DefensePort>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let system = GameSystemRegistry::new()
            .for_edition(settings.edition)
            .unwrap_or_else(|| Arc::new(HeroSystem::new(settings.edition)));
        tracing::info!(system = system.system_id(), "Rules selected");

        let queue = Arc::new(ActorUpdateQueue::new(persistence));
        let apply = Arc::new(use_cases::ApplyResolution::new(queue, items.clone()));
        let resolve = Arc::new(use_cases::ResolveAttack::new(
            system.clone(),
            settings.clone(),
            actors.clone(),
            items.clone(),
            defense.clone(),
            apply.clone(),
            clock,
            random,
        ));

        Self {
            settings,
            system,
            repositories: Repositories {
                actor: actors,
                item: items,
                defense,
            },
            use_cases: UseCases {
                combat: use_cases::CombatUseCases::new(resolve, apply),
            },
            presenter: Arc::new(TextPresenter::new()),
        }
    }

    /// Build an App over a scenario's in-memory stores, with real dice.
    ///
    /// Returns the scenario's scripted attacks alongside.
    pub fn from_scenario(
        mut settings: EngineSettings,
        scenario: Scenario,
    ) -> (Self, Vec<AttackRequest>) {
        if let Some(edition) = scenario.edition {
            settings.edition = edition;
        }
        let stores = scenario.into_stores();
        let actors = Arc::new(stores.actors);

        let app = Self::new(
            settings,
            actors.clone(),
            actors,
            Arc::new(stores.items),
            Arc::new(stores.defenses),
            Arc::new(SystemClock::new()),
            Arc::new(SystemRandom::new()),
        );
        (app, stores.attacks)
    }
}
