//! HeroCombat Engine - scenario runner.
//!
//! Loads a scenario file (actors, items, scripted attacks), resolves each
//! attack in order and prints the report.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use herocombat_engine::infrastructure::{
    scenario::Scenario,
    settings::{load_dotenv_from, EngineSettings},
};
use herocombat_engine::use_cases::AttackError;
use herocombat_engine::App;
use herocombat_shared::ResponseResult;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the runner may start from `crates/engine`).
    load_dotenv_from(&repo_root());

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herocombat_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut settings = EngineSettings::from_env()?;
    if let Some(path) = std::env::args().nth(1) {
        settings.scenario_path = Some(PathBuf::from(path));
    }
    let path = settings
        .scenario_path
        .clone()
        .context("No scenario given: pass a path or set HERO_SCENARIO")?;

    tracing::info!(path = %path.display(), "Loading scenario");
    let scenario = Scenario::load(&path).await?;
    let (app, attacks) = App::from_scenario(settings, scenario);
    tracing::info!(
        system = app.system.display_name(),
        attacks = attacks.len(),
        "Scenario loaded"
    );

    let mut failures = 0usize;
    for request in attacks {
        match app.use_cases.combat.resolve.execute(request).await {
            Ok(resolution) => {
                println!("{}", app.presenter.render_report(&resolution.report));
            }
            Err(error) => {
                failures += 1;
                if let AttackError::Persistence { report, .. } = &error {
                    println!("{}", app.presenter.render_report(report));
                }
                let response = ResponseResult::error(error.error_code(), error.to_string());
                println!("{}", serde_json::to_string(&response)?);
            }
        }
    }

    if failures > 0 {
        tracing::warn!(failures, "Some attacks did not resolve");
    }
    Ok(())
}

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}
