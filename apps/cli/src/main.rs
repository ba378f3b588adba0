#![deny(warnings)]

//! Headless CLI that plays one simulation end to end with a seeded chooser.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use life_ai::{Generator, HttpGenerator, OfflineGenerator};
use life_core::{Gender, LifeScenario, LifeStats, SimulationResult};
use life_runtime::{LifeSimConfig, Orchestrator, Phase, SimulationState, SimulationStateMachine, Step};
use persistence::{MemorySaveStore, SaveStore, SqliteSaveStore};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    start_age: Option<u32>,
    target_age: Option<u32>,
    seed: Option<u64>,
    name: Option<String>,
    offline: bool,
    no_save: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next().map(PathBuf::from),
            "--start-age" => args.start_age = it.next().and_then(|s| s.parse().ok()),
            "--target-age" => args.target_age = it.next().and_then(|s| s.parse().ok()),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--name" => args.name = it.next(),
            "--offline" => args.offline = true,
            "--no-save" => args.no_save = true,
            _ => {}
        }
    }
    args
}

async fn open_store(args: &Args, cfg: &LifeSimConfig) -> Arc<dyn SaveStore> {
    if args.no_save {
        return Arc::new(MemorySaveStore::new());
    }
    match SqliteSaveStore::connect(&cfg.database_url).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(url = %cfg.database_url, error = %e, "save store unavailable, keeping session in memory");
            Arc::new(MemorySaveStore::new())
        }
    }
}

fn stats_line(stats: &LifeStats) -> String {
    format!(
        "money: {} | health: {} | career: {} | relationships: {} | happiness: {}",
        stats.money(),
        stats.health(),
        stats.career(),
        stats.relationships(),
        stats.happiness()
    )
}

fn print_scenario(age: u32, scenario: &LifeScenario) {
    println!("Age {} | {}", age, scenario.title);
    for c in &scenario.choices {
        println!("  - {} [{} risk, {}]", c.text, c.risk_level.as_str(), c.category.as_str());
    }
}

fn print_result(result: &SimulationResult, state: &SimulationState) {
    println!(
        "Done | age: {} | events: {} (+{} / -{} / ={}) | regret: {} | reward: {}",
        state.current_age,
        result.summary.total,
        result.summary.positive,
        result.summary.negative,
        result.summary.neutral,
        state.regret_meter,
        state.reward_meter
    );
    println!("Stats | {}", stats_line(&result.final_stats));
    println!(
        "Score | {} ({:?}: {})",
        result.life_score,
        result.grade,
        result.grade.label()
    );
    for line in &result.insights {
        println!("  * {}", line);
    }
    for a in &result.achievements {
        println!("  {} {} - {}", a.icon, a.title, a.description);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args();
    info!(version = env!("CARGO_PKG_VERSION"), ?args, "starting CLI");

    let mut cfg = LifeSimConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(v) = args.start_age {
        cfg.start_age = v;
    }
    if let Some(v) = args.target_age {
        cfg.target_age = v;
    }
    if let Some(v) = args.seed {
        cfg.rng_seed = v;
    }
    cfg.validate().context("invalid simulation ages")?;

    let generator: Arc<dyn Generator> = if args.offline || !cfg.has_api_key() {
        info!("generator offline, every call uses its fallback");
        Arc::new(OfflineGenerator)
    } else {
        Arc::new(HttpGenerator::new(cfg.generator.clone()).context("configuring generator")?)
    };
    let store = open_store(&args, &cfg).await;

    let machine = SimulationStateMachine::with_seed(cfg.rng_seed);
    let mut flow = Orchestrator::new(machine, generator).with_store(store, cfg.save_key.clone());
    let mut chooser = ChaCha8Rng::seed_from_u64(cfg.rng_seed.wrapping_add(1));

    // A resumed session goes through `proceed`, which finishes it when the
    // saved age already meets the target.
    let first = if flow.resume().await == Phase::Playing {
        info!(age = flow.machine().state().current_age, "resuming saved session");
        flow.proceed().await?
    } else {
        flow.reset().await;
        let name = args.name.as_deref().unwrap_or_default();
        Step::Scenario(
            flow.begin(name, Gender::default(), cfg.start_age, cfg.target_age)
                .await?,
        )
    };
    let mut scenario = match first {
        Step::Scenario(s) => s,
        Step::Finished(result) => {
            print_result(&result, flow.machine().state());
            return Ok(());
        }
    };

    let result = loop {
        print_scenario(flow.machine().state().current_age, &scenario);
        let pick = scenario.choices[chooser.gen_range(0..scenario.choices.len())].clone();
        let r = flow.choose(&pick.id).await?;
        println!(
            "  -> {} | {} ({}) | age now {}",
            pick.text,
            r.outcome.title,
            r.outcome.impact.as_str(),
            r.age
        );
        match flow.proceed().await? {
            Step::Scenario(next) => scenario = next,
            Step::Finished(result) => break result,
        }
    };

    print_result(&result, flow.machine().state());
    Ok(())
}
