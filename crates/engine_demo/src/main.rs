//! # engine_demo
//!
//! Small driver for `engine_storage`: spawns a batch of moving entities,
//! integrates their positions for a few steps, and walks through entity
//! removal and view filtering while logging what happens.

use std::collections::HashSet;

use anyhow::{Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use engine_storage::{Component, Entity, Registry, RegistryConfig, StorageError};

#[derive(Parser)]
#[command(name = "engine_demo", about = "Entity/component storage demo")]
struct Args {
    /// Number of entities to spawn
    #[arg(short, long, default_value_t = 8)]
    entities: usize,

    /// Tag every N-th entity
    #[arg(short, long, default_value_t = 2)]
    tagged_every: usize,

    /// Number of integration steps
    #[arg(short, long, default_value_t = 3)]
    steps: usize,

    /// Seed for reproducible entity IDs
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pos {
    x: u64,
    y: u64,
}

impl Component for Pos {
    fn type_name() -> &'static str {
        "Pos"
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity {
    x: u64,
    y: u64,
}

impl Component for Velocity {
    fn type_name() -> &'static str {
        "Velocity"
    }
}

/// Marks entities that get logged every step.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tracked;

impl Component for Tracked {
    fn type_name() -> &'static str {
        "Tracked"
    }
}

const DEFAULT_LOG_FILTER: &str = "engine_demo=info,engine_storage=info";

/// Uses `rust_log` as the whole filter when it is set and parses, otherwise
/// falls back to [`DEFAULT_LOG_FILTER`].
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();

    let args = Args::parse();
    if args.tagged_every == 0 {
        bail!("--tagged-every must be at least 1");
    }

    let mut config = RegistryConfig::new().with_pool_capacity(args.entities);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let mut registry = Registry::with_config(config);

    let entities = spawn(&mut registry, &args)?;
    info!(
        entities = entities.len(),
        tracked = registry.component_count::<Tracked>(),
        "spawned"
    );

    for step in 1..=args.steps {
        let mut view = registry.get_view::<(Pos, Velocity)>();
        view.execute(|_, pos, vel| {
            pos.x += vel.x;
            pos.y += vel.y;
        });
        drop(view);

        registry
            .get_view::<(Pos, Tracked)>()
            .execute(|entity, pos, _| info!(step, %entity, x = pos.x, y = pos.y, "tracked position"));
    }

    // Stop the first entity and show that it drops out of moving queries.
    if let Some(&first) = entities.first() {
        registry.remove_component::<Velocity>(first)?;
        match registry.remove_component::<Velocity>(first) {
            Err(err @ StorageError::EntityNotFound { .. }) => {
                warn!(%err, "second removal rejected as expected");
            }
            other => bail!("unexpected result from repeated removal: {other:?}"),
        }
        let moving = registry.get_view::<(Pos, Velocity)>().len();
        info!(%first, moving, "stopped entity");
    }

    // Everything that is moving but not tracked.
    let tracked: HashSet<Entity> = registry
        .pool::<Tracked>()
        .map(|pool| pool.entities().iter().copied().collect())
        .unwrap_or_default();
    let mut view = registry.get_view::<(Pos, Velocity)>();
    view.and_or_exclude(&tracked, false);
    info!(untracked_moving = view.len(), "filtered view");
    drop(view);

    if let Some(&last) = entities.last() {
        let removed = registry.remove_entity(last);
        info!(%last, removed, alive = registry.contains_entity(last), "despawned");
    }

    info!(registry = ?registry, "done");
    Ok(())
}

fn spawn(registry: &mut Registry, args: &Args) -> Result<Vec<Entity>> {
    let mut entities = Vec::with_capacity(args.entities);
    for i in 0..args.entities {
        let e = registry.generate_entity();
        let n = i as u64;
        registry.add_component(e, Pos { x: n, y: 0 })?;
        registry.add_component(e, Velocity { x: 3, y: 2 })?;
        if i % args.tagged_every == 0 {
            registry.add_component(e, Tracked)?;
        }
        entities.push(e);
    }
    Ok(entities)
}
