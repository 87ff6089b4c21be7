use std::path::PathBuf;
use std::time::Duration;

use burrow_common::Tag;
use burrow_game::{GameConfig, Session, SessionState};
use burrow_mine::ResourcePool;
use burrow_stream::Viewpoint;
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec2;
use tracing_subscriber::EnvFilter;

/// Reach of the fuel locator reported in the summary.
const FUEL_DETECTION_RANGE: f32 = 5.0;

#[derive(Parser)]
#[command(name = "burrow-cli", about = "CLI tool for burrow sessions")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info
    Info,
    /// Print the default game config
    Config {
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: Format,
    },
    /// Write the config's templates to a JSON template store
    Templates {
        /// YAML or JSON game config; defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output path for the template store
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Run a scripted descent that mines straight down
    Simulate {
        /// YAML or JSON game config; defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// JSON template store replacing the config's templates
        #[arg(long)]
        templates: Option<PathBuf>,
        /// Override the config seed
        #[arg(short, long)]
        seed: Option<u64>,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// Seconds per tick
        #[arg(long, default_value = "0.05")]
        dt: f32,
        /// Descent speed in world units per second through open space
        #[arg(long, default_value = "4.0")]
        descent: f32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Info => {
            println!("burrow-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: {}", burrow_kernel::crate_info());
            println!("assets: {}", burrow_assets::crate_info());
            println!("stream: {}", burrow_stream::crate_info());
            println!("mine: {}", burrow_mine::crate_info());
            println!("lava: {}", burrow_lava::crate_info());
            println!("game: {}", burrow_game::crate_info());
        }
        Commands::Config { format } => {
            let config = GameConfig::default();
            let text = match format {
                Format::Yaml => config.to_yaml()?,
                Format::Json => config.to_json()?,
            };
            println!("{text}");
        }
        Commands::Templates { config, out } => {
            let store = load_config(config)?.template_store();
            store.save(&out)?;
            println!("Wrote {} templates to {}", store.len(), out.display());
        }
        Commands::Simulate {
            config,
            templates,
            seed,
            ticks,
            dt,
            descent,
        } => {
            let mut config = load_config(config)?;
            if let Some(path) = templates {
                config.load_templates(path)?;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            simulate(config, ticks, Duration::try_from_secs_f32(dt)?, descent)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<GameConfig> {
    Ok(match path {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    })
}

fn simulate(config: GameConfig, ticks: u64, dt: Duration, descent: f32) -> anyhow::Result<()> {
    println!("Scripted descent: seed={}, ticks={ticks}, dt={dt:?}", config.seed);

    let mut session = Session::new(config)?;
    let extent = Vec2::new(16.0, 9.0) * session.cell_size() * 0.3;
    let mut position = Vec2::new(0.0, session.cell_size() * 0.5);
    let step = descent * dt.as_secs_f32();

    for _ in 0..ticks {
        let report = session.tick(dt, &Viewpoint::new(position, extent));
        if let Some(row) = report.lava_activated {
            println!("tick {}: lava front woke at row {row}", report.tick);
        }
        if report.game_over {
            break;
        }
        session.mine_toward(position, Vec2::NEG_Y);

        let next = position - Vec2::new(0.0, step);
        let blocked = session.world().entities_at(next).into_iter().any(|id| {
            session
                .world()
                .get(id)
                .is_some_and(|data| data.has_tag(Tag::Breakable))
        });
        if !blocked {
            position = next;
        }
    }

    let world = session.world();
    let stats = session.streamer().stats();
    tracing::info!(
        tick = world.tick(),
        depth = session.depth(position.y),
        mined = session.grid().mined_count(),
        "descent finished"
    );
    println!("tick: {}", world.tick());
    println!("depth: {:.1}", session.depth(position.y));
    println!(
        "chunks: spawned={} live={} mined={} unloaded={}",
        stats.total_spawned,
        session.grid().spawned_count(),
        session.grid().mined_count(),
        stats.total_unloaded
    );
    println!("fuel: {:.1}/{:.1}", session.pool().level(), session.pool().max_level());
    match session.nearest_fuel(position, FUEL_DETECTION_RANGE) {
        Some(signal) => println!(
            "nearest fuel: {:.1} away, intensity {:.2}",
            signal.distance, signal.intensity
        ),
        None => println!("nearest fuel: none within {FUEL_DETECTION_RANGE}"),
    }
    match session.lava().row() {
        Some(row) => println!("lava row: {row}"),
        None => println!("lava row: dormant"),
    }
    match session.state() {
        SessionState::Running => println!("state: running"),
        SessionState::GameOver { depth } => println!("state: game over at depth {depth:.1}"),
    }
    println!("state hash: {:#x}", world.state_hash());
    Ok(())
}
