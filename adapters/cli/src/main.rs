#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Moldfarm session.

mod ascii;
mod map_asset;
mod walk;

use std::{path::PathBuf, process::ExitCode, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use moldfarm_config::{SchedulerMode, SimulationConfig};
use moldfarm_core::{EventKind, Tile, WELCOME_BANNER};
use moldfarm_session::{Session, TickReport};
use moldfarm_world::{steps_to_duration, MapLayout};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use walk::Walker;

/// Runs a Moldfarm session without a window and prints what happened.
#[derive(Parser, Debug)]
#[command(name = "moldfarm", author, version, about, long_about = None)]
struct Args {
    /// Simulation config (TOML); built-in defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tiled JSON map with a `ground` tile layer
    #[arg(long)]
    map: Option<PathBuf>,

    /// Width in tiles of the generated farm field used when no map is given
    #[arg(long, default_value_t = 16)]
    width: u32,

    /// Height in tiles of the generated farm field used when no map is given
    #[arg(long, default_value_t = 16)]
    height: u32,

    /// Number of ticks (or turns in turn mode) to simulate
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,

    /// Session time between ticks in milliseconds (timeline mode)
    #[arg(long, default_value_t = 16)]
    dt_ms: u64,

    /// Overrides the configured random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Tile waypoints the player walks through, e.g. "2,2;10,2;10,10"
    #[arg(long)]
    walk: Option<String>,

    /// Walking speed in world units per second
    #[arg(long, default_value_t = 100.0)]
    walk_speed: f32,

    /// Prints the final grid as ASCII
    #[arg(long)]
    print_grid: bool,
}

/// Entry point for the Moldfarm command-line interface.
fn main() -> ExitCode {
    init_tracing();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }

    let layout = match &args.map {
        Some(path) => {
            map_asset::load(path).with_context(|| format!("loading map {}", path.display()))?
        }
        None => farm_field(args.width, args.height)?,
    };

    let waypoints = args
        .walk
        .as_deref()
        .map(walk::parse_waypoints)
        .transpose()
        .context("parsing --walk")?
        .unwrap_or_default();

    let tile_size = config.grid.tile_size;
    let mode = config.scheduler.mode;
    let dt = match mode {
        SchedulerMode::Timeline => Duration::from_millis(args.dt_ms),
        SchedulerMode::Turn => config.scheduler.turn_length(),
    };

    let mut session = Session::initialize(config, layout).context("starting session")?;
    let mut walker = Walker::new(waypoints, args.walk_speed, tile_size);
    let mut summary = Summary::default();

    println!("{WELCOME_BANNER}");
    for tick in 1..=args.ticks {
        let position = session.player().position();
        if let Some(next) = walker.step(position, dt, session.tile_view()) {
            session.on_player_moved(next);
        }

        let report = match mode {
            SchedulerMode::Timeline => session.advance_tick(steps_to_duration(dt, tick)),
            SchedulerMode::Turn => session.advance_turn(tick),
        };
        summary.record(&report);
        if report.terminal {
            println!(
                "t={:.2}s player health depleted; session lost",
                session.now().as_secs_f64()
            );
            break;
        }
    }

    info!(walk_done = walker.is_done(), "run finished");
    summary.print(&session);
    if args.print_grid {
        let player = session.player().position().tile(tile_size);
        print!("{}", ascii::render(session.tile_view(), player));
    }
    Ok(())
}

/// Walled field of farmland with the player's default start inside.
fn farm_field(width: u32, height: u32) -> Result<MapLayout> {
    let mut tiles = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let edge = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
            tiles.push(if edge { Tile::Rock } else { Tile::Farm });
        }
    }
    MapLayout::new(width, height, tiles).context("generating farm field")
}

/// Totals accumulated across the run.
#[derive(Debug, Default)]
struct Summary {
    ticks: u64,
    grown: usize,
    explosions: usize,
    tile_changes: usize,
}

impl Summary {
    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.tile_changes += report.tile_changes.len();
        for event in &report.fired {
            match event.kind {
                EventKind::Grow => self.grown += 1,
                EventKind::Explosion => self.explosions += 1,
                EventKind::MoldSpread
                | EventKind::AngerWarning
                | EventKind::AngerReal
                | EventKind::AngerPass => {}
            }
        }
    }

    fn print(&self, session: &Session) {
        let view = session.tile_view();
        let count = |wanted: Tile| view.iter().filter(|(_, tile)| *tile == wanted).count();
        let player = session.player();
        println!(
            "ticks={} time={:.2}s health={:.1} food={} grown={} explosions={} changes={} \
             plants={} carrots={} mold={} pending={}",
            self.ticks,
            session.now().as_secs_f64(),
            player.health().level(),
            player.food().level(),
            self.grown,
            self.explosions,
            self.tile_changes,
            count(Tile::Plant),
            count(Tile::Carrot),
            count(Tile::Mold),
            session.pending_events().len(),
        );
    }
}
