#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation controller that drives one Moldfarm session.
//!
//! A [`Session`] owns the authoritative world together with the harvest,
//! propagation, and hazard systems, and runs them in a fixed order on every
//! tick:
//!
//! 1. the harvest pass around the player,
//! 2. a drain of every due event through the propagation engine,
//! 3. detonation of angry carrots near the player, followed by another drain,
//! 4. mold exposure damage,
//! 5. the terminal check.

mod report;

use std::time::Duration;

use moldfarm_config::{ConfigError, SimulationConfig};
use moldfarm_core::{Command, Event, ScheduledEvent, Tile, TileCoord, TileView, WorldPoint};
use moldfarm_system_harvest::{self as harvest, Harvest};
use moldfarm_system_hazard::{self as hazard, Hazard};
use moldfarm_system_propagation::{self as propagation, Propagation};
use moldfarm_world::{
    self as world, query, scheduler::EventScheduler, LayoutError, MapLayout, Player, World,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

pub use report::{StatSnapshot, TickReport};
use report::ReportBuilder;

/// Errors raised while constructing a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The configuration failed validation.
    #[error("invalid simulation config: {0}")]
    Config(#[from] ConfigError),
    /// The tile list does not fill the declared grid.
    #[error("invalid map layout: {0}")]
    Layout(#[from] LayoutError),
}

/// One running simulation.
#[derive(Debug)]
pub struct Session {
    world: World,
    harvest: Harvest,
    propagation: Propagation,
    hazard: Hazard,
    rng: ChaCha8Rng,
    turn_length: Duration,
    max_drain_passes: u32,
    terminal: bool,
}

impl Session {
    /// Creates a session from a validated configuration and an initial layout.
    pub fn initialize(config: SimulationConfig, layout: MapLayout) -> Result<Self, SessionError> {
        config.validate()?;

        let tile_size = config.grid.tile_size;
        let (growth_min, growth_max) = config.growth.plant_growth_window();
        let reach = config.player.harvest_radius_tiles;

        let harvest = Harvest::new(harvest::Config::new(
            reach, tile_size, growth_min, growth_max,
        ));
        let propagation = Propagation::new(
            propagation::Config::new(
                config.growth.mold_start_chance,
                config.growth.mold_spread_delay(),
                tile_size,
            )
            .with_anger(
                config.anger.chance,
                config.anger.warning_delay(),
                config.anger.real_delay(),
                config.anger.pass_delay(),
            )
            .with_blast(config.blast.radius_tiles, config.blast.damage),
        );
        let hazard = Hazard::new(hazard::Config::new(
            reach,
            tile_size,
            config.player.mold_damage_per_second,
        ));

        info!(
            width = layout.width(),
            height = layout.height(),
            mode = ?config.scheduler.mode,
            seed = config.rng_seed,
            "session initialised"
        );

        Ok(Self {
            world: World::new(
                layout,
                EventScheduler::from_tuning(&config.scheduler),
                Player::from_tuning(&config.player),
            ),
            harvest,
            propagation,
            hazard,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            turn_length: config.scheduler.turn_length(),
            max_drain_passes: config.scheduler.max_drain_passes,
            terminal: false,
        })
    }

    /// Creates a session from raw row-major tiles.
    pub fn from_tiles(
        config: SimulationConfig,
        width: u32,
        height: u32,
        tiles: Vec<Tile>,
    ) -> Result<Self, SessionError> {
        Self::initialize(config, MapLayout::new(width, height, tiles)?)
    }

    /// Records the player's new position and facing.
    ///
    /// Moving has no other effect until the next tick.
    pub fn on_player_moved(&mut self, position: WorldPoint) {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::MovePlayer { position },
            &mut events,
        );
        trace!(?position, "player moved");
    }

    /// Advances the session to the absolute time `now` and reports what
    /// changed.
    ///
    /// Once the player's health is depleted every further tick is ignored and
    /// returns an empty terminal report.
    pub fn advance_tick(&mut self, now: Duration) -> TickReport {
        if self.terminal {
            debug!(?now, "ignoring tick after the session ended");
            return TickReport::idle(self.stats(), true);
        }

        let mut events = Vec::new();

        let mut commands = Vec::new();
        self.harvest.handle(
            query::player(&self.world).position(),
            query::tile_view(&self.world),
            &mut self.rng,
            &mut commands,
        );
        execute(&mut self.world, commands, &mut events);

        self.drain(now, &mut events);

        let mut commands = Vec::new();
        self.hazard.detonate(
            query::player(&self.world).position(),
            query::tile_view(&self.world),
            &mut commands,
        );
        if !commands.is_empty() {
            execute(&mut self.world, commands, &mut events);
            self.drain(now, &mut events);
        }

        let mut commands = Vec::new();
        self.hazard.expose(
            &events,
            query::player(&self.world).position(),
            query::tile_view(&self.world),
            &mut commands,
        );
        execute(&mut self.world, commands, &mut events);

        self.terminal = query::player(&self.world).health().is_depleted();
        if self.terminal {
            info!(?now, "player health depleted; session lost");
        }

        let mut builder = ReportBuilder::default();
        builder.observe(&events);
        let report = builder.finish(self.stats(), self.terminal);
        debug!(
            ?now,
            changes = report.tile_changes.len(),
            fired = report.fired.len(),
            "tick complete"
        );
        report
    }

    /// Advances the session to the start of the given turn.
    pub fn advance_turn(&mut self, turn: u64) -> TickReport {
        self.advance_tick(world::steps_to_duration(self.turn_length, turn))
    }

    /// Returns the tile at the coordinate, or [`Tile::Void`] outside the grid.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Tile {
        query::tile(&self.world, coord)
    }

    /// Read-only view of the whole grid.
    #[must_use]
    pub fn tile_view(&self) -> TileView<'_> {
        query::tile_view(&self.world)
    }

    /// The player.
    #[must_use]
    pub fn player(&self) -> &Player {
        query::player(&self.world)
    }

    /// Every pending event ordered by due time, then coordinate.
    #[must_use]
    pub fn pending_events(&self) -> Vec<ScheduledEvent> {
        query::pending_events(&self.world)
    }

    /// Session time reached by the most recent tick.
    #[must_use]
    pub fn now(&self) -> Duration {
        query::now(&self.world)
    }

    /// Whether the session has ended.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn stats(&self) -> StatSnapshot {
        let player = query::player(&self.world);
        StatSnapshot {
            health: player.health().level(),
            food: player.food().level(),
        }
    }

    /// Fires due events until none remain or the pass budget runs out.
    fn drain(&mut self, now: Duration, events: &mut Vec<Event>) {
        for _ in 0..self.max_drain_passes {
            let start = events.len();
            world::apply(&mut self.world, Command::Advance { now }, events);
            let due: Vec<ScheduledEvent> = events[start..]
                .iter()
                .filter_map(|event| match event {
                    Event::EventFired { event } => Some(*event),
                    _ => None,
                })
                .collect();
            if due.is_empty() {
                return;
            }

            for fired in due {
                let mut commands = Vec::new();
                self.propagation.handle(
                    fired,
                    query::tile_view(&self.world),
                    &mut self.rng,
                    &mut commands,
                );
                execute(&mut self.world, commands, events);
            }
        }

        let overdue = query::pending_events(&self.world)
            .iter()
            .filter(|event| event.due <= now)
            .count();
        if overdue > 0 {
            warn!(
                ?now,
                overdue,
                passes = self.max_drain_passes,
                "drain pass limit reached; deferring due events"
            );
        }
    }
}

fn execute(world: &mut World, commands: Vec<Command>, events: &mut Vec<Event>) {
    for command in commands {
        world::apply(world, command, events);
    }
}
