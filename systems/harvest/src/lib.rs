#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Area harvest pass that replants every harvestable tile around the player.

use std::time::Duration;

use moldfarm_core::{
    random::uniform_delay, tiles_in_radius, Command, EventKind, StatKind, Tile, TileView,
    WorldPoint,
};
use rand::Rng;

/// Configuration parameters required to construct the harvest system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    radius_tiles: u32,
    tile_size: f32,
    growth_min: Duration,
    growth_max: Duration,
}

impl Config {
    /// Creates a new configuration from the scan reach and growth window.
    #[must_use]
    pub const fn new(
        radius_tiles: u32,
        tile_size: f32,
        growth_min: Duration,
        growth_max: Duration,
    ) -> Self {
        Self {
            radius_tiles,
            tile_size,
            growth_min,
            growth_max,
        }
    }
}

/// Pure system that turns carrots, farmland, and mold near the player into
/// fresh plants.
#[derive(Debug)]
pub struct Harvest {
    config: Config,
}

impl Harvest {
    /// Creates a new harvest system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Scans the tiles around `player` and emits replanting commands.
    ///
    /// Harvesting a carrot also credits one unit of food. Tiles already
    /// replanted read as [`Tile::Plant`], so a second pass over the same
    /// snapshot area emits nothing.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        player: WorldPoint,
        tiles: TileView<'_>,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        for coord in tiles_in_radius(player, self.config.radius_tiles, self.config.tile_size) {
            let tile = tiles.get(coord);
            if !tile.is_harvestable() {
                continue;
            }

            out.push(Command::CancelEvents { coord });
            out.push(Command::PutTile {
                coord,
                tile: Tile::Plant,
            });
            out.push(Command::ScheduleEvent {
                kind: EventKind::Grow,
                coord,
                delay: uniform_delay(rng, self.config.growth_min, self.config.growth_max),
            });

            if tile == Tile::Carrot {
                out.push(Command::AdjustStat {
                    stat: StatKind::Food,
                    delta: 1.0,
                });
            }
        }
    }
}
