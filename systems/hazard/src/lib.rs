#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hazards that act on the player: detonating nearby angry carrots and
//! damaging a player who stands in mold.

use std::time::Duration;

use moldfarm_core::{
    tiles_in_radius, Command, Event, EventKind, StatKind, Tile, TileView, WorldPoint,
};
use tracing::debug;

/// Half of the player's footprint side, measured in tiles.
const FOOTPRINT_HALF_EXTENT: f32 = 0.95 / 2.0;

/// Configuration parameters required to construct the hazard system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    radius_tiles: u32,
    tile_size: f32,
    mold_damage_per_second: f64,
}

impl Config {
    /// Creates a new configuration using the detonation reach and mold damage rate.
    #[must_use]
    pub const fn new(radius_tiles: u32, tile_size: f32, mold_damage_per_second: f64) -> Self {
        Self {
            radius_tiles,
            tile_size,
            mold_damage_per_second,
        }
    }
}

/// Pure system that emits hazard commands from the player's surroundings.
#[derive(Debug)]
pub struct Hazard {
    config: Config,
}

impl Hazard {
    /// Creates a new hazard system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Detonates every dangerous carrot within reach of the player.
    ///
    /// Each carrot loses its pending events and receives an explosion due
    /// immediately.
    pub fn detonate(&mut self, player: WorldPoint, tiles: TileView<'_>, out: &mut Vec<Command>) {
        for coord in tiles_in_radius(player, self.config.radius_tiles, self.config.tile_size) {
            if tiles.get(coord) != Tile::AngerReal {
                continue;
            }
            debug!(?coord, "detonating angry carrot");
            out.push(Command::CancelEvents { coord });
            out.push(Command::ScheduleEvent {
                kind: EventKind::Explosion,
                coord,
                delay: Duration::ZERO,
            });
        }
    }

    /// Applies mold damage for the time that elapsed in `events`.
    ///
    /// Damage only applies when every corner of the player's footprint rests
    /// on mold.
    pub fn expose(
        &mut self,
        events: &[Event],
        player: WorldPoint,
        tiles: TileView<'_>,
        out: &mut Vec<Command>,
    ) {
        let elapsed: Duration = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt, .. } => Some(*dt),
                _ => None,
            })
            .sum();
        if elapsed.is_zero() || !self.standing_in_mold(player, tiles) {
            return;
        }

        out.push(Command::AdjustStat {
            stat: StatKind::Health,
            delta: -self.config.mold_damage_per_second * elapsed.as_secs_f64(),
        });
    }

    fn standing_in_mold(&self, player: WorldPoint, tiles: TileView<'_>) -> bool {
        let reach = FOOTPRINT_HALF_EXTENT * self.config.tile_size;
        [(-reach, -reach), (reach, -reach), (-reach, reach), (reach, reach)]
            .into_iter()
            .map(|(dx, dy)| WorldPoint::new(player.x + dx, player.y + dy).tile(self.config.tile_size))
            .all(|coord| tiles.get(coord) == Tile::Mold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moldfarm_core::TileCoord;

    fn hazard() -> Hazard {
        Hazard::new(Config::new(2, 16.0, 5.0))
    }

    fn advanced(secs: u64) -> Event {
        Event::TimeAdvanced {
            now: Duration::from_secs(secs),
            dt: Duration::from_secs(secs),
        }
    }

    #[test]
    fn mold_underfoot_costs_health_per_second() {
        let tiles = [Tile::Mold; 4];
        let mut out = Vec::new();
        hazard().expose(
            &[advanced(2)],
            WorldPoint::new(8.0, 8.0),
            TileView::new(&tiles, 2, 2),
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::AdjustStat {
                stat: StatKind::Health,
                delta: -10.0
            }]
        );
    }

    #[test]
    fn straddling_mold_edge_is_safe() {
        let tiles = [Tile::Mold, Tile::Farm, Tile::Mold, Tile::Mold];
        let mut out = Vec::new();
        // Corner shared by all four tiles.
        hazard().expose(
            &[advanced(2)],
            WorldPoint::new(16.0, 16.0),
            TileView::new(&tiles, 2, 2),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn detonation_targets_only_angry_carrots_in_reach() {
        let mut tiles = [Tile::Carrot; 25];
        tiles[12] = Tile::AngerReal;
        tiles[0] = Tile::AngerReal;
        tiles[7] = Tile::AngerWarning;
        let mut out = Vec::new();
        hazard().detonate(WorldPoint::new(40.0, 40.0), TileView::new(&tiles, 5, 5), &mut out);
        let coord = TileCoord::new(2, 2);
        assert_eq!(
            out,
            vec![
                Command::CancelEvents { coord },
                Command::ScheduleEvent {
                    kind: EventKind::Explosion,
                    coord,
                    delay: Duration::ZERO,
                },
            ]
        );
    }
}
