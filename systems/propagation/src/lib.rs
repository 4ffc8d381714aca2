#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Growth and hazard propagation engine.
//!
//! The engine reacts to one fired event at a time. Each rule re-reads the
//! tile it acts upon and does nothing when the tile no longer matches the
//! state the event was scheduled for. Explosions are the exception: once a
//! carrot is detonated its blast goes off even if a neighbouring blast has
//! already flattened the tile.

use std::time::Duration;

use moldfarm_core::{
    random::roll, tiles_in_radius, Command, EventKind, ScheduledEvent, StatKind, Tile, TileCoord,
    TileView,
};
use rand::Rng;
use tracing::{trace, warn};

/// Probabilities and delays that drive the propagation rules.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    mold_start_chance: f64,
    mold_spread_delay: Duration,
    anger_chance: f64,
    anger_warning_delay: Duration,
    anger_real_delay: Duration,
    anger_pass_delay: Duration,
    blast_radius_tiles: u32,
    blast_damage: f64,
    tile_size: f32,
}

impl Config {
    /// Creates a configuration from the growth parameters.
    ///
    /// Anger and explosions start disabled; enable them with
    /// [`Config::with_anger`] and [`Config::with_blast`].
    #[must_use]
    pub const fn new(mold_start_chance: f64, mold_spread_delay: Duration, tile_size: f32) -> Self {
        Self {
            mold_start_chance,
            mold_spread_delay,
            anger_chance: 0.0,
            anger_warning_delay: Duration::ZERO,
            anger_real_delay: Duration::ZERO,
            anger_pass_delay: Duration::ZERO,
            blast_radius_tiles: 0,
            blast_damage: 0.0,
            tile_size,
        }
    }

    /// Sets the anger escalation chance and its three stage delays.
    #[must_use]
    pub const fn with_anger(
        mut self,
        chance: f64,
        warning_delay: Duration,
        real_delay: Duration,
        pass_delay: Duration,
    ) -> Self {
        self.anger_chance = chance;
        self.anger_warning_delay = warning_delay;
        self.anger_real_delay = real_delay;
        self.anger_pass_delay = pass_delay;
        self
    }

    /// Sets the explosion reach and the damage it deals to the player.
    #[must_use]
    pub const fn with_blast(mut self, radius_tiles: u32, damage: f64) -> Self {
        self.blast_radius_tiles = radius_tiles;
        self.blast_damage = damage;
        self
    }
}

/// Pure system that turns fired events into tile, scheduling, and stat
/// commands.
#[derive(Debug)]
pub struct Propagation {
    config: Config,
}

impl Propagation {
    /// Creates a new propagation engine using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Applies the rule for a single fired event against the current tiles.
    ///
    /// Callers must apply the emitted commands before handing the engine the
    /// next fired event so that every rule observes the effects of the rules
    /// that ran before it.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        fired: ScheduledEvent,
        tiles: TileView<'_>,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        let coord = fired.coord;
        let tile = tiles.get(coord);
        if tile == Tile::Void {
            trace!(?coord, kind = ?fired.kind, "event fired outside the grid");
            return;
        }
        if let Some(expected) = expected_tile(fired.kind) {
            if tile != expected {
                warn!(
                    ?coord,
                    kind = ?fired.kind,
                    ?expected,
                    found = ?tile,
                    "tile changed before its event fired; skipping"
                );
                return;
            }
        }

        match fired.kind {
            EventKind::Grow => self.grow(coord, rng, out),
            EventKind::MoldSpread => self.spread_mold(coord, tiles, out),
            EventKind::AngerWarning => {
                out.push(Command::PutTile {
                    coord,
                    tile: Tile::AngerWarning,
                });
                out.push(Command::ScheduleEvent {
                    kind: EventKind::AngerReal,
                    coord,
                    delay: self.config.anger_real_delay,
                });
            }
            EventKind::AngerReal => {
                out.push(Command::PutTile {
                    coord,
                    tile: Tile::AngerReal,
                });
                out.push(Command::ScheduleEvent {
                    kind: EventKind::AngerPass,
                    coord,
                    delay: self.config.anger_pass_delay,
                });
            }
            EventKind::AngerPass => out.push(Command::PutTile {
                coord,
                tile: Tile::Carrot,
            }),
            EventKind::Explosion => self.explode(coord, tiles, out),
        }
    }

    fn grow<R: Rng + ?Sized>(&self, coord: TileCoord, rng: &mut R, out: &mut Vec<Command>) {
        if roll(rng, self.config.mold_start_chance) {
            out.push(Command::PutTile {
                coord,
                tile: Tile::Mold,
            });
            out.push(Command::ScheduleEvent {
                kind: EventKind::MoldSpread,
                coord,
                delay: self.config.mold_spread_delay,
            });
            return;
        }

        out.push(Command::PutTile {
            coord,
            tile: Tile::Carrot,
        });
        if roll(rng, self.config.anger_chance) {
            out.push(Command::ScheduleEvent {
                kind: EventKind::AngerWarning,
                coord,
                delay: self.config.anger_warning_delay,
            });
        }
    }

    fn spread_mold(&self, coord: TileCoord, tiles: TileView<'_>, out: &mut Vec<Command>) {
        for neighbor in coord.neighbors() {
            if !tiles.get(neighbor).is_moldable() {
                continue;
            }
            out.push(Command::CancelEvents { coord: neighbor });
            out.push(Command::PutTile {
                coord: neighbor,
                tile: Tile::Mold,
            });
            out.push(Command::ScheduleEvent {
                kind: EventKind::MoldSpread,
                coord: neighbor,
                delay: self.config.mold_spread_delay,
            });
        }
    }

    fn explode(&self, coord: TileCoord, tiles: TileView<'_>, out: &mut Vec<Command>) {
        out.push(Command::AdjustStat {
            stat: StatKind::Health,
            delta: -self.config.blast_damage,
        });

        let center = coord.center(self.config.tile_size);
        for target in tiles_in_radius(center, self.config.blast_radius_tiles, self.config.tile_size)
        {
            if tiles.get(target).is_indestructible() {
                continue;
            }
            out.push(Command::CancelEvents { coord: target });
            out.push(Command::PutTile {
                coord: target,
                tile: Tile::Farm,
            });
        }
    }
}

/// Tile an event of the given kind must find when it fires, if any.
const fn expected_tile(kind: EventKind) -> Option<Tile> {
    match kind {
        EventKind::Grow => Some(Tile::Plant),
        EventKind::MoldSpread => Some(Tile::Mold),
        EventKind::AngerWarning => Some(Tile::Carrot),
        EventKind::AngerReal => Some(Tile::AngerWarning),
        EventKind::AngerPass => Some(Tile::AngerReal),
        EventKind::Explosion => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fired(kind: EventKind, x: i32, y: i32) -> ScheduledEvent {
        ScheduledEvent {
            coord: TileCoord::new(x, y),
            kind,
            due: Duration::ZERO,
        }
    }

    fn engine(mold_chance: f64, anger_chance: f64) -> Propagation {
        Propagation::new(
            Config::new(mold_chance, Duration::from_secs(3), 16.0)
                .with_anger(
                    anger_chance,
                    Duration::from_secs(5),
                    Duration::from_secs(10),
                    Duration::from_secs(5),
                )
                .with_blast(2, 20.0),
        )
    }

    #[test]
    fn grow_into_mold_schedules_spread() {
        let tiles = [Tile::Plant];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut out = Vec::new();
        engine(1.0, 0.0).handle(
            fired(EventKind::Grow, 0, 0),
            TileView::new(&tiles, 1, 1),
            &mut rng,
            &mut out,
        );
        assert_eq!(
            out,
            vec![
                Command::PutTile {
                    coord: TileCoord::new(0, 0),
                    tile: Tile::Mold
                },
                Command::ScheduleEvent {
                    kind: EventKind::MoldSpread,
                    coord: TileCoord::new(0, 0),
                    delay: Duration::from_secs(3),
                },
            ]
        );
    }

    #[test]
    fn grow_into_angry_carrot_schedules_warning() {
        let tiles = [Tile::Plant];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut out = Vec::new();
        engine(0.0, 1.0).handle(
            fired(EventKind::Grow, 0, 0),
            TileView::new(&tiles, 1, 1),
            &mut rng,
            &mut out,
        );
        assert_eq!(
            out,
            vec![
                Command::PutTile {
                    coord: TileCoord::new(0, 0),
                    tile: Tile::Carrot
                },
                Command::ScheduleEvent {
                    kind: EventKind::AngerWarning,
                    coord: TileCoord::new(0, 0),
                    delay: Duration::from_secs(5),
                },
            ]
        );
    }

    #[test]
    fn stale_events_are_ignored() {
        let tiles = [Tile::Farm];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut out = Vec::new();
        let mut engine = engine(1.0, 1.0);
        for kind in [
            EventKind::Grow,
            EventKind::MoldSpread,
            EventKind::AngerWarning,
            EventKind::AngerReal,
            EventKind::AngerPass,
        ] {
            engine.handle(fired(kind, 0, 0), TileView::new(&tiles, 1, 1), &mut rng, &mut out);
        }
        assert!(out.is_empty(), "{out:?}");
    }

    #[test]
    fn events_outside_the_grid_do_nothing() {
        let tiles = [Tile::AngerReal];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut out = Vec::new();
        let mut engine = engine(1.0, 1.0);
        for kind in [EventKind::Grow, EventKind::AngerPass, EventKind::Explosion] {
            engine.handle(fired(kind, 5, 5), TileView::new(&tiles, 1, 1), &mut rng, &mut out);
        }
        assert!(out.is_empty(), "{out:?}");
    }

    #[test]
    fn explosion_on_flattened_tile_still_goes_off() {
        let tiles = [Tile::Farm];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut out = Vec::new();
        engine(0.0, 0.0).handle(
            fired(EventKind::Explosion, 0, 0),
            TileView::new(&tiles, 1, 1),
            &mut rng,
            &mut out,
        );
        let coord = TileCoord::new(0, 0);
        assert_eq!(
            out,
            vec![
                Command::AdjustStat {
                    stat: StatKind::Health,
                    delta: -20.0
                },
                Command::CancelEvents { coord },
                Command::PutTile {
                    coord,
                    tile: Tile::Farm
                },
            ]
        );
    }

    #[test]
    fn anger_pass_restores_carrot() {
        let tiles = [Tile::AngerReal];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut out = Vec::new();
        engine(0.0, 0.0).handle(
            fired(EventKind::AngerPass, 0, 0),
            TileView::new(&tiles, 1, 1),
            &mut rng,
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::PutTile {
                coord: TileCoord::new(0, 0),
                tile: Tile::Carrot
            }]
        );
    }
}
