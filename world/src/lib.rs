#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Moldfarm.
//!
//! The world owns the tile grid, the event scheduler, and the player. Every
//! mutation flows through [`apply`], which reports what changed as
//! [`Event`] values; [`query`] exposes read-only access for systems and
//! adapters.

mod grid;
mod player;
pub mod scheduler;

use std::time::Duration;

use moldfarm_core::{Command, Event, StatKind};
use tracing::{debug, trace, warn};

pub use grid::{LayoutError, MapLayout};
pub use player::Player;
use grid::TileGrid;
use scheduler::{EventScheduler, Scheduler};

/// Represents the authoritative Moldfarm world state.
#[derive(Debug)]
pub struct World {
    grid: TileGrid,
    scheduler: EventScheduler,
    player: Player,
    clock: Duration,
    scratch: Vec<moldfarm_core::ScheduledEvent>,
}

impl World {
    /// Creates a world from its initial layout, scheduler, and player.
    #[must_use]
    pub fn new(layout: MapLayout, scheduler: EventScheduler, player: Player) -> Self {
        Self {
            grid: TileGrid::from_layout(layout),
            scheduler,
            player,
            clock: Duration::ZERO,
            scratch: Vec::new(),
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PutTile { coord, tile } => match world.grid.set(coord, tile) {
            Some(previous) if previous != tile => {
                out_events.push(Event::TileChanged {
                    coord,
                    from: previous,
                    to: tile,
                });
            }
            Some(_) => {}
            None => trace!(?coord, ?tile, "ignoring write outside the grid"),
        },
        Command::ScheduleEvent { kind, coord, delay } => {
            if let EventScheduler::Turn(_) = world.scheduler {
                if let Some(replaced) = world.scheduler.peek_kind(coord) {
                    debug!(?coord, ?replaced, ?kind, "replacing pending event");
                }
            }
            let event = world.scheduler.schedule(kind, coord, delay);
            trace!(?event, "scheduled");
            out_events.push(Event::EventScheduled { event });
        }
        Command::CancelEvents { coord } => {
            let count = world.scheduler.cancel(coord);
            if count > 0 {
                out_events.push(Event::EventsCancelled { coord, count });
            }
        }
        Command::AdjustStat { stat, delta } => {
            let was_depleted = world.player.health().is_depleted();
            let value = world.player.stat_mut(stat);
            let before = value.level();
            value.increment(delta);
            let level = value.level();
            if level != before {
                out_events.push(Event::StatChanged { stat, level });
            }
            if stat == StatKind::Health && !was_depleted && world.player.health().is_depleted() {
                out_events.push(Event::HealthDepleted);
            }
        }
        Command::MovePlayer { position } => {
            world.player.move_to(position);
            out_events.push(Event::PlayerMoved {
                position,
                direction: world.player.direction(),
            });
        }
        Command::Advance { now } => {
            let previous = world.clock;
            let now = if now < previous {
                warn!(?now, ?previous, "clock moved backwards; holding time");
                previous
            } else {
                now
            };
            world.clock = now;
            out_events.push(Event::TimeAdvanced {
                now,
                dt: now - previous,
            });

            world.scratch.clear();
            world.scheduler.advance(now, &mut world.scratch);
            out_events.extend(
                world
                    .scratch
                    .drain(..)
                    .map(|event| Event::EventFired { event }),
            );
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{scheduler::Scheduler, Player, World};
    use moldfarm_core::{EventKind, ScheduledEvent, Tile, TileCoord, TileView};

    /// Returns the tile at the coordinate, or [`Tile::Void`] outside the grid.
    #[must_use]
    pub fn tile(world: &World, coord: TileCoord) -> Tile {
        world.grid.get(coord)
    }

    /// Exposes a read-only view of the tile grid.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView<'_> {
        world.grid.view()
    }

    /// Provides read-only access to the player.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Session time recorded by the most recent advance.
    ///
    /// In turn mode this is the exact time last received, not the start of
    /// the current turn.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.clock
    }

    /// Snapshot of every pending event ordered by due time, then coordinate.
    #[must_use]
    pub fn pending_events(world: &World) -> Vec<ScheduledEvent> {
        world.scheduler.pending()
    }

    /// Reports whether any event is pending for the coordinate.
    #[must_use]
    pub fn has_pending(world: &World, coord: TileCoord) -> bool {
        world.scheduler.has_pending(coord)
    }

    /// Kind of the earliest pending event for the coordinate.
    #[must_use]
    pub fn peek_kind(world: &World, coord: TileCoord) -> Option<EventKind> {
        world.scheduler.peek_kind(coord)
    }
}

/// Duration helper shared by adapters that drive the world in fixed steps.
#[must_use]
pub fn steps_to_duration(step: Duration, steps: u64) -> Duration {
    let nanos = step.as_nanos().saturating_mul(u128::from(steps));
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use moldfarm_config::SchedulerTuning;
    use moldfarm_core::{EventKind, Tile, TileCoord, WorldPoint};

    fn world_with(width: u32, height: u32, tile: Tile) -> World {
        World::new(
            MapLayout::filled(width, height, tile),
            EventScheduler::from_tuning(&SchedulerTuning::default()),
            Player::new(WorldPoint::new(8.0, 8.0), 100.0, 1_000.0),
        )
    }

    #[test]
    fn put_tile_reports_only_real_changes() {
        let mut world = world_with(2, 2, Tile::Farm);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PutTile {
                coord: TileCoord::new(0, 0),
                tile: Tile::Plant,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PutTile {
                coord: TileCoord::new(0, 0),
                tile: Tile::Plant,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PutTile {
                coord: TileCoord::new(9, 9),
                tile: Tile::Plant,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::TileChanged {
                coord: TileCoord::new(0, 0),
                from: Tile::Farm,
                to: Tile::Plant,
            }]
        );
        assert_eq!(query::tile(&world, TileCoord::new(9, 9)), Tile::Void);
    }

    #[test]
    fn advance_fires_due_events_once() {
        let mut world = world_with(1, 1, Tile::Plant);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ScheduleEvent {
                kind: EventKind::Grow,
                coord: TileCoord::new(0, 0),
                delay: Duration::from_secs(2),
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::Advance {
                now: Duration::from_secs(1),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                now: Duration::from_secs(1),
                dt: Duration::from_secs(1),
            }]
        );
        events.clear();

        apply(
            &mut world,
            Command::Advance {
                now: Duration::from_secs(2),
            },
            &mut events,
        );
        assert!(events.iter().any(|event| matches!(
            event,
            Event::EventFired { event } if event.kind == EventKind::Grow
        )));
        assert!(query::pending_events(&world).is_empty());
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut world = world_with(1, 1, Tile::Farm);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Advance {
                now: Duration::from_secs(5),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Advance {
                now: Duration::from_secs(3),
            },
            &mut events,
        );
        assert_eq!(query::now(&world), Duration::from_secs(5));
        assert_eq!(
            events.last(),
            Some(&Event::TimeAdvanced {
                now: Duration::from_secs(5),
                dt: Duration::ZERO,
            })
        );
    }

    #[test]
    fn turn_mode_measures_elapsed_time_from_the_last_advance() {
        let tuning = SchedulerTuning {
            mode: moldfarm_config::SchedulerMode::Turn,
            turn_length_ms: 1_000,
            ..SchedulerTuning::default()
        };
        let mut world = World::new(
            MapLayout::filled(1, 1, Tile::Farm),
            EventScheduler::from_tuning(&tuning),
            Player::new(WorldPoint::new(8.0, 8.0), 100.0, 1_000.0),
        );
        let mut events = Vec::new();
        for now in [1_500, 1_500, 1_200, 2_250] {
            apply(
                &mut world,
                Command::Advance {
                    now: Duration::from_millis(now),
                },
                &mut events,
            );
        }

        let elapsed: Vec<Duration> = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt, .. } => Some(*dt),
                _ => None,
            })
            .collect();
        assert_eq!(
            elapsed,
            vec![
                Duration::from_millis(1_500),
                Duration::ZERO,
                Duration::ZERO,
                Duration::from_millis(750),
            ]
        );
        assert_eq!(query::now(&world), Duration::from_millis(2_250));
    }

    #[test]
    fn health_depletion_is_reported_once() {
        let mut world = world_with(1, 1, Tile::Farm);
        let mut events = Vec::new();
        for _ in 0..3 {
            apply(
                &mut world,
                Command::AdjustStat {
                    stat: StatKind::Health,
                    delta: -60.0,
                },
                &mut events,
            );
        }
        let depletions = events
            .iter()
            .filter(|event| matches!(event, Event::HealthDepleted))
            .count();
        assert_eq!(depletions, 1);
        assert_eq!(query::player(&world).health().level(), 0.0);
    }

    #[test]
    fn cancel_reports_dropped_events() {
        let mut world = world_with(3, 3, Tile::Plant);
        let mut events = Vec::new();
        let coord = TileCoord::new(1, 1);
        for kind in [EventKind::Grow, EventKind::MoldSpread] {
            apply(
                &mut world,
                Command::ScheduleEvent {
                    kind,
                    coord,
                    delay: Duration::from_secs(1),
                },
                &mut events,
            );
        }
        assert_eq!(query::peek_kind(&world, coord), Some(EventKind::Grow));
        events.clear();

        apply(&mut world, Command::CancelEvents { coord }, &mut events);
        apply(&mut world, Command::CancelEvents { coord }, &mut events);
        assert_eq!(events, vec![Event::EventsCancelled { coord, count: 2 }]);
        assert!(!query::has_pending(&world, coord));
    }
}
