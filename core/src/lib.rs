#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Moldfarm simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems read immutable views such as
//! [`TileView`], consume [`Event`] streams broadcast by the world, and respond
//! exclusively with [`Command`] batches. The world executes those commands via
//! its `apply` entry point, which is the only place tiles, scheduled events,
//! and player stats are ever mutated.

pub mod random;

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Moldfarm.";

/// Stat levels at or below this threshold count as depleted.
///
/// Continuous damage decays health in fractional steps, so exact zero is
/// never a reliable sentinel.
pub const DEPLETION_EPSILON: f64 = 1e-5;

/// Material or state occupying a single tile of the world grid.
///
/// Discriminants match the tile indices used by the map asset so that layouts
/// can be loaded without a translation table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Sentinel for unset cells and every coordinate outside the grid.
    Void,
    /// Blank tile with no material.
    Empty,
    /// Bare ground.
    Ground,
    /// Tilled soil ready to be planted.
    Farm,
    /// Growing plant awaiting its growth event.
    Plant,
    /// Indoor floor.
    Floor,
    /// Harvestable carrot.
    Carrot,
    /// Indestructible rock.
    Rock,
    /// Carrot in the dangerous phase of its anger escalation.
    AngerReal,
    /// Carrot showing the first signs of anger.
    AngerWarning,
    /// Wall piece facing the top right.
    TopRightWall,
    /// Wall piece facing the bottom left.
    BottomLeftWall,
    /// Wall piece facing the bottom right.
    BottomRightWall,
    /// Ventilation shaft in working order.
    WorkingVent,
    /// Ventilation shaft that needs repair.
    BrokenVent,
    /// Spreading mold hazard.
    Mold,
}

impl Tile {
    /// Every tile variant in code order.
    pub const ALL: [Tile; 16] = [
        Tile::Void,
        Tile::Empty,
        Tile::Ground,
        Tile::Farm,
        Tile::Plant,
        Tile::Floor,
        Tile::Carrot,
        Tile::Rock,
        Tile::AngerReal,
        Tile::AngerWarning,
        Tile::TopRightWall,
        Tile::BottomLeftWall,
        Tile::BottomRightWall,
        Tile::WorkingVent,
        Tile::BrokenVent,
        Tile::Mold,
    ];

    /// Numeric tile index used by map assets.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Void => -1,
            Self::Empty => 0,
            Self::Ground => 1,
            Self::Farm => 2,
            Self::Plant => 3,
            Self::Floor => 4,
            Self::Carrot => 5,
            Self::Rock => 6,
            Self::AngerReal => 7,
            Self::AngerWarning => 8,
            Self::TopRightWall => 9,
            Self::BottomLeftWall => 10,
            Self::BottomRightWall => 11,
            Self::WorkingVent => 12,
            Self::BrokenVent => 13,
            Self::Mold => 14,
        }
    }

    /// Resolves a numeric tile index, treating unknown indices as [`Tile::Void`].
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|tile| tile.code() == code)
            .unwrap_or(Self::Void)
    }

    /// Reports whether the host should treat the tile as a collision obstacle.
    ///
    /// Void is solid so that the edge of the map behaves like a wall.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(
            self,
            Self::Void
                | Self::Rock
                | Self::TopRightWall
                | Self::BottomLeftWall
                | Self::BottomRightWall
                | Self::WorkingVent
                | Self::BrokenVent
        )
    }

    /// Reports whether explosions leave the tile untouched.
    #[must_use]
    pub const fn is_indestructible(self) -> bool {
        matches!(self, Self::Void | Self::Rock)
    }

    /// Reports whether the harvest pass replants the tile.
    #[must_use]
    pub const fn is_harvestable(self) -> bool {
        matches!(self, Self::Carrot | Self::Farm | Self::Mold)
    }

    /// Reports whether mold may spread onto the tile.
    #[must_use]
    pub const fn is_moldable(self) -> bool {
        matches!(self, Self::Plant | Self::Carrot)
    }
}

/// Location of a single tile expressed as signed column and row indices.
///
/// Coordinates outside the grid are legal values; they simply read as
/// [`Tile::Void`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: i32,
    y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column index of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row index of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate displaced by the provided offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// The four orthogonal neighbours in west, east, north, south order.
    #[must_use]
    pub const fn neighbors(self) -> [TileCoord; 4] {
        [
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(0, 1),
        ]
    }

    /// Centre of the tile measured in world units.
    #[must_use]
    pub fn center(self, tile_size: f32) -> WorldPoint {
        WorldPoint::new(
            (self.x as f32 + 0.5) * tile_size,
            (self.y as f32 + 0.5) * tile_size,
        )
    }
}

/// Continuous position measured in world units (pixels).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Tile that contains the point.
    #[must_use]
    pub fn tile(self, tile_size: f32) -> TileCoord {
        TileCoord::new(
            (self.x / tile_size).floor() as i32,
            (self.y / tile_size).floor() as i32,
        )
    }
}

/// Enumerates every tile sampled by a circular scan around `center`.
///
/// Offsets are visited on a square lattice spaced one tile apart, spanning
/// `radius_tiles` tiles in each direction. An offset is kept when its length is
/// strictly less than the radius; the sampled point `center - offset` is then
/// resolved to the tile containing it. Lattice offsets are distinct, so the
/// result never contains duplicates.
#[must_use]
pub fn tiles_in_radius(center: WorldPoint, radius_tiles: u32, tile_size: f32) -> Vec<TileCoord> {
    let reach = i32::try_from(radius_tiles).unwrap_or(i32::MAX);
    let limit = i64::from(reach) * i64::from(reach);
    let mut tiles = Vec::new();
    for step_x in -reach..=reach {
        for step_y in -reach..=reach {
            let length_squared = i64::from(step_x).pow(2) + i64::from(step_y).pow(2);
            if length_squared >= limit {
                continue;
            }
            let sample = WorldPoint::new(
                center.x - step_x as f32 * tile_size,
                center.y - step_y as f32 * tile_size,
            );
            tiles.push(sample.tile(tile_size));
        }
    }
    tiles
}

/// Last committed movement direction of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// The player has not moved yet.
    #[default]
    None,
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Derives the committed direction from a movement delta.
    ///
    /// The dominant axis wins; horizontal movement wins exact ties. A zero
    /// delta yields `None`, which callers treat as "keep the previous value".
    #[must_use]
    pub fn from_delta(dx: f32, dy: f32) -> Option<Self> {
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        if dx.abs() >= dy.abs() {
            Some(if dx < 0.0 { Self::Left } else { Self::Right })
        } else {
            Some(if dy < 0.0 { Self::Up } else { Self::Down })
        }
    }
}

/// Kinds of delayed world mutations the scheduler can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A planted tile finishes growing.
    Grow,
    /// Mold on a tile spreads to its neighbours.
    MoldSpread,
    /// A carrot begins to turn angry.
    AngerWarning,
    /// An angry carrot becomes dangerous.
    AngerReal,
    /// An angry carrot calms down again.
    AngerPass,
    /// An angry carrot detonates.
    Explosion,
}

/// Event waiting in, or drained from, the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// Tile the event is keyed by and acts upon.
    pub coord: TileCoord,
    /// Rule the propagation engine applies when the event fires.
    pub kind: EventKind,
    /// Absolute session time at which the event becomes due.
    pub due: Duration,
}

/// Identifies one of the player's bounded stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    /// Hit points; depletion ends the session.
    Health,
    /// Carrots collected.
    Food,
}

/// Bounded numeric resource clamped to `0..=max` on every mutation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumStat {
    level: f64,
    max: f64,
}

impl NumStat {
    /// Creates a stat, clamping the initial level into range.
    ///
    /// Negative maxima collapse to zero.
    #[must_use]
    pub fn new(level: f64, max: f64) -> Self {
        let max = max.max(0.0);
        Self {
            level: level.clamp(0.0, max),
            max,
        }
    }

    /// Creates a stat starting at its maximum.
    #[must_use]
    pub fn full(max: f64) -> Self {
        Self::new(max, max)
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> f64 {
        self.level
    }

    /// Upper bound of the level.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Adds `amount` (which may be negative) and clamps the result.
    pub fn increment(&mut self, amount: f64) {
        self.level = (self.level + amount).clamp(0.0, self.max);
    }

    /// Reports whether the level fell to (approximately) zero.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.level <= DEPLETION_EPSILON
    }
}

/// Final state of a tile that changed during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileChange {
    /// Tile that changed.
    pub coord: TileCoord,
    /// Tile now stored at the coordinate.
    pub tile: Tile,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Overwrites the tile stored at a coordinate.
    PutTile {
        /// Tile to overwrite.
        coord: TileCoord,
        /// New tile value.
        tile: Tile,
    },
    /// Schedules a delayed event relative to the current session time.
    ScheduleEvent {
        /// Rule applied when the event fires.
        kind: EventKind,
        /// Tile the event is keyed by.
        coord: TileCoord,
        /// Delay measured from the current session time.
        delay: Duration,
    },
    /// Drops every pending event keyed by the coordinate.
    CancelEvents {
        /// Tile whose pending events are dropped.
        coord: TileCoord,
    },
    /// Adds a (possibly negative) amount to one of the player's stats.
    AdjustStat {
        /// Stat to adjust.
        stat: StatKind,
        /// Amount added before clamping.
        delta: f64,
    },
    /// Moves the player to a new position.
    MovePlayer {
        /// New position in world units.
        position: WorldPoint,
    },
    /// Advances the session clock and drains every event that became due.
    Advance {
        /// Absolute session time.
        now: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Absolute session time after the advance.
        now: Duration,
        /// Time elapsed since the previous advance.
        dt: Duration,
    },
    /// A scheduled event became due and was removed from the scheduler.
    EventFired {
        /// The drained event.
        event: ScheduledEvent,
    },
    /// A new event entered the scheduler.
    EventScheduled {
        /// The queued event.
        event: ScheduledEvent,
    },
    /// Pending events keyed by a coordinate were dropped.
    EventsCancelled {
        /// Tile whose events were dropped.
        coord: TileCoord,
        /// Number of events dropped.
        count: usize,
    },
    /// A tile was overwritten with a different value.
    TileChanged {
        /// Tile that changed.
        coord: TileCoord,
        /// Previous value.
        from: Tile,
        /// New value.
        to: Tile,
    },
    /// A player stat changed level.
    StatChanged {
        /// Stat that changed.
        stat: StatKind,
        /// Level after clamping.
        level: f64,
    },
    /// The player moved.
    PlayerMoved {
        /// New position.
        position: WorldPoint,
        /// Committed movement direction after the move.
        direction: Direction,
    },
    /// Player health reached the depletion threshold.
    HealthDepleted,
}

/// Read-only view into the dense tile grid.
#[derive(Clone, Copy, Debug)]
pub struct TileView<'a> {
    tiles: &'a [Tile],
    width: u32,
    height: u32,
}

impl<'a> TileView<'a> {
    /// Captures a new tile view backed by the provided row-major slice.
    #[must_use]
    pub fn new(tiles: &'a [Tile], width: u32, height: u32) -> Self {
        Self {
            tiles,
            width,
            height,
        }
    }

    /// Returns the tile at the coordinate, or [`Tile::Void`] outside the grid.
    #[must_use]
    pub fn get(&self, coord: TileCoord) -> Tile {
        self.index(coord)
            .and_then(|index| self.tiles.get(index).copied())
            .unwrap_or(Tile::Void)
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Iterates every in-bounds coordinate alongside its tile in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, Tile)> + 'a {
        let width = self.width.max(1);
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            let x = i32::try_from(index % width).unwrap_or(i32::MAX);
            let y = i32::try_from(index / width).unwrap_or(i32::MAX);
            (TileCoord::new(x, y), *tile)
        })
    }

    fn index(&self, coord: TileCoord) -> Option<usize> {
        let x = u32::try_from(coord.x()).ok()?;
        let y = u32::try_from(coord.y()).ok()?;
        if x < self.width && y < self.height {
            let row = usize::try_from(y).ok()?;
            let column = usize::try_from(x).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
