//! Scripted player movement for headless runs.

use std::{collections::VecDeque, time::Duration};

use moldfarm_core::{TileCoord, TileView, WorldPoint};
use thiserror::Error;
use tracing::info;

/// Errors raised while parsing a walk script.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum WalkError {
    /// A waypoint was not of the form `x,y`.
    #[error("invalid waypoint `{0}`, expected `x,y`")]
    InvalidWaypoint(String),
}

/// Parses `x,y;x,y` tile waypoints. Blank segments are skipped.
pub(crate) fn parse_waypoints(script: &str) -> Result<Vec<TileCoord>, WalkError> {
    script
        .split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let invalid = || WalkError::InvalidWaypoint(segment.to_owned());
            let (x, y) = segment.split_once(',').ok_or_else(invalid)?;
            let x = x.trim().parse().map_err(|_| invalid())?;
            let y = y.trim().parse().map_err(|_| invalid())?;
            Ok(TileCoord::new(x, y))
        })
        .collect()
}

/// Moves the player through waypoints at a fixed speed.
///
/// The walk halts for good as soon as the next step would enter a solid tile.
#[derive(Debug)]
pub(crate) struct Walker {
    waypoints: VecDeque<TileCoord>,
    speed: f32,
    tile_size: f32,
    halted: bool,
}

impl Walker {
    pub(crate) fn new(waypoints: Vec<TileCoord>, speed: f32, tile_size: f32) -> Self {
        Self {
            waypoints: waypoints.into(),
            speed,
            tile_size,
            halted: false,
        }
    }

    /// Returns the next position, or `None` when the player stays put.
    pub(crate) fn step(
        &mut self,
        position: WorldPoint,
        dt: Duration,
        tiles: TileView<'_>,
    ) -> Option<WorldPoint> {
        if self.halted {
            return None;
        }
        let waypoint = *self.waypoints.front()?;
        let target = waypoint.center(self.tile_size);
        let dx = target.x - position.x;
        let dy = target.y - position.y;
        let distance = dx.hypot(dy);
        let travel = self.speed * dt.as_secs_f32();

        let next = if distance <= travel {
            let _ = self.waypoints.pop_front();
            target
        } else {
            WorldPoint::new(
                position.x + dx / distance * travel,
                position.y + dy / distance * travel,
            )
        };

        let entering = next.tile(self.tile_size);
        if tiles.get(entering).is_solid() {
            info!(?entering, tile = ?tiles.get(entering), "walk blocked");
            self.halted = true;
            return None;
        }
        Some(next)
    }

    /// Whether every waypoint has been reached or the walk was blocked.
    pub(crate) fn is_done(&self) -> bool {
        self.halted || self.waypoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moldfarm_core::Tile;

    #[test]
    fn parses_waypoint_script() {
        assert_eq!(
            parse_waypoints(" 1,2; 3 , 4 ;"),
            Ok(vec![TileCoord::new(1, 2), TileCoord::new(3, 4)])
        );
        assert_eq!(
            parse_waypoints("1;2"),
            Err(WalkError::InvalidWaypoint("1".to_owned()))
        );
        assert_eq!(
            parse_waypoints("a,2"),
            Err(WalkError::InvalidWaypoint("a,2".to_owned()))
        );
    }

    #[test]
    fn walks_to_waypoint_then_stops() {
        let tiles = [Tile::Farm; 4];
        let view = TileView::new(&tiles, 4, 1);
        let mut walker = Walker::new(vec![TileCoord::new(2, 0)], 100.0, 16.0);
        let mut position = TileCoord::new(0, 0).center(16.0);
        let dt = Duration::from_millis(200);

        position = walker.step(position, dt, view).expect("first step");
        assert_eq!(position, WorldPoint::new(28.0, 8.0));
        position = walker.step(position, dt, view).expect("arrives");
        assert_eq!(position, WorldPoint::new(40.0, 8.0));
        assert!(walker.is_done());
        assert_eq!(walker.step(position, dt, view), None);
    }

    #[test]
    fn rock_halts_the_walk() {
        let tiles = [Tile::Farm, Tile::Rock, Tile::Farm];
        let view = TileView::new(&tiles, 3, 1);
        let mut walker = Walker::new(vec![TileCoord::new(2, 0)], 100.0, 16.0);
        let start = TileCoord::new(0, 0).center(16.0);

        assert_eq!(walker.step(start, Duration::from_millis(100), view), None);
        assert!(walker.is_done());
    }
}
