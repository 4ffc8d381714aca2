use moldfarm_config::PlayerTuning;
use moldfarm_core::{Direction, NumStat, StatKind, WorldPoint};

/// The farmer controlled by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    position: WorldPoint,
    direction: Direction,
    health: NumStat,
    food: NumStat,
}

impl Player {
    /// Creates a player at full health with no food.
    #[must_use]
    pub fn new(position: WorldPoint, health_max: f64, food_max: f64) -> Self {
        Self {
            position,
            direction: Direction::None,
            health: NumStat::full(health_max),
            food: NumStat::new(0.0, food_max),
        }
    }

    /// Creates a player from the configured start position and stat bounds.
    #[must_use]
    pub fn from_tuning(tuning: &PlayerTuning) -> Self {
        Self::new(
            WorldPoint::new(tuning.start_x, tuning.start_y),
            tuning.health_max,
            tuning.food_max,
        )
    }

    /// Current position in world units.
    #[must_use]
    pub const fn position(&self) -> WorldPoint {
        self.position
    }

    /// Last committed movement direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Health stat.
    #[must_use]
    pub const fn health(&self) -> NumStat {
        self.health
    }

    /// Food stat.
    #[must_use]
    pub const fn food(&self) -> NumStat {
        self.food
    }

    pub(crate) fn stat_mut(&mut self, kind: StatKind) -> &mut NumStat {
        match kind {
            StatKind::Health => &mut self.health,
            StatKind::Food => &mut self.food,
        }
    }

    /// Moves the player; a zero-length move keeps the previous direction.
    pub(crate) fn move_to(&mut self, position: WorldPoint) {
        let dx = position.x - self.position.x;
        let dy = position.y - self.position.y;
        if let Some(direction) = Direction::from_delta(dx, dy) {
            self.direction = direction;
        }
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_starts_full_and_hungry() {
        let player = Player::from_tuning(&PlayerTuning::default());
        assert_eq!(player.health().level(), 100.0);
        assert_eq!(player.food().level(), 0.0);
        assert_eq!(player.food().max(), 1_000.0);
        assert_eq!(player.position(), WorldPoint::new(64.0, 64.0));
        assert_eq!(player.direction(), Direction::None);
    }

    #[test]
    fn moving_commits_direction_and_standing_still_keeps_it() {
        let mut player = Player::new(WorldPoint::new(0.0, 0.0), 10.0, 10.0);
        player.move_to(WorldPoint::new(0.0, -4.0));
        assert_eq!(player.direction(), Direction::Up);
        player.move_to(WorldPoint::new(0.0, -4.0));
        assert_eq!(player.direction(), Direction::Up);
        player.move_to(WorldPoint::new(3.0, -4.0));
        assert_eq!(player.direction(), Direction::Right);
    }
}
