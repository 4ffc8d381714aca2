#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tuning surface for the Moldfarm simulation.
//!
//! Every timing constant, probability, and radius the simulation relies on is
//! collected in [`SimulationConfig`] and handed to the session at
//! construction, so independent sessions never share mutable globals. Defaults
//! reproduce the shipped game. Durations are stored as whole milliseconds so
//! the TOML representation stays readable.

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest harvest or blast reach accepted, in tiles.
pub const MAX_RADIUS_TILES: u32 = 64;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}")]
    Read {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration text is not valid TOML for this schema.
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),
    /// The plant growth window is inverted.
    #[error("plant growth window is inverted: min {min_ms} ms exceeds max {max_ms} ms")]
    InvertedGrowthWindow {
        /// Configured lower bound.
        min_ms: u64,
        /// Configured upper bound.
        max_ms: u64,
    },
    /// A probability lies outside `0..=1`.
    #[error("{name} must lie within 0..=1, got {value}")]
    InvalidProbability {
        /// Name of the offending field.
        name: &'static str,
        /// Configured value.
        value: f64,
    },
    /// Tiles must have a positive, finite size.
    #[error("tile size must be positive and finite, got {0}")]
    InvalidTileSize(f32),
    /// Turn-based scheduling requires a positive turn length.
    #[error("turn length must be positive")]
    ZeroTurnLength,
    /// The drain loop needs at least one pass per tick.
    #[error("max drain passes must be at least one")]
    ZeroDrainPasses,
    /// A stat bound or rate is negative or not finite.
    #[error("{name} must be non-negative and finite, got {value}")]
    InvalidAmount {
        /// Name of the offending field.
        name: &'static str,
        /// Configured value.
        value: f64,
    },
    /// A harvest or blast reach exceeds [`MAX_RADIUS_TILES`].
    #[error("{name} must be at most {max} tiles, got {value}")]
    RadiusTooLarge {
        /// Name of the offending field.
        name: &'static str,
        /// Configured value.
        value: u32,
        /// Largest accepted value.
        max: u32,
    },
    /// The player's start position is not a finite point.
    #[error("player start position must be finite, got ({x}, {y})")]
    InvalidStartPosition {
        /// Configured horizontal position.
        x: f32,
        /// Configured vertical position.
        y: f32,
    },
}

/// Aggregated tuning knobs for one simulation session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Seed for the session's random source; equal seeds replay identically.
    pub rng_seed: u64,
    /// Grid geometry.
    pub grid: GridTuning,
    /// Plant growth and mold behaviour.
    pub growth: GrowthTuning,
    /// Anger escalation timings and odds.
    pub anger: AngerTuning,
    /// Explosion damage and reach.
    pub blast: BlastTuning,
    /// Player stats, start position, and reach.
    pub player: PlayerTuning,
    /// Scheduler variant and drain limits.
    pub scheduler: SchedulerTuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rng_seed: 0x6d6f_6c64_6661_726d,
            grid: GridTuning::default(),
            growth: GrowthTuning::default(),
            anger: AngerTuning::default(),
            blast: BlastTuning::default(),
            player: PlayerTuning::default(),
            scheduler: SchedulerTuning::default(),
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks every cross-field constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grid.tile_size.is_finite() && self.grid.tile_size > 0.0) {
            return Err(ConfigError::InvalidTileSize(self.grid.tile_size));
        }
        if self.growth.plant_growth_min_ms > self.growth.plant_growth_max_ms {
            return Err(ConfigError::InvertedGrowthWindow {
                min_ms: self.growth.plant_growth_min_ms,
                max_ms: self.growth.plant_growth_max_ms,
            });
        }
        check_probability("growth.mold_start_chance", self.growth.mold_start_chance)?;
        check_probability("anger.chance", self.anger.chance)?;
        check_amount("blast.damage", self.blast.damage)?;
        check_amount("player.health_max", self.player.health_max)?;
        check_amount("player.food_max", self.player.food_max)?;
        check_amount(
            "player.mold_damage_per_second",
            self.player.mold_damage_per_second,
        )?;
        check_radius(
            "player.harvest_radius_tiles",
            self.player.harvest_radius_tiles,
        )?;
        check_radius("blast.radius_tiles", self.blast.radius_tiles)?;
        if !(self.player.start_x.is_finite() && self.player.start_y.is_finite()) {
            return Err(ConfigError::InvalidStartPosition {
                x: self.player.start_x,
                y: self.player.start_y,
            });
        }
        if self.scheduler.turn_length_ms == 0 {
            return Err(ConfigError::ZeroTurnLength);
        }
        if self.scheduler.max_drain_passes == 0 {
            return Err(ConfigError::ZeroDrainPasses);
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

fn check_amount(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidAmount { name, value })
    }
}

fn check_radius(name: &'static str, value: u32) -> Result<(), ConfigError> {
    if value <= MAX_RADIUS_TILES {
        Ok(())
    } else {
        Err(ConfigError::RadiusTooLarge {
            name,
            value,
            max: MAX_RADIUS_TILES,
        })
    }
}

/// Grid geometry parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridTuning {
    /// Side length of a square tile in world units (pixels).
    pub tile_size: f32,
}

impl Default for GridTuning {
    fn default() -> Self {
        Self { tile_size: 16.0 }
    }
}

/// Plant growth and mold parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrowthTuning {
    /// Shortest time a freshly planted tile takes to grow.
    pub plant_growth_min_ms: u64,
    /// Longest time a freshly planted tile takes to grow.
    pub plant_growth_max_ms: u64,
    /// Probability that a growing plant turns into mold instead of a carrot.
    pub mold_start_chance: f64,
    /// Delay between a tile becoming mold and the mold spreading from it.
    pub mold_spread_delay_ms: u64,
}

impl Default for GrowthTuning {
    fn default() -> Self {
        Self {
            plant_growth_min_ms: 10_000,
            plant_growth_max_ms: 20_000,
            mold_start_chance: 0.1,
            mold_spread_delay_ms: 3_000,
        }
    }
}

impl GrowthTuning {
    /// Inclusive window the growth delay is drawn from.
    #[must_use]
    pub fn plant_growth_window(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.plant_growth_min_ms),
            Duration::from_millis(self.plant_growth_max_ms),
        )
    }

    /// Delay before mold spreads to neighbouring tiles.
    #[must_use]
    pub fn mold_spread_delay(&self) -> Duration {
        Duration::from_millis(self.mold_spread_delay_ms)
    }
}

/// Anger escalation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AngerTuning {
    /// Probability that a freshly grown carrot starts the anger escalation.
    pub chance: f64,
    /// Delay between the carrot growing and the warning stage.
    pub warning_delay_ms: u64,
    /// Delay between the warning stage and the dangerous stage.
    pub real_delay_ms: u64,
    /// Time the dangerous stage lasts before calming down.
    pub pass_delay_ms: u64,
}

impl Default for AngerTuning {
    fn default() -> Self {
        Self {
            chance: 0.1,
            warning_delay_ms: 5_000,
            real_delay_ms: 10_000,
            pass_delay_ms: 5_000,
        }
    }
}

impl AngerTuning {
    /// Delay before the warning stage.
    #[must_use]
    pub fn warning_delay(&self) -> Duration {
        Duration::from_millis(self.warning_delay_ms)
    }

    /// Delay before the dangerous stage.
    #[must_use]
    pub fn real_delay(&self) -> Duration {
        Duration::from_millis(self.real_delay_ms)
    }

    /// Duration of the dangerous stage.
    #[must_use]
    pub fn pass_delay(&self) -> Duration {
        Duration::from_millis(self.pass_delay_ms)
    }
}

/// Explosion parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlastTuning {
    /// Reach of an explosion measured in tiles.
    pub radius_tiles: u32,
    /// Health removed from the player per explosion.
    pub damage: f64,
}

impl Default for BlastTuning {
    fn default() -> Self {
        Self {
            radius_tiles: 2,
            damage: 20.0,
        }
    }
}

/// Player parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerTuning {
    /// Maximum (and starting) health.
    pub health_max: f64,
    /// Maximum food the player can carry.
    pub food_max: f64,
    /// Starting horizontal position in world units.
    pub start_x: f32,
    /// Starting vertical position in world units.
    pub start_y: f32,
    /// Reach of the harvest and detonation scans measured in tiles.
    pub harvest_radius_tiles: u32,
    /// Health lost per second while standing entirely on mold.
    pub mold_damage_per_second: f64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            health_max: 100.0,
            food_max: 1_000.0,
            start_x: 64.0,
            start_y: 64.0,
            harvest_radius_tiles: 2,
            mold_damage_per_second: 5.0,
        }
    }
}

/// Scheduler variant selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerMode {
    /// Continuous time; events coexist and fire in due order.
    #[default]
    Timeline,
    /// Discrete turns; at most one pending event per tile.
    Turn,
}

/// Scheduler parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerTuning {
    /// Which scheduler variant the session uses.
    pub mode: SchedulerMode,
    /// Length of one turn in turn mode; delays round up to whole turns.
    pub turn_length_ms: u64,
    /// Upper bound on drain passes per tick when zero-delay events cascade.
    pub max_drain_passes: u32,
}

impl Default for SchedulerTuning {
    fn default() -> Self {
        Self {
            mode: SchedulerMode::Timeline,
            turn_length_ms: 1_000,
            max_drain_passes: 64,
        }
    }
}

impl SchedulerTuning {
    /// Length of one turn.
    #[must_use]
    pub fn turn_length(&self) -> Duration {
        Duration::from_millis(self.turn_length_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_game() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.growth.plant_growth_window(),
            (Duration::from_secs(10), Duration::from_secs(20))
        );
        assert_eq!(config.growth.mold_spread_delay(), Duration::from_secs(3));
        assert_eq!(config.anger.real_delay(), Duration::from_secs(10));
        assert_eq!(config.player.harvest_radius_tiles, 2);
        assert_eq!(config.scheduler.mode, SchedulerMode::Timeline);
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_fields() {
        let config = SimulationConfig::from_toml_str(
            r#"
            rng_seed = 7

            [growth]
            mold_start_chance = 0.5

            [scheduler]
            mode = "turn"
            turn_length_ms = 250
            "#,
        )
        .expect("valid config");

        assert_eq!(config.rng_seed, 7);
        assert_eq!(config.growth.mold_start_chance, 0.5);
        assert_eq!(config.growth.plant_growth_min_ms, 10_000);
        assert_eq!(config.scheduler.mode, SchedulerMode::Turn);
        assert_eq!(config.scheduler.turn_length(), Duration::from_millis(250));
        assert_eq!(config.blast, BlastTuning::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = SimulationConfig::from_toml_str("[growth]\nmold_chance = 0.2\n")
            .expect_err("unknown field");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn inverted_growth_window_is_rejected() {
        let mut config = SimulationConfig::default();
        config.growth.plant_growth_min_ms = 30_000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedGrowthWindow {
                min_ms: 30_000,
                max_ms: 20_000
            })
        ));
    }

    #[test]
    fn probabilities_outside_unit_interval_are_rejected() {
        let mut config = SimulationConfig::default();
        config.anger.chance = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProbability {
                name: "anger.chance",
                ..
            })
        ));
    }

    #[test]
    fn degenerate_geometry_and_scheduling_are_rejected() {
        let mut config = SimulationConfig::default();
        config.grid.tile_size = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTileSize(_))
        ));

        let mut config = SimulationConfig::default();
        config.scheduler.turn_length_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTurnLength)));

        let mut config = SimulationConfig::default();
        config.scheduler.max_drain_passes = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroDrainPasses)));
    }

    #[test]
    fn oversized_reach_and_non_finite_start_are_rejected() {
        let mut config = SimulationConfig::default();
        config.player.harvest_radius_tiles = u32::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RadiusTooLarge {
                name: "player.harvest_radius_tiles",
                ..
            })
        ));

        let mut config = SimulationConfig::default();
        config.blast.radius_tiles = MAX_RADIUS_TILES + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RadiusTooLarge {
                name: "blast.radius_tiles",
                ..
            })
        ));

        let mut config = SimulationConfig::default();
        config.blast.radius_tiles = MAX_RADIUS_TILES;
        assert!(config.validate().is_ok());

        let mut config = SimulationConfig::default();
        config.player.start_y = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidStartPosition { .. })
        ));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("moldfarm.toml");
        fs::write(&path, "[blast]\ndamage = 35.0\n").expect("write config");

        let config = SimulationConfig::load(&path).expect("load config");
        assert_eq!(config.blast.damage, 35.0);

        let missing = SimulationConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
