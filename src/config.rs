//! Game configuration
//!
//! Pacing and the level table. Loaded from JSON when a path is given,
//! otherwise the reference game is used.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SimError, SimResult};

/// One playable level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Interior width in cells
    pub width: usize,
    /// Interior height in cells
    pub height: usize,
    /// `height` lines of `width` digits (0 solid, 1 empty, 2 pellet)
    pub layout: String,
    pub player_spawn: (f32, f32),
    pub player_speed: f32,
    pub adversary_spawn: (f32, f32),
    pub adversary_count: usize,
    pub adversary_speed: f32,
}

impl LevelConfig {
    /// Reference level with the given adversary pressure
    pub fn reference(adversary_count: usize, adversary_speed: f32) -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            layout: REFERENCE_LEVEL.to_string(),
            player_spawn: PLAYER_SPAWN,
            player_speed: PLAYER_SPEED,
            adversary_spawn: ADVERSARY_SPAWN,
            adversary_count,
            adversary_speed,
        }
    }

    /// Whether a mover circle centered at `(x, y)` fits inside the maze
    fn circle_fits(&self, x: f32, y: f32) -> bool {
        x - MOVER_RADIUS >= 0.0
            && y - MOVER_RADIUS >= 0.0
            && x + MOVER_RADIUS <= self.width as f32
            && y + MOVER_RADIUS <= self.height as f32
    }
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Nominal tick rate, used for distance per tick
    pub ticks_per_second: u32,
    /// Actual delay between scheduled ticks
    pub tick_delay_ms: u64,
    /// Adversary RNG seed. `None` picks one per controller.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Level table, level 1 first
    pub levels: Vec<LevelConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: TICKS_PER_SECOND,
            tick_delay_ms: TICK_DELAY_MS,
            seed: None,
            levels: vec![
                LevelConfig::reference(3, 0.6),
                LevelConfig::reference(5, 1.0),
            ],
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {} ({} levels)", path.display(), config.levels.len());
        Ok(config)
    }

    pub fn to_json(&self) -> SimResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SimError::Config(e.to_string()))
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.ticks_per_second == 0 {
            return Err(SimError::Config("ticks_per_second must be positive".into()));
        }
        if self.levels.is_empty() {
            return Err(SimError::Config("at least one level is required".into()));
        }
        for (i, level) in self.levels.iter().enumerate() {
            let n = i + 1;
            if level.width == 0 || level.height == 0 {
                return Err(SimError::Config(format!("level {n}: empty grid")));
            }
            let speeds = [level.player_speed, level.adversary_speed];
            if speeds.iter().any(|s| !s.is_finite() || *s < 0.0) {
                return Err(SimError::Config(format!("level {n}: speeds must be non-negative")));
            }
            let mut spawns = vec![("player", level.player_spawn)];
            if level.adversary_count > 0 {
                spawns.push(("adversary", level.adversary_spawn));
            }
            for (what, (x, y)) in spawns {
                if !level.circle_fits(x, y) {
                    return Err(SimError::Config(format!(
                        "level {n}: {what} spawn ({x}, {y}) is outside the maze"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }

    /// Number of the last level
    pub fn final_level(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Level entry for a 1-based level number
    pub fn level(&self, level: u32) -> SimResult<&LevelConfig> {
        level
            .checked_sub(1)
            .and_then(|i| self.levels.get(i as usize))
            .ok_or_else(|| {
                SimError::InvalidArgument(format!(
                    "not a valid level: {level} (expected 1..={})",
                    self.final_level()
                ))
            })
    }
}
