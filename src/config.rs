//! Session tuning, templates and catalogs
//!
//! Loaded from JSON; every field has a default so partial files work.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::platform::{TemplateId, Transform};
use crate::sim::{
    CollectibleTemplate, DifficultyConfig, PlayerEntry, PlayerProfile, PowerUpKind,
    PowerUpTemplate, Price, SpawnCategory, SpawnRules, TerrainEntry,
};

/// Everything a session needs that is not runtime state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// RNG seed (same seed + same inputs = same session)
    pub seed: u64,

    // === Spawning ===
    pub max_spawn_attempts: u32,
    pub enemy_spawn: SpawnRules,
    pub power_up_spawn: SpawnRules,
    pub coin_spawn: SpawnRules,
    pub gem_spawn: SpawnRules,

    // === Difficulty ===
    pub difficulty: DifficultyConfig,

    // === Game over / continue ===
    pub continue_offers: u32,
    pub continue_gem_price: u32,
    /// Real seconds between death and the summary
    pub game_over_reveal_delay: f32,

    // === Placement ===
    pub spawn_points: Vec<Transform>,
    pub terrain_spawn_point: Transform,

    // === Templates ===
    /// Enemy templates, one list per terrain index
    pub enemies_by_terrain: Vec<Vec<TemplateId>>,
    pub power_ups: Vec<PowerUpTemplate>,
    pub coins: Vec<CollectibleTemplate>,
    pub gems: Vec<CollectibleTemplate>,

    // === Catalogs ===
    pub terrains: Vec<TerrainEntry>,
    pub players: Vec<PlayerEntry>,
    pub default_terrain: usize,
    pub initial_unlock_level: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,

            max_spawn_attempts: MAX_SPAWN_ATTEMPTS,
            enemy_spawn: SpawnRules::enemies(),
            power_up_spawn: SpawnRules::power_ups(),
            coin_spawn: SpawnRules::coins(),
            gem_spawn: SpawnRules::gems(),

            difficulty: DifficultyConfig::default(),

            continue_offers: MAX_CONTINUE_OFFERS,
            continue_gem_price: CONTINUE_GEM_PRICE,
            game_over_reveal_delay: GAME_OVER_REVEAL_DELAY,

            spawn_points: Vec::new(),
            terrain_spawn_point: Transform::default(),

            enemies_by_terrain: Vec::new(),
            power_ups: Vec::new(),
            coins: Vec::new(),
            gems: Vec::new(),

            terrains: Vec::new(),
            players: Vec::new(),
            default_terrain: 0,
            initial_unlock_level: 0,
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded session config from {}", path.display());
        Ok(config)
    }

    pub fn spawn_rules(&self, category: SpawnCategory) -> &SpawnRules {
        match category {
            SpawnCategory::Enemy => &self.enemy_spawn,
            SpawnCategory::PowerUp => &self.power_up_spawn,
            SpawnCategory::Coin => &self.coin_spawn,
            SpawnCategory::Gem => &self.gem_spawn,
        }
    }

    /// Reject values that would break an invariant at runtime
    ///
    /// Missing content (no spawn points, no templates for a category) is not
    /// an error: the dependent operation logs and does nothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, rules) in [
            ("enemy_spawn", &self.enemy_spawn),
            ("power_up_spawn", &self.power_up_spawn),
            ("coin_spawn", &self.coin_spawn),
            ("gem_spawn", &self.gem_spawn),
        ] {
            if !(rules.interval > 0.0) {
                return Err(ConfigError::Invalid(format!("{name}.interval must be positive")));
            }
            if rules.radius < 0.0 || rules.min_distance < 0.0 || rules.occupancy_radius < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} distances must be non-negative")));
            }
        }

        let d = &self.difficulty;
        if !(d.increase_interval > 0.0) || d.increase_amount < 0.0 || d.start_speed > d.ceiling {
            return Err(ConfigError::Invalid(
                "difficulty needs a positive interval, non-negative step and start <= ceiling".into(),
            ));
        }

        if self.game_over_reveal_delay < 0.0 {
            return Err(ConfigError::Invalid("game_over_reveal_delay must be non-negative".into()));
        }

        for p in &self.power_ups {
            if p.duration < 0.0 {
                return Err(ConfigError::Invalid(format!("{} duration must be non-negative", p.kind)));
            }
            if p.kind == PowerUpKind::SpeedBoost && !(p.speed_multiplier > 0.0) {
                return Err(ConfigError::Invalid("speed boost multiplier must be positive".into()));
            }
        }

        if !self.terrains.is_empty() {
            match self.terrains.get(self.default_terrain) {
                None => {
                    return Err(ConfigError::Invalid(format!(
                        "default_terrain {} out of range",
                        self.default_terrain
                    )));
                }
                Some(t) if t.locked => {
                    return Err(ConfigError::Invalid("default terrain must be unlocked".into()));
                }
                _ => {}
            }
        }

        if !self.players.is_empty() && self.players.iter().all(|p| p.locked) {
            return Err(ConfigError::Invalid("at least one player must be unlocked".into()));
        }

        Ok(())
    }

    /// Fully populated playable setup (three terrains, three players, every power-up)
    pub fn demo() -> Self {
        let power_up = |template, kind, duration| PowerUpTemplate {
            template: TemplateId(template),
            kind,
            duration,
            speed_multiplier: 1.5,
        };

        Self {
            seed: 0xDA5E,
            spawn_points: vec![
                Transform::at(Vec3::new(0.0, 0.5, 0.0)),
                Transform::at(Vec3::new(15.0, 0.5, -10.0)),
                Transform::at(Vec3::new(-20.0, 0.5, 12.0)),
            ],
            terrain_spawn_point: Transform::default(),
            enemies_by_terrain: vec![
                vec![TemplateId(10), TemplateId(11)],
                vec![TemplateId(12), TemplateId(13)],
                vec![TemplateId(14)],
            ],
            power_ups: vec![
                power_up(20, PowerUpKind::SpeedBoost, 5.0),
                power_up(21, PowerUpKind::DoubleCoins, 10.0),
                power_up(22, PowerUpKind::Shield, 5.0),
                power_up(23, PowerUpKind::MagnetCoin, 8.0),
                power_up(24, PowerUpKind::FreezeEnemy, 4.0),
                power_up(25, PowerUpKind::HealthBoost, 0.0),
                power_up(26, PowerUpKind::ScoreMultiplier, 10.0),
            ],
            coins: vec![CollectibleTemplate {
                template: TemplateId(30),
                value: 1,
            }],
            gems: vec![CollectibleTemplate {
                template: TemplateId(31),
                value: 1,
            }],
            terrains: vec![
                TerrainEntry {
                    name: "Grasslands".into(),
                    template: TemplateId(100),
                    price: 0,
                    locked: false,
                },
                TerrainEntry {
                    name: "Desert".into(),
                    template: TemplateId(101),
                    price: 500,
                    locked: true,
                },
                TerrainEntry {
                    name: "Volcano".into(),
                    template: TemplateId(102),
                    price: 1500,
                    locked: true,
                },
            ],
            players: vec![
                PlayerEntry {
                    name: "Scout".into(),
                    template: TemplateId(1),
                    price: Price::coins(0),
                    required_level: 0,
                    locked: false,
                    profile: PlayerProfile::default(),
                },
                PlayerEntry {
                    name: "Racer".into(),
                    template: TemplateId(2),
                    price: Price::coins(800),
                    required_level: 2,
                    locked: true,
                    profile: PlayerProfile {
                        move_speed: 7.0,
                        max_speed: 12.0,
                        ..PlayerProfile::default()
                    },
                },
                PlayerEntry {
                    name: "Tank".into(),
                    template: TemplateId(3),
                    price: Price::gems(25),
                    required_level: 3,
                    locked: true,
                    profile: PlayerProfile {
                        max_health: 6,
                        rotate_speed: 4.0,
                        ..PlayerProfile::default()
                    },
                },
            ],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_is_valid() {
        let config = SessionConfig::demo();
        assert!(config.validate().is_ok());
        assert_eq!(config.enemies_by_terrain.len(), config.terrains.len());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SessionConfig::from_json_str(r#"{ "seed": 42, "continue_gem_price": 15 }"#).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.continue_gem_price, 15);
        assert_eq!(config.continue_offers, MAX_CONTINUE_OFFERS);
        assert_eq!(config.coin_spawn.capacity, Some(20));
        assert_eq!(config.gem_spawn.interval, 5.0);
        assert_eq!(config.difficulty.ceiling, ENEMY_MAX_SPEED);
    }

    #[test]
    fn test_json_round_trip_of_demo() {
        let json = serde_json::to_string(&SessionConfig::demo()).unwrap();
        let back = SessionConfig::from_json_str(&json).unwrap();
        assert_eq!(back.power_ups, SessionConfig::demo().power_ups);
        assert_eq!(back.players, SessionConfig::demo().players);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut config = SessionConfig::demo();
        config.coin_spawn.interval = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SessionConfig::demo();
        config.default_terrain = 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        assert!(matches!(
            SessionConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SessionConfig::load("/nonexistent/session.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
