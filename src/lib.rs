//! Dash Survival - session runner for an arcade survival game
//!
//! Core modules:
//! - `sim`: Deterministic session simulation (state machine, spawning, effects, economy)
//! - `platform`: Host abstraction (entity instantiation, occupancy queries, enemy control)
//! - `persistence`: Key-value storage for balances and best score
//! - `config`: Data-driven tuning, templates and catalogs

pub mod config;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod score;
pub mod sim;

pub use config::SessionConfig;
pub use error::{ConfigError, SelectionError, SessionError};
pub use score::ScoreKeeper;

use glam::Vec3;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Rejection-sampling budget for a single spawn attempt
    pub const MAX_SPAWN_ATTEMPTS: u32 = 100;
    /// Most intervals a spawn timer reports for a single tick after a stall
    pub const MAX_TIMER_CATCH_UP: u32 = 4;
    /// Radius of the sphere probed around a spawn candidate for obstacles
    pub const OCCUPANCY_PROBE_RADIUS: f32 = 1.0;

    /// Enemies and power-ups sit just above the ground plane
    pub const GROUND_SPAWN_HEIGHT: f32 = 0.2;
    /// Coins and gems float at pickup height
    pub const PICKUP_SPAWN_HEIGHT: f32 = 1.0;

    /// Enemy speed at session start (units/s)
    pub const ENEMY_START_SPEED: f32 = 3.0;
    /// Seconds of active play between enemy speed increases
    pub const ENEMY_SPEED_INTERVAL: f32 = 50.0;
    pub const ENEMY_SPEED_STEP: f32 = 0.5;
    pub const ENEMY_MAX_SPEED: f32 = 9.0;

    /// Score accrual multiplier while the ScoreMultiplier effect is active
    pub const SCORE_MULTIPLIER_BOOST: u32 = 2;
    /// Coin value multiplier while DoubleCoins is active
    pub const DOUBLE_COINS_FACTOR: u32 = 2;

    /// Continue offers per game-over episode before the offer is withheld
    pub const MAX_CONTINUE_OFFERS: u32 = 2;
    /// Flat gem price of a continue
    pub const CONTINUE_GEM_PRICE: u32 = 10;
    /// Real-time delay before the game-over summary is revealed (seconds)
    pub const GAME_OVER_REVEAL_DELAY: f32 = 1.0;

    /// Player upgrade caps and steps
    pub const SPEED_UPGRADE_STEP: f32 = 2.0;
    pub const ROTATION_UPGRADE_STEP: f32 = 1.0;
    pub const ROTATION_UPGRADE_CAP: f32 = 6.0;
    pub const HEALTH_UPGRADE_CAP: u32 = 6;
    pub const UPGRADE_PRICE_STEP: u32 = 50;
}

/// Uniform random point inside a sphere of the given radius (centered at the origin)
pub fn random_point_in_sphere<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        if p.length_squared() <= 1.0 {
            return p * radius;
        }
    }
}
