//! Enemy speed ramp
//!
//! Every `increase_interval` seconds of active play the shared enemy speed steps
//! up by `increase_amount` until it reaches `ceiling`. Each step pushes the new
//! absolute speed into every live enemy.

use serde::{Deserialize, Serialize};

use super::pool::EntityPool;
use crate::consts::*;
use crate::platform::{TemplateId, World};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub start_speed: f32,
    pub increase_interval: f32,
    pub increase_amount: f32,
    pub ceiling: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            start_speed: ENEMY_START_SPEED,
            increase_interval: ENEMY_SPEED_INTERVAL,
            increase_amount: ENEMY_SPEED_STEP,
            ceiling: ENEMY_MAX_SPEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyScaler {
    config: DifficultyConfig,
    current_speed: f32,
    elapsed: f32,
}

impl DifficultyScaler {
    pub fn new(config: DifficultyConfig) -> Self {
        Self {
            config,
            current_speed: config.start_speed.min(config.ceiling),
            elapsed: 0.0,
        }
    }

    pub fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    /// Active time since the last increase
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Back to the session-start baseline
    pub fn reset(&mut self) {
        self.current_speed = self.config.start_speed.min(self.config.ceiling);
        self.elapsed = 0.0;
    }

    /// Accumulate active time; returns the new speed when a step fired
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        if dt <= 0.0 {
            return None;
        }
        self.elapsed += dt;

        if self.elapsed >= self.config.increase_interval && self.current_speed < self.config.ceiling {
            self.current_speed =
                (self.current_speed + self.config.increase_amount.max(0.0)).min(self.config.ceiling);
            self.elapsed = 0.0;
            log::info!("Enemy speed raised to {:.2}", self.current_speed);
            Some(self.current_speed)
        } else {
            None
        }
    }

    /// Push the current speed into every live enemy
    pub fn broadcast<W: World + ?Sized>(&self, world: &mut W, enemies: &EntityPool<TemplateId>) {
        for enemy in enemies.handles() {
            if world.is_live(enemy) {
                world.set_enemy_speed(enemy, self.current_speed);
            }
        }
    }
}
