//! Session state and core simulation types
//!
//! Everything the orchestrator mutates per tick that is not owned by one of the
//! component modules lives here, along with the outbound notification and event
//! vocabularies.

use serde::{Deserialize, Serialize};

use super::catalog::PlayerProfile;
use super::economy::Currency;
use super::effects::PowerUpKind;
use super::pool::SpawnCategory;
use crate::platform::EntityHandle;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Not playing; catalogs and shop are usable
    MainMenu,
    /// Active gameplay
    Running,
    /// Time multiplier is zero; nothing advances
    Paused,
    /// Player died; summary pending or shown without a continue offer
    GameOver,
    /// Game-over summary shown with a continue offer open
    Continuing,
}

/// Result of applying damage to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Damage absorbed by the shield
    Blocked,
    Damaged { health: u32 },
    /// Health reached zero on this hit
    Died,
    /// Player was already dead; nothing changed
    AlreadyDead,
}

/// Gameplay parameters of the live player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub handle: EntityHandle,
    pub move_speed: f32,
    pub max_speed: f32,
    pub rotate_speed: f32,
    pub health: u32,
    pub max_health: u32,
    pub shielded: bool,
    pub magnet: bool,
    pub alive: bool,
}

impl PlayerState {
    pub fn new(handle: EntityHandle, profile: &PlayerProfile) -> Self {
        Self {
            handle,
            move_speed: profile.move_speed,
            max_speed: profile.max_speed,
            rotate_speed: profile.rotate_speed,
            health: profile.max_health,
            max_health: profile.max_health,
            shielded: false,
            magnet: false,
            alive: true,
        }
    }

    /// Apply damage; the shield only stops enemy hits
    pub fn take_damage(&mut self, amount: u32, from_enemy: bool) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::AlreadyDead;
        }
        if self.shielded && from_enemy {
            return DamageOutcome::Blocked;
        }

        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.alive = false;
            DamageOutcome::Died
        } else {
            DamageOutcome::Damaged {
                health: self.health,
            }
        }
    }

    /// Restore one health point, capped at max
    pub fn increase_health(&mut self) -> bool {
        if self.health < self.max_health {
            self.health += 1;
            true
        } else {
            false
        }
    }

    /// Full heal and revive (continue)
    pub fn reset_health(&mut self) {
        self.health = self.max_health;
        self.alive = true;
    }
}

/// Toggles read by score accrual and the economy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub score_multiplier: u32,
    pub double_coins: bool,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            score_multiplier: 1,
            double_coins: false,
        }
    }
}

/// One-way display updates for the UI collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    BalanceChanged {
        currency: Currency,
        balance: u32,
    },
    Score(u32),
    PowerUpRemaining {
        kind: PowerUpKind,
        remaining: f32,
    },
    PowerUpCleared,
    GameOverSummary {
        score: u32,
        best: u32,
        continue_offered: bool,
    },
    TerrainView {
        index: usize,
        name: String,
        price: u32,
        locked: bool,
        selected: bool,
        affordable: bool,
    },
    PlayerView {
        index: usize,
        name: String,
        price: u32,
        currency: Currency,
        locked: bool,
        selected: bool,
        level_unlocked: bool,
        affordable: bool,
    },
    /// Transient user-facing message (insufficient funds, locked content)
    Message(String),
    StateChanged(SessionState),
}

/// Sink for notifications
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

impl Notifier for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    Spawned {
        category: SpawnCategory,
        handle: EntityHandle,
    },
    /// Spawn timer fired but no valid point was found this tick
    SpawnDropped { category: SpawnCategory },
    DifficultyRaised { speed: f32 },
    EffectExpired { kind: PowerUpKind },
    GameOverRevealed {
        score: u32,
        best: u32,
        continue_offered: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayerState {
        PlayerState::new(EntityHandle(1), &PlayerProfile::default())
    }

    #[test]
    fn test_shield_blocks_only_enemy_damage() {
        let mut p = player();
        p.shielded = true;
        assert_eq!(p.take_damage(1, true), DamageOutcome::Blocked);
        assert_eq!(p.health, p.max_health);

        assert_eq!(
            p.take_damage(1, false),
            DamageOutcome::Damaged {
                health: p.max_health - 1
            }
        );
    }

    #[test]
    fn test_death_reported_once() {
        let mut p = player();
        assert_eq!(p.take_damage(100, false), DamageOutcome::Died);
        assert_eq!(p.health, 0);
        assert_eq!(p.take_damage(1, false), DamageOutcome::AlreadyDead);

        p.reset_health();
        assert!(p.alive);
        assert_eq!(p.health, p.max_health);
    }

    #[test]
    fn test_increase_health_capped() {
        let mut p = player();
        assert!(!p.increase_health());
        p.take_damage(2, false);
        assert!(p.increase_health());
        assert_eq!(p.health, p.max_health - 1);
    }
}
