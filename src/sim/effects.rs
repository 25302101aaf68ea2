//! Single-slot timed power-up effects
//!
//! At most one effect is active. Activating another first runs the active
//! effect's reversal in full, then applies the new forward mutation. The engine
//! records exactly what the forward step changed (the multiplier it used, the
//! enemies it froze) so the reversal is its precise inverse.
//!
//! The engine never touches the player or enemies directly; it drives an
//! [`EffectTarget`] supplied by the caller.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::SCORE_MULTIPLIER_BOOST;
use crate::platform::EntityHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    SpeedBoost,
    DoubleCoins,
    Shield,
    MagnetCoin,
    FreezeEnemy,
    HealthBoost,
    ScoreMultiplier,
}

impl fmt::Display for PowerUpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PowerUpKind::SpeedBoost => "Speed Boost",
            PowerUpKind::DoubleCoins => "Double Coins",
            PowerUpKind::Shield => "Shield",
            PowerUpKind::MagnetCoin => "Coin Magnet",
            PowerUpKind::FreezeEnemy => "Freeze",
            PowerUpKind::HealthBoost => "Health Boost",
            PowerUpKind::ScoreMultiplier => "Score x2",
        };
        f.write_str(name)
    }
}

/// Activation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectParams {
    pub duration: f32,
    pub speed_multiplier: f32,
}

impl EffectParams {
    pub fn new(duration: f32, speed_multiplier: f32) -> Self {
        Self {
            duration,
            speed_multiplier,
        }
    }
}

/// Mutations an effect may perform
pub trait EffectTarget {
    /// Multiply player move and rotate speed; false if there is no player
    fn scale_player_speed(&mut self, factor: f32) -> bool;
    fn set_shield(&mut self, on: bool) -> bool;
    fn set_magnet(&mut self, on: bool) -> bool;
    /// Freeze every live enemy, returning the handles frozen
    fn freeze_enemies(&mut self) -> Vec<EntityHandle>;
    fn thaw_enemies(&mut self, enemies: &[EntityHandle]);
    fn set_score_multiplier(&mut self, multiplier: u32);
    fn set_double_coins(&mut self, on: bool);
    fn grant_health(&mut self) -> bool;
}

/// What the forward step actually changed
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Speed { factor: f32 },
    Shield,
    Magnet,
    Frozen(Vec<EntityHandle>),
    ScoreMultiplier,
    DoubleCoins,
    /// Nothing to undo (instant effect or missing target)
    Nothing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    pub duration: f32,
    pub remaining: f32,
    applied: Applied,
}

impl ActiveEffect {
    pub fn applied(&self) -> &Applied {
        &self.applied
    }
}

#[derive(Debug, Clone, Default)]
pub struct EffectEngine {
    active: Option<ActiveEffect>,
}

impl EffectEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ActiveEffect> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn remaining(&self) -> Option<f32> {
        self.active.as_ref().map(|e| e.remaining)
    }

    /// Start `kind`; returns the kind it preempted, if any
    pub fn activate<T: EffectTarget + ?Sized>(
        &mut self,
        kind: PowerUpKind,
        params: EffectParams,
        target: &mut T,
    ) -> Option<PowerUpKind> {
        let preempted = self.cancel(target);
        if let Some(old) = preempted {
            log::info!("{} preempted by {}", old, kind);
        }

        let applied = forward(kind, params, target);
        // Health boost is instant: it occupies the slot until the next tick
        let duration = match kind {
            PowerUpKind::HealthBoost => 0.0,
            _ => params.duration.max(0.0),
        };
        log::info!("{} active for {:.1}s", kind, duration);
        self.active = Some(ActiveEffect {
            kind,
            duration,
            remaining: duration,
            applied,
        });
        preempted
    }

    /// Count down by scaled time; returns the kind that expired this step
    pub fn advance<T: EffectTarget + ?Sized>(&mut self, dt: f32, target: &mut T) -> Option<PowerUpKind> {
        let effect = self.active.as_mut()?;
        effect.remaining = (effect.remaining - dt.max(0.0)).max(0.0);
        if effect.remaining > 0.0 {
            return None;
        }
        let expired = self.cancel(target);
        if let Some(kind) = expired {
            log::info!("{} expired", kind);
        }
        expired
    }

    /// Reverse and clear the active effect immediately
    pub fn cancel<T: EffectTarget + ?Sized>(&mut self, target: &mut T) -> Option<PowerUpKind> {
        let effect = self.active.take()?;
        reverse(effect.applied, target);
        Some(effect.kind)
    }
}

fn forward<T: EffectTarget + ?Sized>(kind: PowerUpKind, params: EffectParams, target: &mut T) -> Applied {
    match kind {
        PowerUpKind::SpeedBoost => {
            let factor = params.speed_multiplier;
            if !(factor.is_finite() && factor > 0.0) {
                log::warn!("Ignoring speed boost with multiplier {}", factor);
                return Applied::Nothing;
            }
            if target.scale_player_speed(factor) {
                Applied::Speed { factor }
            } else {
                Applied::Nothing
            }
        }
        PowerUpKind::DoubleCoins => {
            target.set_double_coins(true);
            Applied::DoubleCoins
        }
        PowerUpKind::Shield => {
            if target.set_shield(true) {
                Applied::Shield
            } else {
                Applied::Nothing
            }
        }
        PowerUpKind::MagnetCoin => {
            if target.set_magnet(true) {
                Applied::Magnet
            } else {
                Applied::Nothing
            }
        }
        PowerUpKind::FreezeEnemy => Applied::Frozen(target.freeze_enemies()),
        PowerUpKind::HealthBoost => {
            target.grant_health();
            Applied::Nothing
        }
        PowerUpKind::ScoreMultiplier => {
            target.set_score_multiplier(SCORE_MULTIPLIER_BOOST);
            Applied::ScoreMultiplier
        }
    }
}

fn reverse<T: EffectTarget + ?Sized>(applied: Applied, target: &mut T) {
    match applied {
        Applied::Speed { factor } => {
            target.scale_player_speed(1.0 / factor);
        }
        Applied::Shield => {
            target.set_shield(false);
        }
        Applied::Magnet => {
            target.set_magnet(false);
        }
        Applied::Frozen(enemies) => target.thaw_enemies(&enemies),
        Applied::ScoreMultiplier => target.set_score_multiplier(1),
        Applied::DoubleCoins => target.set_double_coins(false),
        Applied::Nothing => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Records every mutation in order
    #[derive(Debug, Default)]
    struct Recorder {
        move_speed: f32,
        rotate_speed: f32,
        has_player: bool,
        shield: bool,
        score_multiplier: u32,
        double_coins: bool,
        frozen: Vec<EntityHandle>,
        health_grants: u32,
        log: Vec<String>,
    }

    impl Recorder {
        fn with_player(move_speed: f32, rotate_speed: f32) -> Self {
            Self {
                move_speed,
                rotate_speed,
                has_player: true,
                score_multiplier: 1,
                ..Default::default()
            }
        }
    }

    impl EffectTarget for Recorder {
        fn scale_player_speed(&mut self, factor: f32) -> bool {
            self.log.push(format!("speed*{factor}"));
            if !self.has_player {
                return false;
            }
            self.move_speed *= factor;
            self.rotate_speed *= factor;
            true
        }
        fn set_shield(&mut self, on: bool) -> bool {
            self.log.push(format!("shield={on}"));
            self.shield = on;
            self.has_player
        }
        fn set_magnet(&mut self, on: bool) -> bool {
            self.log.push(format!("magnet={on}"));
            self.has_player
        }
        fn freeze_enemies(&mut self) -> Vec<EntityHandle> {
            self.log.push("freeze".into());
            self.frozen = vec![EntityHandle(1), EntityHandle(2)];
            self.frozen.clone()
        }
        fn thaw_enemies(&mut self, enemies: &[EntityHandle]) {
            self.log.push(format!("thaw{}", enemies.len()));
            self.frozen.retain(|h| !enemies.contains(h));
        }
        fn set_score_multiplier(&mut self, multiplier: u32) {
            self.log.push(format!("score={multiplier}"));
            self.score_multiplier = multiplier;
        }
        fn set_double_coins(&mut self, on: bool) {
            self.log.push(format!("coins={on}"));
            self.double_coins = on;
        }
        fn grant_health(&mut self) -> bool {
            self.log.push("health".into());
            self.health_grants += 1;
            true
        }
    }

    #[test]
    fn test_expiry_reverses_shield() {
        let mut engine = EffectEngine::new();
        let mut target = Recorder::with_player(5.0, 5.0);

        engine.activate(PowerUpKind::Shield, EffectParams::new(5.0, 1.0), &mut target);
        assert!(target.shield);
        assert_eq!(engine.advance(4.0, &mut target), None);
        assert!(target.shield);
        assert_eq!(engine.advance(1.0, &mut target), Some(PowerUpKind::Shield));
        assert!(!target.shield);
        assert!(!engine.is_active());
    }

    #[test]
    fn test_preemption_reverses_before_forward() {
        let mut engine = EffectEngine::new();
        let mut target = Recorder::with_player(5.0, 5.0);

        engine.activate(PowerUpKind::ScoreMultiplier, EffectParams::new(5.0, 1.0), &mut target);
        let preempted = engine.activate(PowerUpKind::DoubleCoins, EffectParams::new(5.0, 1.0), &mut target);

        assert_eq!(preempted, Some(PowerUpKind::ScoreMultiplier));
        assert_eq!(target.log, vec!["score=2", "score=1", "coins=true"]);
        assert_eq!(engine.active().map(|e| e.kind), Some(PowerUpKind::DoubleCoins));
        assert_eq!(target.score_multiplier, 1);
    }

    #[test]
    fn test_freeze_thaws_exactly_frozen_set() {
        let mut engine = EffectEngine::new();
        let mut target = Recorder::default();

        engine.activate(PowerUpKind::FreezeEnemy, EffectParams::new(2.0, 1.0), &mut target);
        assert_eq!(target.frozen.len(), 2);
        engine.advance(2.0, &mut target);
        assert!(target.frozen.is_empty());
        assert_eq!(target.log.last().map(String::as_str), Some("thaw2"));
    }

    #[test]
    fn test_health_boost_is_instant() {
        let mut engine = EffectEngine::new();
        let mut target = Recorder::with_player(5.0, 5.0);

        engine.activate(PowerUpKind::HealthBoost, EffectParams::new(5.0, 1.0), &mut target);
        assert_eq!(target.health_grants, 1);
        assert_eq!(engine.remaining(), Some(0.0));
        assert_eq!(engine.advance(0.016, &mut target), Some(PowerUpKind::HealthBoost));
    }

    #[test]
    fn test_speed_boost_without_player_reverses_nothing() {
        let mut engine = EffectEngine::new();
        let mut target = Recorder::default();

        engine.activate(PowerUpKind::SpeedBoost, EffectParams::new(1.0, 2.0), &mut target);
        assert_eq!(engine.active().map(|e| e.applied().clone()), Some(Applied::Nothing));
        engine.advance(1.0, &mut target);
        assert_eq!(target.log, vec!["speed*2"]);
    }

    #[test]
    fn test_invalid_multiplier_ignored() {
        let mut engine = EffectEngine::new();
        let mut target = Recorder::with_player(5.0, 5.0);

        engine.activate(PowerUpKind::SpeedBoost, EffectParams::new(1.0, 0.0), &mut target);
        assert!(target.log.is_empty());
        engine.advance(1.0, &mut target);
        assert_eq!(target.move_speed, 5.0);
    }

    #[test]
    fn test_cancel_when_idle() {
        let mut engine = EffectEngine::new();
        let mut target = Recorder::default();
        assert_eq!(engine.cancel(&mut target), None);
        assert_eq!(engine.advance(1.0, &mut target), None);
        assert!(target.log.is_empty());
    }

    proptest! {
        #[test]
        fn prop_speed_boost_round_trip_exact(
            move_speed in 0.1f32..50.0,
            rotate_speed in 0.1f32..50.0,
            multiplier in 0.05f32..20.0,
            repeats in 1usize..8,
        ) {
            let mut engine = EffectEngine::new();
            let mut target = Recorder::with_player(move_speed, rotate_speed);
            for _ in 0..repeats {
                engine.activate(PowerUpKind::SpeedBoost, EffectParams::new(3.0, multiplier), &mut target);
                prop_assert!(engine.advance(3.0, &mut target).is_some());
            }
            prop_assert!((target.move_speed - move_speed).abs() <= move_speed * 1e-4);
            prop_assert!((target.rotate_speed - rotate_speed).abs() <= rotate_speed * 1e-4);
        }

        #[test]
        fn prop_preempted_boost_restores_speed(
            move_speed in 0.1f32..50.0,
            multiplier in 0.05f32..20.0,
        ) {
            let mut engine = EffectEngine::new();
            let mut target = Recorder::with_player(move_speed, move_speed);
            engine.activate(PowerUpKind::SpeedBoost, EffectParams::new(10.0, multiplier), &mut target);
            engine.activate(PowerUpKind::Shield, EffectParams::new(10.0, 1.0), &mut target);
            prop_assert!((target.move_speed - move_speed).abs() <= move_speed * 1e-4);
            prop_assert!(target.shield);
        }
    }
}
