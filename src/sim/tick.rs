//! Per-frame session advancement
//!
//! One tick, in order:
//! 1. time accumulation (score)
//! 2. difficulty scaling
//! 3. spawn timers (enemy, power-up, coin, gem)
//! 4. effect countdown
//!
//! All of it uses scaled time, so a paused session advances nothing. The only
//! thing that runs on real time is the game-over reveal countdown.

use super::pool::SpawnCategory;
use super::session::{EffectHost, Session};
use super::spawner::{SpawnOutcome, spawn_constrained};
use super::state::{Notification, Notifier, SessionState, TickEvent};
use crate::persistence::KeyValueStore;
use crate::platform::{TemplateId, World};

impl<W: World, S: KeyValueStore> Session<W, S> {
    /// Advance by `dt` real seconds; returns what happened
    pub fn tick(&mut self, dt: f32) -> Vec<TickEvent> {
        let mut events = Vec::new();
        if !dt.is_finite() || dt <= 0.0 {
            return events;
        }

        match self.state {
            SessionState::Running => self.tick_running(dt * self.time_scale, &mut events),
            SessionState::GameOver => self.tick_game_over(dt, &mut events),
            SessionState::MainMenu | SessionState::Paused | SessionState::Continuing => {}
        }
        events
    }

    fn tick_running(&mut self, dt: f32, events: &mut Vec<TickEvent>) {
        if dt <= 0.0 {
            return;
        }

        // Time accumulation
        if self.score.accumulate(dt, self.modifiers.score_multiplier) {
            self.outbox.notify(Notification::Score(self.score.score()));
        }

        // Difficulty
        if let Some(speed) = self.difficulty.advance(dt) {
            self.difficulty.broadcast(&mut self.world, &self.pools.enemies);
            events.push(TickEvent::DifficultyRaised { speed });
        }

        // Spawning
        self.pools.enemies.retain_live(&self.world);
        self.pools.power_ups.retain_live(&self.world);
        self.pools.coins.retain_live(&self.world);
        self.pools.gems.retain_live(&self.world);

        for category in SpawnCategory::ALL {
            let fired = self.timers.get_mut(category).advance(dt);
            for _ in 0..fired {
                match self.spawn_one(category) {
                    SpawnOutcome::Spawned { handle, .. } => {
                        events.push(TickEvent::Spawned { category, handle });
                    }
                    SpawnOutcome::Exhausted => {
                        log::debug!("No free spot for {:?}, skipping", category);
                        events.push(TickEvent::SpawnDropped { category });
                    }
                    SpawnOutcome::NoTemplates => {
                        log::warn!("No {:?} templates configured", category);
                    }
                    SpawnOutcome::AtCapacity | SpawnOutcome::NoOrigin => {}
                }
            }
        }

        // Effect countdown
        let mut host = EffectHost::new(
            &mut self.world,
            &mut self.player,
            &self.pools.enemies,
            &mut self.modifiers,
        );
        if let Some(kind) = self.effects.advance(dt, &mut host) {
            self.shown_remaining = None;
            self.outbox.notify(Notification::PowerUpCleared);
            events.push(TickEvent::EffectExpired { kind });
        } else if let Some(active) = self.effects.active() {
            let shown = active.remaining.ceil() as u32;
            if self.shown_remaining != Some(shown) {
                self.shown_remaining = Some(shown);
                self.outbox.notify(Notification::PowerUpRemaining {
                    kind: active.kind,
                    remaining: active.remaining,
                });
            }
        }
    }

    fn tick_game_over(&mut self, dt: f32, events: &mut Vec<TickEvent>) {
        let Some(remaining) = self.reveal_timer.as_mut() else {
            return;
        };
        *remaining -= dt;
        if *remaining <= 0.0 {
            let (score, best, continue_offered) = self.reveal_game_over();
            events.push(TickEvent::GameOverRevealed {
                score,
                best,
                continue_offered,
            });
        }
    }

    /// One constrained spawn around the live player
    fn spawn_one(&mut self, category: SpawnCategory) -> SpawnOutcome {
        let Some(origin) = self
            .player
            .as_ref()
            .filter(|p| p.alive)
            .and_then(|p| self.world.position(p.handle))
        else {
            return SpawnOutcome::NoOrigin;
        };

        let rules = *self.config.spawn_rules(category);
        let constraint = rules.constraint(origin, self.config.max_spawn_attempts);
        let probe = rules.occupancy_radius;

        match category {
            SpawnCategory::Enemy => {
                let terrain = self.terrains.selected_index().unwrap_or(0);
                let templates: &[TemplateId] = self
                    .enemy_templates
                    .get(terrain)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let outcome = spawn_constrained(
                    &mut self.rng,
                    &mut self.world,
                    &mut self.pools.enemies,
                    templates,
                    &constraint,
                    probe,
                );
                if let SpawnOutcome::Spawned { handle, .. } = outcome {
                    self.world
                        .set_enemy_speed(handle, self.difficulty.current_speed());
                    if let Some(player) = &self.player {
                        self.world.set_enemy_target(handle, player.handle);
                    }
                }
                outcome
            }
            SpawnCategory::PowerUp => spawn_constrained(
                &mut self.rng,
                &mut self.world,
                &mut self.pools.power_ups,
                &self.config.power_ups,
                &constraint,
                probe,
            ),
            SpawnCategory::Coin => spawn_constrained(
                &mut self.rng,
                &mut self.world,
                &mut self.pools.coins,
                &self.config.coins,
                &constraint,
                probe,
            ),
            SpawnCategory::Gem => spawn_constrained(
                &mut self.rng,
                &mut self.world,
                &mut self.pools.gems,
                &self.config.gems,
                &constraint,
                probe,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::persistence::MemoryStore;
    use crate::consts::MAX_TIMER_CATCH_UP;
    use crate::platform::{SandboxWorld, TemplateId};
    use crate::sim::{DifficultyConfig, PowerUpKind};

    type TestSession = Session<SandboxWorld, MemoryStore>;

    fn running(config: SessionConfig) -> TestSession {
        let mut s = Session::new(config, SandboxWorld::new(), MemoryStore::new());
        s.start().unwrap();
        s
    }

    fn spawned(events: &[TickEvent], category: SpawnCategory) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, TickEvent::Spawned { category: c, .. } if *c == category))
            .count()
    }

    #[test]
    fn test_spawn_schedule_by_category() {
        let mut s = running(SessionConfig::demo());
        let mut events = Vec::new();
        for _ in 0..120 {
            events.extend(s.tick(0.25));
        }
        // 30 seconds of play
        assert_eq!(spawned(&events, SpawnCategory::Enemy), 6);
        assert_eq!(spawned(&events, SpawnCategory::PowerUp), 3);
        assert_eq!(spawned(&events, SpawnCategory::Coin), 10);
        assert_eq!(spawned(&events, SpawnCategory::Gem), 6);
        assert_eq!(s.score(), 30);
    }

    #[test]
    fn test_stalled_frame_spawns_bounded_burst() {
        let mut s = running(SessionConfig::demo());
        let events = s.tick(1.0e9);
        assert_eq!(spawned(&events, SpawnCategory::Enemy), MAX_TIMER_CATCH_UP as usize);
        assert!(spawned(&events, SpawnCategory::Coin) <= MAX_TIMER_CATCH_UP as usize);
        assert_eq!(s.state(), SessionState::Running);

        // Back to the normal cadence afterwards
        let events = s.tick(0.25);
        assert!(spawned(&events, SpawnCategory::Enemy) <= 1);
    }

    #[test]
    fn test_enemies_come_from_selected_terrain() {
        let mut config = SessionConfig::demo();
        config.terrains[1].locked = false;
        let mut s = Session::new(config, SandboxWorld::new(), MemoryStore::new());
        s.browse_terrain(1).unwrap();
        assert_eq!(s.select_terrain(), Ok(true));
        s.start().unwrap();

        for _ in 0..20 {
            s.tick(1.0);
        }
        let world = s.world();
        let from_selected = world.count_template(TemplateId(12)) + world.count_template(TemplateId(13));
        assert_eq!(from_selected, s.pools().enemies.len());
        assert!(from_selected > 0);
        assert_eq!(world.count_template(TemplateId(10)) + world.count_template(TemplateId(11)), 0);
    }

    #[test]
    fn test_pickups_capped() {
        let mut s = running(SessionConfig::demo());
        for _ in 0..200 {
            s.tick(1.0);
        }
        assert_eq!(s.pools().coins.len(), 20);
        assert_eq!(s.pools().gems.len(), 10);
    }

    #[test]
    fn test_pause_stops_everything() {
        let mut s = running(SessionConfig::demo());
        s.tick(2.0);
        let before = s.timers().get(SpawnCategory::Coin).accumulated();
        s.pause().unwrap();

        assert!(s.tick(100.0).is_empty());
        assert_eq!(s.score(), 2);
        assert_eq!(s.difficulty().elapsed(), 2.0);
        assert_eq!(s.timers().get(SpawnCategory::Coin).accumulated(), before);

        s.resume().unwrap();
        let events = s.tick(1.0);
        assert_eq!(spawned(&events, SpawnCategory::Coin), 1);
    }

    #[test]
    fn test_crowded_field_drops_spawns() {
        let mut s = running(SessionConfig::demo());
        s.world_mut().set_fully_occupied(true);
        let events = s.tick(5.0);

        assert!(events.contains(&TickEvent::SpawnDropped {
            category: SpawnCategory::Enemy
        }));
        assert_eq!(s.pools().total(), 0);
    }

    #[test]
    fn test_no_templates_is_noop() {
        let config = SessionConfig {
            coins: Vec::new(),
            ..SessionConfig::demo()
        };
        let mut s = running(config);
        let events = s.tick(3.0);
        assert_eq!(spawned(&events, SpawnCategory::Coin), 0);
        assert!(s.pools().coins.is_empty());
    }

    #[test]
    fn test_no_player_no_spawns() {
        let config = SessionConfig {
            spawn_points: Vec::new(),
            ..SessionConfig::demo()
        };
        let mut s = running(config);
        assert!(s.player().is_none());
        let events = s.tick(10.0);
        assert!(events.iter().all(|e| !matches!(e, TickEvent::Spawned { .. })));
    }

    #[test]
    fn test_new_enemies_get_current_speed_and_target() {
        let config = SessionConfig {
            difficulty: DifficultyConfig {
                increase_interval: 1.0,
                ..Default::default()
            },
            ..SessionConfig::demo()
        };
        let mut s = running(config);
        for _ in 0..5 {
            s.tick(1.0);
        }
        let speed = s.difficulty().current_speed();
        assert_eq!(speed, 5.5);

        let player = s.player().unwrap().handle;
        let enemy = s.pools().enemies.handles().next().expect("enemy after 5s");
        let entity = s.world().entity(enemy).unwrap();
        assert_eq!(entity.speed, Some(speed));
        assert_eq!(entity.target, Some(player));
    }

    #[test]
    fn test_difficulty_broadcast_reaches_live_enemies() {
        let mut s = running(SessionConfig::demo());
        s.tick(5.0);
        let enemy = s.pools().enemies.handles().next().expect("enemy after 5s");
        assert_eq!(s.world().entity(enemy).unwrap().speed, Some(3.0));

        let events = s.tick(45.0);
        assert!(events.contains(&TickEvent::DifficultyRaised { speed: 3.5 }));
        assert_eq!(s.world().entity(enemy).unwrap().speed, Some(3.5));
    }

    #[test]
    fn test_effect_expires_on_scaled_time() {
        let mut s = running(SessionConfig::demo());
        s.activate_power_up(PowerUpKind::ScoreMultiplier, 2.0, 1.0).unwrap();
        s.pause().unwrap();
        s.tick(10.0);
        assert!(s.effects().is_active());
        s.resume().unwrap();

        // Score accrues double while active
        s.tick(1.0);
        assert_eq!(s.score(), 2);
        let events = s.tick(1.0);
        assert!(events.contains(&TickEvent::EffectExpired {
            kind: PowerUpKind::ScoreMultiplier
        }));
        assert_eq!(s.modifiers().score_multiplier, 1);
        assert!(s.drain_notifications().contains(&Notification::PowerUpCleared));
    }

    #[test]
    fn test_freeze_thaws_only_frozen_enemies() {
        let mut s = running(SessionConfig::demo());
        s.tick(5.0);
        let first = s.pools().enemies.handles().next().expect("enemy after 5s");
        s.activate_power_up(PowerUpKind::FreezeEnemy, 6.0, 1.0).unwrap();
        assert!(s.world().entity(first).unwrap().frozen);

        s.tick(5.0);
        let second = s
            .pools()
            .enemies
            .handles()
            .find(|h| *h != first)
            .expect("second enemy after 10s");
        assert!(!s.world().entity(second).unwrap().frozen);

        s.tick(1.0);
        assert!(!s.effects().is_active());
        assert!(!s.world().entity(first).unwrap().frozen);
    }

    #[test]
    fn test_host_destroyed_entities_pruned() {
        let mut s = running(SessionConfig::demo());
        s.tick(3.0);
        let coin = s.pools().coins.handles().next().expect("coin after 3s");
        s.world_mut().destroy_externally(coin);
        s.tick(0.1);
        assert!(!s.pools().coins.contains(coin));
        assert_eq!(s.collect_coin(coin), None);
    }

    #[test]
    fn test_invalid_dt_ignored() {
        let mut s = running(SessionConfig::demo());
        assert!(s.tick(f32::NAN).is_empty());
        assert!(s.tick(-1.0).is_empty());
        assert_eq!(s.score(), 0);
    }
}
