//! Session orchestrator
//!
//! [`Session`] owns every component of a play session and is the only place
//! state transitions happen. The host supplies a [`World`] and a
//! [`KeyValueStore`] at construction, drives [`Session::tick`] once per frame,
//! forwards gameplay events (hits, pickups, enemy deaths) and drains UI
//! notifications from the outbox.
//!
//! Transitions:
//! - `MainMenu --start--> Running`
//! - `Running --pause--> Paused --resume--> Running`
//! - `Running --player dies--> GameOver`, then after the reveal delay either
//!   `Continuing` (offer open) or stays `GameOver` (offer withheld)
//! - `Continuing --continue (ad | gems)--> Running`
//! - `GameOver | Continuing --back_to_menu--> MainMenu`
//! - `Running | Paused --give_up--> MainMenu`

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::catalog::{PlayerCatalog, TerrainCatalog, Upgrade};
use super::difficulty::DifficultyScaler;
use super::economy::{Currency, EconomyLedger};
use super::effects::{EffectEngine, EffectParams, EffectTarget, PowerUpKind};
use super::pool::{EntityPool, EntityPools, SpawnCategory};
use super::spawner::SpawnTimer;
use super::state::{DamageOutcome, Modifiers, Notification, Notifier, PlayerState, SessionState};
use crate::config::SessionConfig;
use crate::error::{SelectionError, SessionError};
use crate::persistence::KeyValueStore;
use crate::platform::{EntityHandle, TemplateId, World};
use crate::score::ScoreKeeper;

/// One periodic timer per spawn category
#[derive(Debug, Clone)]
pub struct SpawnTimers {
    enemy: SpawnTimer,
    power_up: SpawnTimer,
    coin: SpawnTimer,
    gem: SpawnTimer,
}

impl SpawnTimers {
    fn new(config: &SessionConfig) -> Self {
        Self {
            enemy: SpawnTimer::new(config.enemy_spawn.interval),
            power_up: SpawnTimer::new(config.power_up_spawn.interval),
            coin: SpawnTimer::new(config.coin_spawn.interval),
            gem: SpawnTimer::new(config.gem_spawn.interval),
        }
    }

    pub(super) fn get_mut(&mut self, category: SpawnCategory) -> &mut SpawnTimer {
        match category {
            SpawnCategory::Enemy => &mut self.enemy,
            SpawnCategory::PowerUp => &mut self.power_up,
            SpawnCategory::Coin => &mut self.coin,
            SpawnCategory::Gem => &mut self.gem,
        }
    }

    pub fn get(&self, category: SpawnCategory) -> &SpawnTimer {
        match category {
            SpawnCategory::Enemy => &self.enemy,
            SpawnCategory::PowerUp => &self.power_up,
            SpawnCategory::Coin => &self.coin,
            SpawnCategory::Gem => &self.gem,
        }
    }

    fn reset(&mut self) {
        for category in SpawnCategory::ALL {
            self.get_mut(category).reset();
        }
    }
}

/// What a power-up may touch, borrowed out of the session for one call
pub(super) struct EffectHost<'a, W: World + ?Sized> {
    world: &'a mut W,
    player: &'a mut Option<PlayerState>,
    enemies: &'a EntityPool<TemplateId>,
    modifiers: &'a mut Modifiers,
}

impl<'a, W: World + ?Sized> EffectHost<'a, W> {
    pub(super) fn new(
        world: &'a mut W,
        player: &'a mut Option<PlayerState>,
        enemies: &'a EntityPool<TemplateId>,
        modifiers: &'a mut Modifiers,
    ) -> Self {
        Self {
            world,
            player,
            enemies,
            modifiers,
        }
    }
}

impl<W: World + ?Sized> EffectTarget for EffectHost<'_, W> {
    fn scale_player_speed(&mut self, factor: f32) -> bool {
        match self.player.as_mut() {
            Some(p) => {
                p.move_speed *= factor;
                p.rotate_speed *= factor;
                true
            }
            None => false,
        }
    }

    fn set_shield(&mut self, on: bool) -> bool {
        if let Some(p) = self.player.as_mut() {
            p.shielded = on;
            return true;
        }
        false
    }

    fn set_magnet(&mut self, on: bool) -> bool {
        if let Some(p) = self.player.as_mut() {
            p.magnet = on;
            return true;
        }
        false
    }

    fn freeze_enemies(&mut self) -> Vec<EntityHandle> {
        let frozen: Vec<EntityHandle> = self
            .enemies
            .handles()
            .filter(|h| self.world.is_live(*h))
            .collect();
        for enemy in &frozen {
            self.world.set_enemy_frozen(*enemy, true);
        }
        frozen
    }

    fn thaw_enemies(&mut self, enemies: &[EntityHandle]) {
        for enemy in enemies {
            if self.world.is_live(*enemy) {
                self.world.set_enemy_frozen(*enemy, false);
            }
        }
    }

    fn set_score_multiplier(&mut self, multiplier: u32) {
        self.modifiers.score_multiplier = multiplier;
    }

    fn set_double_coins(&mut self, on: bool) {
        self.modifiers.double_coins = on;
    }

    fn grant_health(&mut self) -> bool {
        self.player
            .as_mut()
            .is_some_and(|p| p.increase_health())
    }
}

/// A play session and everything it owns
pub struct Session<W: World, S: KeyValueStore> {
    pub(super) config: SessionConfig,
    pub(super) world: W,
    pub(super) store: S,
    pub(super) rng: Pcg32,

    pub(super) state: SessionState,
    /// 1 while running, 0 while paused or dead
    pub(super) time_scale: f32,

    pub(super) ledger: EconomyLedger,
    pub(super) pools: EntityPools,
    pub(super) timers: SpawnTimers,
    pub(super) difficulty: DifficultyScaler,
    pub(super) effects: EffectEngine,
    pub(super) modifiers: Modifiers,
    pub(super) score: ScoreKeeper,

    pub(super) player: Option<PlayerState>,
    pub(super) terrain: Option<EntityHandle>,
    pub(super) terrains: TerrainCatalog,
    pub(super) players: PlayerCatalog,
    /// Enemy templates per terrain index
    pub(super) enemy_templates: Vec<Vec<TemplateId>>,

    /// Continue offers made since the counter last reset
    pub(super) continue_offers: u32,
    /// Real seconds until the game-over summary is revealed
    pub(super) reveal_timer: Option<f32>,
    /// Last whole second shown on the power-up countdown
    pub(super) shown_remaining: Option<u32>,
    pub(super) outbox: Vec<Notification>,
}

impl<W: World, S: KeyValueStore> Session<W, S> {
    /// Build a session in the main menu; balances are loaded from `store`
    /// and the default terrain is spawned.
    pub fn new(config: SessionConfig, world: W, store: S) -> Self {
        let ledger = EconomyLedger::load(&store);
        let terrains = TerrainCatalog::new(config.terrains.clone(), config.default_terrain);
        let players = PlayerCatalog::new(config.players.clone(), config.initial_unlock_level);

        let mut enemy_templates = config.enemies_by_terrain.clone();
        if enemy_templates.len() < terrains.len() {
            enemy_templates.resize(terrains.len(), Vec::new());
        }

        let mut session = Self {
            rng: Pcg32::seed_from_u64(config.seed),
            pools: EntityPools::new(
                config.enemy_spawn.capacity,
                config.power_up_spawn.capacity,
                config.coin_spawn.capacity,
                config.gem_spawn.capacity,
            ),
            timers: SpawnTimers::new(&config),
            difficulty: DifficultyScaler::new(config.difficulty),
            world,
            store,
            state: SessionState::MainMenu,
            time_scale: 1.0,
            ledger,
            effects: EffectEngine::new(),
            modifiers: Modifiers::default(),
            score: ScoreKeeper::new(),
            player: None,
            terrain: None,
            terrains,
            players,
            enemy_templates,
            continue_offers: 0,
            reveal_timer: None,
            shown_remaining: None,
            outbox: Vec::new(),
            config,
        };

        for currency in [Currency::Coins, Currency::Gems] {
            let balance = session.ledger.balance(currency);
            session
                .outbox
                .notify(Notification::BalanceChanged { currency, balance });
        }
        session.spawn_terrain();
        session
    }

    // === Accessors ===

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// Host-side access (moving entities, destroying them externally)
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self) -> &EconomyLedger {
        &self.ledger
    }

    pub fn pools(&self) -> &EntityPools {
        &self.pools
    }

    pub fn timers(&self) -> &SpawnTimers {
        &self.timers
    }

    pub fn difficulty(&self) -> &DifficultyScaler {
        &self.difficulty
    }

    pub fn effects(&self) -> &EffectEngine {
        &self.effects
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn stored_score(&self) -> u32 {
        self.score.stored()
    }

    pub fn best_score(&self) -> u32 {
        ScoreKeeper::best(&self.store)
    }

    pub fn player(&self) -> Option<&PlayerState> {
        self.player.as_ref()
    }

    pub fn terrain_handle(&self) -> Option<EntityHandle> {
        self.terrain
    }

    pub fn terrains(&self) -> &TerrainCatalog {
        &self.terrains
    }

    pub fn players(&self) -> &PlayerCatalog {
        &self.players
    }

    pub fn enemy_templates(&self, terrain: usize) -> &[TemplateId] {
        self.enemy_templates
            .get(terrain)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Continue offers made in the current episode
    pub fn continue_offers_made(&self) -> u32 {
        self.continue_offers
    }

    /// Take every pending UI notification
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    // === Lifecycle ===

    pub fn start(&mut self) -> Result<(), SessionError> {
        self.expect_state("start", &[SessionState::MainMenu])?;

        self.reset();
        if self.terrain.is_none_or(|t| !self.world.is_live(t)) {
            self.spawn_terrain();
        }
        self.despawn_player();
        self.spawn_player();

        self.time_scale = 1.0;
        self.set_state(SessionState::Running);
        self.outbox.notify(Notification::Score(0));
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.expect_state("pause", &[SessionState::Running])?;
        self.time_scale = 0.0;
        self.set_state(SessionState::Paused);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.expect_state("resume", &[SessionState::Paused])?;
        self.time_scale = 1.0;
        self.set_state(SessionState::Running);
        Ok(())
    }

    /// Apply damage to the player; a death ends the run
    pub fn player_hit(&mut self, amount: u32, from_enemy: bool) -> Result<DamageOutcome, SessionError> {
        self.expect_state("damage the player", &[SessionState::Running])?;
        let player = self.player.as_mut().ok_or(SessionError::NoPlayer)?;

        let outcome = player.take_damage(amount, from_enemy);
        match outcome {
            DamageOutcome::Died => {
                log::info!("Player died");
                self.trigger_game_over()?;
            }
            DamageOutcome::Damaged { health } => log::debug!("Player hit, health {}", health),
            DamageOutcome::Blocked => log::debug!("Hit absorbed by shield"),
            DamageOutcome::AlreadyDead => {}
        }
        Ok(outcome)
    }

    /// End the run: freeze time, store the score, clear every pool and start
    /// the reveal countdown
    pub fn trigger_game_over(&mut self) -> Result<(), SessionError> {
        self.expect_state("end the run", &[SessionState::Running])?;

        self.time_scale = 0.0;
        let score = self.score.store();
        self.cancel_effect();
        let cleared = self.pools.clear_all(&mut self.world);
        log::info!("Game over at score {} ({} entities cleared)", score, cleared);

        self.reveal_timer = Some(self.config.game_over_reveal_delay.max(0.0));
        self.set_state(SessionState::GameOver);
        Ok(())
    }

    /// Resolve the game-over summary; returns (score, best, continue offered)
    pub(super) fn reveal_game_over(&mut self) -> (u32, u32, bool) {
        self.reveal_timer = None;
        let score = self.score.stored();
        let best = ScoreKeeper::submit_best(score, &mut self.store);

        let offered = self.continue_offers < self.config.continue_offers;
        if offered {
            self.continue_offers += 1;
        } else {
            self.continue_offers = 0;
        }

        self.outbox.notify(Notification::GameOverSummary {
            score,
            best,
            continue_offered: offered,
        });
        if offered {
            self.set_state(SessionState::Continuing);
        }
        (score, best, offered)
    }

    pub fn continue_with_ad(&mut self) -> Result<(), SessionError> {
        self.expect_continue()?;
        self.resume_after_continue();
        Ok(())
    }

    pub fn continue_with_gems(&mut self) -> Result<(), SessionError> {
        self.expect_continue()?;

        let price = self.config.continue_gem_price;
        if !self.ledger.spend_gems(price, &mut self.store, &mut self.outbox) {
            self.outbox
                .notify(Notification::Message("Not enough gems to continue.".into()));
            return Err(SessionError::InsufficientFunds {
                currency: Currency::Gems,
                required: price,
                available: self.ledger.gems(),
            });
        }
        self.resume_after_continue();
        Ok(())
    }

    pub fn back_to_menu(&mut self) -> Result<(), SessionError> {
        self.expect_state(
            "return to the menu",
            &[SessionState::GameOver, SessionState::Continuing],
        )?;
        self.teardown();
        Ok(())
    }

    pub fn give_up(&mut self) -> Result<(), SessionError> {
        self.expect_state("give up", &[SessionState::Running, SessionState::Paused])?;
        self.teardown();
        Ok(())
    }

    /// Return time, score, multipliers, difficulty, effects, timers and pools
    /// to their session-start values. Safe to call repeatedly.
    pub fn reset(&mut self) {
        self.cancel_effect();
        self.modifiers = Modifiers::default();
        self.score.reset();
        self.difficulty.reset();
        self.timers.reset();
        self.pools.clear_all(&mut self.world);
        self.continue_offers = 0;
        self.reveal_timer = None;
        log::debug!("Session reset");
    }

    // === Gameplay events ===

    /// Credit a collected coin; returns the amount added
    pub fn collect_coin(&mut self, coin: EntityHandle) -> Option<u32> {
        let template = self.pools.coins.despawn(coin, &mut self.world)?;
        let amount = if self.modifiers.double_coins {
            template.value.saturating_mul(crate::consts::DOUBLE_COINS_FACTOR)
        } else {
            template.value
        };
        self.ledger.add_coins(amount, &mut self.store, &mut self.outbox);
        Some(amount)
    }

    pub fn collect_gem(&mut self, gem: EntityHandle) -> Option<u32> {
        let template = self.pools.gems.despawn(gem, &mut self.world)?;
        self.ledger
            .add_gems(template.value, &mut self.store, &mut self.outbox);
        Some(template.value)
    }

    /// Consume a power-up pickup and activate its effect
    pub fn collect_power_up(&mut self, pickup: EntityHandle) -> Option<PowerUpKind> {
        let template = self.pools.power_ups.despawn(pickup, &mut self.world)?;
        self.apply_effect(
            template.kind,
            EffectParams::new(template.duration, template.speed_multiplier),
        );
        Some(template.kind)
    }

    /// Host reports an enemy destroyed; false if it was not tracked
    pub fn enemy_destroyed(&mut self, enemy: EntityHandle) -> bool {
        self.pools.enemies.despawn(enemy, &mut self.world).is_some()
    }

    /// Activate an effect directly; returns the kind it preempted
    pub fn activate_power_up(
        &mut self,
        kind: PowerUpKind,
        duration: f32,
        speed_multiplier: f32,
    ) -> Result<Option<PowerUpKind>, SessionError> {
        self.expect_state("activate a power-up", &[SessionState::Running])?;
        Ok(self.apply_effect(kind, EffectParams::new(duration, speed_multiplier)))
    }

    // === Terrain selection ===

    pub fn next_terrain(&mut self) -> Result<usize, SessionError> {
        let result = self.terrains.next();
        self.after_terrain_op(result)
    }

    pub fn previous_terrain(&mut self) -> Result<usize, SessionError> {
        let result = self.terrains.previous();
        self.after_terrain_op(result)
    }

    pub fn browse_terrain(&mut self, index: usize) -> Result<(), SessionError> {
        let result = self.terrains.set_browse(index);
        self.after_terrain_op(result)
    }

    /// Buy the browsed terrain; raises the player unlock level to its index + 1
    pub fn buy_terrain(&mut self) -> Result<usize, SessionError> {
        let result = self
            .terrains
            .buy(&mut self.ledger, &mut self.store, &mut self.outbox);
        if let Ok(index) = result {
            self.players.raise_unlock_level(index as u32 + 1);
        }
        self.after_terrain_op(result)
    }

    /// Select the browsed terrain; outside a run the terrain entity is
    /// respawned right away
    pub fn select_terrain(&mut self) -> Result<bool, SessionError> {
        let result = self.terrains.select();
        if result == Ok(true) && self.state != SessionState::Running {
            self.spawn_terrain();
        }
        self.after_terrain_op(result)
    }

    /// Register an extra enemy template for a terrain
    pub fn add_enemy_template(&mut self, terrain: usize, template: TemplateId) -> Result<(), SessionError> {
        match self.enemy_templates.get_mut(terrain) {
            Some(list) => {
                list.push(template);
                Ok(())
            }
            None => Err(self.rejected(SelectionError::InvalidIndex {
                index: terrain,
                len: self.enemy_templates.len(),
            })),
        }
    }

    // === Player selection ===

    pub fn next_player(&mut self) -> Result<usize, SessionError> {
        let result = self.players.next();
        self.after_player_op(result)
    }

    pub fn previous_player(&mut self) -> Result<usize, SessionError> {
        let result = self.players.previous();
        self.after_player_op(result)
    }

    pub fn browse_player(&mut self, index: usize) -> Result<(), SessionError> {
        let result = self.players.set_browse(index);
        self.after_player_op(result)
    }

    pub fn buy_player(&mut self) -> Result<usize, SessionError> {
        let result = self
            .players
            .buy(&mut self.ledger, &mut self.store, &mut self.outbox);
        self.after_player_op(result)
    }

    /// Select the browsed player for the next run
    pub fn select_player(&mut self) -> Result<usize, SessionError> {
        let result = self.players.select();
        self.after_player_op(result)
    }

    /// Select a player by index directly
    pub fn set_selected_player(&mut self, index: usize) -> Result<(), SessionError> {
        let result = self.players.set_selected(index);
        self.after_player_op(result)
    }

    /// Upgrade the browsed player; returns the next price of that upgrade
    pub fn upgrade_player(&mut self, upgrade: Upgrade) -> Result<u32, SessionError> {
        let result = self
            .players
            .upgrade(upgrade, &mut self.ledger, &mut self.store, &mut self.outbox);
        self.after_player_op(result)
    }

    // === Internals ===

    fn expect_state(&self, action: &'static str, allowed: &[SessionState]) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            log::warn!("Cannot {} while {:?}", action, self.state);
            Err(SessionError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    fn expect_continue(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Continuing => Ok(()),
            SessionState::GameOver => {
                self.outbox
                    .notify(Notification::Message("No continues left.".into()));
                Err(SessionError::ContinueUnavailable)
            }
            _ => self.expect_state("continue", &[SessionState::Continuing]),
        }
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            log::info!("Session {:?} -> {:?}", self.state, state);
            self.state = state;
            self.outbox.notify(Notification::StateChanged(state));
        }
    }

    /// Restore the stored score, revive and relocate the player, resume time
    fn resume_after_continue(&mut self) {
        self.score.restore();
        self.reveal_timer = None;

        if let Some(spawn) = self.random_spawn_point() {
            if let Some(player) = self.player.as_mut() {
                player.reset_health();
                self.world
                    .set_transform(player.handle, spawn.position, spawn.rotation);
            }
        } else if let Some(player) = self.player.as_mut() {
            log::warn!("No spawn points configured; continuing in place");
            player.reset_health();
        }

        self.time_scale = 1.0;
        self.set_state(SessionState::Running);
        self.outbox.notify(Notification::Score(self.score.score()));
    }

    fn teardown(&mut self) {
        self.reset();
        self.despawn_player();
        self.time_scale = 1.0;
        self.set_state(SessionState::MainMenu);
    }

    fn random_spawn_point(&mut self) -> Option<crate::platform::Transform> {
        if self.config.spawn_points.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..self.config.spawn_points.len());
        Some(self.config.spawn_points[index])
    }

    fn spawn_player(&mut self) {
        let Some(spawn) = self.random_spawn_point() else {
            log::warn!("No spawn points configured; starting without a player");
            return;
        };
        let Some(entry) = self.players.selected() else {
            log::warn!("No player selected; starting without a player");
            return;
        };

        let template = entry.template;
        let profile = entry.profile.clone();
        let handle = self.world.spawn(template, spawn.position, spawn.rotation);
        self.player = Some(PlayerState::new(handle, &profile));

        for enemy in self.pools.enemies.handles() {
            if self.world.is_live(enemy) {
                self.world.set_enemy_target(enemy, handle);
            }
        }
        log::info!("Player spawned at {:?}", spawn.position);
    }

    fn despawn_player(&mut self) {
        if let Some(player) = self.player.take() {
            if self.world.is_live(player.handle) {
                self.world.despawn(player.handle);
            }
        }
    }

    fn spawn_terrain(&mut self) {
        let Some(entry) = self.terrains.selected() else {
            log::warn!("No terrain selected; nothing to spawn");
            return;
        };
        let template = entry.template;
        if let Some(old) = self.terrain.take() {
            if self.world.is_live(old) {
                self.world.despawn(old);
            }
        }
        let at = self.config.terrain_spawn_point;
        self.terrain = Some(self.world.spawn(template, at.position, at.rotation));
    }

    fn apply_effect(&mut self, kind: PowerUpKind, params: EffectParams) -> Option<PowerUpKind> {
        let mut host = EffectHost::new(
            &mut self.world,
            &mut self.player,
            &self.pools.enemies,
            &mut self.modifiers,
        );
        let preempted = self.effects.activate(kind, params, &mut host);

        self.shown_remaining = self.effects.remaining().map(|r| r.ceil() as u32);
        if let Some(active) = self.effects.active() {
            self.outbox.notify(Notification::PowerUpRemaining {
                kind: active.kind,
                remaining: active.remaining,
            });
        }
        preempted
    }

    /// Reverse any active effect and clear its indicator
    fn cancel_effect(&mut self) {
        let mut host = EffectHost::new(
            &mut self.world,
            &mut self.player,
            &self.pools.enemies,
            &mut self.modifiers,
        );
        if self.effects.cancel(&mut host).is_some() {
            self.outbox.notify(Notification::PowerUpCleared);
        }
        self.shown_remaining = None;
    }

    fn rejected(&mut self, err: SelectionError) -> SessionError {
        log::warn!("Selection rejected: {}", err);
        let message = match &err {
            SelectionError::InsufficientFunds { currency, .. } => {
                Some(format!("Not enough {} to buy this.", currency))
            }
            SelectionError::LevelTooLow { .. } => Some("Unlock the terrain to buy this player.".into()),
            SelectionError::Locked(_) => Some("This item is locked.".into()),
            SelectionError::UpgradeMaxed(upgrade) => Some(format!("{} is fully upgraded.", upgrade)),
            _ => None,
        };
        if let Some(message) = message {
            self.outbox.notify(Notification::Message(message));
        }
        SessionError::Selection(err)
    }

    fn after_terrain_op<T>(&mut self, result: Result<T, SelectionError>) -> Result<T, SessionError> {
        let result = result.map_err(|e| self.rejected(e));
        if let Some(view) = self.terrains.view(&self.ledger) {
            self.outbox.notify(view);
        }
        result
    }

    fn after_player_op<T>(&mut self, result: Result<T, SelectionError>) -> Result<T, SessionError> {
        let result = result.map_err(|e| self.rejected(e));
        if let Some(view) = self.players.view(&self.ledger) {
            self.outbox.notify(view);
        }
        result
    }
}
