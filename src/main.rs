//! Dash Survival headless runner
//!
//! Plays a scripted session against the sandbox world and logs what happened.
//!
//! Usage: `dash-survival [config.json] [save.json]`
//! Without a config the built-in demo setup is used; without a save path
//! balances live in memory only.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use dash_survival::SessionConfig;
    use dash_survival::persistence::{JsonFileStore, KeyValueStore, MemoryStore};
    use dash_survival::platform::{SandboxWorld, World};
    use dash_survival::sim::{Notification, Session, SessionState, TickEvent, Upgrade};

    /// Simulated frame time
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Seconds of play per life before the scripted death
    const LIFE_SECONDS: u32 = 40;

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let config = match args.next() {
            Some(path) => match SessionConfig::load(&path) {
                Ok(config) => config,
                Err(e) => {
                    log::error!("{}; falling back to the demo setup", e);
                    SessionConfig::demo()
                }
            },
            None => SessionConfig::demo(),
        };

        match args.next() {
            Some(save) => play(config, JsonFileStore::open(save)),
            None => play(config, MemoryStore::new()),
        }
    }

    fn play<S: KeyValueStore>(config: SessionConfig, store: S) {
        let mut world = SandboxWorld::new();
        world.add_obstacle(glam::Vec3::new(4.0, 0.0, 4.0), 2.0);
        world.add_obstacle(glam::Vec3::new(-6.0, 0.0, 1.0), 1.5);

        let mut session = Session::new(config, world, store);
        if let Err(e) = session.start() {
            log::error!("Could not start: {}", e);
            return;
        }

        let mut lives = 0;
        loop {
            lives += 1;
            live_one(&mut session);

            if session.state() == SessionState::Running {
                if let Err(e) = session.player_hit(u32::MAX, false) {
                    log::error!("Scripted death failed: {}", e);
                    break;
                }
            }
            // Reveal runs on real time; give it a few seconds of frames
            for _ in 0..600 {
                if reveal_done(&session.tick(FRAME_DT)) {
                    break;
                }
            }

            if session.state() == SessionState::Continuing {
                let resumed = session.continue_with_gems().or_else(|_| session.continue_with_ad());
                if resumed.is_ok() {
                    log::info!("Continue #{} taken", lives);
                    continue;
                }
            }
            break;
        }

        if let Err(e) = session.back_to_menu() {
            log::warn!("{}", e);
        }

        // Spend some of the haul in the shop
        for upgrade in [Upgrade::Speed, Upgrade::Rotation, Upgrade::Health] {
            match session.upgrade_player(upgrade) {
                Ok(next) => log::info!("Bought {} upgrade, next costs {}", upgrade, next),
                Err(e) => log::info!("Skipped {} upgrade: {}", upgrade, e),
            }
        }

        for note in session.drain_notifications() {
            if let Notification::Message(text) = note {
                log::info!("UI message: {}", text);
            }
        }
        log::info!(
            "Finished after {} lives: best score {}, {} coins, {} gems",
            lives,
            session.best_score(),
            session.ledger().coins(),
            session.ledger().gems()
        );
    }

    /// Play one life, picking up everything that spawns
    fn live_one<W: World, S: KeyValueStore>(session: &mut Session<W, S>) {
        let frames = LIFE_SECONDS * 60;
        for frame in 0..frames {
            for event in session.tick(FRAME_DT) {
                match event {
                    TickEvent::DifficultyRaised { speed } => log::info!("Enemies now move at {:.1}", speed),
                    TickEvent::EffectExpired { kind } => log::debug!("{} wore off", kind),
                    _ => {}
                }
            }

            // Sweep pickups once a second
            if frame % 60 == 0 {
                let coins: Vec<_> = session.pools().coins.handles().collect();
                for coin in coins {
                    session.collect_coin(coin);
                }
                let gems: Vec<_> = session.pools().gems.handles().collect();
                for gem in gems {
                    session.collect_gem(gem);
                }
                let pickup = session.pools().power_ups.handles().next();
                if let Some(kind) = pickup.and_then(|p| session.collect_power_up(p)) {
                    log::info!("Picked up {}", kind);
                }
                let enemy = session.pools().enemies.handles().next();
                if let Some(enemy) = enemy {
                    if let Err(e) = session.player_hit(1, true) {
                        log::warn!("Enemy hit ignored: {}", e);
                    }
                    session.enemy_destroyed(enemy);
                }
            }

            if session.state() != SessionState::Running {
                return;
            }
        }
    }

    fn reveal_done(events: &[TickEvent]) -> bool {
        events.iter().any(|e| {
            if let TickEvent::GameOverRevealed {
                score,
                best,
                continue_offered,
            } = e
            {
                log::info!(
                    "Game over: score {} (best {}), continue offered: {}",
                    score,
                    best,
                    continue_offered
                );
                true
            } else {
                false
            }
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Dash Survival (headless) starting...");
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host engine on wasm; nothing to run here
}
