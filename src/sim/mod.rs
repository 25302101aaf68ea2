//! Deterministic session simulation
//!
//! All gameplay logic lives here. Given the same config seed, the same host
//! answers and the same sequence of calls, a session plays out identically:
//! - Scaled-time counters only (no wall clock)
//! - Seeded RNG only
//! - Stable iteration order (pool insertion order)
//! - No engine dependencies beyond the `World` trait

pub mod catalog;
pub mod difficulty;
pub mod economy;
pub mod effects;
pub mod pool;
pub mod session;
pub mod spawner;
pub mod state;
pub mod tick;

pub use catalog::{PlayerCatalog, PlayerEntry, PlayerProfile, Price, TerrainCatalog, TerrainEntry, Upgrade};
pub use difficulty::{DifficultyConfig, DifficultyScaler};
pub use economy::{Currency, EconomyLedger};
pub use effects::{ActiveEffect, EffectEngine, EffectParams, EffectTarget, PowerUpKind};
pub use pool::{CollectibleTemplate, EntityPool, EntityPools, PowerUpTemplate, SpawnCategory, Spawnable};
pub use session::{Session, SpawnTimers};
pub use spawner::{SpawnConstraint, SpawnOutcome, SpawnRules, SpawnTimer, find_spawn_point, spawn_constrained};
pub use state::{
    DamageOutcome, Modifiers, Notification, Notifier, PlayerState, SessionState, TickEvent,
};
