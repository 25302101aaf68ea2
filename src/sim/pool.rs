//! Per-category bookkeeping of live spawned entities
//!
//! A pool owns the handles it holds: removing one through [`EntityPool::despawn`]
//! or [`EntityPool::clear`] also destroys the entity in the world. Handles the
//! host already destroyed are skipped rather than despawned twice.

use serde::{Deserialize, Serialize};

use super::effects::PowerUpKind;
use crate::platform::{EntityHandle, TemplateId, World};

/// Spawnable entity category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnCategory {
    Enemy,
    PowerUp,
    Coin,
    Gem,
}

impl SpawnCategory {
    /// Evaluation order of the spawn timers within one tick
    pub const ALL: [SpawnCategory; 4] = [
        SpawnCategory::Enemy,
        SpawnCategory::PowerUp,
        SpawnCategory::Coin,
        SpawnCategory::Gem,
    ];
}

/// Power-up pickup blueprint: what the pickup does once collected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpTemplate {
    pub template: TemplateId,
    pub kind: PowerUpKind,
    /// Effect length in seconds
    pub duration: f32,
    /// Used by SpeedBoost only
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f32,
}

fn default_speed_multiplier() -> f32 {
    1.5
}

/// Coin/gem blueprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectibleTemplate {
    pub template: TemplateId,
    #[serde(default = "default_value")]
    pub value: u32,
}

fn default_value() -> u32 {
    1
}

/// Anything the spawner can instantiate
pub trait Spawnable: Clone {
    fn template_id(&self) -> TemplateId;
}

impl Spawnable for TemplateId {
    fn template_id(&self) -> TemplateId {
        *self
    }
}

impl Spawnable for PowerUpTemplate {
    fn template_id(&self) -> TemplateId {
        self.template
    }
}

impl Spawnable for CollectibleTemplate {
    fn template_id(&self) -> TemplateId {
        self.template
    }
}

/// Ordered live handles for one category, each with the blueprint it came from
#[derive(Debug, Clone)]
pub struct EntityPool<T> {
    entries: Vec<(EntityHandle, T)>,
    capacity: Option<usize>,
}

impl<T> Default for EntityPool<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> EntityPool<T> {
    pub fn unbounded() -> Self {
        Self {
            entries: Vec::new(),
            capacity: None,
        }
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|cap| self.entries.len() >= cap)
    }

    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.entries.iter().any(|(h, _)| *h == handle)
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&T> {
        self.entries
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, t)| t)
    }

    pub fn handles(&self) -> impl Iterator<Item = EntityHandle> + '_ {
        self.entries.iter().map(|(h, _)| *h)
    }

    /// Register a freshly spawned handle; refuses duplicates and a full pool
    pub fn insert(&mut self, handle: EntityHandle, item: T) -> bool {
        if self.is_full() || self.contains(handle) {
            return false;
        }
        self.entries.push((handle, item));
        true
    }

    /// Forget a handle without touching the world (idempotent)
    pub fn remove(&mut self, handle: EntityHandle) -> Option<T> {
        let index = self.entries.iter().position(|(h, _)| *h == handle)?;
        Some(self.entries.remove(index).1)
    }

    /// Remove and destroy a handle (idempotent)
    pub fn despawn<W: World + ?Sized>(&mut self, handle: EntityHandle, world: &mut W) -> Option<T> {
        let item = self.remove(handle)?;
        if world.is_live(handle) {
            world.despawn(handle);
        }
        Some(item)
    }

    /// Destroy every live handle, then empty the pool; returns how many were held
    pub fn clear<W: World + ?Sized>(&mut self, world: &mut W) -> usize {
        let count = self.entries.len();
        for (handle, _) in self.entries.drain(..) {
            if world.is_live(handle) {
                world.despawn(handle);
            }
        }
        count
    }

    /// Drop handles the host destroyed on its own
    pub fn retain_live<W: World + ?Sized>(&mut self, world: &W) {
        self.entries.retain(|(h, _)| world.is_live(*h));
    }
}

/// All spawn pools of a session
#[derive(Debug, Clone, Default)]
pub struct EntityPools {
    pub enemies: EntityPool<TemplateId>,
    pub power_ups: EntityPool<PowerUpTemplate>,
    pub coins: EntityPool<CollectibleTemplate>,
    pub gems: EntityPool<CollectibleTemplate>,
}

impl EntityPools {
    pub fn new(
        enemy_cap: Option<usize>,
        power_up_cap: Option<usize>,
        coin_cap: Option<usize>,
        gem_cap: Option<usize>,
    ) -> Self {
        Self {
            enemies: EntityPool::with_capacity(enemy_cap),
            power_ups: EntityPool::with_capacity(power_up_cap),
            coins: EntityPool::with_capacity(coin_cap),
            gems: EntityPool::with_capacity(gem_cap),
        }
    }

    pub fn count(&self, category: SpawnCategory) -> usize {
        match category {
            SpawnCategory::Enemy => self.enemies.len(),
            SpawnCategory::PowerUp => self.power_ups.len(),
            SpawnCategory::Coin => self.coins.len(),
            SpawnCategory::Gem => self.gems.len(),
        }
    }

    pub fn total(&self) -> usize {
        SpawnCategory::ALL.iter().map(|c| self.count(*c)).sum()
    }

    pub fn clear_all<W: World + ?Sized>(&mut self, world: &mut W) -> usize {
        self.enemies.clear(world)
            + self.power_ups.clear(world)
            + self.coins.clear(world)
            + self.gems.clear(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::SandboxWorld;
    use glam::{Quat, Vec3};

    fn spawn(world: &mut SandboxWorld) -> EntityHandle {
        world.spawn(TemplateId(9), Vec3::ZERO, Quat::IDENTITY)
    }

    #[test]
    fn test_insert_refuses_duplicates_and_full() {
        let mut world = SandboxWorld::new();
        let mut pool = EntityPool::with_capacity(Some(2));
        let a = spawn(&mut world);
        let b = spawn(&mut world);
        let c = spawn(&mut world);

        assert!(pool.insert(a, ()));
        assert!(!pool.insert(a, ()));
        assert!(pool.insert(b, ()));
        assert!(pool.is_full());
        assert!(!pool.insert(c, ()));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_despawn_is_idempotent() {
        let mut world = SandboxWorld::new();
        let mut pool = EntityPool::unbounded();
        let a = spawn(&mut world);
        pool.insert(a, 5u32);

        assert_eq!(pool.despawn(a, &mut world), Some(5));
        assert_eq!(pool.despawn(a, &mut world), None);
        assert!(!world.is_live(a));
        assert_eq!(world.despawn_count(), 1);
        assert_eq!(world.stale_despawns(), 0);
    }

    #[test]
    fn test_clear_skips_already_destroyed() {
        let mut world = SandboxWorld::new();
        let mut pool = EntityPool::unbounded();
        let a = spawn(&mut world);
        let b = spawn(&mut world);
        pool.insert(a, ());
        pool.insert(b, ());

        world.destroy_externally(a);
        assert_eq!(pool.clear(&mut world), 2);
        assert!(pool.is_empty());
        assert_eq!(world.live_count(), 0);
        assert_eq!(world.stale_despawns(), 0);
    }

    #[test]
    fn test_retain_live_prunes() {
        let mut world = SandboxWorld::new();
        let mut pool = EntityPool::unbounded();
        let a = spawn(&mut world);
        let b = spawn(&mut world);
        pool.insert(a, ());
        pool.insert(b, ());

        world.destroy_externally(b);
        pool.retain_live(&world);
        assert_eq!(pool.handles().collect::<Vec<_>>(), vec![a]);
    }
}
