//! Headless host used by the native binary and tests
//!
//! Keeps an entity table and a list of spherical obstacles. No movement or
//! collision resolution: the host only answers occupancy queries and records
//! what the session pushed into each entity.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use super::{EntityHandle, Layer, TemplateId, World};

/// A live entity as the sandbox sees it
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxEntity {
    pub template: TemplateId,
    pub position: Vec3,
    pub rotation: Quat,
    /// Last speed pushed by the session (enemies only)
    pub speed: Option<f32>,
    pub frozen: bool,
    pub target: Option<EntityHandle>,
}

/// Static obstacle sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub center: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone, Default)]
pub struct SandboxWorld {
    entities: BTreeMap<EntityHandle, SandboxEntity>,
    obstacles: Vec<Obstacle>,
    /// Treat every point as occupied (crowded-field testing)
    fully_occupied: bool,
    next_id: u64,
    spawned: u64,
    despawned: u64,
    stale_despawns: u64,
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    pub fn add_obstacle(&mut self, center: Vec3, radius: f32) {
        self.obstacles.push(Obstacle { center, radius });
    }

    pub fn set_fully_occupied(&mut self, occupied: bool) {
        self.fully_occupied = occupied;
    }

    pub fn entity(&self, handle: EntityHandle) -> Option<&SandboxEntity> {
        self.entities.get(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.entities.len()
    }

    /// Live entities instantiated from `template`
    pub fn count_template(&self, template: TemplateId) -> usize {
        self.entities
            .values()
            .filter(|e| e.template == template)
            .count()
    }

    /// Total spawns over the sandbox lifetime
    pub fn spawn_count(&self) -> u64 {
        self.spawned
    }

    pub fn despawn_count(&self) -> u64 {
        self.despawned
    }

    /// Despawn calls for handles that were no longer live
    pub fn stale_despawns(&self) -> u64 {
        self.stale_despawns
    }

    /// Destroy an entity behind the session's back (e.g. an enemy dying on an obstacle)
    pub fn destroy_externally(&mut self, handle: EntityHandle) {
        self.entities.remove(&handle);
    }
}

impl World for SandboxWorld {
    fn spawn(&mut self, template: TemplateId, position: Vec3, rotation: Quat) -> EntityHandle {
        let handle = EntityHandle(self.next_id.max(1));
        self.next_id = handle.0 + 1;
        self.spawned += 1;
        self.entities.insert(
            handle,
            SandboxEntity {
                template,
                position,
                rotation,
                speed: None,
                frozen: false,
                target: None,
            },
        );
        handle
    }

    fn despawn(&mut self, handle: EntityHandle) {
        if self.entities.remove(&handle).is_some() {
            self.despawned += 1;
        } else {
            self.stale_despawns += 1;
            log::warn!("Despawn of unknown entity {:?}", handle);
        }
    }

    fn is_live(&self, handle: EntityHandle) -> bool {
        self.entities.contains_key(&handle)
    }

    fn position(&self, handle: EntityHandle) -> Option<Vec3> {
        self.entities.get(&handle).map(|e| e.position)
    }

    fn set_transform(&mut self, handle: EntityHandle, position: Vec3, rotation: Quat) {
        if let Some(entity) = self.entities.get_mut(&handle) {
            entity.position = position;
            entity.rotation = rotation;
        }
    }

    fn is_occupied(&self, position: Vec3, radius: f32, layer: Layer) -> bool {
        if self.fully_occupied {
            return true;
        }
        match layer {
            Layer::Obstacle => self
                .obstacles
                .iter()
                .any(|o| o.center.distance(position) < o.radius + radius),
        }
    }

    fn set_enemy_speed(&mut self, enemy: EntityHandle, speed: f32) {
        if let Some(entity) = self.entities.get_mut(&enemy) {
            entity.speed = Some(speed);
        }
    }

    fn set_enemy_target(&mut self, enemy: EntityHandle, player: EntityHandle) {
        if let Some(entity) = self.entities.get_mut(&enemy) {
            entity.target = Some(player);
        }
    }

    fn set_enemy_frozen(&mut self, enemy: EntityHandle, frozen: bool) {
        if let Some(entity) = self.entities.get_mut(&enemy) {
            entity.frozen = frozen;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_despawn_bookkeeping() {
        let mut world = SandboxWorld::new();
        let a = world.spawn(TemplateId(1), Vec3::ZERO, Quat::IDENTITY);
        let b = world.spawn(TemplateId(1), Vec3::X, Quat::IDENTITY);
        assert_ne!(a, b);
        assert_eq!(world.live_count(), 2);

        world.despawn(a);
        world.despawn(a);
        assert!(!world.is_live(a));
        assert_eq!(world.despawn_count(), 1);
        assert_eq!(world.stale_despawns(), 1);
    }

    #[test]
    fn test_obstacle_occupancy() {
        let mut world = SandboxWorld::new();
        world.add_obstacle(Vec3::new(5.0, 0.0, 0.0), 1.0);

        assert!(world.is_occupied(Vec3::new(5.5, 0.0, 0.0), 1.0, Layer::Obstacle));
        assert!(!world.is_occupied(Vec3::new(0.0, 0.0, 0.0), 1.0, Layer::Obstacle));
    }
}
