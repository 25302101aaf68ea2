//! Platform abstraction layer
//!
//! The session never touches an engine directly. Everything it needs from the
//! host goes through [`World`]:
//! - Entity instantiation and teardown from templates
//! - Spatial occupancy queries (backed by the host's physics)
//! - Pushing speed/target/freeze state into live enemies

pub mod sandbox;

pub use sandbox::SandboxWorld;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Opaque reference to a live spawned entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u64);

/// Host blueprint used to instantiate an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(pub u32);

/// Collision category filter for occupancy queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    Obstacle,
}

/// Position + rotation (spawn points)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// Host collaborator for everything spatial or engine-owned
pub trait World {
    /// Instantiate `template` and return its handle
    fn spawn(&mut self, template: TemplateId, position: Vec3, rotation: Quat) -> EntityHandle;
    /// Destroy a live entity
    fn despawn(&mut self, handle: EntityHandle);
    /// Whether `handle` still refers to a live entity
    fn is_live(&self, handle: EntityHandle) -> bool;
    fn position(&self, handle: EntityHandle) -> Option<Vec3>;
    fn set_transform(&mut self, handle: EntityHandle, position: Vec3, rotation: Quat);
    /// True if anything on `layer` overlaps the sphere at `position`
    fn is_occupied(&self, position: Vec3, radius: f32, layer: Layer) -> bool;

    fn set_enemy_speed(&mut self, enemy: EntityHandle, speed: f32);
    fn set_enemy_target(&mut self, enemy: EntityHandle, player: EntityHandle);
    fn set_enemy_frozen(&mut self, enemy: EntityHandle, frozen: bool);
}
