//! Constrained spawning around a moving origin
//!
//! Candidates are drawn uniformly from a sphere around the origin, pinned to the
//! category's spawn height, and rejected while they are too close to the origin
//! or overlap an obstacle. The first accepted candidate wins. A crowded field
//! that exhausts the attempt budget just drops the spawn for this tick.

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::pool::{EntityPool, Spawnable};
use crate::consts::*;
use crate::platform::{EntityHandle, Layer, World};
use crate::random_point_in_sphere;

/// Per-category spawn tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRules {
    /// Seconds between spawn attempts
    pub interval: f32,
    pub radius: f32,
    pub min_distance: f32,
    /// Fixed vertical coordinate of spawned entities
    pub height: f32,
    /// Pool ceiling (None = unbounded)
    #[serde(default)]
    pub capacity: Option<usize>,
    #[serde(default = "default_probe_radius")]
    pub occupancy_radius: f32,
}

fn default_probe_radius() -> f32 {
    OCCUPANCY_PROBE_RADIUS
}

impl SpawnRules {
    pub fn enemies() -> Self {
        Self {
            interval: 5.0,
            radius: 10.0,
            min_distance: 2.0,
            height: GROUND_SPAWN_HEIGHT,
            capacity: None,
            occupancy_radius: OCCUPANCY_PROBE_RADIUS,
        }
    }

    pub fn power_ups() -> Self {
        Self {
            interval: 10.0,
            ..Self::enemies()
        }
    }

    pub fn coins() -> Self {
        Self {
            interval: 3.0,
            height: PICKUP_SPAWN_HEIGHT,
            capacity: Some(20),
            ..Self::enemies()
        }
    }

    pub fn gems() -> Self {
        Self {
            interval: 5.0,
            height: PICKUP_SPAWN_HEIGHT,
            capacity: Some(10),
            ..Self::enemies()
        }
    }

    /// Constraint for one spawn call around `origin`
    pub fn constraint(&self, origin: Vec3, max_attempts: u32) -> SpawnConstraint {
        SpawnConstraint {
            origin,
            radius: self.radius,
            min_distance: self.min_distance,
            height: self.height,
            max_attempts,
        }
    }
}

/// Rejection-sampling parameters for a single spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnConstraint {
    pub origin: Vec3,
    pub radius: f32,
    pub min_distance: f32,
    pub height: f32,
    pub max_attempts: u32,
}

impl SpawnConstraint {
    /// Candidate at `offset` from the origin, pinned to the spawn height
    pub fn candidate(&self, offset: Vec3) -> Vec3 {
        let mut pos = self.origin + offset;
        pos.y = self.height;
        pos
    }

    pub fn far_enough(&self, candidate: Vec3) -> bool {
        candidate.distance(self.origin) >= self.min_distance
    }
}

/// Why a spawn call did or did not produce an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnOutcome {
    Spawned { handle: EntityHandle, position: Vec3 },
    AtCapacity,
    NoTemplates,
    /// No origin to spawn around (no live player)
    NoOrigin,
    /// Attempt budget exhausted without a free point
    Exhausted,
}

impl SpawnOutcome {
    pub fn handle(&self) -> Option<EntityHandle> {
        match self {
            SpawnOutcome::Spawned { handle, .. } => Some(*handle),
            _ => None,
        }
    }
}

/// First candidate that is far enough from the origin and unoccupied
pub fn find_spawn_point<R, F>(rng: &mut R, constraint: &SpawnConstraint, is_occupied: F) -> Option<Vec3>
where
    R: Rng + ?Sized,
    F: Fn(Vec3) -> bool,
{
    for _ in 0..constraint.max_attempts {
        let candidate = constraint.candidate(random_point_in_sphere(rng, constraint.radius));
        if constraint.far_enough(candidate) && !is_occupied(candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Sample a point, instantiate a random template there and register it in `pool`
pub fn spawn_constrained<T, W, R>(
    rng: &mut R,
    world: &mut W,
    pool: &mut EntityPool<T>,
    templates: &[T],
    constraint: &SpawnConstraint,
    occupancy_radius: f32,
) -> SpawnOutcome
where
    T: Spawnable,
    W: World + ?Sized,
    R: Rng + ?Sized,
{
    if pool.is_full() {
        return SpawnOutcome::AtCapacity;
    }
    if templates.is_empty() {
        return SpawnOutcome::NoTemplates;
    }

    let found = {
        let world: &W = world;
        find_spawn_point(rng, constraint, |p| {
            world.is_occupied(p, occupancy_radius, Layer::Obstacle)
        })
    };
    let Some(position) = found else {
        return SpawnOutcome::Exhausted;
    };

    let item = templates[rng.random_range(0..templates.len())].clone();
    let handle = world.spawn(item.template_id(), position, Quat::IDENTITY);
    if !pool.insert(handle, item) {
        // Host reused a live handle; keep the pool consistent
        log::warn!("Pool rejected fresh handle {:?}, despawning", handle);
        world.despawn(handle);
        return SpawnOutcome::Exhausted;
    }
    SpawnOutcome::Spawned { handle, position }
}

/// Periodic trigger advanced by scaled session time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnTimer {
    interval: f32,
    accumulator: f32,
}

impl SpawnTimer {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            accumulator: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulator
    }

    /// Advance by `dt`; returns how many intervals elapsed, at most
    /// `MAX_TIMER_CATCH_UP`. Intervals beyond the cap are dropped.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if self.interval <= 0.0 || !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        let total = f64::from(self.accumulator) + f64::from(dt);
        let interval = f64::from(self.interval);
        let elapsed = (total / interval).floor();
        let remainder = total.rem_euclid(interval) as f32;
        // Narrowing to f32 can round the remainder up to a full interval
        self.accumulator = if remainder < self.interval { remainder } else { 0.0 };
        if elapsed > f64::from(MAX_TIMER_CATCH_UP) {
            log::debug!("Spawn timer dropped {} intervals", elapsed - f64::from(MAX_TIMER_CATCH_UP));
            MAX_TIMER_CATCH_UP
        } else {
            elapsed as u32
        }
    }
}
