//! Base moving body shared by every entity in both games
//!
//! Entity kinds are plain data (`EntityKind`); systems dispatch through the
//! `Collidable` capability instead of inspecting concrete types.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What an entity is, carried as data
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Hero,
    Rock,
    Bullet,
    ShieldPickup,
    WeaponPickup,
    Meteor,
    Blast,
    Pickup,
}

/// Stable handle used by the broad phase (kind + monotonically allocated id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: u32,
}

impl EntityRef {
    pub const fn new(kind: EntityKind, id: u32) -> Self {
        Self { kind, id }
    }
}

/// A moving circle with rotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: DVec2,
    pub vel: DVec2,
    /// Heading (radians)
    pub rotation: f64,
    /// Spin (radians/sec)
    pub rotation_vel: f64,
    pub radius: f64,
    pub active: bool,
}

impl Body {
    pub fn new(pos: DVec2, radius: f64) -> Self {
        Self {
            pos,
            vel: DVec2::ZERO,
            rotation: 0.0,
            rotation_vel: 0.0,
            radius,
            active: true,
        }
    }

    pub fn with_velocity(mut self, vel: DVec2) -> Self {
        self.vel = vel;
        self
    }

    /// Integrate one step and wrap around the playfield edges.
    ///
    /// A coordinate leaving `[-radius, bound + radius]` teleports to the
    /// opposite side in the same call. Inactive bodies do not move.
    pub fn update(&mut self, dt: f64, width: f64, height: f64) {
        if !self.active {
            return;
        }
        self.pos += self.vel * dt;
        self.rotation += self.rotation_vel * dt;
        self.pos.x = wrap_axis(self.pos.x, self.radius, width);
        self.pos.y = wrap_axis(self.pos.y, self.radius, height);
    }

    /// Strict circle overlap; tangent circles do not collide
    #[inline]
    pub fn collides_with(&self, other: &Body) -> bool {
        super::collision::circles_overlap(self.pos, self.radius, other.pos, other.radius)
    }

    /// Deactivate; calling again is a no-op
    #[inline]
    pub fn destroy(&mut self) {
        self.active = false;
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.vel.length()
    }
}

fn wrap_axis(value: f64, radius: f64, bound: f64) -> f64 {
    if value < -radius {
        bound + radius
    } else if value > bound + radius {
        -radius
    } else {
        value
    }
}

/// Irregular closed outline in local space.
///
/// Vertex `i` sits at angle `2π·i/n` with its radius scaled by a random
/// factor in `1 ± variance`.
pub fn jagged_outline<R: Rng + ?Sized>(rng: &mut R, radius: f64, vertices: usize, variance: f64) -> Vec<DVec2> {
    (0..vertices)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / vertices as f64;
            let scale = 1.0 + crate::random_range(rng, -variance, variance);
            crate::from_angle(angle) * (radius * scale)
        })
        .collect()
}

/// Capability: anything that takes part in broad/narrow phase collision
pub trait Collidable {
    fn id(&self) -> u32;
    fn kind(&self) -> EntityKind;
    fn body(&self) -> &Body;

    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.kind(), self.id())
    }

    fn is_active(&self) -> bool {
        self.body().active
    }
}
