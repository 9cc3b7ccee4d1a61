//! Rocks: the asteroids hazard

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sim::{Body, Collidable, EntityKind, fragment_layout, jagged_outline};
use crate::tuning::AsteroidsTuning;
use crate::{direction_or, from_angle, random_edge_position, random_range};

/// Outline vertex count
const OUTLINE_VERTICES: usize = 12;
/// Outline radius variance (±15 %)
const OUTLINE_VARIANCE: f64 = 0.15;

/// Rock size classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    Large,
    Medium,
    Small,
}

impl SizeClass {
    pub fn radius(self) -> f64 {
        match self {
            SizeClass::Large => 40.0,
            SizeClass::Medium => 20.0,
            SizeClass::Small => 10.0,
        }
    }

    /// Class of the fragments this class splits into
    pub fn smaller(self) -> Option<SizeClass> {
        match self {
            SizeClass::Large => Some(SizeClass::Medium),
            SizeClass::Medium => Some(SizeClass::Small),
            SizeClass::Small => None,
        }
    }

    /// Points for shooting a rock of this class
    pub fn points(self) -> u64 {
        match self {
            SizeClass::Large => 15,
            SizeClass::Medium => 10,
            SizeClass::Small => 5,
        }
    }

    /// Points for a rock broken on the hero's shield
    pub fn shield_points(self) -> u64 {
        match self {
            SizeClass::Small => 2,
            _ => 1,
        }
    }
}

/// A drifting, spinning rock
#[derive(Debug, Clone, PartialEq)]
pub struct Rock {
    pub id: u32,
    pub body: Body,
    pub size: SizeClass,
    /// Local-space outline (unrotated)
    pub outline: Vec<DVec2>,
}

impl Rock {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, id: u32, pos: DVec2, vel: DVec2, size: SizeClass) -> Self {
        let radius = size.radius();
        let mut body = Body::new(pos, radius).with_velocity(vel);
        body.rotation_vel = random_range(rng, -1.0, 1.0);
        Self {
            id,
            body,
            size,
            outline: jagged_outline(rng, radius, OUTLINE_VERTICES, OUTLINE_VARIANCE),
        }
    }

    /// Large rock entering from a random edge, heading roughly for the centre
    pub fn spawn_at_edge<R: Rng + ?Sized>(rng: &mut R, id: u32, tuning: &AsteroidsTuning) -> Self {
        let pos = random_edge_position(rng, tuning.width, tuning.height);
        let spread = tuning.rock_aim_spread;
        let aim = DVec2::new(
            tuning.width * 0.5 + random_range(rng, -spread, spread),
            tuning.height * 0.5 + random_range(rng, -spread, spread),
        );
        let heading = direction_or(pos, aim, DVec2::X);
        let jitter = tuning.rock_aim_jitter_degrees.to_radians();
        let angle = heading.to_angle() + random_range(rng, -jitter, jitter);
        Self::new(rng, id, pos, from_angle(angle) * tuning.rock_speed, SizeClass::Large)
    }

    /// Deactivate and return the fragments (none for small rocks).
    ///
    /// `next_id` allocates ids for the children.
    pub fn split<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        base_speed: f64,
        mut next_id: impl FnMut() -> u32,
    ) -> Vec<Rock> {
        if !self.body.active {
            return Vec::new();
        }
        self.body.destroy();
        let Some(child_size) = self.size.smaller() else {
            return Vec::new();
        };
        fragment_layout(self.body.pos, self.body.radius, base_speed)
            .into_iter()
            .map(|(pos, vel)| Rock::new(rng, next_id(), pos, vel, child_size))
            .collect()
    }
}

impl Collidable for Rock {
    fn id(&self) -> u32 {
        self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Rock
    }

    fn body(&self) -> &Body {
        &self.body
    }
}
