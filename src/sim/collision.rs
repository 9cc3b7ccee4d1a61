//! Narrow phase collision tests and impulse response
//!
//! Circle-circle bounces use a single impulse along the centre line, with
//! per-game constants in `CollisionTuning` so the two games can differ.

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::entity::Body;

/// Number of fragments a splitting hazard produces
pub const FRAGMENT_COUNT: usize = 3;
/// Outward speed multiplier applied to fragments
pub const FRAGMENT_SPEED_FACTOR: f64 = 1.2;

/// How a bounce impulse is shared between the two bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassWeighting {
    /// Both bodies have unit mass; each takes half the impulse
    #[default]
    Equal,
    /// Each body takes `other.radius / (a.radius + b.radius)` of the impulse
    BySize,
}

/// Named bounce constants for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    pub restitution: f64,
    pub mass_weighting: MassWeighting,
    /// Scales the impulse magnitude (1.0 = none)
    pub dampening: f64,
    /// Per-component clamp on the impulse vector
    pub max_impulse: f64,
    /// Speed cap applied after the bounce
    pub max_speed: f64,
    /// Circle-rect slack: compares against `radius² * rect_tolerance`
    pub rect_tolerance: f64,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            restitution: 0.5,
            mass_weighting: MassWeighting::Equal,
            dampening: 1.0,
            max_impulse: 150.0,
            max_speed: 150.0,
            rect_tolerance: 1.2,
        }
    }
}

impl CollisionTuning {
    /// Slow drifting profile (decorative rock fields): size-weighted, damped, capped at 50
    pub fn drifting() -> Self {
        Self {
            restitution: 0.5,
            mass_weighting: MassWeighting::BySize,
            dampening: 0.8,
            max_impulse: 50.0,
            max_speed: 50.0,
            rect_tolerance: 1.2,
        }
    }

    /// Clamp nonsensical values into a usable range
    pub fn sanitized(&self) -> Self {
        Self {
            restitution: self.restitution.clamp(0.0, 1.0),
            mass_weighting: self.mass_weighting,
            dampening: self.dampening.max(0.0),
            max_impulse: self.max_impulse.max(0.0),
            max_speed: self.max_speed.max(0.0),
            rect_tolerance: self.rect_tolerance.max(0.0),
        }
    }
}

/// Contact between two circles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal from the first body towards the second
    pub normal: DVec2,
    /// Overlap depth (positive when penetrating)
    pub penetration: f64,
}

/// Strict overlap test; tangent circles do not collide
#[inline]
pub fn circles_overlap(a_pos: DVec2, a_radius: f64, b_pos: DVec2, b_radius: f64) -> bool {
    a_pos.distance(b_pos) < a_radius + b_radius
}

/// Contact normal and depth, with a +X normal when the centres coincide
pub fn circle_contact(a_pos: DVec2, a_radius: f64, b_pos: DVec2, b_radius: f64) -> Contact {
    let delta = b_pos - a_pos;
    let dist = delta.length();
    let normal = if dist > f64::EPSILON { delta / dist } else { DVec2::X };
    Contact {
        normal,
        penetration: a_radius + b_radius - dist,
    }
}

fn clamp_components(v: DVec2, limit: f64) -> DVec2 {
    v.clamp(DVec2::splat(-limit), DVec2::splat(limit))
}

fn cap_speed(v: DVec2, max_speed: f64) -> DVec2 {
    let speed = v.length();
    if speed > max_speed && speed > 0.0 {
        v * (max_speed / speed)
    } else {
        v
    }
}

/// Bounce two overlapping circles off each other.
///
/// Returns `false` (and leaves both bodies untouched) when the pair is
/// already separating or either body is inactive.
pub fn resolve_bounce(a: &mut Body, b: &mut Body, tuning: &CollisionTuning) -> bool {
    if !a.active || !b.active {
        return false;
    }

    let contact = circle_contact(a.pos, a.radius, b.pos, b.radius);
    let n = contact.normal;

    let closing = (b.vel - a.vel).dot(n);
    if closing >= 0.0 {
        return false;
    }

    let j = -(1.0 + tuning.restitution) * closing * tuning.dampening;
    let (share_a, share_b) = match tuning.mass_weighting {
        MassWeighting::Equal => (0.5, 0.5),
        MassWeighting::BySize => {
            let total = a.radius + b.radius;
            if total > 0.0 {
                (b.radius / total, a.radius / total)
            } else {
                (0.5, 0.5)
            }
        }
    };

    let impulse_a = clamp_components(n * (j * share_a), tuning.max_impulse);
    let impulse_b = clamp_components(n * (j * share_b), tuning.max_impulse);
    a.vel = cap_speed(a.vel - impulse_a, tuning.max_speed);
    b.vel = cap_speed(b.vel + impulse_b, tuning.max_speed);

    if contact.penetration > 0.0 {
        let push = n * (contact.penetration * 0.5);
        a.pos -= push;
        b.pos += push;
    }
    true
}

/// Axis-aligned rectangle, top-left origin, y down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn top_center(&self) -> DVec2 {
        DVec2::new(self.x + self.width * 0.5, self.y)
    }

    /// Closest point of the rectangle to `p`
    pub fn closest_point(&self, p: DVec2) -> DVec2 {
        DVec2::new(p.x.clamp(self.x, self.right()), p.y.clamp(self.y, self.bottom()))
    }
}

/// Circle vs rectangle: squared distance from the clamped centre against `radius² * tolerance`
pub fn circle_rect_overlap(center: DVec2, radius: f64, rect: &Rect, tolerance: f64) -> bool {
    let closest = rect.closest_point(center);
    center.distance_squared(closest) < radius * radius * tolerance
}

/// Offset and velocity of each fragment when a hazard splits.
///
/// Fragments sit `radius / 2` from the parent's centre at angles `2π·i/3`
/// and move outward at `base_speed * 1.2`.
pub fn fragment_layout(center: DVec2, radius: f64, base_speed: f64) -> [(DVec2, DVec2); FRAGMENT_COUNT] {
    std::array::from_fn(|i| {
        let dir = crate::from_angle(TAU * i as f64 / FRAGMENT_COUNT as f64);
        (center + dir * (radius * 0.5), dir * (base_speed * FRAGMENT_SPEED_FACTOR))
    })
}
