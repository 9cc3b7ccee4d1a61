//! Missiles, blasts and the short-lived markers around them

use std::collections::BTreeSet;

use glam::DVec2;

use crate::direction_or;
use crate::sim::{Body, Collidable, EntityKind};
use crate::tuning::BlastTuning;

/// A missile counts as arrived within this distance (squared) of its target
const ARRIVAL_DIST_SQ: f64 = 25.0;

/// Interceptor flying from a launcher to an aim point
#[derive(Debug, Clone, PartialEq)]
pub struct Missile {
    pub id: u32,
    pub origin: DVec2,
    pub pos: DVec2,
    pub target: DVec2,
    pub vel: DVec2,
}

impl Missile {
    pub fn new(id: u32, origin: DVec2, target: DVec2, speed: f64) -> Self {
        Self {
            id,
            origin,
            pos: origin,
            target,
            vel: direction_or(origin, target, DVec2::NEG_Y) * speed,
        }
    }

    /// Move; true once the missile reached (or flew past) its target
    pub fn update(&mut self, dt: f64) -> bool {
        self.pos += self.vel * dt;
        let to_target = self.target - self.pos;
        to_target.length_squared() < ARRIVAL_DIST_SQ || to_target.dot(self.vel) < 0.0
    }
}

/// Sum of `base * i` for the i-th of `kills` chained destructions
pub fn chain_points(base: u64, kills: u32) -> u64 {
    let n = u64::from(kills);
    base * n * (n + 1) / 2
}

/// Expanding then collapsing explosion.
///
/// Each meteor is destroyed at most once per blast. Hostile blasts (meteor
/// impacts) destroy meteors but never score or collect pickups.
#[derive(Debug, Clone, PartialEq)]
pub struct Blast {
    pub id: u32,
    pub body: Body,
    pub age: f64,
    pub max_radius: f64,
    pub hostile: bool,
    hits: BTreeSet<u32>,
    tuning: BlastTuning,
}

impl Blast {
    pub fn new(id: u32, pos: DVec2, max_radius: f64, hostile: bool, tuning: &BlastTuning) -> Self {
        Self {
            id,
            body: Body::new(pos, tuning.min_radius),
            age: 0.0,
            max_radius,
            hostile,
            hits: BTreeSet::new(),
            tuning: tuning.clone(),
        }
    }

    /// Radius at `age`: linear growth to `max_radius`, then linear collapse to zero
    pub fn radius_at(&self, age: f64) -> f64 {
        let t = &self.tuning;
        if age <= t.expand_secs {
            let progress = if t.expand_secs > 0.0 { age / t.expand_secs } else { 1.0 };
            t.min_radius + (self.max_radius - t.min_radius) * progress
        } else {
            let shrink = (t.duration_secs - t.expand_secs).max(f64::EPSILON);
            let progress = ((age - t.expand_secs) / shrink).min(1.0);
            self.max_radius * (1.0 - progress)
        }
    }

    /// Age the blast; true once it has run its course
    pub fn update(&mut self, dt: f64) -> bool {
        self.age += dt;
        self.body.radius = self.radius_at(self.age);
        let finished = self.age >= self.tuning.duration_secs;
        if finished {
            self.body.destroy();
        }
        finished
    }

    /// Inclusive reach test against a circle
    pub fn reaches(&self, pos: DVec2, radius: f64) -> bool {
        self.body.active && crate::distance(self.body.pos, pos) <= self.body.radius + radius
    }

    /// Record a meteor kill; false if this blast already took it
    pub fn record_hit(&mut self, meteor_id: u32) -> bool {
        self.hits.insert(meteor_id)
    }

    pub fn kills(&self) -> u32 {
        self.hits.len() as u32
    }

    /// Points this blast is worth when it ends
    pub fn points(&self, base: u64) -> u64 {
        if self.hostile {
            return 0;
        }
        chain_points(base, self.kills())
    }
}

impl Collidable for Blast {
    fn id(&self) -> u32 {
        self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Blast
    }

    fn body(&self) -> &Body {
        &self.body
    }
}

/// Crosshair left where the player aimed; green if a missile went, red if not
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetMarker {
    pub pos: DVec2,
    pub valid: bool,
    /// Game-clock second it disappears
    pub expires_at: f64,
}

/// Floating score for a finished chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePopup {
    pub pos: DVec2,
    pub points: u64,
    pub multiplier: u32,
    pub age: f64,
    pub lifetime: f64,
}

impl ScorePopup {
    /// Rise speed (px/s)
    const RISE: f64 = 40.0;

    pub fn new(pos: DVec2, points: u64, multiplier: u32, lifetime: f64) -> Self {
        Self {
            pos,
            points,
            multiplier,
            age: 0.0,
            lifetime,
        }
    }

    /// Drift upward; true once expired
    pub fn update(&mut self, dt: f64) -> bool {
        self.age += dt;
        self.pos.y -= Self::RISE * dt;
        self.age >= self.lifetime
    }

    pub fn alpha(&self) -> f64 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn test_chain_points() {
        assert_eq!(chain_points(10, 0), 0);
        assert_eq!(chain_points(10, 1), 10);
        assert_eq!(chain_points(10, 3), 60);
    }

    #[test]
    fn test_missile_arrives() {
        let mut missile = Missile::new(1, DVec2::new(100.0, 665.0), DVec2::new(100.0, 400.0), 500.0);
        let mut ticks = 0;
        while !missile.update(DT) {
            ticks += 1;
            assert!(ticks < 100);
        }
        assert!(missile.pos.distance(missile.target) < 10.0);
        // 265 px at 500 px/s
        assert!((30..=32).contains(&ticks), "{ticks}");
    }

    #[test]
    fn test_missile_on_target_arrives_at_once() {
        let origin = DVec2::new(100.0, 665.0);
        let mut missile = Missile::new(1, origin, origin, 500.0);
        assert!(missile.update(DT));
    }

    #[test]
    fn test_blast_grows_then_collapses() {
        let mut blast = Blast::new(1, DVec2::ZERO, 50.0, false, &BlastTuning::default());
        assert_eq!(blast.radius_at(0.0), 10.0);
        assert!((blast.radius_at(0.125) - 30.0).abs() < 1e-9);
        assert!((blast.radius_at(0.25) - 50.0).abs() < 1e-9);
        assert!((blast.radius_at(0.375) - 25.0).abs() < 1e-9);
        assert_eq!(blast.radius_at(0.5), 0.0);

        let mut ticks = 0;
        while !blast.update(DT) {
            ticks += 1;
        }
        assert!((29..=30).contains(&ticks), "{ticks}");
        assert!(!blast.body.active);
    }

    #[test]
    fn test_blast_counts_each_meteor_once() {
        let mut blast = Blast::new(1, DVec2::ZERO, 50.0, false, &BlastTuning::default());
        assert!(blast.record_hit(7));
        assert!(!blast.record_hit(7));
        assert!(blast.record_hit(8));
        assert_eq!(blast.points(10), 30);
    }

    #[test]
    fn test_hostile_blast_scores_nothing() {
        let mut blast = Blast::new(1, DVec2::ZERO, 50.0, true, &BlastTuning::default());
        blast.record_hit(1);
        assert_eq!(blast.points(10), 0);
    }

    #[test]
    fn test_popup_fades() {
        let mut popup = ScorePopup::new(DVec2::new(0.0, 100.0), 30, 2, 1.0);
        assert!(!popup.update(0.5));
        assert!((popup.alpha() - 0.5).abs() < 1e-9);
        assert!(popup.pos.y < 100.0);
        assert!(popup.update(0.5));
    }
}
