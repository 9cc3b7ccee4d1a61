//! Drifting background rock field
//!
//! Decorative only: these rocks never meet the hero, bullets or hazards. They
//! wrap around the playfield and bounce off each other with the damped,
//! size-weighted profile, so small rocks get knocked around by big ones.

use glam::DVec2;
use rand::Rng;

use crate::sim::{Body, CollisionTuning, jagged_outline, resolve_bounce};
use crate::{from_angle, random_range};

pub const BACKDROP_MIN_RADIUS: f64 = 5.0;
pub const BACKDROP_MAX_RADIUS: f64 = 25.0;
pub const BACKDROP_MIN_SPEED: f64 = 15.0;
pub const BACKDROP_MAX_SPEED: f64 = 30.0;
/// Spin range (radians/sec, either direction)
const BACKDROP_SPIN: f64 = 0.3;
const OUTLINE_VARIANCE: f64 = 0.2;

/// One background rock
#[derive(Debug, Clone, PartialEq)]
pub struct BackdropRock {
    pub body: Body,
    /// Local-space outline (unrotated)
    pub outline: Vec<DVec2>,
}

impl BackdropRock {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64) -> Self {
        let radius = random_range(rng, BACKDROP_MIN_RADIUS, BACKDROP_MAX_RADIUS);
        let speed = random_range(rng, BACKDROP_MIN_SPEED, BACKDROP_MAX_SPEED);
        let heading = random_range(rng, 0.0, std::f64::consts::TAU);
        let pos = DVec2::new(random_range(rng, 0.0, width), random_range(rng, 0.0, height));

        let mut body = Body::new(pos, radius).with_velocity(from_angle(heading) * speed);
        body.rotation = random_range(rng, 0.0, std::f64::consts::TAU);
        body.rotation_vel = random_range(rng, -BACKDROP_SPIN, BACKDROP_SPIN);
        let vertices = rng.random_range(8..12);
        Self {
            body,
            outline: jagged_outline(rng, radius, vertices, OUTLINE_VARIANCE),
        }
    }
}

/// The whole field plus the bounce profile it uses
#[derive(Debug, Clone)]
pub struct Backdrop {
    pub rocks: Vec<BackdropRock>,
    collision: CollisionTuning,
}

impl Backdrop {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, count: usize, width: f64, height: f64, collision: &CollisionTuning) -> Self {
        Self {
            rocks: (0..count).map(|_| BackdropRock::random(rng, width, height)).collect(),
            collision: collision.sanitized(),
        }
    }

    pub fn collision(&self) -> &CollisionTuning {
        &self.collision
    }

    /// Move every rock, then bounce each overlapping pair once
    pub fn update(&mut self, dt: f64, width: f64, height: f64) -> usize {
        for rock in &mut self.rocks {
            rock.body.update(dt, width, height);
        }

        // A handful of rocks: brute force pairs, no broad phase
        let mut bounces = 0;
        for i in 0..self.rocks.len() {
            let (head, tail) = self.rocks.split_at_mut(i + 1);
            let a = &mut head[i].body;
            for other in tail.iter_mut() {
                if a.collides_with(&other.body) && resolve_bounce(a, &mut other.body, &self.collision) {
                    bounces += 1;
                }
            }
        }
        bounces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::MassWeighting;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rock(x: f64, vx: f64, radius: f64) -> BackdropRock {
        BackdropRock {
            body: Body::new(DVec2::new(x, 300.0), radius).with_velocity(DVec2::new(vx, 0.0)),
            outline: Vec::new(),
        }
    }

    #[test]
    fn test_random_rocks_within_ranges() {
        let mut rng = Pcg32::seed_from_u64(4);
        let field = Backdrop::new(&mut rng, 50, 1280.0, 720.0, &CollisionTuning::drifting());
        assert_eq!(field.rocks.len(), 50);
        for rock in &field.rocks {
            assert!((BACKDROP_MIN_RADIUS..BACKDROP_MAX_RADIUS).contains(&rock.body.radius));
            let speed = rock.body.speed();
            assert!(speed >= BACKDROP_MIN_SPEED - 1e-9 && speed < BACKDROP_MAX_SPEED + 1e-9);
            assert!((8..12).contains(&rock.outline.len()));
        }
        assert_eq!(field.collision().mass_weighting, MassWeighting::BySize);
    }

    #[test]
    fn test_rocks_wrap() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut field = Backdrop::new(&mut rng, 0, 1280.0, 720.0, &CollisionTuning::drifting());
        field.rocks.push(rock(1290.0, 30.0, 10.0));
        field.update(1.0, 1280.0, 720.0);
        assert_eq!(field.rocks[0].body.pos.x, -10.0);
    }

    #[test]
    fn test_small_rock_takes_most_of_the_bounce() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut field = Backdrop::new(&mut rng, 0, 1280.0, 720.0, &CollisionTuning::drifting());
        field.rocks.push(rock(400.0, 20.0, 20.0));
        field.rocks.push(rock(424.0, -20.0, 5.0));
        assert_eq!(field.update(0.0, 1280.0, 720.0), 1);

        // closing speed 40, j = 1.5 * 40 * 0.8 = 48, shares 5/25 and 20/25
        let big = field.rocks[0].body.vel.x;
        let small = field.rocks[1].body.vel.x;
        assert!((big - (20.0 - 48.0 * 0.2)).abs() < 1e-9, "big {big}");
        assert!((small - (-20.0 + 48.0 * 0.8)).abs() < 1e-9, "small {small}");
    }

    #[test]
    fn test_speed_capped_at_fifty() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut field = Backdrop::new(&mut rng, 0, 1280.0, 720.0, &CollisionTuning::drifting());
        field.rocks.push(rock(400.0, 30.0, 25.0));
        field.rocks.push(rock(420.0, -30.0, 5.0));
        field.update(0.0, 1280.0, 720.0);
        assert!(field.rocks.iter().all(|r| r.body.speed() <= 50.0 + 1e-9));
    }

    #[test]
    fn test_separating_rocks_untouched() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut field = Backdrop::new(&mut rng, 0, 1280.0, 720.0, &CollisionTuning::drifting());
        field.rocks.push(rock(400.0, -20.0, 20.0));
        field.rocks.push(rock(424.0, 20.0, 5.0));
        assert_eq!(field.update(0.0, 1280.0, 720.0), 0);
        assert_eq!(field.rocks[1].body.vel.x, 20.0);
    }
}
