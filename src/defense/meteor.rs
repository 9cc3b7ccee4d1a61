//! Meteors: the defense hazard

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use rand::Rng;

use super::structures::{Base, Launcher};
use crate::sim::{Body, Collidable, EntityKind, jagged_outline, pick_weighted};
use crate::{direction_or, random_range};

const OUTLINE_VERTICES: usize = 8;
const OUTLINE_VARIANCE: f64 = 0.3;
/// Meteors count as gone this many radii past a side edge
const SIDE_MARGIN: f64 = 1.5;

/// A falling rock aimed at a structure
#[derive(Debug, Clone, PartialEq)]
pub struct Meteor {
    pub id: u32,
    pub body: Body,
    /// Ground point it was aimed at
    pub target: DVec2,
    pub outline: Vec<DVec2>,
}

impl Meteor {
    /// Meteor at `pos` heading for `target` at `speed`; straight down if they coincide
    pub fn new<R: Rng + ?Sized>(rng: &mut R, id: u32, pos: DVec2, target: DVec2, speed: f64, radius: f64) -> Self {
        let mut body = Body::new(pos, radius).with_velocity(direction_or(pos, target, DVec2::Y) * speed);
        body.rotation = random_range(rng, 0.0, TAU);
        body.rotation_vel = random_range(rng, 0.5, 1.0) * PI;
        Self {
            id,
            body,
            target,
            outline: jagged_outline(rng, radius, OUTLINE_VERTICES, OUTLINE_VARIANCE),
        }
    }

    /// Straight flight with spin; meteors never wrap
    pub fn advance(&mut self, dt: f64) {
        if !self.body.active {
            return;
        }
        self.body.pos += self.body.vel * dt;
        self.body.rotation += self.body.rotation_vel * dt;
    }

    pub fn touches_ground(&self, ground: f64) -> bool {
        self.body.pos.y + self.body.radius >= ground
    }

    pub fn is_off_screen(&self, width: f64, height: f64) -> bool {
        let margin = self.body.radius * SIDE_MARGIN;
        let p = self.body.pos;
        p.y > height || p.x < -margin || p.x > width + margin
    }
}

impl Collidable for Meteor {
    fn id(&self) -> u32 {
        self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Meteor
    }

    fn body(&self) -> &Body {
        &self.body
    }
}

/// Pick a meteor target: live launchers weigh `launcher_weight`, live bases
/// `base_weight` at a random point across their width. With nothing standing
/// the meteor aims at a random ground point.
pub fn choose_target<R: Rng + ?Sized>(
    rng: &mut R,
    launchers: &[Launcher],
    bases: &[Base],
    launcher_weight: f64,
    base_weight: f64,
    width: f64,
    ground: f64,
) -> DVec2 {
    let mut candidates: Vec<(DVec2, f64)> = launchers
        .iter()
        .filter(|l| !l.destroyed)
        .map(|l| (l.anchor(), launcher_weight))
        .collect();
    for base in bases.iter().filter(|b| b.is_alive()) {
        let offset = (rng.random::<f64>() - 0.5) * base.width;
        candidates.push((DVec2::new(base.x + offset, base.ground), base_weight));
    }

    pick_weighted(rng, &candidates).unwrap_or_else(|| DVec2::new(random_range(rng, 0.0, width), ground))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_meteor_heads_for_target() {
        let mut rng = Pcg32::seed_from_u64(3);
        let target = DVec2::new(400.0, 700.0);
        let mut meteor = Meteor::new(&mut rng, 1, DVec2::new(100.0, 0.0), target, 62.5, 15.0);
        assert!((meteor.body.speed() - 62.5).abs() < 1e-9);
        assert!((0.5 * PI..=PI).contains(&meteor.body.rotation_vel));
        assert_eq!(meteor.outline.len(), 8);

        let before = meteor.body.pos.distance(target);
        meteor.advance(1.0);
        assert!((before - meteor.body.pos.distance(target) - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_meteor_on_its_target_falls_straight() {
        let mut rng = Pcg32::seed_from_u64(3);
        let pos = DVec2::new(100.0, 0.0);
        let meteor = Meteor::new(&mut rng, 1, pos, pos, 50.0, 15.0);
        assert_eq!(meteor.body.vel, DVec2::new(0.0, 50.0));
    }

    #[test]
    fn test_off_screen_and_ground() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut meteor = Meteor::new(&mut rng, 1, DVec2::new(-20.0, 300.0), DVec2::ZERO, 0.0, 15.0);
        assert!(!meteor.is_off_screen(960.0, 720.0));
        meteor.body.pos.x = -23.0;
        assert!(meteor.is_off_screen(960.0, 720.0));

        meteor.body.pos = DVec2::new(300.0, 685.0);
        assert!(meteor.touches_ground(700.0));
        meteor.body.pos.y = 684.0;
        assert!(!meteor.touches_ground(700.0));
    }

    #[test]
    fn test_targets_only_live_structures() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut launchers = vec![Launcher::new(1, 100.0, 700.0, 50.0, 35.0)];
        let mut bases = vec![Base::new(2, 500.0, 700.0, 80.0, 35.0, 3)];
        launchers[0].destroy();
        for _ in 0..100 {
            let target = choose_target(&mut rng, &launchers, &bases, 2.0, 1.0, 960.0, 700.0);
            assert!((460.0..=540.0).contains(&target.x));
            assert_eq!(target.y, 700.0);
        }

        bases[0].hp = 0;
        let target = choose_target(&mut rng, &launchers, &bases, 2.0, 1.0, 960.0, 700.0);
        assert!((0.0..960.0).contains(&target.x));
    }

    #[test]
    fn test_launchers_weigh_double() {
        let mut rng = Pcg32::seed_from_u64(99);
        let launchers = vec![Launcher::new(1, 100.0, 700.0, 50.0, 35.0)];
        let bases = vec![Base::new(2, 500.0, 700.0, 80.0, 35.0, 3)];
        let mut launcher_hits = 0;
        for _ in 0..3000 {
            if choose_target(&mut rng, &launchers, &bases, 2.0, 1.0, 960.0, 700.0).x < 300.0 {
                launcher_hits += 1;
            }
        }
        // Expect ~2000
        assert!((1800..2200).contains(&launcher_hits), "{launcher_hits}");
    }
}
