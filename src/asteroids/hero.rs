//! The player's ship, its weapons and its pickups

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;

use glam::DVec2;

use crate::sim::{Body, Collidable, EntityKind, TickInput};
use crate::tuning::AsteroidsTuning;
use crate::{from_angle, normalize_angle};

/// How a weapon lays out its bullets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirePattern {
    /// One bullet from the nose
    Single,
    /// Two bullets side by side, `10 * spacing` either side of the heading
    ParallelForward,
}

/// Static weapon table entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSpec {
    pub level: u8,
    /// Seconds between shots
    pub fire_interval: f64,
    pub bullet_radius: f64,
    pub pattern: FirePattern,
    pub spacing: f64,
}

const WEAPONS: [WeaponSpec; 6] = [
    WeaponSpec { level: 1, fire_interval: 0.1, bullet_radius: 2.0, pattern: FirePattern::Single, spacing: 1.0 },
    WeaponSpec { level: 2, fire_interval: 0.2, bullet_radius: 3.0, pattern: FirePattern::ParallelForward, spacing: 1.0 },
    WeaponSpec { level: 3, fire_interval: 0.3, bullet_radius: 4.0, pattern: FirePattern::ParallelForward, spacing: 3.0 },
    WeaponSpec { level: 4, fire_interval: 0.4, bullet_radius: 5.0, pattern: FirePattern::ParallelForward, spacing: 4.5 },
    WeaponSpec { level: 5, fire_interval: 0.5, bullet_radius: 6.0, pattern: FirePattern::ParallelForward, spacing: 6.0 },
    WeaponSpec { level: 6, fire_interval: 0.6, bullet_radius: 7.0, pattern: FirePattern::ParallelForward, spacing: 7.5 },
];

/// Highest weapon level in the table
pub const MAX_WEAPON_LEVEL: u8 = WEAPONS.len() as u8;

/// Look up a weapon by level (1-based)
pub fn weapon_spec(level: u8) -> Option<&'static WeaponSpec> {
    WEAPONS.get(usize::from(level).checked_sub(1)?)
}

/// A bullet the hero wants spawned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
}

/// Player ship
#[derive(Debug, Clone)]
pub struct Hero {
    pub body: Body,
    /// Owned weapon levels, in pickup order
    pub weapons: Vec<u8>,
    pub shield: bool,
    /// Game-clock second at which invincibility ends
    pub invincible_until: f64,
    /// Last shot time per weapon level
    last_fired: BTreeMap<u8, f64>,
    /// Thrust applied this tick (drives the exhaust trail)
    pub thrusting: bool,
}

impl Hero {
    pub fn new(pos: DVec2, radius: f64) -> Self {
        Self {
            body: Body::new(pos, radius),
            weapons: vec![1],
            shield: false,
            invincible_until: 0.0,
            last_fired: BTreeMap::new(),
            thrusting: false,
        }
    }

    pub fn heading(&self) -> DVec2 {
        from_angle(self.body.rotation)
    }

    pub fn is_invincible(&self, now: f64) -> bool {
        now < self.invincible_until
    }

    pub fn make_invincible(&mut self, now: f64, secs: f64) {
        self.invincible_until = now + secs;
    }

    pub fn best_weapon(&self) -> u8 {
        self.weapons.iter().copied().max().unwrap_or(1)
    }

    /// Add a weapon level; owning it already is a no-op
    pub fn upgrade_weapon(&mut self, level: u8) {
        if weapon_spec(level).is_some() && !self.weapons.contains(&level) {
            self.weapons.push(level);
        }
    }

    /// Apply held movement intents for one tick. No drag: the ship coasts.
    pub fn steer(&mut self, input: &TickInput, tuning: &AsteroidsTuning) {
        let heading = self.heading();
        self.thrusting = false;
        if input.forward {
            self.body.vel += heading * tuning.thrust_per_tick;
            self.thrusting = true;
        } else if input.backward {
            self.body.vel -= heading * tuning.reverse_per_tick;
            self.thrusting = true;
        }
        let speed = self.body.speed();
        if speed > tuning.max_hero_speed {
            self.body.vel *= tuning.max_hero_speed / speed;
        }

        self.body.rotation_vel = if input.rotate_left {
            -tuning.rotation_speed
        } else if input.rotate_right {
            tuning.rotation_speed
        } else {
            0.0
        };
    }

    /// Move, wrap and keep the heading in [-π, π)
    pub fn update(&mut self, dt: f64, width: f64, height: f64) {
        self.body.update(dt, width, height);
        self.body.rotation = normalize_angle(self.body.rotation);
    }

    /// Fire every owned weapon whose cooldown has elapsed
    pub fn fire(&mut self, now: f64, bullet_speed: f64) -> Vec<Shot> {
        let mut shots = Vec::new();
        let heading = self.heading();
        let side = from_angle(self.body.rotation + FRAC_PI_2);
        let vel = heading * bullet_speed;

        for &level in &self.weapons {
            let Some(spec) = weapon_spec(level) else {
                continue;
            };
            let ready = self
                .last_fired
                .get(&level)
                .is_none_or(|last| now - last >= spec.fire_interval);
            if !ready {
                continue;
            }
            self.last_fired.insert(level, now);

            match spec.pattern {
                FirePattern::Single => shots.push(Shot {
                    pos: self.body.pos,
                    vel,
                    radius: spec.bullet_radius,
                }),
                FirePattern::ParallelForward => {
                    let offset = side * (10.0 * spec.spacing);
                    for pos in [self.body.pos + offset, self.body.pos - offset] {
                        shots.push(Shot {
                            pos,
                            vel,
                            radius: spec.bullet_radius,
                        });
                    }
                }
            }
        }
        shots
    }
}

impl Collidable for Hero {
    fn id(&self) -> u32 {
        0
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Hero
    }

    fn body(&self) -> &Body {
        &self.body
    }
}

/// Straight-flying shot
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub id: u32,
    pub body: Body,
    /// Seconds left
    pub lifetime: f64,
}

/// Outcome of moving a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletFate {
    Flying,
    Expired,
    /// Left the playfield (bursts into sparks)
    HitEdge,
}

impl Bullet {
    pub fn new(id: u32, shot: Shot, lifetime: f64) -> Self {
        Self {
            id,
            body: Body::new(shot.pos, shot.radius).with_velocity(shot.vel),
            lifetime,
        }
    }

    /// Bullets never wrap: they die at the playfield edge
    pub fn update(&mut self, dt: f64, width: f64, height: f64) -> BulletFate {
        if !self.body.active {
            return BulletFate::Expired;
        }
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.body.destroy();
            return BulletFate::Expired;
        }
        self.body.pos += self.body.vel * dt;
        let p = self.body.pos;
        if p.x < 0.0 || p.x > width || p.y < 0.0 || p.y > height {
            self.body.destroy();
            return BulletFate::HitEdge;
        }
        BulletFate::Flying
    }
}

impl Collidable for Bullet {
    fn id(&self) -> u32 {
        self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Bullet
    }

    fn body(&self) -> &Body {
        &self.body
    }
}

/// Kind of floating pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    Shield,
    /// Offers the given weapon level
    Weapon(u8),
}

/// Stationary collectable
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPickup {
    pub id: u32,
    pub body: Body,
    pub kind: PickupKind,
}

impl Collidable for FieldPickup {
    fn id(&self) -> u32 {
        self.id
    }

    fn kind(&self) -> EntityKind {
        match self.kind {
            PickupKind::Shield => EntityKind::ShieldPickup,
            PickupKind::Weapon(_) => EntityKind::WeaponPickup,
        }
    }

    fn body(&self) -> &Body {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero() -> Hero {
        Hero::new(DVec2::new(640.0, 360.0), 22.0)
    }

    #[test]
    fn test_thrust_accumulates_and_caps() {
        let tuning = AsteroidsTuning::default();
        let mut hero = hero();
        let input = TickInput {
            forward: true,
            ..Default::default()
        };
        hero.steer(&input, &tuning);
        assert!((hero.body.vel.x - 50.0).abs() < 1e-9);
        for _ in 0..20 {
            hero.steer(&input, &tuning);
        }
        assert!((hero.body.speed() - 300.0).abs() < 1e-9);

        // Coasting keeps velocity
        hero.steer(&TickInput::default(), &tuning);
        assert!((hero.body.speed() - 300.0).abs() < 1e-9);
        assert!(!hero.thrusting);
    }

    #[test]
    fn test_rotation_normalized() {
        let tuning = AsteroidsTuning::default();
        let mut hero = hero();
        let input = TickInput {
            rotate_right: true,
            ..Default::default()
        };
        hero.steer(&input, &tuning);
        for _ in 0..600 {
            hero.update(1.0 / 60.0, 1280.0, 720.0);
            assert!((-std::f64::consts::PI..std::f64::consts::PI).contains(&hero.body.rotation));
        }
    }

    #[test]
    fn test_weapon_one_respects_cooldown() {
        let mut hero = hero();
        assert_eq!(hero.fire(0.0, 725.0).len(), 1);
        assert!(hero.fire(0.05, 725.0).is_empty());
        assert_eq!(hero.fire(0.1, 725.0).len(), 1);
    }

    #[test]
    fn test_parallel_pattern_offsets() {
        let mut hero = hero();
        hero.upgrade_weapon(3);
        let shots = hero.fire(0.0, 725.0);
        // Weapon 1 single + weapon 3 pair
        assert_eq!(shots.len(), 3);
        let pair: Vec<&Shot> = shots.iter().filter(|s| s.radius == 4.0).collect();
        assert_eq!(pair.len(), 2);
        assert!((pair[0].pos.distance(pair[1].pos) - 60.0).abs() < 1e-9);
        for shot in &shots {
            assert!((shot.vel - DVec2::new(725.0, 0.0)).length() < 1e-9);
        }
    }

    #[test]
    fn test_upgrade_is_idempotent_and_bounded() {
        let mut hero = hero();
        hero.upgrade_weapon(2);
        hero.upgrade_weapon(2);
        hero.upgrade_weapon(9);
        assert_eq!(hero.weapons, vec![1, 2]);
        assert_eq!(hero.best_weapon(), 2);
    }

    #[test]
    fn test_bullet_dies_at_edge() {
        let shot = Shot {
            pos: DVec2::new(1275.0, 100.0),
            vel: DVec2::new(725.0, 0.0),
            radius: 2.0,
        };
        let mut bullet = Bullet::new(1, shot, 2.0);
        assert_eq!(bullet.update(1.0 / 60.0, 1280.0, 720.0), BulletFate::HitEdge);
        assert!(!bullet.body.active);
    }

    #[test]
    fn test_bullet_expires() {
        let shot = Shot {
            pos: DVec2::new(100.0, 100.0),
            vel: DVec2::ZERO,
            radius: 2.0,
        };
        let mut bullet = Bullet::new(1, shot, 0.05);
        assert_eq!(bullet.update(0.03, 1280.0, 720.0), BulletFate::Flying);
        assert_eq!(bullet.update(0.03, 1280.0, 720.0), BulletFate::Expired);
    }

    #[test]
    fn test_invincibility_window() {
        let mut hero = hero();
        hero.make_invincible(10.0, 1.0);
        assert!(hero.is_invincible(10.5));
        assert!(!hero.is_invincible(11.0));
    }
}
