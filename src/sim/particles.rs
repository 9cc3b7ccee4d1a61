//! Cosmetic particle effects
//!
//! Particles never affect gameplay, except that the exploding phase waits for
//! its terminal burst to fade before the round is over.

use std::collections::VecDeque;

use glam::DVec2;
use rand::Rng;

use crate::random_range;

/// A single particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: DVec2,
    pub vel: DVec2,
    pub size: f64,
    /// Seconds left
    pub life: f64,
    pub max_life: f64,
    pub color: [f32; 4],
    /// Velocity multiplier per tick
    pub drag: f64,
    /// Size multiplier per tick
    pub shrink: f64,
}

impl Particle {
    /// Remaining life as 0..=1, for fading
    pub fn alpha(&self) -> f64 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn update(&mut self, dt: f64) {
        self.pos += self.vel * dt;
        self.vel *= self.drag;
        self.size *= self.shrink;
        self.life -= dt;
    }
}

/// Shape of a burst: ranges are sampled uniformly per particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstStyle {
    pub speed: (f64, f64),
    pub size: (f64, f64),
    pub life: (f64, f64),
    pub drag: f64,
    pub shrink: f64,
    pub color: [f32; 4],
}

impl BurstStyle {
    /// Short spark used when a bullet dies at the playfield edge
    pub fn spark(color: [f32; 4]) -> Self {
        Self {
            speed: (50.0, 150.0),
            size: (1.0, 3.0),
            life: (0.5, 0.5),
            drag: 0.95,
            shrink: 1.0,
            color,
        }
    }

    /// Large, slow-fading explosion debris
    pub fn explosion(color: [f32; 4]) -> Self {
        Self {
            speed: (100.0, 300.0),
            size: (2.0, 5.0),
            life: (0.8, 2.0),
            drag: 1.0,
            shrink: 0.99,
            color,
        }
    }

    /// Engine exhaust flaring out behind a thrusting ship
    pub fn exhaust(color: [f32; 4]) -> Self {
        Self {
            speed: (80.0, 120.0),
            size: (1.0, 2.0),
            life: (1.0, 1.0),
            drag: 1.0,
            shrink: 1.0,
            color,
        }
    }

    /// Structure dissolving into pixels
    pub fn de_res(color: [f32; 4]) -> Self {
        Self {
            speed: (10.0, 80.0),
            size: (2.0, 4.0),
            life: (0.5, 1.2),
            drag: 0.98,
            shrink: 1.0,
            color,
        }
    }
}

/// Bounded particle pool; the oldest particles are evicted first
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: VecDeque<Particle>,
    capacity: usize,
}

impl ParticleSystem {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&mut self, particle: Particle) {
        if self.capacity == 0 {
            return;
        }
        if self.particles.len() >= self.capacity {
            self.particles.pop_front();
        }
        self.particles.push_back(particle);
    }

    /// Emit `count` particles from `origin` in random directions
    pub fn burst<R: Rng + ?Sized>(&mut self, rng: &mut R, origin: DVec2, count: usize, style: &BurstStyle) {
        for _ in 0..count {
            let dir = crate::from_angle(random_range(rng, 0.0, std::f64::consts::TAU));
            self.emit(rng, origin, dir, style);
        }
    }

    /// Emit one particle along `dir` with sampled speed, size and life
    pub fn emit<R: Rng + ?Sized>(&mut self, rng: &mut R, origin: DVec2, dir: DVec2, style: &BurstStyle) {
        let life = sample(rng, style.life);
        self.push(Particle {
            pos: origin,
            vel: dir * sample(rng, style.speed),
            size: sample(rng, style.size),
            life,
            max_life: life,
            color: style.color,
            drag: style.drag,
            shrink: style.shrink,
        });
    }

    /// Age every particle and drop the expired ones
    pub fn update(&mut self, dt: f64) {
        for p in self.particles.iter_mut() {
            p.update(dt);
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, (min, max): (f64, f64)) -> f64 {
    random_range(rng, min, max)
}
