//! Asteroids game state
//!
//! Everything that belongs to a round lives here and is rebuilt by
//! [`AsteroidsGame::start_round`].

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::backdrop::Backdrop;
use super::hero::{Bullet, FieldPickup, Hero, MAX_WEAPON_LEVEL, PickupKind, Shot};
use super::rock::{Rock, SizeClass};
use crate::render::colors;
use crate::settings::Settings;
use crate::sim::{BurstStyle, GameEvent, IntervalTimer, ParticleSystem, Phase, SpatialGrid, SpawnRamp};
use crate::tuning::AsteroidsTuning;

/// Particles for the hero's terminal explosion
pub const HERO_EXPLOSION_PARTICLES: usize = 60;
/// Particles per rock left on the field at game over
pub const ROCK_EXPLOSION_PARTICLES: usize = 40;
/// Particles when a bullet breaks a rock
pub const HIT_PARTICLES: usize = 20;
/// Particles per fragment of a broken rock
pub const FRAGMENT_PARTICLES: usize = 10;
/// Sparks when a bullet leaves the field
pub const EDGE_SPARKS: usize = 8;

/// Complete asteroids game
#[derive(Debug, Clone)]
pub struct AsteroidsGame {
    pub tuning: AsteroidsTuning,
    pub settings: Settings,
    pub phase: Phase,
    pub(crate) rng: Pcg32,

    // ── Round state ─────────────────────────────────────────────────────────
    pub score: u64,
    /// Round clock (seconds of play)
    pub elapsed: f64,
    /// Seconds spent in the exploding phase
    pub(crate) exploding_time: f64,
    pub hero: Hero,
    /// Sorted by id (ids are allocated monotonically and only appended)
    pub rocks: Vec<Rock>,
    pub bullets: Vec<Bullet>,
    pub shield_pickup: Option<FieldPickup>,
    pub weapon_pickup: Option<FieldPickup>,
    pub next_weapon_level: u8,
    pub particles: ParticleSystem,
    /// Background rocks; drift in every phase and survive restarts
    pub backdrop: Backdrop,
    pub(crate) grid: SpatialGrid,
    pub(crate) rock_spawner: SpawnRamp,
    pub(crate) shield_timer: IntervalTimer,
    pub(crate) weapon_timer: IntervalTimer,

    pub high_score: u64,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) next_id: u32,
}

impl AsteroidsGame {
    pub fn new(seed: u64, tuning: AsteroidsTuning, settings: Settings) -> Self {
        let hero = Hero::new(center(&tuning), tuning.hero_radius);
        let mut rng = Pcg32::seed_from_u64(seed);
        let backdrop = Backdrop::new(
            &mut rng,
            tuning.backdrop_rocks,
            tuning.width,
            tuning.height,
            &tuning.backdrop_collision,
        );
        Self {
            phase: Phase::Welcome,
            rng,
            score: 0,
            elapsed: 0.0,
            exploding_time: 0.0,
            hero,
            rocks: Vec::new(),
            bullets: Vec::new(),
            shield_pickup: None,
            weapon_pickup: None,
            next_weapon_level: 2,
            particles: ParticleSystem::new(settings.max_particles()),
            backdrop,
            grid: SpatialGrid::new(tuning.grid_cell_size),
            rock_spawner: SpawnRamp::new(&tuning.spawn),
            shield_timer: IntervalTimer::new(tuning.shield_interval),
            weapon_timer: IntervalTimer::new(tuning.weapon_interval),
            high_score: 0,
            events: Vec::new(),
            next_id: 1,
            tuning,
            settings,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reset every per-round value and enter `Playing`
    pub fn start_round(&mut self) {
        self.score = 0;
        self.elapsed = 0.0;
        self.exploding_time = 0.0;
        self.hero = Hero::new(center(&self.tuning), self.tuning.hero_radius);
        self.rocks.clear();
        self.bullets.clear();
        self.shield_pickup = None;
        self.weapon_pickup = None;
        self.next_weapon_level = 2;
        self.particles.clear();
        self.grid.clear();
        self.rock_spawner = SpawnRamp::new(&self.tuning.spawn);
        self.shield_timer = IntervalTimer::new(self.tuning.shield_interval);
        self.weapon_timer = IntervalTimer::new(self.tuning.weapon_interval);
        self.phase = Phase::Playing;
        self.events.push(GameEvent::RoundStarted);
        log::info!("Asteroids round started");
    }

    /// Hero destroyed: blow everything up and enter `Exploding`
    pub fn end_round(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        self.phase = Phase::Exploding;
        self.exploding_time = 0.0;
        self.particles.clear();

        let hero_pos = self.hero.body.pos;
        self.particles.burst(
            &mut self.rng,
            hero_pos,
            HERO_EXPLOSION_PARTICLES,
            &BurstStyle::explosion(colors::HERO_EXPLOSION),
        );
        for rock in self.rocks.iter().filter(|r| r.body.active) {
            self.particles.burst(
                &mut self.rng,
                rock.body.pos,
                ROCK_EXPLOSION_PARTICLES,
                &BurstStyle::explosion(colors::ROCK),
            );
        }

        self.rocks.clear();
        self.bullets.clear();
        self.shield_pickup = None;
        self.weapon_pickup = None;
        self.hero.body.destroy();

        self.events.push(GameEvent::RoundEnded { score: self.score });
        log::info!(
            "Asteroids round over: score {} after {:.1}s",
            self.score,
            self.elapsed
        );
    }

    /// Add a rock (used by the spawner and by tests/tools)
    pub fn spawn_rock(&mut self, pos: DVec2, vel: DVec2, size: SizeClass) -> u32 {
        let id = self.next_entity_id();
        let rock = Rock::new(&mut self.rng, id, pos, vel, size);
        self.rocks.push(rock);
        id
    }

    pub(crate) fn spawn_edge_rock(&mut self) {
        let id = self.next_entity_id();
        let rock = Rock::spawn_at_edge(&mut self.rng, id, &self.tuning);
        log::debug!("Spawned rock {id} at {:?}", rock.body.pos);
        self.rocks.push(rock);
    }

    /// Add a bullet
    pub fn spawn_bullet(&mut self, shot: Shot) -> u32 {
        let id = self.next_entity_id();
        self.bullets.push(Bullet::new(id, shot, self.tuning.bullet_lifetime));
        id
    }

    /// Random interior point at least 50 px from the edges
    fn interior_point(&mut self) -> DVec2 {
        let margin = 50.0;
        DVec2::new(
            crate::random_range(&mut self.rng, margin, self.tuning.width - margin),
            crate::random_range(&mut self.rng, margin, self.tuning.height - margin),
        )
    }

    pub(crate) fn spawn_shield_pickup(&mut self) {
        let id = self.next_entity_id();
        let pos = self.interior_point();
        self.shield_pickup = Some(FieldPickup {
            id,
            body: crate::sim::Body::new(pos, self.tuning.shield_radius),
            kind: PickupKind::Shield,
        });
        log::debug!("Shield pickup at {pos:?}");
    }

    pub(crate) fn spawn_weapon_pickup(&mut self) {
        if self.next_weapon_level > MAX_WEAPON_LEVEL.min(self.tuning.max_weapon_level) {
            return;
        }
        let id = self.next_entity_id();
        let pos = self.interior_point();
        let level = self.next_weapon_level;
        self.weapon_pickup = Some(FieldPickup {
            id,
            body: crate::sim::Body::new(pos, self.tuning.weapon_pickup_radius),
            kind: PickupKind::Weapon(level),
        });
        log::debug!("Weapon {level} pickup at {pos:?}");
    }

    pub fn rock(&self, id: u32) -> Option<&Rock> {
        self.rocks
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|i| &self.rocks[i])
    }

    pub fn active_rocks(&self) -> impl Iterator<Item = &Rock> {
        self.rocks.iter().filter(|r| r.body.active)
    }
}

fn center(tuning: &AsteroidsTuning) -> DVec2 {
    DVec2::new(tuning.width * 0.5, tuning.height * 0.5)
}
