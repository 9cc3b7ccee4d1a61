//! Asteroids fixed timestep tick
//!
//! Order inside `Playing`: drop dead entities, steer and fire, move, bounce
//! rocks, spawn, rebuild the broad phase, then resolve hits.

use std::f64::consts::PI;

use super::hero::{BulletFate, PickupKind};
use super::rock::Rock;
use super::state::{AsteroidsGame, EDGE_SPARKS, FRAGMENT_PARTICLES, HIT_PARTICLES};
use crate::game_loop::Simulation;
use crate::render::{RenderFrame, colors};
use crate::sim::{
    BurstStyle, Collidable, EntityKind, GameEvent, Phase, TickInput, exploding_finished,
    resolve_bounce,
};
use crate::{from_angle, random_range};

/// Exhaust leaves the ship this far behind its centre
const EXHAUST_OFFSET: f64 = 15.0;
/// Exhaust cone half-angle (radians)
const EXHAUST_SPREAD: f64 = 0.8;
/// Spin given to rocks after they bounce off each other
const BOUNCE_SPIN: f64 = 0.5;

/// Advance the asteroids game by one fixed timestep
pub fn tick(game: &mut AsteroidsGame, input: &TickInput, dt: f64) {
    game.backdrop.update(dt, game.tuning.width, game.tuning.height);

    match game.phase {
        Phase::Welcome | Phase::Instructions | Phase::GameOver => {
            if input.confirm {
                match game.phase.on_confirm() {
                    Some(Phase::Playing) => game.start_round(),
                    Some(next) => game.phase = next,
                    None => {}
                }
            }
        }
        Phase::Exploding => {
            game.particles.update(dt);
            game.exploding_time += dt;
            if exploding_finished(game.exploding_time, game.particles.is_empty()) {
                game.phase = Phase::GameOver;
                log::info!("Game over");
            }
        }
        Phase::Playing => play(game, input, dt),
    }
}

fn play(game: &mut AsteroidsGame, input: &TickInput, dt: f64) {
    let (width, height) = (game.tuning.width, game.tuning.height);

    game.rocks.retain(|r| r.body.active);
    game.bullets.retain(|b| b.body.active);
    game.elapsed += dt;
    let now = game.elapsed;

    // Hero
    game.hero.steer(input, &game.tuning);
    if input.fire && game.hero.body.active {
        for shot in game.hero.fire(now, game.tuning.bullet_speed) {
            game.spawn_bullet(shot);
        }
    }
    game.hero.update(dt, width, height);
    if game.hero.thrusting && game.settings.engine_trail {
        let rotation = game.hero.body.rotation;
        let origin = game.hero.body.pos - from_angle(rotation) * EXHAUST_OFFSET;
        let spread = random_range(&mut game.rng, -EXHAUST_SPREAD, EXHAUST_SPREAD);
        let dir = from_angle(rotation + PI + spread);
        game.particles
            .emit(&mut game.rng, origin, dir, &BurstStyle::exhaust(colors::EXHAUST));
    }

    // Bullets
    for bullet in game.bullets.iter_mut() {
        if bullet.update(dt, width, height) == BulletFate::HitEdge {
            game.particles.burst(
                &mut game.rng,
                bullet.body.pos,
                EDGE_SPARKS,
                &BurstStyle::spark(colors::BULLET),
            );
        }
    }

    // Rocks
    for rock in game.rocks.iter_mut() {
        rock.body.update(dt, width, height);
    }
    bounce_rocks(game);

    // Spawning
    if game.rock_spawner.advance(dt) {
        game.spawn_edge_rock();
    }
    let shield_allowed = game.shield_pickup.is_none() && !game.hero.shield;
    if game.shield_timer.advance(dt, shield_allowed) {
        game.spawn_shield_pickup();
    }
    let weapon_allowed = game.weapon_pickup.is_none()
        && game.next_weapon_level <= game.tuning.max_weapon_level;
    if game.weapon_timer.advance(dt, weapon_allowed) {
        game.spawn_weapon_pickup();
    }

    rebuild_grid(game);
    bullet_hits(game);
    hero_hits(game);

    game.particles.update(dt);
}

/// Split-borrow two distinct rocks, `i < j`
fn pair_mut(rocks: &mut [Rock], i: usize, j: usize) -> (&mut Rock, &mut Rock) {
    let (left, right) = rocks.split_at_mut(j);
    (&mut left[i], &mut right[0])
}

fn rock_index(rocks: &[Rock], id: u32) -> Option<usize> {
    rocks.binary_search_by_key(&id, |r| r.id).ok()
}

/// Rock-rock bounces found through the grid
fn bounce_rocks(game: &mut AsteroidsGame) {
    game.grid.clear();
    for rock in &game.rocks {
        game.grid.insert_collidable(rock);
    }

    let mut pairs = Vec::new();
    for (i, rock) in game.rocks.iter().enumerate() {
        if !rock.body.active {
            continue;
        }
        for other in game.grid.query_collidable(rock) {
            if other.kind != EntityKind::Rock || other.id <= rock.id {
                continue;
            }
            if let Some(j) = rock_index(&game.rocks, other.id) {
                pairs.push((i, j));
            }
        }
    }

    for (i, j) in pairs {
        let (a, b) = pair_mut(&mut game.rocks, i, j);
        if !a.body.collides_with(&b.body) {
            continue;
        }
        if resolve_bounce(&mut a.body, &mut b.body, &game.tuning.collision) {
            a.body.rotation_vel = random_range(&mut game.rng, -BOUNCE_SPIN, BOUNCE_SPIN);
            b.body.rotation_vel = random_range(&mut game.rng, -BOUNCE_SPIN, BOUNCE_SPIN);
        }
    }
}

fn rebuild_grid(game: &mut AsteroidsGame) {
    game.grid.clear();
    game.grid.insert_collidable(&game.hero);
    for rock in &game.rocks {
        game.grid.insert_collidable(rock);
    }
    for bullet in &game.bullets {
        game.grid.insert_collidable(bullet);
    }
    if let Some(pickup) = &game.shield_pickup {
        game.grid.insert_collidable(pickup);
    }
    if let Some(pickup) = &game.weapon_pickup {
        game.grid.insert_collidable(pickup);
    }
}

/// Break rock `index`, spawning fragments with explosion effects
fn break_rock(game: &mut AsteroidsGame, index: usize) -> Vec<Rock> {
    let next_id = &mut game.next_id;
    let rock = &mut game.rocks[index];
    let origin = rock.body.pos;
    let fragments = rock.split(&mut game.rng, game.tuning.rock_speed, || {
        let id = *next_id;
        *next_id += 1;
        id
    });

    game.particles.burst(
        &mut game.rng,
        origin,
        HIT_PARTICLES,
        &BurstStyle::explosion(colors::ROCK),
    );
    for fragment in &fragments {
        game.particles.burst(
            &mut game.rng,
            fragment.body.pos,
            FRAGMENT_PARTICLES,
            &BurstStyle::explosion(colors::ROCK),
        );
    }
    fragments
}

fn bullet_hits(game: &mut AsteroidsGame) {
    let mut fragments = Vec::new();
    for b in 0..game.bullets.len() {
        if !game.bullets[b].body.active {
            continue;
        }
        for other in game.grid.query_collidable(&game.bullets[b]) {
            if other.kind != EntityKind::Rock {
                continue;
            }
            let Some(r) = rock_index(&game.rocks, other.id) else {
                continue;
            };
            let rock = &game.rocks[r];
            if !rock.body.active || !game.bullets[b].body.collides_with(&rock.body) {
                continue;
            }

            game.bullets[b].body.destroy();
            game.score += rock.size.points();
            fragments.extend(break_rock(game, r));
            break;
        }
    }
    game.rocks.extend(fragments);
}

fn hero_hits(game: &mut AsteroidsGame) {
    if !game.hero.body.active {
        return;
    }
    let now = game.elapsed;
    let mut fragments = Vec::new();

    for other in game.grid.query_collidable(&game.hero) {
        match other.kind {
            EntityKind::Rock => {
                let Some(r) = rock_index(&game.rocks, other.id) else {
                    continue;
                };
                let rock = &game.rocks[r];
                if !rock.body.active || !game.hero.body.collides_with(&rock.body) {
                    continue;
                }
                if game.hero.shield {
                    game.hero.shield = false;
                    game.hero.make_invincible(now, game.tuning.invincibility_secs);
                    game.shield_timer.restart();
                    game.score += rock.size.shield_points();
                    fragments.extend(break_rock(game, r));
                    log::debug!("Shield absorbed rock {}", other.id);
                } else if !game.hero.is_invincible(now) {
                    game.end_round();
                    return;
                }
            }
            EntityKind::ShieldPickup => {
                let touching = game
                    .shield_pickup
                    .as_ref()
                    .is_some_and(|p| p.id == other.id && game.hero.body.collides_with(&p.body));
                if touching {
                    game.hero.shield = true;
                    game.shield_pickup = None;
                    log::debug!("Shield collected");
                }
            }
            EntityKind::WeaponPickup => {
                let level = game.weapon_pickup.as_ref().and_then(|p| match p.kind {
                    PickupKind::Weapon(level)
                        if p.id == other.id && game.hero.body.collides_with(&p.body) =>
                    {
                        Some(level)
                    }
                    _ => None,
                });
                if let Some(level) = level {
                    game.hero.upgrade_weapon(level);
                    game.weapon_pickup = None;
                    game.next_weapon_level += 1;
                    game.weapon_timer.restart();
                    log::debug!("Weapon {level} collected");
                }
            }
            _ => {}
        }
    }
    game.rocks.extend(fragments);
}

/// Fill a render frame from the current state
pub fn render(game: &AsteroidsGame, frame: &mut RenderFrame) {
    frame.width = game.tuning.width as f32;
    frame.height = game.tuning.height as f32;
    frame.hud.score = game.score;
    frame.hud.high_score = game.high_score.max(game.score);
    frame.hud.elapsed = game.elapsed;
    frame.hud.phase = game.phase;
    frame.hud.weapon_level = Some(game.hero.best_weapon());
    frame.hud.shielded = game.hero.shield;

    for rock in &game.backdrop.rocks {
        frame.outline(&rock.outline, rock.body.pos, rock.body.rotation, colors::BACKDROP_ROCK);
    }
    if matches!(game.phase, Phase::Welcome | Phase::Instructions) {
        return;
    }

    if let Some(pickup) = &game.shield_pickup {
        frame.circle(pickup.body.pos, pickup.body.radius, colors::SHIELD, false);
    }
    if let Some(pickup) = &game.weapon_pickup {
        frame.circle(pickup.body.pos, pickup.body.radius, colors::WEAPON_PICKUP, false);
    }
    for rock in game.active_rocks() {
        frame.outline(&rock.outline, rock.body.pos, rock.body.rotation, colors::ROCK);
    }
    for bullet in game.bullets.iter().filter(|b| b.body.active) {
        frame.circle(bullet.body.pos, bullet.body.radius, colors::BULLET, true);
    }

    let hero = &game.hero;
    if hero.body.active {
        let mut color = colors::HERO;
        if hero.is_invincible(game.elapsed) {
            color[3] = ((game.elapsed * 20.0).sin() * 0.5 + 0.5) as f32;
        }
        frame.outline(&HERO_SHAPE, hero.body.pos, hero.body.rotation, color);
        if hero.shield {
            frame.circle(hero.body.pos, hero.body.radius + 10.0, colors::SHIELD, false);
        }
    }

    frame.particles_from(&game.particles);
}

/// Ship triangle, nose along +X
const HERO_SHAPE: [glam::DVec2; 3] = [
    glam::DVec2::new(20.0, 0.0),
    glam::DVec2::new(-10.0, 10.0),
    glam::DVec2::new(-10.0, -10.0),
];

impl Simulation for AsteroidsGame {
    fn tick(&mut self, input: &TickInput, dt: f64) {
        tick(self, input, dt);
    }

    fn render(&self, frame: &mut RenderFrame) {
        render(self, frame);
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn set_high_score(&mut self, high_score: u64) {
        self.high_score = high_score;
    }
}
