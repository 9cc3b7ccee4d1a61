//! Missile defense fixed timestep tick

use glam::DVec2;

use super::effects::{ScorePopup, chain_points};
use super::pickups::PowerUp;
use super::state::DefenseGame;
use super::structures::Base;
use crate::game_loop::Simulation;
use crate::render::{RenderFrame, Shape, colors, point};
use crate::sim::{EntityKind, GameEvent, Phase, Rect, TickInput, exploding_finished};

/// Marker crosshair half-length
const MARKER_SIZE: f64 = 10.0;
const MISSILE_RADIUS: f64 = 2.0;

/// What a meteor ran into this tick
enum Impact {
    Ground(DVec2),
    Base { pos: DVec2, lost: Rect },
    Launcher { pos: DVec2, bounds: Rect },
}

/// Advance the defense game by one fixed timestep
pub fn tick(game: &mut DefenseGame, input: &TickInput, dt: f64) {
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
            game.popups.retain_mut(|p| !p.update(dt));
            game.exploding_time += dt;
            if exploding_finished(game.exploding_time, game.particles.is_empty()) {
                game.phase = Phase::GameOver;
                log::info!("Game over");
            }
        }
        Phase::Playing => play(game, input, dt),
    }
}

fn play(game: &mut DefenseGame, input: &TickInput, dt: f64) {
    game.meteors.retain(|m| m.body.active);
    game.elapsed += dt;
    game.difficulty.advance(dt);

    if let Some(aim) = input.aim {
        game.fire_at(aim);
    }
    for launcher in game.launchers.iter_mut() {
        launcher.update(dt);
    }

    // Spawning pauses while meteors are frozen
    let frozen = game.run.is_frozen();
    if !frozen && game.difficulty.spawn_due(dt) {
        game.spawn_sky_meteor();
    }
    if game.pickup_timer.advance(dt, game.pickups.is_empty()) {
        game.spawn_pickup();
    }

    let mut arrived = Vec::new();
    game.missiles.retain_mut(|m| {
        if m.update(dt) {
            arrived.push(m.pos);
            false
        } else {
            true
        }
    });
    for pos in arrived {
        game.spawn_blast(pos, false);
    }

    move_meteors(game, dt, frozen);

    let width = game.tuning.width;
    game.pickups.retain_mut(|p| !p.update(dt, width));

    update_blasts(game, dt);

    let now = game.elapsed;
    game.markers.retain(|m| m.expires_at > now);
    game.popups.retain_mut(|p| !p.update(dt));
    game.run.update(dt);
    game.particles.update(dt);

    if game.bases.is_empty() {
        game.end_round();
    }
}

fn move_meteors(game: &mut DefenseGame, dt: f64, frozen: bool) {
    let t = &game.tuning;
    let (width, height, ground, tolerance) = (t.width, t.height, t.ground_level, t.rect_tolerance);
    let mut impacts = Vec::new();

    for meteor in game.meteors.iter_mut().filter(|m| m.body.active) {
        if !frozen {
            meteor.advance(dt);
        }
        let (pos, radius) = (meteor.body.pos, meteor.body.radius);

        if meteor.touches_ground(ground) {
            meteor.body.destroy();
            impacts.push(Impact::Ground(DVec2::new(pos.x, ground)));
            continue;
        }
        if meteor.is_off_screen(width, height) {
            meteor.body.destroy();
            continue;
        }

        if let Some(base) = game.bases.iter_mut().find(|b| b.hit_by(pos, radius, tolerance)) {
            let before = base.bounds();
            let lost = Rect::new(before.x, before.y, before.width, base.height / f64::from(base.max_hp));
            if base.take_damage(1) {
                log::info!("Base {} destroyed", base.id);
            }
            meteor.body.destroy();
            impacts.push(Impact::Base { pos, lost });
            continue;
        }

        if let Some(launcher) = game.launchers.iter_mut().find(|l| l.hit_by(pos, radius)) {
            let bounds = launcher.bounds();
            launcher.destroy();
            meteor.body.destroy();
            log::info!("Launcher {} destroyed", launcher.id);
            impacts.push(Impact::Launcher { pos, bounds });
        }
    }

    for impact in impacts {
        match impact {
            Impact::Ground(pos) => {
                game.spawn_blast(pos, true);
            }
            Impact::Base { pos, lost } => {
                game.spawn_blast(pos, true);
                game.de_res(lost, colors::BASE);
            }
            Impact::Launcher { pos, bounds } => {
                game.spawn_blast(pos, true);
                game.de_res(bounds, colors::PRIMARY);
            }
        }
    }
    game.bases.retain(Base::is_alive);
}

fn update_blasts(game: &mut DefenseGame, dt: f64) {
    game.grid.clear();
    for meteor in game.meteors.iter().filter(|m| m.body.active) {
        game.grid.insert_collidable(meteor);
    }
    for pickup in &game.pickups {
        game.grid.insert_collidable(pickup);
    }

    let mut kills = Vec::new();
    let mut collected: Vec<(u32, PowerUp, DVec2)> = Vec::new();

    for b in 0..game.blasts.len() {
        if game.blasts[b].update(dt) {
            continue;
        }
        for other in game.grid.query_collidable(&game.blasts[b]) {
            match other.kind {
                EntityKind::Meteor => {
                    let Ok(i) = game.meteors.binary_search_by_key(&other.id, |m| m.id) else {
                        continue;
                    };
                    let meteor = &mut game.meteors[i];
                    let blast = &mut game.blasts[b];
                    if meteor.body.active
                        && blast.reaches(meteor.body.pos, meteor.body.radius)
                        && blast.record_hit(meteor.id)
                    {
                        meteor.body.destroy();
                        kills.push(meteor.body.pos);
                    }
                }
                EntityKind::Pickup if !game.blasts[b].hostile => {
                    if collected.iter().any(|(id, _, _)| *id == other.id) {
                        continue;
                    }
                    let blast = &game.blasts[b];
                    if let Some(pickup) = game
                        .pickups
                        .iter()
                        .find(|p| p.id == other.id && blast.reaches(p.body.pos, p.body.radius))
                    {
                        collected.push((pickup.id, pickup.kind, pickup.body.pos));
                    }
                }
                _ => {}
            }
        }
    }

    // Finished blasts pay out their chain
    let base_points = game.tuning.blast_points;
    let popup_secs = game.tuning.popup_secs;
    for blast in game.blasts.iter().filter(|b| !b.body.active) {
        let points = blast.points(base_points);
        if points > 0 {
            game.score += points;
            game.popups
                .push(ScorePopup::new(blast.body.pos, points, blast.kills(), popup_secs));
            log::debug!("Blast {} chained {} meteors for {points}", blast.id, blast.kills());
        }
    }
    game.blasts.retain(|b| b.body.active);

    for pos in kills {
        game.explode_at(pos, colors::DANGER);
    }
    for (id, kind, pos) in collected {
        game.pickups.retain(|p| p.id != id);
        apply_power_up(game, kind, pos);
    }
}

/// Apply a collected pickup's effect at `pos`
pub fn apply_power_up(game: &mut DefenseGame, kind: PowerUp, pos: DVec2) {
    log::info!("Pickup collected: {}", kind.label());
    game.run.apply(kind, &game.tuning);

    match kind {
        PowerUp::MeteorDestroyer => {
            let mut positions = Vec::new();
            for meteor in game.meteors.iter_mut().filter(|m| m.body.active) {
                meteor.body.destroy();
                positions.push(meteor.body.pos);
            }
            let kills = positions.len() as u32;
            let points = chain_points(game.tuning.blast_points, kills);
            if points > 0 {
                game.score += points;
                game.popups
                    .push(ScorePopup::new(pos, points, kills, game.tuning.popup_secs));
            }
            for p in positions {
                game.explode_at(p, colors::DANGER);
            }
        }
        PowerUp::LauncherRepair => {
            if let Some(launcher) = game.launchers.iter_mut().find(|l| l.destroyed) {
                launcher.repair();
                let bounds = launcher.bounds();
                log::debug!("Launcher {} repaired", launcher.id);
                game.de_res(bounds, colors::SUCCESS);
            }
        }
        _ => {}
    }
}

fn rect_shape(rect: &Rect, color: [f32; 4]) -> Shape {
    Shape::Rect {
        origin: [rect.x as f32, rect.y as f32],
        size: [rect.width as f32, rect.height as f32],
        color,
    }
}

/// Fill a render frame from the current state
pub fn render(game: &DefenseGame, frame: &mut RenderFrame) {
    let t = &game.tuning;
    frame.width = t.width as f32;
    frame.height = t.height as f32;
    frame.hud.score = game.score;
    frame.hud.high_score = game.high_score.max(game.score);
    frame.hud.elapsed = game.elapsed;
    frame.hud.phase = game.phase;
    frame.hud.bases_remaining = Some(game.bases_remaining());
    frame.hud.freeze_remaining = game.run.freeze_remaining;

    if matches!(game.phase, Phase::Welcome | Phase::Instructions) {
        return;
    }

    for marker in &game.markers {
        frame.push(Shape::Marker {
            center: point(marker.pos),
            size: MARKER_SIZE as f32,
            color: if marker.valid { colors::SUCCESS } else { colors::DANGER },
        });
    }
    for base in &game.bases {
        frame.push(rect_shape(&base.bounds(), colors::BASE));
    }
    for launcher in game.launchers.iter().filter(|l| !l.destroyed) {
        let color = if launcher.can_launch() {
            colors::PRIMARY
        } else {
            colors::EXPLOSION
        };
        frame.push(rect_shape(&launcher.bounds(), color));
    }
    for missile in &game.missiles {
        frame.line(missile.origin, missile.pos, MISSILE_RADIUS, colors::SECONDARY);
        frame.circle(missile.pos, MISSILE_RADIUS, colors::PRIMARY, true);
    }

    let mut trajectory = colors::DANGER;
    trajectory[3] = 0.2;
    for meteor in game.active_meteors() {
        if game.run.show_trajectory {
            frame.line(meteor.body.pos, meteor.target, 1.0, trajectory);
        }
        let color = if game.run.is_frozen() { colors::FREEZE } else { colors::DANGER };
        frame.outline(&meteor.outline, meteor.body.pos, meteor.body.rotation, color);
    }
    for blast in &game.blasts {
        let color = if blast.hostile { colors::DANGER } else { colors::EXPLOSION };
        frame.circle(blast.body.pos, blast.body.radius, color, true);
    }
    for pickup in &game.pickups {
        let color = if pickup.kind == PowerUp::TimeFreeze {
            colors::FREEZE
        } else {
            colors::SUCCESS
        };
        frame.circle(pickup.body.pos, pickup.body.radius, color, false);
    }
    for popup in &game.popups {
        frame.push(Shape::Popup {
            position: point(popup.pos),
            points: popup.points,
            multiplier: popup.multiplier,
            alpha: popup.alpha() as f32,
        });
    }

    frame.particles_from(&game.particles);
    frame.line(
        DVec2::new(0.0, t.ground_level),
        DVec2::new(t.width, t.ground_level),
        2.0,
        colors::GROUND,
    );
}

impl Simulation for DefenseGame {
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
