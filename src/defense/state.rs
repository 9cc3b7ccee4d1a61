//! Missile defense game state

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::effects::{Blast, Missile, ScorePopup, TargetMarker};
use super::meteor::{Meteor, choose_target};
use super::pickups::{RunConfig, SkyPickup};
use super::structures::{Base, Launcher, layout_structures};
use crate::render::colors;
use crate::settings::Settings;
use crate::sim::{BurstStyle, DifficultyLadder, GameEvent, IntervalTimer, ParticleSystem, Phase, Rect, SpatialGrid};
use crate::tuning::DefenseTuning;

/// Particles when a blast destroys a meteor
pub const METEOR_PARTICLES: usize = 20;
/// Grid spacing of de-res particles over a structure (px)
const DE_RES_SPACING: f64 = 6.0;

/// Complete missile defense game
#[derive(Debug, Clone)]
pub struct DefenseGame {
    pub tuning: DefenseTuning,
    pub settings: Settings,
    pub phase: Phase,
    pub(crate) rng: Pcg32,

    // ── Round state ─────────────────────────────────────────────────────────
    pub score: u64,
    pub elapsed: f64,
    pub(crate) exploding_time: f64,
    pub run: RunConfig,
    pub launchers: Vec<Launcher>,
    pub bases: Vec<Base>,
    /// Sorted by id
    pub meteors: Vec<Meteor>,
    pub missiles: Vec<Missile>,
    pub blasts: Vec<Blast>,
    pub pickups: Vec<SkyPickup>,
    pub markers: Vec<TargetMarker>,
    pub popups: Vec<ScorePopup>,
    pub particles: ParticleSystem,
    pub(crate) grid: SpatialGrid,
    pub(crate) difficulty: DifficultyLadder,
    pub(crate) pickup_timer: IntervalTimer,

    pub high_score: u64,
    pub(crate) events: Vec<GameEvent>,
    next_id: u32,
}

impl DefenseGame {
    pub fn new(seed: u64, tuning: DefenseTuning, settings: Settings) -> Self {
        let mut game = Self {
            phase: Phase::Welcome,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            elapsed: 0.0,
            exploding_time: 0.0,
            run: RunConfig::from_tuning(&tuning),
            launchers: Vec::new(),
            bases: Vec::new(),
            meteors: Vec::new(),
            missiles: Vec::new(),
            blasts: Vec::new(),
            pickups: Vec::new(),
            markers: Vec::new(),
            popups: Vec::new(),
            particles: ParticleSystem::new(settings.max_particles()),
            grid: SpatialGrid::new(tuning.grid_cell_size),
            difficulty: DifficultyLadder::new(&tuning.difficulty),
            pickup_timer: IntervalTimer::new(tuning.pickup_interval),
            high_score: 0,
            events: Vec::new(),
            next_id: 1,
            tuning,
            settings,
        };
        game.build_structures();
        game
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn build_structures(&mut self) {
        let next_id = &mut self.next_id;
        let (launchers, bases) = layout_structures(&self.tuning, || {
            let id = *next_id;
            *next_id += 1;
            id
        });
        self.launchers = launchers;
        self.bases = bases;
    }

    /// Reset every per-round value and enter `Playing`
    pub fn start_round(&mut self) {
        self.score = 0;
        self.elapsed = 0.0;
        self.exploding_time = 0.0;
        self.run = RunConfig::from_tuning(&self.tuning);
        self.build_structures();
        self.meteors.clear();
        self.missiles.clear();
        self.blasts.clear();
        self.pickups.clear();
        self.markers.clear();
        self.popups.clear();
        self.particles.clear();
        self.grid.clear();
        self.difficulty = DifficultyLadder::new(&self.tuning.difficulty);
        self.pickup_timer = IntervalTimer::new(self.tuning.pickup_interval);
        self.phase = Phase::Playing;
        self.events.push(GameEvent::RoundStarted);
        log::info!("Defense round started");
    }

    /// Last base lost: dissolve what is left and enter `Exploding`
    pub fn end_round(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        self.phase = Phase::Exploding;
        self.exploding_time = 0.0;

        let remaining: Vec<Rect> = self
            .launchers
            .iter()
            .filter(|l| !l.destroyed)
            .map(Launcher::bounds)
            .collect();
        for rect in remaining {
            self.de_res(rect, colors::PRIMARY);
        }
        for launcher in self.launchers.iter_mut() {
            launcher.destroy();
        }
        let meteor_positions: Vec<DVec2> = self.meteors.iter().filter(|m| m.body.active).map(|m| m.body.pos).collect();
        for pos in meteor_positions {
            self.explode_at(pos, colors::DANGER);
        }

        self.meteors.clear();
        self.missiles.clear();
        self.blasts.clear();
        self.pickups.clear();
        self.markers.clear();

        self.events.push(GameEvent::RoundEnded { score: self.score });
        log::info!(
            "Defense round over: score {} after {:.1}s",
            self.score,
            self.elapsed
        );
    }

    /// Add a meteor at `pos` aimed at `target` with the current ramp speed
    pub fn spawn_meteor(&mut self, pos: DVec2, target: DVec2) -> u32 {
        let id = self.next_entity_id();
        let speed = self.difficulty.speed();
        let meteor = Meteor::new(&mut self.rng, id, pos, target, speed, self.tuning.meteor_radius);
        self.meteors.push(meteor);
        id
    }

    /// Meteor from a random point on the top edge, aimed by weighted targeting
    pub(crate) fn spawn_sky_meteor(&mut self) {
        let t = &self.tuning;
        let x = crate::random_range(&mut self.rng, 0.0, t.width);
        let target = choose_target(
            &mut self.rng,
            &self.launchers,
            &self.bases,
            t.launcher_weight,
            t.base_weight,
            t.width,
            t.ground_level,
        );
        let id = self.spawn_meteor(DVec2::new(x, 0.0), target);
        log::debug!("Spawned meteor {id} aimed at {target:?}");
    }

    pub(crate) fn spawn_pickup(&mut self) {
        let id = self.next_entity_id();
        let pickup = SkyPickup::spawn(&mut self.rng, id, &self.tuning);
        log::debug!("Pickup {} at {:?}", pickup.kind.label(), pickup.body.pos);
        self.pickups.push(pickup);
    }

    /// Start an explosion; friendly ones use the round's blast radius
    pub fn spawn_blast(&mut self, pos: DVec2, hostile: bool) -> u32 {
        let id = self.next_entity_id();
        let max_radius = if hostile {
            self.tuning.blast.max_radius
        } else {
            self.run.blast_radius
        };
        self.blasts.push(Blast::new(id, pos, max_radius, hostile, &self.tuning.blast));
        id
    }

    /// Player aim: the nearest ready launcher fires at `target`.
    ///
    /// Points at or below the ground are ignored. Returns the missile id.
    pub fn fire_at(&mut self, target: DVec2) -> Option<u32> {
        if target.y >= self.tuning.ground_level {
            return None;
        }
        let cooldown = self.run.launcher_cooldown;
        let origin = self
            .launchers
            .iter_mut()
            .filter(|l| l.can_launch())
            .min_by(|a, b| {
                let da = a.anchor().distance_squared(target);
                let db = b.anchor().distance_squared(target);
                da.total_cmp(&db)
            })
            .and_then(|l| l.launch(cooldown));

        self.markers.push(TargetMarker {
            pos: target,
            valid: origin.is_some(),
            expires_at: self.elapsed + self.tuning.marker_secs,
        });

        let origin = origin?;
        let id = self.next_entity_id();
        self.missiles
            .push(Missile::new(id, origin, target, self.tuning.missile_speed));
        Some(id)
    }

    pub fn meteor(&self, id: u32) -> Option<&Meteor> {
        self.meteors
            .binary_search_by_key(&id, |m| m.id)
            .ok()
            .map(|i| &self.meteors[i])
    }

    pub fn active_meteors(&self) -> impl Iterator<Item = &Meteor> {
        self.meteors.iter().filter(|m| m.body.active)
    }

    pub fn bases_remaining(&self) -> u32 {
        self.bases.iter().filter(|b| b.is_alive()).count() as u32
    }

    pub(crate) fn explode_at(&mut self, pos: DVec2, color: [f32; 4]) {
        self.particles
            .burst(&mut self.rng, pos, METEOR_PARTICLES, &BurstStyle::explosion(color));
    }

    /// Dissolve a rectangle into rising pixels
    pub(crate) fn de_res(&mut self, rect: Rect, color: [f32; 4]) {
        let style = BurstStyle::de_res(color);
        let mut x = rect.x;
        while x < rect.right() {
            let mut y = rect.y;
            while y < rect.bottom() {
                self.particles
                    .emit(&mut self.rng, DVec2::new(x, y), DVec2::NEG_Y, &style);
                y += DE_RES_SPACING;
            }
            x += DE_RES_SPACING;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> DefenseGame {
        let mut game = DefenseGame::new(5, DefenseTuning::default(), Settings::default());
        game.start_round();
        game
    }

    #[test]
    fn test_fire_picks_nearest_ready_launcher() {
        let mut game = playing();
        let left = game.launchers[0].x;
        let id = game.fire_at(DVec2::new(left + 10.0, 300.0));
        assert!(id.is_some());
        assert!(!game.launchers[0].can_launch());
        assert!(game.launchers[1].can_launch());
        assert_eq!(game.missiles[0].origin, DVec2::new(left, 665.0));
        assert!(game.markers[0].valid);

        // Left one reloading: the middle launcher takes the next shot
        game.fire_at(DVec2::new(left + 10.0, 300.0));
        assert!(!game.launchers[1].can_launch());
        assert_eq!(game.missiles.len(), 2);
    }

    #[test]
    fn test_fire_below_ground_ignored() {
        let mut game = playing();
        assert!(game.fire_at(DVec2::new(300.0, 700.0)).is_none());
        assert!(game.markers.is_empty());
        assert!(game.launchers.iter().all(Launcher::can_launch));
    }

    #[test]
    fn test_fire_without_launchers_leaves_invalid_marker() {
        let mut game = playing();
        for launcher in game.launchers.iter_mut() {
            launcher.destroy();
        }
        assert!(game.fire_at(DVec2::new(300.0, 300.0)).is_none());
        assert_eq!(game.markers.len(), 1);
        assert!(!game.markers[0].valid);
    }

    #[test]
    fn test_start_round_rebuilds_everything() {
        let mut game = playing();
        game.bases[0].hp = 0;
        game.launchers[0].destroy();
        game.run.blast_radius = 99.0;
        game.score = 50;
        game.start_round();
        assert_eq!(game.bases_remaining(), 6);
        assert!(!game.launchers[0].destroyed);
        assert_eq!(game.run.blast_radius, 50.0);
        assert_eq!(game.score, 0);
    }

    #[test]
    fn test_end_round_event() {
        let mut game = playing();
        game.events.clear();
        game.score = 120;
        game.end_round();
        assert_eq!(game.phase, Phase::Exploding);
        assert_eq!(game.events, vec![GameEvent::RoundEnded { score: 120 }]);
        assert!(!game.particles.is_empty());
        // Only once
        game.end_round();
        assert_eq!(game.events.len(), 1);
    }
}
