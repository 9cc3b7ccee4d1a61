//! Sky pickups and the per-round configuration they modify

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::random_range;
use crate::sim::{Body, Collidable, EntityKind};
use crate::tuning::DefenseTuning;

/// Effect granted when a friendly blast catches a pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUp {
    /// Blast radius ×1.1
    BlastRadius,
    /// Show meteor trajectories
    Trajectory,
    /// Launcher cooldown ×0.75
    CooldownReduction,
    /// Destroy every meteor on screen
    MeteorDestroyer,
    /// Rebuild one destroyed launcher
    LauncherRepair,
    /// Stop meteors for a few seconds
    TimeFreeze,
}

impl PowerUp {
    pub const ALL: [PowerUp; 6] = [
        PowerUp::BlastRadius,
        PowerUp::Trajectory,
        PowerUp::CooldownReduction,
        PowerUp::MeteorDestroyer,
        PowerUp::LauncherRepair,
        PowerUp::TimeFreeze,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerUp::BlastRadius => "explosion_radius",
            PowerUp::Trajectory => "trajectory",
            PowerUp::CooldownReduction => "cooldown_reduction",
            PowerUp::MeteorDestroyer => "asteroid_destroyer",
            PowerUp::LauncherRepair => "launcher_repair",
            PowerUp::TimeFreeze => "time_freeze",
        }
    }
}

/// Pickup drifting horizontally across the sky
#[derive(Debug, Clone, PartialEq)]
pub struct SkyPickup {
    pub id: u32,
    pub body: Body,
    pub kind: PowerUp,
}

impl SkyPickup {
    /// Enter from a random side at a random height inside the pickup band
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, id: u32, tuning: &DefenseTuning) -> Self {
        let radius = tuning.pickup_radius;
        let direction = if rng.random::<bool>() { 1.0 } else { -1.0 };
        let x = if direction > 0.0 { -radius } else { tuning.width + radius };
        let y = random_range(rng, tuning.pickup_min_y, tuning.pickup_max_y);
        let mut body = Body::new(DVec2::new(x, y), radius).with_velocity(DVec2::new(tuning.pickup_speed * direction, 0.0));
        body.rotation_vel = std::f64::consts::PI;
        Self {
            id,
            body,
            kind: PowerUp::random(rng),
        }
    }

    /// Drift and spin; true once it has left the playfield
    pub fn update(&mut self, dt: f64, width: f64) -> bool {
        self.body.pos += self.body.vel * dt;
        self.body.rotation += self.body.rotation_vel * dt;
        let r = self.body.radius;
        self.body.pos.x < -r || self.body.pos.x > width + r
    }
}

impl Collidable for SkyPickup {
    fn id(&self) -> u32 {
        self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Pickup
    }

    fn body(&self) -> &Body {
        &self.body
    }
}

/// Round-scoped values that pickups change; rebuilt from tuning each round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    pub blast_radius: f64,
    pub launcher_cooldown: f64,
    pub show_trajectory: bool,
    /// Seconds of meteor freeze left
    pub freeze_remaining: f64,
}

impl RunConfig {
    pub fn from_tuning(tuning: &DefenseTuning) -> Self {
        Self {
            blast_radius: tuning.blast.max_radius,
            launcher_cooldown: tuning.launcher_cooldown,
            show_trajectory: false,
            freeze_remaining: 0.0,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_remaining > 0.0
    }

    /// Count the freeze down
    pub fn update(&mut self, dt: f64) {
        if self.freeze_remaining > 0.0 {
            self.freeze_remaining = (self.freeze_remaining - dt).max(0.0);
        }
    }

    /// Apply the config-only part of a power-up (the rest needs the whole game)
    pub fn apply(&mut self, power_up: PowerUp, tuning: &DefenseTuning) {
        match power_up {
            PowerUp::BlastRadius => self.blast_radius *= tuning.blast_growth,
            PowerUp::Trajectory => self.show_trajectory = true,
            PowerUp::CooldownReduction => self.launcher_cooldown *= tuning.cooldown_factor,
            PowerUp::TimeFreeze => self.freeze_remaining = tuning.freeze_secs,
            PowerUp::MeteorDestroyer | PowerUp::LauncherRepair => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_pickup_crosses_and_leaves() {
        let tuning = DefenseTuning::default();
        let mut rng = Pcg32::seed_from_u64(4);
        let mut pickup = SkyPickup::spawn(&mut rng, 1, &tuning);
        assert!((150.0..400.0).contains(&pickup.body.pos.y));
        assert_eq!(pickup.body.speed(), 100.0);

        let mut ticks = 0;
        while !pickup.update(1.0 / 60.0, tuning.width) {
            ticks += 1;
            assert!(ticks < 60 * 20);
        }
        // 980 px at 100 px/s
        assert!(ticks > 60 * 9);
    }

    #[test]
    fn test_run_config_effects_compound() {
        let tuning = DefenseTuning::default();
        let mut run = RunConfig::from_tuning(&tuning);
        run.apply(PowerUp::BlastRadius, &tuning);
        run.apply(PowerUp::BlastRadius, &tuning);
        assert!((run.blast_radius - 60.5).abs() < 1e-9);

        run.apply(PowerUp::CooldownReduction, &tuning);
        assert!((run.launcher_cooldown - 0.75).abs() < 1e-9);

        run.apply(PowerUp::Trajectory, &tuning);
        assert!(run.show_trajectory);

        run.apply(PowerUp::TimeFreeze, &tuning);
        assert!(run.is_frozen());
        run.update(5.0);
        assert!(!run.is_frozen());
    }

    #[test]
    fn test_fresh_round_resets_config() {
        let tuning = DefenseTuning::default();
        let mut run = RunConfig::from_tuning(&tuning);
        run.apply(PowerUp::BlastRadius, &tuning);
        assert_eq!(RunConfig::from_tuning(&tuning).blast_radius, 50.0);
    }

    #[test]
    fn test_random_covers_all_kinds() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(PowerUp::random(&mut rng));
        }
        assert_eq!(seen.len(), PowerUp::ALL.len());
    }
}
