//! Ground structures: missile launchers and the bases they protect

use glam::DVec2;

use crate::sim::{Rect, circle_rect_overlap};
use crate::tuning::DefenseTuning;

/// Structure slots along the ground, left to right
pub const STRUCTURE_SLOTS: usize = 9;

/// Missile launcher; shrinks while reloading and grows back when ready
#[derive(Debug, Clone, PartialEq)]
pub struct Launcher {
    pub id: u32,
    /// Horizontal centre
    pub x: f64,
    /// Ground line the launcher stands on
    pub ground: f64,
    pub width: f64,
    pub height: f64,
    /// Seconds until the next launch
    pub cooldown: f64,
    /// Cooldown the last launch started with
    pub cooldown_total: f64,
    pub destroyed: bool,
}

impl Launcher {
    pub fn new(id: u32, x: f64, ground: f64, width: f64, height: f64) -> Self {
        Self {
            id,
            x,
            ground,
            width,
            height,
            cooldown: 0.0,
            cooldown_total: 0.0,
            destroyed: false,
        }
    }

    pub fn update(&mut self, dt: f64) {
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
        }
    }

    pub fn can_launch(&self) -> bool {
        !self.destroyed && self.cooldown <= 0.0
    }

    /// Start a reload and return the missile's origin (top centre)
    pub fn launch(&mut self, cooldown: f64) -> Option<DVec2> {
        if !self.can_launch() {
            return None;
        }
        self.cooldown = cooldown.max(0.0);
        self.cooldown_total = self.cooldown;
        Some(DVec2::new(self.x, self.ground - self.height))
    }

    /// Visible height: zero right after a launch, full when ready
    pub fn current_height(&self) -> f64 {
        if self.cooldown_total <= 0.0 {
            return self.height;
        }
        self.height * (1.0 - self.cooldown / self.cooldown_total)
    }

    /// Current bounds; empty once destroyed
    pub fn bounds(&self) -> Rect {
        if self.destroyed {
            return Rect::new(self.x, self.ground, 0.0, 0.0);
        }
        let height = self.current_height();
        Rect::new(self.x - self.width * 0.5, self.ground - height, self.width, height)
    }

    /// Circle test against the bounds' inscribed circle
    pub fn hit_by(&self, center: DVec2, radius: f64) -> bool {
        if self.destroyed {
            return false;
        }
        let bounds = self.bounds();
        let reach = radius + bounds.width.min(bounds.height) * 0.5;
        crate::distance(center, bounds.center()) <= reach
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    /// Bring a destroyed launcher back, loaded
    pub fn repair(&mut self) {
        self.destroyed = false;
        self.cooldown = 0.0;
        self.cooldown_total = 0.0;
    }

    /// Ground position meteors aim at
    pub fn anchor(&self) -> DVec2 {
        DVec2::new(self.x, self.ground)
    }
}

/// A city block; loses height as it takes damage
#[derive(Debug, Clone, PartialEq)]
pub struct Base {
    pub id: u32,
    pub x: f64,
    pub ground: f64,
    pub width: f64,
    pub height: f64,
    pub max_hp: u8,
    pub hp: u8,
}

impl Base {
    pub fn new(id: u32, x: f64, ground: f64, width: f64, height: f64, max_hp: u8) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            id,
            x,
            ground,
            width,
            height,
            max_hp,
            hp: max_hp,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Apply damage; true when this destroyed the base
    pub fn take_damage(&mut self, amount: u8) -> bool {
        let was_alive = self.is_alive();
        self.hp = self.hp.saturating_sub(amount);
        was_alive && !self.is_alive()
    }

    pub fn current_height(&self) -> f64 {
        self.height * f64::from(self.hp) / f64::from(self.max_hp)
    }

    pub fn bounds(&self) -> Rect {
        let height = self.current_height();
        Rect::new(self.x - self.width * 0.5, self.ground - height, self.width, height)
    }

    pub fn hit_by(&self, center: DVec2, radius: f64, tolerance: f64) -> bool {
        self.is_alive() && circle_rect_overlap(center, radius, &self.bounds(), tolerance)
    }
}

/// Lay out the nine structures centred on the playfield.
///
/// Slots 0, 4 and 8 are launchers, the rest are bases; neighbours are
/// `structure_spacing` apart.
pub fn layout_structures(tuning: &DefenseTuning, mut next_id: impl FnMut() -> u32) -> (Vec<Launcher>, Vec<Base>) {
    let is_launcher = |slot: usize| slot % 4 == 0;
    let group_width: f64 = (0..STRUCTURE_SLOTS)
        .map(|slot| {
            if is_launcher(slot) {
                tuning.launcher_width
            } else {
                tuning.base_width
            }
        })
        .sum::<f64>()
        + tuning.structure_spacing * (STRUCTURE_SLOTS - 1) as f64;

    let mut launchers = Vec::new();
    let mut bases = Vec::new();
    let mut x = tuning.width * 0.5 - group_width * 0.5;
    for slot in 0..STRUCTURE_SLOTS {
        if is_launcher(slot) {
            let width = tuning.launcher_width;
            launchers.push(Launcher::new(
                next_id(),
                x + width * 0.5,
                tuning.ground_level,
                width,
                tuning.launcher_height,
            ));
            x += width + tuning.structure_spacing;
        } else {
            let width = tuning.base_width;
            bases.push(Base::new(
                next_id(),
                x + width * 0.5,
                tuning.ground_level,
                width,
                tuning.base_height,
                tuning.base_hp,
            ));
            x += width + tuning.structure_spacing;
        }
    }
    (launchers, bases)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> impl FnMut() -> u32 {
        let mut next = 0;
        move || {
            next += 1;
            next
        }
    }

    #[test]
    fn test_layout_is_centred() {
        let tuning = DefenseTuning::default();
        let (launchers, bases) = layout_structures(&tuning, ids());
        assert_eq!(launchers.len(), 3);
        assert_eq!(bases.len(), 6);

        // 6 * 80 + 3 * 50 + 8 * 20 = 790 wide, centred on 480
        let left = launchers[0].x - 25.0;
        let right = launchers[2].x + 25.0;
        assert!((left - 85.0).abs() < 1e-9);
        assert!((right - 875.0).abs() < 1e-9);
        assert!((launchers[1].x - 480.0).abs() < 1e-9);
    }

    #[test]
    fn test_launcher_cooldown_cycle() {
        let mut launcher = Launcher::new(1, 100.0, 700.0, 50.0, 35.0);
        let origin = launcher.launch(1.0);
        assert_eq!(origin, Some(DVec2::new(100.0, 665.0)));
        assert!(launcher.launch(1.0).is_none());
        assert_eq!(launcher.current_height(), 0.0);

        launcher.update(0.5);
        assert!((launcher.current_height() - 17.5).abs() < 1e-9);
        launcher.update(0.6);
        assert!(launcher.can_launch());
        assert_eq!(launcher.current_height(), 35.0);
    }

    #[test]
    fn test_destroyed_launcher_is_inert() {
        let mut launcher = Launcher::new(1, 100.0, 700.0, 50.0, 35.0);
        launcher.destroy();
        assert!(launcher.launch(1.0).is_none());
        assert!(!launcher.hit_by(DVec2::new(100.0, 690.0), 15.0));
        launcher.repair();
        assert!(launcher.can_launch());
    }

    #[test]
    fn test_base_shrinks_with_damage() {
        let mut base = Base::new(1, 200.0, 700.0, 80.0, 35.0, 3);
        assert!(!base.take_damage(1));
        assert!((base.current_height() - 35.0 * 2.0 / 3.0).abs() < 1e-9);
        assert!(!base.take_damage(1));
        assert!(base.take_damage(1));
        assert!(!base.is_alive());
        // Already dead: no second destruction
        assert!(!base.take_damage(1));
        assert!(!base.hit_by(DVec2::new(200.0, 690.0), 15.0, 1.2));
    }

    #[test]
    fn test_base_hit_uses_tolerance() {
        let base = Base::new(1, 200.0, 700.0, 80.0, 35.0, 3);
        // 15.5 px above the roof: outside r = 15, inside r² * 1.2
        let above = DVec2::new(200.0, 665.0 - 15.5);
        assert!(base.hit_by(above, 15.0, 1.2));
        assert!(!base.hit_by(above, 15.0, 1.0));
    }
}
