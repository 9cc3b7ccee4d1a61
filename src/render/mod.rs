//! Render contract
//!
//! A simulation describes what is on screen by filling a [`RenderFrame`];
//! the host draws it however it likes (canvas, GPU, terminal). Frames are
//! read-only snapshots and carry no references into game state.

pub mod instance;

pub use instance::{ParticleInstance, colors, pack_rgba};

use glam::DVec2;
use serde::Serialize;

use crate::sim::{ParticleSystem, Phase};

/// A world-space primitive
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Circle {
        center: [f32; 2],
        radius: f32,
        color: [f32; 4],
        filled: bool,
    },
    /// Closed outline through world-space vertices
    Polygon {
        points: Vec<[f32; 2]>,
        color: [f32; 4],
    },
    Rect {
        origin: [f32; 2],
        size: [f32; 2],
        color: [f32; 4],
    },
    Line {
        from: [f32; 2],
        to: [f32; 2],
        width: f32,
        color: [f32; 4],
    },
    /// Crosshair at an aim point
    Marker {
        center: [f32; 2],
        size: f32,
        color: [f32; 4],
    },
    /// Floating score text; formatting is up to the host
    Popup {
        position: [f32; 2],
        points: u64,
        multiplier: u32,
        alpha: f32,
    },
}

/// Heads-up values; formatting is up to the host
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub high_score: u64,
    pub elapsed: f64,
    pub phase: Phase,
    /// Highest owned weapon (asteroids)
    pub weapon_level: Option<u8>,
    pub shielded: bool,
    /// Bases still standing (defense)
    pub bases_remaining: Option<u32>,
    /// Seconds left on a meteor freeze (defense)
    pub freeze_remaining: f64,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderFrame {
    pub width: f32,
    pub height: f32,
    pub shapes: Vec<Shape>,
    pub particles: Vec<ParticleInstance>,
    pub hud: Hud,
}

impl RenderFrame {
    /// Reset for reuse, keeping allocations
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.particles.clear();
        self.hud = Hud::default();
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn circle(&mut self, center: DVec2, radius: f64, color: [f32; 4], filled: bool) {
        self.push(Shape::Circle {
            center: point(center),
            radius: radius as f32,
            color,
            filled,
        });
    }

    pub fn line(&mut self, from: DVec2, to: DVec2, width: f64, color: [f32; 4]) {
        self.push(Shape::Line {
            from: point(from),
            to: point(to),
            width: width as f32,
            color,
        });
    }

    /// Local-space outline rotated and translated into the world
    pub fn outline(&mut self, outline: &[DVec2], pos: DVec2, rotation: f64, color: [f32; 4]) {
        let points = transform_outline(outline, pos, rotation);
        self.push(Shape::Polygon { points, color });
    }

    /// Append live particles with their fade alpha
    pub fn particles_from(&mut self, system: &ParticleSystem) {
        self.particles.extend(system.iter().map(|p| {
            ParticleInstance::new(
                p.pos.x as f32,
                p.pos.y as f32,
                p.size as f32,
                p.alpha() as f32,
                p.color,
            )
        }));
    }

    /// Serialize for a JS renderer
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Something that can present a frame
pub trait Renderer {
    fn draw(&mut self, frame: &RenderFrame);
}

/// Discards frames (headless runs)
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
}

impl Renderer for NullRenderer {
    fn draw(&mut self, _frame: &RenderFrame) {
        self.frames += 1;
    }
}

#[inline]
pub fn point(v: DVec2) -> [f32; 2] {
    [v.x as f32, v.y as f32]
}

/// Rotate local vertices by `rotation` and move them to `pos`
pub fn transform_outline(outline: &[DVec2], pos: DVec2, rotation: f64) -> Vec<[f32; 2]> {
    let rot = DVec2::from_angle(rotation);
    outline.iter().map(|v| point(pos + rot.rotate(*v))).collect()
}
