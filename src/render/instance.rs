//! GPU/JS-friendly instance types

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

/// One particle, laid out for direct buffer upload
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    pub size: f32,
    pub alpha: f32,
    /// RGBA8, red in the lowest byte
    pub color: u32,
}

impl ParticleInstance {
    pub fn new(x: f32, y: f32, size: f32, alpha: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            size,
            alpha,
            color: pack_rgba(color),
        }
    }
}

/// Pack a float colour into RGBA8 (red in the lowest byte)
pub fn pack_rgba(color: [f32; 4]) -> u32 {
    let [r, g, b, a] = color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u32);
    r | (g << 8) | (b << 16) | (a << 24)
}

/// Colors for game elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    pub const HERO: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const HERO_EXPLOSION: [f32; 4] = [1.0, 0.84, 0.0, 1.0]; // Gold
    pub const SHIELD: [f32; 4] = [0.0, 0.6, 1.0, 1.0];
    pub const ROCK: [f32; 4] = [0.8, 0.8, 0.8, 1.0];
    pub const BACKDROP_ROCK: [f32; 4] = [0.2, 0.2, 0.2, 1.0];
    pub const BULLET: [f32; 4] = [1.0, 1.0, 0.4, 1.0];
    pub const WEAPON_PICKUP: [f32; 4] = [1.0, 0.4, 1.0, 1.0];
    pub const EXHAUST: [f32; 4] = [1.0, 0.55, 0.1, 1.0];

    // Neon defense palette
    pub const PRIMARY: [f32; 4] = [0.0, 1.0, 1.0, 1.0]; // Cyan
    pub const SECONDARY: [f32; 4] = [0.0, 0.53, 1.0, 1.0];
    pub const DANGER: [f32; 4] = [1.0, 0.0, 0.53, 1.0]; // Pink
    pub const SUCCESS: [f32; 4] = [0.0, 1.0, 0.53, 1.0];
    pub const EXPLOSION: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BASE: [f32; 4] = [1.0, 0.73, 0.0, 1.0]; // Golden yellow
    pub const FREEZE: [f32; 4] = [0.53, 0.87, 1.0, 1.0];
    pub const GROUND: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_rgba() {
        assert_eq!(pack_rgba([1.0, 0.0, 0.0, 1.0]), 0xFF00_00FF);
        assert_eq!(pack_rgba([0.0, 0.0, 1.0, 0.0]), 0x00FF_0000);
        assert_eq!(pack_rgba([2.0, -1.0, 0.0, 1.0]), 0xFF00_00FF);
    }

    #[test]
    fn test_instance_is_plain_bytes() {
        let instances = [ParticleInstance::new(1.0, 2.0, 3.0, 0.5, colors::BULLET); 4];
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), 4 * std::mem::size_of::<ParticleInstance>());
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 20);
    }
}
