//! Shared simulation engine
//!
//! Both games are built from these pieces. Everything here is deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod grid;
pub mod input;
pub mod particles;
pub mod phase;
pub mod spawn;

pub use collision::{
    CollisionTuning, Contact, MassWeighting, Rect, circle_contact, circle_rect_overlap,
    circles_overlap, fragment_layout, resolve_bounce,
};
pub use entity::{Body, Collidable, EntityKind, EntityRef, jagged_outline};
pub use grid::SpatialGrid;
pub use input::TickInput;
pub use particles::{BurstStyle, Particle, ParticleSystem};
pub use phase::{GameEvent, Phase, exploding_finished};
pub use spawn::{
    DifficultyLadder, IntervalTimer, LadderTuning, RampTuning, SpawnRamp, pick_weighted,
};
