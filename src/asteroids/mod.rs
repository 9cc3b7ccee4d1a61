//! Asteroids survival shooter
//!
//! A ship in a wrapping field of rocks. Rocks split when shot, pickups grant a
//! one-hit shield or extra weapons, and the round ends on the first unshielded
//! hit.

pub mod backdrop;
pub mod hero;
pub mod rock;
pub mod state;
pub mod tick;

pub use backdrop::{Backdrop, BackdropRock};
pub use hero::{Bullet, BulletFate, FieldPickup, FirePattern, Hero, PickupKind, Shot, WeaponSpec, weapon_spec};
pub use rock::{Rock, SizeClass};
pub use state::AsteroidsGame;
pub use tick::{render, tick};
