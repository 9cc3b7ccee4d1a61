//! Missile defense
//!
//! Meteors fall on a row of bases and launchers. The player aims missiles
//! whose blasts chain meteor kills for increasing points. Sky pickups caught
//! in a blast modify the round's [`RunConfig`]. The round ends when the last
//! base falls.

pub mod effects;
pub mod meteor;
pub mod pickups;
pub mod state;
pub mod structures;
pub mod tick;

pub use effects::{Blast, Missile, ScorePopup, TargetMarker, chain_points};
pub use meteor::{Meteor, choose_target};
pub use pickups::{PowerUp, RunConfig, SkyPickup};
pub use state::DefenseGame;
pub use structures::{Base, Launcher, layout_structures};
pub use tick::{apply_power_up, render, tick};
