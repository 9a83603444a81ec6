//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (entities kept sorted by ID)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod spawn;
pub mod state;
pub mod stepper;
pub mod tick;

pub use collision::Aabb;
pub use state::{
    ActiveEffects, EntityKind, FallingEntity, FrameOutcome, GameEvent, Player, PowerUpKind,
    Session, Snapshot, StatusEffect,
};
pub use stepper::FrameClock;
pub use tick::{DashDirection, FrameInput, advance};
