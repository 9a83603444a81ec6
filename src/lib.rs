//! Avoid The Block - A falling-block survival arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, collisions, status effects, score)
//! - `theme`: Cosmetic themes unlocked by score
//! - `tuning`: Data-driven game balance
//! - `highscores`: Local leaderboard
//! - `settings`: Player preferences
//! - `persistence`: JSON save/load (files on native, LocalStorage on web)
//! - `platform`: Browser/native platform abstraction

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod theme;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::Leaderboard;
pub use settings::Settings;
pub use theme::Theme;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest delta a single `advance` call will simulate
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Play-field dimensions (pixels, y grows downward)
    pub const FIELD_WIDTH: f32 = 720.0;
    pub const FIELD_HEIGHT: f32 = 900.0;
    /// Side walls the player and obstacles never cross
    pub const FIELD_MARGIN: f32 = 20.0;

    /// Player box
    pub const PLAYER_WIDTH: f32 = 70.0;
    pub const PLAYER_HEIGHT: f32 = 18.0;
    pub const PLAYER_Y: f32 = FIELD_HEIGHT - 110.0;

    /// Obstacle size range
    pub const OBSTACLE_MIN_W: f32 = 40.0;
    pub const OBSTACLE_MAX_W: f32 = 140.0;
    pub const OBSTACLE_MIN_H: f32 = 30.0;
    pub const OBSTACLE_MAX_H: f32 = 70.0;

    /// Power-up box (square)
    pub const POWERUP_SIZE: f32 = 36.0;
    /// Power-ups spawn at least this far from the walls
    pub const POWERUP_MARGIN: f32 = 40.0;

    /// Entities are culled once their top edge is this far below the field
    pub const OBSTACLE_CULL_MARGIN: f32 = 100.0;
    pub const POWERUP_CULL_MARGIN: f32 = 80.0;
}

/// Clamp a box's left edge so that `[x, x + width]` stays between the side walls
#[inline]
pub fn clamp_to_field(x: f32, width: f32) -> f32 {
    use consts::{FIELD_MARGIN, FIELD_WIDTH};
    x.clamp(FIELD_MARGIN, (FIELD_WIDTH - FIELD_MARGIN - width).max(FIELD_MARGIN))
}
