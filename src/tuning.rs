//! Data-driven game balance
//!
//! Every knob the game loop reads lives here so a balance pass never has to
//! touch simulation code. Loaded from `tuning.json` when present; any field
//! missing from the file keeps its default.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistError};

/// Gameplay tuning values (seconds and pixels)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    /// Top horizontal speed (px/s)
    pub player_speed: f32,
    /// How quickly velocity eases toward the target (1/s)
    pub player_accel: f32,
    /// Per-60Hz-frame velocity retention with no input
    pub player_friction: f32,
    /// Instant lateral displacement of a dash (px)
    pub dash_distance: f32,

    // === Obstacles ===
    /// Initial delay between obstacle waves (s)
    pub spawn_interval: f32,
    /// Floor for the wave delay (s)
    pub min_spawn_interval: f32,
    /// Random shrink per wave, lower bound (s)
    pub interval_shrink_min: f32,
    /// Random shrink per wave, upper bound (s)
    pub interval_shrink_max: f32,
    /// Extra shrink per 6 points of score (s)
    pub interval_shrink_per_score: f32,
    pub max_obstacles_per_wave: u32,
    /// Base fall speed (px/s)
    pub obstacle_base_speed: f32,
    /// Fall speed added per point of score (px/s)
    pub obstacle_speed_per_score: f32,
    /// Random extra fall speed (px/s)
    pub obstacle_speed_jitter: f32,
    /// Hard cap on obstacle fall speed (px/s)
    pub max_obstacle_speed: f32,
    /// Maximum horizontal drift (px/s)
    pub obstacle_max_sway: f32,

    // === Power-ups ===
    /// Delay between power-up spawns (s)
    pub powerup_interval: f32,
    /// Power-up fall speed relative to the obstacle base speed
    pub powerup_speed_factor: f32,
    /// Spawn weights: shield, slow, multiplier, dash
    pub powerup_weights: [f32; 4],
    /// Obstacle fall speed factor while slow is active
    pub slow_factor: f32,
    pub slow_duration: f32,
    pub multiplier_duration: f32,
    pub multiplier: u32,

    // === Score ===
    /// Points per second survived
    pub score_per_second: f32,
    /// Points per obstacle that falls off the field
    pub dodge_bonus: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 510.0,
            player_accel: 12.0,
            player_friction: 0.85,
            dash_distance: 200.0,

            spawn_interval: 0.7,
            min_spawn_interval: 0.26,
            interval_shrink_min: 0.008,
            interval_shrink_max: 0.022,
            interval_shrink_per_score: 0.001,
            max_obstacles_per_wave: 3,
            obstacle_base_speed: 156.0,
            obstacle_speed_per_score: 3.0,
            obstacle_speed_jitter: 36.0,
            max_obstacle_speed: 720.0,
            obstacle_max_sway: 30.0,

            powerup_interval: 12.0,
            powerup_speed_factor: 0.8,
            powerup_weights: [0.25, 0.25, 0.2, 0.3],
            slow_factor: 0.5,
            slow_duration: 2.2,
            multiplier_duration: 10.0,
            multiplier: 2,

            score_per_second: 1.0,
            dodge_bonus: 1,
        }
    }
}

impl Tuning {
    /// Storage name of the tuning document
    pub const STORAGE_KEY: &'static str = "tuning";

    /// Parse tuning from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning overrides, falling back to defaults when the document
    /// is missing, malformed or out of range
    pub fn load(store: &persistence::Store) -> Self {
        let tuning: Self = persistence::load_or_default(store, Self::STORAGE_KEY);
        match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("Discarding saved {}: {}", Self::STORAGE_KEY, e);
                Self::default()
            }
        }
    }

    /// Reject values the game loop cannot run with
    pub fn validate(&self) -> Result<(), PersistError> {
        let positive = [
            ("player_speed", self.player_speed),
            ("spawn_interval", self.spawn_interval),
            ("min_spawn_interval", self.min_spawn_interval),
            ("obstacle_base_speed", self.obstacle_base_speed),
            ("max_obstacle_speed", self.max_obstacle_speed),
            ("powerup_interval", self.powerup_interval),
            ("powerup_speed_factor", self.powerup_speed_factor),
            ("slow_factor", self.slow_factor),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("{value} must be greater than 0")));
            }
        }

        let non_negative = [
            ("player_accel", self.player_accel),
            ("dash_distance", self.dash_distance),
            ("interval_shrink_min", self.interval_shrink_min),
            ("interval_shrink_max", self.interval_shrink_max),
            ("interval_shrink_per_score", self.interval_shrink_per_score),
            ("obstacle_speed_per_score", self.obstacle_speed_per_score),
            ("obstacle_speed_jitter", self.obstacle_speed_jitter),
            ("obstacle_max_sway", self.obstacle_max_sway),
            ("slow_duration", self.slow_duration),
            ("multiplier_duration", self.multiplier_duration),
            ("score_per_second", self.score_per_second),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, format!("{value} must not be negative")));
            }
        }

        if !(0.0..=1.0).contains(&self.player_friction) {
            return Err(invalid(
                "player_friction",
                format!("{} must be within 0..=1", self.player_friction),
            ));
        }
        if self.interval_shrink_min > self.interval_shrink_max {
            return Err(invalid(
                "interval_shrink_min",
                format!(
                    "{} exceeds interval_shrink_max {}",
                    self.interval_shrink_min, self.interval_shrink_max
                ),
            ));
        }
        if self.powerup_weights.iter().any(|w| !w.is_finite()) {
            return Err(invalid("powerup_weights", "weights must be finite".into()));
        }
        if self.multiplier == 0 {
            return Err(invalid("multiplier", "must be at least 1".into()));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> PersistError {
    PersistError::Invalid { field, reason }
}
