//! Game state and core simulation types
//!
//! Everything one playthrough owns lives in [`Session`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;
use crate::theme::{Palette, Theme};
use crate::tuning::Tuning;
use crate::clamp_to_field;

/// Result of advancing the session by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameOutcome {
    /// Player is still alive
    Continue,
    /// Player hit an obstacle without a shield. Terminal.
    PlayerDied,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    Slow,
    Multiplier,
    Dash,
}

impl PowerUpKind {
    /// Spawn table order, matches `Tuning::powerup_weights`
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Shield,
        PowerUpKind::Slow,
        PowerUpKind::Multiplier,
        PowerUpKind::Dash,
    ];
}

/// What a falling entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle,
    PowerUp(PowerUpKind),
}

/// An obstacle or power-up descending through the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingEntity {
    pub id: u32,
    pub kind: EntityKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Base fall speed (px/s), before any slow effect
    pub speed: f32,
    /// Horizontal drift (px/s)
    pub sway: f32,
}

impl FallingEntity {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn is_obstacle(&self) -> bool {
        self.kind == EntityKind::Obstacle
    }

    /// Fall by `fall_dt` worth of speed and drift sideways, bouncing off the
    /// walls. Returns the box swept between the old and new position.
    pub fn advance(&mut self, fall_dt: f32) -> Aabb {
        let before = self.aabb();
        self.pos.y += self.speed * fall_dt;
        if self.sway != 0.0 {
            let x = self.pos.x + self.sway * fall_dt;
            let clamped = clamp_to_field(x, self.size.x);
            if clamped != x {
                self.sway = -self.sway;
            }
            self.pos.x = clamped;
        }
        before.union(&self.aabb())
    }

    /// True once the entity has fallen far enough below the field to cull
    pub fn is_below_field(&self) -> bool {
        let margin = if self.is_obstacle() {
            OBSTACLE_CULL_MARGIN
        } else {
            POWERUP_CULL_MARGIN
        };
        self.pos.y > FIELD_HEIGHT + margin
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    /// Horizontal velocity (px/s)
    pub vel_x: f32,
    pub alive: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(FIELD_WIDTH / 2.0 - PLAYER_WIDTH / 2.0, PLAYER_Y),
            vel_x: 0.0,
            alive: true,
        }
    }
}

impl Player {
    pub fn size() -> Vec2 {
        Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, Self::size())
    }

    pub fn center(&self) -> Vec2 {
        self.aabb().center()
    }

    /// Ease toward `axis * player_speed`, integrate, clamp to the walls
    pub fn steer(&mut self, axis: f32, dt: f32, tuning: &Tuning) {
        let axis = if axis.is_finite() { axis.clamp(-1.0, 1.0) } else { 0.0 };
        let target = axis * tuning.player_speed;
        self.vel_x += (target - self.vel_x) * (tuning.player_accel * dt).min(1.0);
        if axis == 0.0 {
            // Friction is specified per 60 Hz frame
            self.vel_x *= tuning.player_friction.powf(dt * 60.0);
        }

        let x = self.pos.x + self.vel_x * dt;
        let clamped = clamp_to_field(x, PLAYER_WIDTH);
        if clamped != x {
            self.vel_x = 0.0;
        }
        self.pos.x = clamped;
    }

    /// Instant sideways hop, stopped by the walls
    pub fn dash(&mut self, direction: f32, distance: f32) {
        let step = if direction < 0.0 { -distance } else { distance };
        self.pos.x = clamp_to_field(self.pos.x + step, PLAYER_WIDTH);
        self.vel_x = 0.0;
    }
}

/// A status effect as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StatusEffect {
    /// Absorbs the next obstacle hit
    Shield,
    /// Obstacles fall slower
    Slow { remaining: f32 },
    /// Score accrues faster
    Multiplier { remaining: f32 },
    /// One dash available
    DashCharge,
}

/// Active power-up effects. One slot per kind, so nothing can stack.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub shield: bool,
    /// Seconds of slow left (0 = inactive)
    pub slow_secs: f32,
    /// Seconds of score multiplier left (0 = inactive)
    pub multiplier_secs: f32,
    pub dash_charge: bool,
}

impl ActiveEffects {
    /// Apply a collected power-up. Timed effects refresh to full duration.
    pub fn apply(&mut self, kind: PowerUpKind, tuning: &Tuning) {
        match kind {
            PowerUpKind::Shield => self.shield = true,
            PowerUpKind::Slow => self.slow_secs = tuning.slow_duration,
            PowerUpKind::Multiplier => self.multiplier_secs = tuning.multiplier_duration,
            PowerUpKind::Dash => self.dash_charge = true,
        }
    }

    /// Count timed effects down; returns the kinds that expired this call
    pub fn tick(&mut self, dt: f32) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        if self.slow_secs > 0.0 {
            self.slow_secs = (self.slow_secs - dt).max(0.0);
            if self.slow_secs == 0.0 {
                expired.push(PowerUpKind::Slow);
            }
        }
        if self.multiplier_secs > 0.0 {
            self.multiplier_secs = (self.multiplier_secs - dt).max(0.0);
            if self.multiplier_secs == 0.0 {
                expired.push(PowerUpKind::Multiplier);
            }
        }
        expired
    }

    pub fn is_slowed(&self) -> bool {
        self.slow_secs > 0.0
    }

    /// Factor applied to obstacle fall speed
    pub fn fall_factor(&self, tuning: &Tuning) -> f32 {
        if self.is_slowed() { tuning.slow_factor } else { 1.0 }
    }

    /// Factor applied to score accrual
    pub fn score_multiplier(&self, tuning: &Tuning) -> u32 {
        if self.multiplier_secs > 0.0 {
            tuning.multiplier
        } else {
            1
        }
    }

    /// Consume the shield if present
    pub fn take_shield(&mut self) -> bool {
        std::mem::take(&mut self.shield)
    }

    /// Consume the dash charge if present
    pub fn take_dash_charge(&mut self) -> bool {
        std::mem::take(&mut self.dash_charge)
    }

    /// Active effects as tagged variants
    pub fn list(&self) -> Vec<StatusEffect> {
        let mut effects = Vec::with_capacity(4);
        if self.shield {
            effects.push(StatusEffect::Shield);
        }
        if self.slow_secs > 0.0 {
            effects.push(StatusEffect::Slow {
                remaining: self.slow_secs,
            });
        }
        if self.multiplier_secs > 0.0 {
            effects.push(StatusEffect::Multiplier {
                remaining: self.multiplier_secs,
            });
        }
        if self.dash_charge {
            effects.push(StatusEffect::DashCharge);
        }
        effects
    }
}

/// Things that happened during a frame, for audio and particles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WaveSpawned { count: u32 },
    PowerUpSpawned { kind: PowerUpKind },
    PowerUpCollected { kind: PowerUpKind, pos: Vec2 },
    ShieldAbsorbed { pos: Vec2 },
    ObstacleDodged { points: u64 },
    Dashed { direction: f32 },
    EffectExpired { kind: PowerUpKind },
    ThemeUnlocked { theme: Theme },
    PlayerDied { pos: Vec2 },
}

/// Render-ready view of a session
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub score: u64,
    pub elapsed: f32,
    pub theme: Theme,
    pub palette: Palette,
    pub player_pos: Vec2,
    pub player_size: Vec2,
    pub alive: bool,
    pub paused: bool,
    pub effects: Vec<StatusEffect>,
    pub entities: Vec<FallingEntity>,
    pub events: Vec<GameEvent>,
}

/// The mutable state of one playthrough, from start to death
#[derive(Debug, Clone)]
pub struct Session {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub score: u64,
    /// Fractional points not yet folded into `score`
    pub score_carry: f32,
    /// Seconds survived (paused time excluded)
    pub elapsed: f32,
    pub theme: Theme,
    /// Current delay between obstacle waves (s)
    pub spawn_interval: f32,
    pub wave_timer: f32,
    pub powerup_timer: f32,
    pub waves_spawned: u32,
    pub player: Player,
    pub effects: ActiveEffects,
    /// Falling entities, ordered by id
    pub entities: Vec<FallingEntity>,
    pub paused: bool,
    /// Events recorded by the most recent `advance`
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl Session {
    /// New session with default tuning and the starting theme
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, Tuning::default(), Theme::default())
    }

    pub fn with_config(seed: u64, tuning: Tuning, theme: Theme) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            spawn_interval: tuning.spawn_interval,
            tuning,
            score: 0,
            score_carry: 0.0,
            elapsed: 0.0,
            theme,
            wave_timer: 0.0,
            powerup_timer: 0.0,
            waves_spawned: 0,
            player: Player::default(),
            effects: ActiveEffects::default(),
            entities: Vec::new(),
            paused: false,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID (never reused within a session)
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_alive(&self) -> bool {
        self.player.alive
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &FallingEntity> {
        self.entities.iter().filter(|e| e.is_obstacle())
    }

    /// Add points, scaled by the active multiplier
    pub(crate) fn award(&mut self, points: u64) -> u64 {
        let scaled = points * u64::from(self.effects.score_multiplier(&self.tuning));
        self.score += scaled;
        scaled
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            score: self.score,
            elapsed: self.elapsed,
            theme: self.theme,
            palette: self.theme.palette(),
            player_pos: self.player.pos,
            player_size: Player::size(),
            alive: self.player.alive,
            paused: self.paused,
            effects: self.effects.list(),
            entities: self.entities.clone(),
            events: self.events.clone(),
        }
    }
}
