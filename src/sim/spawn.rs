//! Obstacle waves, power-up drops and the difficulty ramp

use glam::Vec2;
use rand::Rng;

use super::state::{EntityKind, FallingEntity, PowerUpKind, Session};
use crate::consts::*;
use crate::tuning::Tuning;

/// Tries per obstacle to find a spot clear of its neighbours
const PLACEMENT_ATTEMPTS: u32 = 8;
/// Vertical distance under which two obstacles count as side by side
const MIN_VERTICAL_GAP: f32 = 80.0;

/// Number of obstacles a wave may hold at `score`
pub fn max_wave_size(score: u64, tuning: &Tuning) -> u32 {
    let ramp = 1 + (score / 8).min(u64::from(u32::MAX)) as u32;
    ramp.min(tuning.max_obstacles_per_wave).max(1)
}

/// Fall speed for a new obstacle; `jitter` is in `[0, 1)`
pub fn obstacle_speed(score: u64, jitter: f32, tuning: &Tuning) -> f32 {
    let speed = tuning.obstacle_base_speed
        + score as f32 * tuning.obstacle_speed_per_score
        + jitter * tuning.obstacle_speed_jitter;
    speed.min(tuning.max_obstacle_speed)
}

/// Shrink the wave delay after a wave. Never grows, never drops below the floor.
pub fn shrink_spawn_interval(session: &mut Session) {
    let tuning = &session.tuning;
    let shrink = session
        .rng
        .random_range(tuning.interval_shrink_min..=tuning.interval_shrink_max)
        + (session.score / 6) as f32 * tuning.interval_shrink_per_score;
    let next = (session.spawn_interval - shrink).max(tuning.min_spawn_interval);
    session.spawn_interval = next.min(session.spawn_interval);
}

/// Spawn a wave of obstacles above the field; returns how many were placed
pub fn spawn_wave(session: &mut Session) -> u32 {
    let max = max_wave_size(session.score, &session.tuning);
    let count = session.rng.random_range(1..=max);
    let mut placed = 0;

    for _ in 0..count {
        let Some(candidate) = place_obstacle(session) else {
            continue;
        };
        let id = session.next_entity_id();
        session.entities.push(FallingEntity { id, ..candidate });
        placed += 1;
    }

    session.waves_spawned += 1;
    log::debug!(
        "Wave {}: {} obstacles, next in {:.3}s",
        session.waves_spawned,
        placed,
        session.spawn_interval
    );
    placed
}

/// Roll an obstacle that does not crowd an existing one
fn place_obstacle(session: &mut Session) -> Option<FallingEntity> {
    for _ in 0..PLACEMENT_ATTEMPTS {
        let rng = &mut session.rng;
        let w = rng.random_range(OBSTACLE_MIN_W..=OBSTACLE_MAX_W).round();
        let h = rng.random_range(OBSTACLE_MIN_H..=OBSTACLE_MAX_H).round();
        let x = rng.random_range(FIELD_MARGIN..=FIELD_WIDTH - FIELD_MARGIN - w);
        let y = -h - rng.random_range(0.0..=60.0f32).round();
        let jitter: f32 = rng.random();
        let sway = rng.random_range(-1.0..=1.0f32) * session.tuning.obstacle_max_sway;

        let crowded = session.obstacles().any(|o| {
            (o.pos.x - x).abs() < (o.size.x + w) * 0.5 && (o.pos.y - y).abs() < MIN_VERTICAL_GAP
        });
        if crowded {
            continue;
        }

        return Some(FallingEntity {
            id: 0,
            kind: EntityKind::Obstacle,
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
            speed: obstacle_speed(session.score, jitter, &session.tuning),
            sway,
        });
    }
    None
}

/// Pick a power-up kind from the weighted spawn table
pub fn roll_power_up(roll: f32, weights: &[f32; 4]) -> PowerUpKind {
    let total: f32 = weights.iter().map(|w| w.max(0.0)).sum();
    if total <= 0.0 {
        return PowerUpKind::Shield;
    }

    let mut target = roll.clamp(0.0, 1.0) * total;
    for (kind, weight) in PowerUpKind::ALL.into_iter().zip(weights) {
        let weight = weight.max(0.0);
        if target < weight {
            return kind;
        }
        target -= weight;
    }
    // Float rounding can leave `target` a hair above the last bucket
    PowerUpKind::ALL
        .into_iter()
        .zip(weights)
        .rev()
        .find(|(_, w)| **w > 0.0)
        .map(|(kind, _)| kind)
        .unwrap_or(PowerUpKind::Shield)
}

/// Drop one power-up above the field
pub fn spawn_power_up(session: &mut Session) -> PowerUpKind {
    let roll: f32 = session.rng.random();
    let kind = roll_power_up(roll, &session.tuning.powerup_weights);
    let x = session
        .rng
        .random_range(POWERUP_MARGIN..=FIELD_WIDTH - POWERUP_MARGIN - POWERUP_SIZE);
    let y = -POWERUP_SIZE - session.rng.random_range(0.0..=40.0f32).round();

    let id = session.next_entity_id();
    session.entities.push(FallingEntity {
        id,
        kind: EntityKind::PowerUp(kind),
        pos: Vec2::new(x, y),
        size: Vec2::splat(POWERUP_SIZE),
        speed: session.tuning.obstacle_base_speed * session.tuning.powerup_speed_factor,
        sway: 0.0,
    });
    log::debug!("Power-up {:?} dropped at x={:.0}", kind, x);
    kind
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wave_size_ramps_and_caps() {
        let tuning = Tuning::default();
        assert_eq!(max_wave_size(0, &tuning), 1);
        assert_eq!(max_wave_size(8, &tuning), 2);
        assert_eq!(max_wave_size(16, &tuning), 3);
        assert_eq!(max_wave_size(10_000, &tuning), 3);
    }

    #[test]
    fn test_obstacle_speed_capped() {
        let tuning = Tuning::default();
        assert_eq!(obstacle_speed(0, 0.0, &tuning), tuning.obstacle_base_speed);
        assert!(obstacle_speed(10, 0.5, &tuning) > obstacle_speed(0, 0.5, &tuning));
        assert_eq!(obstacle_speed(1_000_000, 0.9, &tuning), tuning.max_obstacle_speed);
    }

    #[test]
    fn test_spawn_interval_is_monotone_and_bounded() {
        let mut session = Session::new(7);
        let mut previous = session.spawn_interval;
        for i in 0..500 {
            session.score = i / 4;
            shrink_spawn_interval(&mut session);
            assert!(session.spawn_interval <= previous);
            assert!(session.spawn_interval >= session.tuning.min_spawn_interval);
            previous = session.spawn_interval;
        }
        assert_eq!(session.spawn_interval, session.tuning.min_spawn_interval);
    }

    #[test]
    fn test_wave_spawns_above_field_inside_walls() {
        let mut session = Session::new(42);
        session.score = 40;
        for _ in 0..20 {
            spawn_wave(&mut session);
        }
        assert!(!session.entities.is_empty());
        for e in &session.entities {
            assert!(e.is_obstacle());
            assert!(e.pos.y + e.size.y <= 0.0);
            assert!(e.pos.x >= FIELD_MARGIN);
            assert!(e.pos.x + e.size.x <= FIELD_WIDTH - FIELD_MARGIN + 0.001);
            assert!(e.speed <= session.tuning.max_obstacle_speed);
        }
        assert_eq!(session.waves_spawned, 20);
    }

    #[test]
    fn test_roll_power_up_buckets() {
        let weights = [0.25, 0.25, 0.2, 0.3];
        assert_eq!(roll_power_up(0.0, &weights), PowerUpKind::Shield);
        assert_eq!(roll_power_up(0.3, &weights), PowerUpKind::Slow);
        assert_eq!(roll_power_up(0.6, &weights), PowerUpKind::Multiplier);
        assert_eq!(roll_power_up(0.99, &weights), PowerUpKind::Dash);
        assert_eq!(roll_power_up(1.0, &weights), PowerUpKind::Dash);
        // Zeroed entries are never chosen
        assert_eq!(roll_power_up(0.9, &[0.0, 1.0, 0.0, 0.0]), PowerUpKind::Slow);
    }

    #[test]
    fn test_power_up_spawn() {
        let mut session = Session::new(3);
        let kind = spawn_power_up(&mut session);
        let pu = &session.entities[0];
        assert_eq!(pu.kind, EntityKind::PowerUp(kind));
        assert_eq!(pu.size, Vec2::splat(POWERUP_SIZE));
        assert!(pu.pos.x >= POWERUP_MARGIN);
    }
}
