//! Idle/demo mode driver
//!
//! Scores candidate lanes across the field by how soon an obstacle lands in
//! them, steers toward the cheapest one, detours for power-ups when nothing
//! threatens, and spends a dash charge when a hit is imminent.

use super::state::{Player, Session};
use super::tick::{DashDirection, FrameInput};
use crate::consts::*;

/// How far ahead (seconds) obstacles are considered threats
const LOOKAHEAD_SECS: f32 = 1.5;
/// Spacing between candidate lanes (px)
const LANE_STEP: f32 = 10.0;
/// Clearance kept around obstacles (px)
const CLEARANCE: f32 = 8.0;
/// Arrival time under which the current lane triggers a dash
const DASH_PANIC_SECS: f32 = 0.2;
/// Distance from the target lane considered "arrived" (px)
const ARRIVE_TOLERANCE: f32 = 4.0;

/// Something in a lane and when it reaches the player's row
#[derive(Debug, Clone, Copy)]
struct LaneHazard {
    min_x: f32,
    max_x: f32,
    eta: f32,
}

impl LaneHazard {
    fn covers(&self, lane_x: f32) -> bool {
        lane_x < self.max_x && lane_x + PLAYER_WIDTH > self.min_x
    }
}

/// Compute the autopilot's input for this frame. `pause` passes through.
pub fn drive(session: &Session, input: &FrameInput) -> FrameInput {
    let threats = hazards(session, true);
    let prizes = hazards(session, false);
    let x = session.player.pos.x;

    let target = best_lane(session, &threats, &prizes);
    let delta = target - x;
    let axis = if delta.abs() <= ARRIVE_TOLERANCE {
        0.0
    } else {
        (delta / 40.0).clamp(-1.0, 1.0)
    };

    let in_danger = threats
        .iter()
        .any(|t| t.covers(x) && t.eta < DASH_PANIC_SECS);
    let dash = if in_danger && session.effects.dash_charge && delta.abs() > ARRIVE_TOLERANCE {
        Some(if delta < 0.0 {
            DashDirection::Left
        } else {
            DashDirection::Right
        })
    } else {
        None
    };

    FrameInput {
        axis,
        dash,
        pause: input.pause,
        autopilot: true,
    }
}

/// Obstacles (or power-ups) that will reach the player's row within the lookahead
fn hazards(session: &Session, obstacles: bool) -> Vec<LaneHazard> {
    let player = session.player.aabb();
    let fall_factor = session.effects.fall_factor(&session.tuning);

    session
        .entities
        .iter()
        .filter(|e| e.is_obstacle() == obstacles)
        .filter_map(|e| {
            let bottom = e.pos.y + e.size.y;
            // Already past the paddle
            if e.pos.y > player.max.y {
                return None;
            }
            let speed = if e.is_obstacle() {
                e.speed * fall_factor
            } else {
                e.speed
            };
            let eta = ((player.min.y - bottom) / speed.max(1.0)).max(0.0);
            (eta <= LOOKAHEAD_SECS).then_some(LaneHazard {
                min_x: e.pos.x - CLEARANCE,
                max_x: e.pos.x + e.size.x + CLEARANCE,
                eta,
            })
        })
        .collect()
}

/// Left edge of the cheapest lane to stand in
fn best_lane(session: &Session, threats: &[LaneHazard], prizes: &[LaneHazard]) -> f32 {
    let x = session.player.pos.x;
    let speed = session.tuning.player_speed.max(1.0);
    let lo = FIELD_MARGIN;
    let hi = FIELD_WIDTH - FIELD_MARGIN - Player::size().x;

    let mut best = (lane_cost(x, x, speed, threats, prizes), x);
    let mut lane = lo;
    while lane <= hi {
        let cost = lane_cost(lane, x, speed, threats, prizes);
        if cost < best.0 {
            best = (cost, lane);
        }
        lane += LANE_STEP;
    }
    let cost = lane_cost(hi, x, speed, threats, prizes);
    if cost < best.0 {
        best = (cost, hi);
    }
    best.1
}

fn lane_cost(lane: f32, x: f32, speed: f32, threats: &[LaneHazard], prizes: &[LaneHazard]) -> f32 {
    let travel = (lane - x).abs() / speed;
    let mut cost = travel * 0.5;

    for t in threats.iter().filter(|t| t.covers(lane)) {
        // Lanes we cannot reach before the block lands are worst of all
        let urgency = if travel > t.eta { 4.0 } else { 1.0 };
        cost += urgency / (t.eta + 0.1);
    }
    if threats.iter().all(|t| !t.covers(lane)) {
        for p in prizes.iter().filter(|p| p.covers(lane) && travel <= p.eta) {
            cost -= 0.5 / (p.eta + 0.5);
        }
    }
    cost
}
