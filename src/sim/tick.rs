//! Per-frame simulation step
//!
//! Core game loop that advances the session deterministically.

use super::autopilot;
use super::spawn::{shrink_spawn_interval, spawn_power_up, spawn_wave};
use super::state::{EntityKind, FrameOutcome, GameEvent, Session};
use crate::consts::*;
use crate::theme::Theme;

/// Which way a dash goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashDirection {
    Left,
    Right,
    /// Direction of current travel (right when standing still)
    Heading,
}

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Horizontal steering in [-1, 1] (negative = left)
    pub axis: f32,
    /// Dash trigger (one-shot)
    pub dash: Option<DashDirection>,
    /// Pause toggle (one-shot)
    pub pause: bool,
    /// Idle/demo mode - the autopilot steers
    pub autopilot: bool,
}

impl FrameInput {
    /// Copy without the one-shot triggers, for follow-up substeps
    pub fn held(&self) -> Self {
        Self {
            dash: None,
            pause: false,
            ..self.clone()
        }
    }
}

impl Session {
    /// Advance this session by `dt` seconds
    pub fn advance(&mut self, input: &FrameInput, dt: f32) -> FrameOutcome {
        advance(self, input, dt)
    }
}

/// Advance the session by one frame of `dt` seconds
pub fn advance(session: &mut Session, input: &FrameInput, dt: f32) -> FrameOutcome {
    session.events.clear();

    // Death is terminal
    if !session.player.alive {
        return FrameOutcome::PlayerDied;
    }

    if input.pause {
        session.paused = !session.paused;
        log::info!("{}", if session.paused { "Paused" } else { "Resumed" });
    }
    if session.paused {
        return FrameOutcome::Continue;
    }

    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };

    let input = if input.autopilot {
        autopilot::drive(session, input)
    } else {
        input.clone()
    };

    session.elapsed += dt;

    // --- PLAYER ---
    session.player.steer(input.axis, dt, &session.tuning);
    if let Some(direction) = input.dash {
        if session.effects.take_dash_charge() {
            let sign = match direction {
                DashDirection::Left => -1.0,
                DashDirection::Right => 1.0,
                DashDirection::Heading if session.player.vel_x < 0.0 => -1.0,
                DashDirection::Heading => 1.0,
            };
            session.player.dash(sign, session.tuning.dash_distance);
            session.events.push(GameEvent::Dashed { direction: sign });
        }
    }

    // --- EFFECT EXPIRY ---
    for kind in session.effects.tick(dt) {
        log::debug!("{:?} expired", kind);
        session.events.push(GameEvent::EffectExpired { kind });
    }

    // --- SPAWNING ---
    session.wave_timer += dt;
    if session.wave_timer >= session.spawn_interval {
        session.wave_timer = 0.0;
        let count = spawn_wave(session);
        shrink_spawn_interval(session);
        session.events.push(GameEvent::WaveSpawned { count });
    }

    session.powerup_timer += dt;
    if session.powerup_timer >= session.tuning.powerup_interval {
        session.powerup_timer = 0.0;
        let kind = spawn_power_up(session);
        session.events.push(GameEvent::PowerUpSpawned { kind });
    }

    // --- MOTION ---
    // Slow only affects obstacles; derived from base speed so expiry restores it exactly
    let obstacle_dt = dt * session.effects.fall_factor(&session.tuning);
    let player_box = session.player.aabb();
    // Test the whole fall so fast blocks cannot tunnel through the paddle
    let touching: Vec<u32> = session
        .entities
        .iter_mut()
        .filter_map(|entity| {
            let fall_dt = if entity.is_obstacle() { obstacle_dt } else { dt };
            let swept = entity.advance(fall_dt);
            swept.overlaps(&player_box).then_some(entity.id)
        })
        .collect();

    // --- COLLISIONS ---
    // Pickups first, so a shield grabbed this frame already protects
    let mut collected = Vec::new();
    session.entities.retain(|e| match e.kind {
        EntityKind::PowerUp(kind) if touching.contains(&e.id) => {
            collected.push((kind, e.aabb().center()));
            false
        }
        _ => true,
    });
    for (kind, pos) in collected {
        session.effects.apply(kind, &session.tuning);
        log::debug!("Collected {:?}", kind);
        session.events.push(GameEvent::PowerUpCollected { kind, pos });
    }

    let hits: Vec<u32> = session
        .obstacles()
        .filter(|o| touching.contains(&o.id))
        .map(|o| o.id)
        .collect();
    for id in hits {
        if session.effects.take_shield() {
            let pos = session.player.center();
            session.entities.retain(|e| e.id != id);
            session.events.push(GameEvent::ShieldAbsorbed { pos });
            log::debug!("Shield absorbed obstacle {}", id);
        } else {
            let pos = session.player.center();
            session.player.alive = false;
            session.player.vel_x = 0.0;
            session.events.push(GameEvent::PlayerDied { pos });
            log::info!(
                "Player died: score {}, survived {:.1}s",
                session.score,
                session.elapsed
            );
            return FrameOutcome::PlayerDied;
        }
    }

    // --- CULL & DODGE BONUS ---
    let mut dodged = 0u32;
    session.entities.retain(|e| {
        if !e.is_below_field() {
            return true;
        }
        if e.is_obstacle() {
            dodged += 1;
        }
        false
    });
    for _ in 0..dodged {
        let points = session.award(u64::from(session.tuning.dodge_bonus));
        session.events.push(GameEvent::ObstacleDodged { points });
    }

    // --- SCORE ---
    let rate = session.tuning.score_per_second.max(0.0)
        * session.effects.score_multiplier(&session.tuning) as f32;
    session.score_carry += dt * rate;
    let whole = session.score_carry.floor();
    session.score_carry -= whole;
    session.score += whole as u64;

    // --- THEME ---
    let theme = Theme::upgrade_for_score(session.theme, session.score);
    if theme != session.theme {
        log::info!("Theme unlocked: {} at {} points", theme.as_str(), session.score);
        session.theme = theme;
        session.events.push(GameEvent::ThemeUnlocked { theme });
    }

    FrameOutcome::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{FallingEntity, PowerUpKind, StatusEffect};
    use crate::tuning::Tuning;
    use glam::Vec2;

    /// Session that never spawns on its own, so tests control every entity
    fn quiet_session() -> Session {
        let tuning = Tuning {
            spawn_interval: 1.0e9,
            min_spawn_interval: 1.0e9,
            powerup_interval: 1.0e9,
            ..Tuning::default()
        };
        Session::with_config(12345, tuning, Theme::DarkBlueGlow)
    }

    fn drop_entity(session: &mut Session, kind: EntityKind, pos: Vec2, size: Vec2) -> u32 {
        let id = session.next_entity_id();
        session.entities.push(FallingEntity {
            id,
            kind,
            pos,
            size,
            speed: 300.0,
            sway: 0.0,
        });
        id
    }

    /// Obstacle whose bottom edge sits `gap` pixels above the player, centred on it
    fn obstacle_above_player(session: &mut Session, gap: f32) -> u32 {
        let size = Vec2::new(60.0, 40.0);
        let center_x = session.player.center().x;
        let pos = Vec2::new(center_x - size.x / 2.0, PLAYER_Y - gap - size.y);
        drop_entity(session, EntityKind::Obstacle, pos, size)
    }

    fn power_up_on_player(session: &mut Session, kind: PowerUpKind) {
        let pos = session.player.pos - Vec2::new(0.0, POWERUP_SIZE / 2.0);
        drop_entity(
            session,
            EntityKind::PowerUp(kind),
            pos,
            Vec2::splat(POWERUP_SIZE),
        );
    }

    #[test]
    fn test_obstacle_into_player_kills() {
        let mut session = quiet_session();
        obstacle_above_player(&mut session, 1.0);

        let outcome = session.advance(&FrameInput::default(), 1.0 / 60.0);
        assert_eq!(outcome, FrameOutcome::PlayerDied);
        assert!(!session.is_alive());
        assert!(matches!(
            session.events.last(),
            Some(GameEvent::PlayerDied { .. })
        ));

        // Terminal: later frames change nothing
        let score = session.score;
        let elapsed = session.elapsed;
        assert_eq!(
            session.advance(&FrameInput::default(), 1.0 / 60.0),
            FrameOutcome::PlayerDied
        );
        assert_eq!(session.score, score);
        assert_eq!(session.elapsed, elapsed);
    }

    #[test]
    fn test_fast_obstacle_cannot_skip_over_player() {
        let mut session = quiet_session();
        let size = Vec2::new(60.0, OBSTACLE_MIN_H);
        let pos = Vec2::new(session.player.center().x - 30.0, PLAYER_Y - 1.0 - size.y);
        let id = drop_entity(&mut session, EntityKind::Obstacle, pos, size);
        if let Some(e) = session.entities.iter_mut().find(|e| e.id == id) {
            e.speed = session.tuning.max_obstacle_speed;
        }

        // 72px per frame: the block ends the frame entirely below the paddle
        let outcome = session.advance(&FrameInput::default(), MAX_FRAME_DT);
        assert_eq!(outcome, FrameOutcome::PlayerDied);
    }

    #[test]
    fn test_obstacle_already_below_player_is_harmless() {
        let mut session = quiet_session();
        let center_x = session.player.center().x;
        drop_entity(
            &mut session,
            EntityKind::Obstacle,
            Vec2::new(center_x - 30.0, PLAYER_Y + PLAYER_HEIGHT),
            Vec2::new(60.0, 40.0),
        );
        assert_eq!(
            session.advance(&FrameInput::default(), MAX_FRAME_DT),
            FrameOutcome::Continue
        );
    }

    #[test]
    fn test_fast_power_up_is_still_collected() {
        let mut session = quiet_session();
        let pos = Vec2::new(session.player.pos.x, PLAYER_Y - POWERUP_SIZE - 1.0);
        let id = drop_entity(
            &mut session,
            EntityKind::PowerUp(PowerUpKind::Shield),
            pos,
            Vec2::splat(POWERUP_SIZE),
        );
        if let Some(e) = session.entities.iter_mut().find(|e| e.id == id) {
            e.speed = 800.0;
        }
        session.advance(&FrameInput::default(), MAX_FRAME_DT);
        assert!(session.effects.shield);
        assert!(session.entities.is_empty());
    }

    #[test]
    fn test_shield_absorbs_one_hit() {
        let mut session = quiet_session();
        power_up_on_player(&mut session, PowerUpKind::Shield);
        assert_eq!(session.advance(&FrameInput::default(), 1.0 / 60.0), FrameOutcome::Continue);
        assert!(session.effects.shield);
        assert!(session.entities.is_empty());

        let first = obstacle_above_player(&mut session, 1.0);
        assert_eq!(session.advance(&FrameInput::default(), 1.0 / 60.0), FrameOutcome::Continue);
        assert!(!session.effects.shield);
        assert!(session.entities.iter().all(|e| e.id != first));
        assert!(session
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::ShieldAbsorbed { .. })));

        // Shield is gone: the next hit kills
        obstacle_above_player(&mut session, 1.0);
        assert_eq!(
            session.advance(&FrameInput::default(), 1.0 / 60.0),
            FrameOutcome::PlayerDied
        );
    }

    #[test]
    fn test_shield_picked_up_same_frame_protects() {
        let mut session = quiet_session();
        power_up_on_player(&mut session, PowerUpKind::Shield);
        obstacle_above_player(&mut session, 1.0);
        assert_eq!(session.advance(&FrameInput::default(), 1.0 / 60.0), FrameOutcome::Continue);
        assert!(session.is_alive());
        assert!(!session.effects.shield);
    }

    #[test]
    fn test_two_hits_one_shield_kills() {
        let mut session = quiet_session();
        session.effects.shield = true;
        obstacle_above_player(&mut session, 1.0);
        obstacle_above_player(&mut session, 1.0);
        assert_eq!(
            session.advance(&FrameInput::default(), 1.0 / 60.0),
            FrameOutcome::PlayerDied
        );
    }

    #[test]
    fn test_slow_halves_obstacle_fall_and_restores() {
        let mut session = quiet_session();
        let id = drop_entity(
            &mut session,
            EntityKind::Obstacle,
            Vec2::new(FIELD_MARGIN, -500.0),
            Vec2::new(40.0, 40.0),
        );
        session.player.pos.x = FIELD_WIDTH - FIELD_MARGIN - PLAYER_WIDTH;
        let y_of = |s: &Session| s.entities.iter().find(|e| e.id == id).map(|e| e.pos.y).unwrap();

        power_up_on_player(&mut session, PowerUpKind::Slow);
        session.advance(&FrameInput::default(), 0.1);
        assert!(session.effects.is_slowed());

        let before = y_of(&session);
        session.advance(&FrameInput::default(), 0.1);
        let slowed = y_of(&session) - before;
        assert!((slowed - 300.0 * 0.1 * session.tuning.slow_factor).abs() < 0.001);

        // Run the effect out
        for _ in 0..30 {
            session.advance(&FrameInput::default(), 0.1);
        }
        assert!(!session.effects.is_slowed());
        let before = y_of(&session);
        session.advance(&FrameInput::default(), 0.1);
        let normal = y_of(&session) - before;
        assert!((normal - 300.0 * 0.1).abs() < 0.001);
        assert_eq!(session.entities.iter().find(|e| e.id == id).map(|e| e.speed), Some(300.0));
    }

    #[test]
    fn test_multiplier_doubles_score_rate() {
        let mut plain = quiet_session();
        let mut boosted = quiet_session();
        boosted.effects.multiplier_secs = 100.0;
        // 80 frames of 1/16 s: exact in binary, 5 seconds in total
        for _ in 0..80 {
            plain.advance(&FrameInput::default(), 0.0625);
            boosted.advance(&FrameInput::default(), 0.0625);
        }
        assert_eq!(plain.score, 5);
        assert_eq!(boosted.score, 10);
    }

    #[test]
    fn test_dodged_obstacle_awards_bonus() {
        let mut session = quiet_session();
        drop_entity(
            &mut session,
            EntityKind::Obstacle,
            Vec2::new(FIELD_MARGIN, FIELD_HEIGHT + OBSTACLE_CULL_MARGIN - 1.0),
            Vec2::new(40.0, 40.0),
        );
        session.player.pos.x = FIELD_WIDTH - FIELD_MARGIN - PLAYER_WIDTH;
        session.advance(&FrameInput::default(), 0.01);
        assert!(session.entities.is_empty());
        assert_eq!(session.score, 1);
        assert!(session
            .events
            .contains(&GameEvent::ObstacleDodged { points: 1 }));
    }

    #[test]
    fn test_dash_needs_charge() {
        let mut session = quiet_session();
        let start = session.player.pos.x;
        let dash = FrameInput {
            dash: Some(DashDirection::Left),
            ..Default::default()
        };
        session.advance(&dash, 0.0);
        assert_eq!(session.player.pos.x, start);

        power_up_on_player(&mut session, PowerUpKind::Dash);
        session.advance(&FrameInput::default(), 0.0);
        assert!(session.effects.dash_charge);

        session.advance(&dash, 0.0);
        assert_eq!(session.player.pos.x, start - session.tuning.dash_distance);
        assert!(!session.effects.dash_charge);

        // Charge consumed
        session.advance(&dash, 0.0);
        assert_eq!(session.player.pos.x, start - session.tuning.dash_distance);
    }

    #[test]
    fn test_theme_unlocks_on_crossing_frame() {
        let mut session = quiet_session();
        session.score = 14;
        session.score_carry = 0.95;

        session.advance(&FrameInput::default(), 0.1);
        assert_eq!(session.score, 15);
        assert_eq!(session.theme, Theme::Neon);
        assert!(session.events.contains(&GameEvent::ThemeUnlocked { theme: Theme::Neon }));

        for _ in 0..20 {
            session.advance(&FrameInput::default(), 0.01);
            assert_eq!(session.theme, Theme::Neon);
        }
    }

    #[test]
    fn test_pause_freezes_session() {
        let mut session = quiet_session();
        obstacle_above_player(&mut session, 200.0);
        let pause = FrameInput {
            pause: true,
            ..Default::default()
        };
        session.advance(&pause, 0.1);
        assert!(session.paused);
        let elapsed = session.elapsed;
        let y = session.entities[0].pos.y;
        session.advance(&FrameInput::default(), 0.1);
        assert_eq!(session.elapsed, elapsed);
        assert_eq!(session.entities[0].pos.y, y);

        session.advance(&pause, 0.1);
        assert!(!session.paused);
        assert!(session.entities[0].pos.y > y);
    }

    #[test]
    fn test_oversized_and_bad_dt_are_clamped() {
        let mut session = quiet_session();
        session.advance(&FrameInput::default(), 10.0);
        assert!((session.elapsed - MAX_FRAME_DT).abs() < 1.0e-6);
        session.advance(&FrameInput::default(), f32::NAN);
        session.advance(&FrameInput::default(), -1.0);
        assert!((session.elapsed - MAX_FRAME_DT).abs() < 1.0e-6);
    }

    #[test]
    fn test_spawning_ramps_up() {
        let mut session = Session::new(2024);
        let start_interval = session.spawn_interval;
        let input = FrameInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..(60 * 20) {
            if session.advance(&input, 1.0 / 60.0) == FrameOutcome::PlayerDied {
                break;
            }
        }
        assert!(session.waves_spawned > 0);
        assert!(session.spawn_interval < start_interval);
    }

    #[test]
    fn test_determinism() {
        let mut a = Session::new(99999);
        let mut b = Session::new(99999);
        let inputs = [
            FrameInput {
                axis: -1.0,
                ..Default::default()
            },
            FrameInput::default(),
            FrameInput {
                axis: 0.7,
                ..Default::default()
            },
        ];
        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            let oa = a.advance(input, 1.0 / 60.0);
            let ob = b.advance(input, 1.0 / 60.0);
            assert_eq!(oa, ob);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.entities.len(), b.entities.len());
        assert_eq!(a.player.pos, b.player.pos);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn frame_input() -> impl Strategy<Value = FrameInput> {
            (-1.5f32..1.5, prop::option::of(0u8..3), any::<bool>()).prop_map(
                |(axis, dash, autopilot)| FrameInput {
                    axis,
                    dash: dash.map(|d| match d {
                        0 => DashDirection::Left,
                        1 => DashDirection::Right,
                        _ => DashDirection::Heading,
                    }),
                    pause: false,
                    autopilot,
                },
            )
        }

        /// No status effect variant appears twice
        fn one_per_kind(effects: &[StatusEffect]) -> bool {
            let kinds: Vec<_> = effects.iter().map(std::mem::discriminant).collect();
            kinds
                .iter()
                .enumerate()
                .all(|(i, k)| !kinds[i + 1..].contains(k))
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn frame_invariants_hold(
                seed in any::<u64>(),
                frames in prop::collection::vec(
                    (frame_input(), 0.0f32..0.05, prop::option::of(0usize..4)),
                    1..400,
                ),
            ) {
                let mut session = Session::new(seed);
                let mut last_score = session.score;
                let mut last_theme_rank = session.theme.unlock_score();
                for (input, dt, perk) in &frames {
                    if let Some(kind) = perk.map(|k| PowerUpKind::ALL[k]) {
                        session.effects.apply(kind, &session.tuning);
                        let effects = session.effects.list();
                        prop_assert!(one_per_kind(&effects));
                        for effect in &effects {
                            match (*effect, kind) {
                                (StatusEffect::Slow { remaining }, PowerUpKind::Slow) => {
                                    prop_assert_eq!(remaining, session.tuning.slow_duration);
                                }
                                (StatusEffect::Multiplier { remaining }, PowerUpKind::Multiplier) => {
                                    prop_assert_eq!(remaining, session.tuning.multiplier_duration);
                                }
                                _ => {}
                            }
                        }
                    }

                    let outcome = session.advance(input, *dt);

                    let x = session.player.pos.x;
                    prop_assert!(x >= FIELD_MARGIN);
                    prop_assert!(x + PLAYER_WIDTH <= FIELD_WIDTH - FIELD_MARGIN + 1.0e-3);
                    prop_assert!(session.score >= last_score);
                    prop_assert!(session.theme.unlock_score() >= last_theme_rank);
                    prop_assert!(one_per_kind(&session.effects.list()));

                    let mut ids: Vec<u32> = session.entities.iter().map(|e| e.id).collect();
                    ids.dedup();
                    prop_assert_eq!(ids.len(), session.entities.len());

                    last_score = session.score;
                    last_theme_rank = session.theme.unlock_score();
                    if outcome == FrameOutcome::PlayerDied {
                        break;
                    }
                }
            }
        }
    }
}
