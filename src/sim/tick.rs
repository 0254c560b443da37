//! Per-frame round loop
//!
//! Samples the voice level and hand gesture once per frame, fires shots,
//! steps the ball in flight and applies outcomes to the round.

use super::court::Court;
use super::projectile::Projectile;
use super::shot::ShotAttempt;
use super::state::{GameEvent, LastShot, RoundPhase, RoundState};
use crate::gesture::{GestureTrigger, HandReading};
use crate::settings::{PhysicsSettings, Settings};

/// Round control commands from the keyboard (quit is handled by the caller)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundCommand {
    /// Begin the first round
    Start,
    /// Abandon the current round and begin a new one
    Restart,
}

/// Inputs for a single frame
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Wall clock time in seconds
    pub now: f64,
    /// Hand classification for this frame
    pub hand: HandReading,
    /// Smoothed voice level (0-100) read from the capture thread
    pub level: f32,
    pub command: Option<RoundCommand>,
}

/// Fixed rules a round is played under
#[derive(Debug, Clone)]
pub struct Rules {
    pub court: Court,
    pub physics: PhysicsSettings,
}

impl From<&Settings> for Rules {
    fn from(settings: &Settings) -> Self {
        Self {
            court: Court::from(&settings.court),
            physics: settings.physics.clone(),
        }
    }
}

/// Advance the round by one frame and report what happened
pub fn tick(
    state: &mut RoundState,
    trigger: &mut GestureTrigger,
    rules: &Rules,
    input: &TickInput,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let now = input.now;

    match input.command {
        Some(RoundCommand::Start) if state.phase == RoundPhase::NotStarted => {
            state.start_round(now);
            events.push(GameEvent::RoundStarted);
        }
        Some(RoundCommand::Start) => log::debug!("Start ignored in {:?}", state.phase),
        Some(RoundCommand::Restart) => {
            state.start_round(now);
            events.push(GameEvent::RoundStarted);
        }
        None => {}
    }

    // Frame delta, with a fixed-rate fallback for a stalled or backwards clock
    let dt = match state.last_tick.map(|prev| (now - prev) as f32) {
        Some(dt) if dt > 0.0 => dt,
        _ => 1.0 / rules.physics.fallback_fps,
    };
    state.last_tick = Some(now);

    if state.phase == RoundPhase::Active {
        let elapsed = (now - state.start_time) as f32;
        state.remaining = (state.settings().duration_secs - elapsed).max(0.0);
        if state.remaining <= 0.0 {
            state.finish_round(&mut events);
        }
    }

    // The trigger sees every frame so its memory tracks the hand
    let shoot = trigger.process(input.hand);
    if shoot && state.phase == RoundPhase::Active && state.ball.is_none() {
        let attempt = ShotAttempt::resolve(
            input.level,
            state.target_accuracy,
            &rules.court,
            rules.physics.gravity,
            rules.physics.flight_time,
            &mut state.rng,
        );
        log::info!(
            "Shot: level {:.1} vs target {} -> accuracy {:.0}%",
            input.level,
            state.target_accuracy,
            attempt.derived_accuracy()
        );
        events.push(GameEvent::ShotLaunched {
            accuracy: attempt.derived_accuracy(),
            will_score: attempt.will_score(),
        });
        state.last_shot = Some(LastShot {
            accuracy: attempt.derived_accuracy(),
            result: None,
            resolved_at: None,
        });
        state.ball = Some(Projectile::launch(attempt));
    }

    let outcome = match state.ball.as_mut() {
        Some(ball) => ball.step(dt, &rules.court, rules.physics.gravity, &mut state.rng),
        None => None,
    };
    if let Some(outcome) = outcome {
        state.apply_outcome(outcome, now, &mut events);
    }

    events
}

/// Owns the round state and the gesture trigger and drives them per frame
#[derive(Debug, Clone)]
pub struct RoundOrchestrator {
    pub state: RoundState,
    pub trigger: GestureTrigger,
    pub rules: Rules,
}

impl RoundOrchestrator {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        Self {
            state: RoundState::new(seed, &settings.round),
            trigger: GestureTrigger::new(),
            rules: Rules::from(settings),
        }
    }

    pub fn tick(&mut self, input: &TickInput) -> Vec<GameEvent> {
        tick(&mut self.state, &mut self.trigger, &self.rules, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ShotOutcome;

    const FRAME: f64 = 1.0 / 60.0;

    fn orchestrator(seed: u64) -> RoundOrchestrator {
        RoundOrchestrator::new(&Settings::default(), seed)
    }

    fn frame(now: f64, hand: HandReading, level: f32) -> TickInput {
        TickInput {
            now,
            hand,
            level,
            command: None,
        }
    }

    fn command(now: f64, command: RoundCommand) -> TickInput {
        TickInput {
            now,
            command: Some(command),
            ..Default::default()
        }
    }

    /// Closed then open on consecutive frames; returns the clock after the shot
    fn shoot(game: &mut RoundOrchestrator, now: f64, level: f32) -> (f64, Vec<GameEvent>) {
        game.tick(&frame(now, HandReading::CLOSED, level));
        let events = game.tick(&frame(now + FRAME, HandReading::OPEN, level));
        (now + FRAME, events)
    }

    /// Tick with no hand until the ball lands
    fn fly(game: &mut RoundOrchestrator, mut now: f64) -> (f64, Vec<GameEvent>) {
        for _ in 0..1000 {
            now += FRAME;
            let events = game.tick(&frame(now, HandReading::NoHand, 0.0));
            if game.state.ball.is_none() {
                return (now, events);
            }
        }
        panic!("ball never landed");
    }

    #[test]
    fn test_start_command() {
        let mut game = orchestrator(1);
        assert_eq!(game.state.phase, RoundPhase::NotStarted);
        let events = game.tick(&command(5.0, RoundCommand::Start));
        assert_eq!(events, vec![GameEvent::RoundStarted]);
        assert_eq!(game.state.phase, RoundPhase::Active);
        assert_eq!(game.state.start_time, 5.0);

        // A second start does not reset the running round
        game.state.score = 3;
        game.tick(&command(6.0, RoundCommand::Start));
        assert_eq!(game.state.score, 3);
    }

    #[test]
    fn test_no_shots_before_start() {
        let mut game = orchestrator(2);
        let (_, events) = shoot(&mut game, 0.0, 50.0);
        assert!(events.is_empty());
        assert!(game.state.ball.is_none());
    }

    #[test]
    fn test_trigger_launches_one_ball() {
        let mut game = orchestrator(3);
        game.tick(&command(0.0, RoundCommand::Start));
        let level = game.state.target_accuracy as f32;
        let (now, events) = shoot(&mut game, FRAME, level);

        assert!(matches!(
            events.as_slice(),
            [GameEvent::ShotLaunched { will_score: true, .. }]
        ));
        assert!(game.state.ball.is_some());
        assert!(!game.state.snapshot(now).ready);

        // A second cycle while the ball flies is ignored
        let launched = game.state.ball.as_ref().map(|b| b.attempt().clone());
        shoot(&mut game, now + FRAME, 0.0);
        assert_eq!(game.state.ball.as_ref().map(|b| b.attempt().clone()), launched);
    }

    #[test]
    fn test_perfect_shot_scores_and_redraws_target() {
        let mut game = orchestrator(4);
        game.tick(&command(0.0, RoundCommand::Start));
        game.state.target_accuracy = 80;
        let (now, _) = shoot(&mut game, FRAME, 80.0);
        assert_eq!(game.state.last_shot.map(|s| s.accuracy), Some(100.0));

        let (now, events) = fly(&mut game, now);
        assert_eq!(
            events,
            vec![GameEvent::Scored { score: 1 }, GameEvent::NewBest { best: 1 }]
        );
        assert_eq!(game.state.score, 1);
        assert_eq!(game.state.best, 1);
        assert!((40..=95).contains(&game.state.target_accuracy));

        let snapshot = game.state.snapshot(now);
        assert_eq!(
            snapshot.last_shot.and_then(|s| s.result),
            Some(ShotOutcome::Score)
        );
        assert_eq!(snapshot.result_alpha, 1.0);
        assert!(snapshot.ready);
    }

    #[test]
    fn test_far_off_shot_misses() {
        let mut game = orchestrator(5);
        game.tick(&command(0.0, RoundCommand::Start));
        game.state.target_accuracy = 90;
        let (now, events) = shoot(&mut game, FRAME, 10.0);
        assert!(matches!(
            events.as_slice(),
            [GameEvent::ShotLaunched { will_score: false, .. }]
        ));

        let (_, events) = fly(&mut game, now);
        assert_eq!(events, vec![GameEvent::Missed { misses: 1 }]);
        assert_eq!(game.state.misses, 1);
        assert_eq!(game.state.score, 0);
    }

    #[test]
    fn test_timer_counts_down() {
        let mut game = orchestrator(6);
        game.tick(&command(100.0, RoundCommand::Start));
        game.tick(&frame(115.0, HandReading::NoHand, 0.0));
        assert!((game.state.remaining - 45.0).abs() < 1e-3);
        assert_eq!(game.state.phase, RoundPhase::Active);
    }

    #[test]
    fn test_round_expiry_keeps_best_and_restart_resets() {
        let mut game = orchestrator(7);
        game.tick(&command(0.0, RoundCommand::Start));
        game.state.score = 5;
        game.state.best = 5;

        let events = game.tick(&frame(60.0, HandReading::NoHand, 0.0));
        assert_eq!(events, vec![GameEvent::RoundOver { score: 5, best: 5 }]);
        assert_eq!(game.state.phase, RoundPhase::Over);
        assert_eq!(game.state.remaining, 0.0);
        assert_eq!(game.state.best, 5);

        // Further frames do nothing
        assert!(game.tick(&frame(61.0, HandReading::NoHand, 0.0)).is_empty());

        let events = game.tick(&command(70.0, RoundCommand::Restart));
        assert_eq!(events, vec![GameEvent::RoundStarted]);
        assert_eq!(game.state.phase, RoundPhase::Active);
        assert_eq!(game.state.score, 0);
        assert_eq!(game.state.misses, 0);
        assert_eq!(game.state.best, 5);
    }

    #[test]
    fn test_round_expiry_commits_new_best() {
        let mut game = orchestrator(8);
        game.tick(&command(0.0, RoundCommand::Start));
        game.state.score = 4;
        game.state.best = 2;
        let events = game.tick(&frame(61.0, HandReading::NoHand, 0.0));
        assert_eq!(
            events,
            vec![
                GameEvent::NewBest { best: 4 },
                GameEvent::RoundOver { score: 4, best: 4 }
            ]
        );
    }

    #[test]
    fn test_round_end_drops_ball_in_flight() {
        let mut game = orchestrator(9);
        game.tick(&command(0.0, RoundCommand::Start));
        game.state.target_accuracy = 80;
        shoot(&mut game, 59.9, 80.0);
        assert!(game.state.ball.is_some());

        game.tick(&frame(60.0, HandReading::NoHand, 0.0));
        assert_eq!(game.state.phase, RoundPhase::Over);
        assert!(game.state.ball.is_none());
        assert_eq!(game.state.score, 0);
    }

    #[test]
    fn test_no_shots_after_round_over() {
        let mut game = orchestrator(10);
        game.tick(&command(0.0, RoundCommand::Start));
        game.tick(&frame(60.0, HandReading::NoHand, 0.0));
        let (_, events) = shoot(&mut game, 61.0, 50.0);
        assert!(events.is_empty());
        assert!(game.state.ball.is_none());
    }

    #[test]
    fn test_restart_mid_round_clears_ball() {
        let mut game = orchestrator(11);
        game.tick(&command(0.0, RoundCommand::Start));
        game.state.score = 3;
        shoot(&mut game, 1.0, 50.0);
        assert!(game.state.ball.is_some());

        game.tick(&command(2.0, RoundCommand::Restart));
        assert!(game.state.ball.is_none());
        assert_eq!(game.state.score, 0);
        assert_eq!(game.state.best, 3);
        assert!(game.state.last_shot.is_none());
    }

    #[test]
    fn test_clock_stall_uses_fallback_dt() {
        let mut game = orchestrator(12);
        game.tick(&command(0.0, RoundCommand::Start));
        game.state.target_accuracy = 80;
        shoot(&mut game, 1.0, 80.0);
        let before = game.state.ball.as_ref().map(|b| b.pos).unwrap();

        // Same timestamp: the ball still moves one fallback frame
        game.tick(&frame(1.0 + FRAME, HandReading::NoHand, 0.0));
        let after = game.state.ball.as_ref().map(|b| b.pos).unwrap();
        let vx = game.state.ball.as_ref().map(|b| b.vel.x).unwrap();
        assert!((after.x - before.x - vx / 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_same_seed_same_game() {
        let run = |seed| {
            let mut game = orchestrator(seed);
            game.tick(&command(0.0, RoundCommand::Start));
            let mut now = 0.0;
            let mut log = Vec::new();
            for i in 0..5 {
                let (t, events) = shoot(&mut game, now + FRAME, 60.0 + i as f32);
                log.extend(events);
                let (t, events) = fly(&mut game, t);
                log.extend(events);
                now = t;
            }
            (log, game.state.score, game.state.misses)
        };
        assert_eq!(run(42), run(42));
    }
}
