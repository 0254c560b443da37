//! Voice Throw entry point
//!
//! Headless driver: a synthetic tone stands in for the microphone and a hand
//! that opens and closes on a timer stands in for the camera. Type `s` to
//! start, `r` to restart and `q` to quit.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use voice_throw::capture::{ToneAmplitude, ToneSource};
use voice_throw::sim::{GameEvent, RoundCommand, RoundOrchestrator, RoundPhase, TickInput};
use voice_throw::{AudioCapture, HandReading, Settings, uniform};

/// Tone frequency, well inside the voice band
const TONE_HZ: f32 = 440.0;
/// Seconds the synthetic hand stays in each pose
const HAND_HOLD_SECS: f64 = 1.5;

/// Console commands
enum Command {
    Round(RoundCommand),
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "s" => Some(Command::Round(RoundCommand::Start)),
        "r" => Some(Command::Round(RoundCommand::Restart)),
        "q" => Some(Command::Quit),
        _ => None,
    }
}

/// Read commands from stdin on a helper thread
fn spawn_console() -> Receiver<Command> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match parse_command(&line) {
                    Some(command) => {
                        if tx.send(command).is_err() {
                            break;
                        }
                    }
                    None => log::warn!("Unknown command {:?} (s/r/q)", line.trim()),
                }
            }
            // stdin closed
            let _ = tx.send(Command::Quit);
        });
    if let Err(e) = spawned {
        log::error!("Failed to start console thread: {}", e);
    }
    rx
}

/// Closed for one hold, open for the next
fn synthetic_hand(now: f64) -> HandReading {
    if (now / HAND_HOLD_SECS) as u64 % 2 == 0 {
        HandReading::CLOSED
    } else {
        HandReading::OPEN
    }
}

/// A player who aims for the target and lands somewhere near it
struct SyntheticVoice {
    amplitude: ToneAmplitude,
    scale: f32,
    rng: Pcg32,
    aimed_for: Option<u8>,
}

impl SyntheticVoice {
    fn follow(&mut self, target: u8) {
        if self.aimed_for == Some(target) {
            return;
        }
        self.aimed_for = Some(target);
        let level = (target as f32 + uniform(&mut self.rng, -25.0, 25.0)).clamp(0.0, 100.0);
        self.amplitude
            .set(ToneSource::amplitude_for_level(level, self.scale));
        log::debug!("Synthetic voice now at level {:.0}", level);
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Voice Throw starting...");

    let path = std::env::args().nth(1).map(PathBuf::from);
    let settings = Settings::load(path.as_deref());
    let seed = settings.seed.unwrap_or_else(clock_seed);
    log::info!("Game initialized with seed: {}", seed);

    let tone = ToneSource::new(TONE_HZ, &settings.audio, true);
    let mut voice = SyntheticVoice {
        amplitude: tone.amplitude(),
        scale: settings.audio.scale,
        rng: Pcg32::seed_from_u64(seed.wrapping_add(1)),
        aimed_for: None,
    };
    let mut capture = AudioCapture::start(tone, &settings.audio);
    if !capture.is_available() {
        log::warn!("Audio unavailable; every shot will read level 0");
    }

    let mut game = RoundOrchestrator::new(&settings, seed);
    let commands = spawn_console();
    log::info!("Type s to start, r to restart, q to quit");

    let frame = Duration::from_secs_f32(1.0 / settings.physics.fallback_fps);
    let epoch = Instant::now();
    let mut next_hud = 0.0;

    'frames: loop {
        let now = epoch.elapsed().as_secs_f64();

        let mut command = None;
        loop {
            match commands.try_recv() {
                Ok(Command::Round(c)) => command = Some(c),
                Ok(Command::Quit) | Err(TryRecvError::Disconnected) => break 'frames,
                Err(TryRecvError::Empty) => break,
            }
        }

        voice.follow(game.state.target_accuracy);
        let input = TickInput {
            now,
            hand: synthetic_hand(now),
            level: capture.level(),
            command,
        };

        for event in game.tick(&input) {
            if let Some(cue) = event.sound_cue() {
                log::debug!("Sound cue: {:?}", cue);
            }
            match event {
                GameEvent::ShotLaunched { accuracy, will_score } => {
                    log::info!("Shot away at {:.0}% ({})", accuracy, if will_score { "on target" } else { "off" })
                }
                GameEvent::Scored { score } => log::info!("SCORE! ({})", score),
                GameEvent::Missed { misses } => log::info!("Miss ({})", misses),
                GameEvent::NewBest { best } => log::info!("New best: {}", best),
                GameEvent::RoundOver { score, best } => {
                    log::info!("Time! Final score {} (best {}). Type r to play again", score, best)
                }
                GameEvent::RoundStarted => log::info!("Go!"),
            }
        }

        if now >= next_hud {
            next_hud = now + 1.0;
            let hud = game.state.snapshot(now);
            if hud.phase == RoundPhase::Active {
                log::info!(
                    "[{:>2.0}s] score {} miss {} best {} | target {} level {:.0}{}",
                    hud.remaining,
                    hud.score,
                    hud.misses,
                    hud.best,
                    hud.target_accuracy,
                    input.level,
                    if hud.ready { "" } else { " | ball in air" }
                );
            }
        }

        thread::sleep(frame);
    }

    capture.stop();
    log::info!("Bye");
}
