//! Microphone capture
//!
//! A background thread pulls blocks from an [`AudioSource`], runs them through
//! the [`LevelExtractor`] and publishes the result to a [`SharedLevel`]. The
//! game tick only ever reads the newest value; nothing queues between them.

pub mod level;
pub mod source;

pub use level::LevelExtractor;
pub use source::{AudioSource, CaptureError, ToneAmplitude, ToneSource};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread::{self, JoinHandle};

use crate::settings::AudioSettings;

/// Last-value-wins voice level shared between the capture thread and the game
#[derive(Debug, Clone, Default)]
pub struct SharedLevel(Arc<AtomicU32>);

impl SharedLevel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a level; non-finite values are dropped
    pub fn store(&self, level: f32) {
        if level.is_finite() {
            self.0
                .store(level.clamp(0.0, 100.0).to_bits(), Ordering::Release);
        }
    }

    /// Most recent level (0-100)
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }
}

/// Running (or unavailable) microphone capture session
pub struct AudioCapture {
    level: SharedLevel,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl AudioCapture {
    /// Open `source` and start the capture thread.
    ///
    /// If the device cannot be opened the session is still returned, but it is
    /// unavailable and its level stays at 0 for its whole lifetime.
    pub fn start<S: AudioSource>(mut source: S, settings: &AudioSettings) -> Self {
        let level = SharedLevel::new();
        let running = Arc::new(AtomicBool::new(false));

        if let Err(e) = source.open() {
            log::warn!("Voice input disabled: {}", e);
            return Self {
                level,
                running,
                worker: None,
            };
        }

        running.store(true, Ordering::Release);
        let mut extractor = LevelExtractor::new(settings);
        let thread_level = level.clone();
        let thread_running = running.clone();
        let block_size = settings.block_size;

        let spawned = thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || {
                let mut block = Vec::with_capacity(block_size);
                while thread_running.load(Ordering::Acquire) {
                    match source.read_block(&mut block) {
                        Ok(()) => thread_level.store(extractor.ingest(&block)),
                        // Keep the previous level
                        Err(e) => log::debug!("Dropped audio block: {}", e),
                    }
                }
                source.close();
                log::debug!("Audio capture thread finished");
            });

        match spawned {
            Ok(handle) => {
                log::info!("Audio capture initialized");
                Self {
                    level,
                    running,
                    worker: Some(handle),
                }
            }
            Err(e) => {
                log::warn!("Voice input disabled: failed to spawn capture thread: {}", e);
                running.store(false, Ordering::Release);
                Self {
                    level,
                    running,
                    worker: None,
                }
            }
        }
    }

    /// Whether a capture thread is feeding the level
    pub fn is_available(&self) -> bool {
        self.worker.is_some()
    }

    /// Current smoothed level (0-100)
    pub fn level(&self) -> f32 {
        self.level.load()
    }

    /// Handle to the published level
    pub fn shared_level(&self) -> SharedLevel {
        self.level.clone()
    }

    /// Stop capturing and wait for the device to be released
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("Audio capture thread panicked");
            }
            log::info!("Audio capture stopped");
        }
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Replays scripted reads, then repeats the last good block
    struct ScriptedSource {
        open_fails: bool,
        reads: Vec<Result<Vec<i16>, ()>>,
        last: Vec<i16>,
        closed: Arc<AtomicBool>,
        reads_done: Arc<Mutex<usize>>,
    }

    impl ScriptedSource {
        fn new(reads: Vec<Result<Vec<i16>, ()>>) -> Self {
            Self {
                open_fails: false,
                reads,
                last: Vec::new(),
                closed: Arc::new(AtomicBool::new(false)),
                reads_done: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl AudioSource for ScriptedSource {
        fn open(&mut self) -> Result<(), CaptureError> {
            if self.open_fails {
                Err(CaptureError::DeviceUnavailable("no microphone".into()))
            } else {
                Ok(())
            }
        }

        fn read_block(&mut self, block: &mut Vec<i16>) -> Result<(), CaptureError> {
            thread::sleep(Duration::from_millis(1));
            *self.reads_done.lock().unwrap() += 1;
            let next = if self.reads.is_empty() {
                Ok(self.last.clone())
            } else {
                self.reads.remove(0)
            };
            match next {
                Ok(samples) => {
                    self.last = samples.clone();
                    *block = samples;
                    Ok(())
                }
                Err(()) => Err(CaptureError::Read("overflow".into())),
            }
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::Release);
        }
    }

    fn wait_for_reads(counter: &Arc<Mutex<usize>>, n: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while *counter.lock().unwrap() < n && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn tone_block(settings: &AudioSettings, level: f32) -> Vec<i16> {
        let mut tone = ToneSource::new(990.52734, settings, false);
        tone.amplitude()
            .set(ToneSource::amplitude_for_level(level, settings.scale));
        let mut block = Vec::new();
        tone.read_block(&mut block).unwrap();
        block
    }

    #[test]
    fn test_shared_level_clamps_and_ignores_nan() {
        let level = SharedLevel::new();
        assert_eq!(level.load(), 0.0);
        level.store(140.0);
        assert_eq!(level.load(), 100.0);
        level.store(f32::NAN);
        assert_eq!(level.load(), 100.0);
        level.store(-3.0);
        assert_eq!(level.load(), 0.0);
    }

    #[test]
    fn test_unavailable_device_reports_zero() {
        let settings = AudioSettings::default();
        let mut source = ScriptedSource::new(vec![Ok(vec![1000; 1024])]);
        source.open_fails = true;
        let mut capture = AudioCapture::start(source, &settings);
        assert!(!capture.is_available());
        assert_eq!(capture.level(), 0.0);
        capture.stop();
        assert_eq!(capture.level(), 0.0);
    }

    #[test]
    fn test_read_errors_keep_previous_level() {
        let settings = AudioSettings::default();
        let block = tone_block(&settings, 40.0);
        let source = ScriptedSource::new(vec![Ok(block), Err(()), Err(()), Err(())]);
        let reads_done = source.reads_done.clone();
        let closed = source.closed.clone();

        let mut capture = AudioCapture::start(source, &settings);
        assert!(capture.is_available());
        wait_for_reads(&reads_done, 6);

        // The repeated good block keeps the mean where the first block put it
        assert!((capture.level() - 40.0).abs() < 3.0, "level was {}", capture.level());

        capture.stop();
        assert!(closed.load(Ordering::Acquire));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let settings = AudioSettings::default();
        let source = ScriptedSource::new(vec![Ok(vec![0; 1024])]);
        let mut capture = AudioCapture::start(source, &settings);
        capture.stop();
        capture.stop();
        assert!(!capture.is_available());
    }
}
