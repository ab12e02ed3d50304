//! Mixer that renders the looping sine into stereo frames
//!
//! The waveform is shaped twice on its way out:
//! - overall gain, driven by ramps
//! - per-channel volume, driven by motor intensity

use super::{AudioOutput, SineWave, StereoLevels};
use std::sync::{Arc, Mutex, MutexGuard};

/// Transport state of the looping waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Renders frames from the current waveform and levels
pub struct Mixer {
    levels: StereoLevels,
    wave: Option<Arc<SineWave>>,
    cursor: usize,
    state: PlaybackState,
}

impl Mixer {
    /// Create a stopped mixer reading from `levels`
    pub fn new(levels: StereoLevels) -> Self {
        Self {
            levels,
            wave: None,
            cursor: 0,
            state: PlaybackState::Stopped,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Swap in a new waveform and start playing it.
    ///
    /// The read position carries over so the tone continues in time
    /// instead of restarting at phase zero.
    pub fn play(&mut self, wave: Arc<SineWave>) {
        if !wave.is_empty() {
            self.cursor %= wave.len();
        } else {
            self.cursor = 0;
        }
        self.wave = Some(wave);
        self.state = PlaybackState::Playing;
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.cursor = 0;
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn unpause(&mut self) {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
        }
    }

    /// Generate the next (left, right) frame
    pub fn next_frame(&mut self) -> (f32, f32) {
        let wave = match (&self.wave, self.state) {
            (Some(wave), PlaybackState::Playing) if !wave.is_empty() => wave,
            _ => return (0.0, 0.0),
        };

        let sample = wave.sample(self.cursor) * self.levels.gain();
        self.cursor = (self.cursor + 1) % wave.len();

        (
            (sample * self.levels.left()).clamp(-1.0, 1.0),
            (sample * self.levels.right()).clamp(-1.0, 1.0),
        )
    }

    /// Fill an interleaved buffer with `channels` samples per frame.
    ///
    /// Mono devices get the average of both channels; channels past the
    /// second are silent.
    pub fn fill_buffer(&mut self, buffer: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        for frame in buffer.chunks_mut(channels) {
            let (left, right) = self.next_frame();
            match frame {
                [mono] => *mono = (left + right) / 2.0,
                [l, r, rest @ ..] => {
                    *l = left;
                    *r = right;
                    rest.fill(0.0);
                }
                [] => {}
            }
        }
    }
}

/// Thread-safe handle to a [`Mixer`]; the [`AudioOutput`] used by the core.
///
/// Level changes go straight to the atomics. Transport changes and
/// waveform swaps take the mixer lock, so the audio callback always
/// renders a whole buffer from one waveform.
#[derive(Clone)]
pub struct MixerHandle {
    mixer: Arc<Mutex<Mixer>>,
    levels: StereoLevels,
}

impl MixerHandle {
    pub fn new() -> Self {
        let levels = StereoLevels::new();
        Self {
            mixer: Arc::new(Mutex::new(Mixer::new(levels.clone()))),
            levels,
        }
    }

    /// Shared mixer, for the audio callback
    pub fn mixer(&self) -> Arc<Mutex<Mixer>> {
        Arc::clone(&self.mixer)
    }

    pub fn state(&self) -> PlaybackState {
        self.lock().state()
    }

    fn lock(&self) -> MutexGuard<'_, Mixer> {
        self.mixer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MixerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for MixerHandle {
    fn set_channel_volume(&self, left: f64, right: f64) {
        self.levels.set_channels(left, right);
    }

    fn set_overall_gain(&self, gain: f64) {
        self.levels.set_gain(gain);
    }

    fn play_looping(&self, wave: SineWave) {
        self.lock().play(Arc::new(wave));
    }

    fn stop(&self) {
        self.lock().stop();
    }

    fn pause(&self) {
        self.lock().pause();
    }

    fn unpause(&self) {
        self.lock().unpause();
    }
}
