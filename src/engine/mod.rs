//! Audio engine for rumbletone
//!
//! Plays a looping sine and exposes the two independent controls the
//! haptic core drives: the stereo split and the overall gain.

mod levels;
mod mixer;
mod player;
mod waveform;

#[cfg(test)]
pub(crate) mod testing;

pub use levels::StereoLevels;
pub use mixer::{Mixer, MixerHandle, PlaybackState};
pub use player::{default_device_name, list_output_devices, Player};
pub use waveform::SineWave;

/// The audio output service used by the haptic core.
///
/// Volumes and gain are clamped to `0.0..=1.0`. Calls must return quickly;
/// they are issued from the controller notification path.
pub trait AudioOutput: Send + Sync {
    /// Set left and right channel volume
    fn set_channel_volume(&self, left: f64, right: f64);

    /// Set the multiplier applied to the whole waveform
    fn set_overall_gain(&self, gain: f64);

    /// Replace the current waveform and loop it
    fn play_looping(&self, wave: SineWave);

    fn stop(&self);

    fn pause(&self);

    fn unpause(&self);
}
