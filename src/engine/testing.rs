//! Recording output for tests

use super::{AudioOutput, SineWave};
use std::sync::Mutex;

/// One call made against an [`AudioOutput`]
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCall {
    Volume(f64, f64),
    Gain(f64),
    Play { frequency: f64, amplitude: f64 },
    Stop,
    Pause,
    Unpause,
}

/// Output that remembers every call in order
#[derive(Debug, Default)]
pub struct RecordingOutput {
    calls: Mutex<Vec<OutputCall>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<OutputCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn gains(&self) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                OutputCall::Gain(g) => Some(g),
                _ => None,
            })
            .collect()
    }

    pub fn volumes(&self) -> Vec<(f64, f64)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                OutputCall::Volume(l, r) => Some((l, r)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(&self, call: OutputCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl AudioOutput for RecordingOutput {
    fn set_channel_volume(&self, left: f64, right: f64) {
        self.push(OutputCall::Volume(left, right));
    }

    fn set_overall_gain(&self, gain: f64) {
        self.push(OutputCall::Gain(gain));
    }

    fn play_looping(&self, wave: SineWave) {
        self.push(OutputCall::Play {
            frequency: wave.frequency(),
            amplitude: wave.amplitude(),
        });
    }

    fn stop(&self) {
        self.push(OutputCall::Stop);
    }

    fn pause(&self) {
        self.push(OutputCall::Pause);
    }

    fn unpause(&self) {
        self.push(OutputCall::Unpause);
    }
}
