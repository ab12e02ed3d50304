//! Looping sine buffer

use std::f64::consts::PI;

/// One second of a sine tone, ready to loop without a seam.
///
/// The buffer always holds a whole number of cycles, so the played
/// frequency is `frequency` rounded to the nearest Hz (at least 1 Hz).
#[derive(Debug, Clone, PartialEq)]
pub struct SineWave {
    samples: Vec<f32>,
    frequency: f64,
    amplitude: f64,
}

impl SineWave {
    /// Render a sine at `frequency` Hz scaled by `amplitude`
    pub fn new(frequency: f64, amplitude: f64, sample_rate: u32) -> Self {
        let len = sample_rate.max(1) as usize;
        let cycles = frequency.round().max(1.0);

        let samples = (0..len)
            .map(|i| {
                let phase = cycles * i as f64 / len as f64;
                (amplitude * (phase * 2.0 * PI).sin()) as f32
            })
            .collect();

        Self {
            samples,
            frequency: cycles,
            amplitude,
        }
    }

    /// Frequency actually rendered
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at `index`, wrapping around the loop
    pub fn sample(&self, index: usize) -> f32 {
        self.samples[index % self.samples.len()]
    }
}
