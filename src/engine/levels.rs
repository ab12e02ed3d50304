//! Lock-free channel volumes and overall gain
//!
//! The event handler, an in-flight ramp and the audio callback all touch
//! these values, so they live in atomics rather than behind the mixer lock.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

struct Levels {
    left_bits: AtomicU32,
    right_bits: AtomicU32,
    gain_bits: AtomicU32,
}

/// Shared left/right volume and overall gain, each in `0.0..=1.0`.
///
/// Cloning is cheap and every clone sees the same values.
#[derive(Clone)]
pub struct StereoLevels {
    levels: Arc<Levels>,
}

impl StereoLevels {
    /// Silent channels at full gain
    pub fn new() -> Self {
        Self {
            levels: Arc::new(Levels {
                left_bits: AtomicU32::new(0.0f32.to_bits()),
                right_bits: AtomicU32::new(0.0f32.to_bits()),
                gain_bits: AtomicU32::new(1.0f32.to_bits()),
            }),
        }
    }

    pub fn set_channels(&self, left: f64, right: f64) {
        store(&self.levels.left_bits, left);
        store(&self.levels.right_bits, right);
    }

    pub fn set_gain(&self, gain: f64) {
        store(&self.levels.gain_bits, gain);
    }

    pub fn left(&self) -> f32 {
        load(&self.levels.left_bits)
    }

    pub fn right(&self) -> f32 {
        load(&self.levels.right_bits)
    }

    pub fn gain(&self) -> f32 {
        load(&self.levels.gain_bits)
    }
}

impl Default for StereoLevels {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StereoLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StereoLevels")
            .field("left", &self.left())
            .field("right", &self.right())
            .field("gain", &self.gain())
            .finish()
    }
}

fn store(slot: &AtomicU32, value: f64) {
    // NaN fails safe to silence
    let value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
    slot.store((value as f32).to_bits(), Ordering::Relaxed);
}

fn load(slot: &AtomicU32) -> f32 {
    f32::from_bits(slot.load(Ordering::Relaxed))
}
