//! Linear mapper implementation

use super::{clamp_to_band, Mapper};

/// Linear interpolation mapper
///
/// Maps `in_min..in_max` onto `out_start..out_end` (either direction), then
/// clamps the result into the `band` it must stay inside.
pub struct LinearMapper {
    name: &'static str,
    in_min: f64,
    in_max: f64,
    out_start: f64,
    out_end: f64,
    band: Option<(f64, f64)>,
}

impl LinearMapper {
    /// Create a new linear mapper
    pub fn new(
        name: &'static str,
        in_min: f64,
        in_max: f64,
        out_start: f64,
        out_end: f64,
    ) -> Self {
        Self {
            name,
            in_min,
            in_max,
            out_start,
            out_end,
            band: None,
        }
    }

    /// Clamp output into `[min, max]`
    pub fn with_band(mut self, min: f64, max: f64) -> Self {
        self.band = Some((min, max));
        self
    }
}

impl Mapper for LinearMapper {
    fn name(&self) -> &str {
        self.name
    }

    fn map(&self, input: f64) -> f64 {
        // Normalize input to 0..1
        let in_range = self.in_max - self.in_min;
        let normalized = if in_range.abs() < f64::EPSILON {
            0.0
        } else {
            (input - self.in_min) / in_range
        };

        let output = self.out_start + (self.out_end - self.out_start) * normalized;

        match self.band {
            Some((min, max)) => {
                let clamped = clamp_to_band(output, min, max);
                if clamped != output {
                    log::debug!("{} clamped from {:.4} to {:.4}", self.name, output, clamped);
                }
                clamped
            }
            None => output,
        }
    }
}
