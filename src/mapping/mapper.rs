//! Mapper trait

/// Trait for mapping functions
pub trait Mapper: Send + Sync {
    /// Get the name of this mapper
    fn name(&self) -> &str;

    /// Map an input value to an output value
    fn map(&self, input: f64) -> f64;
}

/// Pull `value` back inside `[min, max]`.
///
/// Unlike `f64::clamp` this never panics on an inverted band. The upper
/// bound wins ties: anything above `max` becomes `max`.
pub fn clamp_to_band(value: f64, min: f64, max: f64) -> f64 {
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}
