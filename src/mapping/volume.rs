//! Motor intensity to stereo volume mapping

use super::{LinearMapper, Mapper};
use crate::config::{ModeFlags, RuntimeConfig};

/// Raw rumble strength reported by the controller
pub type MotorIntensity = u8;

/// Strongest rumble a motor can report
pub const MAX_INTENSITY: MotorIntensity = u8::MAX;

/// Pivot used by halfway mode, derived from the input resolution
pub const HALF_INTENSITY: f64 = MAX_INTENSITY as f64 / 2.0;

/// Left/right channel volumes, each in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeTarget {
    pub left: f64,
    pub right: f64,
}

impl VolumeTarget {
    /// Both channels muted
    pub const SILENT: VolumeTarget = VolumeTarget { left: 0.0, right: 0.0 };

    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

/// How motor intensity is spread across the two channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingMode {
    /// Left falls from max to min while right rises from min to max
    Linear,
    /// Left sweeps the lower half, right sweeps the upper half
    Halfway {
        /// Hold left at max instead of min once right takes over
        extended: bool,
    },
}

impl MappingMode {
    pub fn from_flags(modes: &ModeFlags) -> Self {
        if modes.halfway {
            MappingMode::Halfway { extended: modes.extended }
        } else {
            MappingMode::Linear
        }
    }
}

/// Compute the stereo volumes for `motor` under the live configuration.
///
/// Every component is clamped into its channel's `[min, max]` band.
/// Intensity 0 is not special-cased here; the event handler silences
/// the output itself before ever calling this.
pub fn map_volumes(motor: MotorIntensity, config: &RuntimeConfig) -> VolumeTarget {
    let motor = f64::from(motor);
    let full = f64::from(MAX_INTENSITY);

    match MappingMode::from_flags(&config.modes) {
        MappingMode::Linear => {
            let left = LinearMapper::new("lvol", 0.0, full, config.l_max_vol, config.l_min_vol)
                .with_band(config.l_min_vol, config.l_max_vol);
            let right = LinearMapper::new("rvol", 0.0, full, config.r_min_vol, config.r_max_vol)
                .with_band(config.r_min_vol, config.r_max_vol);

            VolumeTarget::new(left.map(motor), right.map(motor))
        }
        MappingMode::Halfway { extended } => {
            if motor < HALF_INTENSITY {
                let left = LinearMapper::new(
                    "lvol",
                    0.0,
                    HALF_INTENSITY,
                    config.l_max_vol,
                    config.l_min_vol,
                )
                .with_band(config.l_min_vol, config.l_max_vol);

                VolumeTarget::new(left.map(motor), config.r_min_vol)
            } else {
                let right = LinearMapper::new(
                    "rvol",
                    HALF_INTENSITY,
                    full,
                    config.r_min_vol,
                    config.r_max_vol,
                )
                .with_band(config.r_min_vol, config.r_max_vol);
                let left = if extended { config.l_max_vol } else { config.l_min_vol };

                VolumeTarget::new(left, right.map(motor))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn halfway(extended: bool) -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.modes.halfway = true;
        config.modes.extended = extended;
        config
    }

    #[test]
    fn test_linear_endpoints() {
        let config = RuntimeConfig::default();

        let low = map_volumes(1, &config);
        assert!(low.left <= 0.5 && low.left > 0.49);
        assert!(low.right >= 0.4 && low.right < 0.41);

        let high = map_volumes(255, &config);
        assert!((high.left - 0.4).abs() < EPS);
        assert!((high.right - 0.5).abs() < EPS);
    }

    #[test]
    fn test_linear_midpoint() {
        let config = RuntimeConfig::default();
        let target = map_volumes(128, &config);

        // 0.5 + (0.4 - 0.5) * 128/255 and 0.4 + (0.5 - 0.4) * 128/255
        assert!((target.left - 0.449_803_921_568_627_4).abs() < EPS);
        assert!((target.right - 0.450_196_078_431_372_5).abs() < EPS);
    }

    #[test]
    fn test_linear_is_monotonic_and_banded() {
        let mut config = RuntimeConfig::default();
        config.l_min_vol = 0.1;
        config.l_max_vol = 0.9;
        config.r_min_vol = 0.2;
        config.r_max_vol = 0.7;

        let mut previous = map_volumes(0, &config);
        for motor in 1..=MAX_INTENSITY {
            let target = map_volumes(motor, &config);
            assert!(target.left <= previous.left, "left rose at {}", motor);
            assert!(target.right >= previous.right, "right fell at {}", motor);
            assert!((0.1..=0.9).contains(&target.left));
            assert!((0.2..=0.7).contains(&target.right));
            previous = target;
        }
    }

    #[test]
    fn test_linear_inverted_band_is_clamped() {
        let mut config = RuntimeConfig::default();
        config.l_min_vol = 0.8;
        config.l_max_vol = 0.2;

        // Formula would give 0.2 at motor 0, the inverted band pins it to max
        for motor in [1, 64, 128, 255] {
            assert_eq!(map_volumes(motor, &config).left, 0.2);
        }
    }

    #[test]
    fn test_halfway_lower_half_pins_right() {
        let config = halfway(false);

        for motor in 0..=127u8 {
            let target = map_volumes(motor, &config);
            assert_eq!(target.right, config.r_min_vol);
            assert!(target.left >= config.l_min_vol && target.left <= config.l_max_vol);
        }

        // Left reaches its minimum near the midpoint rather than at full scale
        let near_mid = map_volumes(127, &config);
        assert!(near_mid.left - config.l_min_vol < 0.001);
    }

    #[test]
    fn test_halfway_upper_half_pins_left_to_min() {
        let config = halfway(false);

        for motor in 128..=MAX_INTENSITY {
            let target = map_volumes(motor, &config);
            assert_eq!(target.left, config.l_min_vol);
        }
        let full = map_volumes(255, &config);
        assert!((full.right - config.r_max_vol).abs() < EPS);
    }

    #[test]
    fn test_halfway_extended_holds_left_at_max() {
        let config = halfway(true);

        for motor in 128..=MAX_INTENSITY {
            assert_eq!(map_volumes(motor, &config).left, config.l_max_vol);
        }
        // Extended has no effect below the pivot
        assert_eq!(map_volumes(10, &config), map_volumes(10, &halfway(false)));
    }

    #[test]
    fn test_halfway_right_sweeps_upper_half() {
        let config = halfway(false);

        let just_above = map_volumes(128, &config);
        assert!(just_above.right >= config.r_min_vol);
        assert!(just_above.right < config.r_min_vol + 0.001);

        let mut previous = just_above.right;
        for motor in 129..=MAX_INTENSITY {
            let right = map_volumes(motor, &config).right;
            assert!(right >= previous);
            previous = right;
        }
    }

    #[test]
    fn test_mapping_mode_from_flags() {
        let mut modes = ModeFlags::default();
        assert_eq!(MappingMode::from_flags(&modes), MappingMode::Linear);

        modes.extended = true;
        assert_eq!(MappingMode::from_flags(&modes), MappingMode::Linear);

        modes.halfway = true;
        assert_eq!(
            MappingMode::from_flags(&modes),
            MappingMode::Halfway { extended: true }
        );
    }

    #[test]
    fn test_half_intensity_pivot() {
        assert_eq!(HALF_INTENSITY, 127.5);
    }
}
