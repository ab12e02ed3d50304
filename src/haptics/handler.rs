//! Entry point for controller rumble notifications

use super::{ActivityState, Edge, RampDirection, RampScheduler};
use crate::config::SharedConfig;
use crate::engine::AudioOutput;
use crate::mapping::{map_volumes, MotorIntensity, VolumeTarget};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// What one notification did to the output
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RumbleOutcome {
    /// Motor at zero, both channels forced to 0
    Silenced,
    /// Stereo volumes applied directly
    Applied(VolumeTarget),
    /// Gain zeroed and a ramp-up launched, then volumes applied
    RampedUp(VolumeTarget),
}

/// Turns (small, large) motor pairs into volume and gain changes.
///
/// Never waits on audio I/O beyond single volume-set calls; ramps run on
/// the scheduler's runtime.
pub struct MotorEventHandler {
    config: SharedConfig,
    output: Arc<dyn AudioOutput>,
    ramps: RampScheduler,
    activity: Mutex<ActivityState>,
}

impl MotorEventHandler {
    pub fn new(config: SharedConfig, output: Arc<dyn AudioOutput>, ramps: RampScheduler) -> Self {
        Self {
            config,
            output,
            ramps,
            activity: Mutex::new(ActivityState::new()),
        }
    }

    pub fn ramps(&self) -> &RampScheduler {
        &self.ramps
    }

    /// Handle one controller notification
    pub fn on_rumble(&self, small_motor: MotorIntensity, large_motor: MotorIntensity) -> RumbleOutcome {
        self.handle_at(small_motor, large_motor, Instant::now())
    }

    /// Handle a notification observed at `now`
    pub fn handle_at(
        &self,
        small_motor: MotorIntensity,
        large_motor: MotorIntensity,
        now: Instant,
    ) -> RumbleOutcome {
        let config = self.config.snapshot();
        let motor = small_motor.max(large_motor);

        if config.modes.very_verbose {
            log::info!("Controller rumble - small: {}, large: {}", small_motor, large_motor);
        }

        let edge = self
            .activity
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .observe(motor, now);

        if motor == 0 {
            self.output.set_channel_volume(0.0, 0.0);
            if edge == Edge::BecameIdle && config.modes.verbose {
                log::info!("Motors idle, channels silenced");
            }
            return RumbleOutcome::Silenced;
        }

        let target = map_volumes(motor, &config);
        let inactive = Duration::try_from_secs_f64(config.inactive_time).unwrap_or(Duration::ZERO);
        let ramp = config.ramp_up && edge.idle_at_least(inactive);

        if ramp {
            // Stop the old ramp before zeroing so it cannot overwrite the zero
            self.ramps.cancel();
            self.output.set_overall_gain(0.0);
            self.ramps.start(RampDirection::Up, &config);
        }
        self.output.set_channel_volume(target.left, target.right);

        if config.modes.verbose {
            log::info!("lvol: {:.4} rvol: {:.4}", target.left, target.right);
        }

        if ramp {
            RumbleOutcome::RampedUp(target)
        } else {
            RumbleOutcome::Applied(target)
        }
    }

    /// Operator-requested ramp. Returns false when that direction is disabled.
    pub fn manual_ramp(&self, direction: RampDirection) -> bool {
        let config = self.config.snapshot();
        let enabled = match direction {
            RampDirection::Up => config.ramp_up,
            RampDirection::Down => config.ramp_down,
        };
        if enabled {
            self.ramps.start(direction, &config);
        }
        enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::engine::testing::{OutputCall, RecordingOutput};
    use tokio::runtime::Handle;

    fn handler_with(config: RuntimeConfig) -> (MotorEventHandler, Arc<RecordingOutput>, SharedConfig) {
        let output = Arc::new(RecordingOutput::new());
        let shared = SharedConfig::new(config);
        let ramps = RampScheduler::new(Handle::current(), output.clone());
        let handler = MotorEventHandler::new(shared.clone(), output.clone(), ramps);
        (handler, output, shared)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test]
    async fn test_zero_intensity_silences() {
        let (handler, output, _) = handler_with(RuntimeConfig::default());

        assert_eq!(handler.on_rumble(0, 0), RumbleOutcome::Silenced);
        assert_eq!(output.calls(), vec![OutputCall::Volume(0.0, 0.0)]);
    }

    #[tokio::test]
    async fn test_zero_is_silenced_in_every_mode() {
        let mut config = RuntimeConfig::default();
        config.modes.halfway = true;
        config.modes.extended = true;
        let (handler, output, _) = handler_with(config);
        let t0 = Instant::now();

        handler.handle_at(200, 0, t0);
        output.clear();
        assert_eq!(handler.handle_at(0, 0, t0 + ms(5)), RumbleOutcome::Silenced);
        assert_eq!(output.volumes(), vec![(0.0, 0.0)]);
    }

    #[tokio::test]
    async fn test_uses_stronger_motor() {
        let (handler, _, shared) = handler_with(RuntimeConfig::default());
        let t0 = Instant::now();
        handler.handle_at(1, 1, t0);

        let outcome = handler.handle_at(10, 255, t0 + ms(1));
        assert_eq!(outcome, RumbleOutcome::Applied(map_volumes(255, &shared.snapshot())));

        let outcome = handler.handle_at(128, 3, t0 + ms(2));
        assert_eq!(outcome, RumbleOutcome::Applied(map_volumes(128, &shared.snapshot())));
    }

    #[tokio::test]
    async fn test_first_activity_ramps_up() {
        let (handler, output, _) = handler_with(RuntimeConfig::default());

        let outcome = handler.on_rumble(255, 0);
        let target = match outcome {
            RumbleOutcome::RampedUp(target) => target,
            other => panic!("expected ramp, got {:?}", other),
        };

        // Gain zeroed before volumes, ramp running in the background
        let calls = output.calls();
        assert_eq!(calls[0], OutputCall::Gain(0.0));
        assert_eq!(calls[1], OutputCall::Volume(target.left, target.right));
        assert_eq!(handler.ramps().running(), Some(RampDirection::Up));
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_idle_triggers_one_ramp_to_full_gain() {
        let (handler, output, _) = handler_with(RuntimeConfig::default());
        let t0 = Instant::now();

        handler.handle_at(100, 0, t0);
        tokio::time::sleep(Duration::from_secs(1)).await;
        handler.handle_at(0, 0, t0 + ms(10));
        output.clear();

        // Idle for 600ms >= 500ms inactive time
        let outcome = handler.handle_at(100, 0, t0 + ms(610));
        assert!(matches!(outcome, RumbleOutcome::RampedUp(_)));

        // Sustained activity does not ramp again
        for i in 1..5 {
            let outcome = handler.handle_at(120, 0, t0 + ms(610 + i));
            assert!(matches!(outcome, RumbleOutcome::Applied(_)));
        }

        tokio::time::sleep(Duration::from_secs(1)).await;

        let gains = output.gains();
        // Handler's zero plus 21 ramp steps
        assert_eq!(gains.len(), 22);
        assert_eq!(gains[0], 0.0);
        assert_eq!(gains[1], 0.0);
        assert_eq!(*gains.last().unwrap(), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ramp_up_replaces_running_ramp_down() {
        let config = RuntimeConfig {
            ramp_down: true,
            ..RuntimeConfig::default()
        };
        let (handler, output, _) = handler_with(config);

        assert!(handler.manual_ramp(RampDirection::Down));
        tokio::time::sleep(ms(50)).await; // 1.0, 0.95 applied

        let outcome = handler.on_rumble(200, 0);
        assert!(matches!(outcome, RumbleOutcome::RampedUp(_)));
        assert_eq!(handler.ramps().running(), Some(RampDirection::Up));

        tokio::time::sleep(Duration::from_secs(1)).await;

        // Nothing from the old ramp lands after the zero
        let gains = output.gains();
        assert_eq!(gains[0], 1.0);
        assert!((gains[1] - 0.95).abs() < 1e-9);
        assert_eq!(gains[2], 0.0);
        let after_zero = &gains[2..];
        assert!(after_zero.windows(2).all(|w| w[1] >= w[0]), "gains: {:?}", gains);
        assert_eq!(after_zero.len(), 22);
        assert_eq!(*after_zero.last().unwrap(), 1.0);
    }

    #[tokio::test]
    async fn test_short_idle_applies_volumes_directly() {
        let (handler, output, _) = handler_with(RuntimeConfig::default());
        let t0 = Instant::now();

        handler.handle_at(100, 0, t0);
        handler.handle_at(0, 0, t0 + ms(10));
        handler.ramps().cancel();
        output.clear();

        // Idle for 200ms < 500ms inactive time
        let outcome = handler.handle_at(255, 0, t0 + ms(210));

        assert!(matches!(outcome, RumbleOutcome::Applied(_)));
        assert!(output.gains().is_empty());
        assert_eq!(output.volumes().len(), 1);
        assert_eq!(handler.ramps().running(), None);
    }

    #[tokio::test]
    async fn test_ramp_up_disabled() {
        let config = RuntimeConfig {
            ramp_up: false,
            ..RuntimeConfig::default()
        };
        let (handler, output, _) = handler_with(config);

        let outcome = handler.on_rumble(50, 50);

        assert!(matches!(outcome, RumbleOutcome::Applied(_)));
        assert!(output.gains().is_empty());
    }

    #[tokio::test]
    async fn test_config_edits_apply_to_next_event() {
        let (handler, _, shared) = handler_with(RuntimeConfig::default());
        let t0 = Instant::now();
        handler.handle_at(10, 0, t0);

        shared
            .update(|c| {
                c.r_min_vol = 0.1;
                c.r_max_vol = 0.9;
            })
            .unwrap();

        match handler.handle_at(255, 0, t0 + ms(1)) {
            RumbleOutcome::Applied(target) => assert!((target.right - 0.9).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_halfway_mode_through_handler() {
        let (handler, _, shared) = handler_with(RuntimeConfig::default());
        shared.update(|c| c.modes.halfway = true).unwrap();
        let t0 = Instant::now();
        handler.handle_at(10, 0, t0);

        match handler.handle_at(60, 0, t0 + ms(1)) {
            RumbleOutcome::Applied(target) => assert_eq!(target.right, 0.4),
            other => panic!("unexpected {:?}", other),
        }
        match handler.handle_at(200, 0, t0 + ms(2)) {
            RumbleOutcome::Applied(target) => assert_eq!(target.left, 0.4),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_manual_ramp_down_respects_flag() {
        let (handler, _, shared) = handler_with(RuntimeConfig::default());

        assert!(!handler.manual_ramp(RampDirection::Down));
        assert_eq!(handler.ramps().running(), None);

        shared.update(|c| c.ramp_down = true).unwrap();
        assert!(handler.manual_ramp(RampDirection::Down));
        assert_eq!(handler.ramps().running(), Some(RampDirection::Down));
    }
}
