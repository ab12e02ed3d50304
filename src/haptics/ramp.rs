//! Overall-gain ramps around activity edges
//!
//! A ramp steps the waveform's overall gain linearly between 0 and 1 on a
//! background task. Only one ramp runs at a time: starting a new one
//! cancels whatever is in flight.

use crate::config::RuntimeConfig;
use crate::engine::AudioOutput;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Which way the gain moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampDirection {
    /// 0.0 -> 1.0
    Up,
    /// 1.0 -> 0.0
    Down,
}

impl fmt::Display for RampDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RampDirection::Up => write!(f, "up"),
            RampDirection::Down => write!(f, "down"),
        }
    }
}

/// Step count and spacing of one ramp, fixed when it starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampPlan {
    pub direction: RampDirection,
    pub steps: u32,
    pub interval: Duration,
}

impl RampPlan {
    pub fn from_config(direction: RampDirection, config: &RuntimeConfig) -> Self {
        let (time, steps) = match direction {
            RampDirection::Up => (config.ramp_time, config.ramp_steps),
            RampDirection::Down => (config.ramp_time_down, config.ramp_steps_down),
        };
        let steps = steps.max(1);
        let interval = Duration::try_from_secs_f64(time.max(0.0) / steps as f64)
            .unwrap_or(Duration::ZERO);

        Self { direction, steps, interval }
    }

    /// Gain set at `step` (0..=steps)
    pub fn gain_at(&self, step: u32) -> f64 {
        let progress = step.min(self.steps) as f64 / self.steps as f64;
        match self.direction {
            RampDirection::Up => progress,
            RampDirection::Down => 1.0 - progress,
        }
    }

    /// All `steps + 1` gains in order
    pub fn gains(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=self.steps).map(move |step| self.gain_at(step))
    }
}

struct RampTask {
    id: u64,
    direction: RampDirection,
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Single-slot ramp runner.
///
/// Cloning shares the slot, so every clone supersedes the others' ramps.
#[derive(Clone)]
pub struct RampScheduler {
    runtime: Handle,
    output: Arc<dyn AudioOutput>,
    slot: Arc<Mutex<Option<RampTask>>>,
    next_id: Arc<AtomicU64>,
}

impl RampScheduler {
    /// Ramps run on `runtime`, so `start` may be called from any thread
    pub fn new(runtime: Handle, output: Arc<dyn AudioOutput>) -> Self {
        Self {
            runtime,
            output,
            slot: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Launch a ramp using the current `config`, cancelling any ramp in flight.
    ///
    /// Returns immediately; the first gain step is applied on the ramp task.
    pub fn start(&self, direction: RampDirection, config: &RuntimeConfig) -> RampPlan {
        let plan = RampPlan::from_config(direction, config);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancelled = Arc::new(AtomicBool::new(false));

        let mut slot = self.lock_slot();
        if let Some(previous) = slot.take() {
            Self::cancel_task(previous);
        }

        let task = {
            let output = Arc::clone(&self.output);
            let cancelled = Arc::clone(&cancelled);
            let slot = Arc::clone(&self.slot);

            self.runtime.spawn(async move {
                log::debug!(
                    "Ramp {} #{}: {} steps every {:?}",
                    plan.direction,
                    id,
                    plan.steps,
                    plan.interval
                );

                for step in 0..=plan.steps {
                    if cancelled.load(Ordering::SeqCst) {
                        log::debug!("Ramp {} #{} superseded at step {}", plan.direction, id, step);
                        return;
                    }
                    output.set_overall_gain(plan.gain_at(step));
                    if step < plan.steps {
                        tokio::time::sleep(plan.interval).await;
                    }
                }

                let mut slot = slot.lock().unwrap_or_else(|e| e.into_inner());
                if slot.as_ref().map(|t| t.id) == Some(id) {
                    *slot = None;
                }
                log::debug!("Ramp {} #{} complete", plan.direction, id);
            })
        };

        *slot = Some(RampTask {
            id,
            direction,
            cancelled,
            handle: task,
        });

        plan
    }

    /// Stop the ramp in flight, leaving the gain where it is
    pub fn cancel(&self) {
        if let Some(task) = self.lock_slot().take() {
            Self::cancel_task(task);
        }
    }

    /// Direction of the ramp in flight
    pub fn running(&self) -> Option<RampDirection> {
        self.lock_slot()
            .as_ref()
            .filter(|t| !t.handle.is_finished())
            .map(|t| t.direction)
    }

    fn cancel_task(task: RampTask) {
        task.cancelled.store(true, Ordering::SeqCst);
        task.handle.abort();
        log::debug!("Ramp {} #{} cancelled", task.direction, task.id);
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<RampTask>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::RecordingOutput;

    const EPS: f64 = 1e-12;

    fn scheduler() -> (RampScheduler, Arc<RecordingOutput>) {
        let output = Arc::new(RecordingOutput::new());
        let scheduler = RampScheduler::new(Handle::current(), output.clone());
        (scheduler, output)
    }

    fn assert_gains(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "gains: {:?}", actual);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < EPS, "gains: {:?}", actual);
        }
    }

    #[test]
    fn test_plan_from_config() {
        let config = RuntimeConfig {
            ramp_time: 0.8,
            ramp_steps: 20,
            ramp_time_down: 0.3,
            ramp_steps_down: 3,
            ..RuntimeConfig::default()
        };

        let up = RampPlan::from_config(RampDirection::Up, &config);
        assert_eq!(up.steps, 20);
        assert!((up.interval.as_secs_f64() - 0.04).abs() < 1e-9);

        let down = RampPlan::from_config(RampDirection::Down, &config);
        assert_eq!(down.steps, 3);
        assert!((down.interval.as_secs_f64() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_up_plan_gains_are_linear() {
        let plan = RampPlan::from_config(RampDirection::Up, &RuntimeConfig::default());
        let gains: Vec<f64> = plan.gains().collect();

        assert_eq!(gains.len(), 21);
        for (step, gain) in gains.iter().enumerate() {
            assert!((gain - step as f64 * 0.05).abs() < EPS);
        }
        assert_eq!(gains[20], 1.0);
    }

    #[test]
    fn test_down_plan_gains() {
        let config = RuntimeConfig {
            ramp_steps_down: 4,
            ..RuntimeConfig::default()
        };
        let plan = RampPlan::from_config(RampDirection::Down, &config);
        let gains: Vec<f64> = plan.gains().collect();

        assert_gains(&gains, &[1.0, 0.75, 0.5, 0.25, 0.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ramp_up_runs_to_full_gain() {
        let (scheduler, output) = scheduler();
        let config = RuntimeConfig::default(); // 0.8s, 20 steps

        scheduler.start(RampDirection::Up, &config);
        assert_eq!(scheduler.running(), Some(RampDirection::Up));

        tokio::time::sleep(Duration::from_millis(900)).await;

        let expected: Vec<f64> = (0..=20).map(|s| s as f64 / 20.0).collect();
        assert_gains(&output.gains(), &expected);
        assert_eq!(scheduler.running(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ramp_steps_are_spaced() {
        let (scheduler, output) = scheduler();
        scheduler.start(RampDirection::Up, &RuntimeConfig::default());

        // Steps land at 0ms, 40ms, 80ms, ...
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_gains(&output.gains(), &[0.0]);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_gains(&output.gains(), &[0.0, 0.05]);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_gains(&output.gains(), &[0.0, 0.05, 0.1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_does_not_block_caller() {
        let (scheduler, output) = scheduler();
        scheduler.start(RampDirection::Up, &RuntimeConfig::default());

        // Nothing has run yet: the caller returned before the first step
        assert!(output.gains().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_ramp_supersedes_running_one() {
        let (scheduler, output) = scheduler();
        let config = RuntimeConfig {
            ramp_time: 1.0,
            ramp_steps: 10,
            ramp_time_down: 0.2,
            ramp_steps_down: 2,
            ..RuntimeConfig::default()
        };

        scheduler.start(RampDirection::Up, &config);
        tokio::time::sleep(Duration::from_millis(250)).await; // 0.0, 0.1, 0.2 applied
        scheduler.start(RampDirection::Down, &config);
        assert_eq!(scheduler.running(), Some(RampDirection::Down));

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_gains(&output.gains(), &[0.0, 0.1, 0.2, 1.0, 0.5, 0.0]);
        assert_eq!(scheduler.running(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_leaves_gain_in_place() {
        let (scheduler, output) = scheduler();
        scheduler.start(RampDirection::Up, &RuntimeConfig::default());
        tokio::time::sleep(Duration::from_millis(50)).await;

        scheduler.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_gains(&output.gains(), &[0.0, 0.05]);
        assert_eq!(scheduler.running(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ramp_reads_config_at_start() {
        let (scheduler, output) = scheduler();
        let mut config = RuntimeConfig {
            ramp_steps: 2,
            ramp_time: 0.2,
            ..RuntimeConfig::default()
        };

        scheduler.start(RampDirection::Up, &config);
        config.ramp_steps = 50;
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_gains(&output.gains(), &[0.0, 0.5, 1.0]);
    }
}
