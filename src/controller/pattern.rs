//! Scripted rumble replay
//!
//! Plays back a fixed sequence of motor states. Handy for feeling the
//! mapping without a game or driver attached.

use super::{RumbleEvent, RumbleSource};
use crate::mapping::MotorIntensity;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// One motor state held for `hold`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RumbleStep {
    pub small: MotorIntensity,
    pub large: MotorIntensity,
    pub hold: Duration,
}

impl RumbleStep {
    pub fn new(small: MotorIntensity, large: MotorIntensity, hold_ms: u64) -> Self {
        Self {
            small,
            large,
            hold: Duration::from_millis(hold_ms),
        }
    }
}

/// Source that emits a scripted pattern
pub struct PatternSource {
    name: String,
    steps: Vec<RumbleStep>,
    looping: bool,
    running: Arc<AtomicBool>,
    sender: broadcast::Sender<RumbleEvent>,
    task: Option<JoinHandle<()>>,
}

impl PatternSource {
    /// Create a source that plays `steps` once
    pub fn new(name: impl Into<String>, steps: Vec<RumbleStep>) -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            name: name.into(),
            steps,
            looping: false,
            running: Arc::new(AtomicBool::new(false)),
            sender,
            task: None,
        }
    }

    /// Repeat the pattern until stopped
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Sweep up and down through the motor range with idle gaps long
    /// enough to trigger fade-ins, then a burst of short taps that don't.
    pub fn demo() -> Self {
        let mut steps = Vec::new();

        for level in (0..=255u16).step_by(15) {
            steps.push(RumbleStep::new(level as u8, 0, 60));
        }
        for level in (0..=255u16).step_by(15).rev() {
            steps.push(RumbleStep::new(0, level as u8, 60));
        }
        steps.push(RumbleStep::new(0, 0, 1500));

        for _ in 0..6 {
            steps.push(RumbleStep::new(200, 90, 120));
            steps.push(RumbleStep::new(0, 0, 150));
        }
        steps.push(RumbleStep::new(0, 0, 1500));

        Self::new("demo", steps).looping()
    }

    pub fn steps(&self) -> &[RumbleStep] {
        &self.steps
    }
}

impl RumbleSource for PatternSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> anyhow::Result<()> {
        if self.is_running() {
            return Ok(());
        }
        if self.steps.is_empty() {
            anyhow::bail!("{}: pattern has no steps", self.name);
        }

        self.running.store(true, Ordering::SeqCst);

        let steps = self.steps.clone();
        let looping = self.looping;
        let running = Arc::clone(&self.running);
        let sender = self.sender.clone();

        let task = tokio::spawn(async move {
            'replay: loop {
                for step in &steps {
                    if !running.load(Ordering::SeqCst) {
                        break 'replay;
                    }
                    let _ = sender.send(RumbleEvent::new(step.small, step.large));
                    tokio::time::sleep(step.hold).await;
                }
                if !looping {
                    break;
                }
            }
            running.store(false, Ordering::SeqCst);
        });

        self.task = Some(task);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<RumbleEvent> {
        self.sender.subscribe()
    }
}

impl Drop for PatternSource {
    fn drop(&mut self) {
        self.stop();
    }
}
