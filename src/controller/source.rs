//! Source trait and RumbleEvent definition

use crate::mapping::MotorIntensity;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::broadcast;

/// One controller state-change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RumbleEvent {
    pub small_motor: MotorIntensity,
    pub large_motor: MotorIntensity,

    /// When the notification was received
    pub timestamp: Instant,
}

impl RumbleEvent {
    /// Create an event stamped now
    pub fn new(small_motor: MotorIntensity, large_motor: MotorIntensity) -> Self {
        Self {
            small_motor,
            large_motor,
            timestamp: Instant::now(),
        }
    }

    /// Combined intensity, the stronger of the two motors
    pub fn intensity(&self) -> MotorIntensity {
        self.small_motor.max(self.large_motor)
    }
}

/// Trait for controller notification sources
pub trait RumbleSource: Send + Sync {
    /// Get the name of this source
    fn name(&self) -> &str;

    /// Start delivering notifications
    fn start(&mut self) -> anyhow::Result<()>;

    /// Stop delivering notifications
    fn stop(&mut self);

    /// Check if the source is running
    fn is_running(&self) -> bool;

    /// Subscribe to notifications from this source
    fn subscribe(&self) -> broadcast::Receiver<RumbleEvent>;
}

/// Failures starting a source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to bind notification listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("notification listener setup failed")]
    Socket(#[from] std::io::Error),
}
