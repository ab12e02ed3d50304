//! Haptic core: edge detection, volume application and gain ramps
//!
//! The controller notification path calls [`MotorEventHandler::on_rumble`];
//! everything it needs (live config, output, ramp scheduler) is shared
//! with the menu thread.

mod handler;
mod ramp;
mod state;

pub use handler::{MotorEventHandler, RumbleOutcome};
pub use ramp::{RampDirection, RampPlan, RampScheduler};
pub use state::{ActivityState, Edge};
