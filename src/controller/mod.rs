//! Controller notification sources
//!
//! Sources deliver (small, large) motor pairs as `RumbleEvent`s; `drive`
//! feeds them to the haptic core.

mod pattern;
mod source;
mod udp;

pub use pattern::{PatternSource, RumbleStep};
pub use source::{RumbleEvent, RumbleSource, SourceError};
pub use udp::{parse_datagram, UdpSource};

use crate::haptics::MotorEventHandler;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

/// Forward every event from `receiver` to `handler` until the source closes
pub async fn drive(mut receiver: broadcast::Receiver<RumbleEvent>, handler: Arc<MotorEventHandler>) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                handler.handle_at(event.small_motor, event.large_motor, event.timestamp);
            }
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Dropped {} rumble notifications", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
