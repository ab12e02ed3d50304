//! UDP notification listener
//!
//! A virtual-gamepad driver shim forwards each rumble notification as a
//! datagram whose first two bytes are the small and large motor values.

use super::{RumbleEvent, RumbleSource, SourceError};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Source that receives notifications over UDP
pub struct UdpSource {
    name: String,
    addr: String,
    local_addr: Option<SocketAddr>,
    running: Arc<AtomicBool>,
    sender: broadcast::Sender<RumbleEvent>,
    task: Option<JoinHandle<()>>,
}

impl UdpSource {
    /// Create a listener for `addr`; nothing is bound until `start`
    pub fn new(name: impl Into<String>, addr: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            name: name.into(),
            addr: addr.into(),
            local_addr: None,
            running: Arc::new(AtomicBool::new(false)),
            sender,
            task: None,
        }
    }

    /// Address actually bound, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

/// Decode one datagram. Anything shorter than two bytes is not a notification.
pub fn parse_datagram(bytes: &[u8]) -> Option<RumbleEvent> {
    match bytes {
        [small, large, ..] => Some(RumbleEvent::new(*small, *large)),
        _ => None,
    }
}

impl RumbleSource for UdpSource {
    fn name(&self) -> &str {
        &self.name
    }

    /// Must be called from within a tokio runtime
    fn start(&mut self) -> anyhow::Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let std_socket = std::net::UdpSocket::bind(&self.addr).map_err(|source| SourceError::Bind {
            addr: self.addr.clone(),
            source,
        })?;
        std_socket.set_nonblocking(true).map_err(SourceError::from)?;
        let socket = UdpSocket::from_std(std_socket).map_err(SourceError::from)?;
        self.local_addr = socket.local_addr().ok();

        self.running.store(true, Ordering::SeqCst);

        let name = self.name.clone();
        let running = Arc::clone(&self.running);
        let sender = self.sender.clone();

        log::info!("{}: listening for rumble notifications on {}", name, self.addr);

        let task = tokio::spawn(async move {
            let mut buf = [0u8; 64];

            while running.load(Ordering::SeqCst) {
                match socket.recv_from(&mut buf).await {
                    Ok((len, peer)) => match parse_datagram(&buf[..len]) {
                        // Send (ignore errors if no receivers)
                        Some(event) => {
                            let _ = sender.send(event);
                        }
                        None => log::debug!("{}: ignoring {}-byte datagram from {}", name, len, peer),
                    },
                    Err(e) => log::warn!("{}: receive failed: {}", name, e),
                }
            }
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

impl Drop for UdpSource {
    fn drop(&mut self) {
        self.stop();
    }
}
