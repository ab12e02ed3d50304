//! Rumbletone - controller rumble as stereo audio
//!
//! Receives force-feedback notifications (a small and a large motor
//! intensity) and renders them as a looping sine on two channels, so a
//! pair of tactile transducers can stand in for the motors.

pub mod config;
pub mod controller;
pub mod engine;
pub mod haptics;
pub mod launcher;
pub mod mapping;
pub mod menu;

pub use config::{AppConfig, RuntimeConfig, SharedConfig};
pub use engine::{AudioOutput, MixerHandle, Player};
pub use haptics::MotorEventHandler;
pub use menu::Menu;
