//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main configuration for rumbletone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Live-editable haptic parameters
    #[serde(default)]
    pub haptics: RuntimeConfig,

    /// Controller notification input
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Programs to start alongside the bridge
    #[serde(default)]
    pub launch: LaunchConfig,
}

impl AppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            return Err(ConfigError::SampleRate(self.audio.sample_rate));
        }
        self.haptics.validate()
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz used to render the sine buffer (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Output device name (None = default device)
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            device: None,
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }

/// Where controller notifications come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// UDP address the notification listener binds to
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

fn default_listen() -> String { "127.0.0.1:7878".to_string() }

/// Program launcher settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Launch `programs` when the bridge starts
    #[serde(default)]
    pub on_startup: bool,

    /// Program paths. Kept as raw YAML so a bad entry only skips itself.
    #[serde(default)]
    pub programs: Vec<serde_yaml::Value>,
}

/// The parameter set read by the mapper, the ramp scheduler and the
/// event handler on every invocation.
///
/// Volumes are linear gains in `0.0..=1.0`. `min <= max` is expected but
/// not required; the mapper clamps in favour of the configured band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Sine frequency in Hz
    #[serde(default = "default_frequency")]
    pub frequency: f64,

    /// Multiplier applied to every waveform sample
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,

    #[serde(default = "default_min_vol")]
    pub l_min_vol: f64,
    #[serde(default = "default_max_vol")]
    pub l_max_vol: f64,
    #[serde(default = "default_min_vol")]
    pub r_min_vol: f64,
    #[serde(default = "default_max_vol")]
    pub r_max_vol: f64,

    /// Fade the overall gain in after an idle period
    #[serde(default = "default_true")]
    pub ramp_up: bool,

    /// Allow manual fade-outs
    #[serde(default)]
    pub ramp_down: bool,

    /// Ramp-up duration in seconds
    #[serde(default = "default_ramp_time")]
    pub ramp_time: f64,

    /// Number of gain steps in a ramp-up
    #[serde(default = "default_ramp_steps")]
    pub ramp_steps: u32,

    /// Ramp-down duration in seconds
    #[serde(default = "default_ramp_time")]
    pub ramp_time_down: f64,

    /// Number of gain steps in a ramp-down
    #[serde(default = "default_ramp_steps")]
    pub ramp_steps_down: u32,

    /// Idle seconds required before activity fades in again
    #[serde(default = "default_inactive_time")]
    pub inactive_time: f64,

    #[serde(default)]
    pub modes: ModeFlags,
}

impl RuntimeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("frequency", self.frequency)?;
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(ConfigError::Negative { field: "amplitude", value: self.amplitude });
        }

        unit("l_min_vol", self.l_min_vol)?;
        unit("l_max_vol", self.l_max_vol)?;
        unit("r_min_vol", self.r_min_vol)?;
        unit("r_max_vol", self.r_max_vol)?;

        positive("ramp_time", self.ramp_time)?;
        positive("ramp_time_down", self.ramp_time_down)?;
        positive("inactive_time", self.inactive_time)?;

        if self.ramp_steps == 0 {
            return Err(ConfigError::ZeroSteps("ramp_steps"));
        }
        if self.ramp_steps_down == 0 {
            return Err(ConfigError::ZeroSteps("ramp_steps_down"));
        }

        Ok(())
    }

    /// Copy one group of settings back from `defaults`
    pub fn restore(&mut self, defaults: &RuntimeConfig, group: ResetGroup) {
        if matches!(group, ResetGroup::Controls | ResetGroup::Both) {
            self.frequency = defaults.frequency;
            self.amplitude = defaults.amplitude;
            self.l_min_vol = defaults.l_min_vol;
            self.l_max_vol = defaults.l_max_vol;
            self.r_min_vol = defaults.r_min_vol;
            self.r_max_vol = defaults.r_max_vol;
            self.ramp_up = defaults.ramp_up;
            self.ramp_down = defaults.ramp_down;
            self.ramp_time = defaults.ramp_time;
            self.ramp_steps = defaults.ramp_steps;
            self.ramp_time_down = defaults.ramp_time_down;
            self.ramp_steps_down = defaults.ramp_steps_down;
            self.inactive_time = defaults.inactive_time;
        }
        if matches!(group, ResetGroup::Options | ResetGroup::Both) {
            // Pause state belongs to the running output, not to the defaults.
            let paused = self.modes.paused;
            self.modes = defaults.modes.clone();
            self.modes.paused = paused;
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
            amplitude: default_amplitude(),
            l_min_vol: default_min_vol(),
            l_max_vol: default_max_vol(),
            r_min_vol: default_min_vol(),
            r_max_vol: default_max_vol(),
            ramp_up: true,
            ramp_down: false,
            ramp_time: default_ramp_time(),
            ramp_steps: default_ramp_steps(),
            ramp_time_down: default_ramp_time(),
            ramp_steps_down: default_ramp_steps(),
            inactive_time: default_inactive_time(),
            modes: ModeFlags::default(),
        }
    }
}

fn default_frequency() -> f64 { 987.0 }
fn default_amplitude() -> f64 { 0.5 }
fn default_min_vol() -> f64 { 0.4 }
fn default_max_vol() -> f64 { 0.5 }
fn default_ramp_time() -> f64 { 0.8 }
fn default_ramp_steps() -> u32 { 20 }
fn default_inactive_time() -> f64 { 0.5 }
fn default_true() -> bool { true }

/// Behaviour toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeFlags {
    /// Split the motor range at its midpoint, one channel per half
    #[serde(default)]
    pub halfway: bool,

    /// In halfway mode, hold the left channel at max above the midpoint
    #[serde(default)]
    pub extended: bool,

    /// Log computed volumes
    #[serde(default)]
    pub verbose: bool,

    /// Log raw motor states as well
    #[serde(default)]
    pub very_verbose: bool,

    /// Sound output is paused. Runtime state only, never read from a file.
    #[serde(skip)]
    pub paused: bool,

    /// Pause output while the control menu is open
    #[serde(default = "default_true")]
    pub auto_pause: bool,
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self {
            halfway: false,
            extended: false,
            verbose: false,
            very_verbose: false,
            paused: false,
            auto_pause: true,
        }
    }
}

/// Which settings a reset restores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetGroup {
    /// Mode flags
    Options,
    /// Frequency, amplitude, volumes and ramp settings
    Controls,
    Both,
}

/// Reasons a configuration is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than 0 (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be between 0.0 and 1.0 (got {value})")]
    VolumeOutOfRange { field: &'static str, value: f64 },

    #[error("{0} must be at least 1")]
    ZeroSteps(&'static str),

    #[error("sample rate must be between 8000 and 192000 (got {0})")]
    SampleRate(u32),
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::VolumeOutOfRange { field, value })
    }
}
