//! Real-time audio playback using cpal

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, SampleRate, Stream, StreamConfig, SupportedStreamConfig};
use std::sync::{Arc, Mutex};

use super::{Mixer, MixerHandle};

/// Open output stream feeding from a [`MixerHandle`].
///
/// `cpal::Stream` is not `Send`, so the player stays on the thread that
/// opened it; everything else talks to the shared handle.
pub struct Player {
    stream: Stream,
    device_name: String,
    sample_rate: u32,
    channels: u16,
}

impl Player {
    /// Open `device` (or the default output) and start pulling frames from `handle`.
    ///
    /// `preferred_rate` is used when the device supports it, otherwise the
    /// device default applies.
    pub fn open(handle: &MixerHandle, device: Option<&str>, preferred_rate: u32) -> Result<Self> {
        let host = cpal::default_host();
        let device = find_device(&host, device)?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let config = pick_config(&device, preferred_rate)
            .with_context(|| format!("no usable output config on '{}'", device_name))?;
        let sample_format = config.sample_format();
        let stream_config: StreamConfig = config.into();
        let mixer = handle.mixer();

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, mixer)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, mixer)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, mixer)?,
            _ => return Err(anyhow!("Unsupported sample format {:?}", sample_format)),
        };
        stream.play().context("failed to start output stream")?;

        log::info!(
            "Connected to '{}' ({} Hz, {} ch)",
            device_name,
            stream_config.sample_rate.0,
            stream_config.channels
        );

        Ok(Self {
            stream,
            device_name,
            sample_rate: stream_config.sample_rate.0,
            channels: stream_config.channels,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Rate the stream actually runs at; waveforms must be rendered for it
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Halt the device stream
    pub fn close(self) {
        if let Err(e) = self.stream.pause() {
            log::warn!("Failed to pause output stream: {}", e);
        }
    }
}

fn find_device(host: &cpal::Host, name: Option<&str>) -> Result<Device> {
    match name {
        Some(wanted) => host
            .output_devices()
            .context("failed to enumerate output devices")?
            .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
            .ok_or_else(|| anyhow!("Output device '{}' not found", wanted)),
        None => host
            .default_output_device()
            .ok_or_else(|| anyhow!("No output device available")),
    }
}

fn pick_config(device: &Device, preferred_rate: u32) -> Result<SupportedStreamConfig> {
    let wanted = SampleRate(preferred_rate);
    if let Ok(ranges) = device.supported_output_configs() {
        for range in ranges {
            if range.channels() >= 2
                && range.min_sample_rate() <= wanted
                && wanted <= range.max_sample_rate()
            {
                return Ok(range.with_sample_rate(wanted));
            }
        }
    }
    Ok(device.default_output_config()?)
}

fn build_stream<T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>>(
    device: &Device,
    config: &StreamConfig,
    mixer: Arc<Mutex<Mixer>>,
) -> Result<Stream> {
    let channels = config.channels as usize;
    let mut scratch: Vec<f32> = Vec::new();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            scratch.resize(data.len(), 0.0);

            if let Ok(mut mix) = mixer.try_lock() {
                mix.fill_buffer(&mut scratch, channels);
            } else {
                // Mutex locked, fill with silence
                scratch.fill(0.0);
            }

            for (out, &sample) in data.iter_mut().zip(scratch.iter()) {
                *out = T::from_sample(sample);
            }
        },
        |err| {
            log::error!("Audio stream error: {}", err);
        },
        None,
    )?;

    Ok(stream)
}

/// Get the default output device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device()
        .and_then(|d| d.name().ok())
}

/// List all available output devices
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push((name, config.into()));
            }
        }
    }

    devices
}
