//! CLI interface for rumbletone

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Turn controller rumble into stereo audio for haptic transducers
#[derive(Parser)]
#[command(name = "rumbletone")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Listen for rumble notifications and play them
    Run {
        /// Configuration file path (defaults are used if it does not exist)
        #[arg(short, long, default_value = "rumbletone.yaml")]
        config: PathBuf,

        /// Output device name, overrides the config file
        #[arg(short, long)]
        device: Option<String>,

        /// UDP address for rumble notifications, overrides the config file
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Play a built-in rumble pattern instead of listening
    Demo {
        /// Configuration file path (defaults are used if it does not exist)
        #[arg(short, long, default_value = "rumbletone.yaml")]
        config: PathBuf,

        /// Output device name, overrides the config file
        #[arg(short, long)]
        device: Option<String>,
    },

    /// List available audio output devices
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "rumbletone.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}
