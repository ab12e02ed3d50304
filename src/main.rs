//! Rumbletone - controller rumble as stereo audio

use anyhow::{Context, Result};
use clap::Parser;
use rumbletone::config::{self, AppConfig, SharedConfig};
use rumbletone::controller::{self, PatternSource, RumbleSource, UdpSource};
use rumbletone::engine::{self, AudioOutput, MixerHandle, Player, SineWave};
use rumbletone::haptics::{MotorEventHandler, RampScheduler};
use rumbletone::launcher;
use rumbletone::menu::Menu;
use std::io;
use std::sync::Arc;
use std::time::Duration;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config: config_path,
            device,
            listen,
        } => {
            let mut cfg = config::load_or_default(&config_path)?;
            if device.is_some() {
                cfg.audio.device = device;
            }
            if let Some(listen) = listen {
                cfg.controller.listen = listen;
            }

            let source = UdpSource::new("udp", cfg.controller.listen.clone());
            serve(cfg, source)?;
        }

        Commands::Demo {
            config: config_path,
            device,
        } => {
            let mut cfg = config::load_or_default(&config_path)?;
            if device.is_some() {
                cfg.audio.device = device;
            }

            println!("Playing the built-in rumble pattern.");
            serve(cfg, PatternSource::demo())?;
        }

        Commands::Devices => {
            println!("Available audio output devices:\n");

            if let Some(name) = engine::default_device_name() {
                println!("Default output: {}\n", name);
            }

            let devices = engine::list_output_devices();
            if devices.is_empty() {
                println!("  (none found)");
            }
            for (name, config) in devices {
                println!("  - {} ({} Hz, {} ch)", name, config.sample_rate.0, config.channels);
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    let h = &cfg.haptics;
                    println!("Configuration is valid!");
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    println!(
                        "  Device: {}",
                        cfg.audio.device.as_deref().unwrap_or("(default)")
                    );
                    println!("  Listen: {}", cfg.controller.listen);
                    println!("  Tone: {} Hz at amplitude {}", h.frequency, h.amplitude);
                    println!("  Left volume: {} - {}", h.l_min_vol, h.l_max_vol);
                    println!("  Right volume: {} - {}", h.r_min_vol, h.r_max_vol);
                    println!(
                        "  Ramp up: {} ({}s, {} steps)",
                        if h.ramp_up { "on" } else { "off" },
                        h.ramp_time,
                        h.ramp_steps
                    );
                    println!(
                        "  Ramp down: {} ({}s, {} steps)",
                        if h.ramp_down { "on" } else { "off" },
                        h.ramp_time_down,
                        h.ramp_steps_down
                    );
                    println!("  Inactive time: {}s", h.inactive_time);
                    println!("  Programs: {}", cfg.launch.programs.len());
                    for entry in &cfg.launch.programs {
                        match launcher::resolve_entry(entry) {
                            Ok(path) => println!("    - {}", path.display()),
                            Err(e) => println!("    - {}", e),
                        }
                    }
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../rumbletone.example.yaml");

            let path = "rumbletone.yaml";
            if std::path::Path::new(path).exists() {
                println!("rumbletone.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created rumbletone.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

/// Open the output, feed `source` into the haptic core and run the menu
/// on this thread until the operator quits.
fn serve<S: RumbleSource>(cfg: AppConfig, mut source: S) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    let mixer = MixerHandle::new();
    let player = Player::open(&mixer, cfg.audio.device.as_deref(), cfg.audio.sample_rate)
        .context("cannot start without an audio output")?;
    println!(
        "Output: {} ({} Hz, {} ch)",
        player.device_name(),
        player.sample_rate(),
        player.channels()
    );

    let output: Arc<dyn AudioOutput> = Arc::new(mixer);
    output.set_channel_volume(0.0, 0.0);
    output.play_looping(SineWave::new(
        cfg.haptics.frequency,
        cfg.haptics.amplitude,
        player.sample_rate(),
    ));

    let shared = SharedConfig::new(cfg.haptics.clone());
    let ramps = RampScheduler::new(rt.handle().clone(), Arc::clone(&output));
    let handler = Arc::new(MotorEventHandler::new(shared.clone(), Arc::clone(&output), ramps));

    {
        let _guard = rt.enter();
        let receiver = source.subscribe();
        source.start()?;
        rt.spawn(controller::drive(receiver, Arc::clone(&handler)));
    }
    log::info!("{}: started", source.name());

    let _children = if cfg.launch.on_startup {
        launcher::launch_all(&cfg.launch.programs)
    } else {
        Vec::new()
    };

    let interrupted = Arc::clone(&output);
    ctrlc::set_handler(move || {
        interrupted.set_channel_volume(0.0, 0.0);
        interrupted.stop();
        std::process::exit(0);
    })
    .context("failed to install Ctrl-C handler")?;

    let mut menu = Menu::new(
        shared,
        cfg.haptics,
        Arc::clone(&output),
        handler,
        player.sample_rate(),
    );
    let stdin = io::stdin();
    menu.run(&mut stdin.lock(), &mut io::stdout())?;

    source.stop();
    output.set_channel_volume(0.0, 0.0);
    output.stop();
    player.close();
    rt.shutdown_timeout(Duration::from_millis(200));

    Ok(())
}
