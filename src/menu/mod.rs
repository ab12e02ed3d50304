//! Interactive text menu for live parameter edits
//!
//! Every edit goes through `SharedConfig::update`, so a rejected value
//! leaves the running configuration untouched and the next rumble event
//! sees accepted values immediately.

use crate::config::{ConfigError, ResetGroup, RuntimeConfig, SharedConfig};
use crate::engine::{AudioOutput, SineWave};
use crate::haptics::{MotorEventHandler, RampDirection};
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Problems with a value typed at the menu
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("Numbers only (got '{0}')")]
    InvalidNumber(String),

    #[error("Value rejected: {0}")]
    OutOfRange(#[from] ConfigError),
}

/// Which channel(s) an edit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Both,
}

type Toggle = fn(&mut RuntimeConfig) -> &mut bool;

/// A single numeric setting
#[derive(Clone, Copy)]
struct Field {
    label: &'static str,
    get: fn(&RuntimeConfig) -> f64,
    set: fn(&mut RuntimeConfig, f64),
    rebuilds_wave: bool,
}

/// A setting with separate left and right values
#[derive(Clone, Copy)]
struct SideField {
    label: &'static str,
    get: fn(&RuntimeConfig) -> (f64, f64),
    set_left: fn(&mut RuntimeConfig, f64),
    set_right: fn(&mut RuntimeConfig, f64),
}

const FREQUENCY: Field = Field {
    label: "frequency",
    get: |c| c.frequency,
    set: |c, v| c.frequency = v,
    rebuilds_wave: true,
};

const AMPLITUDE: Field = Field {
    label: "amplitude",
    get: |c| c.amplitude,
    set: |c, v| c.amplitude = v,
    rebuilds_wave: true,
};

const RAMP_TIME: Field = Field {
    label: "ramp up time",
    get: |c| c.ramp_time,
    set: |c, v| c.ramp_time = v,
    rebuilds_wave: false,
};

const RAMP_TIME_DOWN: Field = Field {
    label: "ramp down time",
    get: |c| c.ramp_time_down,
    set: |c, v| c.ramp_time_down = v,
    rebuilds_wave: false,
};

const INACTIVE_TIME: Field = Field {
    label: "inactive time",
    get: |c| c.inactive_time,
    set: |c, v| c.inactive_time = v,
    rebuilds_wave: false,
};

const MIN_VOLUME: SideField = SideField {
    label: "minvol",
    get: |c| (c.l_min_vol, c.r_min_vol),
    set_left: |c, v| c.l_min_vol = v,
    set_right: |c, v| c.r_min_vol = v,
};

const MAX_VOLUME: SideField = SideField {
    label: "maxvol",
    get: |c| (c.l_max_vol, c.r_max_vol),
    set_left: |c, v| c.l_max_vol = v,
    set_right: |c, v| c.r_max_vol = v,
};

/// Operator menu bound to the live config and output
pub struct Menu {
    config: SharedConfig,
    defaults: RuntimeConfig,
    output: Arc<dyn AudioOutput>,
    handler: Arc<MotorEventHandler>,
    sample_rate: u32,
    wave_dirty: bool,
}

impl Menu {
    /// `defaults` is what reset restores; `sample_rate` is the output's rate
    pub fn new(
        config: SharedConfig,
        defaults: RuntimeConfig,
        output: Arc<dyn AudioOutput>,
        handler: Arc<MotorEventHandler>,
        sample_rate: u32,
    ) -> Self {
        Self {
            config,
            defaults,
            output,
            handler,
            sample_rate,
            wave_dirty: false,
        }
    }

    /// Run until `q` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> io::Result<()> {
        loop {
            print_help(out, &self.config.snapshot())?;
            let Some(line) = read_command(input)? else {
                break;
            };

            match line.as_str() {
                "v" => self.toggle(out, "Verbose", |c| &mut c.modes.verbose)?,
                "vv" => self.toggle(out, "Very verbose", |c| &mut c.modes.very_verbose)?,
                "e" => self.toggle(out, "Extended", |c| &mut c.modes.extended)?,
                "hw" => self.toggle(out, "Halfway mode", |c| &mut c.modes.halfway)?,
                "p" => self.toggle_pause(out)?,
                "c" => self.control_menu(input, out)?,
                "ru" => self.ramp(out, RampDirection::Up)?,
                "rd" => self.ramp(out, RampDirection::Down)?,
                "r" => self.reset(input, out)?,
                "h" | "" => {}
                "q" => {
                    writeln!(out, "Quitting...")?;
                    break;
                }
                other => writeln!(out, "Unknown command '{}'", other)?,
            }
        }
        Ok(())
    }

    fn control_menu<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> io::Result<()> {
        let auto_paused = {
            let snap = self.config.snapshot();
            snap.modes.auto_pause && !snap.modes.paused
        };
        if auto_paused {
            writeln!(out, "Auto pausing...")?;
            self.set_paused(true);
        }

        loop {
            print_controls(out, &self.config.snapshot())?;
            let Some(line) = read_command(input)? else {
                break;
            };

            let result = match line.as_str() {
                "f" => self.edit(input, out, FREQUENCY),
                "a" => self.edit(input, out, AMPLITUDE),
                "mi" => self.edit_sides(input, out, MIN_VOLUME),
                "ma" => self.edit_sides(input, out, MAX_VOLUME),
                "rt" => self.edit(input, out, RAMP_TIME),
                "rs" => self.edit_steps(input, out, "ramp up steps", |c, v| c.ramp_steps = v),
                "rdt" => self.edit(input, out, RAMP_TIME_DOWN),
                "rds" => self.edit_steps(input, out, "ramp down steps", |c, v| c.ramp_steps_down = v),
                "it" => self.edit(input, out, INACTIVE_TIME),
                "u" => self.toggle(out, "Ramp up", |c| &mut c.ramp_up).map(Ok),
                "d" => self.toggle(out, "Ramp down", |c| &mut c.ramp_down).map(Ok),
                "p" => self.toggle_pause(out).map(Ok),
                "r" => self.reset(input, out).map(Ok),
                "c" => break,
                "" => Ok(Ok(())),
                other => writeln!(out, "Unknown control '{}'", other).map(Ok),
            };

            if let Err(e) = result? {
                writeln!(out)?;
                writeln!(out, "{}", e)?;
            }
        }

        if auto_paused && self.config.with(|c| c.modes.paused) {
            writeln!(out, "Resuming sound...")?;
            self.set_paused(false);
        }
        Ok(())
    }

    fn edit<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        out: &mut W,
        field: Field,
    ) -> io::Result<Result<(), MenuError>> {
        writeln!(out, "Current {}: {}", field.label, self.config.with(field.get))?;

        let value = match prompt_number::<f64, _, _>(input, out, field.label)? {
            Some(Ok(v)) => v,
            Some(Err(e)) => return Ok(Err(e)),
            None => return Ok(Ok(())),
        };

        writeln!(out, "Setting {} to {}...", field.label, value)?;
        if let Err(e) = self.config.update(|c| (field.set)(c, value)) {
            return Ok(Err(e.into()));
        }
        if field.rebuilds_wave {
            self.refresh_wave();
        }
        Ok(Ok(()))
    }

    fn edit_steps<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        out: &mut W,
        label: &str,
        apply: fn(&mut RuntimeConfig, u32),
    ) -> io::Result<Result<(), MenuError>> {
        let value = match prompt_number::<u32, _, _>(input, out, label)? {
            Some(Ok(v)) => v,
            Some(Err(e)) => return Ok(Err(e)),
            None => return Ok(Ok(())),
        };

        writeln!(out, "Setting {} to {}...", label, value)?;
        Ok(self.config.update(|c| apply(c, value)).map(|_| ()).map_err(MenuError::from))
    }

    fn edit_sides<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        out: &mut W,
        field: SideField,
    ) -> io::Result<Result<(), MenuError>> {
        writeln!(out, "[l]eft [r]ight or [b]oth sides?")?;
        let side = match read_command(input)?.as_deref() {
            Some("l") => Side::Left,
            Some("r") => Side::Right,
            Some("b") => Side::Both,
            _ => return Ok(Ok(())),
        };

        let (left, right) = self.config.with(field.get);
        if side != Side::Right {
            writeln!(out, "Current left {}: {}", field.label, left)?;
        }
        if side != Side::Left {
            writeln!(out, "Current right {}: {}", field.label, right)?;
        }

        let label = match side {
            Side::Left => format!("left {}", field.label),
            Side::Right => format!("right {}", field.label),
            Side::Both => field.label.to_string(),
        };
        let value = match prompt_number::<f64, _, _>(input, out, &label)? {
            Some(Ok(v)) => v,
            Some(Err(e)) => return Ok(Err(e)),
            None => return Ok(Ok(())),
        };

        writeln!(out, "Setting {} to {}...", label, value)?;
        let result = self.config.update(|c| {
            if side != Side::Right {
                (field.set_left)(c, value);
            }
            if side != Side::Left {
                (field.set_right)(c, value);
            }
        });
        Ok(result.map(|_| ()).map_err(MenuError::from))
    }

    fn toggle<W: Write>(&mut self, out: &mut W, label: &str, field: Toggle) -> io::Result<()> {
        match self.config.update(|c| {
            let flag = field(c);
            *flag = !*flag;
        }) {
            Ok(mut updated) => {
                let state = if *field(&mut updated) { "On" } else { "Off" };
                writeln!(out, "{}: {}", label, state)
            }
            Err(e) => writeln!(out, "{}", e),
        }
    }

    fn toggle_pause<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.config.with(|c| c.modes.paused) {
            writeln!(out, "Resuming sound...")?;
            self.set_paused(false);
        } else {
            writeln!(out, "Pausing sound...")?;
            self.set_paused(true);
        }
        Ok(())
    }

    fn set_paused(&mut self, paused: bool) {
        if let Err(e) = self.config.update(|c| c.modes.paused = paused) {
            log::warn!("Could not record pause state: {}", e);
        }

        if paused {
            self.output.pause();
        } else if self.wave_dirty {
            self.wave_dirty = false;
            self.output.play_looping(self.current_wave());
        } else {
            self.output.unpause();
        }
    }

    fn ramp<W: Write>(&mut self, out: &mut W, direction: RampDirection) -> io::Result<()> {
        if self.handler.manual_ramp(direction) {
            writeln!(out, "Ramping {}...", direction)
        } else {
            writeln!(out, "Ramp {} is disabled", direction)
        }
    }

    fn reset<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> io::Result<()> {
        writeln!(out, "[o]ptions [c]ontrols or [b]oth?")?;
        let group = match read_command(input)?.as_deref() {
            Some("o") => ResetGroup::Options,
            Some("c") => ResetGroup::Controls,
            Some("b") => ResetGroup::Both,
            _ => return Ok(()),
        };

        writeln!(out, "Resetting {:?}...", group)?;
        let defaults = self.defaults.clone();
        match self.config.update(|c| c.restore(&defaults, group)) {
            Ok(_) => {
                if group != ResetGroup::Options {
                    self.refresh_wave();
                }
                Ok(())
            }
            Err(e) => writeln!(out, "{}", e),
        }
    }

    /// Rebuild the sine from the live frequency/amplitude
    fn refresh_wave(&mut self) {
        if self.config.with(|c| c.modes.paused) {
            // Picked up when playback resumes
            self.wave_dirty = true;
        } else {
            self.output.play_looping(self.current_wave());
        }
    }

    fn current_wave(&self) -> SineWave {
        let (frequency, amplitude) = self.config.with(|c| (c.frequency, c.amplitude));
        SineWave::new(frequency, amplitude, self.sample_rate)
    }
}

/// Next trimmed line, or None at end of input
fn read_command<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_number<T: FromStr, R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> io::Result<Option<Result<T, MenuError>>> {
    write!(out, "Enter desired {}: ", label)?;
    out.flush()?;
    Ok(read_command(input)?.map(|raw| raw.parse::<T>().map_err(|_| MenuError::InvalidNumber(raw))))
}

fn on_off(flag: bool) -> &'static str {
    if flag { "[on] and off" } else { "on and [off]" }
}

fn print_help<W: Write>(out: &mut W, config: &RuntimeConfig) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "v  : Toggle verbose mode {}", on_off(config.modes.verbose))?;
    writeln!(out, "vv : Toggle very verbose mode {}", on_off(config.modes.very_verbose))?;
    writeln!(out, "e  : Toggle extended {}", on_off(config.modes.extended))?;
    writeln!(out, "hw : Toggle halfway mode {}", on_off(config.modes.halfway))?;
    writeln!(out, "p  : Toggle the sound {}", on_off(!config.modes.paused))?;
    writeln!(out, "c  : Enter the control menu")?;
    writeln!(out, "ru : Ramp the sound up")?;
    writeln!(out, "rd : Ramp the sound down")?;
    writeln!(out, "h  : Show this help menu")?;
    writeln!(out, "r  : Reset options")?;
    writeln!(out, "q  : Quit")?;
    out.flush()
}

fn print_controls<W: Write>(out: &mut W, config: &RuntimeConfig) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "f   : Edit the frequency [{}]", config.frequency)?;
    writeln!(out, "a   : Edit the amplitude [{}]", config.amplitude)?;
    writeln!(
        out,
        "mi  : Edit the left [{}] and/or right [{}] minimum volume",
        config.l_min_vol, config.r_min_vol
    )?;
    writeln!(
        out,
        "ma  : Edit the left [{}] and/or right [{}] maximum volume",
        config.l_max_vol, config.r_max_vol
    )?;
    writeln!(out, "rt  : Edit the ramp up time [{}]", config.ramp_time)?;
    writeln!(out, "rs  : Edit the ramp up steps [{}]", config.ramp_steps)?;
    writeln!(out, "rdt : Edit the ramp down time [{}]", config.ramp_time_down)?;
    writeln!(out, "rds : Edit the ramp down steps [{}]", config.ramp_steps_down)?;
    writeln!(out, "it  : Edit the inactive time [{}]", config.inactive_time)?;
    writeln!(out, "u   : Toggle ramp up {}", on_off(config.ramp_up))?;
    writeln!(out, "d   : Toggle ramp down {}", on_off(config.ramp_down))?;
    writeln!(out, "p   : Toggle the sound {}", on_off(!config.modes.paused))?;
    writeln!(out, "r   : Reset options")?;
    writeln!(out, "c   : Leave the control menu")?;
    out.flush()
}
