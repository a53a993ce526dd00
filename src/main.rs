use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use chipvm::{Buzzer, Emulator};
use clap::Parser;
use log::{error, info, warn};

use crate::{
    sound::{Sound, TerminalBell},
    window::Screen,
};

mod keymap;
mod sound;
mod window;

// Timers tick once per step, so the step rate is also the timer rate.
// Frames are paced at ~60 per second by the window.
const FRAMES_PER_SECOND: u32 = 60;

#[derive(Parser, Debug)]
#[command(name = "chipvm")]
#[command(about = "Runs CHIP-8 programs. Esc quits, F1 reloads the rom")]
struct Args {
    /// Program image to load at 0x200
    rom: PathBuf,

    #[arg(long, default_value_t = 600, help = "Instructions executed per second")]
    hz: u32,

    #[arg(long, default_value_t = 16, help = "Window scale: 1, 2, 4, 8, 16 or 32")]
    scale: u8,

    #[arg(long, help = "Seed for the random number instruction")]
    seed: Option<u64>,

    #[arg(long, help = "Ring the terminal bell instead of using the audio device")]
    mute: bool,
}

fn read_rom(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("could not read rom {}", path.display()))
}

fn buzzer(mute: bool) -> Box<dyn Buzzer> {
    if mute {
        return Box::new(TerminalBell);
    }
    match Sound::new() {
        Ok(sound) => Box::new(sound),
        Err(e) => {
            warn!("audio unavailable ({e:#}), falling back to terminal bell");
            Box::new(TerminalBell)
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let scale =
        window::scale_from(args.scale).ok_or_else(|| anyhow!("unsupported scale {}", args.scale))?;

    let rom = read_rom(&args.rom)?;
    let mut emu = match args.seed {
        Some(seed) => Emulator::with_seed(seed),
        None => Emulator::new(),
    };
    emu.load(&rom)
        .with_context(|| format!("could not load {}", args.rom.display()))?;
    emu.set_buzzer(buzzer(args.mute));

    let title = format!(
        "chipvm - {} - ESC to exit",
        args.rom
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default()
    );
    let mut screen = Screen::new(&title, scale)?;
    let steps_per_frame = (args.hz / FRAMES_PER_SECOND).max(1);
    info!(
        "running {} at {} steps per frame",
        args.rom.display(),
        steps_per_frame
    );

    while screen.is_running() {
        if screen.reload_requested() {
            match read_rom(&args.rom).and_then(|rom| Ok(emu.load(&rom)?)) {
                Ok(()) => info!("reloaded {}", args.rom.display()),
                Err(e) => warn!("reload failed, keeping current program: {e:#}"),
            }
        }

        keymap::sync_keys(&screen.window, emu.keyboard_mut());

        for _ in 0..steps_per_frame {
            if let Err(e) = emu.step() {
                error!("machine halted: {e}");
                return Err(e.into());
            }
        }

        if emu.display().is_dirty() {
            screen.present(emu.display())?;
            emu.display_mut().clear_dirty();
        } else {
            screen.idle();
        }
    }

    Ok(())
}
