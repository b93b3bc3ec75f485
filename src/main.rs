//! Inventory Sorter
//!
//! Sorts a grid inventory by tier and stack count. A hotkey scans the game
//! window and plans the moves, a second hotkey replays them as mouse drags.
//! Further hotkeys calibrate the grid geometry.

mod calibration;
mod capture;
mod config;
mod desktop;
mod grid;
mod hotkeys;
mod input;
mod ocr;
mod paths;
mod session;
mod sort;

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use crate::calibration::sampler::run_sampler;
use crate::config::SorterConfig;
use crate::desktop::Desktop;
use crate::hotkeys::{Action, Hotkey};
use crate::ocr::{init_tesseract, DigitReader};
use crate::session::{create_event_queue, run_dispatcher, BusyFlag, Event, Session};

const LOG_FILE_NAME: &str = "inventory_sorter.log";

/// Interval between color samples in the `calibratecolors` console command.
const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

const CONSOLE_HELP: &str = "Commands: 'calibratecolors' (sample tier colors), 'exit' (close console)";

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    append_to_log_file(&line);
}

fn append_to_log_file(line: &str) {
    let log_path = paths::get_logs_dir().join(LOG_FILE_NAME);
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        let thread = std::thread::current();
        let line = format!(
            "[{}] [PANIC] thread '{}'{}: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            thread.name().unwrap_or("unnamed"),
            location,
            msg
        );
        eprint!("{}", line);
        append_to_log_file(&line);
    }));
}

fn main() -> Result<()> {
    install_panic_hook();
    paths::ensure_directories()?;

    log("Inventory sorter starting...");
    let config_path = paths::get_config_path();
    let config = SorterConfig::load(&config_path);

    let reader = init_tesseract(config.general.tesseract_path.as_deref())
        .map(|reader| Box::new(reader) as Box<dyn DigitReader>);
    let debug_dir = config
        .general
        .save_debug_images
        .then(paths::get_debug_images_dir);

    log("--- Configuration summary ---");
    log(&format!("  Game window: '{}'", config.general.window_title));
    log(&format!("  Config file: '{}'", config_path.display()));
    log(&format!("  Grid: {}", config.grid.summary()));
    if let Some(dir) = &debug_dir {
        log(&format!("  Debug images: '{}'", dir.display()));
    }

    let bindings = hotkeys::resolve_bindings(&config.hotkeys);
    let busy = BusyFlag::new();
    let (sender, receiver) = create_event_queue();

    let listener = start_hotkeys(bindings, busy, sender.clone());
    spawn_console(sender)?;

    let mut session = Session::new(Desktop, config, config_path, reader, debug_dir);
    run_dispatcher(&mut session, receiver);

    if let Some(listener) = listener {
        stop_hotkeys(listener);
    }
    log("Inventory sorter terminated.");
    Ok(())
}

fn log_bindings(bindings: &[(Hotkey, Action)]) {
    log("--- Hotkeys ---");
    for (hotkey, action) in bindings {
        log(&format!("  '{}' -> {}", hotkey.label, action));
    }
}

#[cfg(windows)]
fn start_hotkeys(
    bindings: Vec<(Hotkey, Action)>,
    busy: BusyFlag,
    events: Sender<Event>,
) -> Option<hotkeys::listener::HotkeyListener> {
    log_bindings(&bindings);
    match hotkeys::listener::HotkeyListener::spawn(bindings, busy, events) {
        Ok(listener) => Some(listener),
        Err(e) => {
            log(&format!("ERR: Hotkeys unavailable: {:#}", e));
            None
        }
    }
}

#[cfg(windows)]
fn stop_hotkeys(listener: hotkeys::listener::HotkeyListener) {
    listener.stop();
}

#[cfg(not(windows))]
fn start_hotkeys(
    bindings: Vec<(Hotkey, Action)>,
    _busy: BusyFlag,
    _events: Sender<Event>,
) -> Option<()> {
    log_bindings(&bindings);
    log("WARN: Global hotkeys are only available on Windows.");
    None
}

#[cfg(not(windows))]
fn stop_hotkeys(_listener: ()) {}

fn spawn_console(events: Sender<Event>) -> Result<()> {
    std::thread::Builder::new()
        .name("console".into())
        .spawn(move || run_console(events))
        .context("Failed to spawn console thread")?;
    Ok(())
}

/// Reads console commands until `exit` or end of input.
fn run_console(events: Sender<Event>) {
    log(&format!("Console active. {}", CONSOLE_HELP));
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    while let Some(line) = lines.next() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log(&format!("Console read error: {}", e));
                break;
            }
        };
        match line.trim().to_lowercase().as_str() {
            "" => {}
            "calibratecolors" => sample_colors(&mut lines),
            "exit" => break,
            other => log(&format!("Unknown command '{}'. {}", other, CONSOLE_HELP)),
        }
    }

    let _ = events.send(Event::ConsoleClosed);
}

/// Runs the color sampler until the next line of input.
fn sample_colors(lines: &mut impl Iterator<Item = std::io::Result<String>>) {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let sampler = std::thread::Builder::new()
        .name("sampler".into())
        .spawn(move || run_sampler(&Desktop, &flag, SAMPLE_INTERVAL, std::thread::sleep));

    let sampler = match sampler {
        Ok(handle) => handle,
        Err(e) => {
            log(&format!("Could not start color sampler: {}", e));
            return;
        }
    };

    let _ = lines.next();
    stop.store(true, Ordering::SeqCst);
    let _ = sampler.join();
}
