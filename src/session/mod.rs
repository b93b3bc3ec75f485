//! The sorter session: owns the configuration, the last plan and the
//! calibration state, and runs one handler per admitted hotkey press.

pub mod busy;
pub mod queue;

pub use busy::{BusyFlag, BusyGuard};
pub use queue::{create_event_queue, Event};

use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::calibration::preview::render_overlay;
use crate::calibration::{Calibration, ToolKind};
use crate::capture::{GameWindow, ScreenCapture, WindowLocator};
use crate::config::SorterConfig;
use crate::grid::{scan_inventory, SlotClassifier};
use crate::hotkeys::Action;
use crate::input::Pointer;
use crate::log;
use crate::ocr::{DigitReader, StackCounter};
use crate::sort::{execute_plan, plan_moves, Plan};

/// Delay between the execute hotkey and the first drag.
const EXECUTE_START_DELAY: Duration = Duration::from_secs(2);

/// Whether the dispatcher keeps running after a handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Session<D> {
    desktop: D,
    config: SorterConfig,
    config_path: PathBuf,
    counter: StackCounter,
    debug_dir: Option<PathBuf>,
    last_plan: Option<Plan>,
    calibration: Calibration,
    sleep: fn(Duration),
}

impl<D> Session<D>
where
    D: WindowLocator + ScreenCapture + Pointer,
{
    /// Creates a session. `reader` is `None` when OCR is unavailable;
    /// `debug_dir` enables debug image output.
    pub fn new(
        desktop: D,
        config: SorterConfig,
        config_path: PathBuf,
        reader: Option<Box<dyn DigitReader>>,
        debug_dir: Option<PathBuf>,
    ) -> Self {
        let counter =
            StackCounter::new(reader, config.ocr.clone()).with_debug_dir(debug_dir.clone());
        Self {
            desktop,
            config,
            config_path,
            counter,
            debug_dir,
            last_plan: None,
            calibration: Calibration::default(),
            sleep: std::thread::sleep,
        }
    }

    /// Replaces the function used for every pause.
    pub fn with_sleep(mut self, sleep: fn(Duration)) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn config(&self) -> &SorterConfig {
        &self.config
    }

    pub fn last_plan(&self) -> Option<&Plan> {
        self.last_plan.as_ref()
    }

    pub fn active_calibration(&self) -> Option<ToolKind> {
        self.calibration.active_tool()
    }

    pub fn desktop(&self) -> &D {
        &self.desktop
    }

    /// Runs the handler for `action`. Handler errors are logged here.
    pub fn handle(&mut self, action: Action) -> Flow {
        let result = match action {
            Action::CalculatePlan => self.calculate_plan(),
            Action::ExecuteSort => self.execute_sort(),
            Action::Calibrate(kind) => {
                self.calibrate(kind);
                Ok(())
            }
            Action::SaveGeometry => self.save_geometry(),
            Action::Exit => {
                log("Exit requested by hotkey.");
                return Flow::Exit;
            }
        };

        if let Err(e) = result {
            log(&format!("ERR: {} failed: {:#}", action, e));
        }
        Flow::Continue
    }

    /// Finds the game window and refuses a minimized one.
    fn locate_window(&self) -> Result<GameWindow> {
        let title = &self.config.general.window_title;
        let window = self.desktop.find_window(title)?;
        if window.minimized {
            return Err(anyhow!("Window '{}' is minimized", window.title));
        }
        Ok(window)
    }

    /// Screenshots the game window, scans the grid and stores a new plan.
    ///
    /// Any previous plan is discarded first, so a failed scan leaves no plan.
    pub fn calculate_plan(&mut self) -> Result<()> {
        self.last_plan = None;
        log("Scan: calculating sort plan...");
        log(&format!("Scan: {}", self.config.grid.summary()));

        let window = self.locate_window()?;
        if !window.active {
            log(&format!("WARN: Scan: '{}' not active, activating.", window.title));
            if !self.desktop.activate(&window) {
                log("WARN: Scan: could not bring the game window to the foreground.");
            }
        }

        let screenshot = self
            .desktop
            .capture(window.bounds)
            .context("Screen capture failed")?;
        self.save_debug_image("scan_screenshot.png", &screenshot);

        let classifier = SlotClassifier::new(&self.config.grid, &self.counter);
        let report = scan_inventory(&screenshot, &self.config.grid, &classifier);
        log(&format!(
            "Scan: {} items, {} occupied rows, {} rows scanned.",
            report.items.len(),
            report.effective_rows,
            report.rows_scanned
        ));

        if self.debug_dir.is_some() {
            let overlay = render_overlay(&screenshot, &self.config.grid, &report);
            self.save_debug_image("scan_overlay.png", &overlay);
        }

        if report.is_empty() {
            log("Scan: no items found, nothing to sort.");
            return Ok(());
        }

        let plan = plan_moves(&report.items, &self.config.grid, window.origin())
            .context("Planning failed, scan again")?;

        if plan.is_empty() {
            log("Scan: inventory already sorted, no moves needed.");
            return Ok(());
        }

        log("Scan: --- Calculated plan ---");
        for (i, mv) in plan.moves.iter().enumerate() {
            let detail = report
                .items
                .iter()
                .find(|item| item.id == mv.item)
                .map(|item| format!(" (T{}, C{})", item.tier, item.count))
                .unwrap_or_default();
            log(&format!("Scan: move {}: {}{}", i + 1, mv, detail));
        }
        log(&format!("Scan: {} moves stored. Press the execute hotkey to run them.", plan.len()));

        self.last_plan = Some(plan);
        Ok(())
    }

    /// Replays the stored plan.
    ///
    /// The game window must be found, not minimized and in the foreground;
    /// otherwise the plan is kept and nothing is dragged. Once the checks
    /// pass the plan is consumed, even if some drags fail.
    pub fn execute_sort(&mut self) -> Result<()> {
        let Some(count) = self.last_plan.as_ref().map(Plan::len) else {
            log("Execute: no plan. Press the calculate hotkey first.");
            return Ok(());
        };

        log(&format!("Execute: executing sort plan ({} moves)...", count));
        (self.sleep)(EXECUTE_START_DELAY);

        let window = self.locate_window().context("Game window lost")?;
        if !window.active {
            return Err(anyhow!("Game window '{}' is not active", window.title));
        }

        let Some(plan) = self.last_plan.take() else {
            return Ok(());
        };
        let report = execute_plan(&plan, &self.desktop, &self.config.mouse, self.sleep);

        log(&format!(
            "Execute: finished. {} performed, {} skipped, {} failed.",
            report.performed, report.skipped, report.failed
        ));
        Ok(())
    }

    /// Forwards a calibration hotkey press.
    pub fn calibrate(&mut self, kind: ToolKind) {
        let desktop = &self.desktop;
        let title = self.config.general.window_title.as_str();
        self.calibration.press(
            kind,
            &mut self.config.grid,
            || desktop.cursor_position(),
            || desktop.find_window(title).map(|window| window.origin()),
        );
    }

    /// Writes the current configuration, including calibrated geometry.
    pub fn save_geometry(&mut self) -> Result<()> {
        if let Some(tool) = self.calibration.active_tool() {
            log(&format!(
                "WARN: {} is still in progress; its values are not saved.",
                tool
            ));
        }
        self.config.save(&self.config_path)?;
        log(&format!("Saved calibrated values to {}", self.config_path.display()));
        Ok(())
    }

    fn save_debug_image(&self, name: &str, img: &RgbaImage) {
        let Some(dir) = &self.debug_dir else {
            return;
        };
        let path = dir.join(name);
        if let Err(e) = img.save(&path) {
            log(&format!("Could not save debug image {}: {}", path.display(), e));
        }
    }
}

/// Handles events until an exit is requested or every sender is gone.
///
/// A panicking handler is logged and does not stop the dispatcher; the
/// event's busy guard is released either way.
pub fn run_dispatcher<D>(session: &mut Session<D>, events: Receiver<Event>)
where
    D: WindowLocator + ScreenCapture + Pointer,
{
    while let Ok(event) = events.recv() {
        match event {
            Event::Hotkey(action, guard) => {
                let flow = std::panic::catch_unwind(AssertUnwindSafe(|| session.handle(action)))
                    .unwrap_or_else(|_| {
                        log(&format!("ERR: {} handler panicked.", action));
                        Flow::Continue
                    });
                drop(guard);
                if flow == Flow::Exit {
                    break;
                }
            }
            Event::ConsoleClosed => {
                log("Console input closed. Hotkeys remain active.");
            }
        }
    }
}
