//! Sorter configuration.
//!
//! Loaded from config.json next to the executable at startup. Missing fields
//! take their defaults; a missing file is created with defaults. Calibration
//! changes the in-memory grid geometry, which is written back only by the
//! save hotkey.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::grid::{GridGeometry, Point};
use crate::hotkeys::Action;
use crate::input::DragTiming;
use crate::log;
use crate::ocr::OcrSettings;

/// Largest accepted column or row count.
pub const MAX_GRID_DIMENSION: u32 = 64;
/// Largest accepted slot, gap, patch or OCR size, and largest in-slot offset.
pub const MAX_PIXEL_SIZE: u32 = 4096;
/// Largest accepted distance of the grid origin from the window corner.
pub const MAX_ORIGIN_COORD: i32 = 32768;
pub const MAX_UPSCALE_FACTOR: u32 = 8;

/// Window and OCR setup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Substring matched against top-level window titles.
    pub window_title: String,
    /// Explicit Tesseract executable; searched for when absent.
    pub tesseract_path: Option<PathBuf>,
    /// Write screenshots, overlays and OCR crops to debug_images/.
    pub save_debug_images: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            window_title: "Bellwright".to_string(),
            tesseract_path: None,
            save_debug_images: true,
        }
    }
}

/// Key bindings, e.g. `num_1` or `ctrl+shift+s`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    pub calculate_and_plan: String,
    pub execute_sort: String,
    pub set_grid_origin: String,
    pub full_calibration: String,
    pub slot_dimensions: String,
    pub slot_gap_x: String,
    pub slot_gap_y: String,
    pub tier_color_point: String,
    pub ocr_region: String,
    pub save: String,
    pub exit: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            calculate_and_plan: "num_1".to_string(),
            execute_sort: "num_2".to_string(),
            set_grid_origin: "num_3".to_string(),
            full_calibration: "num_4".to_string(),
            slot_dimensions: "num_5".to_string(),
            slot_gap_x: "num_6".to_string(),
            slot_gap_y: "num_plus".to_string(),
            tier_color_point: "num_7".to_string(),
            ocr_region: "num_8".to_string(),
            save: "num_9".to_string(),
            exit: "num_0".to_string(),
        }
    }
}

impl HotkeyConfig {
    /// Every action paired with its configured key string.
    pub fn bindings(&self) -> Vec<(Action, &str)> {
        use crate::calibration::ToolKind;

        vec![
            (Action::CalculatePlan, self.calculate_and_plan.as_str()),
            (Action::ExecuteSort, self.execute_sort.as_str()),
            (Action::Calibrate(ToolKind::GridOrigin), self.set_grid_origin.as_str()),
            (Action::Calibrate(ToolKind::Full), self.full_calibration.as_str()),
            (Action::Calibrate(ToolKind::SlotDimensions), self.slot_dimensions.as_str()),
            (Action::Calibrate(ToolKind::GapX), self.slot_gap_x.as_str()),
            (Action::Calibrate(ToolKind::GapY), self.slot_gap_y.as_str()),
            (Action::Calibrate(ToolKind::TierColorPoint), self.tier_color_point.as_str()),
            (Action::Calibrate(ToolKind::OcrRegion), self.ocr_region.as_str()),
            (Action::SaveGeometry, self.save.as_str()),
            (Action::Exit, self.exit.as_str()),
        ]
    }
}

/// Complete configuration file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    pub general: GeneralConfig,
    pub hotkeys: HotkeyConfig,
    pub grid: GridGeometry,
    pub ocr: OcrSettings,
    pub mouse: DragTiming,
}

impl SorterConfig {
    /// Loads the config at `path`, falling back to defaults.
    ///
    /// A missing file is created with the defaults. Unreadable or invalid
    /// JSON yields the defaults without touching the file. Invalid values
    /// are corrected and each correction is logged.
    pub fn load(path: &Path) -> Self {
        log(&format!("Looking for config at: {}", path.display()));

        let mut config = if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(config) => {
                        log("Config loaded from config.json");
                        config
                    }
                    Err(e) => {
                        log(&format!(
                            "Failed to parse config.json: {}. Using defaults.",
                            e
                        ));
                        SorterConfig::default()
                    }
                },
                Err(e) => {
                    log(&format!("Failed to read config.json: {}. Using defaults.", e));
                    SorterConfig::default()
                }
            }
        } else {
            log("config.json not found. Writing default config.");
            let config = SorterConfig::default();
            if let Err(e) = config.save(path) {
                log(&format!("Could not write default config: {:#}", e));
            }
            config
        };

        for correction in config.validate() {
            log(&format!("WARN: Config: {}", correction));
        }
        config
    }

    /// Writes the config as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Replaces invalid values with their defaults.
    ///
    /// Returns one message per corrected field.
    pub fn validate(&mut self) -> Vec<String> {
        let mut corrections = Vec::new();
        let grid_defaults = GridGeometry::default();
        let general_defaults = GeneralConfig::default();

        if self.general.window_title.trim().is_empty() {
            self.general.window_title = general_defaults.window_title;
            corrections.push(format!(
                "general.window_title is empty, using \"{}\"",
                self.general.window_title
            ));
        }

        let grid = &mut self.grid;
        let bounded_fields: [(&str, &mut u32, u32, u32, u32); 10] = [
            ("grid.num_cols", &mut grid.num_cols, grid_defaults.num_cols, 1, MAX_GRID_DIMENSION),
            ("grid.max_rows", &mut grid.max_rows, grid_defaults.max_rows, 1, MAX_GRID_DIMENSION),
            ("grid.slot_width", &mut grid.slot_width, grid_defaults.slot_width, 1, MAX_PIXEL_SIZE),
            ("grid.slot_height", &mut grid.slot_height, grid_defaults.slot_height, 1, MAX_PIXEL_SIZE),
            ("grid.gap_x", &mut grid.gap_x, grid_defaults.gap_x, 1, MAX_PIXEL_SIZE),
            ("grid.gap_y", &mut grid.gap_y, grid_defaults.gap_y, 1, MAX_PIXEL_SIZE),
            (
                "grid.color_patch.size",
                &mut grid.color_patch.size,
                grid_defaults.color_patch.size,
                1,
                MAX_PIXEL_SIZE,
            ),
            (
                "grid.ocr_region.width",
                &mut grid.ocr_region.width,
                grid_defaults.ocr_region.width,
                1,
                MAX_PIXEL_SIZE,
            ),
            (
                "grid.ocr_region.height",
                &mut grid.ocr_region.height,
                grid_defaults.ocr_region.height,
                1,
                MAX_PIXEL_SIZE,
            ),
            (
                "ocr.upscale_factor",
                &mut self.ocr.upscale_factor,
                OcrSettings::default().upscale_factor,
                1,
                MAX_UPSCALE_FACTOR,
            ),
        ];
        for (name, value, default, min, max) in bounded_fields {
            if !(min..=max).contains(&*value) {
                corrections.push(format!(
                    "{} = {} is outside {}..={}, using {}",
                    name, value, min, max, default
                ));
                *value = default;
            }
        }

        let points: [(&str, &mut Point, Point, i32); 3] = [
            ("grid.origin", &mut grid.origin, grid_defaults.origin, MAX_ORIGIN_COORD),
            (
                "grid.color_patch.offset",
                &mut grid.color_patch.offset,
                grid_defaults.color_patch.offset,
                MAX_PIXEL_SIZE as i32,
            ),
            (
                "grid.ocr_region.offset",
                &mut grid.ocr_region.offset,
                grid_defaults.ocr_region.offset,
                MAX_PIXEL_SIZE as i32,
            ),
        ];
        for (name, value, default, limit) in points {
            if value.x.unsigned_abs() > limit as u32 || value.y.unsigned_abs() > limit as u32 {
                corrections.push(format!(
                    "{} = {} is outside +/-{}, using {}",
                    name, value, limit, default
                ));
                *value = default;
            }
        }

        if grid.tier_colors.is_empty() {
            grid.tier_colors = grid_defaults.tier_colors;
            corrections.push("grid.tier_colors is empty, using the default tier colors".into());
        }

        let timing_defaults = DragTiming::default();
        let durations: [(&str, &mut f64, f64); 3] = [
            (
                "mouse.move_duration",
                &mut self.mouse.move_duration,
                timing_defaults.move_duration,
            ),
            (
                "mouse.drag_duration",
                &mut self.mouse.drag_duration,
                timing_defaults.drag_duration,
            ),
            (
                "mouse.post_action_delay",
                &mut self.mouse.post_action_delay,
                timing_defaults.post_action_delay,
            ),
        ];
        for (name, value, default) in durations {
            if !value.is_finite() || *value < 0.0 {
                *value = default;
                corrections.push(format!("{} must be a non-negative number, using {}", name, default));
            }
        }

        corrections
    }
}
