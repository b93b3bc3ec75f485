//! Inventory grid model: slot geometry, slot classification and scanning.

pub mod classify;
pub mod geometry;
pub mod scan;

pub use classify::{ClassifySlot, Rgb, SlotClassifier};
pub use geometry::{GridGeometry, Point, Rect};
pub use scan::{scan_inventory, ItemId, ScanReport, ScannedItem};
