//! Row-by-row inventory scan.

use image::RgbaImage;

use super::classify::{ClassifySlot, Rgb};
use super::geometry::GridGeometry;

/// Identity of an item for one scan/plan/execute cycle.
///
/// Derived from the slot the item was found in; it is not a persistent item ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub usize);

impl ItemId {
    pub fn from_slot(slot: usize) -> Self {
        Self(slot)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item@{}", self.0)
    }
}

/// One occupied slot found by the scanner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannedItem {
    pub tier: u32,
    pub count: u32,
    /// Row-major index of the slot the item was found in.
    pub original_slot: usize,
    pub id: ItemId,
    pub color: Rgb,
}

impl ScannedItem {
    pub fn new(tier: u32, count: u32, original_slot: usize) -> Self {
        Self {
            tier,
            count,
            original_slot,
            id: ItemId::from_slot(original_slot),
            color: Rgb::default(),
        }
    }
}

/// Outcome of scanning the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Items in row-major discovery order.
    pub items: Vec<ScannedItem>,
    /// One past the highest row containing an item (0 if none).
    pub effective_rows: u32,
    /// Number of rows that were examined before stopping.
    pub rows_scanned: u32,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Scans the grid of `image`, classifying slots row by row.
///
/// Stops early at the first empty row after the last occupied row, or once
/// more than the first four rows turned out empty.
pub fn scan_inventory<C: ClassifySlot>(
    image: &RgbaImage,
    geometry: &GridGeometry,
    classifier: &C,
) -> ScanReport {
    let mut report = ScanReport::default();

    for row in 0..geometry.max_rows {
        let mut row_has_items = false;

        for col in 0..geometry.num_cols {
            let slot = geometry.slot_index(row, col);
            let Some(found) = classifier.classify(image, row, col) else {
                continue;
            };

            row_has_items = true;
            report.effective_rows = report.effective_rows.max(row + 1);

            crate::log(&format!(
                "Slot {} (R{}C{}): T{}, C{}, color {}",
                slot, row, col, found.tier, found.count, found.color
            ));

            report.items.push(ScannedItem {
                color: found.color,
                ..ScannedItem::new(found.tier, found.count, slot)
            });
        }

        report.rows_scanned = row + 1;

        if !row_has_items {
            if row >= 1 && report.effective_rows > 0 && row >= report.effective_rows {
                crate::log(&format!(
                    "Stop scan: row {} empty after items found up to row {}.",
                    row,
                    report.effective_rows - 1
                ));
                break;
            }
            if row > 3 && report.effective_rows == 0 {
                crate::log(&format!("Stop scan: first {} rows appear empty.", row + 1));
                break;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::classify::{Classification, SlotClassifier};
    use crate::ocr::{OcrSettings, StackCounter};
    use image::Rgba;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Classifier backed by a fixed map of `(row, col) -> (tier, count)`.
    struct FakeGrid {
        occupied: HashMap<(u32, u32), (u32, u32)>,
        visited: RefCell<Vec<(u32, u32)>>,
    }

    impl FakeGrid {
        fn new(occupied: &[((u32, u32), (u32, u32))]) -> Self {
            Self {
                occupied: occupied.iter().copied().collect(),
                visited: RefCell::new(Vec::new()),
            }
        }

        fn rows_visited(&self) -> u32 {
            self.visited
                .borrow()
                .iter()
                .map(|(row, _)| row + 1)
                .max()
                .unwrap_or(0)
        }
    }

    impl ClassifySlot for FakeGrid {
        fn classify(&self, _image: &RgbaImage, row: u32, col: u32) -> Option<Classification> {
            self.visited.borrow_mut().push((row, col));
            self.occupied
                .get(&(row, col))
                .map(|&(tier, count)| Classification {
                    tier,
                    count,
                    color: Rgb::default(),
                })
        }
    }

    fn geometry(cols: u32, rows: u32) -> GridGeometry {
        GridGeometry {
            num_cols: cols,
            max_rows: rows,
            ..GridGeometry::default()
        }
    }

    #[test]
    fn test_items_in_row_major_order() {
        let grid = FakeGrid::new(&[((1, 0), (2, 1)), ((0, 2), (1, 4)), ((0, 0), (3, 9))]);
        let report = scan_inventory(&RgbaImage::new(1, 1), &geometry(3, 5), &grid);

        let slots: Vec<usize> = report.items.iter().map(|i| i.original_slot).collect();
        assert_eq!(slots, vec![0, 2, 3]);
        assert_eq!(report.items[2].id, ItemId(3));
        assert_eq!(report.items[2].tier, 2);
        assert_eq!(report.effective_rows, 2);
    }

    #[test]
    fn test_stops_at_first_empty_row_after_items() {
        let grid = FakeGrid::new(&[((0, 0), (1, 1)), ((1, 1), (1, 1)), ((4, 0), (1, 1))]);
        let report = scan_inventory(&RgbaImage::new(1, 1), &geometry(3, 10), &grid);

        // Row 2 is empty, so the item in row 4 is never seen.
        assert_eq!(report.rows_scanned, 3);
        assert_eq!(grid.rows_visited(), 3);
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.effective_rows, 2);
    }

    #[test]
    fn test_empty_first_row_does_not_stop_when_items_follow() {
        let grid = FakeGrid::new(&[((2, 1), (1, 1))]);
        let report = scan_inventory(&RgbaImage::new(1, 1), &geometry(3, 10), &grid);

        assert_eq!(report.items.len(), 1);
        assert_eq!(report.effective_rows, 3);
        assert_eq!(report.rows_scanned, 4);
    }

    #[test]
    fn test_empty_grid_stops_after_five_rows() {
        let grid = FakeGrid::new(&[]);
        let report = scan_inventory(&RgbaImage::new(1, 1), &geometry(4, 10), &grid);

        assert!(report.is_empty());
        assert_eq!(report.effective_rows, 0);
        assert_eq!(report.rows_scanned, 5);
        assert_eq!(grid.visited.borrow().len(), 20);
    }

    #[test]
    fn test_full_grid_scans_every_row() {
        let occupied: Vec<((u32, u32), (u32, u32))> = (0..3)
            .flat_map(|row| (0..2).map(move |col| ((row, col), (1, 1))))
            .collect();
        let grid = FakeGrid::new(&occupied);
        let report = scan_inventory(&RgbaImage::new(1, 1), &geometry(2, 3), &grid);

        assert_eq!(report.items.len(), 6);
        assert_eq!(report.rows_scanned, 3);
        assert_eq!(report.effective_rows, 3);
    }

    #[test]
    fn test_scan_synthetic_screenshot() {
        let geometry = GridGeometry::default();
        let mut img = RgbaImage::from_pixel(1000, 1200, Rgba([0, 0, 0, 255]));

        let mut paint = |row: u32, col: u32, color: [u8; 3]| {
            let r = geometry.color_patch_rect(row, col);
            for y in r.y..r.y + r.height as i32 {
                for x in r.x..r.x + r.width as i32 {
                    img.put_pixel(x as u32, y as u32, Rgba([color[0], color[1], color[2], 255]));
                }
            }
        };
        paint(0, 0, [102, 41, 35]);
        paint(0, 3, [47, 67, 81]);
        paint(1, 5, [60, 52, 84]);

        let counter = StackCounter::new(None, OcrSettings::default());
        let classifier = SlotClassifier::new(&geometry, &counter);
        let report = scan_inventory(&img, &geometry, &classifier);

        let found: Vec<(usize, u32, u32)> = report
            .items
            .iter()
            .map(|i| (i.original_slot, i.tier, i.count))
            .collect();
        assert_eq!(found, vec![(0, 4, 1), (3, 1, 1), (11, 5, 1)]);
        assert_eq!(report.items[0].id, ItemId(0));
        assert_eq!(report.items[2].color, Rgb([60, 52, 84]));
        assert_eq!(report.rows_scanned, 3);
    }
}
