//! Target ordering and move derivation.
//!
//! Moves are derived by simulating the layout: for each target position the
//! desired item is dragged there, and whatever occupied the destination is
//! swapped into the source slot, which is what the game does on a drop.

use thiserror::Error;

use crate::grid::{GridGeometry, ItemId, Point, ScannedItem};

/// One drag from slot `from` to slot `to`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: usize,
    pub to: usize,
    pub item: ItemId,
    /// Absolute screen position of the source slot center.
    pub from_point: Option<Point>,
    /// Absolute screen position of the destination slot center.
    pub to_point: Option<Point>,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: slot {} -> slot {}", self.item, self.from, self.to)
    }
}

/// Ordered list of moves that turns the scanned layout into the sorted one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    pub moves: Vec<Move>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Internal consistency failures of the planner.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlanError {
    /// A scanned item claims a slot the grid does not have.
    #[error("{item} is at slot {slot} but the grid only has {slot_count} slots")]
    ItemOutsideGrid { item: ItemId, slot: usize, slot_count: usize },
    /// Two scanned items claim the same slot.
    #[error("slot {slot} holds more than one scanned item")]
    SlotOccupiedTwice { slot: usize },
    /// The item wanted at `target` is no longer anywhere in the layout.
    #[error("{item} (wanted at slot {target}) not found in simulated layout")]
    ItemMissing { item: ItemId, target: usize },
}

/// Sorts items by tier ascending, then count descending, then original slot.
pub fn target_order(items: &[ScannedItem]) -> Vec<ScannedItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| {
        a.tier
            .cmp(&b.tier)
            .then(b.count.cmp(&a.count))
            .then(a.original_slot.cmp(&b.original_slot))
    });
    sorted
}

/// Physical slot index to the item currently in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulatedLayout {
    slots: Vec<Option<ItemId>>,
}

impl SimulatedLayout {
    /// Places every item at its original slot.
    pub fn from_items(items: &[ScannedItem], slot_count: usize) -> Result<Self, PlanError> {
        let mut slots = vec![None; slot_count];
        for item in items {
            let Some(slot) = slots.get_mut(item.original_slot) else {
                return Err(PlanError::ItemOutsideGrid {
                    item: item.id,
                    slot: item.original_slot,
                    slot_count,
                });
            };
            if slot.is_some() {
                return Err(PlanError::SlotOccupiedTwice {
                    slot: item.original_slot,
                });
            }
            *slot = Some(item.id);
        }
        Ok(Self { slots })
    }

    pub fn get(&self, slot: usize) -> Option<ItemId> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn position_of(&self, item: ItemId) -> Option<usize> {
        self.slots.iter().position(|s| *s == Some(item))
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
    }

    /// Applies a move the way the game does: the occupant of `to` ends up at `from`.
    pub fn apply(&mut self, mv: &Move) {
        self.swap(mv.from, mv.to);
    }
}

/// Computes the moves that sort `items` into the first `n` slots.
///
/// `window_origin` is the game window's top-left corner on screen; slot
/// centers are offset by it to produce absolute drag coordinates.
pub fn plan_moves(
    items: &[ScannedItem],
    geometry: &GridGeometry,
    window_origin: Point,
) -> Result<Plan, PlanError> {
    let target = target_order(items);
    let mut layout = SimulatedLayout::from_items(items, geometry.slot_count())?;
    let mut moves = Vec::new();

    for (t, wanted) in target.iter().enumerate() {
        let s = layout
            .position_of(wanted.id)
            .ok_or(PlanError::ItemMissing {
                item: wanted.id,
                target: t,
            })?;
        if s == t {
            continue;
        }

        let mv = Move {
            from: s,
            to: t,
            item: wanted.id,
            from_point: geometry.slot_center_at(s).map(|p| p.offset(window_origin)),
            to_point: geometry.slot_center_at(t).map(|p| p.offset(window_origin)),
        };
        layout.apply(&mv);
        moves.push(mv);
    }

    Ok(Plan { moves })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(tier: u32, count: u32, slot: usize) -> ScannedItem {
        ScannedItem::new(tier, count, slot)
    }

    fn small_grid() -> GridGeometry {
        GridGeometry {
            num_cols: 4,
            max_rows: 3,
            ..GridGeometry::default()
        }
    }

    /// Tiny deterministic generator so tests need no extra crates.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: u64) -> u64 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (self.0 >> 33) % bound
        }
    }

    fn random_items(rng: &mut Lcg, slot_count: usize) -> Vec<ScannedItem> {
        let mut items = Vec::new();
        for slot in 0..slot_count {
            if rng.next(3) > 0 {
                items.push(item(rng.next(5) as u32 + 1, rng.next(4) as u32 + 1, slot));
            }
        }
        items
    }

    fn target_ids(items: &[ScannedItem]) -> Vec<ItemId> {
        target_order(items).iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_target_order_keys() {
        let items = vec![item(2, 5, 0), item(1, 3, 1), item(1, 7, 2), item(1, 7, 3)];
        let ids: Vec<usize> = target_order(&items).iter().map(|i| i.original_slot).collect();
        assert_eq!(ids, vec![2, 3, 1, 0]);
    }

    #[test]
    fn test_scenario_single_move() {
        let items = vec![item(2, 5, 0), item(1, 3, 1), item(1, 7, 2)];
        let plan = plan_moves(&items, &small_grid(), Point::new(0, 0)).unwrap();

        assert_eq!(plan.len(), 1);
        let mv = &plan.moves[0];
        assert_eq!((mv.from, mv.to, mv.item), (2, 0, ItemId(2)));

        let mut layout = SimulatedLayout::from_items(&items, 12).unwrap();
        layout.apply(mv);
        assert_eq!(layout.get(0), Some(ItemId(2)));
        assert_eq!(layout.get(1), Some(ItemId(1)));
        assert_eq!(layout.get(2), Some(ItemId(0)));
    }

    #[test]
    fn test_points_are_absolute_slot_centers() {
        let geometry = small_grid();
        let items = vec![item(2, 1, 0), item(1, 1, 5)];
        let origin = Point::new(100, 50);
        let plan = plan_moves(&items, &geometry, origin).unwrap();

        let mv = &plan.moves[0];
        assert_eq!((mv.from, mv.to), (5, 0));
        assert_eq!(mv.from_point, Some(geometry.slot_center(1, 1).offset(origin)));
        assert_eq!(mv.to_point, Some(geometry.slot_center(0, 0).offset(origin)));
    }

    #[test]
    fn test_sorted_input_needs_no_moves() {
        let items = vec![item(1, 9, 0), item(1, 2, 1), item(3, 4, 2)];
        let plan = plan_moves(&items, &small_grid(), Point::default()).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let plan = plan_moves(&[], &small_grid(), Point::default()).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_gaps_are_compacted() {
        // Items in slots 3 and 7 end up in slots 0 and 1.
        let items = vec![item(1, 1, 3), item(2, 1, 7)];
        let plan = plan_moves(&items, &small_grid(), Point::default()).unwrap();
        let pairs: Vec<(usize, usize)> = plan.moves.iter().map(|m| (m.from, m.to)).collect();
        assert_eq!(pairs, vec![(3, 0), (7, 1)]);
    }

    #[test]
    fn test_item_outside_grid_is_an_error() {
        let items = vec![item(1, 1, 0), item(1, 1, 12)];
        let err = plan_moves(&items, &small_grid(), Point::default()).unwrap_err();
        assert_eq!(
            err,
            PlanError::ItemOutsideGrid {
                item: ItemId(12),
                slot: 12,
                slot_count: 12
            }
        );
        assert!(err.to_string().contains("item@12"));
    }

    #[test]
    fn test_duplicate_slot_is_an_error() {
        let items = vec![item(1, 1, 4), item(2, 1, 4)];
        let err = plan_moves(&items, &small_grid(), Point::default()).unwrap_err();
        assert_eq!(err, PlanError::SlotOccupiedTwice { slot: 4 });
    }

    #[test]
    fn test_plan_error_converts_to_anyhow() {
        let err: anyhow::Error = PlanError::ItemMissing {
            item: ItemId(3),
            target: 0,
        }
        .into();
        assert!(err.downcast_ref::<PlanError>().is_some());
        assert_eq!(
            err.to_string(),
            "item@3 (wanted at slot 0) not found in simulated layout"
        );
    }

    #[test]
    fn test_properties_on_random_layouts() {
        let geometry = small_grid();
        let mut rng = Lcg(42);

        for case in 0..300 {
            let items = random_items(&mut rng, geometry.slot_count());
            let n = items.len();
            let wanted = target_ids(&items);

            let plan = plan_moves(&items, &geometry, Point::default()).unwrap();
            let again = plan_moves(&items, &geometry, Point::default()).unwrap();
            assert_eq!(plan, again, "case {}: deterministic", case);

            assert!(plan.len() <= n, "case {}: at most n moves", case);

            let mut layout = SimulatedLayout::from_items(&items, geometry.slot_count()).unwrap();
            let already_sorted = (0..n).all(|t| layout.get(t) == Some(wanted[t]));
            assert_eq!(plan.is_empty(), already_sorted, "case {}: zero iff sorted", case);

            for mv in &plan.moves {
                assert_ne!(mv.from, mv.to);
                layout.apply(mv);
                // Everything left of and including the destination is final.
                for t in 0..=mv.to {
                    assert_eq!(layout.get(t), Some(wanted[t]), "case {}: slot {}", case, t);
                }
            }

            for (t, id) in wanted.iter().enumerate() {
                assert_eq!(layout.get(t), Some(*id), "case {}: final slot {}", case, t);
            }
            for slot in n..geometry.slot_count() {
                assert_eq!(layout.get(slot), None, "case {}: tail slot {}", case, slot);
            }
        }
    }
}
