use serde::{Deserialize, Serialize};

/// Smallest row height the window math will accept; guards the index
/// arithmetic against a zero or negative height.
const MIN_ITEM_HEIGHT: f32 = 1.0;

/// One materializable row position. Ephemeral, recomputed per scroll or
/// resize event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VirtualItem {
    pub index: usize,
    pub offset_top: f32,
}

/// The contiguous index range the renderer must materialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VirtualWindow {
    pub items: Vec<VirtualItem>,
    pub total_height: f32,
    pub start_index: usize,
    pub end_index: usize,
}

/// Compute the minimal window of rows intersecting the viewport, padded by
/// `overscan` rows on each side. Cost is proportional to the viewport, not
/// to `total_count`.
pub fn compute_window(
    total_count: usize,
    item_height: f32,
    container_height: f32,
    scroll_top: f32,
    overscan: usize,
) -> VirtualWindow {
    let item_height = item_height.max(MIN_ITEM_HEIGHT);
    let total_height = total_count as f32 * item_height;

    if total_count == 0 {
        return VirtualWindow {
            items: Vec::new(),
            total_height,
            start_index: 0,
            end_index: 0,
        };
    }

    let scroll_top = scroll_top.max(0.0);
    let first_visible = (scroll_top / item_height).floor() as usize;
    let last_visible = ((scroll_top + container_height.max(0.0)) / item_height).floor() as usize;

    let end_index = (last_visible + overscan).min(total_count - 1);
    let start_index = first_visible.saturating_sub(overscan).min(end_index);

    let mut items = Vec::with_capacity(end_index - start_index + 1);
    for index in start_index..=end_index {
        items.push(VirtualItem {
            index,
            offset_top: index as f32 * item_height,
        });
    }

    VirtualWindow {
        items,
        total_height,
        start_index,
        end_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn window_at_top() {
        let w = compute_window(1000, 20.0, 200.0, 0.0, 2);
        assert_eq!(w.start_index, 0);
        assert_eq!(w.end_index, 12);
        assert_eq!(w.total_height, 20_000.0);
        assert_eq!(w.items[0], VirtualItem { index: 0, offset_top: 0.0 });
    }

    #[test]
    fn window_mid_scroll_applies_overscan() {
        let w = compute_window(1000, 20.0, 200.0, 4000.0, 5);
        assert_eq!(w.start_index, 195);
        assert_eq!(w.end_index, 215);
        assert_eq!(w.items.first().unwrap().offset_top, 195.0 * 20.0);
    }

    #[test]
    fn window_clamps_at_the_end() {
        let w = compute_window(100, 20.0, 200.0, 10_000.0, 10);
        assert_eq!(w.end_index, 99);
        assert!(w.start_index <= w.end_index);
    }

    #[test]
    fn empty_list_yields_no_items() {
        let w = compute_window(0, 20.0, 200.0, 0.0, 10);
        assert!(w.items.is_empty());
        assert_eq!(w.total_height, 0.0);
    }

    #[test]
    fn zero_item_height_is_clamped() {
        let w = compute_window(50, 0.0, 100.0, 0.0, 0);
        assert!(w.total_height > 0.0);
        assert!(w.end_index < 50);
    }

    #[test]
    fn bounded_independent_of_total_count() {
        // 100k rows, 20-row viewport, overscan 10: at most ~41 items.
        let w = compute_window(100_000, 20.0, 400.0, 1_000_000.0, 10);
        assert!(w.items.len() <= 41, "materialized {} items", w.items.len());
    }

    proptest! {
        #[test]
        fn viewport_center_row_is_covered(
            total in 1usize..50_000,
            scroll_frac in 0.0f32..1.0,
        ) {
            let item_height = 20.0;
            let container = 400.0;
            let total_height = total as f32 * item_height;
            let max_scroll = (total_height - container).max(0.0);
            let scroll_top = scroll_frac * max_scroll;

            let w = compute_window(total, item_height, container, scroll_top, 0);
            let center = scroll_top + container.min(total_height) / 2.0;
            let center_row = ((center / item_height).floor() as usize).min(total - 1);
            prop_assert!(w.start_index <= center_row && center_row <= w.end_index);
        }

        #[test]
        fn item_count_tracks_viewport_not_total(
            total in 1usize..100_000,
            scroll in 0.0f32..2_000_000.0,
        ) {
            let w = compute_window(total, 20.0, 400.0, scroll, 10);
            prop_assert!(w.items.len() <= 400 / 20 + 1 + 2 * 10);
        }
    }
}
