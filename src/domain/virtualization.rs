//! Render-mode decision for long child lists.
//!
//! A node whose child count exceeds the threshold is drawn through a
//! fixed-height scrolling window that only materializes the rows intersecting
//! the viewport. The decision never touches tree structure, counts, or order.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Default child count above which a node is windowed.
pub const DEFAULT_CHILDREN_THRESHOLD: usize = 100;

/// Default viewport height in pixels.
pub const DEFAULT_VIEWPORT_HEIGHT_PX: u32 = 480;

/// Default estimated row height in pixels.
pub const DEFAULT_ROW_HEIGHT_PX: u32 = 24;

/// Default extra rows materialized above and below the visible range.
pub const DEFAULT_OVERSCAN_ROWS: usize = 3;

/// Threshold and geometry for windowed rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualizationPolicy {
    /// Window when `children > children_threshold`; 0 windows every non-empty list
    pub children_threshold: usize,
    pub viewport_height_px: u32,
    pub row_height_px: u32,
    pub overscan_rows: usize,
}

impl Default for VirtualizationPolicy {
    fn default() -> Self {
        Self {
            children_threshold: DEFAULT_CHILDREN_THRESHOLD,
            viewport_height_px: DEFAULT_VIEWPORT_HEIGHT_PX,
            row_height_px: DEFAULT_ROW_HEIGHT_PX,
            overscan_rows: DEFAULT_OVERSCAN_ROWS,
        }
    }
}

/// How a node's children are drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderPlan {
    /// Every child is drawn directly
    Full,
    /// Only `window.range` is materialized
    Windowed(ChildWindow),
}

impl RenderPlan {
    pub fn is_windowed(&self) -> bool {
        matches!(self, RenderPlan::Windowed(_))
    }

    /// Indices of children to materialize.
    pub fn range(&self, child_count: usize) -> Range<usize> {
        match self {
            RenderPlan::Full => 0..child_count,
            RenderPlan::Windowed(window) => window.range.clone(),
        }
    }
}

/// Materialized slice of a windowed child list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildWindow {
    /// Child indices to draw, overscan included
    pub range: Range<usize>,
    /// Spacer above the first drawn row
    pub top_padding_px: u64,
    /// Spacer below the last drawn row
    pub bottom_padding_px: u64,
    /// Height of the whole list as if fully drawn
    pub total_height_px: u64,
}

impl VirtualizationPolicy {
    /// `true` if a list of `child_count` children is windowed.
    pub fn should_window(&self, child_count: usize) -> bool {
        child_count > self.children_threshold
    }

    /// Rows that fit in the viewport, at least one.
    pub fn rows_per_viewport(&self) -> usize {
        let row = self.row_height_px.max(1);
        (self.viewport_height_px.div_ceil(row) as usize).max(1)
    }

    /// Visible child range for a scroll offset, without overscan.
    pub fn visible_range(&self, child_count: usize, scroll_offset_px: u64) -> Range<usize> {
        if child_count == 0 {
            return 0..0;
        }
        let row = u64::from(self.row_height_px.max(1));
        let first = usize::try_from(scroll_offset_px / row)
            .unwrap_or(usize::MAX)
            .min(child_count - 1);
        let last = first.saturating_add(self.rows_per_viewport()).min(child_count);
        first..last
    }

    /// Decide how to draw `child_count` children scrolled to `scroll_offset_px`.
    pub fn plan(&self, child_count: usize, scroll_offset_px: u64) -> RenderPlan {
        if !self.should_window(child_count) {
            return RenderPlan::Full;
        }

        let visible = self.visible_range(child_count, scroll_offset_px);
        let start = visible.start.saturating_sub(self.overscan_rows);
        let end = visible
            .end
            .saturating_add(self.overscan_rows)
            .min(child_count);

        let row = u64::from(self.row_height_px.max(1));
        let total = child_count as u64 * row;
        RenderPlan::Windowed(ChildWindow {
            range: start..end,
            top_padding_px: start as u64 * row,
            bottom_padding_px: (child_count - end) as u64 * row,
            total_height_px: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn policy(threshold: usize) -> VirtualizationPolicy {
        VirtualizationPolicy {
            children_threshold: threshold,
            ..VirtualizationPolicy::default()
        }
    }

    #[rstest]
    #[case(1, 2, true)]
    #[case(0, 1, true)]
    #[case(0, 0, false)]
    #[case(10_000, 2, false)]
    #[case(2, 2, false)]
    fn given_threshold_when_deciding_then_windows_only_above_it(
        #[case] threshold: usize,
        #[case] children: usize,
        #[case] windowed: bool,
    ) {
        assert_eq!(policy(threshold).should_window(children), windowed);
        assert_eq!(policy(threshold).plan(children, 0).is_windowed(), windowed);
    }

    #[test]
    fn given_scroll_offset_when_planning_then_window_follows_viewport() {
        let p = VirtualizationPolicy {
            children_threshold: 0,
            viewport_height_px: 240,
            row_height_px: 24,
            overscan_rows: 2,
        };
        let RenderPlan::Windowed(w) = p.plan(1000, 24 * 100) else {
            panic!("expected windowed plan");
        };
        assert_eq!(w.range, 98..112);
        assert_eq!(w.top_padding_px, 98 * 24);
        assert_eq!(w.bottom_padding_px, (1000 - 112) * 24);
        assert_eq!(
            w.top_padding_px + (w.range.len() as u64 * 24) + w.bottom_padding_px,
            w.total_height_px
        );
    }

    #[test]
    fn given_offset_past_end_when_planning_then_clamps_to_last_rows() {
        let p = VirtualizationPolicy {
            children_threshold: 0,
            viewport_height_px: 240,
            row_height_px: 24,
            overscan_rows: 0,
        };
        assert_eq!(p.visible_range(5, 1_000_000), 4..5);
        assert_eq!(p.plan(5, 1_000_000).range(5), 4..5);
    }

    #[test]
    fn given_full_plan_when_asking_range_then_covers_all_children() {
        assert_eq!(policy(100).plan(7, 0).range(7), 0..7);
    }
}
