use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-node expand/collapse state. Nodes absent from the map are expanded;
/// collapsing is the marked state, not expanding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpandState {
    map: HashMap<String, bool>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.map.get(id).copied().unwrap_or(true)
    }

    pub fn set(&mut self, id: impl Into<String>, expanded: bool) {
        self.map.insert(id.into(), expanded);
    }

    pub fn toggle(&mut self, id: &str) {
        let next = !self.is_expanded(id);
        self.map.insert(id.to_string(), next);
    }
}

/// Which identifier drives sibling ordering during the flatten walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    /// Order WBS siblings by their own id.
    Wbs,
    /// Order activities within each WBS by activity id.
    Activity,
    /// Order activities by id, and additionally order WBS siblings by the
    /// id of their first contained activity. WBS nodes with no activities
    /// sort last, by their own id.
    ActivityThenWbs,
}

/// Sort order applied to siblings while flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub ascending: bool,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::Wbs,
            ascending: true,
        }
    }
}

/// Controls what scale the timeline displays. Each level maps to a fixed
/// pixel-per-day density ([`ZoomLevel::default_pixels_per_day`]); a manual
/// drag-zoom overrides the density continuously, clamped by
/// [`crate::engine::timeline::TimelineScale::with_density`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomLevel {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl ZoomLevel {
    pub fn default_pixels_per_day(self) -> f32 {
        match self {
            ZoomLevel::Day => 40.0,
            ZoomLevel::Week => 15.0,
            ZoomLevel::Month => 5.0,
            ZoomLevel::Quarter => 2.0,
            ZoomLevel::Year => 0.5,
        }
    }
}

/// Forced gridline interval, independent of the zoom tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalInterval {
    /// Defer to the zoom level's own default spacing.
    #[default]
    Auto,
    Month,
    Quarter,
    Year,
}

/// Grid-display toggles threaded through to the frame assembly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridOptions {
    pub show_vertical_lines: bool,
    pub show_horizontal_lines: bool,
    pub show_wbs_bars: bool,
    pub vertical_interval: VerticalInterval,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            show_vertical_lines: true,
            show_horizontal_lines: true,
            show_wbs_bars: true,
            vertical_interval: VerticalInterval::Auto,
        }
    }
}
