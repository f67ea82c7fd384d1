use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::filter::FilterCondition;
use crate::engine::flatten::{flatten, FlatRow, RowKind};
use crate::engine::relations::{route_connectors, ConnectorPath, ViewRect};
use crate::engine::timeline::{BarGeometry, TimelineScale, TimelineTicks};
use crate::engine::virtualize::{compute_window, VirtualWindow};
use crate::model::{
    ExpandState, GridOptions, ScheduleResult, SortSpec, WbsNode, ZoomLevel,
};

/// Rows kept on either side of the viewport beyond what is visible.
const OVERSCAN_ROWS: usize = 10;

/// Default row height in pixels; the renderer may override it.
const DEFAULT_ROW_HEIGHT: f32 = 24.0;

/// Scroll and size of the chart viewport for one frame.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_top: f32,
    pub scroll_left: f32,
    pub width: f32,
    pub height: f32,
}

/// A bar positioned against its flattened row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowBar {
    pub row_index: usize,
    pub top: f32,
    pub geometry: BarGeometry,
}

/// Everything the renderer consumes for one paint: the virtual window over
/// the committed row sequence, timeline primitives for the visible pixel
/// range, bar geometry for visible rows, and routed connectors. Built
/// wholesale; a superseded frame is simply dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub window: VirtualWindow,
    pub ticks: TimelineTicks,
    pub bars: Vec<RowBar>,
    pub connectors: Vec<ConnectorPath>,
    /// Horizontal separator positions for visible rows, when enabled.
    pub row_lines: Vec<f32>,
}

struct RowsCache {
    version: u64,
    rows: Vec<FlatRow>,
    index_of: HashMap<String, usize>,
}

/// Owns the project inputs and view state, and re-derives the flattened
/// row sequence only when one of them actually changed. Each setter bumps
/// a version counter; the flatten pass is memoized against it, so scroll
/// and resize traffic never re-flattens.
pub struct GanttEngine {
    wbs: Vec<WbsNode>,
    schedule: ScheduleResult,
    expand: ExpandState,
    filters: Vec<FilterCondition>,
    sort: SortSpec,
    zoom: ZoomLevel,
    manual_density: Option<f32>,
    grid: GridOptions,
    row_height: f32,
    project_start: NaiveDate,

    version: u64,
    cache: RowsCache,
}

impl GanttEngine {
    pub fn new(project_start: NaiveDate) -> Self {
        Self {
            wbs: Vec::new(),
            schedule: ScheduleResult::default(),
            expand: ExpandState::new(),
            filters: Vec::new(),
            sort: SortSpec::default(),
            zoom: ZoomLevel::Week,
            manual_density: None,
            grid: GridOptions::default(),
            row_height: DEFAULT_ROW_HEIGHT,
            project_start,
            version: 0,
            cache: RowsCache {
                version: 0,
                rows: Vec::new(),
                index_of: HashMap::new(),
            },
        }
    }

    pub fn set_project(&mut self, wbs: Vec<WbsNode>, schedule: ScheduleResult) {
        self.wbs = wbs;
        self.schedule = schedule;
        self.version += 1;
    }

    pub fn set_expand_state(&mut self, expand: ExpandState) {
        self.expand = expand;
        self.version += 1;
    }

    pub fn toggle_expanded(&mut self, wbs_id: &str) {
        self.expand.toggle(wbs_id);
        self.version += 1;
    }

    pub fn set_filters(&mut self, filters: Vec<FilterCondition>) {
        self.filters = filters;
        self.version += 1;
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.version += 1;
    }

    /// Zoom changes affect only pixel mapping, not the row sequence, so
    /// they leave the flatten cache alone.
    pub fn set_zoom(&mut self, zoom: ZoomLevel) {
        self.zoom = zoom;
        self.manual_density = None;
    }

    /// Continuous drag-zoom density; clamped when the scale is built.
    pub fn set_manual_density(&mut self, pixels_per_day: f32) {
        self.manual_density = Some(pixels_per_day);
    }

    pub fn set_grid_options(&mut self, grid: GridOptions) {
        self.grid = grid;
    }

    pub fn set_row_height(&mut self, row_height: f32) {
        self.row_height = row_height.max(1.0);
    }

    pub fn scale(&self) -> TimelineScale {
        match self.manual_density {
            Some(density) => TimelineScale::with_density(self.project_start, density),
            None => TimelineScale::new(self.project_start, self.zoom),
        }
    }

    /// The committed flattened row sequence, re-derived on demand.
    pub fn rows(&mut self) -> &[FlatRow] {
        self.ensure_rows();
        &self.cache.rows
    }

    fn ensure_rows(&mut self) {
        if self.cache.version == self.version {
            return;
        }
        let rows = flatten(
            &self.wbs,
            &self.schedule.activities,
            &self.schedule.wbs_rollups,
            &self.expand,
            &self.filters,
            self.sort,
        );
        let index_of = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        self.cache = RowsCache {
            version: self.version,
            rows,
            index_of,
        };
    }

    /// Assemble one frame for the given viewport. The flatten pass always
    /// commits before the window, ticks and connectors read it, so every
    /// stage sees one consistent row sequence.
    pub fn frame(&mut self, viewport: Viewport) -> Frame {
        self.ensure_rows();
        let cache = &self.cache;
        let scale = self.scale();

        let window = compute_window(
            cache.rows.len(),
            self.row_height,
            viewport.height,
            viewport.scroll_top,
            OVERSCAN_ROWS,
        );

        let mut ticks = scale.ticks(
            self.zoom,
            self.grid.vertical_interval,
            viewport.scroll_left,
            viewport.width,
        );
        if !self.grid.show_vertical_lines {
            ticks.gridlines.clear();
        }

        let mut bars = Vec::new();
        let mut row_lines = Vec::new();
        for item in &window.items {
            let row = &cache.rows[item.index];
            if self.grid.show_horizontal_lines {
                row_lines.push(item.offset_top + self.row_height);
            }
            if row.kind == RowKind::Wbs && !self.grid.show_wbs_bars {
                continue;
            }
            if let (Some(start), Some(end)) = (row.start, row.end) {
                bars.push(RowBar {
                    row_index: item.index,
                    top: item.offset_top,
                    geometry: scale.bar(start, end, row.is_milestone, row.is_critical),
                });
            }
        }

        let view_rect = ViewRect {
            left: viewport.scroll_left,
            right: viewport.scroll_left + viewport.width,
            top: viewport.scroll_top,
            bottom: viewport.scroll_top + viewport.height,
        };
        let connectors = route_connectors(
            &cache.rows,
            &cache.index_of,
            &scale,
            self.row_height,
            &view_rect,
        );

        Frame {
            window,
            ticks,
            bars,
            connectors,
            row_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::filter::{FilterCondition, FilterOp};
    use crate::model::{Activity, FieldValue, Predecessor, SortField, WbsRollup};
    use crate::model::DependencyKind;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn engine_with_sample() -> GanttEngine {
        let wbs = vec![
            WbsNode::new("P1", "Project", None),
            WbsNode::new("P1.1", "Phase One", Some("P1".to_string())),
        ];
        let mut a10 = Activity::new("A10", "Excavate", "P1.1", d(2025, 1, 6), d(2025, 1, 10));
        a10.is_critical = true;
        let mut a20 = Activity::new("A20", "Pour", "P1.1", d(2025, 1, 13), d(2025, 1, 24));
        a20.predecessors.push(Predecessor {
            activity_id: "A10".to_string(),
            kind: DependencyKind::FinishToStart,
            lag_days: 0,
        });

        let mut schedule = ScheduleResult {
            activities: vec![a10, a20],
            wbs_rollups: HashMap::new(),
        };
        schedule.wbs_rollups.insert(
            "P1".to_string(),
            WbsRollup { start: d(2025, 1, 6), end: d(2025, 1, 24), duration: 18 },
        );
        schedule.wbs_rollups.insert(
            "P1.1".to_string(),
            WbsRollup { start: d(2025, 1, 6), end: d(2025, 1, 24), duration: 18 },
        );

        let mut engine = GanttEngine::new(d(2025, 1, 1));
        engine.set_project(wbs, schedule);
        engine.set_sort(SortSpec { field: SortField::Activity, ascending: true });
        engine
    }

    fn viewport() -> Viewport {
        Viewport { scroll_top: 0.0, scroll_left: 0.0, width: 1200.0, height: 400.0 }
    }

    #[test]
    fn frame_carries_the_whole_pipeline() {
        let mut engine = engine_with_sample();
        let frame = engine.frame(viewport());

        assert_eq!(frame.window.items.len(), 4);
        assert_eq!(frame.bars.len(), 4);
        assert!(!frame.ticks.marks.is_empty());
        assert_eq!(frame.connectors.len(), 1);
        assert_eq!(frame.connectors[0].from_id, "A10");
        assert_eq!(frame.row_lines.len(), 4);

        let ids: Vec<&str> = engine.rows().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P1.1", "A10", "A20"]);
    }

    #[test]
    fn flatten_is_memoized_until_inputs_change() {
        let mut engine = engine_with_sample();
        let before = engine.rows().as_ptr();
        engine.frame(viewport());
        engine.frame(Viewport { scroll_top: 50.0, ..viewport() });
        // Scroll traffic does not re-flatten.
        assert_eq!(engine.rows().as_ptr(), before);

        engine.set_filters(vec![FilterCondition {
            id: "f1".to_string(),
            field: "name".to_string(),
            op: FilterOp::Contains,
            value: FieldValue::Text("Pour".to_string()),
        }]);
        let ids: Vec<String> = engine.rows().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec!["P1", "P1.1", "A20"]);
    }

    #[test]
    fn collapse_drops_bars_and_connectors_together() {
        let mut engine = engine_with_sample();
        engine.toggle_expanded("P1.1");
        let frame = engine.frame(viewport());

        assert_eq!(frame.window.items.len(), 2);
        // No activity rows, so no connectors to route.
        assert!(frame.connectors.is_empty());
    }

    #[test]
    fn grid_toggles_gate_frame_primitives() {
        let mut engine = engine_with_sample();
        engine.set_grid_options(GridOptions {
            show_vertical_lines: false,
            show_horizontal_lines: false,
            show_wbs_bars: false,
            vertical_interval: Default::default(),
        });
        let frame = engine.frame(viewport());

        assert!(frame.ticks.gridlines.is_empty());
        assert!(frame.row_lines.is_empty());
        assert!(frame.bars.iter().all(|b| {
            engine.rows()[b.row_index].kind == RowKind::Activity
        }));
    }

    #[test]
    fn critical_flag_reaches_bar_geometry() {
        let mut engine = engine_with_sample();
        let frame = engine.frame(viewport());
        let a10_bar = frame
            .bars
            .iter()
            .find(|b| engine.rows()[b.row_index].id == "A10")
            .copied();
        assert!(a10_bar.is_some_and(|b| b.geometry.is_critical));
    }

    #[test]
    fn manual_density_overrides_zoom() {
        let mut engine = engine_with_sample();
        engine.set_zoom(ZoomLevel::Month);
        assert_eq!(engine.scale().pixels_per_day(), 5.0);
        engine.set_manual_density(7.5);
        assert_eq!(engine.scale().pixels_per_day(), 7.5);
        engine.set_zoom(ZoomLevel::Month);
        assert_eq!(engine.scale().pixels_per_day(), 5.0);
    }
}
