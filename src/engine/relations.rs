use std::collections::HashMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::flatten::{FlatRow, RowKind};
use crate::engine::timeline::TimelineScale;
use crate::model::DependencyKind;

/// Pixels beyond each viewport edge inside which connectors are still
/// routed, so edges do not pop in at the boundary.
const CULL_BUFFER_PX: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// The visible chart region in engine coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewRect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// One orthogonal connector between a predecessor bar and its successor.
/// `points` traces horizontal–vertical–horizontal segments; the arrowhead
/// sits on the final point, at the successor's bar start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorPath {
    pub from_id: String,
    pub to_id: String,
    pub kind: DependencyKind,
    pub points: Vec<Point>,
}

/// Route connectors for every (predecessor, successor) pair whose geometry
/// can intersect the viewport. Links failing either the vertical or the
/// horizontal test are skipped before any path is built, keeping the work
/// proportional to what is visible.
pub fn route_connectors(
    rows: &[FlatRow],
    index_of: &HashMap<String, usize>,
    scale: &TimelineScale,
    row_height: f32,
    viewport: &ViewRect,
) -> Vec<ConnectorPath> {
    let top = viewport.top - CULL_BUFFER_PX;
    let bottom = viewport.bottom + CULL_BUFFER_PX;
    let left = viewport.left - CULL_BUFFER_PX;
    let right = viewport.right + CULL_BUFFER_PX;

    let row_visible = |index: usize| {
        let y0 = index as f32 * row_height;
        y0 <= bottom && y0 + row_height >= top
    };

    let mut paths = Vec::new();

    for (succ_index, row) in rows.iter().enumerate() {
        if row.kind != RowKind::Activity || row.predecessors.is_empty() {
            continue;
        }
        let Some(succ_start) = row.start else { continue };

        for pred in &row.predecessors {
            // A reference the flatten pass did not emit is the scheduler's
            // concern; the router just moves on.
            let Some(&pred_index) = index_of.get(&pred.activity_id) else {
                debug!(from = %pred.activity_id, to = %row.id, "dangling predecessor, skipping link");
                continue;
            };
            let pred_row = &rows[pred_index];
            let Some(pred_end) = pred_row.end else { continue };

            if !row_visible(pred_index) && !row_visible(succ_index) {
                continue;
            }

            // Leave the predecessor one day past its bar, land on the
            // successor's bar start.
            let x1 = scale.position(pred_end + Duration::days(1));
            let x2 = scale.position(succ_start);
            if x1.max(x2) < left || x1.min(x2) > right {
                continue;
            }

            let y1 = (pred_index as f32 + 0.5) * row_height;
            let y2 = (succ_index as f32 + 0.5) * row_height;
            let mid_x = (x1 + x2) / 2.0;

            paths.push(ConnectorPath {
                from_id: pred.activity_id.clone(),
                to_id: row.id.clone(),
                kind: pred.kind,
                points: vec![
                    Point { x: x1, y: y1 },
                    Point { x: mid_x, y: y1 },
                    Point { x: mid_x, y: y2 },
                    Point { x: x2, y: y2 },
                ],
            });
        }
    }

    paths
}
