use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::filter::{matches_all, FilterCondition};
use crate::engine::natural::natural_cmp;
use crate::model::{Activity, ExpandState, Predecessor, SortField, SortSpec, WbsNode, WbsRollup};

/// Row discriminator for the flattened sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowKind {
    Wbs,
    Activity,
}

/// One row of the synchronized table/chart view. Rebuilt wholesale on every
/// flatten pass; the renderer never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatRow {
    pub kind: RowKind,
    pub id: String,
    pub name: String,
    pub depth: usize,
    /// Meaningful for WBS rows; activities are always `true`.
    pub expanded: bool,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub duration: Option<i64>,
    pub is_critical: bool,
    pub is_milestone: bool,
    pub predecessors: Vec<Predecessor>,
}

/// Flatten the WBS tree and its activities into the ordered row sequence
/// the table and chart share.
///
/// The tree arrives as a flat list with parent pointers; this builds
/// child/parent/activity indexes, applies the sibling sort, computes
/// filter visibility with ancestor preservation, and emits a depth-first
/// walk honoring expand state. Output is a pure function of the inputs.
pub fn flatten(
    wbs: &[WbsNode],
    activities: &[Activity],
    rollups: &HashMap<String, WbsRollup>,
    expand: &ExpandState,
    filters: &[FilterCondition],
    sort: SortSpec,
) -> Vec<FlatRow> {
    let ids: HashSet<&str> = wbs.iter().map(|n| n.id.as_str()).collect();

    // Child and parent indexes. A parent pointer that is a root sentinel or
    // that references a node not in the list classifies as root-level.
    let mut children_of: HashMap<&str, Vec<&WbsNode>> = HashMap::new();
    let mut parent_of: HashMap<&str, &str> = HashMap::new();
    for node in wbs {
        let parent = node.parent_id.as_deref();
        if WbsNode::is_root_ref(parent) {
            children_of.entry("").or_default().push(node);
        } else if let Some(pid) = parent {
            if ids.contains(pid) {
                children_of.entry(pid).or_default().push(node);
                parent_of.insert(node.id.as_str(), pid);
            } else {
                debug!(wbs = %node.id, parent = %pid, "dangling parent, treating as root-level");
                children_of.entry("").or_default().push(node);
            }
        }
    }

    let mut acts_of: HashMap<&str, Vec<&Activity>> = HashMap::new();
    for act in activities {
        if !ids.contains(act.wbs_id.as_str()) {
            debug!(activity = %act.id, wbs = %act.wbs_id, "unknown wbs_id, activity unreachable");
            continue;
        }
        acts_of.entry(act.wbs_id.as_str()).or_default().push(act);
    }

    apply_sort(&mut children_of, &mut acts_of, sort);

    let visible = if filters.is_empty() {
        None
    } else {
        Some(visible_ids(wbs, &acts_of, &parent_of, filters))
    };

    let mut rows = Vec::new();
    let mut visiting = HashSet::new();
    let ctx = WalkCtx {
        children_of: &children_of,
        acts_of: &acts_of,
        rollups,
        expand,
        visible: visible.as_ref(),
    };
    walk(&ctx, "", 0, &mut visiting, &mut rows);
    rows
}

struct WalkCtx<'a> {
    children_of: &'a HashMap<&'a str, Vec<&'a WbsNode>>,
    acts_of: &'a HashMap<&'a str, Vec<&'a Activity>>,
    rollups: &'a HashMap<String, WbsRollup>,
    expand: &'a ExpandState,
    visible: Option<&'a VisibleIds<'a>>,
}

struct VisibleIds<'a> {
    wbs: HashSet<&'a str>,
    activities: HashSet<&'a str>,
}

/// Ids that survive the filter: matching activities, matching WBS nodes,
/// and every ancestor of either. Ancestors are never hidden by a filter,
/// which keeps matched leaves reachable in the walk.
fn visible_ids<'a>(
    wbs: &'a [WbsNode],
    acts_of: &HashMap<&'a str, Vec<&'a Activity>>,
    parent_of: &HashMap<&'a str, &'a str>,
    filters: &[FilterCondition],
) -> VisibleIds<'a> {
    let mut out = VisibleIds {
        wbs: HashSet::new(),
        activities: HashSet::new(),
    };

    for acts in acts_of.values() {
        for act in acts {
            if matches_all(*act, filters) {
                out.activities.insert(act.id.as_str());
                mark_ancestors(act.wbs_id.as_str(), parent_of, &mut out.wbs);
            }
        }
    }
    for node in wbs {
        if matches_all(node, filters) {
            mark_ancestors(node.id.as_str(), parent_of, &mut out.wbs);
        }
    }
    out
}

/// Insert `id` and each of its ancestors, stopping on repeats so a cyclic
/// parent chain cannot spin the walk.
fn mark_ancestors<'a>(
    id: &'a str,
    parent_of: &HashMap<&'a str, &'a str>,
    into: &mut HashSet<&'a str>,
) {
    let mut current = id;
    loop {
        if !into.insert(current) {
            return;
        }
        match parent_of.get(current) {
            Some(parent) => current = parent,
            None => return,
        }
    }
}

fn walk<'a>(
    ctx: &WalkCtx<'a>,
    parent_key: &'a str,
    depth: usize,
    visiting: &mut HashSet<&'a str>,
    rows: &mut Vec<FlatRow>,
) {
    let Some(children) = ctx.children_of.get(parent_key) else {
        return;
    };

    for node in children {
        if let Some(vis) = ctx.visible {
            if !vis.wbs.contains(node.id.as_str()) {
                continue;
            }
        }
        if !visiting.insert(node.id.as_str()) {
            warn!(wbs = %node.id, "cyclic parent chain, truncating subtree");
            continue;
        }

        // While a filter is active every surviving node shows its results,
        // regardless of manual collapse state.
        let expanded = ctx.visible.is_some() || ctx.expand.is_expanded(&node.id);
        let rollup = ctx.rollups.get(&node.id);
        rows.push(FlatRow {
            kind: RowKind::Wbs,
            id: node.id.clone(),
            name: node.name.clone(),
            depth,
            expanded,
            start: rollup.map(|r| r.start),
            end: rollup.map(|r| r.end),
            duration: rollup.map(|r| r.duration),
            is_critical: false,
            is_milestone: false,
            predecessors: Vec::new(),
        });

        if expanded {
            if let Some(acts) = ctx.acts_of.get(node.id.as_str()) {
                for act in acts {
                    if let Some(vis) = ctx.visible {
                        if !vis.activities.contains(act.id.as_str()) {
                            continue;
                        }
                    }
                    rows.push(FlatRow {
                        kind: RowKind::Activity,
                        id: act.id.clone(),
                        name: act.name.clone(),
                        depth: depth + 1,
                        expanded: true,
                        start: Some(act.start),
                        end: Some(act.end),
                        duration: Some(act.duration),
                        is_critical: act.is_critical,
                        is_milestone: act.is_milestone(),
                        predecessors: act.predecessors.clone(),
                    });
                }
            }
            walk(ctx, node.id.as_str(), depth + 1, visiting, rows);
        }

        visiting.remove(node.id.as_str());
    }
}

fn apply_sort<'a>(
    children_of: &mut HashMap<&'a str, Vec<&'a WbsNode>>,
    acts_of: &mut HashMap<&'a str, Vec<&'a Activity>>,
    sort: SortSpec,
) {
    let dir = |ord: std::cmp::Ordering| if sort.ascending { ord } else { ord.reverse() };

    match sort.field {
        SortField::Wbs => {
            for siblings in children_of.values_mut() {
                siblings.sort_by(|a, b| dir(natural_cmp(&a.id, &b.id)));
            }
        }
        SortField::Activity => {
            for acts in acts_of.values_mut() {
                acts.sort_by(|a, b| dir(natural_cmp(&a.id, &b.id)));
            }
        }
        SortField::ActivityThenWbs => {
            for acts in acts_of.values_mut() {
                acts.sort_by(|a, b| dir(natural_cmp(&a.id, &b.id)));
            }
            // Reorder WBS siblings by the id of their first activity; nodes
            // with no activities go last, ordered by their own id.
            for siblings in children_of.values_mut() {
                siblings.sort_by(|a, b| {
                    let fa = acts_of.get(a.id.as_str()).and_then(|v| v.first());
                    let fb = acts_of.get(b.id.as_str()).and_then(|v| v.first());
                    let ord = match (fa, fb) {
                        (Some(fa), Some(fb)) => natural_cmp(&fa.id, &fb.id),
                        (Some(_), None) => std::cmp::Ordering::Less,
                        (None, Some(_)) => std::cmp::Ordering::Greater,
                        (None, None) => natural_cmp(&a.id, &b.id),
                    };
                    dir(ord)
                });
            }
        }
    }
}
