use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Represents the type of dependency between two activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyKind {
    FinishToStart,
    StartToStart,
    FinishToFinish,
    StartToFinish,
}

/// A predecessor link carried by the successor activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predecessor {
    pub activity_id: String,
    pub kind: DependencyKind,
    /// Lag in whole days; may be negative (a lead).
    pub lag_days: i64,
}

/// A typed value for a record field, used by custom fields and by the
/// filter layer. Comparisons across kinds are defined to fail closed.
///
/// Untagged variant order matters: `Date` must be tried before `Text`,
/// since dates serialize as strings and `Text` would otherwise consume
/// them. Chrono parses strictly, so non-date text still falls through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Date(NaiveDate),
    Text(String),
    List(Vec<String>),
}

/// A scheduled activity as delivered by the CPM engine. Dates, float and
/// the critical flag are inputs here, never computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    /// Owning WBS node. An unknown id leaves the activity unreachable.
    pub wbs_id: String,
    pub duration: i64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_float: i64,
    pub is_critical: bool,
    pub predecessors: Vec<Predecessor>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, FieldValue>,
}

impl Activity {
    /// Create an activity with sensible defaults for the optional parts.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        wbs_id: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        Self {
            id: id.into(),
            name: name.into(),
            wbs_id: wbs_id.into(),
            duration: (end - start).num_days(),
            start,
            end,
            total_float: 0,
            is_critical: false,
            predecessors: Vec::new(),
            custom_fields: BTreeMap::new(),
        }
    }

    /// Zero-duration activities render as milestones.
    pub fn is_milestone(&self) -> bool {
        self.duration == 0 || self.start == self.end
    }
}
