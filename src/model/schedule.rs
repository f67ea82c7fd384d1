use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::activity::Activity;

/// Rolled-up dates for one WBS node, aggregated by the scheduler over the
/// activities beneath it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WbsRollup {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub duration: i64,
}

/// Output of the external CPM scheduler, consumed read-only by this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub activities: Vec<Activity>,
    pub wbs_rollups: HashMap<String, WbsRollup>,
}
