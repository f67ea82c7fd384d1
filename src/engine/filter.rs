use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Activity, FieldValue, WbsNode};

/// Comparison operator for one filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Contains,
    Equals,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
}

/// One field condition. A filter set is the AND of its conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterCondition {
    pub id: String,
    pub field: String,
    pub op: FilterOp,
    pub value: FieldValue,
}

/// Anything the filter layer can interrogate by field name. Records resolve
/// their own typed fields; unknown names yield `None` and fail the condition.
pub trait Filterable {
    fn field(&self, name: &str) -> Option<FieldValue>;
}

impl Filterable for Activity {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Text(self.id.clone())),
            "name" => Some(FieldValue::Text(self.name.clone())),
            "wbs_id" => Some(FieldValue::Text(self.wbs_id.clone())),
            "duration" => Some(FieldValue::Number(self.duration as f64)),
            "total_float" => Some(FieldValue::Number(self.total_float as f64)),
            "start" => Some(FieldValue::Date(self.start)),
            "end" => Some(FieldValue::Date(self.end)),
            other => self.custom_fields.get(other).cloned(),
        }
    }
}

impl Filterable for WbsNode {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Text(self.id.clone())),
            "name" => Some(FieldValue::Text(self.name.clone())),
            _ => None,
        }
    }
}

/// True when the record satisfies every condition. An empty set matches
/// everything.
pub fn matches_all<R: Filterable>(record: &R, conditions: &[FilterCondition]) -> bool {
    conditions.iter().all(|c| matches_one(record, c))
}

fn matches_one<R: Filterable>(record: &R, cond: &FilterCondition) -> bool {
    match record.field(&cond.field) {
        Some(actual) => evaluate(&actual, cond.op, &cond.value),
        None => false,
    }
}

/// Evaluate one comparison. Combinations that cannot be compared are
/// non-matching rather than an error; text condition values are coerced
/// onto number and date fields where they parse cleanly.
fn evaluate(actual: &FieldValue, op: FilterOp, wanted: &FieldValue) -> bool {
    use FieldValue::*;

    match (actual, wanted) {
        (Text(a), Text(w)) => {
            let (a_lc, w_lc) = (a.to_lowercase(), w.to_lowercase());
            match op {
                FilterOp::Contains => a_lc.contains(&w_lc),
                FilterOp::Equals => a_lc == w_lc,
                FilterOp::Neq => a_lc != w_lc,
                FilterOp::Gt => a_lc > w_lc,
                FilterOp::Lt => a_lc < w_lc,
                FilterOp::Gte => a_lc >= w_lc,
                FilterOp::Lte => a_lc <= w_lc,
            }
        }
        (Number(a), Number(w)) => compare_ord(op, a.partial_cmp(w)),
        (Number(a), Text(w)) => match w.trim().parse::<f64>() {
            Ok(w) => compare_ord(op, a.partial_cmp(&w)),
            Err(_) => false,
        },
        (Date(a), Date(w)) => compare_ord(op, Some(a.cmp(w))),
        (Date(a), Text(w)) => match NaiveDate::parse_from_str(w.trim(), "%Y-%m-%d") {
            Ok(w) => compare_ord(op, Some(a.cmp(&w))),
            Err(_) => false,
        },
        (List(items), Text(w)) => {
            let w_lc = w.to_lowercase();
            match op {
                FilterOp::Contains => items.iter().any(|i| i.to_lowercase().contains(&w_lc)),
                FilterOp::Equals => items.iter().any(|i| i.to_lowercase() == w_lc),
                FilterOp::Neq => items.iter().all(|i| i.to_lowercase() != w_lc),
                _ => false,
            }
        }
        _ => false,
    }
}

fn compare_ord(op: FilterOp, ord: Option<std::cmp::Ordering>) -> bool {
    let Some(ord) = ord else { return false };
    match op {
        FilterOp::Contains => false,
        FilterOp::Equals => ord.is_eq(),
        FilterOp::Neq => ord.is_ne(),
        FilterOp::Gt => ord.is_gt(),
        FilterOp::Lt => ord.is_lt(),
        FilterOp::Gte => ord.is_ge(),
        FilterOp::Lte => ord.is_le(),
    }
}
