pub mod activity;
pub mod schedule;
pub mod view;
pub mod wbs;

pub use activity::{Activity, DependencyKind, FieldValue, Predecessor};
pub use schedule::{ScheduleResult, WbsRollup};
pub use view::{ExpandState, GridOptions, SortField, SortSpec, VerticalInterval, ZoomLevel};
pub use wbs::WbsNode;
