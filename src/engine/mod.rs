pub mod filter;
pub mod flatten;
pub mod frame;
pub mod natural;
pub mod relations;
pub mod timeline;
pub mod virtualize;

pub use filter::{FilterCondition, FilterOp, Filterable};
pub use flatten::{flatten, FlatRow, RowKind};
pub use frame::{Frame, GanttEngine, RowBar, Viewport};
pub use natural::natural_cmp;
pub use relations::{route_connectors, ConnectorPath, Point, ViewRect};
pub use timeline::{BarGeometry, GridLine, TickMark, TickTier, TimelineScale, TimelineTicks, WeekendBand};
pub use virtualize::{compute_window, VirtualItem, VirtualWindow};
