//! Headless layout engine for Gantt schedule views.
//!
//! Sits between a CPM scheduler (which supplies dates, floats and critical
//! flags) and a renderer (which only paints). The engine flattens the WBS
//! tree into an ordered row sequence with filtering and natural sorting,
//! virtualizes that sequence against a scroll viewport, lays out the time
//! axis for the visible pixel range, and routes relationship connectors
//! with viewport culling.

pub mod engine;
pub mod model;

pub use engine::{FlatRow, Frame, GanttEngine, RowKind, Viewport};
pub use model::{Activity, ScheduleResult, WbsNode};
