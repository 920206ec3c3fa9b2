//! Timeline layout and scheduling engine.
//!
//! Everything here is synchronous and works on caller-owned snapshots:
//!
//! ```text
//!   attachments ─▶ schedule::lanes ─▶ layout (rects) ─▶ routing ─▶ SVG path data
//!   attachments + dependencies ─▶ schedule::validate ─▶ schedule::critical_path
//!   view::zoom supplies the time → pixel mapping used by layout
//! ```

pub mod config;
pub mod layout;
pub mod routing;
pub mod schedule;
pub mod view;

pub use config::{ConfigError, EngineConfig};
pub use layout::{LayoutConfig, RoutedEdge, TimelineLayout};
pub use routing::{EdgeLaneAllocator, RouteOptions, ShelfAllocator, route_edge};
pub use schedule::{
    CriticalPath, CriticalPathError, LaneAssignment, Rejection, critical_path, pack_attachments,
    validate_dependency, validate_dependency_against,
};
pub use view::{FrameSlot, MS_PER_DAY, TimeWindow, TimeZoom, WheelInput, ZoomConfig};
