//! Connector routing between laid-out attachment boxes.

pub mod allocator;
mod path;
pub mod route;

pub use allocator::{EdgeLaneAllocator, ShelfAllocator};
pub use route::{RouteOptions, route_edge};
