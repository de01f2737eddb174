//! vrptw-planner core
//!
//! Single-vehicle route planning with time windows: builds a routing model
//! over a whole-minute travel-time matrix, searches for a cheapest-arc tour
//! honoring per-location windows, and prunes the location farthest from the
//! depot whenever no feasible tour exists.

pub mod bing;
pub mod haversine;
pub mod kml;
pub mod model;
pub mod path;
pub mod solver;
pub mod traits;
