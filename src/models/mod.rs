//! Domain model types for pickup-and-delivery dispatch.
//!
//! Provides the request side (locations, time windows, shipments, vehicles,
//! and the problem that ties them together) and the response side (timed
//! routes, solutions, and constraint violations).

mod problem;
mod route;
mod shipment;
mod solution;
mod time_window;
mod vehicle;

pub use problem::{OptimizationProblem, MAX_DIMENSIONS, MAX_SHIPMENTS, MAX_STEP_SECONDS, MAX_VEHICLES};
pub use route::{RouteStep, SolvedRoute, StepKind};
pub use shipment::{Location, Shipment, ShipmentStep};
pub use solution::{Solution, Violation, ViolationType};
pub use time_window::{timestamp, TimeWindow};
pub use vehicle::Vehicle;
pub(crate) use problem::{check_counts, check_dimensions};
pub(crate) use time_window::{at_offset, seconds_between};
