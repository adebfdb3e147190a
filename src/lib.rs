//! # u-dispatch
//!
//! Pickup-and-delivery dispatch engine (PDPTW): assigns paired pickup and
//! delivery jobs to a fleet under capacity, time-window, break, skill, and
//! zone constraints, minimizing total travel duration.
//!
//! ## Modules
//!
//! - [`models`] — Domain model types (Shipment, Vehicle, TimeWindow, Solution)
//! - [`graph`] — Indexed routing graph of pickup, delivery, and depot nodes
//! - [`distance`] — Distance and travel time providers
//! - [`constraints`] — Capacity, time, break, and eligibility rules
//! - [`evaluation`] — Route walking and independent solution checking
//! - [`constructive`] — First-solution strategies (path cheapest arc, cheapest insertion)
//! - [`local_search`] — Pair-aware moves (insert, relocate, exchange, 2-opt)
//! - [`search`] — Guided local search driver
//! - [`extraction`] — Timed solution output
//! - [`solver`] — One-call facade
//!
//! ## Quick start
//!
//! ```
//! use u_dispatch::{OptimizationProblem, Solver, SolverConfig};
//! use u_dispatch::distance::TransitMatrices;
//! use u_dispatch::graph::RoutingGraph;
//! use u_dispatch::models::{Location, Shipment, ShipmentStep, TimeWindow, Vehicle};
//!
//! let depot = Location::new(127.0, 37.5).unwrap();
//! let day = TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").unwrap();
//! let pickup = ShipmentStep::new(depot, "Warehouse dock 3", day).with_work_time(300);
//! let delivery = ShipmentStep::new(depot, "Customer front desk", day).with_work_time(120);
//! let problem = OptimizationProblem::new(
//!     vec![Shipment::new(pickup, delivery, vec![2])],
//!     vec![Vehicle::new(depot, depot, vec![10], day)],
//! );
//!
//! // Matrices come from a routing service, indexed by graph node.
//! let nodes = RoutingGraph::build(&problem).unwrap().num_nodes();
//! let transit = TransitMatrices::zeros(nodes);
//!
//! let solution = Solver::new(SolverConfig::instant()).solve(&problem, &transit).unwrap();
//! assert_eq!(solution.routes()[0].shipment_ids(), vec![0]);
//! ```

pub mod config;
pub mod constraints;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod extraction;
pub mod graph;
pub mod local_search;
pub mod models;
pub mod search;
pub mod solver;

pub use config::SolverConfig;
pub use error::SolveError;
pub use evaluation::check_solution;
pub use models::{OptimizationProblem, Solution};
pub use solver::Solver;
