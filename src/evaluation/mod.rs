//! Route feasibility walking and solution verification.
//!
//! - [`RouteEvaluator`] — times a vehicle route through every constraint
//!   dimension; used by search and extraction
//! - [`check_solution`] — re-checks a finished [`Solution`](crate::models::Solution)
//!   from problem data and timestamps alone

mod checker;
mod evaluator;

pub use checker::check_solution;
pub use evaluator::{RouteEvaluator, Stop, StopKind};
