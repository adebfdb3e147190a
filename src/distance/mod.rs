//! Distance and travel time providers.
//!
//! Matrices are supplied by an external routing service, indexed by
//! routing-graph node (see [`RoutingGraph`](crate::graph::RoutingGraph)).

mod matrix;
mod transit;

pub use matrix::SquareMatrix;
pub use transit::{Transit, TransitMatrices};
