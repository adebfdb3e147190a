//! Routing graph built fresh for each solve.

mod routing_graph;

pub use routing_graph::{NodeKind, RoutingGraph};
