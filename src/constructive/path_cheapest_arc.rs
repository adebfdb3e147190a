//! Path-cheapest-arc constructive heuristic for pickup and delivery.
//!
//! Builds routes vehicle by vehicle: from the end of the current path, take
//! the cheapest arc to a node that may come next (the pickup of an unrouted
//! eligible shipment, or the delivery of a shipment on board) such that the
//! path can still be completed by delivering everything on board. Leftover
//! shipments are then placed by cheapest insertion. Once the time budget is
//! spent, open paths are closed off and the rest stays unassigned.
//!
//! # Complexity
//!
//! O(n² × L) per vehicle where n = candidate nodes and L = route length.

use std::iter;

use super::cheapest_insertion;
use crate::evaluation::RouteEvaluator;
use crate::graph::NodeKind;
use crate::search::{Assignment, Termination};

/// Constructs a first assignment with the path-cheapest-arc strategy.
///
/// # Examples
///
/// ```
/// use u_dispatch::constraints::ConstraintSet;
/// use u_dispatch::constructive::path_cheapest_arc;
/// use u_dispatch::distance::TransitMatrices;
/// use u_dispatch::evaluation::RouteEvaluator;
/// use u_dispatch::graph::RoutingGraph;
/// use u_dispatch::models::{Location, OptimizationProblem, Shipment, ShipmentStep, TimeWindow, Vehicle};
/// use u_dispatch::search::Termination;
/// use std::time::Duration;
///
/// let here = Location::new(127.0, 37.5).unwrap();
/// let day = TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").unwrap();
/// let step = ShipmentStep::new(here, "Loading bay", day);
/// let problem = OptimizationProblem::new(
///     vec![Shipment::new(step.clone(), step.clone(), vec![1]), Shipment::new(step.clone(), step, vec![1])],
///     vec![Vehicle::new(here, here, vec![10], day)],
/// );
/// let graph = RoutingGraph::build(&problem).unwrap();
/// let constraints = ConstraintSet::build(&problem, &graph).unwrap();
/// let transit = TransitMatrices::zeros(graph.num_nodes());
/// let evaluator = RouteEvaluator::new(&graph, &constraints, &transit);
///
/// let budget = Termination::new(Duration::from_secs(5), usize::MAX);
/// let assignment = path_cheapest_arc(&evaluator, &budget, false);
/// assert_eq!(assignment.num_unassigned(), 0);
/// assert_eq!(assignment.route(0).len(), 4);
/// ```
pub fn path_cheapest_arc(
    evaluator: &RouteEvaluator<'_>,
    termination: &Termination<'_>,
    parallel: bool,
) -> Assignment {
    let graph = evaluator.graph();
    let constraints = evaluator.constraints();
    let transit = evaluator.transit();
    let mut assignment = Assignment::empty(graph);
    let mut routed = vec![false; graph.num_shipments()];

    for vehicle in 0..graph.num_vehicles() {
        if termination.is_expired() {
            break;
        }
        let mut path: Vec<usize> = Vec::new();
        // shipments on board, in pickup order
        let mut on_board: Vec<usize> = Vec::new();

        while !termination.is_expired() {
            let last = path.last().copied().unwrap_or_else(|| graph.start(vehicle));
            let mut candidates: Vec<usize> = (0..graph.num_shipments())
                .filter(|&s| !routed[s] && constraints.allows(s, vehicle))
                .map(|s| graph.pickup(s))
                .chain(on_board.iter().map(|&s| graph.delivery(s)))
                .collect();
            candidates.sort_by(|&a, &b| {
                transit
                    .duration(last, a)
                    .total_cmp(&transit.duration(last, b))
                    .then(a.cmp(&b))
            });

            let next = candidates.into_iter().find(|&node| {
                let completion = completion_after(graph.node(node), &on_board);
                let trial = path
                    .iter()
                    .copied()
                    .chain(iter::once(node))
                    .chain(completion.map(|s| graph.delivery(s)));
                evaluator.is_feasible_iter(vehicle, trial)
            });

            match next {
                Some(node) => {
                    match graph.node(node) {
                        NodeKind::Pickup(s) => {
                            routed[s] = true;
                            on_board.push(s);
                        }
                        NodeKind::Delivery(s) => on_board.retain(|&b| b != s),
                        NodeKind::Start(_) | NodeKind::End(_) => {}
                    }
                    path.push(node);
                }
                None => break,
            }
        }

        // Every accepted step kept this completion feasible.
        path.extend(on_board.iter().map(|&s| graph.delivery(s)));
        if !path.is_empty() {
            assignment.assign_route(graph, vehicle, path);
        }
    }

    cheapest_insertion(evaluator, &mut assignment, termination, parallel);
    assignment
}

/// Shipments still to deliver after visiting `next`, in pickup order.
fn completion_after(next: NodeKind, on_board: &[usize]) -> impl Iterator<Item = usize> + '_ {
    let (dropped, added) = match next {
        NodeKind::Pickup(s) => (None, Some(s)),
        NodeKind::Delivery(s) => (Some(s), None),
        NodeKind::Start(_) | NodeKind::End(_) => (None, None),
    };
    on_board
        .iter()
        .copied()
        .filter(move |&s| Some(s) != dropped)
        .chain(added)
}
