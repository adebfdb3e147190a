//! Global cheapest insertion of unassigned shipments.
//!
//! Repeatedly inserts the shipment whose cheapest feasible placement over
//! all vehicles costs least, until no unassigned shipment can be placed.
//!
//! The best placement of every pending shipment is cached. After an
//! insertion into vehicle `v`, only route `v` changed, so a cached entry
//! pointing at `v` is recomputed over all vehicles and every other entry is
//! compared against route `v` alone.
//!
//! Construction stops once the solve's time budget is spent, leaving the
//! remaining shipments unassigned.
//!
//! # Complexity
//!
//! O(S² × L²) for S shipments and route length L, with the refresh after
//! each insertion touching one route per shipment in the common case.

use tracing::{debug, warn};

use crate::evaluation::RouteEvaluator;
use crate::search::parallel::parallel_collect;
use crate::search::{best_insertion, Assignment, Insertion, Termination, TravelTime};

/// Cheapest placement of one shipment: vehicle and insertion.
type Placement = Option<(usize, Insertion)>;

/// Inserts unassigned shipments into `assignment` by global cheapest
/// insertion under travel duration.
///
/// Ties are broken by shipment index, and within a shipment by vehicle
/// index, so the result does not depend on `parallel`.
///
/// # Examples
///
/// ```
/// use u_dispatch::constraints::ConstraintSet;
/// use u_dispatch::constructive::cheapest_insertion;
/// use u_dispatch::distance::TransitMatrices;
/// use u_dispatch::evaluation::RouteEvaluator;
/// use u_dispatch::graph::RoutingGraph;
/// use u_dispatch::models::{Location, OptimizationProblem, Shipment, ShipmentStep, TimeWindow, Vehicle};
/// use u_dispatch::search::{Assignment, Termination};
/// use std::time::Duration;
///
/// let here = Location::new(127.0, 37.5).unwrap();
/// let day = TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").unwrap();
/// let step = ShipmentStep::new(here, "Loading bay", day);
/// let problem = OptimizationProblem::new(
///     vec![Shipment::new(step.clone(), step, vec![1])],
///     vec![Vehicle::new(here, here, vec![10], day)],
/// );
/// let graph = RoutingGraph::build(&problem).unwrap();
/// let constraints = ConstraintSet::build(&problem, &graph).unwrap();
/// let transit = TransitMatrices::zeros(graph.num_nodes());
/// let evaluator = RouteEvaluator::new(&graph, &constraints, &transit);
///
/// let mut assignment = Assignment::empty(&graph);
/// let budget = Termination::new(Duration::from_secs(5), usize::MAX);
/// cheapest_insertion(&evaluator, &mut assignment, &budget, false);
/// assert_eq!(assignment.route(0), &[0, 1]);
/// ```
pub fn cheapest_insertion(
    evaluator: &RouteEvaluator<'_>,
    assignment: &mut Assignment,
    termination: &Termination<'_>,
    parallel: bool,
) {
    let graph = evaluator.graph();
    let travel = TravelTime(evaluator.transit());

    let mut pending: Vec<(usize, Placement)> = {
        let unassigned = assignment.unassigned();
        let current = &*assignment;
        parallel_collect(&unassigned, parallel, |&s| {
            if termination.is_expired() {
                return (s, None);
            }
            (s, best_placement(evaluator, &travel, current, s))
        })
    };
    let mut inserted = 0usize;

    while !termination.is_expired() {
        let pick = pending
            .iter()
            .enumerate()
            .filter_map(|(i, &(s, placement))| placement.map(|(v, at)| (i, s, v, at)))
            .min_by(|a, b| a.3.delta.total_cmp(&b.3.delta).then(a.1.cmp(&b.1)));
        let Some((index, shipment, vehicle, at)) = pick else {
            break;
        };
        assignment.insert(graph, vehicle, shipment, &at);
        pending.remove(index);
        inserted += 1;

        let current = &*assignment;
        pending = parallel_collect(&pending, parallel, |&(s, cached)| {
            if termination.is_expired() {
                return (s, cached);
            }
            let refreshed = match cached {
                Some((v, _)) if v == vehicle => best_placement(evaluator, &travel, current, s),
                _ => {
                    let on_changed = best_insertion(
                        evaluator,
                        &travel,
                        vehicle,
                        current.route(vehicle),
                        s,
                        f64::INFINITY,
                    )
                    .map(|at| (vehicle, at));
                    cheaper(cached, on_changed)
                }
            };
            (s, refreshed)
        });
    }

    if termination.is_expired() {
        warn!(inserted, left = pending.len(), "time budget spent during construction");
    } else {
        debug!(inserted, left = pending.len(), "cheapest insertion done");
    }
}

/// Cheapest placement of `shipment` over every eligible vehicle.
fn best_placement(
    evaluator: &RouteEvaluator<'_>,
    travel: &TravelTime<'_>,
    assignment: &Assignment,
    shipment: usize,
) -> Placement {
    evaluator
        .constraints()
        .allowed_vehicles(shipment)
        .iter()
        .fold(None, |best, &v| {
            let here = best_insertion(evaluator, travel, v, assignment.route(v), shipment, f64::INFINITY)
                .map(|at| (v, at));
            cheaper(best, here)
        })
}

/// The lower of two placements by delta, then vehicle index.
fn cheaper(a: Placement, b: Placement) -> Placement {
    match (a, b) {
        (Some(x), Some(y)) => {
            let y_wins = y.1.delta.total_cmp(&x.1.delta).then(y.0.cmp(&x.0)).is_lt();
            Some(if y_wins { y } else { x })
        }
        (a, b) => a.or(b),
    }
}
