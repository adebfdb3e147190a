//! Builds the caller-facing solution from the final assignment.

use tracing::warn;

use crate::evaluation::{RouteEvaluator, StopKind};
use crate::graph::NodeKind;
use crate::models::{at_offset, RouteStep, Solution, SolvedRoute, StepKind};
use crate::search::Assignment;

/// Converts `assignment` into a [`Solution`] with absolute timestamps.
///
/// Each non-empty route is re-walked to obtain its schedule. Idle vehicles
/// are omitted. A route that no longer passes evaluation is dropped with a
/// warning and its shipments are reported unassigned. Unassigned ids come
/// out ascending.
///
/// # Examples
///
/// ```
/// use u_dispatch::constraints::ConstraintSet;
/// use u_dispatch::distance::TransitMatrices;
/// use u_dispatch::evaluation::RouteEvaluator;
/// use u_dispatch::extraction::extract_solution;
/// use u_dispatch::graph::RoutingGraph;
/// use u_dispatch::models::{Location, OptimizationProblem, Shipment, ShipmentStep, StepKind, TimeWindow, Vehicle};
/// use u_dispatch::search::{Assignment, Insertion};
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
/// assignment.insert(&graph, 0, 0, &Insertion { pickup_pos: 0, delivery_pos: 0, delta: 0.0 });
/// let solution = extract_solution(&evaluator, &assignment);
/// let kinds: Vec<StepKind> = solution.routes()[0].steps().iter().map(|s| s.kind).collect();
/// assert_eq!(kinds, [StepKind::Start, StepKind::Pickup, StepKind::Delivery, StepKind::End]);
/// ```
pub fn extract_solution(evaluator: &RouteEvaluator<'_>, assignment: &Assignment) -> Solution {
    let graph = evaluator.graph();
    let origin = evaluator.constraints().origin();
    let mut solution = Solution::new();

    for (vehicle, nodes) in assignment.routes().iter().enumerate() {
        if nodes.is_empty() {
            continue;
        }
        let stops = match evaluator.schedule(vehicle, nodes) {
            Ok(stops) => stops,
            Err(violation) => {
                warn!(vehicle, ?violation, "route failed re-evaluation, dropping it");
                for &n in nodes {
                    if let NodeKind::Pickup(s) = graph.node(n) {
                        solution.add_unassigned(s);
                    }
                }
                continue;
            }
        };

        let mut route = SolvedRoute::new(vehicle);
        for stop in stops {
            let (kind, shipment) = match (stop.kind, graph.node(stop.node)) {
                (StopKind::Break, _) => (StepKind::Break, None),
                (StopKind::Visit, NodeKind::Start(_)) => (StepKind::Start, None),
                (StopKind::Visit, NodeKind::End(_)) => (StepKind::End, None),
                (StopKind::Visit, NodeKind::Pickup(s)) => (StepKind::Pickup, Some(s)),
                (StopKind::Visit, NodeKind::Delivery(s)) => (StepKind::Delivery, Some(s)),
            };
            route.push_step(RouteStep {
                kind,
                shipment,
                location: graph.location(stop.node),
                arrival_time: at_offset(origin, stop.arrival),
                finish_time: at_offset(origin, stop.finish),
            });
        }
        let (distance, duration) = evaluator.travel(vehicle, nodes);
        route.set_totals(distance, duration);
        solution.add_route(route);
    }

    for shipment in assignment.unassigned() {
        solution.add_unassigned(shipment);
    }
    solution.sort_unassigned();
    solution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintSet;
    use crate::distance::TransitMatrices;
    use crate::graph::RoutingGraph;
    use crate::models::{timestamp, Location, OptimizationProblem, Shipment, ShipmentStep, TimeWindow, Vehicle};
    use crate::search::Insertion;

    fn tw(start: &str, end: &str) -> TimeWindow {
        TimeWindow::parse(start, end).expect("valid")
    }

    fn here() -> Location {
        Location::new(127.0, 37.5).expect("valid")
    }

    fn at(pickup_pos: usize, delivery_pos: usize) -> Insertion {
        Insertion {
            pickup_pos,
            delivery_pos,
            delta: 0.0,
        }
    }

    fn problem(shipments: usize, vehicles: usize) -> OptimizationProblem {
        let step = ShipmentStep::new(here(), "Customer door", tw("2025-01-15 09:00", "2025-01-15 17:00"))
            .with_prework_time(60)
            .with_work_time(300);
        let day = tw("2025-01-15 08:00", "2025-01-15 18:00");
        OptimizationProblem::new(
            (0..shipments)
                .map(|_| Shipment::new(step.clone(), step.clone(), vec![1]))
                .collect(),
            (0..vehicles)
                .map(|_| Vehicle::new(here(), here(), vec![10], day))
                .collect(),
        )
    }

    #[test]
    fn test_timestamps() {
        let p = problem(1, 1);
        let g = RoutingGraph::build(&p).expect("valid");
        let c = ConstraintSet::build(&p, &g).expect("valid");
        let t = TransitMatrices::zeros(g.num_nodes());
        let e = RouteEvaluator::new(&g, &c, &t);
        let mut a = Assignment::empty(&g);
        a.insert(&g, 0, 0, &at(0, 0));

        let sol = extract_solution(&e, &a);
        assert_eq!(sol.num_routes(), 1);
        let steps = sol.routes()[0].steps();
        let ts = |s: &str| timestamp::parse(s).expect("valid");
        assert_eq!(steps[0].arrival_time, ts("2025-01-15 08:00"));
        // waits for the window, then works five minutes
        assert_eq!(steps[1].shipment, Some(0));
        assert_eq!(steps[1].arrival_time, ts("2025-01-15 08:00"));
        assert_eq!(steps[1].finish_time, ts("2025-01-15 09:05"));
        assert_eq!(steps[2].arrival_time, ts("2025-01-15 09:05"));
        assert_eq!(steps[2].finish_time, ts("2025-01-15 09:11"));
        assert_eq!(steps[3].kind, StepKind::End);
        assert_eq!(steps[3].arrival_time, ts("2025-01-15 09:11"));
    }

    #[test]
    fn test_totals_and_idle_vehicles() {
        let p = problem(1, 2);
        let g = RoutingGraph::build(&p).expect("valid");
        let c = ConstraintSet::build(&p, &g).expect("valid");
        let n = g.num_nodes();
        let distance = vec![vec![1000.0; n]; n];
        let duration = vec![vec![60.0; n]; n];
        let t = TransitMatrices::from_rows(distance, duration).expect("valid");
        let e = RouteEvaluator::new(&g, &c, &t);
        let mut a = Assignment::empty(&g);
        a.insert(&g, 1, 0, &at(0, 0));

        let sol = extract_solution(&e, &a);
        assert_eq!(sol.num_routes(), 1);
        assert_eq!(sol.routes()[0].vehicle_id(), 1);
        assert_eq!(sol.total_distance(), 3000.0);
        assert_eq!(sol.total_duration(), 180.0);
    }

    #[test]
    fn test_unassigned_sorted() {
        let p = problem(3, 1);
        let g = RoutingGraph::build(&p).expect("valid");
        let c = ConstraintSet::build(&p, &g).expect("valid");
        let t = TransitMatrices::zeros(g.num_nodes());
        let e = RouteEvaluator::new(&g, &c, &t);
        let mut a = Assignment::empty(&g);
        a.insert(&g, 0, 1, &at(0, 0));
        let sol = extract_solution(&e, &a);
        assert_eq!(sol.unassigned(), &[0, 2]);
        assert_eq!(sol.num_served(), 1);
    }

    #[test]
    fn test_inconsistent_route_dropped() {
        let p = problem(2, 1);
        let g = RoutingGraph::build(&p).expect("valid");
        let c = ConstraintSet::build(&p, &g).expect("valid");
        let t = TransitMatrices::zeros(g.num_nodes());
        let e = RouteEvaluator::new(&g, &c, &t);
        let mut a = Assignment::empty(&g);
        a.insert(&g, 0, 1, &at(0, 0));
        a.insert(&g, 0, 0, &at(2, 2));
        // delivery of s0 ahead of its pickup
        a.reorder(0, vec![2, 3, 1, 0]);
        let sol = extract_solution(&e, &a);
        assert_eq!(sol.num_routes(), 0);
        assert_eq!(sol.unassigned(), &[0, 1]);
    }

    #[test]
    fn test_break_step() {
        let day = tw("2025-01-15 08:00", "2025-01-15 18:00");
        let step = ShipmentStep::new(here(), "Customer door", day).with_work_time(600);
        let p = OptimizationProblem::new(
            vec![Shipment::new(step.clone(), step, vec![1])],
            vec![Vehicle::new(here(), here(), vec![10], day)
                .with_break(tw("2025-01-15 08:05", "2025-01-15 09:00"))
                .with_break_duration(1800)],
        );
        let g = RoutingGraph::build(&p).expect("valid");
        let c = ConstraintSet::build(&p, &g).expect("valid");
        let t = TransitMatrices::zeros(g.num_nodes());
        let e = RouteEvaluator::new(&g, &c, &t);
        let mut a = Assignment::empty(&g);
        a.insert(&g, 0, 0, &at(0, 0));

        let sol = extract_solution(&e, &a);
        let steps = sol.routes()[0].steps();
        let kinds: Vec<StepKind> = steps.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [StepKind::Start, StepKind::Pickup, StepKind::Break, StepKind::Delivery, StepKind::End]
        );
        let brk = &steps[2];
        assert_eq!(brk.shipment, None);
        assert_eq!(brk.arrival_time, timestamp::parse("2025-01-15 08:10").expect("valid"));
        assert_eq!(brk.finish_time, timestamp::parse("2025-01-15 08:40").expect("valid"));
    }
}
