//! Constraint model built from a problem and its routing graph.
//!
//! - [`capacity`] — cumulative load per capacity dimension
//! - [`time`] — service timing, vehicle shifts, and breaks
//! - [`eligibility`] — zone affinity and skill matching
//!
//! Pairing (pickup before delivery on the same vehicle) is implied by the
//! graph layout and enforced by the route walker in
//! [`evaluation`](crate::evaluation).

mod capacity;
mod eligibility;
mod time;

pub use capacity::Load;
pub use eligibility::is_eligible;
pub use time::{NodeTiming, Rest, Shift};
pub(crate) use time::TIME_EPS;

use chrono::NaiveDateTime;
use tracing::warn;

use crate::error::SolveError;
use crate::graph::{NodeKind, RoutingGraph};
use crate::models::{OptimizationProblem, ShipmentStep};

/// The rules every route must satisfy, in graph-node indexing.
///
/// # Examples
///
/// ```
/// use u_dispatch::constraints::ConstraintSet;
/// use u_dispatch::graph::RoutingGraph;
/// use u_dispatch::models::{Location, OptimizationProblem, Shipment, ShipmentStep, TimeWindow, Vehicle};
///
/// let here = Location::new(127.0, 37.5).unwrap();
/// let day = TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").unwrap();
/// let morning = TimeWindow::parse("2025-01-15 09:00", "2025-01-15 12:00").unwrap();
/// let step = ShipmentStep::new(here, "Loading bay", morning);
/// let problem = OptimizationProblem::new(
///     vec![Shipment::new(step.clone(), step, vec![1])],
///     vec![Vehicle::new(here, here, vec![10], day)],
/// );
/// let graph = RoutingGraph::build(&problem).unwrap();
/// let constraints = ConstraintSet::build(&problem, &graph).unwrap();
///
/// assert_eq!(constraints.timing(graph.pickup(0)).earliest, 3600.0);
/// assert_eq!(constraints.shift(0).end, 36000.0);
/// assert!(constraints.allows(0, 0));
/// ```
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    origin: NaiveDateTime,
    dimensions: usize,
    demands: Vec<Vec<i32>>,
    capacities: Vec<Vec<i32>>,
    timings: Vec<NodeTiming>,
    shifts: Vec<Shift>,
    allowed: Vec<Vec<usize>>,
}

impl ConstraintSet {
    /// Derives every dimension and filter from `problem`.
    ///
    /// Fails with [`SolveError::Infeasible`] if some shipment fits no vehicle
    /// at all, and with [`SolveError::InvalidProblem`] for a break that does
    /// not fit in its vehicle's shift. Shipments that fit some vehicle but are
    /// eligible for none are logged and later reported unassigned.
    pub fn build(problem: &OptimizationProblem, graph: &RoutingGraph) -> Result<Self, SolveError> {
        let shipments = problem.shipments();
        let vehicles = problem.vehicles();
        let dimensions = problem.dimensions();

        capacity::check_fleet_capacity(shipments, vehicles)?;

        let origin = earliest_start(problem);
        let step_timing = |step: &ShipmentStep| {
            let (earliest, latest) = step.time_window().offsets_from(origin);
            NodeTiming {
                earliest,
                latest,
                prework: f64::from(step.prework_time()),
                work: f64::from(step.work_time()),
            }
        };

        let mut shifts = Vec::with_capacity(vehicles.len());
        for (i, v) in vehicles.iter().enumerate() {
            let (start, end) = v.time_window().offsets_from(origin);
            let rest = match (v.break_window(), v.rest_seconds()) {
                (Some(window), Some(duration)) => {
                    if !v.time_window().encloses(window) || duration > window.duration_seconds() {
                        return Err(SolveError::invalid(format!(
                            "vehicle {i} break does not fit in its operating window"
                        )));
                    }
                    let (earliest, close) = window.offsets_from(origin);
                    let duration = duration as f64;
                    Some(Rest {
                        earliest,
                        latest: close - duration,
                        duration,
                    })
                }
                _ => None,
            };
            shifts.push(Shift { start, end, rest });
        }

        let timings = (0..graph.num_nodes())
            .map(|node| match graph.node(node) {
                NodeKind::Pickup(s) => step_timing(shipments[s].pickup()),
                NodeKind::Delivery(s) => step_timing(shipments[s].delivery()),
                NodeKind::Start(v) => NodeTiming::window(shifts[v].start, shifts[v].start),
                NodeKind::End(v) => shifts[v].end_timing(),
            })
            .collect();

        let allowed = eligibility::allowed_vehicles(shipments, vehicles);
        for (s, list) in allowed.iter().enumerate() {
            if list.is_empty() {
                warn!(shipment = s, "no vehicle matches the shipment's groups and skills");
            }
        }

        Ok(Self {
            origin,
            dimensions,
            demands: capacity::node_demands(graph, shipments, dimensions),
            capacities: vehicles.iter().map(|v| v.capacity().to_vec()).collect(),
            timings,
            shifts,
            allowed,
        })
    }

    /// Instant that all offsets are measured from.
    pub fn origin(&self) -> NaiveDateTime {
        self.origin
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Signed load change at `node`.
    pub fn demand(&self, node: usize) -> &[i32] {
        &self.demands[node]
    }

    pub fn capacity(&self, vehicle: usize) -> &[i32] {
        &self.capacities[vehicle]
    }

    pub fn timing(&self, node: usize) -> &NodeTiming {
        &self.timings[node]
    }

    pub fn shift(&self, vehicle: usize) -> &Shift {
        &self.shifts[vehicle]
    }

    /// Vehicles eligible for `shipment`, ascending.
    pub fn allowed_vehicles(&self, shipment: usize) -> &[usize] {
        &self.allowed[shipment]
    }

    pub fn allows(&self, shipment: usize, vehicle: usize) -> bool {
        self.allowed[shipment].binary_search(&vehicle).is_ok()
    }

    /// Shipments no vehicle is eligible for.
    pub fn unservable(&self) -> Vec<usize> {
        self.allowed
            .iter()
            .enumerate()
            .filter(|(_, list)| list.is_empty())
            .map(|(s, _)| s)
            .collect()
    }
}

/// Earliest window start anywhere in the problem.
fn earliest_start(problem: &OptimizationProblem) -> NaiveDateTime {
    let vehicle_starts = problem.vehicles().iter().map(|v| v.time_window().start());
    let step_starts = problem.shipments().iter().flat_map(|s| {
        [
            s.pickup().time_window().start(),
            s.delivery().time_window().start(),
        ]
    });
    vehicle_starts
        .chain(step_starts)
        .min()
        .unwrap_or(NaiveDateTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, Shipment, TimeWindow, Vehicle};

    fn tw(start: &str, end: &str) -> TimeWindow {
        TimeWindow::parse(start, end).expect("valid")
    }

    fn here() -> Location {
        Location::new(127.0, 37.5).expect("valid")
    }

    fn shipment(window: TimeWindow, amount: Vec<i32>) -> Shipment {
        let step = ShipmentStep::new(here(), "Loading bay", window)
            .with_prework_time(60)
            .with_work_time(300);
        Shipment::new(step.clone(), step, amount)
    }

    fn build(problem: &OptimizationProblem) -> Result<(RoutingGraph, ConstraintSet), SolveError> {
        let graph = RoutingGraph::build(problem)?;
        let constraints = ConstraintSet::build(problem, &graph)?;
        Ok((graph, constraints))
    }

    #[test]
    fn test_origin_is_earliest_window() {
        let early = tw("2025-01-15 06:30", "2025-01-15 09:00");
        let p = OptimizationProblem::new(
            vec![shipment(early, vec![1])],
            vec![Vehicle::new(here(), here(), vec![5], tw("2025-01-15 08:00", "2025-01-15 18:00"))],
        );
        let (g, c) = build(&p).expect("valid");
        assert_eq!(c.origin(), early.start());
        assert_eq!(c.shift(0).start, 5400.0);
        let t = c.timing(g.pickup(0));
        assert_eq!((t.earliest, t.latest, t.prework, t.work), (0.0, 9000.0, 60.0, 300.0));
        assert_eq!(c.timing(g.start(0)).latest, 5400.0);
    }

    #[test]
    fn test_break_rest_window() {
        let day = tw("2025-01-15 08:00", "2025-01-15 18:00");
        let v = Vehicle::new(here(), here(), vec![5], day)
            .with_break(tw("2025-01-15 12:00", "2025-01-15 13:00"))
            .with_break_duration(1800);
        let p = OptimizationProblem::new(vec![shipment(day, vec![1])], vec![v]);
        let (_, c) = build(&p).expect("valid");
        let rest = c.shift(0).rest.expect("break");
        assert_eq!(rest.earliest, 4.0 * 3600.0);
        assert_eq!(rest.latest, 4.5 * 3600.0);
        assert_eq!(rest.duration, 1800.0);
    }

    #[test]
    fn test_break_outside_shift_is_invalid() {
        let v = Vehicle::new(here(), here(), vec![5], tw("2025-01-15 08:00", "2025-01-15 12:00"))
            .with_break(tw("2025-01-15 11:30", "2025-01-15 12:30"));
        let p = OptimizationProblem::new(
            vec![shipment(tw("2025-01-15 08:00", "2025-01-15 12:00"), vec![1])],
            vec![v],
        );
        assert!(matches!(build(&p), Err(SolveError::InvalidProblem { .. })));
    }

    #[test]
    fn test_oversized_shipment_is_infeasible() {
        let day = tw("2025-01-15 08:00", "2025-01-15 18:00");
        let p = OptimizationProblem::new(
            vec![shipment(day, vec![1]), shipment(day, vec![10])],
            vec![Vehicle::new(here(), here(), vec![5], day)],
        );
        assert!(matches!(
            build(&p),
            Err(SolveError::Infeasible { shipment: 1, .. })
        ));
    }

    #[test]
    fn test_unservable_shipments() {
        let day = tw("2025-01-15 08:00", "2025-01-15 18:00");
        let p = OptimizationProblem::new(
            vec![
                shipment(day, vec![1]).with_groups(vec!["south".into()]),
                shipment(day, vec![1]),
            ],
            vec![Vehicle::new(here(), here(), vec![5], day).with_groups(vec!["north".into()])],
        );
        let (_, c) = build(&p).expect("valid");
        assert_eq!(c.unservable(), vec![0]);
        assert!(!c.allows(0, 0));
        assert!(c.allows(1, 0));
    }

    #[test]
    fn test_demands_and_capacities() {
        let day = tw("2025-01-15 08:00", "2025-01-15 18:00");
        let p = OptimizationProblem::new(
            vec![shipment(day, vec![2, 1])],
            vec![Vehicle::new(here(), here(), vec![5, 3], day)],
        );
        let (g, c) = build(&p).expect("valid");
        assert_eq!(c.dimensions(), 2);
        assert_eq!(c.demand(g.delivery(0)), &[-2, -1]);
        assert_eq!(c.capacity(0), &[5, 3]);
    }
}
