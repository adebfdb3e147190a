//! Independent verification of a finished solution.
//!
//! Works from the problem data and the reported timestamps only, without the
//! routing graph or constraint model the solver used.

use chrono::NaiveDateTime;

use crate::constraints::is_eligible;
use crate::models::{
    seconds_between, OptimizationProblem, RouteStep, ShipmentStep, Solution, SolvedRoute, StepKind,
    Vehicle, Violation, ViolationType,
};

/// Timestamp slack, in seconds.
const TOLERANCE: f64 = 1.0;

/// Lists every constraint `solution` breaks for `problem`.
///
/// An empty result means the solution is valid: every shipment is served
/// exactly once or listed as unassigned, pickups precede their deliveries on
/// the same route, loads stay within capacity, vehicles are eligible, every
/// service starts inside its window, and routes stay inside their vehicle's
/// operating window with the break in place.
///
/// # Examples
///
/// ```
/// use u_dispatch::evaluation::check_solution;
/// use u_dispatch::models::{Location, OptimizationProblem, Shipment, ShipmentStep, Solution, TimeWindow, Vehicle};
///
/// let here = Location::new(127.0, 37.5).unwrap();
/// let day = TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").unwrap();
/// let step = ShipmentStep::new(here, "Loading bay", day);
/// let problem = OptimizationProblem::new(
///     vec![Shipment::new(step.clone(), step, vec![1])],
///     vec![Vehicle::new(here, here, vec![10], day)],
/// );
///
/// let mut solution = Solution::new();
/// assert_eq!(check_solution(&problem, &solution).len(), 1); // missing shipment
/// solution.add_unassigned(0);
/// assert!(check_solution(&problem, &solution).is_empty());
/// ```
pub fn check_solution(problem: &OptimizationProblem, solution: &Solution) -> Vec<Violation> {
    let n = problem.shipments().len();
    let mut violations = Vec::new();
    let mut seen = vec![0usize; n];

    for &s in solution.unassigned() {
        if s < n {
            seen[s] += 1;
        }
    }
    for route in solution.routes() {
        for s in route.shipment_ids() {
            if s < n {
                seen[s] += 1;
            }
        }
        if let Some(vehicle) = problem.vehicles().get(route.vehicle_id()) {
            check_route(problem, vehicle, route, &mut violations);
        }
    }

    for (shipment, &count) in seen.iter().enumerate() {
        match count {
            0 => violations.push(ViolationType::MissingShipment { shipment }.into()),
            1 => {}
            _ => violations.push(ViolationType::DuplicateShipment { shipment }.into()),
        }
    }
    violations
}

fn check_route(
    problem: &OptimizationProblem,
    vehicle: &Vehicle,
    route: &SolvedRoute,
    violations: &mut Vec<Violation>,
) {
    let v = route.vehicle_id();
    let capacity = vehicle.capacity();
    let mut load = vec![0i64; capacity.len()];
    let mut on_board: Vec<usize> = Vec::new();
    let mut rested = false;

    for step in route.steps() {
        match (step.kind, step.shipment) {
            (StepKind::Pickup, Some(s)) => {
                let Some(shipment) = problem.shipments().get(s) else {
                    continue;
                };
                if !is_eligible(shipment, vehicle) {
                    violations.push(ViolationType::Ineligible { vehicle: v, shipment: s }.into());
                }
                on_board.push(s);
                adjust_load(&mut load, shipment.amount(), 1, capacity, v, violations);
                check_service(step, shipment.pickup(), v, s, violations);
            }
            (StepKind::Delivery, Some(s)) => {
                let Some(shipment) = problem.shipments().get(s) else {
                    continue;
                };
                match on_board.iter().position(|&b| b == s) {
                    Some(i) => {
                        on_board.swap_remove(i);
                    }
                    None => {
                        violations.push(ViolationType::PrecedenceViolated { vehicle: v, shipment: s }.into());
                    }
                }
                adjust_load(&mut load, shipment.amount(), -1, capacity, v, violations);
                check_service(step, shipment.delivery(), v, s, violations);
            }
            (StepKind::Break, _) => rested |= break_in_place(vehicle, step),
            _ => {}
        }
    }

    for &shipment in &on_board {
        violations.push(ViolationType::PairSplit { vehicle: v, shipment }.into());
    }

    let shift = vehicle.time_window();
    let first = route.steps().first().map(|s| s.arrival_time);
    let last = route.steps().last().map(|s| s.finish_time);
    if let (Some(first), Some(last)) = (first, last) {
        if before(first, shift.start()) || after(last, shift.end()) {
            violations.push(ViolationType::ShiftExceeded { vehicle: v }.into());
        }
    }
    if vehicle.break_window().is_some() && !route.is_empty() && !rested {
        violations.push(ViolationType::BreakMissed { vehicle: v }.into());
    }
}

fn adjust_load(
    load: &mut [i64],
    amount: &[i32],
    sign: i64,
    capacity: &[i32],
    vehicle: usize,
    violations: &mut Vec<Violation>,
) {
    for (d, (l, a)) in load.iter_mut().zip(amount).enumerate() {
        *l += sign * i64::from(*a);
        if *l < 0 || *l > i64::from(capacity[d]) {
            violations.push(
                ViolationType::LoadOutOfBounds {
                    vehicle,
                    dimension: d,
                    load: *l,
                    capacity: capacity[d],
                }
                .into(),
            );
        }
    }
}

/// Setup must complete by the window end.
fn check_service(
    step: &RouteStep,
    planned: &ShipmentStep,
    vehicle: usize,
    shipment: usize,
    violations: &mut Vec<Violation>,
) {
    let window = planned.time_window();
    let ready = seconds_between(window.end(), step.arrival_time) + f64::from(planned.prework_time());
    let started = seconds_between(window.start(), step.finish_time) - f64::from(planned.work_time());
    if ready > TOLERANCE || started < -TOLERANCE {
        violations.push(
            ViolationType::TimeWindowViolated {
                vehicle,
                shipment,
                step: step.kind,
            }
            .into(),
        );
    }
}

/// The break starts inside its window and ends by the window close.
fn break_in_place(vehicle: &Vehicle, step: &RouteStep) -> bool {
    let (Some(window), Some(duration)) = (vehicle.break_window(), vehicle.rest_seconds()) else {
        return false;
    };
    let start = seconds_between(window.start(), step.finish_time) - duration as f64;
    let overrun = seconds_between(window.end(), step.finish_time);
    start >= -TOLERANCE && overrun <= TOLERANCE
}

fn before(t: NaiveDateTime, limit: NaiveDateTime) -> bool {
    seconds_between(limit, t) < -TOLERANCE
}

fn after(t: NaiveDateTime, limit: NaiveDateTime) -> bool {
    seconds_between(limit, t) > TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{timestamp, Location, Shipment, TimeWindow};

    fn at(s: &str) -> NaiveDateTime {
        timestamp::parse(s).expect("valid")
    }

    fn here() -> Location {
        Location::new(127.0, 37.5).expect("valid")
    }

    fn day() -> TimeWindow {
        TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").expect("valid")
    }

    fn problem(window: TimeWindow) -> OptimizationProblem {
        let step = ShipmentStep::new(here(), "Loading bay", window).with_work_time(600);
        OptimizationProblem::new(
            vec![Shipment::new(step.clone(), step, vec![3])],
            vec![Vehicle::new(here(), here(), vec![5], day())],
        )
    }

    fn step(kind: StepKind, shipment: Option<usize>, arrival: &str, finish: &str) -> RouteStep {
        RouteStep {
            kind,
            shipment,
            location: here(),
            arrival_time: at(arrival),
            finish_time: at(finish),
        }
    }

    fn route(steps: Vec<RouteStep>) -> Solution {
        let mut r = SolvedRoute::new(0);
        for s in steps {
            r.push_step(s);
        }
        let mut sol = Solution::new();
        sol.add_route(r);
        sol
    }

    fn kinds(v: &[Violation]) -> Vec<&ViolationType> {
        v.iter().map(|v| &v.kind).collect()
    }

    #[test]
    fn test_valid_route() {
        let sol = route(vec![
            step(StepKind::Start, None, "2025-01-15 08:00", "2025-01-15 08:00"),
            step(StepKind::Pickup, Some(0), "2025-01-15 09:00", "2025-01-15 09:10"),
            step(StepKind::Delivery, Some(0), "2025-01-15 09:30", "2025-01-15 09:40"),
            step(StepKind::End, None, "2025-01-15 10:00", "2025-01-15 10:00"),
        ]);
        assert!(check_solution(&problem(day()), &sol).is_empty());
    }

    #[test]
    fn test_delivery_before_pickup() {
        let sol = route(vec![
            step(StepKind::Start, None, "2025-01-15 08:00", "2025-01-15 08:00"),
            step(StepKind::Delivery, Some(0), "2025-01-15 09:00", "2025-01-15 09:10"),
            step(StepKind::Pickup, Some(0), "2025-01-15 09:30", "2025-01-15 09:40"),
            step(StepKind::End, None, "2025-01-15 10:00", "2025-01-15 10:00"),
        ]);
        let v = check_solution(&problem(day()), &sol);
        assert!(kinds(&v).contains(&&ViolationType::PrecedenceViolated { vehicle: 0, shipment: 0 }));
        assert!(kinds(&v).contains(&&ViolationType::PairSplit { vehicle: 0, shipment: 0 }));
    }

    #[test]
    fn test_late_service() {
        let window = TimeWindow::parse("2025-01-15 08:00", "2025-01-15 09:00").expect("valid");
        let sol = route(vec![
            step(StepKind::Start, None, "2025-01-15 08:00", "2025-01-15 08:00"),
            step(StepKind::Pickup, Some(0), "2025-01-15 08:30", "2025-01-15 08:40"),
            step(StepKind::Delivery, Some(0), "2025-01-15 09:30", "2025-01-15 09:40"),
            step(StepKind::End, None, "2025-01-15 10:00", "2025-01-15 10:00"),
        ]);
        let v = check_solution(&problem(window), &sol);
        assert_eq!(
            kinds(&v),
            vec![&ViolationType::TimeWindowViolated {
                vehicle: 0,
                shipment: 0,
                step: StepKind::Delivery
            }]
        );
    }

    #[test]
    fn test_early_service() {
        let window = TimeWindow::parse("2025-01-15 09:00", "2025-01-15 12:00").expect("valid");
        let sol = route(vec![
            step(StepKind::Start, None, "2025-01-15 08:00", "2025-01-15 08:00"),
            step(StepKind::Pickup, Some(0), "2025-01-15 08:30", "2025-01-15 08:40"),
            step(StepKind::Delivery, Some(0), "2025-01-15 09:30", "2025-01-15 09:40"),
            step(StepKind::End, None, "2025-01-15 10:00", "2025-01-15 10:00"),
        ]);
        let v = check_solution(&problem(window), &sol);
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn test_duplicate_and_missing() {
        let p = problem(day());
        let mut sol = Solution::new();
        assert_eq!(
            kinds(&check_solution(&p, &sol)),
            vec![&ViolationType::MissingShipment { shipment: 0 }]
        );
        sol.add_unassigned(0);
        sol.add_unassigned(0);
        assert_eq!(
            kinds(&check_solution(&p, &sol)),
            vec![&ViolationType::DuplicateShipment { shipment: 0 }]
        );
    }

    #[test]
    fn test_overload() {
        let dock = ShipmentStep::new(here(), "Loading bay", day());
        let p = OptimizationProblem::new(
            vec![
                Shipment::new(dock.clone(), dock.clone(), vec![3]),
                Shipment::new(dock.clone(), dock, vec![3]),
            ],
            vec![Vehicle::new(here(), here(), vec![5], day())],
        );
        let sol = route(vec![
            step(StepKind::Start, None, "2025-01-15 08:00", "2025-01-15 08:00"),
            step(StepKind::Pickup, Some(0), "2025-01-15 09:00", "2025-01-15 09:00"),
            step(StepKind::Pickup, Some(1), "2025-01-15 09:10", "2025-01-15 09:10"),
            step(StepKind::Delivery, Some(0), "2025-01-15 09:20", "2025-01-15 09:20"),
            step(StepKind::Delivery, Some(1), "2025-01-15 09:30", "2025-01-15 09:30"),
            step(StepKind::End, None, "2025-01-15 10:00", "2025-01-15 10:00"),
        ]);
        assert!(matches!(
            kinds(&check_solution(&p, &sol)).as_slice(),
            [ViolationType::LoadOutOfBounds { load: 6, capacity: 5, .. }]
        ));
    }

    #[test]
    fn test_missing_break() {
        let lunch = TimeWindow::parse("2025-01-15 12:00", "2025-01-15 13:00").expect("valid");
        let base = problem(day());
        let p = OptimizationProblem::new(
            base.shipments().to_vec(),
            vec![base.vehicles()[0].clone().with_break(lunch)],
        );
        let served = vec![
            step(StepKind::Start, None, "2025-01-15 08:00", "2025-01-15 08:00"),
            step(StepKind::Pickup, Some(0), "2025-01-15 09:00", "2025-01-15 09:10"),
            step(StepKind::Delivery, Some(0), "2025-01-15 09:30", "2025-01-15 09:40"),
        ];
        let mut without = served.clone();
        without.push(step(StepKind::End, None, "2025-01-15 10:00", "2025-01-15 10:00"));
        assert_eq!(
            kinds(&check_solution(&p, &route(without))),
            vec![&ViolationType::BreakMissed { vehicle: 0 }]
        );

        let mut with = served;
        with.push(step(StepKind::Break, None, "2025-01-15 10:00", "2025-01-15 13:00"));
        with.push(step(StepKind::End, None, "2025-01-15 13:00", "2025-01-15 13:00"));
        assert!(check_solution(&p, &route(with)).is_empty());
    }

    #[test]
    fn test_shift_exceeded() {
        let sol = route(vec![
            step(StepKind::Start, None, "2025-01-15 08:00", "2025-01-15 08:00"),
            step(StepKind::Pickup, Some(0), "2025-01-15 09:00", "2025-01-15 09:10"),
            step(StepKind::Delivery, Some(0), "2025-01-15 09:30", "2025-01-15 09:40"),
            step(StepKind::End, None, "2025-01-15 18:30", "2025-01-15 18:30"),
        ]);
        assert_eq!(
            kinds(&check_solution(&problem(day()), &sol)),
            vec![&ViolationType::ShiftExceeded { vehicle: 0 }]
        );
    }
}
