//! Randomized end-to-end checks: every solution the solver returns must pass
//! the independent checker, and solving twice must agree.

use proptest::prelude::*;
use u_dispatch::distance::TransitMatrices;
use u_dispatch::graph::RoutingGraph;
use u_dispatch::models::{Location, Shipment, ShipmentStep, TimeWindow, Vehicle};
use u_dispatch::{check_solution, OptimizationProblem, Solver, SolverConfig};

const ZONES: [&str; 2] = ["north", "south"];

fn window(start_minute: u32, length_minutes: u32) -> TimeWindow {
    let end_minute = (start_minute + length_minutes).min(23 * 60 + 59);
    let at = |m: u32| format!("2025-01-15 {:02}:{:02}", m / 60, m % 60);
    TimeWindow::parse(&at(start_minute), &at(end_minute)).expect("valid window")
}

fn location(x: u32, y: u32) -> Location {
    Location::new(127.0 + f64::from(x) * 0.005, 37.5 + f64::from(y) * 0.005).expect("valid location")
}

prop_compose! {
    fn step_strategy()
    (
     x in 0u32..10,
     y in 0u32..10,
     start in (8u32 * 60)..(15 * 60),
     length in 60u32..360,
     work in 0u32..600,
     prework in 0u32..120
    ) -> ShipmentStep {
        ShipmentStep::new(location(x, y), "Customer door", window(start, length))
            .with_work_time(work)
            .with_prework_time(prework)
    }
}

prop_compose! {
    fn shipment_strategy()
    (
     pickup in step_strategy(),
     delivery in step_strategy(),
     amount in prop::collection::vec(0i32..4, 2),
     zone in prop::option::of(0usize..2),
     skill in prop::option::of(1u32..3)
    ) -> Shipment {
        let mut shipment = Shipment::new(pickup, delivery, amount);
        if let Some(z) = zone {
            shipment = shipment.with_groups(vec![ZONES[z].to_string()]);
        }
        if let Some(s) = skill {
            shipment = shipment.with_skills(vec![s]);
        }
        shipment
    }
}

prop_compose! {
    fn vehicle_strategy()
    (
     x in 0u32..10,
     y in 0u32..10,
     capacity in prop::collection::vec(4i32..8, 2),
     early in any::<bool>(),
     rest in any::<bool>(),
     zones in prop::sample::subsequence(ZONES.to_vec(), 0..=2),
     skills in prop::sample::subsequence(vec![1u32, 2], 0..=2)
    ) -> Vehicle {
        let shift = if early { window(7 * 60, 12 * 60) } else { window(8 * 60, 9 * 60) };
        let mut vehicle = Vehicle::new(location(x, y), location(x, y), capacity, shift)
            .with_groups(zones.into_iter().map(String::from).collect())
            .with_skills(skills);
        if rest {
            vehicle = vehicle.with_break(window(12 * 60, 90)).with_break_duration(1800);
        }
        vehicle
    }
}

prop_compose! {
    fn problem_strategy()
    (
     shipments in prop::collection::vec(shipment_strategy(), 1..8),
     vehicles in prop::collection::vec(vehicle_strategy(), 1..4)
    ) -> OptimizationProblem {
        OptimizationProblem::new(shipments, vehicles)
    }
}

/// Straight-line matrices at 10 m/s, whole meters and seconds.
fn matrices(problem: &OptimizationProblem) -> TransitMatrices {
    let graph = RoutingGraph::build(problem).expect("valid problem");
    let locs = graph.locations();
    let meters = |a: &Location, b: &Location| {
        let dx = (a.longitude() - b.longitude()) * 88_000.0;
        let dy = (a.latitude() - b.latitude()) * 111_000.0;
        (dx * dx + dy * dy).sqrt().round()
    };
    let distance: Vec<Vec<f64>> = locs.iter().map(|a| locs.iter().map(|b| meters(a, b)).collect()).collect();
    let duration = distance
        .iter()
        .map(|row| row.iter().map(|d| (d / 10.0).round()).collect())
        .collect();
    TransitMatrices::from_rows(distance, duration).expect("valid matrices")
}

fn solver() -> Solver {
    Solver::new(SolverConfig {
        max_time_seconds: 10,
        ..SolverConfig::default().with_max_iterations(60)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn solutions_pass_the_checker(problem in problem_strategy()) {
        let solution = solver().solve(&problem, &matrices(&problem)).expect("solvable");
        let violations = check_solution(&problem, &solution);
        prop_assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn every_shipment_accounted_once(problem in problem_strategy()) {
        let solution = solver().solve(&problem, &matrices(&problem)).expect("solvable");
        let mut seen: Vec<usize> = solution.unassigned().to_vec();
        for route in solution.routes() {
            prop_assert!(!route.shipment_ids().is_empty());
            seen.extend(route.shipment_ids());
        }
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..problem.shipments().len()).collect::<Vec<_>>());
        prop_assert!(solution.unassigned().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn solving_is_repeatable(problem in problem_strategy()) {
        let transit = matrices(&problem);
        let first = solver().solve(&problem, &transit).expect("solvable");
        let second = solver().solve(&problem, &transit).expect("solvable");
        prop_assert_eq!(first.total_duration(), second.total_duration());
        prop_assert_eq!(first.unassigned(), second.unassigned());
    }
}
