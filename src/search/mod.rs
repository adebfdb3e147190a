//! Search over assignments: construction followed by guided local search.
//!
//! The objective is lexicographic: first minimize the number of unassigned
//! shipments, then total travel duration. Distance is reported but never
//! optimized.

mod assignment;
mod guided;
mod insertion;
pub(crate) mod parallel;
mod termination;

pub use assignment::{Assignment, Objective};
pub use guided::{ArcPenalties, GuidedCost};
pub use insertion::{best_insertion, Insertion};
pub use termination::Termination;
pub(crate) use assignment::path_cost;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, trace};

use crate::config::{FirstSolutionStrategy, Metaheuristic, SolverConfig};
use crate::constructive::{cheapest_insertion, path_cheapest_arc};
use crate::distance::Transit;
use crate::evaluation::RouteEvaluator;
use crate::local_search::{self, MoveContext};

/// Cost of travelling one arc, as seen by the search.
pub trait ArcCost: Sync {
    fn arc(&self, from: usize, to: usize) -> f64;
}

/// Plain travel duration.
pub struct TravelTime<'a>(pub &'a dyn Transit);

impl ArcCost for TravelTime<'_> {
    fn arc(&self, from: usize, to: usize) -> f64 {
        self.0.duration(from, to)
    }
}

/// Runs construction and improvement for one solve.
pub struct SearchEngine<'a> {
    evaluator: &'a RouteEvaluator<'a>,
    config: &'a SolverConfig,
    neighbors: Vec<Vec<usize>>,
}

impl<'a> SearchEngine<'a> {
    /// Prepares per-shipment neighbor lists for pair exchange.
    pub fn new(evaluator: &'a RouteEvaluator<'a>, config: &'a SolverConfig) -> Self {
        let neighbors = nearest_shipments(evaluator, config.neighborhood_size, config.parallel);
        Self {
            evaluator,
            config,
            neighbors,
        }
    }

    /// Builds a first assignment and improves it until `termination` says
    /// stop, returning the best assignment seen.
    pub fn run(&self, termination: &Termination<'_>) -> Assignment {
        let graph = self.evaluator.graph();
        let transit = self.evaluator.transit();
        let travel = TravelTime(transit);

        let initial = match self.config.first_solution {
            FirstSolutionStrategy::PathCheapestArc => {
                path_cheapest_arc(self.evaluator, termination, self.config.parallel)
            }
            FirstSolutionStrategy::CheapestInsertion => {
                let mut a = Assignment::empty(graph);
                cheapest_insertion(self.evaluator, &mut a, termination, self.config.parallel);
                a
            }
        };
        let mut best_objective = initial.objective(graph, &travel);
        debug!(
            strategy = ?self.config.first_solution,
            unassigned = best_objective.unassigned,
            cost = best_objective.cost,
            "first solution built"
        );

        let lambda = match self.config.metaheuristic {
            Metaheuristic::GuidedLocalSearch => guided::lambda(
                self.config.gls_lambda_coefficient,
                best_objective.cost,
                initial.arcs(graph).count(),
            ),
            Metaheuristic::GreedyDescent => 0.0,
        };

        let ctx = MoveContext {
            evaluator: self.evaluator,
            neighbors: &self.neighbors,
            parallel: self.config.parallel,
        };
        let mut best = initial.clone();
        let mut current = initial;
        let mut penalties = ArcPenalties::new();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut iteration = 0;
        let mut stale = 0;

        while !termination.should_stop(iteration, stale) {
            iteration += 1;
            let pending = self.sample(current.unassigned(), &mut rng);
            let sources = self.sample(current.assigned(), &mut rng);
            let cost = GuidedCost::new(transit, &penalties, lambda);
            match local_search::best_move(&ctx, &current, &cost, &pending, &sources) {
                Some(candidate) => {
                    trace!(iteration, ?candidate.mv, delta = candidate.delta, "applying move");
                    local_search::apply(graph, &mut current, &candidate.mv);
                }
                None => {
                    if self.config.metaheuristic == Metaheuristic::GreedyDescent {
                        debug!(iteration, "local optimum reached");
                        break;
                    }
                    let penalized = penalties.penalize(graph, transit, &current);
                    debug!(iteration, penalized, total = penalties.len(), "local optimum, penalizing arcs");
                    if penalized == 0 {
                        break;
                    }
                }
            }

            let objective = current.objective(graph, &travel);
            if objective.is_better_than(&best_objective) {
                best = current.clone();
                best_objective = objective;
                stale = 0;
            } else {
                stale += 1;
            }
        }

        debug!(
            iterations = iteration,
            unassigned = best_objective.unassigned,
            cost = best_objective.cost,
            "search finished"
        );
        best
    }

    /// At most `sample_size` of `pool` to try this iteration, ascending.
    fn sample(&self, pool: Vec<usize>, rng: &mut StdRng) -> Vec<usize> {
        if pool.len() <= self.config.sample_size {
            return pool;
        }
        let mut picked: Vec<usize> = rand::seq::index::sample(rng, pool.len(), self.config.sample_size)
            .into_iter()
            .map(|i| pool[i])
            .collect();
        picked.sort_unstable();
        picked
    }
}

/// The `k` shipments closest to each shipment by
/// `duration(pickup, pickup') + duration(delivery, delivery')`.
fn nearest_shipments(evaluator: &RouteEvaluator<'_>, k: usize, parallel: bool) -> Vec<Vec<usize>> {
    let graph = evaluator.graph();
    let transit = evaluator.transit();
    let n = graph.num_shipments();
    let shipments: Vec<usize> = (0..n).collect();
    parallel::parallel_collect(&shipments, parallel, |&s| {
        let mut scored: Vec<(f64, usize)> = (0..n)
            .filter(|&t| t != s)
            .map(|t| {
                let score = transit.duration(graph.pickup(s), graph.pickup(t))
                    + transit.duration(graph.delivery(s), graph.delivery(t));
                (score, t)
            })
            .collect();
        let by_score = |a: &(f64, usize), b: &(f64, usize)| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1));
        if scored.len() > k && k > 0 {
            scored.select_nth_unstable_by(k - 1, by_score);
        }
        scored.truncate(k);
        scored.sort_unstable_by(by_score);
        scored.into_iter().map(|(_, t)| t).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintSet;
    use crate::distance::TransitMatrices;
    use crate::graph::RoutingGraph;
    use crate::models::{Location, OptimizationProblem, Shipment, ShipmentStep, TimeWindow, Vehicle};
    use std::time::Duration;

    fn problem(n: usize, vehicles: usize) -> OptimizationProblem {
        let here = Location::new(127.0, 37.5).expect("valid");
        let day = TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").expect("valid");
        let step = ShipmentStep::new(here, "Loading bay", day).with_work_time(300);
        OptimizationProblem::new(
            (0..n).map(|_| Shipment::new(step.clone(), step.clone(), vec![1])).collect(),
            (0..vehicles).map(|_| Vehicle::new(here, here, vec![3], day)).collect(),
        )
    }

    /// Nodes on a line: pickup of `s` at `10s`, delivery at `10s + 5`,
    /// depots at 0; travel time is the coordinate difference.
    fn line(graph: &RoutingGraph) -> TransitMatrices {
        let coord = |i: usize| -> f64 {
            if i < 2 * graph.num_shipments() {
                (i / 2) as f64 * 10.0 + if i % 2 == 1 { 5.0 } else { 0.0 }
            } else {
                0.0
            }
        };
        let n = graph.num_nodes();
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|a| (0..n).map(|b| (coord(a) - coord(b)).abs() * 60.0).collect())
            .collect();
        TransitMatrices::from_rows(rows.clone(), rows).expect("valid")
    }

    fn run(p: &OptimizationProblem, config: &SolverConfig) -> (Assignment, f64) {
        let g = RoutingGraph::build(p).expect("valid");
        let c = ConstraintSet::build(p, &g).expect("valid");
        let t = line(&g);
        let e = RouteEvaluator::new(&g, &c, &t);
        let engine = SearchEngine::new(&e, config);
        let termination = Termination::new(Duration::from_secs(30), config.patience)
            .with_max_iterations(config.max_iterations.unwrap_or(200));
        let a = engine.run(&termination);
        let cost = a.cost(&g, &TravelTime(&t));
        for v in 0..g.num_vehicles() {
            assert!(e.is_feasible(v, a.route(v)), "route {v} infeasible");
        }
        (a, cost)
    }

    #[test]
    fn test_all_shipments_served() {
        let p = problem(8, 3);
        let (a, _) = run(&p, &SolverConfig::default().with_max_iterations(100));
        assert_eq!(a.num_unassigned(), 0);
    }

    #[test]
    fn test_search_does_not_worsen_construction() {
        let p = problem(10, 4);
        let g = RoutingGraph::build(&p).expect("valid");
        let c = ConstraintSet::build(&p, &g).expect("valid");
        let t = line(&g);
        let e = RouteEvaluator::new(&g, &c, &t);
        let budget = Termination::new(Duration::from_secs(30), usize::MAX);
        let first = path_cheapest_arc(&e, &budget, false).cost(&g, &TravelTime(&t));
        let (_, improved) = run(&p, &SolverConfig::default().with_max_iterations(100));
        assert!(improved <= first + 1e-9);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let p = problem(12, 3);
        let mut config = SolverConfig::default().with_max_iterations(60);
        let (par, _) = run(&p, &config);
        config.parallel = false;
        let (seq, _) = run(&p, &config);
        assert_eq!(par, seq);
    }

    #[test]
    fn test_sampling_is_seeded() {
        let p = problem(12, 3);
        let mut config = SolverConfig::default().with_max_iterations(40).with_seed(11);
        config.sample_size = 4;
        let (a, _) = run(&p, &config);
        let (b, _) = run(&p, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_greedy_descent_stops() {
        let p = problem(6, 2);
        let config = SolverConfig {
            metaheuristic: Metaheuristic::GreedyDescent,
            patience: usize::MAX,
            ..SolverConfig::default()
        };
        let (a, _) = run(&p, &config);
        assert_eq!(a.num_unassigned(), 0);
    }

    #[test]
    fn test_nearest_shipments() {
        let p = problem(5, 1);
        let g = RoutingGraph::build(&p).expect("valid");
        let c = ConstraintSet::build(&p, &g).expect("valid");
        let t = line(&g);
        let e = RouteEvaluator::new(&g, &c, &t);
        let nb = nearest_shipments(&e, 2, false);
        assert_eq!(nb[0], vec![1, 2]);
        assert_eq!(nb[2], vec![1, 3]);
        assert_eq!(nb[4], vec![3, 2]);
    }
}
