//! One-call dispatch solver.
//!
//! Runs the full pipeline for one request: validation, routing graph,
//! constraint compilation, construction and guided local search, then
//! extraction of the timed solution.

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use tracing::info;

use crate::config::SolverConfig;
use crate::constraints::ConstraintSet;
use crate::distance::TransitMatrices;
use crate::error::SolveError;
use crate::evaluation::RouteEvaluator;
use crate::extraction::extract_solution;
use crate::graph::RoutingGraph;
use crate::models::{OptimizationProblem, Solution};
use crate::search::{SearchEngine, Termination};

/// Pickup-and-delivery dispatch solver.
///
/// Holds only its configuration; every [`solve`](Solver::solve) call owns its
/// graph, constraints and search state, so one solver may serve many
/// requests.
///
/// # Examples
///
/// ```
/// use u_dispatch::{OptimizationProblem, Solver, SolverConfig};
/// use u_dispatch::distance::TransitMatrices;
/// use u_dispatch::graph::RoutingGraph;
/// use u_dispatch::models::{Location, Shipment, ShipmentStep, TimeWindow, Vehicle};
///
/// let here = Location::new(127.0, 37.5).unwrap();
/// let day = TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").unwrap();
/// let step = ShipmentStep::new(here, "Loading bay", day);
/// let problem = OptimizationProblem::new(
///     vec![Shipment::new(step.clone(), step, vec![1])],
///     vec![Vehicle::new(here, here, vec![10], day)],
/// );
/// let nodes = RoutingGraph::build(&problem).unwrap().num_nodes();
///
/// let solver = Solver::new(SolverConfig::instant());
/// let solution = solver.solve(&problem, &TransitMatrices::zeros(nodes)).unwrap();
/// assert_eq!(solution.num_routes(), 1);
/// assert!(solution.unassigned().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves `problem` with travel data indexed by routing-graph node.
    ///
    /// # Errors
    ///
    /// Fails before search on malformed input, matrices that do not match the
    /// routing graph, or a shipment no vehicle could ever carry. Shipments
    /// that merely cannot be fitted in are reported in
    /// [`Solution::unassigned`], not as errors.
    pub fn solve(&self, problem: &OptimizationProblem, transit: &TransitMatrices) -> Result<Solution, SolveError> {
        self.run(problem, transit, None)
    }

    /// Like [`solve`](Solver::solve), but stops improving once `cancel` is
    /// set and returns the best solution found so far.
    pub fn solve_with_cancel(
        &self,
        problem: &OptimizationProblem,
        transit: &TransitMatrices,
        cancel: &AtomicBool,
    ) -> Result<Solution, SolveError> {
        self.run(problem, transit, Some(cancel))
    }

    fn run(
        &self,
        problem: &OptimizationProblem,
        transit: &TransitMatrices,
        cancel: Option<&AtomicBool>,
    ) -> Result<Solution, SolveError> {
        let started_at = Instant::now();
        problem.validate()?;
        let graph = RoutingGraph::build(problem)?;
        transit.ensure_nodes(graph.num_nodes())?;
        let constraints = ConstraintSet::build(problem, &graph)?;

        info!(
            shipments = graph.num_shipments(),
            vehicles = graph.num_vehicles(),
            unservable = constraints.unservable().len(),
            "solving dispatch problem"
        );

        let evaluator = RouteEvaluator::new(&graph, &constraints, transit);
        let engine = SearchEngine::new(&evaluator, &self.config);
        let mut termination = Termination::new(self.config.time_limit(), self.config.patience);
        if let Some(max) = self.config.max_iterations {
            termination = termination.with_max_iterations(max);
        }
        if let Some(flag) = cancel {
            termination = termination.with_cancel(flag);
        }

        let assignment = engine.run(&termination);
        let solution = extract_solution(&evaluator, &assignment);

        info!(
            routes = solution.num_routes(),
            unassigned = solution.num_unassigned(),
            duration_s = solution.total_duration(),
            distance_m = solution.total_distance(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "dispatch solved"
        );
        Ok(solution)
    }
}
