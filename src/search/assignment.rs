//! The mutable working solution.

use std::cmp::Ordering;

use super::insertion::Insertion;
use super::ArcCost;
use crate::graph::{NodeKind, RoutingGraph};

/// Lexicographic objective: fewer unassigned shipments first, then less
/// travel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Objective {
    pub unassigned: usize,
    pub cost: f64,
}

impl Objective {
    /// Total order; `Less` is better.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.unassigned
            .cmp(&other.unassigned)
            .then_with(|| self.cost.total_cmp(&other.cost))
    }

    pub fn is_better_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Less
    }
}

/// Pickup and delivery nodes per vehicle, depots excluded.
///
/// # Examples
///
/// ```
/// use u_dispatch::graph::RoutingGraph;
/// use u_dispatch::models::{Location, OptimizationProblem, Shipment, ShipmentStep, TimeWindow, Vehicle};
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
///
/// let mut assignment = Assignment::empty(&graph);
/// assert_eq!(assignment.unassigned(), vec![0]);
/// assignment.insert(&graph, 0, 0, &Insertion { pickup_pos: 0, delivery_pos: 0, delta: 0.0 });
/// assert_eq!(assignment.route(0), &[0, 1]);
/// assert_eq!(assignment.route_of(0), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    routes: Vec<Vec<usize>>,
    route_of: Vec<Option<usize>>,
}

impl Assignment {
    /// All vehicles idle, every shipment unassigned.
    pub fn empty(graph: &RoutingGraph) -> Self {
        Self {
            routes: vec![Vec::new(); graph.num_vehicles()],
            route_of: vec![None; graph.num_shipments()],
        }
    }

    pub fn routes(&self) -> &[Vec<usize>] {
        &self.routes
    }

    pub fn route(&self, vehicle: usize) -> &[usize] {
        &self.routes[vehicle]
    }

    /// Vehicle currently serving `shipment`.
    pub fn route_of(&self, shipment: usize) -> Option<usize> {
        self.route_of[shipment]
    }

    pub fn is_assigned(&self, shipment: usize) -> bool {
        self.route_of[shipment].is_some()
    }

    /// Unassigned shipments, ascending.
    pub fn unassigned(&self) -> Vec<usize> {
        (0..self.route_of.len())
            .filter(|&s| self.route_of[s].is_none())
            .collect()
    }

    /// Assigned shipments, ascending.
    pub fn assigned(&self) -> Vec<usize> {
        (0..self.route_of.len())
            .filter(|&s| self.route_of[s].is_some())
            .collect()
    }

    pub fn num_unassigned(&self) -> usize {
        self.route_of.iter().filter(|r| r.is_none()).count()
    }

    /// Places `shipment` on `vehicle`: the pickup before `route[pickup_pos]`
    /// and the delivery before the node originally at `delivery_pos`.
    pub fn insert(&mut self, graph: &RoutingGraph, vehicle: usize, shipment: usize, at: &Insertion) {
        let route = &mut self.routes[vehicle];
        route.insert(at.pickup_pos, graph.pickup(shipment));
        route.insert(at.delivery_pos + 1, graph.delivery(shipment));
        self.route_of[shipment] = Some(vehicle);
    }

    /// Takes `shipment` off its route, returning the vehicle it was on.
    pub fn remove(&mut self, graph: &RoutingGraph, shipment: usize) -> Option<usize> {
        let vehicle = self.route_of[shipment].take()?;
        let (p, d) = (graph.pickup(shipment), graph.delivery(shipment));
        self.routes[vehicle].retain(|&n| n != p && n != d);
        Some(vehicle)
    }

    /// Gives an idle `vehicle` a complete route.
    pub(crate) fn assign_route(&mut self, graph: &RoutingGraph, vehicle: usize, nodes: Vec<usize>) {
        debug_assert!(self.routes[vehicle].is_empty());
        for &n in &nodes {
            if let NodeKind::Pickup(s) = graph.node(n) {
                self.route_of[s] = Some(vehicle);
            }
        }
        self.routes[vehicle] = nodes;
    }

    /// Replaces a route wholesale with a permutation of its own nodes.
    pub fn reorder(&mut self, vehicle: usize, nodes: Vec<usize>) {
        debug_assert_eq!(nodes.len(), self.routes[vehicle].len());
        self.routes[vehicle] = nodes;
    }

    /// Every arc of every non-empty route, depots included.
    pub fn arcs<'a>(&'a self, graph: &'a RoutingGraph) -> impl Iterator<Item = (usize, usize)> + 'a {
        self.routes
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_empty())
            .flat_map(move |(v, r)| route_arcs(graph, v, r))
    }

    /// Cost of one vehicle's route under `cost`; idle vehicles cost nothing.
    pub fn route_cost(&self, graph: &RoutingGraph, cost: &dyn ArcCost, vehicle: usize) -> f64 {
        path_cost(graph, cost, vehicle, &self.routes[vehicle])
    }

    /// Summed route cost over all vehicles.
    pub fn cost(&self, graph: &RoutingGraph, cost: &dyn ArcCost) -> f64 {
        (0..self.routes.len())
            .map(|v| self.route_cost(graph, cost, v))
            .sum()
    }

    pub fn objective(&self, graph: &RoutingGraph, cost: &dyn ArcCost) -> Objective {
        Objective {
            unassigned: self.num_unassigned(),
            cost: self.cost(graph, cost),
        }
    }
}

/// Arcs from the start depot through `nodes` to the end depot.
pub(crate) fn route_arcs<'a>(
    graph: &RoutingGraph,
    vehicle: usize,
    nodes: &'a [usize],
) -> impl Iterator<Item = (usize, usize)> + 'a {
    let start = graph.start(vehicle);
    let end = graph.end(vehicle);
    let len = nodes.len();
    (0..=len).map(move |k| {
        let from = if k == 0 { start } else { nodes[k - 1] };
        let to = if k == len { end } else { nodes[k] };
        (from, to)
    })
}

/// Cost of a route given as a node list; an empty list costs nothing.
pub(crate) fn path_cost(graph: &RoutingGraph, cost: &dyn ArcCost, vehicle: usize, nodes: &[usize]) -> f64 {
    if nodes.is_empty() {
        return 0.0;
    }
    route_arcs(graph, vehicle, nodes)
        .map(|(a, b)| cost.arc(a, b))
        .sum()
}
