//! Pair-aware local search moves for improving assignments.
//!
//! - [`relocate`] — Insert unassigned shipments; move a pickup/delivery pair
//!   within or between routes
//! - [`exchange`] — Swap two shipments between routes, restricted to
//!   nearest neighbors
//! - [`two_opt`] — Intra-route segment reversal
//!
//! Every neighborhood reports its single best candidate under the supplied
//! arc cost; [`best_move`] picks the overall best, and [`apply`] performs it.

mod exchange;
mod relocate;
mod two_opt;

use std::cmp::Ordering;

use crate::evaluation::RouteEvaluator;
use crate::graph::RoutingGraph;
use crate::search::{ArcCost, Assignment, Insertion, TravelTime};

/// A move must lower cost by more than this to count as improving.
pub(crate) const IMPROVEMENT_EPS: f64 = 1e-7;

/// Read-only inputs shared by all neighborhoods.
pub struct MoveContext<'a> {
    pub evaluator: &'a RouteEvaluator<'a>,
    /// Nearest shipments per shipment, for pair exchange.
    pub neighbors: &'a [Vec<usize>],
    pub parallel: bool,
}

/// A change to an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Move {
    /// Put an unassigned shipment on `vehicle`.
    Insert {
        shipment: usize,
        vehicle: usize,
        at: Insertion,
    },
    /// Take `shipment` off its route and re-insert it on `vehicle`, with `at`
    /// relative to the target route after removal.
    Relocate {
        shipment: usize,
        vehicle: usize,
        at: Insertion,
    },
    /// `first` moves to the route of `second` and vice versa; each
    /// insertion is relative to its target route with the other removed.
    Exchange {
        first: usize,
        second: usize,
        first_at: Insertion,
        second_at: Insertion,
    },
    /// Reverse `route[from..=to]` of `vehicle`.
    Reverse { vehicle: usize, from: usize, to: usize },
}

impl Move {
    /// Unique key, used to break cost ties deterministically.
    fn key(&self) -> (u8, [usize; 6]) {
        match *self {
            Move::Insert { shipment, vehicle, at } => (0, [shipment, vehicle, at.pickup_pos, at.delivery_pos, 0, 0]),
            Move::Relocate { shipment, vehicle, at } => (1, [shipment, vehicle, at.pickup_pos, at.delivery_pos, 0, 0]),
            Move::Exchange {
                first,
                second,
                first_at,
                second_at,
            } => (
                2,
                [
                    first,
                    second,
                    first_at.pickup_pos,
                    first_at.delivery_pos,
                    second_at.pickup_pos,
                    second_at.delivery_pos,
                ],
            ),
            Move::Reverse { vehicle, from, to } => (3, [vehicle, from, to, 0, 0, 0]),
        }
    }
}

/// A move and its cost change.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub mv: Move,
    pub delta: f64,
}

impl Candidate {
    /// Total order: lower delta first, then by move key.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.delta
            .total_cmp(&other.delta)
            .then_with(|| self.mv.key().cmp(&other.mv.key()))
    }
}

fn better(a: Option<Candidate>, b: Option<Candidate>) -> Option<Candidate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.compare(&a) == Ordering::Less { b } else { a }),
        (a, b) => a.or(b),
    }
}

/// The best move from `assignment`.
///
/// Placing one of the unassigned shipments in `pending` always wins, since
/// it lowers the primary objective; its delta is plain travel time.
/// Otherwise the best improving relocate, exchange, or reversal under `cost`
/// is returned, moving only shipments in `sources`.
pub fn best_move(
    ctx: &MoveContext<'_>,
    assignment: &Assignment,
    cost: &dyn ArcCost,
    pending: &[usize],
    sources: &[usize],
) -> Option<Candidate> {
    if !pending.is_empty() {
        let travel = TravelTime(ctx.evaluator.transit());
        if let Some(c) = relocate::best_insert(ctx, assignment, &travel, pending) {
            return Some(c);
        }
    }

    let mut best = relocate::best_relocate(ctx, assignment, cost, sources);
    best = better(best, exchange::best_exchange(ctx, assignment, cost, sources));
    best = better(best, two_opt::best_reverse(ctx, assignment, cost));
    best.filter(|c| c.delta < -IMPROVEMENT_EPS)
}

/// Performs `mv` on `assignment`.
pub fn apply(graph: &RoutingGraph, assignment: &mut Assignment, mv: &Move) {
    match *mv {
        Move::Insert { shipment, vehicle, at } => assignment.insert(graph, vehicle, shipment, &at),
        Move::Relocate { shipment, vehicle, at } => {
            assignment.remove(graph, shipment);
            assignment.insert(graph, vehicle, shipment, &at);
        }
        Move::Exchange {
            first,
            second,
            first_at,
            second_at,
        } => {
            let (Some(v1), Some(v2)) = (assignment.route_of(first), assignment.route_of(second)) else {
                return;
            };
            assignment.remove(graph, first);
            assignment.remove(graph, second);
            assignment.insert(graph, v2, first, &first_at);
            assignment.insert(graph, v1, second, &second_at);
        }
        Move::Reverse { vehicle, from, to } => {
            let mut nodes = assignment.route(vehicle).to_vec();
            nodes[from..=to].reverse();
            assignment.reorder(vehicle, nodes);
        }
    }
}

/// `route` with both nodes of `shipment` removed.
pub(crate) fn without(graph: &RoutingGraph, route: &[usize], shipment: usize) -> Vec<usize> {
    let (p, d) = (graph.pickup(shipment), graph.delivery(shipment));
    route.iter().copied().filter(|&n| n != p && n != d).collect()
}
