//! Pair insertion and relocation.
//!
//! # Algorithm
//!
//! Insertion tries every unassigned shipment on every eligible vehicle at its
//! cheapest feasible position. Relocation removes a pickup/delivery pair from
//! its route and re-inserts it at the cheapest feasible position on any
//! eligible route, its own included.
//!
//! # Complexity
//!
//! O(S × V × L³) per pass for S source shipments, V vehicles and routes of
//! length L (L² position pairs, each checked by an O(L) route walk).

use super::{without, Candidate, Move, MoveContext, IMPROVEMENT_EPS};
use crate::search::parallel::parallel_min;
use crate::search::{best_insertion, path_cost, ArcCost, Assignment};

/// Cheapest placement of any of the `unassigned` shipments.
pub(super) fn best_insert(
    ctx: &MoveContext<'_>,
    assignment: &Assignment,
    cost: &dyn ArcCost,
    unassigned: &[usize],
) -> Option<Candidate> {
    let evaluator = ctx.evaluator;
    parallel_min(
        unassigned,
        ctx.parallel,
        |&shipment| {
            let mut best: Option<Candidate> = None;
            for &vehicle in evaluator.constraints().allowed_vehicles(shipment) {
                let bound = best.as_ref().map_or(f64::INFINITY, |c| c.delta);
                let route = assignment.route(vehicle);
                if let Some(at) = best_insertion(evaluator, cost, vehicle, route, shipment, bound) {
                    best = Some(Candidate {
                        mv: Move::Insert { shipment, vehicle, at },
                        delta: at.delta,
                    });
                }
            }
            best
        },
        Candidate::compare,
    )
}

/// Best improving pair relocation among `sources`.
pub(super) fn best_relocate(
    ctx: &MoveContext<'_>,
    assignment: &Assignment,
    cost: &dyn ArcCost,
    sources: &[usize],
) -> Option<Candidate> {
    let evaluator = ctx.evaluator;
    let graph = evaluator.graph();
    parallel_min(
        sources,
        ctx.parallel,
        |&shipment| {
            let from = assignment.route_of(shipment)?;
            let route = assignment.route(from);
            let reduced = without(graph, route, shipment);
            let removal = path_cost(graph, cost, from, &reduced) - path_cost(graph, cost, from, route);
            let reduced_feasible = evaluator.is_feasible(from, &reduced);

            let mut best: Option<Candidate> = None;
            for &vehicle in evaluator.constraints().allowed_vehicles(shipment) {
                if vehicle != from && !reduced_feasible {
                    continue;
                }
                let target = if vehicle == from {
                    reduced.as_slice()
                } else {
                    assignment.route(vehicle)
                };
                let limit = best.as_ref().map_or(-IMPROVEMENT_EPS, |c| c.delta);
                if let Some(at) = best_insertion(evaluator, cost, vehicle, target, shipment, limit - removal) {
                    best = Some(Candidate {
                        mv: Move::Relocate { shipment, vehicle, at },
                        delta: removal + at.delta,
                    });
                }
            }
            best
        },
        Candidate::compare,
    )
}
