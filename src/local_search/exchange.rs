//! Inter-route pair exchange.
//!
//! # Algorithm
//!
//! For a shipment and each of its nearest neighbor shipments on a different
//! route, removes both and re-inserts each at its cheapest feasible position
//! on the other's route.
//!
//! # Complexity
//!
//! O(S × k × L³) per pass for S source shipments and k neighbors.

use super::{without, Candidate, Move, MoveContext, IMPROVEMENT_EPS};
use crate::search::parallel::parallel_min;
use crate::search::{best_insertion, path_cost, ArcCost, Assignment};

/// Best improving exchange of a shipment in `sources` with one of its
/// neighbors.
pub(super) fn best_exchange(
    ctx: &MoveContext<'_>,
    assignment: &Assignment,
    cost: &dyn ArcCost,
    sources: &[usize],
) -> Option<Candidate> {
    let evaluator = ctx.evaluator;
    let graph = evaluator.graph();
    let constraints = evaluator.constraints();
    parallel_min(
        sources,
        ctx.parallel,
        |&first| {
            let v1 = assignment.route_of(first)?;
            let route1 = assignment.route(v1);
            let reduced1 = without(graph, route1, first);
            let removal1 = path_cost(graph, cost, v1, &reduced1) - path_cost(graph, cost, v1, route1);

            let mut best: Option<Candidate> = None;
            for &second in ctx.neighbors.get(first).map_or(&[][..], Vec::as_slice) {
                let Some(v2) = assignment.route_of(second) else {
                    continue;
                };
                if v2 == v1 || !constraints.allows(first, v2) || !constraints.allows(second, v1) {
                    continue;
                }
                let route2 = assignment.route(v2);
                let reduced2 = without(graph, route2, second);
                let removal = removal1 + path_cost(graph, cost, v2, &reduced2) - path_cost(graph, cost, v2, route2);
                let limit = best.as_ref().map_or(-IMPROVEMENT_EPS, |c| c.delta);

                let Some(first_at) = best_insertion(evaluator, cost, v2, &reduced2, first, limit - removal) else {
                    continue;
                };
                let bound = limit - removal - first_at.delta;
                let Some(second_at) = best_insertion(evaluator, cost, v1, &reduced1, second, bound) else {
                    continue;
                };
                best = Some(Candidate {
                    mv: Move::Exchange {
                        first,
                        second,
                        first_at,
                        second_at,
                    },
                    delta: removal + first_at.delta + second_at.delta,
                });
            }
            best
        },
        Candidate::compare,
    )
}
