//! Intra-route segment reversal (2-opt).
//!
//! # Algorithm
//!
//! For each segment `route[i..=j]`, compute the change in cost from
//! reversing it. Costs may be asymmetric, so the reversed interior arcs are
//! re-summed rather than cancelled. A reversal that flips a shipment's pickup
//! and delivery is rejected by the route walk.
//!
//! # Complexity
//!
//! O(n³) per route per pass.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use super::{Candidate, Move, MoveContext, IMPROVEMENT_EPS};
use crate::search::parallel::parallel_min;
use crate::search::{path_cost, ArcCost, Assignment};

/// Best improving reversal over all routes.
pub(super) fn best_reverse(ctx: &MoveContext<'_>, assignment: &Assignment, cost: &dyn ArcCost) -> Option<Candidate> {
    let evaluator = ctx.evaluator;
    let graph = evaluator.graph();
    let vehicles: Vec<usize> = (0..assignment.routes().len())
        .filter(|&v| assignment.route(v).len() >= 2)
        .collect();
    parallel_min(
        &vehicles,
        ctx.parallel,
        |&vehicle| {
            let route = assignment.route(vehicle);
            let current = path_cost(graph, cost, vehicle, route);
            let mut best: Option<Candidate> = None;
            let mut trial = route.to_vec();
            for from in 0..route.len() - 1 {
                for to in from + 1..route.len() {
                    trial[from..=to].reverse();
                    let delta = path_cost(graph, cost, vehicle, &trial) - current;
                    let limit = best.as_ref().map_or(-IMPROVEMENT_EPS, |c| c.delta);
                    if delta < limit && evaluator.is_feasible(vehicle, &trial) {
                        best = Some(Candidate {
                            mv: Move::Reverse { vehicle, from, to },
                            delta,
                        });
                    }
                    trial[from..=to].reverse();
                }
            }
            best
        },
        Candidate::compare,
    )
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::on_line;
    use super::super::apply;
    use super::*;
    use crate::evaluation::RouteEvaluator;
    use crate::search::{Insertion, TravelTime};

    #[test]
    fn test_reverse_fixes_crossing() {
        // s0 picks up at 1 and s1 at 2; both deliver at 10/11.
        let f = on_line(&[(1.0, 10.0), (2.0, 11.0)], 1, 5);
        let e = RouteEvaluator::new(&f.graph, &f.constraints, &f.transit);
        let ctx = MoveContext {
            evaluator: &e,
            neighbors: &[],
            parallel: false,
        };
        let g = &f.graph;
        let mut a = Assignment::empty(g);
        a.insert(g, 0, 1, &Insertion { pickup_pos: 0, delivery_pos: 0, delta: 0.0 });
        a.insert(g, 0, 0, &Insertion { pickup_pos: 1, delivery_pos: 1, delta: 0.0 });
        // 2 -> 1 -> 10 -> 11: one backtrack at the start
        assert_eq!(a.route(0), &[2, 0, 1, 3]);

        let cost = TravelTime(&f.transit);
        let c = best_reverse(&ctx, &a, &cost).expect("improving");
        assert_eq!(c.mv, Move::Reverse { vehicle: 0, from: 0, to: 1 });
        assert_eq!(c.delta, -2.0);
        apply(g, &mut a, &c.mv);
        assert_eq!(a.route(0), &[0, 2, 1, 3]);
    }

    #[test]
    fn test_reverse_never_breaks_precedence() {
        let f = on_line(&[(5.0, 1.0)], 1, 5);
        let e = RouteEvaluator::new(&f.graph, &f.constraints, &f.transit);
        let ctx = MoveContext {
            evaluator: &e,
            neighbors: &[],
            parallel: false,
        };
        let g = &f.graph;
        let mut a = Assignment::empty(g);
        a.insert(g, 0, 0, &Insertion { pickup_pos: 0, delivery_pos: 0, delta: 0.0 });
        assert!(best_reverse(&ctx, &a, &TravelTime(&f.transit)).is_none());
    }
}
