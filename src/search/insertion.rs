//! Cheapest feasible pair insertion into one route.

use std::iter;

use super::ArcCost;
use crate::evaluation::RouteEvaluator;

/// Where to insert a shipment's pickup and delivery into a route of length
/// `L`, and the cost increase of doing so.
///
/// The resulting route is
/// `route[..pickup_pos] + pickup + route[pickup_pos..delivery_pos] + delivery + route[delivery_pos..]`
/// with `0 <= pickup_pos <= delivery_pos <= L`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insertion {
    pub pickup_pos: usize,
    pub delivery_pos: usize,
    pub delta: f64,
}

/// Finds the cheapest feasible way to insert `shipment` into `route` of
/// `vehicle`, considering only insertions cheaper than `bound`.
///
/// Positions are scanned in ascending order and only strictly better
/// candidates replace the incumbent, so ties resolve to the earliest
/// position. Returns `None` if the vehicle is not eligible or no position
/// under the bound is feasible.
pub fn best_insertion(
    evaluator: &RouteEvaluator<'_>,
    cost: &dyn ArcCost,
    vehicle: usize,
    route: &[usize],
    shipment: usize,
    bound: f64,
) -> Option<Insertion> {
    if !evaluator.constraints().allows(shipment, vehicle) {
        return None;
    }
    let graph = evaluator.graph();
    let (p, d) = (graph.pickup(shipment), graph.delivery(shipment));
    let start = graph.start(vehicle);
    let end = graph.end(vehicle);
    let len = route.len();
    // ext[k] is the node before route position k, ext[k + 1] the one after.
    let ext = |k: usize| -> usize {
        if k == 0 {
            start
        } else if k == len + 1 {
            end
        } else {
            route[k - 1]
        }
    };
    let baseline = if len == 0 { cost.arc(start, end) } else { 0.0 };

    let mut best: Option<Insertion> = None;
    let mut limit = bound;
    for i in 0..=len {
        let (a, b) = (ext(i), ext(i + 1));
        let pickup_delta = cost.arc(a, p) + cost.arc(p, b) - cost.arc(a, b);
        for j in i..=len {
            let delta = if j == i {
                cost.arc(a, p) + cost.arc(p, d) + cost.arc(d, b) - cost.arc(a, b)
            } else {
                let (c, e) = (ext(j), ext(j + 1));
                pickup_delta + cost.arc(c, d) + cost.arc(d, e) - cost.arc(c, e)
            } + baseline;
            if delta >= limit {
                continue;
            }
            let candidate = route[..i]
                .iter()
                .copied()
                .chain(iter::once(p))
                .chain(route[i..j].iter().copied())
                .chain(iter::once(d))
                .chain(route[j..].iter().copied());
            if evaluator.is_feasible_iter(vehicle, candidate) {
                limit = delta;
                best = Some(Insertion {
                    pickup_pos: i,
                    delivery_pos: j,
                    delta,
                });
            }
        }
    }
    best
}
