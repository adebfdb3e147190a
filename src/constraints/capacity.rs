//! Capacity dimensions.
//!
//! One cumulative dimension per capacity axis: pickups add the shipment's
//! amount, deliveries subtract it, and the running load must stay within
//! `[0, capacity]` at every node.

use super::eligibility::fits;
use crate::error::SolveError;
use crate::graph::{NodeKind, RoutingGraph};
use crate::models::{Shipment, Vehicle};

/// Signed load change at every node, indexed like the routing graph.
pub(crate) fn node_demands(graph: &RoutingGraph, shipments: &[Shipment], dims: usize) -> Vec<Vec<i32>> {
    (0..graph.num_nodes())
        .map(|node| match graph.node(node) {
            NodeKind::Pickup(s) => shipments[s].amount().to_vec(),
            NodeKind::Delivery(s) => shipments[s].amount().iter().map(|a| -a).collect(),
            NodeKind::Start(_) | NodeKind::End(_) => vec![0; dims],
        })
        .collect()
}

/// Fails with [`SolveError::Infeasible`] for the first shipment that does not
/// fit in any vehicle on its own.
pub(crate) fn check_fleet_capacity(shipments: &[Shipment], vehicles: &[Vehicle]) -> Result<(), SolveError> {
    for (i, s) in shipments.iter().enumerate() {
        if !vehicles.iter().any(|v| fits(s.amount(), v.capacity())) {
            return Err(SolveError::Infeasible {
                shipment: i,
                reason: format!(
                    "amount {:?} exceeds the capacity of every vehicle",
                    s.amount()
                ),
            });
        }
    }
    Ok(())
}

/// Running load of one route.
///
/// # Examples
///
/// ```
/// use u_dispatch::constraints::Load;
///
/// let mut load = Load::empty(2);
/// assert!(load.apply(&[3, 1], &[5, 5]).is_ok());
/// assert_eq!(load.apply(&[3, 0], &[5, 5]), Err((0, 6)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Load(Vec<i64>);

impl Load {
    /// Zero load in `dims` dimensions.
    pub fn empty(dims: usize) -> Self {
        Self(vec![0; dims])
    }

    /// Adds a signed demand and checks the result against `capacity`.
    ///
    /// Returns the first offending `(dimension, load)` on failure; the load is
    /// updated either way.
    pub fn apply(&mut self, demand: &[i32], capacity: &[i32]) -> Result<(), (usize, i64)> {
        let mut violation = None;
        for (d, (load, delta)) in self.0.iter_mut().zip(demand).enumerate() {
            *load += i64::from(*delta);
            if violation.is_none() && (*load < 0 || *load > i64::from(capacity[d])) {
                violation = Some((d, *load));
            }
        }
        violation.map_or(Ok(()), Err)
    }

    pub fn values(&self) -> &[i64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, OptimizationProblem, ShipmentStep, TimeWindow};

    fn day() -> TimeWindow {
        TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").expect("valid")
    }

    fn here() -> Location {
        Location::new(127.0, 37.5).expect("valid")
    }

    fn shipment(amount: Vec<i32>) -> Shipment {
        let step = ShipmentStep::new(here(), "Loading bay", day());
        Shipment::new(step.clone(), step, amount)
    }

    #[test]
    fn test_node_demands_signs() {
        let p = OptimizationProblem::new(
            vec![shipment(vec![2, 3])],
            vec![Vehicle::new(here(), here(), vec![5, 5], day())],
        );
        let g = RoutingGraph::build(&p).expect("valid");
        let d = node_demands(&g, p.shipments(), 2);
        assert_eq!(d[g.pickup(0)], vec![2, 3]);
        assert_eq!(d[g.delivery(0)], vec![-2, -3]);
        assert_eq!(d[g.start(0)], vec![0, 0]);
        assert_eq!(d[g.end(0)], vec![0, 0]);
    }

    #[test]
    fn test_fleet_capacity() {
        let vehicles = vec![
            Vehicle::new(here(), here(), vec![5, 1], day()),
            Vehicle::new(here(), here(), vec![1, 5], day()),
        ];
        assert!(check_fleet_capacity(&[shipment(vec![5, 1])], &vehicles).is_ok());
        let err = check_fleet_capacity(&[shipment(vec![1, 1]), shipment(vec![5, 5])], &vehicles)
            .expect_err("too big");
        assert!(matches!(err, SolveError::Infeasible { shipment: 1, .. }));
    }

    #[test]
    fn test_load_negative() {
        let mut load = Load::empty(1);
        assert_eq!(load.apply(&[-1], &[5]), Err((0, -1)));
    }

    #[test]
    fn test_load_round_trip() {
        let mut load = Load::empty(2);
        load.apply(&[2, 2], &[4, 4]).expect("fits");
        load.apply(&[2, 2], &[4, 4]).expect("fits exactly");
        load.apply(&[-2, -2], &[4, 4]).expect("unload");
        load.apply(&[-2, -2], &[4, 4]).expect("unload");
        assert_eq!(load.values(), &[0, 0]);
    }
}
