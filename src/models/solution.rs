//! Solution and violation types.

use serde::{Deserialize, Serialize};

use super::{SolvedRoute, StepKind};

/// A type of constraint violation in a route or solution.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationType {
    /// Cumulative load left `[0, capacity]` in some dimension.
    LoadOutOfBounds {
        /// Vehicle index.
        vehicle: usize,
        /// Capacity dimension.
        dimension: usize,
        /// Offending load.
        load: i64,
        /// Vehicle capacity in that dimension.
        capacity: i32,
    },
    /// Service could not start inside the step's window.
    TimeWindowViolated {
        /// Vehicle index.
        vehicle: usize,
        /// Shipment index.
        shipment: usize,
        /// Pickup or delivery.
        step: StepKind,
    },
    /// The route runs outside the vehicle's operating window.
    ShiftExceeded {
        /// Vehicle index.
        vehicle: usize,
    },
    /// The mandatory break cannot be placed in its window.
    BreakMissed {
        /// Vehicle index.
        vehicle: usize,
    },
    /// A delivery is visited before its pickup.
    PrecedenceViolated {
        /// Vehicle index.
        vehicle: usize,
        /// Shipment index.
        shipment: usize,
    },
    /// Only one half of a shipment is on the route.
    PairSplit {
        /// Vehicle index.
        vehicle: usize,
        /// Shipment index.
        shipment: usize,
    },
    /// The vehicle lacks a required group or skill.
    Ineligible {
        /// Vehicle index.
        vehicle: usize,
        /// Shipment index.
        shipment: usize,
    },
    /// A shipment is served more than once or both served and unassigned.
    DuplicateShipment {
        /// Shipment index.
        shipment: usize,
    },
    /// A shipment is neither served nor listed as unassigned.
    MissingShipment {
        /// Shipment index.
        shipment: usize,
    },
}

/// A constraint violation in a solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

impl From<ViolationType> for Violation {
    fn from(kind: ViolationType) -> Self {
        Self::new(kind)
    }
}

/// The result of a solve: timed routes plus shipments that could not be placed.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Solution, SolvedRoute};
///
/// let mut sol = Solution::new();
/// sol.add_route(SolvedRoute::new(0));
/// sol.add_unassigned(3);
/// assert_eq!(sol.num_routes(), 1);
/// assert_eq!(sol.unassigned(), &[3]);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Solution {
    routes: Vec<SolvedRoute>,
    #[serde(rename = "unassigned_shipments", default)]
    unassigned: Vec<usize>,
}

impl Solution {
    /// Creates an empty solution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route to this solution.
    pub fn add_route(&mut self, route: SolvedRoute) {
        self.routes.push(route);
    }

    /// Marks a shipment as unassigned.
    pub fn add_unassigned(&mut self, shipment: usize) {
        self.unassigned.push(shipment);
    }

    /// Routes, one per vehicle that serves at least one shipment.
    pub fn routes(&self) -> &[SolvedRoute] {
        &self.routes
    }

    /// Number of routes (vehicles used).
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Shipments that could not be placed.
    pub fn unassigned(&self) -> &[usize] {
        &self.unassigned
    }

    pub fn num_unassigned(&self) -> usize {
        self.unassigned.len()
    }

    /// Number of shipments served across all routes.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(|r| r.shipment_ids().len()).sum()
    }

    /// Total distance across all routes, in meters.
    pub fn total_distance(&self) -> f64 {
        self.routes.iter().map(|r| r.total_distance()).sum()
    }

    /// Total travel duration across all routes, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.routes.iter().map(|r| r.total_duration()).sum()
    }

    pub(crate) fn sort_unassigned(&mut self) {
        self.unassigned.sort_unstable();
        self.unassigned.dedup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_empty() {
        let sol = Solution::new();
        assert_eq!(sol.num_routes(), 0);
        assert_eq!(sol.num_unassigned(), 0);
        assert_eq!(sol.num_served(), 0);
        assert_eq!(sol.total_duration(), 0.0);
    }

    #[test]
    fn test_totals() {
        let mut sol = Solution::new();
        let mut r1 = SolvedRoute::new(0);
        r1.set_totals(1000.0, 60.0);
        let mut r2 = SolvedRoute::new(1);
        r2.set_totals(500.0, 30.0);
        sol.add_route(r1);
        sol.add_route(r2);
        assert!((sol.total_distance() - 1500.0).abs() < 1e-10);
        assert!((sol.total_duration() - 90.0).abs() < 1e-10);
    }

    #[test]
    fn test_sort_unassigned() {
        let mut sol = Solution::new();
        sol.add_unassigned(5);
        sol.add_unassigned(1);
        sol.add_unassigned(5);
        sol.sort_unassigned();
        assert_eq!(sol.unassigned(), &[1, 5]);
    }

    #[test]
    fn test_violation_from_kind() {
        let v: Violation = ViolationType::BreakMissed { vehicle: 2 }.into();
        assert_eq!(v.kind, ViolationType::BreakMissed { vehicle: 2 });
    }

    #[test]
    fn test_serialized_field_names() {
        let mut sol = Solution::new();
        sol.add_unassigned(7);
        let json = serde_json::to_value(&sol).expect("serialize");
        assert_eq!(json["unassigned_shipments"][0], 7);
        assert!(json["routes"].as_array().expect("array").is_empty());
    }
}
