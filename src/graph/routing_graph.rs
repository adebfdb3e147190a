//! Node indexing for one solve.

use crate::error::SolveError;
use crate::models::{check_counts, check_dimensions, Location, OptimizationProblem};

/// The role a routing-graph node plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Pickup step of the shipment.
    Pickup(usize),
    /// Delivery step of the shipment.
    Delivery(usize),
    /// Start depot of the vehicle.
    Start(usize),
    /// End depot of the vehicle.
    End(usize),
}

impl NodeKind {
    /// Shipment served at this node, `None` for depots.
    pub fn shipment(&self) -> Option<usize> {
        match *self {
            NodeKind::Pickup(s) | NodeKind::Delivery(s) => Some(s),
            NodeKind::Start(_) | NodeKind::End(_) => None,
        }
    }

    pub fn is_depot(&self) -> bool {
        self.shipment().is_none()
    }
}

/// Indexed routing graph: one node per pickup, delivery, start depot, and
/// end depot.
///
/// The layout is fixed so that external matrix providers can build matrices
/// in the same order as [`locations`](Self::locations):
///
/// | node            | index            |
/// |-----------------|------------------|
/// | pickup of `s`   | `2s`             |
/// | delivery of `s` | `2s + 1`         |
/// | start of `v`    | `2N + 2v`        |
/// | end of `v`      | `2N + 2v + 1`    |
///
/// where `N` is the number of shipments. Arcs are implicit: every ordered
/// node pair is connected, weighted by the transit provider.
///
/// # Examples
///
/// ```
/// use u_dispatch::graph::{NodeKind, RoutingGraph};
/// use u_dispatch::models::{Location, OptimizationProblem, Shipment, ShipmentStep, TimeWindow, Vehicle};
///
/// let here = Location::new(127.0, 37.5).unwrap();
/// let day = TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").unwrap();
/// let step = ShipmentStep::new(here, "Loading bay", day);
/// let problem = OptimizationProblem::new(
///     vec![Shipment::new(step.clone(), step, vec![1])],
///     vec![Vehicle::new(here, here, vec![10], day)],
/// );
/// let graph = RoutingGraph::build(&problem).unwrap();
/// assert_eq!(graph.num_nodes(), 4);
/// assert_eq!(graph.node(1), NodeKind::Delivery(0));
/// assert_eq!(graph.start(0), 2);
/// ```
#[derive(Debug, Clone)]
pub struct RoutingGraph {
    num_shipments: usize,
    num_vehicles: usize,
    locations: Vec<Location>,
}

impl RoutingGraph {
    /// Indexes every shipment step and vehicle depot of `problem`.
    ///
    /// Fails with [`SolveError::InvalidProblem`] if there are no shipments or
    /// vehicles, or if capacity dimensionality is inconsistent.
    pub fn build(problem: &OptimizationProblem) -> Result<Self, SolveError> {
        let shipments = problem.shipments();
        let vehicles = problem.vehicles();
        check_counts(shipments.len(), vehicles.len())?;
        check_dimensions(problem)?;

        let mut locations = Vec::with_capacity(2 * (shipments.len() + vehicles.len()));
        for s in shipments {
            locations.push(s.pickup().location());
            locations.push(s.delivery().location());
        }
        for v in vehicles {
            locations.push(v.start_location());
            locations.push(v.end_location());
        }

        Ok(Self {
            num_shipments: shipments.len(),
            num_vehicles: vehicles.len(),
            locations,
        })
    }

    /// Total node count, `2N + 2M`.
    pub fn num_nodes(&self) -> usize {
        self.locations.len()
    }

    pub fn num_shipments(&self) -> usize {
        self.num_shipments
    }

    pub fn num_vehicles(&self) -> usize {
        self.num_vehicles
    }

    /// Role of the node at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_nodes()`.
    pub fn node(&self, index: usize) -> NodeKind {
        assert!(index < self.num_nodes(), "node {index} out of range");
        let depot_base = 2 * self.num_shipments;
        if index < depot_base {
            if index % 2 == 0 {
                NodeKind::Pickup(index / 2)
            } else {
                NodeKind::Delivery(index / 2)
            }
        } else {
            let offset = index - depot_base;
            if offset % 2 == 0 {
                NodeKind::Start(offset / 2)
            } else {
                NodeKind::End(offset / 2)
            }
        }
    }

    pub fn pickup(&self, shipment: usize) -> usize {
        2 * shipment
    }

    pub fn delivery(&self, shipment: usize) -> usize {
        2 * shipment + 1
    }

    pub fn start(&self, vehicle: usize) -> usize {
        2 * self.num_shipments + 2 * vehicle
    }

    pub fn end(&self, vehicle: usize) -> usize {
        2 * self.num_shipments + 2 * vehicle + 1
    }

    /// Location of the node at `index`.
    pub fn location(&self, index: usize) -> Location {
        self.locations[index]
    }

    /// Node locations in index order, for building transit matrices.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }
}
