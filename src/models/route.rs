//! Solved route and step types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::time_window::timestamp;
use super::Location;

/// What happens at a route step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Departure from the vehicle's start location.
    Start,
    /// Loading a shipment.
    Pickup,
    /// Unloading a shipment.
    Delivery,
    /// The vehicle's mandatory break.
    Break,
    /// Arrival at the vehicle's end location.
    End,
}

/// A single timed step within a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    /// Step type.
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// Shipment index for pickups and deliveries.
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub shipment: Option<usize>,
    /// Where the step happens.
    pub location: Location,
    /// When the vehicle physically reaches the step.
    ///
    /// For pickups and deliveries this may fall before the window opens: an
    /// early vehicle waits on site, and the wait is folded into
    /// `finish_time`. The window constrains setup completion, so
    /// `arrival_time + prework` never exceeds the window end and
    /// `finish_time - work` never precedes the window start. For a break step
    /// it is when the vehicle became free to rest.
    #[serde(with = "timestamp")]
    pub arrival_time: NaiveDateTime,
    /// When the vehicle is free to leave (after setup, waiting, and work).
    #[serde(with = "timestamp")]
    pub finish_time: NaiveDateTime,
}

/// The ordered steps served by one vehicle.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Location, RouteStep, SolvedRoute, StepKind};
/// use u_dispatch::models::timestamp;
///
/// let at = timestamp::parse("2025-01-15 08:00").unwrap();
/// let here = Location::new(127.0, 37.5).unwrap();
/// let mut route = SolvedRoute::new(0);
/// route.push_step(RouteStep {
///     kind: StepKind::Start,
///     shipment: None,
///     location: here,
///     arrival_time: at,
///     finish_time: at,
/// });
/// assert_eq!(route.len(), 1);
/// assert!(route.shipment_ids().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedRoute {
    vehicle_id: usize,
    steps: Vec<RouteStep>,
    #[serde(rename = "total_distance_meters")]
    total_distance: f64,
    #[serde(rename = "total_duration_seconds")]
    total_duration: f64,
}

impl SolvedRoute {
    /// Creates an empty route for the given vehicle.
    pub fn new(vehicle_id: usize) -> Self {
        Self {
            vehicle_id,
            steps: Vec::new(),
            total_distance: 0.0,
            total_duration: 0.0,
        }
    }

    /// Appends a step.
    pub fn push_step(&mut self, step: RouteStep) {
        self.steps.push(step);
    }

    pub fn vehicle_id(&self) -> usize {
        self.vehicle_id
    }

    pub fn steps(&self) -> &[RouteStep] {
        &self.steps
    }

    /// Number of steps, depots and breaks included.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Distinct shipments served, in pickup order.
    pub fn shipment_ids(&self) -> Vec<usize> {
        self.steps
            .iter()
            .filter(|s| s.kind == StepKind::Pickup)
            .filter_map(|s| s.shipment)
            .collect()
    }

    /// Sum of travel distances between consecutive stops, in meters.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Sum of travel durations between consecutive stops, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub(crate) fn set_totals(&mut self, distance: f64, duration: f64) {
        self.total_distance = distance;
        self.total_duration = duration;
    }
}
