//! Optimization problem and its structural validation.

use serde::{Deserialize, Serialize};

use super::{Shipment, ShipmentStep, Vehicle};
use crate::error::SolveError;

/// Maximum number of shipments per problem.
pub const MAX_SHIPMENTS: usize = 10_000;
/// Maximum number of vehicles per problem.
pub const MAX_VEHICLES: usize = 1_000;
/// Maximum number of capacity dimensions.
pub const MAX_DIMENSIONS: usize = 10;
/// Maximum work or pre-work time at a single step (24 h).
pub const MAX_STEP_SECONDS: u32 = 86_400;

const DESCRIPTION_CHARS: std::ops::RangeInclusive<usize> = 5..=200;
const MAX_GROUP_CHARS: usize = 50;

/// A full dispatch request: every shipment and every vehicle.
///
/// Shipments and vehicles are identified by their index in these lists.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Location, OptimizationProblem, Shipment, ShipmentStep, TimeWindow, Vehicle};
///
/// let here = Location::new(127.0, 37.5).unwrap();
/// let day = TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").unwrap();
/// let problem = OptimizationProblem::new(
///     vec![Shipment::new(
///         ShipmentStep::new(here, "Warehouse A", day),
///         ShipmentStep::new(here, "Customer B", day),
///         vec![1],
///     )],
///     vec![Vehicle::new(here, here, vec![10], day)],
/// );
/// assert!(problem.validate().is_ok());
/// assert_eq!(problem.dimensions(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationProblem {
    shipments: Vec<Shipment>,
    vehicles: Vec<Vehicle>,
}

impl OptimizationProblem {
    /// Creates a problem. Call [`validate`](Self::validate) before solving
    /// untrusted input.
    pub fn new(shipments: Vec<Shipment>, vehicles: Vec<Vehicle>) -> Self {
        Self {
            shipments,
            vehicles,
        }
    }

    pub fn shipments(&self) -> &[Shipment] {
        &self.shipments
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Capacity dimensionality, taken from the first vehicle.
    pub fn dimensions(&self) -> usize {
        self.vehicles.first().map_or(0, |v| v.capacity().len())
    }

    /// Checks counts, field ranges, and cross-entity consistency.
    ///
    /// Field-level problems yield [`SolveError::Validation`]; empty lists,
    /// inconsistent dimensions, and misplaced breaks yield
    /// [`SolveError::InvalidProblem`].
    pub fn validate(&self) -> Result<(), SolveError> {
        check_counts(self.shipments.len(), self.vehicles.len())?;

        for (i, vehicle) in self.vehicles.iter().enumerate() {
            validate_vehicle(i, vehicle)?;
        }
        for (i, shipment) in self.shipments.iter().enumerate() {
            validate_shipment(i, shipment)?;
        }

        check_dimensions(self)
    }
}

/// Rejects empty fleets or workloads and oversize problems.
pub(crate) fn check_counts(shipments: usize, vehicles: usize) -> Result<(), SolveError> {
    if shipments == 0 {
        return Err(SolveError::invalid("at least one shipment is required"));
    }
    if vehicles == 0 {
        return Err(SolveError::invalid("at least one vehicle is required"));
    }
    if shipments > MAX_SHIPMENTS {
        return Err(SolveError::validation(
            "shipments",
            format!("at most {MAX_SHIPMENTS} shipments are supported, got {shipments}"),
        ));
    }
    if vehicles > MAX_VEHICLES {
        return Err(SolveError::validation(
            "vehicles",
            format!("at most {MAX_VEHICLES} vehicles are supported, got {vehicles}"),
        ));
    }
    Ok(())
}

/// Every vehicle capacity and shipment amount must have the same length.
pub(crate) fn check_dimensions(problem: &OptimizationProblem) -> Result<(), SolveError> {
    let dims = problem.dimensions();
    for (i, v) in problem.vehicles.iter().enumerate() {
        if v.capacity().len() != dims {
            return Err(SolveError::invalid(format!(
                "vehicle {i} has {} capacity dimensions, expected {dims}",
                v.capacity().len()
            )));
        }
    }
    for (i, s) in problem.shipments.iter().enumerate() {
        if s.amount().len() != dims {
            return Err(SolveError::invalid(format!(
                "shipment {i} has {} amount dimensions, expected {dims}",
                s.amount().len()
            )));
        }
    }
    Ok(())
}

fn validate_vehicle(i: usize, v: &Vehicle) -> Result<(), SolveError> {
    let path = format!("vehicles[{i}]");
    if !v.start_location().is_valid() {
        return Err(SolveError::validation(
            format!("{path}.start_location"),
            "coordinates out of range",
        ));
    }
    if !v.end_location().is_valid() {
        return Err(SolveError::validation(
            format!("{path}.end_location"),
            "coordinates out of range",
        ));
    }
    check_vector_len(&format!("{path}.capacity"), v.capacity().len())?;
    if let Some(d) = v.capacity().iter().position(|&c| c <= 0) {
        return Err(SolveError::validation(
            format!("{path}.capacity[{d}]"),
            "capacity must be positive",
        ));
    }
    check_skills(&path, v.skills())?;
    check_groups(&path, v.groups())?;

    if let Some(window) = v.break_window() {
        if !v.time_window().encloses(window) {
            return Err(SolveError::invalid(format!(
                "vehicle {i} break must lie within its operating window"
            )));
        }
        if let Some(duration) = v.break_duration() {
            if i64::from(duration) > window.duration_seconds() {
                return Err(SolveError::invalid(format!(
                    "vehicle {i} break duration {duration}s exceeds its break window"
                )));
            }
        }
    }
    Ok(())
}

fn validate_shipment(i: usize, s: &Shipment) -> Result<(), SolveError> {
    let path = format!("shipments[{i}]");
    validate_step(&format!("{path}.pickup"), s.pickup())?;
    validate_step(&format!("{path}.delivery"), s.delivery())?;
    check_vector_len(&format!("{path}.amount"), s.amount().len())?;
    if let Some(d) = s.amount().iter().position(|&a| a < 0) {
        return Err(SolveError::validation(
            format!("{path}.amount[{d}]"),
            "amount must not be negative",
        ));
    }
    check_skills(&path, s.skills())?;
    check_groups(&path, s.groups())
}

fn validate_step(path: &str, step: &ShipmentStep) -> Result<(), SolveError> {
    if !step.location().is_valid() {
        return Err(SolveError::validation(
            format!("{path}.location"),
            "coordinates out of range",
        ));
    }
    let chars = step.description().trim().chars().count();
    if !DESCRIPTION_CHARS.contains(&chars) {
        return Err(SolveError::validation(
            format!("{path}.description"),
            format!(
                "must be {}-{} characters, got {chars}",
                DESCRIPTION_CHARS.start(),
                DESCRIPTION_CHARS.end()
            ),
        ));
    }
    if step.work_time() > MAX_STEP_SECONDS {
        return Err(SolveError::validation(
            format!("{path}.worktime"),
            format!("must not exceed {MAX_STEP_SECONDS} seconds"),
        ));
    }
    if step.prework_time() > MAX_STEP_SECONDS {
        return Err(SolveError::validation(
            format!("{path}.preworktime"),
            format!("must not exceed {MAX_STEP_SECONDS} seconds"),
        ));
    }
    Ok(())
}

fn check_vector_len(path: &str, len: usize) -> Result<(), SolveError> {
    if len == 0 || len > MAX_DIMENSIONS {
        return Err(SolveError::validation(
            path,
            format!("must have 1-{MAX_DIMENSIONS} dimensions, got {len}"),
        ));
    }
    Ok(())
}

fn check_skills(path: &str, skills: &[u32]) -> Result<(), SolveError> {
    if skills.contains(&0) {
        return Err(SolveError::validation(
            format!("{path}.skills"),
            "skill ids must be positive",
        ));
    }
    Ok(())
}

fn check_groups(path: &str, groups: &[String]) -> Result<(), SolveError> {
    for g in groups {
        if g.is_empty() || g.chars().count() > MAX_GROUP_CHARS {
            return Err(SolveError::validation(
                format!("{path}.groups"),
                format!("group names must be 1-{MAX_GROUP_CHARS} characters"),
            ));
        }
    }
    Ok(())
}
