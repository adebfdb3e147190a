//! Zone affinity and skill matching.
//!
//! Both are hard filters applied to a shipment as a unit: a vehicle either
//! may serve its pickup and delivery, or neither.

use crate::models::{Shipment, Vehicle};

/// Returns `true` if `vehicle` may serve `shipment`.
///
/// - A shipment with groups needs a vehicle sharing at least one of them.
/// - A shipment with skills needs a vehicle offering all of them.
/// - A vehicle whose capacity cannot hold the shipment alone is never eligible.
///
/// # Examples
///
/// ```
/// use u_dispatch::constraints::is_eligible;
/// use u_dispatch::models::{Location, Shipment, ShipmentStep, TimeWindow, Vehicle};
///
/// let here = Location::new(127.0, 37.5).unwrap();
/// let day = TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").unwrap();
/// let step = ShipmentStep::new(here, "Loading bay", day);
/// let s = Shipment::new(step.clone(), step, vec![1]).with_groups(vec!["south".into()]);
/// let north = Vehicle::new(here, here, vec![10], day).with_groups(vec!["north".into()]);
/// let south = Vehicle::new(here, here, vec![10], day).with_groups(vec!["south".into()]);
/// assert!(!is_eligible(&s, &north));
/// assert!(is_eligible(&s, &south));
/// ```
pub fn is_eligible(shipment: &Shipment, vehicle: &Vehicle) -> bool {
    shares_group(shipment.groups(), vehicle.groups())
        && offers_skills(shipment.skills(), vehicle.skills())
        && fits(shipment.amount(), vehicle.capacity())
}

fn shares_group(required: &[String], offered: &[String]) -> bool {
    required.is_empty() || required.iter().any(|g| offered.contains(g))
}

fn offers_skills(required: &[u32], offered: &[u32]) -> bool {
    required.iter().all(|s| offered.contains(s))
}

/// Returns `true` if `amount` fits in `capacity` in every dimension.
pub(crate) fn fits(amount: &[i32], capacity: &[i32]) -> bool {
    amount.iter().zip(capacity).all(|(a, c)| a <= c)
}

/// Eligible vehicle indices per shipment, ascending.
pub(crate) fn allowed_vehicles(shipments: &[Shipment], vehicles: &[Vehicle]) -> Vec<Vec<usize>> {
    shipments
        .iter()
        .map(|s| {
            vehicles
                .iter()
                .enumerate()
                .filter(|(_, v)| is_eligible(s, v))
                .map(|(i, _)| i)
                .collect()
        })
        .collect()
}
