//! Location, shipment step, and shipment types.

use serde::{Deserialize, Serialize};

use super::TimeWindow;

/// A WGS84 coordinate.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Location;
///
/// let seoul = Location::new(126.978, 37.566).unwrap();
/// assert_eq!(seoul.longitude(), 126.978);
/// assert!(Location::new(181.0, 0.0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    longitude: f64,
    latitude: f64,
}

impl Location {
    /// Creates a location.
    ///
    /// Returns `None` if either coordinate is non-finite or out of range.
    pub fn new(longitude: f64, latitude: f64) -> Option<Self> {
        let loc = Self {
            longitude,
            latitude,
        };
        loc.is_valid().then_some(loc)
    }

    /// Longitude in degrees, `[-180, 180]`.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude in degrees, `[-90, 90]`.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

/// One half of a shipment: where, when, and how long.
///
/// Service at a step consumes `preworktime` (setup) before the window check,
/// then `worktime` once service has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentStep {
    location: Location,
    description: String,
    #[serde(rename = "worktime", default)]
    work_time: u32,
    #[serde(rename = "preworktime", default)]
    prework_time: u32,
    #[serde(rename = "timewindow")]
    time_window: TimeWindow,
}

impl ShipmentStep {
    /// Creates a step with zero work and pre-work time.
    pub fn new(location: Location, description: impl Into<String>, time_window: TimeWindow) -> Self {
        Self {
            location,
            description: description.into(),
            work_time: 0,
            prework_time: 0,
            time_window,
        }
    }

    /// Sets the service duration in seconds.
    pub fn with_work_time(mut self, seconds: u32) -> Self {
        self.work_time = seconds;
        self
    }

    /// Sets the setup duration in seconds.
    pub fn with_prework_time(mut self, seconds: u32) -> Self {
        self.prework_time = seconds;
        self
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Service duration in seconds.
    pub fn work_time(&self) -> u32 {
        self.work_time
    }

    /// Setup duration in seconds, consumed before service may start.
    pub fn prework_time(&self) -> u32 {
        self.prework_time
    }

    /// Window in which service may start.
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }
}

/// A paired pickup-and-delivery job.
///
/// Both steps are served by the same vehicle, pickup first. `amount` is loaded
/// at the pickup and unloaded at the delivery.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Location, Shipment, ShipmentStep, TimeWindow};
///
/// let tw = TimeWindow::parse("2025-01-15 09:00", "2025-01-15 17:00").unwrap();
/// let here = Location::new(127.0, 37.5).unwrap();
/// let s = Shipment::new(
///     ShipmentStep::new(here, "Warehouse dock 3", tw),
///     ShipmentStep::new(here, "Customer front door", tw),
///     vec![2, 1],
/// )
/// .with_groups(vec!["north".into()]);
/// assert_eq!(s.amount(), &[2, 1]);
/// assert_eq!(s.groups(), &["north".to_string()]);
/// assert!(s.skills().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pickup: ShipmentStep,
    delivery: ShipmentStep,
    amount: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    skills: Option<Vec<u32>>,
}

impl Shipment {
    /// Creates a shipment without group or skill requirements.
    pub fn new(pickup: ShipmentStep, delivery: ShipmentStep, amount: Vec<i32>) -> Self {
        Self {
            pickup,
            delivery,
            amount,
            groups: None,
            skills: None,
        }
    }

    /// Restricts the shipment to vehicles sharing at least one group.
    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.groups = Some(groups);
        self
    }

    /// Requires every listed skill on the serving vehicle.
    pub fn with_skills(mut self, skills: Vec<u32>) -> Self {
        self.skills = Some(skills);
        self
    }

    pub fn pickup(&self) -> &ShipmentStep {
        &self.pickup
    }

    pub fn delivery(&self) -> &ShipmentStep {
        &self.delivery
    }

    /// Capacity demand, one entry per dimension.
    pub fn amount(&self) -> &[i32] {
        &self.amount
    }

    /// Zone tags. Empty means "any vehicle".
    pub fn groups(&self) -> &[String] {
        self.groups.as_deref().unwrap_or(&[])
    }

    /// Required skills. Empty means "no requirement".
    pub fn skills(&self) -> &[u32] {
        self.skills.as_deref().unwrap_or(&[])
    }
}
