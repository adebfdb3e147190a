//! Vehicle type with capacity, shift, break, and eligibility tags.

use serde::{Deserialize, Serialize};

use super::{Location, TimeWindow};

/// A vehicle that serves shipments within its operating window.
///
/// The route may end somewhere other than where it started.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Location, TimeWindow, Vehicle};
///
/// let depot = Location::new(127.0, 37.5).unwrap();
/// let shift = TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").unwrap();
/// let lunch = TimeWindow::parse("2025-01-15 12:00", "2025-01-15 13:00").unwrap();
///
/// let v = Vehicle::new(depot, depot, vec![10], shift)
///     .with_break(lunch)
///     .with_break_duration(1800);
/// assert_eq!(v.capacity(), &[10]);
/// assert_eq!(v.rest_seconds(), Some(1800));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    start_location: Location,
    end_location: Location,
    capacity: Vec<i32>,
    #[serde(rename = "timewindow")]
    time_window: TimeWindow,
    #[serde(rename = "breaktime", default, skip_serializing_if = "Option::is_none")]
    break_window: Option<TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    break_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    skills: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    groups: Option<Vec<String>>,
}

impl Vehicle {
    /// Creates a vehicle without break, skills, or groups.
    pub fn new(
        start_location: Location,
        end_location: Location,
        capacity: Vec<i32>,
        time_window: TimeWindow,
    ) -> Self {
        Self {
            start_location,
            end_location,
            capacity,
            time_window,
            break_window: None,
            break_duration: None,
            skills: None,
            groups: None,
        }
    }

    /// Sets the window the mandatory break must fall in.
    pub fn with_break(mut self, window: TimeWindow) -> Self {
        self.break_window = Some(window);
        self
    }

    /// Sets the break length in seconds (defaults to the whole break window).
    pub fn with_break_duration(mut self, seconds: u32) -> Self {
        self.break_duration = Some(seconds);
        self
    }

    /// Sets the skills this vehicle offers.
    pub fn with_skills(mut self, skills: Vec<u32>) -> Self {
        self.skills = Some(skills);
        self
    }

    /// Sets the zones this vehicle is assigned to.
    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.groups = Some(groups);
        self
    }

    pub fn start_location(&self) -> Location {
        self.start_location
    }

    pub fn end_location(&self) -> Location {
        self.end_location
    }

    /// Capacity, one entry per dimension.
    pub fn capacity(&self) -> &[i32] {
        &self.capacity
    }

    /// Operating window (shift).
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    /// Break window, if any.
    pub fn break_window(&self) -> Option<&TimeWindow> {
        self.break_window.as_ref()
    }

    /// Explicit break length, if set.
    pub fn break_duration(&self) -> Option<u32> {
        self.break_duration
    }

    /// Effective break length in seconds, if the vehicle takes a break.
    pub fn rest_seconds(&self) -> Option<i64> {
        self.break_window.map(|w| {
            self.break_duration
                .map(i64::from)
                .unwrap_or_else(|| w.duration_seconds())
        })
    }

    pub fn skills(&self) -> &[u32] {
        self.skills.as_deref().unwrap_or(&[])
    }

    pub fn groups(&self) -> &[String] {
        self.groups.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> Vehicle {
        let depot = Location::new(127.0, 37.5).expect("valid");
        let shift = TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").expect("valid");
        Vehicle::new(depot, depot, vec![10, 4], shift)
    }

    #[test]
    fn test_vehicle_new() {
        let v = vehicle();
        assert_eq!(v.capacity(), &[10, 4]);
        assert!(v.break_window().is_none());
        assert!(v.rest_seconds().is_none());
        assert!(v.skills().is_empty());
        assert!(v.groups().is_empty());
    }

    #[test]
    fn test_rest_defaults_to_window_length() {
        let lunch = TimeWindow::parse("2025-01-15 12:00", "2025-01-15 13:00").expect("valid");
        let v = vehicle().with_break(lunch);
        assert_eq!(v.rest_seconds(), Some(3600));
        let v = v.with_break_duration(900);
        assert_eq!(v.rest_seconds(), Some(900));
    }

    #[test]
    fn test_vehicle_builder_tags() {
        let v = vehicle()
            .with_skills(vec![1, 2])
            .with_groups(vec!["north".into(), "east".into()]);
        assert_eq!(v.skills(), &[1, 2]);
        assert_eq!(v.groups().len(), 2);
    }

    #[test]
    fn test_deserialize_wire_names() {
        let json = r#"{
            "start_location": {"longitude": 127.0, "latitude": 37.0},
            "end_location": {"longitude": 127.2, "latitude": 37.2},
            "capacity": [10],
            "timewindow": {"start": "2025-01-15 08:00", "end": "2025-01-15 18:00"},
            "breaktime": {"start": "2025-01-15 12:00", "end": "2025-01-15 13:00"},
            "groups": ["north"]
        }"#;
        let v: Vehicle = serde_json::from_str(json).expect("valid vehicle");
        assert_eq!(v.rest_seconds(), Some(3600));
        assert_eq!(v.groups(), &["north".to_string()]);
        assert_ne!(v.start_location(), v.end_location());
    }
}
