//! Time dimension: per-node service timing and per-vehicle shifts.
//!
//! All values are seconds relative to the problem origin (the earliest window
//! start anywhere in the problem).

/// Slack absorbed when comparing times, in seconds.
pub(crate) const TIME_EPS: f64 = 1e-6;

/// Timing rules for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTiming {
    /// Earliest service start.
    pub earliest: f64,
    /// Latest service start.
    pub latest: f64,
    /// Setup time consumed on arrival, before the window check.
    pub prework: f64,
    /// Service time after service start.
    pub work: f64,
}

impl NodeTiming {
    /// Window-only timing with no setup or service time (depots).
    pub fn window(earliest: f64, latest: f64) -> Self {
        Self {
            earliest,
            latest,
            prework: 0.0,
            work: 0.0,
        }
    }

    /// Serves the node on arrival at `arrival`.
    ///
    /// Returns `(service_start, finish)`, or `None` if setup completes after
    /// the window closes. Early vehicles wait for the window to open.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_dispatch::constraints::NodeTiming;
    ///
    /// let t = NodeTiming { earliest: 100.0, latest: 200.0, prework: 10.0, work: 30.0 };
    /// assert_eq!(t.serve(50.0), Some((100.0, 130.0)));
    /// assert_eq!(t.serve(150.0), Some((160.0, 190.0)));
    /// assert_eq!(t.serve(195.0), None);
    /// ```
    pub fn serve(&self, arrival: f64) -> Option<(f64, f64)> {
        let ready = arrival + self.prework;
        if ready > self.latest + TIME_EPS {
            return None;
        }
        let start = ready.max(self.earliest);
        Some((start, start + self.work))
    }
}

/// A vehicle's mandatory break.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rest {
    /// Earliest break start.
    pub earliest: f64,
    /// Latest break start, so that the break ends inside its window.
    pub latest: f64,
    /// Break length.
    pub duration: f64,
}

impl Rest {
    /// Break start for a vehicle free at `time`, or `None` once the latest
    /// start has passed. An early vehicle waits for the window.
    pub fn begin(&self, time: f64) -> Option<f64> {
        let begin = time.max(self.earliest);
        (begin <= self.latest + TIME_EPS).then_some(begin)
    }
}

/// A vehicle's operating window and break.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shift {
    /// Departure time from the start depot.
    pub start: f64,
    /// Latest arrival at the end depot.
    pub end: f64,
    /// Mandatory break, if any.
    pub rest: Option<Rest>,
}

impl Shift {
    /// Timing of this vehicle's end depot.
    pub fn end_timing(&self) -> NodeTiming {
        NodeTiming::window(self.start, self.end)
    }
}
