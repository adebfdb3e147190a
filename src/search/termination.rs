//! Stopping rules for the improvement loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// When to stop improving.
///
/// Checked between iterations only; a running iteration always completes.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::time::Duration;
/// use u_dispatch::search::Termination;
///
/// let cancel = AtomicBool::new(false);
/// let t = Termination::new(Duration::from_secs(60), 10)
///     .with_max_iterations(100)
///     .with_cancel(&cancel);
/// assert!(!t.should_stop(5, 0));
/// assert!(t.should_stop(100, 0));
/// assert!(t.should_stop(5, 10));
/// cancel.store(true, Ordering::Relaxed);
/// assert!(t.should_stop(0, 0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Termination<'a> {
    deadline: Instant,
    patience: usize,
    max_iterations: Option<usize>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> Termination<'a> {
    /// Stops after `budget` wall-clock time from now, or after `patience`
    /// consecutive iterations without a new best.
    pub fn new(budget: Duration, patience: usize) -> Self {
        let now = Instant::now();
        Self {
            deadline: now.checked_add(budget).unwrap_or(now + Duration::from_secs(86_400 * 365)),
            patience,
            max_iterations: None,
            cancel: None,
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Stops as soon as `flag` reads `true`.
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|c| c.load(Ordering::Relaxed))
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Whether to stop after `iteration` iterations, `stale` of them in a
    /// row without improving the best.
    pub fn should_stop(&self, iteration: usize, stale: usize) -> bool {
        stale >= self.patience
            || self.max_iterations.is_some_and(|m| iteration >= m)
            || self.is_cancelled()
            || self.is_expired()
    }
}
