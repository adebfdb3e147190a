//! Guided local search: arc penalties and the augmented cost.
//!
//! At each local optimum the arcs with the highest utility
//! `duration / (1 + penalty)` get one more penalty point, steering later
//! descents away from long arcs the search keeps returning to.

use std::collections::HashMap;

use super::{ArcCost, Assignment};
use crate::distance::Transit;
use crate::graph::RoutingGraph;

/// Penalty counts per directed arc.
#[derive(Debug, Clone, Default)]
pub struct ArcPenalties {
    counts: HashMap<(usize, usize), u32>,
}

impl ArcPenalties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, from: usize, to: usize) -> u32 {
        self.counts.get(&(from, to)).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Penalizes the maximum-utility arcs of `assignment`.
    ///
    /// Returns the number of arcs penalized; zero means every used arc has
    /// zero duration and guidance can no longer help.
    pub fn penalize(&mut self, graph: &RoutingGraph, transit: &dyn Transit, assignment: &Assignment) -> usize {
        let utility = |(a, b): (usize, usize)| transit.duration(a, b) / (1.0 + f64::from(self.get(a, b)));
        let max = assignment
            .arcs(graph)
            .map(utility)
            .fold(0.0_f64, f64::max);
        if max <= 0.0 {
            return 0;
        }
        let chosen: Vec<(usize, usize)> = assignment
            .arcs(graph)
            .filter(|&arc| (utility(arc) - max).abs() <= f64::EPSILON * max)
            .collect();
        for arc in &chosen {
            *self.counts.entry(*arc).or_insert(0) += 1;
        }
        chosen.len()
    }
}

/// Travel duration plus `lambda` per penalty point.
pub struct GuidedCost<'a> {
    transit: &'a dyn Transit,
    penalties: &'a ArcPenalties,
    lambda: f64,
}

impl<'a> GuidedCost<'a> {
    pub fn new(transit: &'a dyn Transit, penalties: &'a ArcPenalties, lambda: f64) -> Self {
        Self {
            transit,
            penalties,
            lambda,
        }
    }
}

impl ArcCost for GuidedCost<'_> {
    fn arc(&self, from: usize, to: usize) -> f64 {
        self.transit.duration(from, to) + self.lambda * f64::from(self.penalties.get(from, to))
    }
}

/// Penalty weight: `coefficient` times the mean arc duration of the
/// starting assignment.
pub(crate) fn lambda(coefficient: f64, cost: f64, arcs: usize) -> f64 {
    if arcs == 0 {
        0.0
    } else {
        coefficient * cost / arcs as f64
    }
}
