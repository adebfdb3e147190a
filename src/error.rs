//! Error types for the dispatch engine.
//!
//! Only structural problems are errors. A shipment that cannot be placed on
//! any route is a normal outcome and is reported in
//! [`Solution::unassigned`](crate::models::Solution::unassigned).

use std::fmt;

use thiserror::Error;

/// Which transit matrix an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
    /// Travel distance in meters.
    Distance,
    /// Travel duration in seconds.
    Duration,
}

impl fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixKind::Distance => f.write_str("distance"),
            MatrixKind::Duration => f.write_str("duration"),
        }
    }
}

/// Errors raised before search starts.
///
/// No partial solution is ever returned alongside an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// A field is malformed or out of range.
    #[error("invalid field `{field}`: {reason}")]
    Validation {
        /// Path of the offending field, e.g. `shipments[3].amount[0]`.
        field: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The problem as a whole is malformed (empty lists, inconsistent
    /// capacity dimensions, misplaced breaks).
    #[error("invalid problem: {reason}")]
    InvalidProblem {
        /// Human-readable reason, naming the offending index.
        reason: String,
    },

    /// A transit matrix does not match the routing graph.
    #[error("{matrix} matrix mismatch: expected {expected}x{expected}, got {actual}")]
    MatrixMismatch {
        /// Which matrix is wrong.
        matrix: MatrixKind,
        /// Node count of the routing graph.
        expected: usize,
        /// Description of the supplied shape.
        actual: String,
    },

    /// The model is structurally impossible to serve.
    #[error("shipment {shipment} can never be served: {reason}")]
    Infeasible {
        /// Index of the offending shipment.
        shipment: usize,
        /// Human-readable reason.
        reason: String,
    },
}

impl SolveError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SolveError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        SolveError::InvalidProblem {
            reason: reason.into(),
        }
    }
}
