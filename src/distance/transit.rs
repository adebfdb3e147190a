//! Transit providers: travel distance and duration between graph nodes.

use super::SquareMatrix;
use crate::error::{MatrixKind, SolveError};

/// Supplies travel distance and duration between routing-graph nodes.
///
/// Values are non-negative and zero from a node to itself. Implementations
/// are read-only and shared across search worker threads.
pub trait Transit: Send + Sync {
    /// Travel distance in meters.
    fn distance(&self, from: usize, to: usize) -> f64;

    /// Travel duration in seconds.
    fn duration(&self, from: usize, to: usize) -> f64;

    /// Number of nodes covered.
    fn size(&self) -> usize;
}

/// Distance and duration matrices indexed by routing-graph node.
///
/// # Examples
///
/// ```
/// use u_dispatch::distance::{Transit, TransitMatrices};
///
/// let t = TransitMatrices::from_rows(
///     vec![vec![0.0, 1000.0], vec![1000.0, 0.0]],
///     vec![vec![0.0, 60.0], vec![60.0, 0.0]],
/// )
/// .unwrap();
/// assert_eq!(t.distance(0, 1), 1000.0);
/// assert_eq!(t.duration(1, 0), 60.0);
/// assert!(t.ensure_nodes(3).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TransitMatrices {
    distance: SquareMatrix,
    duration: SquareMatrix,
}

impl TransitMatrices {
    /// Pairs a distance and a duration matrix of equal size.
    pub fn new(distance: SquareMatrix, duration: SquareMatrix) -> Result<Self, SolveError> {
        if distance.size() != duration.size() {
            return Err(SolveError::MatrixMismatch {
                matrix: MatrixKind::Duration,
                expected: distance.size(),
                actual: format!("{0}x{0}", duration.size()),
            });
        }
        Ok(Self { distance, duration })
    }

    /// Builds both matrices from nested rows.
    pub fn from_rows(distance: Vec<Vec<f64>>, duration: Vec<Vec<f64>>) -> Result<Self, SolveError> {
        Self::new(
            SquareMatrix::from_rows(distance, MatrixKind::Distance)?,
            SquareMatrix::from_rows(duration, MatrixKind::Duration)?,
        )
    }

    /// All-zero matrices, for co-located stops.
    pub fn zeros(size: usize) -> Self {
        Self {
            distance: SquareMatrix::new(size),
            duration: SquareMatrix::new(size),
        }
    }

    /// Fails with [`SolveError::MatrixMismatch`] unless both matrices cover
    /// exactly `expected` nodes.
    pub fn ensure_nodes(&self, expected: usize) -> Result<(), SolveError> {
        for (kind, m) in [
            (MatrixKind::Distance, &self.distance),
            (MatrixKind::Duration, &self.duration),
        ] {
            if m.size() != expected {
                return Err(SolveError::MatrixMismatch {
                    matrix: kind,
                    expected,
                    actual: format!("{0}x{0}", m.size()),
                });
            }
        }
        Ok(())
    }

    pub fn distance_matrix(&self) -> &SquareMatrix {
        &self.distance
    }

    pub fn duration_matrix(&self) -> &SquareMatrix {
        &self.duration
    }
}

impl Transit for TransitMatrices {
    fn distance(&self, from: usize, to: usize) -> f64 {
        if from == to {
            0.0
        } else {
            self.distance.get(from, to)
        }
    }

    fn duration(&self, from: usize, to: usize) -> f64 {
        if from == to {
            0.0
        } else {
            self.duration.get(from, to)
        }
    }

    fn size(&self) -> usize {
        self.duration.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_is_zero() {
        let mut d = SquareMatrix::new(2);
        d.set(0, 0, 9.0);
        d.set(0, 1, 4.0);
        let t = TransitMatrices::new(d.clone(), d).expect("same size");
        assert_eq!(t.distance(0, 0), 0.0);
        assert_eq!(t.duration(0, 0), 0.0);
        assert_eq!(t.duration(0, 1), 4.0);
    }

    #[test]
    fn test_size_mismatch_between_matrices() {
        let err = TransitMatrices::new(SquareMatrix::new(2), SquareMatrix::new(3)).expect_err("mismatch");
        assert!(matches!(err, SolveError::MatrixMismatch { expected: 2, .. }));
    }

    #[test]
    fn test_ensure_nodes() {
        let t = TransitMatrices::zeros(4);
        assert!(t.ensure_nodes(4).is_ok());
        let err = t.ensure_nodes(6).expect_err("wrong size");
        assert!(matches!(
            err,
            SolveError::MatrixMismatch {
                matrix: MatrixKind::Distance,
                expected: 6,
                ..
            }
        ));
    }
}
