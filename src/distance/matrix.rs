//! Dense square matrix.

use crate::error::{MatrixKind, SolveError};

/// A dense n×n matrix stored in row-major order.
///
/// Holds either travel distances (meters) or travel durations (seconds)
/// between routing-graph nodes.
///
/// # Examples
///
/// ```
/// use u_dispatch::distance::SquareMatrix;
/// use u_dispatch::error::MatrixKind;
///
/// let m = SquareMatrix::from_rows(
///     vec![vec![0.0, 5.0], vec![7.0, 0.0]],
///     MatrixKind::Duration,
/// )
/// .unwrap();
/// assert_eq!(m.get(1, 0), 7.0);
/// assert_eq!(m.size(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    data: Vec<f64>,
    size: usize,
}

impl SquareMatrix {
    /// Creates a matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Creates a matrix from an explicit n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Creates a matrix from nested rows as returned by routing services.
    ///
    /// Fails with [`SolveError::MatrixMismatch`] for ragged or non-square
    /// input, and with [`SolveError::Validation`] for negative or non-finite
    /// entries.
    pub fn from_rows(rows: Vec<Vec<f64>>, kind: MatrixKind) -> Result<Self, SolveError> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(SolveError::MatrixMismatch {
                    matrix: kind,
                    expected: size,
                    actual: format!("row {i} with {} columns", row.len()),
                });
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite() || *v < 0.0) {
                return Err(SolveError::validation(
                    format!("{kind}[{i}][{j}]"),
                    "entries must be finite and non-negative",
                ));
            }
            data.extend(row);
        }
        Ok(Self { data, size })
    }

    /// Returns the value from node `from` to node `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the value from node `from` to node `to`.
    pub fn set(&mut self, from: usize, to: usize, value: f64) {
        self.data[from * self.size + to] = value;
    }

    /// Number of nodes in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Largest entry, or 0 for an empty matrix.
    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data() {
        let m = SquareMatrix::from_data(2, vec![0.0, 5.0, 5.0, 0.0]).expect("valid");
        assert_eq!(m.get(0, 1), 5.0);
        assert_eq!(m.get(1, 0), 5.0);
    }

    #[test]
    fn test_from_data_invalid_size() {
        assert!(SquareMatrix::from_data(2, vec![0.0, 1.0, 2.0]).is_none());
    }

    #[test]
    fn test_from_rows_ragged() {
        let err = SquareMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]], MatrixKind::Distance)
            .expect_err("ragged");
        assert!(matches!(
            err,
            SolveError::MatrixMismatch {
                matrix: MatrixKind::Distance,
                expected: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_from_rows_negative() {
        let err = SquareMatrix::from_rows(vec![vec![0.0, -1.0], vec![1.0, 0.0]], MatrixKind::Duration)
            .expect_err("negative");
        assert!(matches!(err, SolveError::Validation { field, .. } if field == "duration[0][1]"));
    }

    #[test]
    fn test_set_get() {
        let mut m = SquareMatrix::new(3);
        m.set(0, 1, 42.0);
        assert_eq!(m.get(0, 1), 42.0);
        assert_eq!(m.get(1, 0), 0.0);
        assert_eq!(m.max_value(), 42.0);
    }
}
