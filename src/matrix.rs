// Dense row-major f64 matrix
//
// Bulk loads and products are checked against the shape fixed at construction.

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Builds a matrix from row-major values; `data.len()` must be `rows * cols`
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, EngineError> {
        if data.len() != rows * cols {
            return Err(EngineError::ShapeMismatch {
                context: format!("{}x{} matrix data", rows, cols),
                expected: rows * cols,
                found: data.len(),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major view of all elements
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Replaces every element from a row-major slice of exactly `len()` values
    pub fn copy_from_slice(&mut self, values: &[f64]) -> Result<(), EngineError> {
        if values.len() != self.data.len() {
            return Err(EngineError::ShapeMismatch {
                context: format!("{}x{} matrix data", self.rows, self.cols),
                expected: self.data.len(),
                found: values.len(),
            });
        }
        self.data.copy_from_slice(values);
        Ok(())
    }

    /// Matrix-vector product `self * x`
    pub fn mul_vec(&self, x: &[f64]) -> Result<Vec<f64>, EngineError> {
        if x.len() != self.cols {
            return Err(EngineError::ShapeMismatch {
                context: format!("{}x{} matrix times vector", self.rows, self.cols),
                expected: self.cols,
                found: x.len(),
            });
        }

        Ok(self
            .data
            .chunks_exact(self.cols.max(1))
            .take(self.rows)
            .map(|row| row.iter().zip(x).map(|(w, v)| w * v).sum())
            .collect())
    }
}
