use ndarray::{Array1, ArrayView1};

use crate::{AutoFilter, FilterErr, Result};

/// No-op baseline, forecasts the last observation unchanged.
#[derive(Debug, Clone)]
pub struct Echo {
    y: Array1<f64>,
}

impl Echo {
    /// Creates a new `Echo` filter for `dim` channels.
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(FilterErr::InvalidDimension);
        }

        Ok(Self {
            y: Array1::zeros(dim),
        })
    }
}

impl AutoFilter for Echo {
    fn dim(&self) -> usize {
        self.y.len()
    }

    fn predict_next(&mut self, x: ArrayView1<f64>) -> Result<ArrayView1<'_, f64>> {
        if x.len() != self.y.len() {
            return Err(FilterErr::SizeMismatch {
                what: "observation",
                got: x.len(),
                expected: self.y.len(),
            });
        }

        self.y.assign(&x);
        Ok(self.y.view())
    }
}
