use std::num::NonZeroUsize;

use ndarray::{prelude::*, s};

use crate::{AutoFilter, FilterErr, Lms, Result, WeightInit};

/// Autoregressive LMS filter, forecasts each channel from the last `order` observations
/// of every channel.
///
/// Training runs one step behind: every new observation is first used as the target
/// for the history that preceded it, then pushed into the history the forecast is
/// made from. The history starts zero filled and that cold start bias is kept.
#[derive(Debug, Clone)]
pub struct AutoLms {
    lms: Lms,
    // (dim, order), most recent observation in column 0.
    hist: Array2<f64>,
    y: Array1<f64>,
}

impl AutoLms {
    /// Creates a new `AutoLms` filter.
    ///
    /// # Arguments
    /// * `dim` - The amount of channels.
    /// * `order` - The depth of the history.
    /// * `mu` - The learning rate, within `[0, 1000]`.
    /// * `init` - How to initialize the weights.
    pub fn new(dim: usize, order: NonZeroUsize, mu: f64, init: &WeightInit) -> Result<Self> {
        let lms = Lms::new(dim, order.get(), mu, init)?;
        Self::from_lms(lms, order)
    }

    /// Wraps an existing `Lms` whose weights are `(dim, order * dim)`.
    ///
    /// # Returns
    /// A size mismatch if the weights do not have that shape.
    pub fn from_lms(lms: Lms, order: NonZeroUsize) -> Result<Self> {
        let (dim, cols) = lms.weights().dim();
        if dim == 0 {
            return Err(FilterErr::InvalidDimension);
        }

        let expected = dim
            .checked_mul(order.get())
            .ok_or(FilterErr::TooLarge {
                dim,
                order: order.get(),
            })?;
        if cols != expected {
            return Err(FilterErr::SizeMismatch {
                what: "weight columns",
                got: cols,
                expected,
            });
        }

        Ok(Self {
            lms,
            hist: Array2::zeros((dim, order.get())),
            y: Array1::zeros(dim),
        })
    }

    pub fn order(&self) -> usize {
        self.hist.ncols()
    }

    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.lms.weights()
    }

    pub fn history(&self) -> ArrayView2<'_, f64> {
        self.hist.view()
    }

    /// Pushes `x` as the newest history column, dropping the oldest one.
    fn shift_in(&mut self, x: ArrayView1<f64>) {
        for k in (1..self.order()).rev() {
            let (src, mut dst) = self.hist.multi_slice_mut((s![.., k - 1], s![.., k]));
            dst.assign(&src);
        }

        self.hist.column_mut(0).assign(&x);
    }
}

impl AutoFilter for AutoLms {
    fn dim(&self) -> usize {
        self.hist.nrows()
    }

    fn predict_next(&mut self, x: ArrayView1<f64>) -> Result<ArrayView1<'_, f64>> {
        if x.len() != self.dim() {
            return Err(FilterErr::SizeMismatch {
                what: "observation",
                got: x.len(),
                expected: self.dim(),
            });
        }

        self.lms.adapt(x, self.hist.view())?;
        self.shift_in(x);
        self.lms.predict_into(self.hist.view(), self.y.view_mut())?;

        Ok(self.y.view())
    }
}
