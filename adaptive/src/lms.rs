use ndarray::prelude::*;

use crate::{FilterErr, Result, WeightInit};

/// Least-mean-squares adaptive filter over a `(dim, order)` input matrix.
///
/// The input matrix is flattened column after column, so the weight matrix has
/// shape `(dim, order * dim)`.
#[derive(Debug, Clone)]
pub struct Lms {
    mu: f64,
    wts: Array2<f64>,
}

impl Lms {
    /// Creates a new `Lms` filter.
    ///
    /// # Arguments
    /// * `dim` - The amount of outputs, also the amount of rows of the input.
    /// * `order` - The amount of columns of the input.
    /// * `mu` - The learning rate, within `[0, 1000]`.
    /// * `init` - How to initialize the weights.
    pub fn new(dim: usize, order: usize, mu: f64, init: &WeightInit) -> Result<Self> {
        if dim == 0 || order == 0 {
            return Err(FilterErr::InvalidDimension);
        }

        let too_large = || FilterErr::TooLarge { dim, order };
        let cols = order.checked_mul(dim).ok_or_else(too_large)?;
        let bytes = cols
            .checked_mul(dim)
            .and_then(|len| len.checked_mul(size_of::<f64>()))
            .ok_or_else(too_large)?;
        if bytes > isize::MAX as usize {
            return Err(too_large());
        }

        Self::with_weights(init.weights((dim, cols))?, mu)
    }

    /// Creates a new `Lms` filter starting from the given weights.
    pub fn with_weights(wts: Array2<f64>, mu: f64) -> Result<Self> {
        // Written so that NaN is rejected too.
        if !(0.0..=1000.0).contains(&mu) {
            return Err(FilterErr::InvalidLearningRate(mu));
        }

        Ok(Self { mu, wts })
    }

    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.wts.view()
    }

    pub fn learning_rate(&self) -> f64 {
        self.mu
    }

    /// Computes `W · vec(x)` without touching the weights.
    ///
    /// # Returns
    /// The prediction or a size mismatch if `x` is not `(dim, order)`.
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        let mut y = Array1::zeros(self.wts.nrows());
        self.predict_into(x, y.view_mut())?;
        Ok(y)
    }

    /// Same as [`Self::predict`] but writes the prediction into `y`.
    pub fn predict_into(&self, x: ArrayView2<f64>, mut y: ArrayViewMut1<f64>) -> Result<()> {
        self.check_input(x)?;
        self.check_output(y.len())?;

        for (y, w) in y.iter_mut().zip(self.wts.rows()) {
            // `x.t()` walks `x` column after column, exactly the flattening order.
            *y = w.iter().zip(x.t()).map(|(w, x)| w * x).sum();
        }

        Ok(())
    }

    /// Takes one LMS step towards predicting `d` out of `x`.
    ///
    /// `W ← W + μ · (d − W · vec(x)) · vec(x)ᵀ`. Nothing bounds the weights, an
    /// unstable `μ` lets them grow into infinities.
    ///
    /// # Arguments
    /// * `d` - The desired output.
    /// * `x` - The input matrix.
    pub fn adapt(&mut self, d: ArrayView1<f64>, x: ArrayView2<f64>) -> Result<()> {
        self.check_input(x)?;
        self.check_output(d.len())?;

        let mu = self.mu;
        for (mut w, &d) in self.wts.rows_mut().into_iter().zip(d) {
            let y: f64 = w.iter().zip(x.t()).map(|(w, x)| w * x).sum();
            let step = mu * (d - y);

            for (w, x) in w.iter_mut().zip(x.t()) {
                *w += step * x;
            }
        }

        Ok(())
    }

    fn check_input(&self, x: ArrayView2<f64>) -> Result<()> {
        let (dim, cols) = self.wts.dim();

        if x.nrows() != dim {
            return Err(FilterErr::SizeMismatch {
                what: "input rows",
                got: x.nrows(),
                expected: dim,
            });
        }

        if x.len() != cols {
            return Err(FilterErr::SizeMismatch {
                what: "input",
                got: x.len(),
                expected: cols,
            });
        }

        Ok(())
    }

    fn check_output(&self, len: usize) -> Result<()> {
        if len != self.wts.nrows() {
            return Err(FilterErr::SizeMismatch {
                what: "output",
                got: len,
                expected: self.wts.nrows(),
            });
        }

        Ok(())
    }
}
