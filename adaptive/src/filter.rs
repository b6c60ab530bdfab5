use ndarray::ArrayView1;

use crate::Result;

/// An autoregressive filter that learns online from the very stream it forecasts.
pub trait AutoFilter: Send {
    /// Returns the amount of channels the filter works on.
    fn dim(&self) -> usize;

    /// Absorbs the just observed sample `x` and forecasts the next one.
    ///
    /// # Arguments
    /// * `x` - The newest observation, one value per channel.
    ///
    /// # Returns
    /// A view of the forecast or a size mismatch if `x` is not `dim` long.
    fn predict_next(&mut self, x: ArrayView1<f64>) -> Result<ArrayView1<'_, f64>>;
}
