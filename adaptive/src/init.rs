use ndarray::Array2;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::Result;

/// How a filter's weights are set before the first observation arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightInit {
    #[default]
    Zero,
    /// Samples from `[low, high)`.
    Uniform {
        low: f64,
        high: f64,
        seed: Option<u64>,
    },
    Normal {
        mean: f64,
        std_dev: f64,
        seed: Option<u64>,
    },
}

impl WeightInit {
    /// Builds a weight matrix following this policy.
    ///
    /// # Arguments
    /// * `shape` - The shape of the weight matrix.
    ///
    /// # Returns
    /// An error if the distribution parameters are invalid.
    pub fn weights(&self, shape: (usize, usize)) -> Result<Array2<f64>> {
        match *self {
            WeightInit::Zero => Ok(Array2::zeros(shape)),
            WeightInit::Uniform { low, high, seed } => {
                Ok(sample(shape, Uniform::new(low, high)?, seed))
            }
            WeightInit::Normal {
                mean,
                std_dev,
                seed,
            } => Ok(sample(shape, Normal::new(mean, std_dev)?, seed)),
        }
    }
}

fn sample<D: Distribution<f64>>(shape: (usize, usize), dist: D, seed: Option<u64>) -> Array2<f64> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    Array2::from_shape_simple_fn(shape, || dist.sample(&mut rng))
}
