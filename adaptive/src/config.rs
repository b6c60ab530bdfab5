use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{AutoFilter, AutoLms, Echo, FilterErr, Result, WeightInit};

pub const DEFAULT_ORDER: NonZeroUsize = NonZeroUsize::new(3).unwrap();
pub const DEFAULT_MU: f64 = 1e-4;

/// Selects and parametrizes the filter a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterConfig {
    Lms {
        order: NonZeroUsize,
        mu: f64,
        #[serde(default)]
        init: WeightInit,
    },
    Echo,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::Lms {
            order: DEFAULT_ORDER,
            mu: DEFAULT_MU,
            init: WeightInit::Zero,
        }
    }
}

impl FilterConfig {
    /// Checks the parameters before any session depends on them.
    pub fn validate(&self) -> Result<()> {
        match *self {
            FilterConfig::Lms { mu, init, .. } => {
                if !(0.0..=1000.0).contains(&mu) {
                    return Err(FilterErr::InvalidLearningRate(mu));
                }

                init.weights((1, 1)).map(|_| ())
            }
            FilterConfig::Echo => Ok(()),
        }
    }

    /// Builds a fresh filter for `dim` channels.
    ///
    /// # Returns
    /// The filter or an error if the parameters are invalid.
    pub fn build(&self, dim: usize) -> Result<Box<dyn AutoFilter>> {
        let filter: Box<dyn AutoFilter> = match self {
            FilterConfig::Lms { order, mu, init } => Box::new(AutoLms::new(dim, *order, *mu, init)?),
            FilterConfig::Echo => Box::new(Echo::new(dim)?),
        };

        Ok(filter)
    }
}
