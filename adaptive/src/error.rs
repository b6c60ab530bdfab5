use std::{
    error::Error,
    fmt::{self, Display},
};

use rand_distr::{NormalError, uniform::Error as UniformError};

/// The result type used in the entire adaptive filtering module.
pub type Result<T> = std::result::Result<T, FilterErr>;

/// The adaptive filtering module's error type.
#[derive(Debug)]
pub enum FilterErr {
    InvalidLearningRate(f64),
    InvalidDimension,
    /// The `(dim, order * dim)` weight matrix does not fit in memory addressing.
    TooLarge { dim: usize, order: usize },
    /// The weight initialization distribution could not be built.
    InvalidInit(String),
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
}

impl Display for FilterErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterErr::InvalidLearningRate(mu) => {
                write!(f, "The learning rate must be within [0, 1000], got {mu}")
            }
            FilterErr::InvalidDimension => write!(f, "The filter dimension must be positive"),
            FilterErr::TooLarge { dim, order } => write!(
                f,
                "A filter of dimension {dim} and order {order} has too many weights"
            ),
            FilterErr::InvalidInit(msg) => write!(f, "Invalid weight initialization: {msg}"),
            FilterErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch for {what}, got {got} and expected {expected}"
            ),
        }
    }
}

impl Error for FilterErr {}

impl From<NormalError> for FilterErr {
    fn from(value: NormalError) -> Self {
        Self::InvalidInit(value.to_string())
    }
}

impl From<UniformError> for FilterErr {
    fn from(value: UniformError) -> Self {
        Self::InvalidInit(value.to_string())
    }
}
