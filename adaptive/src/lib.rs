//! Online adaptive filters trained and queried one observation at a time.

mod auto_lms;
mod config;
mod echo;
pub mod error;
mod filter;
mod init;
mod lms;

pub use auto_lms::AutoLms;
pub use config::{DEFAULT_MU, DEFAULT_ORDER, FilterConfig};
pub use echo::Echo;
pub use error::{FilterErr, Result};
pub use filter::AutoFilter;
pub use init::WeightInit;
pub use lms::Lms;
