//! The processor endpoint: answers every spike count frame with a forecast of the next one.

mod config;
pub mod error;
mod server;
mod session;

pub use config::ProcessorConfig;
pub use error::{ProcessorErr, Result};
pub use server::Processor;
pub use session::{Session, SessionState, SessionSummary};
