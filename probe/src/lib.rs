//! The probe endpoint: replays a recorded signal frame by frame and times every round trip.

mod driver;
mod error;
mod report;

pub use driver::{LatencyRecord, ProbeDriver, ProbeRun};
pub use error::{ProbeErr, Result};
pub use report::{LatencyReport, ResultSet};
