use adaptive::FilterConfig;
use comms::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Everything a processor needs to serve a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub session: SessionConfig,
    pub filter: FilterConfig,
}

impl ProcessorConfig {
    /// Validates both the wire and the filter parameters.
    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        self.filter.validate()?;
        Ok(())
    }
}
