use std::{num::NonZeroUsize, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{CommsErr, Result};

/// Largest neuron count a processor accepts unless configured otherwise.
pub const DEFAULT_MAX_NEURONS: NonZeroUsize = NonZeroUsize::new(1024).unwrap();

/// Byte order of multi-byte integers in the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

/// Width of the unsigned integer carrying the neuron count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderWidth {
    #[default]
    U16,
    U32,
    U64,
}

impl HeaderWidth {
    /// Returns the amount of bytes the header takes on the wire.
    pub fn size(self) -> usize {
        match self {
            Self::U16 => size_of::<u16>(),
            Self::U32 => size_of::<u32>(),
            Self::U64 => size_of::<u64>(),
        }
    }
}

/// The layout of the handshake header, never inferred from the bytes themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderFormat {
    pub width: HeaderWidth,
    pub order: ByteOrder,
}

/// How the processor writes each sample of a response frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseEncoding {
    /// One unsigned byte per neuron.
    Int8,
    /// One big-endian IEEE-754 double per neuron.
    #[default]
    Float64,
}

impl ResponseEncoding {
    /// Returns the amount of bytes a single sample takes on the wire.
    pub fn sample_size(self) -> usize {
        match self {
            Self::Int8 => size_of::<u8>(),
            Self::Float64 => size_of::<f64>(),
        }
    }
}

/// Immutable description of a probe/processor session.
///
/// Both endpoints must be built from equal configs, nothing here is negotiated
/// other than the neuron count carried by the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub header: HeaderFormat,
    pub response: ResponseEncoding,
    /// Whether the header + ACK exchange precedes streaming.
    pub handshake: bool,
    /// Fixed neuron count, mandatory when `handshake` is disabled.
    pub neurons: Option<NonZeroUsize>,
    /// Ceiling on the neuron count a header may announce, the filter state grows
    /// with its square.
    pub max_neurons: NonZeroUsize,
    /// Per operation deadline in milliseconds, unbounded when absent.
    pub deadline_ms: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            header: HeaderFormat::default(),
            response: ResponseEncoding::default(),
            handshake: true,
            neurons: None,
            max_neurons: DEFAULT_MAX_NEURONS,
            deadline_ms: None,
        }
    }
}

impl SessionConfig {
    /// Checks the fields are consistent with each other.
    ///
    /// # Returns
    /// An error if the handshake is disabled without a fixed neuron count, the fixed
    /// count exceeds `max_neurons` or the deadline is zero.
    pub fn validate(&self) -> Result<()> {
        if !self.handshake && self.neurons.is_none() {
            return Err(CommsErr::InvalidConfig(
                "a neuron count is required when the handshake is disabled",
            ));
        }

        if self.neurons.is_some_and(|n| n > self.max_neurons) {
            return Err(CommsErr::InvalidConfig(
                "the fixed neuron count exceeds the neuron ceiling",
            ));
        }

        if self.deadline_ms == Some(0) {
            return Err(CommsErr::InvalidConfig("the deadline must be positive"));
        }

        Ok(())
    }

    /// Returns the per operation deadline.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_pinned() {
        let cfg = SessionConfig::default();

        assert_eq!(cfg.header.width, HeaderWidth::U16);
        assert_eq!(cfg.header.order, ByteOrder::Big);
        assert_eq!(cfg.response, ResponseEncoding::Float64);
        assert!(cfg.handshake);
        assert_eq!(cfg.max_neurons, DEFAULT_MAX_NEURONS);
        assert!(cfg.deadline().is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn no_handshake_requires_neurons() {
        let mut cfg = SessionConfig {
            handshake: false,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(CommsErr::InvalidConfig(_))));

        cfg.neurons = NonZeroUsize::new(4);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn fixed_neurons_respect_the_ceiling() {
        let cfg = SessionConfig {
            neurons: NonZeroUsize::new(9),
            max_neurons: NonZeroUsize::new(8).unwrap(),
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(CommsErr::InvalidConfig(_))));
    }

    #[test]
    fn zero_deadline_is_rejected() {
        let cfg = SessionConfig {
            deadline_ms: Some(0),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "response": "int8", "header": { "order": "little" } }"#;
        let cfg: SessionConfig = serde_json::from_str(json).unwrap();

        assert_eq!(cfg.response, ResponseEncoding::Int8);
        assert_eq!(cfg.header.order, ByteOrder::Little);
        assert_eq!(cfg.header.width, HeaderWidth::U16);
        assert!(cfg.handshake);
    }
}
