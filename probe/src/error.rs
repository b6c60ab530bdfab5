use std::{error::Error, fmt, io};

use comms::{CommsErr, ErrorClass, ProtocolViolation};

/// The probe module's result type.
pub type Result<T> = std::result::Result<T, ProbeErr>;

/// Probe runtime failures.
#[derive(Debug)]
pub enum ProbeErr {
    Comms(CommsErr),
    /// The signal cannot be streamed, e.g. it has no neurons.
    InvalidSignal(&'static str),
}

impl ProbeErr {
    pub fn class(&self) -> ErrorClass {
        match self {
            ProbeErr::Comms(e) => e.class(),
            ProbeErr::InvalidSignal(_) => ErrorClass::Protocol,
        }
    }
}

impl fmt::Display for ProbeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeErr::Comms(e) => write!(f, "{e}"),
            ProbeErr::InvalidSignal(reason) => write!(f, "invalid signal: {reason}"),
        }
    }
}

impl Error for ProbeErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProbeErr::Comms(e) => Some(e),
            ProbeErr::InvalidSignal(_) => None,
        }
    }
}

impl From<CommsErr> for ProbeErr {
    fn from(value: CommsErr) -> Self {
        Self::Comms(value)
    }
}

impl From<ProtocolViolation> for ProbeErr {
    fn from(value: ProtocolViolation) -> Self {
        Self::Comms(value.into())
    }
}

impl From<io::Error> for ProbeErr {
    fn from(value: io::Error) -> Self {
        Self::Comms(value.into())
    }
}
