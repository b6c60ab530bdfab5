use std::{error::Error, fmt, io};

use adaptive::FilterErr;
use comms::{CommsErr, ErrorClass};

/// The processor module's result type.
pub type Result<T> = std::result::Result<T, ProcessorErr>;

/// Processor runtime failures.
#[derive(Debug)]
pub enum ProcessorErr {
    Comms(CommsErr),
    Filter(FilterErr),
    /// The session already ran to completion.
    SessionClosed,
}

impl ProcessorErr {
    /// Returns the class this error belongs to, configuration problems count as protocol ones.
    pub fn class(&self) -> ErrorClass {
        match self {
            ProcessorErr::Comms(e) => e.class(),
            ProcessorErr::Filter(_) | ProcessorErr::SessionClosed => ErrorClass::Protocol,
        }
    }
}

impl fmt::Display for ProcessorErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessorErr::Comms(e) => write!(f, "{e}"),
            ProcessorErr::Filter(e) => write!(f, "filter error: {e}"),
            ProcessorErr::SessionClosed => write!(f, "the session is already closed"),
        }
    }
}

impl Error for ProcessorErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProcessorErr::Comms(e) => Some(e),
            ProcessorErr::Filter(e) => Some(e),
            ProcessorErr::SessionClosed => None,
        }
    }
}

impl From<CommsErr> for ProcessorErr {
    fn from(value: CommsErr) -> Self {
        Self::Comms(value)
    }
}

impl From<FilterErr> for ProcessorErr {
    fn from(value: FilterErr) -> Self {
        Self::Filter(value)
    }
}

impl From<io::Error> for ProcessorErr {
    fn from(value: io::Error) -> Self {
        Self::Comms(value.into())
    }
}
