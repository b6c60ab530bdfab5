use std::{
    error::Error,
    fmt::{self, Display},
    io,
    time::Duration,
};

/// The result type used in the entire communication module.
pub type Result<T> = std::result::Result<T, CommsErr>;

/// The three failure classes a caller has to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Connect, bind, accept or write failures. Fatal, never retried.
    Connection,
    /// The peer broke the wire contract. Fatal to the session.
    Protocol,
    /// The stream ended or stalled in the middle of a frame.
    Io,
}

/// A breach of the wire contract agreed on by both endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    HeaderWidth { got: usize, expected: usize },
    HeaderOverflow { neurons: u64, width: usize },
    TooManyNeurons { neurons: usize, max: usize },
    ZeroNeurons,
    AckMismatch { got: u8 },
    /// The processor hung up instead of acknowledging the header.
    MissingAck,
    FrameWidth { got: usize, expected: usize },
    NeuronMismatch { got: usize, expected: usize },
}

impl Display for ProtocolViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderWidth { got, expected } => {
                write!(f, "header is {got} bytes wide, expected {expected}")
            }
            Self::HeaderOverflow { neurons, width } => {
                write!(f, "{neurons} neurons do not fit in a {width} byte header")
            }
            Self::TooManyNeurons { neurons, max } => {
                write!(f, "header announces {neurons} neurons, at most {max} are accepted")
            }
            Self::ZeroNeurons => write!(f, "header announces zero neurons"),
            Self::AckMismatch { got } => {
                write!(f, "expected ACK byte 0x06 after the header, got {got:#04x}")
            }
            Self::MissingAck => write!(f, "peer closed before acknowledging the header"),
            Self::FrameWidth { got, expected } => {
                write!(f, "frame is {got} bytes wide, expected {expected}")
            }
            Self::NeuronMismatch { got, expected } => {
                write!(f, "signal has {got} neurons but the session is fixed to {expected}")
            }
        }
    }
}

/// The communication module's error type.
#[derive(Debug)]
pub enum CommsErr {
    /// Failed to connect, bind or accept.
    Connection { addr: String, source: io::Error },
    /// The peer stopped taking our bytes.
    Disconnected(io::Error),
    Protocol(ProtocolViolation),
    /// The peer closed after `got` of the `expected` bytes of a frame.
    Truncated { got: usize, expected: usize },
    InvalidConfig(&'static str),
    Timeout { op: &'static str, deadline: Duration },
    Io(io::Error),
}

impl CommsErr {
    /// Returns the class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Connection { .. } | Self::Disconnected(_) => ErrorClass::Connection,
            Self::Protocol(_) | Self::InvalidConfig(_) => ErrorClass::Protocol,
            Self::Truncated { .. } | Self::Timeout { .. } | Self::Io(_) => ErrorClass::Io,
        }
    }
}

impl Display for CommsErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection { addr, source } => write!(f, "connection to {addr} failed: {source}"),
            Self::Disconnected(e) => write!(f, "peer disconnected: {e}"),
            Self::Protocol(violation) => write!(f, "protocol error: {violation}"),
            Self::Truncated { got, expected } => write!(
                f,
                "truncated frame, peer closed after {got} of {expected} bytes"
            ),
            Self::InvalidConfig(msg) => write!(f, "invalid session config: {msg}"),
            Self::Timeout { op, deadline } => {
                write!(f, "{op} did not complete within {deadline:?}")
            }
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for CommsErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection { source, .. } => Some(source),
            Self::Disconnected(e) | Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CommsErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ProtocolViolation> for CommsErr {
    fn from(value: ProtocolViolation) -> Self {
        Self::Protocol(value)
    }
}
