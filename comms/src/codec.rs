//! Fixed width encodings for the header, request and response frames.

use crate::{
    ByteOrder, HeaderFormat, HeaderWidth, ProtocolViolation, ResponseEncoding, Result,
    SessionConfig,
};

/// Byte the processor sends right after accepting a header.
pub const ACK: u8 = 0x06;

const F64_SIZE: usize = size_of::<f64>();

/// Stateless frame encoder/decoder for one session layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCodec {
    header: HeaderFormat,
    response: ResponseEncoding,
}

impl FrameCodec {
    /// Creates a new `FrameCodec`.
    ///
    /// # Arguments
    /// * `header` - The layout of the handshake header.
    /// * `response` - The encoding of the response samples.
    pub fn new(header: HeaderFormat, response: ResponseEncoding) -> Self {
        Self { header, response }
    }

    /// Creates the codec matching the given session config.
    pub fn from_config(cfg: &SessionConfig) -> Self {
        Self::new(cfg.header, cfg.response)
    }

    pub fn header_size(&self) -> usize {
        self.header.width.size()
    }

    pub fn request_size(&self, neurons: usize) -> usize {
        neurons
    }

    pub fn response_size(&self, neurons: usize) -> usize {
        neurons * self.response.sample_size()
    }

    pub fn response_encoding(&self) -> ResponseEncoding {
        self.response
    }

    /// Appends the header announcing `neurons` into `buf`.
    ///
    /// # Returns
    /// A protocol error if `neurons` is zero or does not fit in the configured width.
    pub fn encode_header(&self, neurons: usize, buf: &mut Vec<u8>) -> Result<()> {
        if neurons == 0 {
            return Err(ProtocolViolation::ZeroNeurons.into());
        }

        let overflow = || ProtocolViolation::HeaderOverflow {
            neurons: neurons as u64,
            width: self.header_size(),
        };

        let order = self.header.order;
        match self.header.width {
            HeaderWidth::U16 => {
                let n = u16::try_from(neurons).map_err(|_| overflow())?;
                buf.extend_from_slice(&pick(order, n.to_be_bytes(), n.to_le_bytes()));
            }
            HeaderWidth::U32 => {
                let n = u32::try_from(neurons).map_err(|_| overflow())?;
                buf.extend_from_slice(&pick(order, n.to_be_bytes(), n.to_le_bytes()));
            }
            HeaderWidth::U64 => {
                let n = neurons as u64;
                buf.extend_from_slice(&pick(order, n.to_be_bytes(), n.to_le_bytes()));
            }
        }

        Ok(())
    }

    /// Reads the neuron count out of a header.
    ///
    /// # Returns
    /// A protocol error if `bytes` is not exactly the configured header width, the
    /// count is zero or does not fit in the platform's `usize`.
    pub fn decode_header(&self, bytes: &[u8]) -> Result<usize> {
        let expected = self.header_size();
        let width_err = || ProtocolViolation::HeaderWidth {
            got: bytes.len(),
            expected,
        };

        let order = self.header.order;
        let neurons = match self.header.width {
            HeaderWidth::U16 => {
                let raw = bytes.try_into().map_err(|_| width_err())?;
                pick(order, u16::from_be_bytes(raw), u16::from_le_bytes(raw)) as u64
            }
            HeaderWidth::U32 => {
                let raw = bytes.try_into().map_err(|_| width_err())?;
                pick(order, u32::from_be_bytes(raw), u32::from_le_bytes(raw)) as u64
            }
            HeaderWidth::U64 => {
                let raw = bytes.try_into().map_err(|_| width_err())?;
                pick(order, u64::from_be_bytes(raw), u64::from_le_bytes(raw))
            }
        };

        match usize::try_from(neurons) {
            Ok(0) => Err(ProtocolViolation::ZeroNeurons.into()),
            Ok(n) => Ok(n),
            Err(_) => Err(ProtocolViolation::HeaderOverflow {
                neurons,
                width: expected,
            }
            .into()),
        }
    }

    /// Appends a request frame, one byte per neuron, into `buf`.
    pub fn encode_request<'a, I>(&self, samples: I, buf: &mut Vec<u8>)
    where
        I: IntoIterator<Item = &'a u8>,
    {
        buf.extend(samples);
    }

    /// Widens the spike counts of a request frame into `out`.
    ///
    /// # Returns
    /// A protocol error if the frame and `out` lengths differ.
    pub fn decode_request(&self, bytes: &[u8], out: &mut [f64]) -> Result<()> {
        check_width(bytes.len(), self.request_size(out.len()))?;

        for (x, &b) in out.iter_mut().zip(bytes) {
            *x = b as f64;
        }

        Ok(())
    }

    /// Appends a response frame holding `prediction` into `buf`.
    ///
    /// In `Int8` mode every value is rounded and saturated into `0..=255`, `NaN`
    /// becomes zero.
    pub fn encode_response<'a, I>(&self, prediction: I, buf: &mut Vec<u8>)
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let prediction = prediction.into_iter();

        match self.response {
            ResponseEncoding::Int8 => {
                buf.extend(prediction.map(|y| y.round() as u8));
            }
            ResponseEncoding::Float64 => {
                for y in prediction {
                    buf.extend_from_slice(&y.to_be_bytes());
                }
            }
        }
    }

    /// Decodes a response frame into `out`.
    ///
    /// # Returns
    /// A protocol error if the frame is not exactly as wide as `out.len()` samples.
    pub fn decode_response(&self, bytes: &[u8], out: &mut [f64]) -> Result<()> {
        check_width(bytes.len(), self.response_size(out.len()))?;

        match self.response {
            ResponseEncoding::Int8 => {
                for (y, &b) in out.iter_mut().zip(bytes) {
                    *y = b as f64;
                }
            }
            ResponseEncoding::Float64 => {
                for (y, chunk) in out.iter_mut().zip(bytes.chunks_exact(F64_SIZE)) {
                    let mut raw = [0; F64_SIZE];
                    raw.copy_from_slice(chunk);
                    *y = f64::from_be_bytes(raw);
                }
            }
        }

        Ok(())
    }
}

fn pick<T>(order: ByteOrder, big: T, little: T) -> T {
    match order {
        ByteOrder::Big => big,
        ByteOrder::Little => little,
    }
}

fn check_width(got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(ProtocolViolation::FrameWidth { got, expected }.into());
    }

    Ok(())
}
