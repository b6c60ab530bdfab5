//! The receiving end of the exact transport.

use std::{io, time::Duration};

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{CommsErr, Result, bounded};

/// The receiving end handle of the communication.
pub struct FrameReceiver<R: AsyncRead + Unpin> {
    rx: R,
    buf: Vec<u8>,
    deadline: Option<Duration>,
}

impl<R: AsyncRead + Unpin> FrameReceiver<R> {
    /// Creates a new `FrameReceiver` instance.
    ///
    /// # Arguments
    /// * `rx` - The underlying reader.
    /// * `deadline` - The bound on each receive, `None` for no bound.
    pub(super) fn new(rx: R, deadline: Option<Duration>) -> Self {
        Self {
            rx,
            buf: Vec::new(),
            deadline,
        }
    }

    /// Waits until exactly `len` bytes have been accumulated from the inner reader.
    ///
    /// A single read on a stream may return any prefix of what the peer wrote, so
    /// this keeps reading until the frame is complete.
    ///
    /// # Arguments
    /// * `len` - The width of the frame to receive.
    ///
    /// # Returns
    /// `Ok(Some(frame))` on a complete frame, `Ok(None)` if the peer closed cleanly
    /// at the frame boundary, or `CommsErr::Truncated` if it closed mid-frame.
    pub async fn recv_exact(&mut self, len: usize) -> Result<Option<&[u8]>> {
        let Self { rx, buf, deadline } = self;

        if !bounded(*deadline, "recv", fill(rx, buf, len)).await? {
            return Ok(None);
        }

        Ok(Some(&self.buf[..len]))
    }

    /// Same as [`Self::recv_exact`] but a clean end of stream is also an error, for
    /// the places where the protocol owes us a frame.
    ///
    /// # Returns
    /// The frame or `CommsErr::Truncated` with zero received bytes.
    pub async fn recv_frame(&mut self, len: usize) -> Result<&[u8]> {
        self.recv_exact(len).await?.ok_or(CommsErr::Truncated {
            got: 0,
            expected: len,
        })
    }
}

/// Reads into `buf` until it holds `len` bytes.
///
/// # Returns
/// `true` when the frame is complete and `false` on end of stream before its first byte.
async fn fill<R: AsyncRead + Unpin>(rx: &mut R, buf: &mut Vec<u8>, len: usize) -> Result<bool> {
    buf.resize(len, 0);

    let mut filled = 0;
    while filled < len {
        let read = match rx.read(&mut buf[filled..len]).await {
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        if read == 0 {
            if filled == 0 {
                return Ok(false);
            }

            return Err(CommsErr::Truncated {
                got: filled,
                expected: len,
            });
        }

        filled += read;
    }

    Ok(true)
}
