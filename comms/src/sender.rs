//! The sending end of the exact transport.

use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{CommsErr, Result, bounded};

/// The sending end handle of the communication.
pub struct FrameSender<W>
where
    W: AsyncWrite + Unpin,
{
    tx: W,
    deadline: Option<Duration>,
}

impl<W: AsyncWrite + Unpin> FrameSender<W> {
    /// Creates a new `FrameSender` instance.
    ///
    /// # Arguments
    /// * `tx` - The underlying writer.
    /// * `deadline` - The bound on each send, `None` for no bound.
    pub(super) fn new(tx: W, deadline: Option<Duration>) -> Self {
        Self { tx, deadline }
    }

    /// Writes all of `bytes` through the inner writer and flushes it.
    ///
    /// # Arguments
    /// * `bytes` - An encoded frame.
    ///
    /// # Returns
    /// `CommsErr::Disconnected` if the peer stops accepting bytes before the whole
    /// frame is written.
    pub async fn send_exact(&mut self, bytes: &[u8]) -> Result<()> {
        let Self { tx, deadline } = self;

        let write = async {
            tx.write_all(bytes).await.map_err(CommsErr::Disconnected)?;
            tx.flush().await.map_err(CommsErr::Disconnected)
        };

        bounded(*deadline, "send", write).await
    }

    /// Closes the writing half, the peer will read a clean end of stream.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.tx.shutdown().await.map_err(CommsErr::Disconnected)
    }
}
