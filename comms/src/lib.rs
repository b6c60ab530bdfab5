//! Wire layer shared by the probe and the processor.
//!
//! Frames carry no delimiters nor length prefixes, their boundaries follow entirely
//! from the widths pinned by a [`SessionConfig`]. Hence every read and write goes
//! through the exact primitives of [`FrameReceiver`] and [`FrameSender`].

mod codec;
mod config;
mod error;
mod net;
mod receiver;
mod sender;

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

pub use codec::{ACK, FrameCodec};
pub use config::{
    ByteOrder, DEFAULT_MAX_NEURONS, HeaderFormat, HeaderWidth, ResponseEncoding, SessionConfig,
};
pub use error::{CommsErr, ErrorClass, ProtocolViolation, Result};
pub use net::{NetRx, NetTx, accept, bind, connect};
pub use receiver::FrameReceiver;
pub use sender::FrameSender;

/// Creates both `FrameReceiver` and `FrameSender` channel parts.
///
/// Given a reader and a writer creates and returns both ends of the communication,
/// blocking without bound on every operation.
///
/// # Arguments
/// * `rx` - An async readable.
/// * `tx` - An async writable.
///
/// # Returns
/// A communication stream in the form of a frame receiver and sender.
pub fn channel<R, W>(rx: R, tx: W) -> (FrameReceiver<R>, FrameSender<W>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    bounded_channel(rx, tx, None)
}

/// Same as [`channel`] but every send and receive fails with `CommsErr::Timeout`
/// once `deadline` elapses.
///
/// # Arguments
/// * `rx` - An async readable.
/// * `tx` - An async writable.
/// * `deadline` - The per operation deadline, `None` blocks indefinitely.
///
/// # Returns
/// A communication stream in the form of a frame receiver and sender.
pub fn bounded_channel<R, W>(
    rx: R,
    tx: W,
    deadline: Option<Duration>,
) -> (FrameReceiver<R>, FrameSender<W>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    (
        FrameReceiver::new(rx, deadline),
        FrameSender::new(tx, deadline),
    )
}

/// Awaits `fut`, bounding it by `deadline` when there is one.
pub(crate) async fn bounded<F, T>(deadline: Option<Duration>, op: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match deadline {
        Some(deadline) => tokio::time::timeout(deadline, fut)
            .await
            .map_err(|_| CommsErr::Timeout { op, deadline })?,
        None => fut.await,
    }
}
