//! TCP plumbing for both endpoints.

use std::time::Duration;

use log::info;
use tokio::net::{
    TcpListener, TcpStream, ToSocketAddrs,
    tcp::{OwnedReadHalf, OwnedWriteHalf},
};

use crate::{CommsErr, FrameReceiver, FrameSender, Result, bounded_channel};

pub type NetRx = FrameReceiver<OwnedReadHalf>;
pub type NetTx = FrameSender<OwnedWriteHalf>;

/// Binds a listener at `addr`.
///
/// # Returns
/// The listener or `CommsErr::Connection` if failed to do so.
pub async fn bind<A: ToSocketAddrs + ToString>(addr: A) -> Result<TcpListener> {
    let label = addr.to_string();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| CommsErr::Connection {
            addr: label.clone(),
            source,
        })?;

    info!("listening at {label}");
    Ok(listener)
}

/// Accepts a single peer from `listener` and opens a channel with it.
///
/// # Returns
/// The communication channel or `CommsErr::Connection` if failed to do so.
pub async fn accept(listener: &TcpListener, deadline: Option<Duration>) -> Result<(NetRx, NetTx)> {
    let (stream, peer) = listener
        .accept()
        .await
        .map_err(|source| CommsErr::Connection {
            addr: listener
                .local_addr()
                .map(|a| a.to_string())
                .unwrap_or_default(),
            source,
        })?;

    info!("peer connected from {peer}");
    open_channel(stream, deadline)
}

/// Connects to the endpoint listening at `addr`.
///
/// # Returns
/// The communication channel or `CommsErr::Connection` if failed to do so.
pub async fn connect<A: ToSocketAddrs + ToString>(
    addr: A,
    deadline: Option<Duration>,
) -> Result<(NetRx, NetTx)> {
    let label = addr.to_string();
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| CommsErr::Connection {
            addr: label.clone(),
            source,
        })?;

    info!("connected to {label}");
    open_channel(stream, deadline)
}

fn open_channel(stream: TcpStream, deadline: Option<Duration>) -> Result<(NetRx, NetTx)> {
    // Frames are tiny and strictly ping-pong, Nagle would add a delay to every round trip.
    stream.set_nodelay(true)?;
    let (rx, tx) = stream.into_split();
    Ok(bounded_channel(rx, tx, deadline))
}
