use adaptive::AutoFilter;
use comms::{ACK, CommsErr, FrameCodec, FrameReceiver, FrameSender, ProtocolViolation};
use log::{debug, info, trace, warn};
use ndarray::ArrayView1;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{ProcessorConfig, ProcessorErr, Result};

/// Where a session is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingHeader,
    Streaming { neurons: usize },
    Closed,
}

/// What a session did before closing normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub neurons: usize,
    pub frames: usize,
}

/// The server side of a single connection.
///
/// Owns a fresh filter for the connection's whole lifetime, it is dropped as soon as
/// the session closes.
pub struct Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    rx: FrameReceiver<R>,
    tx: FrameSender<W>,
    codec: FrameCodec,
    config: ProcessorConfig,
    state: SessionState,
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new `Session`.
    ///
    /// # Arguments
    /// * `rx` - The receiving end of the connection.
    /// * `tx` - The sending end of the connection.
    /// * `config` - The wire layout and filter parameters, fixed for the session.
    pub fn new(rx: FrameReceiver<R>, tx: FrameSender<W>, config: &ProcessorConfig) -> Self {
        Self {
            rx,
            tx,
            codec: FrameCodec::from_config(&config.session),
            config: config.clone(),
            state: SessionState::AwaitingHeader,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the session until the probe closes the connection.
    ///
    /// Whatever the outcome, the session ends `Closed` with its writing half shut down.
    ///
    /// # Returns
    /// A summary if the probe hung up at a frame boundary, the failure otherwise.
    pub async fn run(&mut self) -> Result<SessionSummary> {
        if self.state != SessionState::AwaitingHeader {
            return Err(ProcessorErr::SessionClosed);
        }

        let result = self.serve().await;
        self.close().await;

        match &result {
            Ok(summary) => info!(
                neurons = summary.neurons, frames = summary.frames;
                "session closed"
            ),
            Err(e) => warn!("session closed on error: {e}"),
        }

        result
    }

    async fn serve(&mut self) -> Result<SessionSummary> {
        let neurons = self.neuron_count().await?;

        // The ACK is only owed once the filter for `neurons` exists.
        let mut filter = self
            .config
            .filter
            .build(neurons)
            .inspect_err(|e| warn!("cannot serve {neurons} neurons: {e}"))?;

        if self.config.session.handshake {
            self.tx.send_exact(&[ACK]).await?;
            debug!(neurons = neurons; "header acknowledged");
        }

        self.state = SessionState::Streaming { neurons };
        info!(neurons = neurons; "streaming");

        let frames = self.stream(filter.as_mut(), neurons).await?;
        Ok(SessionSummary { neurons, frames })
    }

    /// Settles the neuron count, either from the probe's header or from the config.
    async fn neuron_count(&mut self) -> Result<usize> {
        let session = &self.config.session;
        if !session.handshake {
            let neurons = session.neurons.ok_or(CommsErr::InvalidConfig(
                "a fixed neuron count is required without handshake",
            ))?;
            return Ok(neurons.get());
        }

        let max = session.max_neurons.get();
        let header = self.rx.recv_frame(self.codec.header_size()).await?;
        let neurons = self
            .codec
            .decode_header(header)
            .and_then(|neurons| {
                if neurons > max {
                    return Err(ProtocolViolation::TooManyNeurons { neurons, max }.into());
                }
                Ok(neurons)
            })
            .inspect_err(|e| warn!("rejecting header: {e}"))?;

        Ok(neurons)
    }

    /// The read, predict, write loop.
    ///
    /// # Returns
    /// The amount of frames answered.
    async fn stream(&mut self, filter: &mut dyn AutoFilter, neurons: usize) -> Result<usize> {
        let codec = self.codec;
        let mut x = vec![0.0; neurons];
        let mut out = Vec::with_capacity(codec.response_size(neurons));
        let mut frames = 0;

        loop {
            let Some(frame) = self.rx.recv_exact(codec.request_size(neurons)).await? else {
                debug!(frames = frames; "probe hung up");
                return Ok(frames);
            };
            codec.decode_request(frame, &mut x)?;

            let y = filter.predict_next(ArrayView1::from(&x[..]))?;
            out.clear();
            codec.encode_response(y.iter(), &mut out);

            self.tx.send_exact(&out).await?;
            trace!(frame = frames; "answered");
            frames += 1;
        }
    }

    async fn close(&mut self) {
        self.state = SessionState::Closed;

        if let Err(e) = self.tx.shutdown().await {
            debug!("shutting down a closed channel: {e}");
        }
    }
}
