use std::time::{Duration, Instant};

use comms::{ACK, FrameCodec, FrameReceiver, FrameSender, ProtocolViolation, SessionConfig};
use log::{debug, info, trace, warn};
use ndarray::Array2;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::ToSocketAddrs,
};

use crate::{ProbeErr, Result};

/// Send and receive instants of a single round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyRecord {
    pub sent: Instant,
    pub received: Instant,
}

impl LatencyRecord {
    /// The round trip time, never negative.
    pub fn duration(&self) -> Duration {
        self.received.saturating_duration_since(self.sent)
    }
}

/// Everything collected during a run, one entry per completed round trip.
#[derive(Debug, Clone, Default)]
pub struct ProbeRun {
    pub predictions: Vec<Vec<f64>>,
    pub latencies: Vec<LatencyRecord>,
}

/// Streams a pre-loaded `(neurons, frames)` signal to a processor.
pub struct ProbeDriver {
    signal: Array2<u8>,
    config: SessionConfig,
    codec: FrameCodec,
}

impl ProbeDriver {
    /// Creates a new `ProbeDriver`.
    ///
    /// # Arguments
    /// * `signal` - The spike counts, one row per neuron and one column per frame.
    /// * `config` - The wire layout, must match the processor's.
    ///
    /// # Returns
    /// The driver or an error if the config is invalid or the signal does not fit it.
    pub fn new(signal: Array2<u8>, config: SessionConfig) -> Result<Self> {
        config.validate()?;

        let neurons = signal.nrows();
        if neurons == 0 {
            return Err(ProbeErr::InvalidSignal("the signal has no neurons"));
        }

        if let Some(expected) = config.neurons.map(|n| n.get()) {
            if expected != neurons {
                return Err(ProtocolViolation::NeuronMismatch {
                    got: neurons,
                    expected,
                }
                .into());
            }
        }

        let codec = FrameCodec::from_config(&config);
        Ok(Self {
            signal,
            config,
            codec,
        })
    }

    pub fn neurons(&self) -> usize {
        self.signal.nrows()
    }

    pub fn frames(&self) -> usize {
        self.signal.ncols()
    }

    /// Connects to the processor at `addr` and runs the whole signal through it.
    pub async fn connect_and_run<A>(&self, addr: A) -> Result<ProbeRun>
    where
        A: ToSocketAddrs + ToString,
    {
        let (rx, tx) = comms::connect(addr, self.config.deadline()).await?;
        self.run(rx, tx).await
    }

    /// Runs the whole signal through an already open channel.
    ///
    /// The channel is consumed, on success its writing half is shut down so the
    /// processor sees a clean end of stream.
    ///
    /// # Returns
    /// The predictions and timings of every frame, in signal order.
    pub async fn run<R, W>(
        &self,
        mut rx: FrameReceiver<R>,
        mut tx: FrameSender<W>,
    ) -> Result<ProbeRun>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if self.config.handshake {
            self.handshake(&mut rx, &mut tx).await?;
        }

        let run = self.stream(&mut rx, &mut tx).await?;
        tx.shutdown().await?;

        info!(frames = run.latencies.len(); "probe run complete");
        Ok(run)
    }

    async fn handshake<R, W>(
        &self,
        rx: &mut FrameReceiver<R>,
        tx: &mut FrameSender<W>,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut header = Vec::with_capacity(self.codec.header_size());
        self.codec.encode_header(self.neurons(), &mut header)?;
        tx.send_exact(&header).await?;

        let Some(reply) = rx.recv_exact(1).await? else {
            warn!("processor hung up instead of acknowledging the header");
            return Err(ProtocolViolation::MissingAck.into());
        };

        let reply = reply[0];
        if reply != ACK {
            warn!("processor answered the header with {reply:#04x}");
            return Err(ProtocolViolation::AckMismatch { got: reply }.into());
        }

        info!(neurons = self.neurons(); "handshake complete");
        Ok(())
    }

    async fn stream<R, W>(
        &self,
        rx: &mut FrameReceiver<R>,
        tx: &mut FrameSender<W>,
    ) -> Result<ProbeRun>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let neurons = self.neurons();
        let response_size = self.codec.response_size(neurons);

        let mut run = ProbeRun {
            predictions: Vec::with_capacity(self.frames()),
            latencies: Vec::with_capacity(self.frames()),
        };
        let mut request = Vec::with_capacity(self.codec.request_size(neurons));

        for (i, column) in self.signal.columns().into_iter().enumerate() {
            request.clear();
            self.codec.encode_request(column, &mut request);

            let sent = Instant::now();
            tx.send_exact(&request).await?;
            let response = rx.recv_frame(response_size).await?;

            let mut prediction = vec![0.0; neurons];
            self.codec.decode_response(response, &mut prediction)?;
            let received = Instant::now();

            let record = LatencyRecord { sent, received };
            trace!(frame = i, rt_us = record.duration().as_micros() as u64; "round trip");

            run.predictions.push(prediction);
            run.latencies.push(record);
        }

        debug!(frames = run.latencies.len(); "signal exhausted");
        Ok(run)
    }
}
