use std::net::SocketAddr;

use log::info;
use tokio::net::{TcpListener, ToSocketAddrs};

use crate::{ProcessorConfig, Result, Session, SessionSummary};

/// A processor bound to a local address, waiting for its probe.
pub struct Processor {
    listener: TcpListener,
    config: ProcessorConfig,
}

impl Processor {
    /// Validates `config` and binds a listener at `addr`.
    ///
    /// # Returns
    /// The processor or an error if the config is invalid or the address is taken.
    pub async fn bind<A>(addr: A, config: ProcessorConfig) -> Result<Self>
    where
        A: ToSocketAddrs + ToString,
    {
        config.validate()?;
        let listener = comms::bind(addr).await?;
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts a single probe and serves its session to completion.
    pub async fn serve(self) -> Result<SessionSummary> {
        let deadline = self.config.session.deadline();
        let (rx, tx) = comms::accept(&self.listener, deadline).await?;

        let mut session = Session::new(rx, tx, &self.config);
        let summary = session.run().await?;

        info!("processor done");
        Ok(summary)
    }
}
