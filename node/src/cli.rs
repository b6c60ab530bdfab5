use std::{
    fs::File,
    io::BufReader,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use adaptive::{DEFAULT_MU, DEFAULT_ORDER, FilterConfig, WeightInit};
use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use comms::{ByteOrder, HeaderWidth, ResponseEncoding, SessionConfig};
use processor::ProcessorConfig;

const UNIFORM_BOUND: f64 = 1e-3;
const NORMAL_STD_DEV: f64 = 1e-3;

/// Closed loop real time streaming between a recording probe and an adaptive processor.
#[derive(Parser, Debug)]
#[command(name = "realtime", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve a single probe, answering every frame with a prediction
    Processor(ProcessorArgs),
    /// Stream a recorded signal to a processor and time every round trip
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
pub struct Endpoint {
    /// Host to bind or connect to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// TCP port
    #[arg(long)]
    pub port: u16,
}

impl Endpoint {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Wire layout flags, both endpoints must agree on them.
#[derive(Args, Debug)]
pub struct WireArgs {
    /// JSON file to start from, flags given here take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Encoding of the response frames
    #[arg(long, value_enum)]
    pub response: Option<ResponseArg>,

    /// Width of the handshake header in bytes
    #[arg(long, value_enum)]
    pub header_width: Option<HeaderWidthArg>,

    /// Byte order of the handshake header
    #[arg(long, value_enum)]
    pub header_order: Option<HeaderOrderArg>,

    /// Skip the handshake, requires --neurons
    #[arg(long, requires = "neurons")]
    pub no_handshake: bool,

    /// Fixed neuron count for handshake-less sessions
    #[arg(long)]
    pub neurons: Option<NonZeroUsize>,

    /// Largest neuron count a header may announce
    #[arg(long)]
    pub max_neurons: Option<NonZeroUsize>,

    /// Deadline for every send and receive, unbounded if absent
    #[arg(long)]
    pub deadline_ms: Option<u64>,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Filter strategy
    #[arg(long, value_enum)]
    pub filter: Option<FilterKind>,

    /// Autoregressive order, the amount of past frames the filter sees
    #[arg(long)]
    pub order: Option<NonZeroUsize>,

    /// LMS learning rate
    #[arg(long)]
    pub mu: Option<f64>,

    /// Weight initialization
    #[arg(long, value_enum)]
    pub init: Option<InitKind>,

    /// Seed for random weight initialization
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ProcessorArgs {
    #[command(flatten)]
    pub endpoint: Endpoint,

    #[command(flatten)]
    pub wire: WireArgs,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub endpoint: Endpoint,

    /// JSON signal, `{"spks": [[...], ...]}` with one row per neuron
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the predictions and round trip times
    #[arg(long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub wire: WireArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseArg {
    Int8,
    Float64,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderWidthArg {
    #[value(name = "2")]
    Two,
    #[value(name = "4")]
    Four,
    #[value(name = "8")]
    Eight,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderOrderArg {
    Big,
    Little,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Lms,
    Echo,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitKind {
    Zero,
    Uniform,
    Normal,
}

impl ProcessorArgs {
    /// Builds the processor config from the optional file and the flags.
    pub fn config(&self) -> anyhow::Result<ProcessorConfig> {
        let base = load_config(self.wire.config.as_deref())?;

        Ok(ProcessorConfig {
            session: self.wire.apply(base.session),
            filter: self.filter.apply(base.filter),
        })
    }
}

impl ProbeArgs {
    /// Builds the session config from the optional file and the flags.
    pub fn session(&self) -> anyhow::Result<SessionConfig> {
        let base = load_config(self.wire.config.as_deref())?;
        Ok(self.wire.apply(base.session))
    }
}

impl WireArgs {
    fn apply(&self, mut session: SessionConfig) -> SessionConfig {
        if let Some(response) = self.response {
            session.response = match response {
                ResponseArg::Int8 => ResponseEncoding::Int8,
                ResponseArg::Float64 => ResponseEncoding::Float64,
            };
        }

        if let Some(width) = self.header_width {
            session.header.width = match width {
                HeaderWidthArg::Two => HeaderWidth::U16,
                HeaderWidthArg::Four => HeaderWidth::U32,
                HeaderWidthArg::Eight => HeaderWidth::U64,
            };
        }

        if let Some(order) = self.header_order {
            session.header.order = match order {
                HeaderOrderArg::Big => ByteOrder::Big,
                HeaderOrderArg::Little => ByteOrder::Little,
            };
        }

        if self.no_handshake {
            session.handshake = false;
        }

        session.neurons = self.neurons.or(session.neurons);
        session.max_neurons = self.max_neurons.unwrap_or(session.max_neurons);
        session.deadline_ms = self.deadline_ms.or(session.deadline_ms);
        session
    }
}

impl FilterArgs {
    fn apply(&self, base: FilterConfig) -> FilterConfig {
        let kind = self.filter.unwrap_or(match base {
            FilterConfig::Lms { .. } => FilterKind::Lms,
            FilterConfig::Echo => FilterKind::Echo,
        });

        let (order, mu, init) = match base {
            FilterConfig::Lms { order, mu, init } => (order, mu, init),
            FilterConfig::Echo => (DEFAULT_ORDER, DEFAULT_MU, WeightInit::Zero),
        };

        match kind {
            FilterKind::Echo => FilterConfig::Echo,
            FilterKind::Lms => FilterConfig::Lms {
                order: self.order.unwrap_or(order),
                mu: self.mu.unwrap_or(mu),
                init: self.init(init),
            },
        }
    }

    fn init(&self, base: WeightInit) -> WeightInit {
        let policy = match self.init {
            None => base,
            Some(InitKind::Zero) => WeightInit::Zero,
            Some(InitKind::Uniform) => WeightInit::Uniform {
                low: -UNIFORM_BOUND,
                high: UNIFORM_BOUND,
                seed: None,
            },
            Some(InitKind::Normal) => WeightInit::Normal {
                mean: 0.,
                std_dev: NORMAL_STD_DEV,
                seed: None,
            },
        };

        let Some(seed) = self.seed else {
            return policy;
        };

        match policy {
            WeightInit::Zero => WeightInit::Zero,
            WeightInit::Uniform { low, high, .. } => WeightInit::Uniform {
                low,
                high,
                seed: Some(seed),
            },
            WeightInit::Normal { mean, std_dev, .. } => WeightInit::Normal {
                mean,
                std_dev,
                seed: Some(seed),
            },
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ProcessorConfig> {
    let Some(path) = path else {
        return Ok(ProcessorConfig::default());
    };

    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing the config in {}", path.display()))
}
