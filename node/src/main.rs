mod cli;
mod dataset;

use clap::Parser;
use log::info;
use probe::{ProbeDriver, ResultSet};
use processor::Processor;
use tokio::signal;

use cli::{Cli, Command, ProbeArgs, ProcessorArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Processor(args) => run_processor(args).await,
        Command::Probe(args) => run_probe(args).await,
    }
}

async fn run_processor(args: ProcessorArgs) -> anyhow::Result<()> {
    let config = args.config()?;
    let processor = Processor::bind(args.endpoint.addr(), config).await?;

    tokio::select! {
        ret = processor.serve() => {
            let summary = ret?;
            info!("served {} frames of {} neurons", summary.frames, summary.neurons);
        }
        _ = signal::ctrl_c() => {
            info!("received SIGINT, shutting down");
        }
    }

    Ok(())
}

async fn run_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let session = args.session()?;
    let spikes = dataset::load_signal(&args.input)?;

    let driver = ProbeDriver::new(spikes, session)?;
    info!(
        neurons = driver.neurons(), frames = driver.frames();
        "signal loaded from {}", args.input.display()
    );

    let results = ResultSet::from(driver.connect_and_run(args.endpoint.addr()).await?);
    match results.latency_report() {
        Some(report) => println!("round trip over {} frames: {report}", results.len()),
        None => println!("the signal has no frames, nothing was measured"),
    }

    dataset::save_results(&args.output, &results)?;
    info!("results written to {}", args.output.display());
    Ok(())
}
